// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `gl-tutorials`.
//
// `gl-tutorials` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `gl-tutorials` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `gl-tutorials`. If not, see <https://www.gnu.org/licenses/>.

//! Matrix helpers for the lessons.
//!
//! Matrices are column-major and vectors are multiplied on the right, so every vertex shader
//! computes `clip = view_proj * model * vec4(position, 1.0)`. The matrices are uploaded as is,
//! without transposing.

use kurbo::{Point, Size};
use nalgebra::{Matrix4, Vector2, Vector3};

/// A rotation of `angle` radians around the Y axis.
pub fn model_rotation_y(angle: f32) -> Matrix4<f32> {
    Matrix4::from_axis_angle(&Vector3::y_axis(), angle)
}

/// Move the world `z` units along the Z axis, like a camera backing away for negative `z`.
pub fn view_translation(z: f32) -> Matrix4<f32> {
    Matrix4::new_translation(&Vector3::new(0.0, 0.0, z))
}

/// A right-handed perspective projection into OpenGL clip space.
///
/// `fov_y` is the vertical field of view in radians. Panics if `aspect` is zero or if
/// `near == far`.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    Matrix4::new_perspective(aspect, fov_y, near, far)
}

/// The combined camera matrix of the instanced lesson: a 45° perspective looking at the
/// origin from `distance` units away.
pub fn view_projection(aspect: f32, distance: f32) -> Matrix4<f32> {
    perspective(45f32.to_radians(), aspect, 0.1, 100.0) * view_translation(-distance)
}

/// Map a cursor position in pixels onto the XY plane, spanning `[-extent, extent]` on both
/// axes with Y pointing up.
pub fn screen_to_world(position: Point, window: Size, extent: f32) -> Vector2<f32> {
    let half_width = window.width / 2.0;
    let half_height = window.height / 2.0;

    Vector2::new(
        ((position.x / half_width - 1.0) as f32) * extent,
        -((position.y / half_height - 1.0) as f32) * extent,
    )
}

/// A counter advanced by a fixed step every frame, wrapping back to zero above a limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClock {
    value: f32,
    step: f32,
    limit: f32,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(0.05, 100.0)
    }
}

impl AnimationClock {
    /// A clock starting at zero.
    pub fn new(step: f32, limit: f32) -> Self {
        Self {
            value: 0.0,
            step,
            limit,
        }
    }

    /// Advance by one frame and return the new value.
    pub fn tick(&mut self) -> f32 {
        self.value += self.step;
        if self.value > self.limit {
            self.value = 0.0;
        }
        self.value
    }

    /// The current value.
    pub fn value(&self) -> f32 {
        self.value
    }
}
