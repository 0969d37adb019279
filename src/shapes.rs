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

//! Geometry shared by the lessons.
//!
//! The builders borrow the constants below, so the returned [`MeshBuilder`]s are `'static`.

use crate::mesh::{Indices, MeshBuilder};

/// A triangle in normalized device coordinates.
pub const TRIANGLE_POSITIONS: [[f32; 3]; 3] = [[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 0.0]];

/// Red, green and blue corners.
pub const TRIANGLE_COLORS: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// The corners of a square, counter-clockwise from the bottom left.
pub const SQUARE_POSITIONS: [[f32; 2]; 4] = [[-0.5, -0.5], [-0.5, 0.5], [0.5, 0.5], [0.5, -0.5]];

/// Red, green, blue and yellow corners.
pub const SQUARE_COLORS: [[f32; 3]; 4] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
];

/// Two triangles covering the square.
pub const SQUARE_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

//    v6----- v5
//   /|      /|
//  v1------v0|
//  | |     | |
//  | |v7---|-|v4
//  |/      |/
//  v2------v3

/// The corners of a 2x2x2 cube, four per face so each face gets its own normal.
///
/// Faces come in the order front, right, top, left, bottom, back.
pub const CUBE_POSITIONS: [[f32; 3]; 24] = [
    // v0, v1, v2, v3
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    // v0, v3, v4, v5
    [1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    // v0, v5, v6, v1
    [1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    // v1, v6, v7, v2
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    // v7, v4, v3, v2
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [-1.0, -1.0, 1.0],
    // v4, v7, v6, v5
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
];

/// The outward normal of every cube corner.
pub const CUBE_NORMALS: [[f32; 3]; 24] = {
    const FACES: [[f32; 3]; 6] = [
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, -1.0],
    ];

    let mut normals = [[0.0; 3]; 24];
    let mut i = 0;
    while i < 24 {
        normals[i] = FACES[i / 4];
        i += 1;
    }
    normals
};

/// Two triangles per cube face.
pub const CUBE_INDICES: [u16; 36] = {
    let mut indices = [0; 36];
    let mut face = 0;
    while face < 6 {
        let base = face as u16 * 4;
        let quad = [base, base + 1, base + 2, base + 2, base + 3, base];
        let mut i = 0;
        while i < 6 {
            indices[face * 6 + i] = quad[i];
            i += 1;
        }
        face += 1;
    }
    indices
};

/// A triangle with positions only.
pub fn triangle() -> MeshBuilder<'static> {
    MeshBuilder::new(&TRIANGLE_POSITIONS)
}

/// A triangle with a colour at slot 1.
pub fn colored_triangle() -> MeshBuilder<'static> {
    triangle().with_attribute(&TRIANGLE_COLORS)
}

/// An indexed 2D square with a colour at slot 1.
pub fn square() -> MeshBuilder<'static> {
    MeshBuilder::new(&SQUARE_POSITIONS)
        .with_attribute(&SQUARE_COLORS)
        .with_indices(Indices::U32(&SQUARE_INDICES))
}

/// An indexed cube with normals at slot 1.
pub fn cube() -> MeshBuilder<'static> {
    MeshBuilder::new(&CUBE_POSITIONS)
        .with_attribute(&CUBE_NORMALS)
        .with_indices(Indices::U16(&CUBE_INDICES))
}

/// An indexed cube drawn once per translation, the translation at slot 1.
pub fn instanced_cube() -> MeshBuilder<'static> {
    MeshBuilder::new(&CUBE_POSITIONS)
        .with_indices(Indices::U16(&CUBE_INDICES))
        .with_instances(3)
}
