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

//! A small toolkit for incremental OpenGL exercises.
//!
//! Every lesson in this crate opens a window, uploads a few hundred bytes of vertex data,
//! compiles a pair of shaders and draws a triangle, a square or a cube every frame. The
//! reusable pieces are:
//!
//! - [`App`], the application shell. It owns the window, the OpenGL context and an
//!   [`egui`] overlay tied to both, and runs the poll/begin/end frame cycle.
//! - [`ShaderPipeline`], a linked vertex + fragment program with a memoised uniform lookup.
//! - [`Mesh`], a vertex array with its backing buffers, built through a [`MeshBuilder`].
//!
//! The GPU-facing wrappers are generic over [`GpuContext`], which is implemented for
//! [`glow`] contexts by [`GlowContext`].
//!
//! [`glow`]: https://crates.io/crates/glow

mod app;
mod backend;
mod config;
mod error;
mod glow_backend;
mod mesh;
mod pipeline;
pub mod shapes;
pub mod transform;

#[cfg(test)]
mod testing;

pub use app::{App, AppEvent, AppToken};
pub use backend::{
    BufferTarget, BufferUsage, DrawCall, GpuContext, IndexType, ShaderStage, VertexAttribute,
};
pub use config::{AppConfig, GlRequest};
pub use error::{Error, Result};
pub use glow_backend::GlowContext;
pub use mesh::{Indices, Mesh, MeshBuilder, MAX_ATTRIBUTES};
pub use pipeline::{read_shader_file, ShaderPipeline};

pub use egui;
pub use glow;
pub use kurbo;
pub use nalgebra;
pub use winit;

/// Runs the closure when dropped, unless it is forgotten first.
pub(crate) struct CallOnDrop<F: FnMut()>(pub(crate) F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}
