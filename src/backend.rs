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

//! Defines the GPU backend used by the pipeline and mesh wrappers.

use crate::Error;

use std::fmt;

/// The OpenGL calls the shader pipeline and the mesh wrappers are built from.
///
/// All of these are expected to run on the thread that owns the current context.
/// [`GlowContext`](crate::GlowContext) implements this for [`glow`].
///
/// [`glow`]: https://crates.io/crates/glow
pub trait GpuContext {
    /// A compiled (or compiling) shader object.
    type Shader: Copy + fmt::Debug;

    /// A program object.
    type Program: Copy + fmt::Debug;

    /// A buffer object holding vertex, index or instance data.
    type Buffer: Copy + fmt::Debug;

    /// A vertex array object, which records the attribute layout.
    type VertexArray: Copy + fmt::Debug;

    /// The binding slot of a uniform inside a program.
    type UniformLocation: Clone + fmt::Debug;

    /// Create an empty shader object for the given stage.
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, Error>;

    /// Upload the source of a shader and compile it.
    ///
    /// On failure, the compiler's info log is returned.
    fn compile_shader(&self, shader: Self::Shader, source: &str) -> Result<(), String>;

    /// Delete a shader object.
    fn delete_shader(&self, shader: Self::Shader);

    /// Create an empty program object.
    fn create_program(&self) -> Result<Self::Program, Error>;

    /// Attach a compiled shader to a program.
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Detach a shader from a program.
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Link a program.
    ///
    /// On failure, the linker's info log is returned.
    fn link_program(&self, program: Self::Program) -> Result<(), String>;

    /// Delete a program object.
    fn delete_program(&self, program: Self::Program);

    /// Make a program current, or unbind it with `None`.
    fn use_program(&self, program: Option<Self::Program>);

    /// Look up the location of a uniform in a linked program.
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    /// Set a `mat4` uniform of the current program from sixteen column-major floats.
    fn uniform_matrix_4(&self, location: &Self::UniformLocation, columns: &[f32; 16]);

    /// Read a `mat4` uniform back, in column-major order.
    fn get_uniform_matrix_4(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
    ) -> [f32; 16];

    /// Create a buffer object.
    fn create_buffer(&self) -> Result<Self::Buffer, Error>;

    /// Replace the whole content of a buffer.
    ///
    /// The buffer is bound to `target` for the upload and unbound afterwards.
    fn buffer_data(
        &self,
        target: BufferTarget,
        buffer: Self::Buffer,
        data: &[u8],
        usage: BufferUsage,
    );

    /// Delete a buffer object.
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// Create a vertex array object.
    fn create_vertex_array(&self) -> Result<Self::VertexArray, Error>;

    /// Bind a vertex array, or unbind it with `None`.
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);

    /// Describe how `buffer` feeds an attribute slot of the bound vertex array.
    fn vertex_attribute(&self, buffer: Self::Buffer, attribute: VertexAttribute);

    /// Bind an index buffer, or unbind it with `None`.
    fn bind_index_buffer(&self, buffer: Option<Self::Buffer>);

    /// Issue a draw call with the bound program and vertex array.
    fn draw(&self, call: DrawCall);

    /// Delete a vertex array object.
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    /// Clear the color and depth targets.
    fn clear(&self, color: [f32; 4]);

    /// Set the viewport to cover `width` by `height` pixels.
    fn viewport(&self, width: u32, height: u32);
}

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Runs once per vertex.
    Vertex,

    /// Runs once per fragment.
    Fragment,
}

impl ShaderStage {
    /// The tag used in log messages, like `VertexShader`.
    pub fn log_tag(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "VertexShader",
            ShaderStage::Fragment => "FragmentShader",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// The binding point of a buffer upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex or instance attributes.
    Array,

    /// Indices.
    ElementArray,
}

/// How often a buffer is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Uploaded once.
    Static,

    /// Re-uploaded as the data grows.
    Dynamic,
}

/// The integer type of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// `GL_UNSIGNED_SHORT`.
    U16,

    /// `GL_UNSIGNED_INT`.
    U32,
}

/// The layout of a float attribute read from a tightly packed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// The `layout (location = N)` slot.
    pub slot: u32,

    /// Number of floats per element, between 1 and 4.
    pub components: i32,

    /// Distance in bytes between two elements.
    pub stride: i32,

    /// `0` advances per vertex, `1` advances per instance.
    pub divisor: u32,
}

impl VertexAttribute {
    /// A per-vertex attribute of `components` floats.
    pub fn per_vertex(slot: u32, components: i32) -> Self {
        Self {
            slot,
            components,
            stride: components * std::mem::size_of::<f32>() as i32,
            divisor: 0,
        }
    }

    /// A per-instance attribute of `components` floats.
    pub fn per_instance(slot: u32, components: i32) -> Self {
        Self {
            divisor: 1,
            ..Self::per_vertex(slot, components)
        }
    }
}

/// A triangle-list draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawCall {
    /// `glDrawArrays` over `count` vertices.
    Arrays {
        /// Number of vertices.
        count: u32,
    },

    /// `glDrawArraysInstanced` over `count` vertices.
    ArraysInstanced {
        /// Number of vertices.
        count: u32,

        /// Number of instances.
        instances: u32,
    },

    /// `glDrawElements` over `count` indices.
    Elements {
        /// Number of indices.
        count: u32,

        /// The type of the bound index buffer.
        index_type: IndexType,
    },

    /// `glDrawElementsInstanced` over `count` indices.
    ElementsInstanced {
        /// Number of indices.
        count: u32,

        /// The type of the bound index buffer.
        index_type: IndexType,

        /// Number of instances.
        instances: u32,
    },
}

impl DrawCall {
    /// The number of vertices (or indices) each instance covers.
    pub fn count(&self) -> u32 {
        match *self {
            DrawCall::Arrays { count }
            | DrawCall::ArraysInstanced { count, .. }
            | DrawCall::Elements { count, .. }
            | DrawCall::ElementsInstanced { count, .. } => count,
        }
    }

    /// The number of instances drawn, `1` for non-instanced calls.
    pub fn instances(&self) -> u32 {
        match *self {
            DrawCall::Arrays { .. } | DrawCall::Elements { .. } => 1,
            DrawCall::ArraysInstanced { instances, .. }
            | DrawCall::ElementsInstanced { instances, .. } => instances,
        }
    }
}
