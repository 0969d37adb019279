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

//! The [`GpuContext`] implementation for [`glow`].
//!
//! [`glow`]: https://crates.io/crates/glow

use crate::backend::{
    BufferTarget, BufferUsage, DrawCall, GpuContext, IndexType, ShaderStage, VertexAttribute,
};
use crate::{Error, Result};

use glow::HasContext;

use std::fmt;
use std::sync::Arc;

/// The OpenGL flavor of the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GlVersion {
    /// OpenGL 3.3 core or higher.
    Gl33,

    /// OpenGL ES 3.0 or higher.
    Es30,
}

/// A [`glow`] context, checked for a usable version and ready to draw lessons with.
///
/// [`glow`]: https://crates.io/crates/glow
pub struct GlowContext<H: HasContext + ?Sized> {
    /// The OpenGL context.
    context: Arc<H>,

    /// The OpenGL version.
    version: GlVersion,
}

impl<H: HasContext + ?Sized> fmt::Debug for GlowContext<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowContext")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl<H: HasContext + ?Sized> GlowContext<H> {
    /// Wrap a [`glow`] context.
    ///
    /// # Safety
    ///
    /// `context` must be current on this thread, and must stay current for as long as this
    /// value or anything created from it is used.
    ///
    /// [`glow`]: https://crates.io/crates/glow
    pub unsafe fn new(context: H) -> Result<Self>
    where
        H: Sized,
    {
        Self::from_arc(Arc::new(context))
    }

    /// Wrap a [`glow`] context that is shared with something else, like the overlay painter.
    ///
    /// # Safety
    ///
    /// Same as [`GlowContext::new`].
    ///
    /// [`glow`]: https://crates.io/crates/glow
    pub unsafe fn from_arc(context: Arc<H>) -> Result<Self> {
        let version = context.version();

        let has_supported_version = if version.is_embedded {
            version.major >= 3
        } else {
            version.major >= 4 || (version.major >= 3 && version.minor >= 3)
        };
        if !has_supported_version {
            tracing::error!(
                "[OpenGL] version {}.{} is not supported",
                version.major,
                version.minor
            );
            return Err(Error::UnsupportedVersion {
                major: version.major,
                minor: version.minor,
                embedded: version.is_embedded,
            });
        }

        tracing::info!(
            "[OpenGL] {}{}.{} {}",
            if version.is_embedded { "ES " } else { "" },
            version.major,
            version.minor,
            version.vendor_info
        );

        let version = if version.is_embedded {
            GlVersion::Es30
        } else {
            GlVersion::Gl33
        };

        context.enable(glow::DEPTH_TEST);

        #[cfg(not(target_vendor = "apple"))]
        if context.supports_debug() {
            context.enable(glow::DEBUG_OUTPUT);
            context.debug_message_callback(debug_message_callback);
        }

        gl_error(&*context);

        Ok(Self { context, version })
    }

    /// Get a reference to the underlying context.
    pub fn context(&self) -> &Arc<H> {
        &self.context
    }

    /// Whether this is an OpenGL ES context.
    pub fn is_embedded(&self) -> bool {
        self.version == GlVersion::Es30
    }

    /// Put back the depth test and blending state the lessons draw with.
    ///
    /// The overlay painter turns the depth test off and blending on for its own draws.
    pub fn reset_state(&self) {
        unsafe {
            self.context.enable(glow::DEPTH_TEST);
            self.context.disable(glow::BLEND);
        }
    }
}

impl<H: HasContext + ?Sized> GpuContext for GlowContext<H> {
    type Shader = H::Shader;
    type Program = H::Program;
    type Buffer = H::Buffer;
    type VertexArray = H::VertexArray;
    type UniformLocation = H::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };

        unsafe { self.context.create_shader(shader_type).gl_err() }
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) -> Result<(), String> {
        unsafe {
            self.context.shader_source(shader, source);
            self.context.compile_shader(shader);

            if self.context.get_shader_compile_status(shader) {
                Ok(())
            } else {
                Err(self.context.get_shader_info_log(shader))
            }
        }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.context.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program> {
        unsafe { self.context.create_program().gl_err() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.context.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.context.detach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) -> Result<(), String> {
        unsafe {
            self.context.link_program(program);

            if self.context.get_program_link_status(program) {
                Ok(())
            } else {
                Err(self.context.get_program_info_log(program))
            }
        }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.context.delete_program(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.context.use_program(program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.context.get_uniform_location(program, name) }
    }

    fn uniform_matrix_4(&self, location: &Self::UniformLocation, columns: &[f32; 16]) {
        unsafe {
            self.context
                .uniform_matrix_4_f32_slice(Some(location), false, columns);
        }

        gl_error(&*self.context);
    }

    fn get_uniform_matrix_4(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
    ) -> [f32; 16] {
        let mut columns = [0.0; 16];
        unsafe {
            self.context
                .get_uniform_f32(program, location, &mut columns);
        }
        columns
    }

    fn create_buffer(&self) -> Result<Self::Buffer> {
        unsafe { self.context.create_buffer().gl_err() }
    }

    fn buffer_data(
        &self,
        target: BufferTarget,
        buffer: Self::Buffer,
        data: &[u8],
        usage: BufferUsage,
    ) {
        let target = match target {
            BufferTarget::Array => glow::ARRAY_BUFFER,
            BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
        };
        let usage = match usage {
            BufferUsage::Static => glow::STATIC_DRAW,
            BufferUsage::Dynamic => glow::DYNAMIC_DRAW,
        };

        unsafe {
            self.context.bind_buffer(target, Some(buffer));
            let _guard = crate::CallOnDrop(|| {
                self.context.bind_buffer(target, None);
            });

            self.context.buffer_data_u8_slice(target, data, usage);
        }

        gl_error(&*self.context);
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.context.delete_buffer(buffer) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray> {
        unsafe { self.context.create_vertex_array().gl_err() }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.context.bind_vertex_array(vertex_array) }
    }

    fn vertex_attribute(&self, buffer: Self::Buffer, attribute: VertexAttribute) {
        unsafe {
            self.context.enable_vertex_attrib_array(attribute.slot);
            self.context.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.context.vertex_attrib_pointer_f32(
                attribute.slot,
                attribute.components,
                glow::FLOAT,
                false,
                attribute.stride,
                0,
            );
            if attribute.divisor != 0 {
                self.context
                    .vertex_attrib_divisor(attribute.slot, attribute.divisor);
            }
            self.context.bind_buffer(glow::ARRAY_BUFFER, None);
        }

        gl_error(&*self.context);
    }

    fn bind_index_buffer(&self, buffer: Option<Self::Buffer>) {
        unsafe {
            self.context
                .bind_buffer(glow::ELEMENT_ARRAY_BUFFER, buffer);
        }
    }

    fn draw(&self, call: DrawCall) {
        let index_type = |ty: IndexType| match ty {
            IndexType::U16 => glow::UNSIGNED_SHORT,
            IndexType::U32 => glow::UNSIGNED_INT,
        };

        unsafe {
            match call {
                DrawCall::Arrays { count } => {
                    self.context.draw_arrays(glow::TRIANGLES, 0, count as i32)
                }
                DrawCall::ArraysInstanced { count, instances } => self
                    .context
                    .draw_arrays_instanced(glow::TRIANGLES, 0, count as i32, instances as i32),
                DrawCall::Elements { count, index_type: ty } => self.context.draw_elements(
                    glow::TRIANGLES,
                    count as i32,
                    index_type(ty),
                    0,
                ),
                DrawCall::ElementsInstanced {
                    count,
                    index_type: ty,
                    instances,
                } => self.context.draw_elements_instanced(
                    glow::TRIANGLES,
                    count as i32,
                    index_type(ty),
                    0,
                    instances as i32,
                ),
            }
        }

        gl_error(&*self.context);
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.context.delete_vertex_array(vertex_array) }
    }

    fn clear(&self, [r, g, b, a]: [f32; 4]) {
        unsafe {
            self.context.clear_color(r, g, b, a);
            self.context
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn viewport(&self, width: u32, height: u32) {
        unsafe {
            self.context.viewport(0, 0, width as i32, height as i32);
        }
    }
}

/// Log the pending OpenGL error, if any.
fn gl_error(h: &(impl HasContext + ?Sized)) {
    let err = unsafe { h.get_error() };

    if err != glow::NO_ERROR {
        tracing::error!("[OpenGL] {}", error_name(err));
    }
}

/// Names of the codes `glGetError` can return.
const ERROR_NAMES: &[(u32, &str)] = &[
    (glow::INVALID_ENUM, "GL_INVALID_ENUM"),
    (glow::INVALID_VALUE, "GL_INVALID_VALUE"),
    (glow::INVALID_OPERATION, "GL_INVALID_OPERATION"),
    (glow::STACK_OVERFLOW, "GL_STACK_OVERFLOW"),
    (glow::STACK_UNDERFLOW, "GL_STACK_UNDERFLOW"),
    (glow::OUT_OF_MEMORY, "GL_OUT_OF_MEMORY"),
    (glow::INVALID_FRAMEBUFFER_OPERATION, "GL_INVALID_FRAMEBUFFER_OPERATION"),
    (glow::CONTEXT_LOST, "GL_CONTEXT_LOST"),
];

/// Labels for the source and type of a `KHR_debug` message.
const DEBUG_LABELS: &[(u32, &str)] = &[
    (glow::DEBUG_SOURCE_API, "api"),
    (glow::DEBUG_SOURCE_WINDOW_SYSTEM, "window system"),
    (glow::DEBUG_SOURCE_SHADER_COMPILER, "shader compiler"),
    (glow::DEBUG_SOURCE_THIRD_PARTY, "third party"),
    (glow::DEBUG_SOURCE_APPLICATION, "application"),
    (glow::DEBUG_SOURCE_OTHER, "other"),
    (glow::DEBUG_TYPE_ERROR, "error"),
    (glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR, "deprecated"),
    (glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR, "undefined behavior"),
    (glow::DEBUG_TYPE_PORTABILITY, "portability"),
    (glow::DEBUG_TYPE_PERFORMANCE, "performance"),
    (glow::DEBUG_TYPE_MARKER, "marker"),
    (glow::DEBUG_TYPE_OTHER, "other"),
];

fn lookup(table: &[(u32, &'static str)], code: u32) -> Option<&'static str> {
    table
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

fn error_name(err: u32) -> &'static str {
    lookup(ERROR_NAMES, err).unwrap_or("Unknown GL error")
}

/// The level a driver message of `severity` is logged at. Unknown severities are dropped.
fn debug_level(severity: u32) -> Option<tracing::Level> {
    match severity {
        glow::DEBUG_SEVERITY_HIGH => Some(tracing::Level::ERROR),
        glow::DEBUG_SEVERITY_MEDIUM => Some(tracing::Level::WARN),
        glow::DEBUG_SEVERITY_LOW => Some(tracing::Level::INFO),
        glow::DEBUG_SEVERITY_NOTIFICATION => Some(tracing::Level::DEBUG),
        _ => None,
    }
}

fn debug_line(source: u32, ty: u32, id: u32, message: &str) -> String {
    let source = lookup(DEBUG_LABELS, source).unwrap_or("unknown");
    let ty = lookup(DEBUG_LABELS, ty).unwrap_or("unknown");
    format!("[OpenGL] {source} {ty} #{id}: {message}")
}

#[cfg(not(target_vendor = "apple"))]
fn debug_message_callback(source: u32, ty: u32, id: u32, severity: u32, message: &str) {
    let Some(level) = debug_level(severity) else {
        return;
    };

    let line = debug_line(source, ty, id, message);
    match level {
        tracing::Level::ERROR => tracing::error!("{line}"),
        tracing::Level::WARN => tracing::warn!("{line}"),
        tracing::Level::INFO => tracing::info!("{line}"),
        _ => tracing::debug!("{line}"),
    }
}

trait ResultExt<T, E> {
    fn gl_err(self) -> Result<T, Error>;
}

impl<T, E: Into<Error>> ResultExt<T, E> for Result<T, E> {
    fn gl_err(self) -> Result<T, Error> {
        self.map_err(Into::into)
    }
}
