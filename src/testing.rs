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

//! A [`GpuContext`] that records every call instead of talking to a GPU.

use crate::backend::{
    BufferTarget, BufferUsage, DrawCall, GpuContext, ShaderStage, VertexAttribute,
};
use crate::Error;

use std::cell::RefCell;
use std::collections::HashMap;

/// A GPU object, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Object {
    Shader(u32),
    Program(u32),
    Buffer(u32),
    VertexArray(u32),
}

/// A recorded draw, with the state it was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Draw {
    pub(crate) call: DrawCall,
    pub(crate) program: Option<u32>,
    pub(crate) vertex_array: Option<u32>,
    pub(crate) index_buffer: Option<u32>,
}

#[derive(Debug)]
struct ShaderObject {
    stage: ShaderStage,
    source: String,
    compiled: bool,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<u32>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    next_handle: u32,
    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, ProgramObject>,
    current_program: Option<u32>,
    uniform_values: HashMap<(u32, i32), [f32; 16]>,
    lookups: HashMap<String, usize>,
    buffers: HashMap<u32, Vec<u8>>,
    uploads: HashMap<u32, usize>,
    vertex_arrays: Vec<u32>,
    bound_vertex_array: Option<u32>,
    bound_index_buffer: Option<u32>,
    attributes: Vec<(u32, u32, VertexAttribute)>,
    draws: Vec<Draw>,
    deleted: Vec<Object>,
    fail_allocations: bool,
}

impl State {
    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Records every GPU call made through it.
///
/// Shader "compilation" runs a tiny lint: every statement line has to end in `;`, `{` or `}`.
/// Linking collects the `uniform <type> <name>;` declarations of the attached stages, and the
/// location of a uniform is its index in that list.
#[derive(Debug, Default)]
pub(crate) struct RecordingContext {
    state: RefCell<State>,
}

impl RecordingContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every following `create_*` call fail.
    pub(crate) fn fail_allocations(&self) {
        self.state.borrow_mut().fail_allocations = true;
    }

    /// How many times `uniform_location` was asked for `name`.
    pub(crate) fn lookups(&self, name: &str) -> usize {
        self.state
            .borrow()
            .lookups
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn current_program(&self) -> Option<u32> {
        self.state.borrow().current_program
    }

    /// Every object deleted so far, in order.
    pub(crate) fn deleted(&self) -> Vec<Object> {
        self.state.borrow().deleted.clone()
    }

    /// Objects that were created and not deleted yet.
    pub(crate) fn live_objects(&self) -> usize {
        let state = self.state.borrow();
        let created = state.next_handle as usize;
        created - state.deleted.len()
    }

    pub(crate) fn buffer_contents(&self, buffer: u32) -> Vec<u8> {
        self.state
            .borrow()
            .buffers
            .get(&buffer)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn uploads(&self, buffer: u32) -> usize {
        self.state
            .borrow()
            .uploads
            .get(&buffer)
            .copied()
            .unwrap_or(0)
    }

    /// Attribute descriptions, as `(vertex array, buffer, attribute)`.
    pub(crate) fn attributes(&self) -> Vec<(u32, u32, VertexAttribute)> {
        self.state.borrow().attributes.clone()
    }

    pub(crate) fn draws(&self) -> Vec<Draw> {
        self.state.borrow().draws.clone()
    }

    pub(crate) fn bound_vertex_array(&self) -> Option<u32> {
        self.state.borrow().bound_vertex_array
    }
}

fn lint(source: &str) -> Result<(), String> {
    for (number, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        if !(line.ends_with(';') || line.ends_with('{') || line.ends_with('}')) {
            return Err(format!("0:{}: error: expected ';'", number + 1));
        }
    }

    Ok(())
}

fn declared_uniforms(source: &str) -> impl Iterator<Item = String> + '_ {
    source.lines().filter_map(|line| {
        let mut words = line.trim().strip_suffix(';')?.split_whitespace();
        if words.next()? != "uniform" {
            return None;
        }
        let _ty = words.next()?;
        words.next().map(str::to_owned)
    })
}

impl GpuContext for RecordingContext {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type UniformLocation = i32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_allocations {
            return Err(Error::Allocation("out of shader names".into()));
        }

        let handle = state.handle();
        state.shaders.insert(
            handle,
            ShaderObject {
                stage,
                source: String::new(),
                compiled: false,
            },
        );
        Ok(handle)
    }

    fn compile_shader(&self, shader: u32, source: &str) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        let object = state
            .shaders
            .get_mut(&shader)
            .ok_or_else(|| "invalid shader".to_owned())?;

        object.source = source.to_owned();
        lint(source)?;
        object.compiled = true;
        Ok(())
    }

    fn delete_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        state.shaders.remove(&shader);
        state.deleted.push(Object::Shader(shader));
    }

    fn create_program(&self) -> Result<u32, Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_allocations {
            return Err(Error::Allocation("out of program names".into()));
        }

        let handle = state.handle();
        state.programs.insert(handle, ProgramObject::default());
        Ok(handle)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(program) = self.state.borrow_mut().programs.get_mut(&program) {
            program.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(program) = self.state.borrow_mut().programs.get_mut(&program) {
            program.attached.retain(|&attached| attached != shader);
        }
    }

    fn link_program(&self, program: u32) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        let attached = state
            .programs
            .get(&program)
            .map(|program| program.attached.clone())
            .ok_or_else(|| "invalid program".to_owned())?;

        let mut uniforms = Vec::new();
        let mut stages = Vec::new();
        for shader in &attached {
            let object = state
                .shaders
                .get(shader)
                .ok_or_else(|| "attached shader was deleted".to_owned())?;
            if !object.compiled {
                return Err("attached shader is not compiled".into());
            }

            stages.push(object.stage);
            for name in declared_uniforms(&object.source) {
                if !uniforms.contains(&name) {
                    uniforms.push(name);
                }
            }
        }

        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            if !stages.contains(&stage) {
                return Err(format!("error: no {stage} shader attached"));
            }
        }

        if let Some(program) = state.programs.get_mut(&program) {
            program.uniforms = uniforms;
        }
        Ok(())
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.current_program == Some(program) {
            state.current_program = None;
        }
        state.deleted.push(Object::Program(program));
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().current_program = program;
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<i32> {
        let mut state = self.state.borrow_mut();
        *state.lookups.entry(name.to_owned()).or_default() += 1;

        state
            .programs
            .get(&program)?
            .uniforms
            .iter()
            .position(|uniform| uniform == name)
            .map(|index| index as i32)
    }

    fn uniform_matrix_4(&self, location: &i32, columns: &[f32; 16]) {
        let mut state = self.state.borrow_mut();
        if let Some(program) = state.current_program {
            state.uniform_values.insert((program, *location), *columns);
        }
    }

    fn get_uniform_matrix_4(&self, program: u32, location: &i32) -> [f32; 16] {
        self.state
            .borrow()
            .uniform_values
            .get(&(program, *location))
            .copied()
            .unwrap_or([0.0; 16])
    }

    fn create_buffer(&self) -> Result<u32, Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_allocations {
            return Err(Error::Allocation("out of buffer names".into()));
        }

        let handle = state.handle();
        state.buffers.insert(handle, Vec::new());
        Ok(handle)
    }

    fn buffer_data(&self, _target: BufferTarget, buffer: u32, data: &[u8], _usage: BufferUsage) {
        let mut state = self.state.borrow_mut();
        state.buffers.insert(buffer, data.to_vec());
        *state.uploads.entry(buffer).or_default() += 1;
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&buffer);
        state.deleted.push(Object::Buffer(buffer));
    }

    fn create_vertex_array(&self) -> Result<u32, Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_allocations {
            return Err(Error::Allocation("out of vertex array names".into()));
        }

        let handle = state.handle();
        state.vertex_arrays.push(handle);
        Ok(handle)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.state.borrow_mut().bound_vertex_array = vertex_array;
    }

    fn vertex_attribute(&self, buffer: u32, attribute: VertexAttribute) {
        let mut state = self.state.borrow_mut();
        if let Some(vertex_array) = state.bound_vertex_array {
            state.attributes.push((vertex_array, buffer, attribute));
        }
    }

    fn bind_index_buffer(&self, buffer: Option<u32>) {
        self.state.borrow_mut().bound_index_buffer = buffer;
    }

    fn draw(&self, call: DrawCall) {
        let mut state = self.state.borrow_mut();
        let draw = Draw {
            call,
            program: state.current_program,
            vertex_array: state.bound_vertex_array,
            index_buffer: state.bound_index_buffer,
        };
        state.draws.push(draw);
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let mut state = self.state.borrow_mut();
        state.vertex_arrays.retain(|&live| live != vertex_array);
        state.deleted.push(Object::VertexArray(vertex_array));
    }

    fn clear(&self, _color: [f32; 4]) {}

    fn viewport(&self, _width: u32, _height: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lint_reports_the_line() {
        assert!(lint("#version 330 core\nvoid main() {\n}\n").is_ok());
        assert_eq!(
            lint("void main() {\n  gl_Position = vec4(0.0)\n}\n"),
            Err("0:2: error: expected ';'".to_owned())
        );
    }

    #[test]
    fn uniforms_are_parsed_from_declarations() {
        let names: Vec<_> =
            declared_uniforms("uniform mat4 uModel;\nin vec3 aPos;\n  uniform mat4 uProj;\n")
                .collect();
        assert_eq!(names, ["uModel", "uProj"]);
    }
}
