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

//! Linked vertex + fragment programs.

use crate::backend::{GpuContext, ShaderStage};
use crate::{CallOnDrop, Error, Result};

use ahash::RandomState;
use hashbrown::HashMap;
use nalgebra::Matrix4;

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::Path;
use std::rc::Rc;

/// A linked program made of one vertex stage and one fragment stage.
///
/// Uniform locations are looked up lazily and remembered for the lifetime of the pipeline,
/// including the names that do not exist in the program.
pub struct ShaderPipeline<C: GpuContext> {
    /// The context the program lives in.
    context: Rc<C>,

    /// The linked program.
    program: C::Program,

    /// Uniform locations that were already asked for.
    uniforms: HashMap<String, Option<C::UniformLocation>, RandomState>,
}

impl<C: GpuContext> fmt::Debug for ShaderPipeline<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderPipeline")
            .field("program", &self.program)
            .field("uniforms", &self.uniforms)
            .finish_non_exhaustive()
    }
}

impl<C: GpuContext> ShaderPipeline<C> {
    /// Compile and link a pipeline from inline GLSL.
    ///
    /// A stage that fails to compile, or a program that fails to link, logs the driver's
    /// diagnostic and returns [`Error::Compile`] or [`Error::Link`].
    pub fn new(context: Rc<C>, vertex_source: &str, fragment_source: &str) -> Result<Self> {
        let program = compile_program(&*context, vertex_source, fragment_source)?;

        Ok(Self {
            context,
            program,
            uniforms: HashMap::with_hasher(RandomState::new()),
        })
    }

    /// Compile and link a pipeline from two GLSL files.
    pub fn from_files(
        context: Rc<C>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let vertex_source = read_shader_file(vertex_path)?;
        let fragment_source = read_shader_file(fragment_path)?;

        Self::new(context, &vertex_source, &fragment_source)
    }

    /// The linked program.
    pub fn program(&self) -> C::Program {
        self.program
    }

    /// Make this the current program.
    pub fn bind(&self) {
        self.context.use_program(Some(self.program));
    }

    /// Unbind whatever program is current.
    pub fn unbind(&self) {
        self.context.use_program(None);
    }

    /// Upload a 4x4 matrix to the uniform `name`, column-major.
    ///
    /// The pipeline has to be bound. Names the program does not declare are skipped.
    pub fn set_uniform_mat4(&mut self, name: &str, matrix: &Matrix4<f32>) {
        if let Some(location) = self.uniform_location(name) {
            let columns: [[f32; 4]; 4] = (*matrix).into();
            self.context
                .uniform_matrix_4(&location, &bytemuck::cast(columns));
        }
    }

    /// Get the location of the uniform `name`, asking the driver only the first time.
    ///
    /// A missing uniform is warned about once and then remembered as `None`.
    pub fn uniform_location(&mut self, name: &str) -> Option<C::UniformLocation> {
        if let Some(location) = self.uniforms.get(name) {
            return location.clone();
        }

        let location = self.context.uniform_location(self.program, name);
        if location.is_none() {
            tracing::warn!("[Shader] uniform '{name}' doesn't exist!");
        }

        self.uniforms.insert(name.to_owned(), location.clone());
        location
    }
}

impl<C: GpuContext> Drop for ShaderPipeline<C> {
    fn drop(&mut self) {
        self.context.delete_program(self.program);
    }
}

/// Read a shader file line by line, ending every line with `\n`.
pub fn read_shader_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let file_error = |source| {
        tracing::error!("[Shader] cannot read {}: {source}", path.display());
        Error::ShaderFile {
            path: path.to_path_buf(),
            source,
        }
    };

    let file = File::open(path).map_err(file_error)?;
    let mut source = String::new();
    for line in BufReader::new(file).lines() {
        source.push_str(&line.map_err(file_error)?);
        source.push('\n');
    }

    Ok(source)
}

fn compile_program<C: GpuContext + ?Sized>(
    context: &C,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<C::Program> {
    let vertex_shader = compile_shader(context, ShaderStage::Vertex, vertex_source)?;
    let _delete_vertex = CallOnDrop(|| context.delete_shader(vertex_shader));
    let fragment_shader = compile_shader(context, ShaderStage::Fragment, fragment_source)?;
    let _delete_fragment = CallOnDrop(|| context.delete_shader(fragment_shader));

    let program = context.create_program()?;
    let call_on_drop = CallOnDrop(|| context.delete_program(program));

    context.attach_shader(program, vertex_shader);
    context.attach_shader(program, fragment_shader);
    let _detach_shaders = CallOnDrop(|| {
        context.detach_shader(program, vertex_shader);
        context.detach_shader(program, fragment_shader);
    });

    if let Err(log) = context.link_program(program) {
        tracing::error!("[Pipeline] Link failed: {log}");
        return Err(Error::Link { log });
    }

    mem::forget(call_on_drop);
    Ok(program)
}

fn compile_shader<C: GpuContext + ?Sized>(
    context: &C,
    stage: ShaderStage,
    source: &str,
) -> Result<C::Shader> {
    let shader = context.create_shader(stage)?;
    let call_on_drop = CallOnDrop(|| context.delete_shader(shader));

    if let Err(log) = context.compile_shader(shader, source) {
        tracing::error!("[{}] Compilation failed: {log}", stage.log_tag());
        return Err(Error::Compile { stage, log });
    }

    mem::forget(call_on_drop);
    Ok(shader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Object, RecordingContext};

    use std::io;
    use std::sync::{Arc, Mutex};

    const VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
uniform mat4 uModel;
uniform mat4 uViewProj;
void main() {
    gl_Position = uViewProj * uModel * vec4(aPos, 1.0);
}
";

    const FRAGMENT: &str = "#version 330 core
out vec4 FragColor;
void main() {
    FragColor = vec4(1.0, 0.5, 0.2, 1.0);
}
";

    fn pipeline() -> (Rc<RecordingContext>, ShaderPipeline<RecordingContext>) {
        let context = Rc::new(RecordingContext::new());
        let pipeline = ShaderPipeline::new(context.clone(), VERTEX, FRAGMENT).unwrap();
        (context, pipeline)
    }

    #[test]
    fn declared_uniform_reads_back() {
        let (context, mut pipeline) = pipeline();
        let matrix = Matrix4::new(
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0,
        );

        pipeline.bind();
        pipeline.set_uniform_mat4("uModel", &matrix);

        let location = pipeline.uniform_location("uModel").unwrap();
        let columns = context.get_uniform_matrix_4(pipeline.program(), &location);
        assert_eq!(columns.as_slice(), matrix.as_slice());
        // Column-major: the second float is row 1 of column 0.
        assert_eq!(columns[1], 5.0);
    }

    #[test]
    fn lookups_are_memoised() {
        let (context, mut pipeline) = pipeline();

        let first = pipeline.uniform_location("uViewProj");
        let second = pipeline.uniform_location("uViewProj");
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(context.lookups("uViewProj"), 1);
    }

    #[test]
    fn missing_uniform_is_cached_and_skipped() {
        let (context, mut pipeline) = pipeline();

        pipeline.bind();
        pipeline.set_uniform_mat4("uProj", &Matrix4::identity());
        pipeline.set_uniform_mat4("uProj", &Matrix4::identity());

        assert_eq!(pipeline.uniform_location("uProj"), None);
        assert_eq!(context.lookups("uProj"), 1);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn missing_uniform_warns_once() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let (_context, mut pipeline) = pipeline();
            pipeline.bind();
            pipeline.set_uniform_mat4("uProj", &Matrix4::identity());
            pipeline.set_uniform_mat4("uProj", &Matrix4::identity());
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let warnings = output
            .lines()
            .filter(|line| line.contains("[Shader] uniform 'uProj' doesn't exist!"))
            .count();
        assert_eq!(warnings, 1, "{output}");
    }

    #[test]
    fn stages_are_released_after_link() {
        let (context, pipeline) = pipeline();
        let program = pipeline.program();

        // Two shaders, one program.
        assert_eq!(context.live_objects(), 1);
        drop(pipeline);
        assert_eq!(context.live_objects(), 0);
        assert_eq!(
            context
                .deleted()
                .iter()
                .filter(|object| **object == Object::Program(program))
                .count(),
            1
        );
    }

    #[test]
    fn bind_and_unbind() {
        let (context, pipeline) = pipeline();

        pipeline.bind();
        assert_eq!(context.current_program(), Some(pipeline.program()));
        pipeline.unbind();
        assert_eq!(context.current_program(), None);
    }

    #[test]
    fn broken_vertex_stage_is_fatal() {
        let context = Rc::new(RecordingContext::new());
        let broken = VERTEX.replace("vec4(aPos, 1.0);", "vec4(aPos, 1.0)");

        let err = ShaderPipeline::new(context.clone(), &broken, FRAGMENT).unwrap_err();
        match err {
            Error::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(log.contains("expected ';'"), "{log}");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(context.live_objects(), 0);
    }

    #[test]
    fn broken_fragment_stage_releases_the_vertex_stage() {
        let context = Rc::new(RecordingContext::new());
        let broken = FRAGMENT.replace("FragColor = vec4(1.0, 0.5, 0.2, 1.0);", "FragColor =");

        let err = ShaderPipeline::new(context.clone(), VERTEX, &broken).unwrap_err();
        assert!(matches!(
            err,
            Error::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert_eq!(context.live_objects(), 0);
    }

    #[test]
    fn allocation_failure_is_reported() {
        let context = Rc::new(RecordingContext::new());
        context.fail_allocations();

        let err = ShaderPipeline::new(context, VERTEX, FRAGMENT).unwrap_err();
        assert!(matches!(err, Error::Allocation(_)));
    }

    #[test]
    fn shader_files_keep_their_lines() {
        let dir = std::env::temp_dir().join(format!("gl-tutorials-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let vertex = dir.join("shader.vert");
        let fragment = dir.join("shader.frag");
        // No trailing newline on the last line.
        std::fs::write(&vertex, VERTEX.trim_end()).unwrap();
        std::fs::write(&fragment, FRAGMENT).unwrap();

        assert_eq!(read_shader_file(&vertex).unwrap(), VERTEX);

        let context = Rc::new(RecordingContext::new());
        let mut pipeline = ShaderPipeline::from_files(context, &vertex, &fragment).unwrap();
        assert!(pipeline.uniform_location("uModel").is_some());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn bundled_shaders_link() {
        let res = Path::new(env!("CARGO_MANIFEST_DIR")).join("res");
        let context = Rc::new(RecordingContext::new());

        for vertex in ["shader.vert", "instanced.vert"] {
            let mut pipeline = ShaderPipeline::from_files(
                context.clone(),
                res.join(vertex),
                res.join("shader.frag"),
            )
            .unwrap();
            assert!(pipeline.uniform_location("uModel").is_some());
            assert!(pipeline.uniform_location("uViewProj").is_some());
        }
    }

    #[test]
    fn missing_shader_file() {
        let context = Rc::new(RecordingContext::new());
        let err = ShaderPipeline::from_files(
            context,
            "/nonexistent/gl-tutorials/shader.vert",
            "/nonexistent/gl-tutorials/shader.frag",
        )
        .unwrap_err();

        match err {
            Error::ShaderFile { path, source } => {
                assert_eq!(path, Path::new("/nonexistent/gl-tutorials/shader.vert"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
