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

//! The error type shared by every part of the crate.

use crate::backend::ShaderStage;

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type with [`Error`] as the default error.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error that stops a lesson from running.
///
/// Apart from [`Error::NotInstanced`] and [`Error::InstanceComponents`], which report misuse
/// of a [`Mesh`](crate::Mesh), all of these are fatal: the diagnostic is logged where it
/// happens and the error is meant to be propagated out of `main`.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Another [`App`](crate::App) (or [`AppToken`](crate::AppToken)) is still alive.
    AlreadyRunning,

    /// The windowing system, the display or the OpenGL context could not be set up.
    Platform {
        /// The step that failed.
        stage: &'static str,

        /// The message reported by the platform.
        message: String,
    },

    /// The OpenGL context is older than 3.3 core (or 3.0 ES).
    UnsupportedVersion {
        /// Major version reported by the driver.
        major: u32,

        /// Minor version reported by the driver.
        minor: u32,

        /// Whether the context is OpenGL ES.
        embedded: bool,
    },

    /// A shader stage did not compile.
    Compile {
        /// The stage that failed.
        stage: ShaderStage,

        /// The compiler's info log.
        log: String,
    },

    /// The program did not link.
    Link {
        /// The linker's info log.
        log: String,
    },

    /// A shader file could not be read.
    ShaderFile {
        /// The path that was read.
        path: PathBuf,

        /// The underlying I/O error.
        source: io::Error,
    },

    /// The driver refused to create an object.
    Allocation(String),

    /// A mesh was given attribute arrays of different lengths.
    VertexCount {
        /// The attribute slot with the mismatched array.
        slot: u32,

        /// The number of vertices in the position array.
        expected: usize,

        /// The number of vertices in this array.
        found: usize,
    },

    /// An attribute (or the instance attribute) has a component count outside `1..=4`.
    InvalidComponents {
        /// The attribute slot.
        slot: u32,

        /// The component count that was requested.
        found: usize,
    },

    /// A mesh needs more attribute slots than [`MAX_ATTRIBUTES`](crate::MAX_ATTRIBUTES).
    TooManyAttributes(usize),

    /// An instance was added to a mesh built without an instance attribute.
    NotInstanced,

    /// An instance element had the wrong number of components.
    InstanceComponents {
        /// Components per instance declared when building the mesh.
        expected: usize,

        /// Components in the element that was passed.
        found: usize,
    },

    /// The overlay or the window surface failed while presenting a frame.
    Present(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AlreadyRunning => f.write_str("an application is already running"),
            Error::Platform { stage, message } => write!(f, "{stage} failed: {message}"),
            Error::UnsupportedVersion {
                major,
                minor,
                embedded,
            } => write!(
                f,
                "OpenGL {}{major}.{minor} is too old, 3.3 core (or 3.0 ES) is required",
                if *embedded { "ES " } else { "" }
            ),
            Error::Compile { stage, log } => write!(f, "{stage} shader compilation failed: {log}"),
            Error::Link { log } => write!(f, "pipeline link failed: {log}"),
            Error::ShaderFile { path, source } => {
                write!(f, "cannot read shader {}: {source}", path.display())
            }
            Error::Allocation(message) => write!(f, "gl error: {message}"),
            Error::VertexCount {
                slot,
                expected,
                found,
            } => write!(
                f,
                "attribute {slot} has {found} vertices but the positions have {expected}"
            ),
            Error::InvalidComponents { slot, found } => write!(
                f,
                "attribute {slot} has {found} components, expected 1 to 4"
            ),
            Error::TooManyAttributes(count) => write!(
                f,
                "{count} attribute slots requested, at most {} are supported",
                crate::MAX_ATTRIBUTES
            ),
            Error::NotInstanced => f.write_str("mesh has no instance attribute"),
            Error::InstanceComponents { expected, found } => write!(
                f,
                "instance element has {found} components, expected {expected}"
            ),
            Error::Present(message) => write!(f, "failed to present frame: {message}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ShaderFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Allocation(message)
    }
}
