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

//! Window and context settings.

use std::str::FromStr;

/// Environment variable overriding [`AppConfig::width`].
pub const WIDTH_VAR: &str = "GL_TUTORIALS_WIDTH";

/// Environment variable overriding [`AppConfig::height`].
pub const HEIGHT_VAR: &str = "GL_TUTORIALS_HEIGHT";

/// Environment variable overriding [`AppConfig::vsync`].
pub const VSYNC_VAR: &str = "GL_TUTORIALS_VSYNC";

/// Environment variable overriding [`AppConfig::title`].
pub const TITLE_VAR: &str = "GL_TUTORIALS_TITLE";

/// The OpenGL version and profile to ask the platform for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlRequest {
    /// Major version.
    pub major: u8,

    /// Minor version.
    pub minor: u8,

    /// Ask for the core profile instead of the compatibility one.
    pub core_profile: bool,
}

impl Default for GlRequest {
    fn default() -> Self {
        Self {
            major: 3,
            minor: 3,
            core_profile: true,
        }
    }
}

/// Settings for [`App::new`](crate::App::new).
///
/// The defaults are the ones every lesson runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// The window title.
    pub title: String,

    /// Inner width of the window, in logical pixels.
    pub width: u32,

    /// Inner height of the window, in logical pixels.
    pub height: u32,

    /// The requested context.
    pub gl: GlRequest,

    /// Bits of the depth buffer.
    pub depth_bits: u8,

    /// Bits of the stencil buffer.
    pub stencil_bits: u8,

    /// Whether the surface is double buffered.
    pub double_buffer: bool,

    /// Whether buffer swaps wait for the vertical blank.
    pub vsync: bool,

    /// The colour the frame is cleared with.
    pub clear_color: [f32; 4],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "OpenGL Tutorials !".into(),
            width: 650,
            height: 650,
            gl: GlRequest::default(),
            depth_bits: 24,
            stencil_bits: 8,
            double_buffer: true,
            vsync: true,
            clear_color: [1.0, 0.0, 1.0, 1.0],
        }
    }
}

impl AppConfig {
    /// The defaults, with the `GL_TUTORIALS_*` environment variables applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by variable name. Values that do not parse are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(width) = parse_var::<u32>(&lookup, WIDTH_VAR) {
            self.width = width;
        }
        if let Some(height) = parse_var::<u32>(&lookup, HEIGHT_VAR) {
            self.height = height;
        }
        if let Some(Switch(vsync)) = parse_var::<Switch>(&lookup, VSYNC_VAR) {
            self.vsync = vsync;
        }
        if let Some(title) = lookup(TITLE_VAR) {
            self.title = title;
        }
        self
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the inner size of the window.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the requested OpenGL version and profile.
    pub fn with_gl(mut self, gl: GlRequest) -> Self {
        self.gl = gl;
        self
    }

    /// Set the depth and stencil sizes.
    pub fn with_depth_stencil(mut self, depth_bits: u8, stencil_bits: u8) -> Self {
        self.depth_bits = depth_bits;
        self.stencil_bits = stencil_bits;
        self
    }

    /// Turn double buffering on or off.
    pub fn with_double_buffer(mut self, double_buffer: bool) -> Self {
        self.double_buffer = double_buffer;
        self
    }

    /// Turn vsync on or off.
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Set the clear colour.
    pub fn with_clear_color(mut self, clear_color: [f32; 4]) -> Self {
        self.clear_color = clear_color;
        self
    }
}

fn parse_var<T: FromStr>(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let value = lookup(key)?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!("[Config] ignoring {key}={value:?}: {err}");
            None
        }
    }
}

/// An on/off flag as written in the environment.
struct Switch(bool);

impl FromStr for Switch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Ok(Switch(true)),
            "0" | "false" | "off" | "no" => Ok(Switch(false)),
            _ => Err("expected on or off".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn env<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let vars: HashMap<_, _> = vars.iter().copied().collect();
        move |key| vars.get(key).map(|value| value.to_string())
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();

        assert_eq!(config.title, "OpenGL Tutorials !");
        assert_eq!((config.width, config.height), (650, 650));
        assert_eq!(config.gl, GlRequest::default());
        assert_eq!((config.gl.major, config.gl.minor), (3, 3));
        assert!(config.gl.core_profile);
        assert_eq!((config.depth_bits, config.stencil_bits), (24, 8));
        assert!(config.double_buffer && config.vsync);
        assert_eq!(config.clear_color, [1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn overrides_apply() {
        let config = AppConfig::default().with_overrides(env(&[
            (WIDTH_VAR, "800"),
            (HEIGHT_VAR, " 600 "),
            (VSYNC_VAR, "off"),
            (TITLE_VAR, "Cubes"),
        ]));

        assert_eq!((config.width, config.height), (800, 600));
        assert!(!config.vsync);
        assert_eq!(config.title, "Cubes");
    }

    #[test]
    fn malformed_overrides_are_ignored() {
        let config = AppConfig::default()
            .with_overrides(env(&[(WIDTH_VAR, "wide"), (VSYNC_VAR, "maybe")]));

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn setters() {
        let config = AppConfig::default()
            .with_title("Square")
            .with_size(320, 240)
            .with_depth_stencil(16, 0)
            .with_vsync(false)
            .with_double_buffer(false)
            .with_clear_color([0.0, 0.0, 0.0, 1.0])
            .with_gl(GlRequest {
                major: 4,
                minor: 1,
                core_profile: true,
            });

        assert_eq!(config.title, "Square");
        assert_eq!((config.width, config.height), (320, 240));
        assert_eq!((config.depth_bits, config.stencil_bits), (16, 0));
        assert!(!config.vsync && !config.double_buffer);
        assert_eq!(config.gl.major, 4);
    }
}
