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

//! The first lesson: one orange triangle, positions only.

include!("util/setup.rs");

use gl_tutorials::{shapes, App, AppConfig, AppEvent, ShaderPipeline};

const VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 aPos;

void main() {
    gl_Position = vec4(aPos, 1.0);
}
";

const FRAGMENT: &str = "#version 330 core
out vec4 FragColor;

void main() {
    FragColor = vec4(1.0, 0.5, 0.2, 1.0);
}
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init();

    let mut app = App::new(AppConfig::from_env())?;
    let pipeline = ShaderPipeline::new(app.gpu(), VERTEX, FRAGMENT)?;
    let triangle = shapes::triangle().build(app.gpu())?;

    while app.is_running() {
        for event in app.poll_events() {
            if event == AppEvent::Quit {
                app.exit();
            }
        }

        app.begin_frame();

        pipeline.bind();
        triangle.draw();

        app.end_frame()?;
    }

    Ok(())
}
