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

//! An indexed square: four corners, two triangles.

include!("util/setup.rs");

use gl_tutorials::{shapes, App, AppConfig, AppEvent, ShaderPipeline};

const VERTEX: &str = "#version 330 core
layout (location = 0) in vec2 aPos;
layout (location = 1) in vec3 aColor;
out vec3 vColor;

void main() {
    gl_Position = vec4(aPos, 0.0, 1.0);
    vColor = aColor;
}
";

const FRAGMENT: &str = "#version 330 core
in vec3 vColor;
out vec4 FragColor;

void main() {
    FragColor = vec4(vColor, 1.0);
}
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init();

    let mut app = App::new(AppConfig::from_env())?;
    let pipeline = ShaderPipeline::new(app.gpu(), VERTEX, FRAGMENT)?;
    let square = shapes::square().build(app.gpu())?;

    while app.is_running() {
        for event in app.poll_events() {
            if event == AppEvent::Quit {
                app.exit();
            }
        }

        app.begin_frame();

        pipeline.bind();
        square.draw();

        app.end_frame()?;
    }

    Ok(())
}
