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

//! A lit cube seen through a perspective camera whose field of view is set from the overlay.

include!("util/setup.rs");

use gl_tutorials::egui;
use gl_tutorials::{shapes, transform, App, AppConfig, AppEvent, ShaderPipeline};

const VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec3 aNormal;
out vec3 vLocalPos;
out vec3 vNormal;
uniform mat4 uProj;

void main() {
    gl_Position = uProj * vec4(aPos + vec3(0.0, 0.0, -2.0), 1.0);
    vLocalPos = aPos;
    vNormal = aNormal;
}
";

const FRAGMENT: &str = "#version 330 core
in vec3 vLocalPos;
in vec3 vNormal;
out vec4 FragColor;

void main() {
    float light = abs(dot(vNormal, normalize(vec3(0.3, -0.2, 0.8))));
    FragColor = vec4(vLocalPos + vec3(0.5), 1.0) * light;
}
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init();

    let mut app = App::new(AppConfig::from_env())?;
    let mut pipeline = ShaderPipeline::new(app.gpu(), VERTEX, FRAGMENT)?;
    let cube = shapes::cube().build(app.gpu())?;
    let mut fov = 1.0f32;

    while app.is_running() {
        for event in app.poll_events() {
            if event == AppEvent::Quit {
                app.exit();
            }
        }

        let size = app.size();
        let aspect = (size.width / size.height.max(1.0)) as f32;

        let overlay = app.begin_frame();
        egui::Window::new("Camera").show(overlay, |ui| {
            ui.add(egui::Slider::new(&mut fov, 0.0..=3.0).text("FOV"));
        });

        pipeline.bind();
        pipeline.set_uniform_mat4(
            "uProj",
            &transform::perspective(fov.max(0.01), aspect, 0.1, 10.0),
        );
        cube.draw();

        app.end_frame()?;
    }

    Ok(())
}
