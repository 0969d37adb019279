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

//! Instanced cubes: every click adds one more where the cursor points.

include!("util/setup.rs");

use gl_tutorials::egui;
use gl_tutorials::transform::{self, AnimationClock};
use gl_tutorials::winit::event::MouseButton;
use gl_tutorials::{shapes, App, AppConfig, AppEvent, ShaderPipeline};

/// Half the width of the plane clicks land on, in world units.
const EXTENT: f32 = 6.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init();

    let mut app = App::new(AppConfig::from_env())?;
    let mut pipeline = ShaderPipeline::from_files(
        app.gpu(),
        util::resource("instanced.vert"),
        util::resource("shader.frag"),
    )?;
    let mut cubes = shapes::instanced_cube().build(app.gpu())?;
    cubes.add_instance(&[0.0, 0.0, 0.0])?;
    let mut clock = AnimationClock::default();

    while app.is_running() {
        for event in app.poll_events() {
            match event {
                AppEvent::Quit => app.exit(),
                AppEvent::MouseDown {
                    button: MouseButton::Left,
                    position,
                } => {
                    let world = transform::screen_to_world(position, app.size(), EXTENT);
                    cubes.add_instance(&[world.x, world.y, 1.0])?;
                }
                _ => {}
            }
        }

        let size = app.size();
        let aspect = (size.width / size.height.max(1.0)) as f32;
        let angle = clock.tick();

        let overlay = app.begin_frame();
        egui::Window::new("Cubes").show(overlay, |ui| {
            ui.label(format!("{} instances", cubes.instance_count()));
        });

        pipeline.bind();
        pipeline.set_uniform_mat4("uModel", &transform::model_rotation_y(angle));
        pipeline.set_uniform_mat4("uViewProj", &transform::view_projection(aspect, 10.0));
        cubes.draw();

        app.end_frame()?;
    }

    Ok(())
}
