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

//! The application shell: one window, one OpenGL context and an overlay UI on top.

use crate::config::AppConfig;
use crate::{Error, GlowContext, GpuContext, Result};

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};

use kurbo::{Point, Size};
use raw_window_handle::HasRawWindowHandle;

use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{Window, WindowBuilder};

use std::fmt;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Whether an [`AppToken`] is alive.
static INSTANTIATED: AtomicBool = AtomicBool::new(false);

const ONE_FRAME: NonZeroU32 = match NonZeroU32::new(1) {
    Some(interval) => interval,
    None => unreachable!(),
};

/// Proof that this is the only application in the process.
///
/// Dropping the token lets another one be acquired.
#[derive(Debug)]
pub struct AppToken {
    _private: (),
}

impl AppToken {
    /// Claim the application slot, failing with [`Error::AlreadyRunning`] while another
    /// token is alive.
    pub fn acquire() -> Result<Self> {
        if INSTANTIATED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::error!("[App] an application is already running");
            return Err(Error::AlreadyRunning);
        }

        Ok(Self { _private: () })
    }
}

impl Drop for AppToken {
    fn drop(&mut self) {
        INSTANTIATED.store(false, Ordering::Release);
    }
}

/// Something the lesson should react to.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum AppEvent {
    /// The user asked to close the window.
    Quit,

    /// A mouse button was pressed outside of the overlay.
    MouseDown {
        /// The button.
        button: MouseButton,

        /// The cursor position in physical pixels, from the top left corner.
        position: Point,
    },

    /// The window was resized, in physical pixels.
    Resized(Size),
}

/// The overlay UI, drawn on top of the lesson.
struct Overlay {
    context: egui::Context,
    state: egui_winit::State,
    painter: egui_glow::Painter,
}

impl Drop for Overlay {
    fn drop(&mut self) {
        self.painter.destroy();
    }
}

/// The application shell.
///
/// Owns the window, the OpenGL context and the overlay, and drives the
/// [`poll_events`](Self::poll_events), [`begin_frame`](Self::begin_frame),
/// [`end_frame`](Self::end_frame) cycle. Meshes and pipelines created from [`App::gpu`] must be
/// dropped before the application.
pub struct App {
    // Fields drop in declaration order, the reverse of construction.
    overlay: Overlay,
    gpu: Rc<GlowContext<glow::Context>>,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
    event_loop: EventLoop<()>,
    _token: AppToken,

    running: bool,
    cursor: Point,
    clear_color: [f32; 4],
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("gpu", &self.gpu)
            .field("window", &self.window.id())
            .field("running", &self.running)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Open the window, create the context and set up the overlay.
    pub fn new(config: AppConfig) -> Result<Self> {
        let token = AppToken::acquire()?;
        let event_loop = EventLoop::new();

        let window_builder = WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_resizable(true);

        let template = ConfigTemplateBuilder::new()
            .with_depth_size(config.depth_bits)
            .with_stencil_size(config.stencil_bits)
            .with_single_buffering(!config.double_buffer);

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_builder(Some(window_builder.clone()))
            .build(&event_loop, template, pick_config)
            .map_err(platform_error("display"))?;

        tracing::debug!(
            "[Window] config: depth {}, stencil {}, samples {}",
            gl_config.depth_size(),
            gl_config.stencil_size(),
            gl_config.num_samples()
        );

        let window = match window {
            Some(window) => window,
            None => glutin_winit::finalize_window(&event_loop, window_builder, &gl_config)
                .map_err(platform_error("window"))?,
        };

        let (surface, context) = create_context(&config, &gl_config, &window)?;

        if let Err(err) = surface.set_swap_interval(&context, swap_interval(config.vsync)) {
            tracing::warn!("[Window] cannot set the swap interval: {err}");
        }

        let display = gl_config.display();
        let gl = Arc::new(unsafe {
            glow::Context::from_loader_function_cstr(|name| {
                display.get_proc_address(name) as *const _
            })
        });

        // SAFETY: the context was made current above and stays current for the life of `App`.
        let gpu = Rc::new(unsafe { GlowContext::from_arc(gl.clone())? });
        let size = window.inner_size();
        gpu.viewport(size.width, size.height);

        let painter = egui_glow::Painter::new(gl, "", None).map_err(platform_error("overlay"))?;
        let mut state = egui_winit::State::new(&event_loop);
        state.set_pixels_per_point(egui_winit::native_pixels_per_point(&window));

        tracing::info!(
            "[App] \"{}\" ready, {}x{} pixels",
            config.title,
            size.width,
            size.height
        );

        Ok(Self {
            overlay: Overlay {
                context: egui::Context::default(),
                state,
                painter,
            },
            gpu,
            surface,
            context,
            window,
            event_loop,
            _token: token,
            running: true,
            cursor: Point::ZERO,
            clear_color: config.clear_color,
        })
    }

    /// Whether the lesson should keep looping.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the loop after this frame.
    pub fn exit(&mut self) {
        self.running = false;
    }

    /// Pump the platform queue once and return what the lesson should react to.
    ///
    /// Every window event goes to the overlay first. Mouse presses the overlay consumed are
    /// not reported.
    pub fn poll_events(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();

        let Self {
            overlay,
            gpu,
            surface,
            context,
            window,
            event_loop,
            cursor,
            ..
        } = self;

        event_loop.run_return(|event, _, control_flow| {
            control_flow.set_poll();

            match event {
                Event::WindowEvent { window_id, event } if window_id == window.id() => {
                    let response = overlay.state.on_event(&overlay.context, &event);

                    if let WindowEvent::Resized(size) = event {
                        if let (Some(width), Some(height)) =
                            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                        {
                            surface.resize(context, width, height);
                            gpu.viewport(size.width, size.height);
                        }
                    }

                    events.extend(translate_event(&event, cursor, response.consumed));
                }
                Event::MainEventsCleared => control_flow.set_exit(),
                _ => {}
            }
        });

        events
    }

    /// Clear the frame and start the overlay's frame.
    ///
    /// Widgets for this frame are declared on the returned context.
    pub fn begin_frame(&mut self) -> &egui::Context {
        self.gpu.reset_state();
        self.gpu.clear(self.clear_color);

        let input = self.overlay.state.take_egui_input(&self.window);
        self.overlay.context.begin_frame(input);
        &self.overlay.context
    }

    /// Draw the overlay on top of the frame and present it.
    pub fn end_frame(&mut self) -> Result<()> {
        let egui::FullOutput {
            platform_output,
            textures_delta,
            shapes,
            ..
        } = self.overlay.context.end_frame();

        self.overlay.state.handle_platform_output(
            &self.window,
            &self.overlay.context,
            platform_output,
        );

        let primitives = self.overlay.context.tessellate(shapes);
        let size = self.window.inner_size();
        self.overlay.painter.paint_and_update_textures(
            [size.width, size.height],
            self.overlay.context.pixels_per_point(),
            &primitives,
            &textures_delta,
        );

        self.surface.swap_buffers(&self.context).map_err(|err| {
            tracing::error!("[Window] cannot present the frame: {err}");
            Error::Present(err.to_string())
        })
    }

    /// The OpenGL context, to build pipelines and meshes with.
    pub fn gpu(&self) -> Rc<GlowContext<glow::Context>> {
        self.gpu.clone()
    }

    /// The window.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// The inner size of the window, in physical pixels.
    pub fn size(&self) -> Size {
        let size = self.window.inner_size();
        Size::new(size.width.into(), size.height.into())
    }
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    match most_samples(configs, |config| config.num_samples()) {
        Some(config) => config,
        None => {
            // The picker cannot return an error.
            tracing::error!("[Window] no config matches the template");
            panic!("the display offered no config matching the template")
        }
    }
}

/// The candidate with the most samples, the first one on ties.
fn most_samples<T>(
    candidates: impl Iterator<Item = T>,
    samples: impl Fn(&T) -> u8,
) -> Option<T> {
    candidates.reduce(|accum, candidate| {
        if samples(&candidate) > samples(&accum) {
            candidate
        } else {
            accum
        }
    })
}

fn create_context(
    config: &AppConfig,
    gl_config: &Config,
    window: &Window,
) -> Result<(Surface<WindowSurface>, PossiblyCurrentContext)> {
    let window_handle = Some(window.raw_window_handle());
    let profile = if config.gl.core_profile {
        GlProfile::Core
    } else {
        GlProfile::Compatibility
    };

    // Fall back to GLES 3.0 when desktop OpenGL is not available.
    let attributes = [
        ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(
                config.gl.major,
                config.gl.minor,
            ))))
            .with_profile(profile)
            .build(window_handle),
        ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(Some(Version::new(3, 0))))
            .build(window_handle),
    ];

    let display = gl_config.display();
    let mut last_error = None;
    let mut not_current = None;
    for attributes in &attributes {
        match unsafe { display.create_context(gl_config, attributes) } {
            Ok(context) => {
                not_current = Some(context);
                break;
            }
            Err(err) => last_error = Some(err),
        }
    }

    let not_current = match (not_current, last_error) {
        (Some(context), _) => context,
        (None, err) => {
            let message = err.map_or_else(|| "no context attributes".into(), |e| e.to_string());
            return Err(platform_error("context")(message));
        }
    };

    let surface_attributes = window.build_surface_attributes(<_>::default());
    let surface = unsafe { display.create_window_surface(gl_config, &surface_attributes) }
        .map_err(platform_error("surface"))?;

    let context = not_current
        .make_current(&surface)
        .map_err(platform_error("make current"))?;

    Ok((surface, context))
}

fn swap_interval(vsync: bool) -> SwapInterval {
    if vsync {
        SwapInterval::Wait(ONE_FRAME)
    } else {
        SwapInterval::DontWait
    }
}

fn platform_error<E: fmt::Display>(stage: &'static str) -> impl Fn(E) -> Error {
    move |err| {
        let message = err.to_string();
        tracing::error!("[Window] {stage} failed: {message}");
        Error::Platform { stage, message }
    }
}

/// Turn a window event into an [`AppEvent`], tracking the cursor on the way.
fn translate_event(
    event: &WindowEvent<'_>,
    cursor: &mut Point,
    consumed_by_overlay: bool,
) -> Option<AppEvent> {
    match event {
        WindowEvent::CloseRequested => Some(AppEvent::Quit),
        WindowEvent::CursorMoved { position, .. } => {
            *cursor = Point::new(position.x, position.y);
            None
        }
        WindowEvent::MouseInput {
            state: ElementState::Pressed,
            button,
            ..
        } if !consumed_by_overlay => Some(AppEvent::MouseDown {
            button: *button,
            position: *cursor,
        }),
        WindowEvent::Resized(size) => Some(AppEvent::Resized(Size::new(
            size.width.into(),
            size.height.into(),
        ))),
        _ => None,
    }
}
