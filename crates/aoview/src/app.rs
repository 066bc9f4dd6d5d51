//! Window and input handling.

use std::sync::Arc;

use log::info;
use pollster::FutureExt as _;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use aoview_core::{MeshBuffer, ViewerSettings};
use aoview_render::RenderEngine;

/// The viewer application.
///
/// Drag with the left button to pan, the middle button to dolly, and the
/// right button to orbit. `A` toggles ambient occlusion, the up and down
/// arrows double and halve its radius, `Q` or escape quits.
pub struct App {
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine>,
    settings: ViewerSettings,
    /// Prepared mesh waiting for the engine to come up.
    pending_mesh: Option<MeshBuffer>,
    cursor: (f64, f64),
    /// Button currently driving a camera drag.
    active_button: Option<MouseButton>,
}

impl App {
    #[must_use]
    pub fn new(mesh: MeshBuffer) -> Self {
        Self {
            window: None,
            engine: None,
            settings: ViewerSettings::default(),
            pending_mesh: Some(mesh),
            cursor: (0.0, 0.0),
            active_button: None,
        }
    }

    fn handle_drag(&mut self, dx: f32, dy: f32) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        match self.active_button {
            Some(MouseButton::Left) => engine.camera.pan(dx, dy),
            Some(MouseButton::Middle) => engine.camera.dolly(dx),
            Some(MouseButton::Right) => engine.camera.orbit(dx, dy),
            _ => {}
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        match code {
            KeyCode::KeyA => {
                self.settings.ao.toggle();
                info!(
                    "ambient occlusion {}",
                    if self.settings.ao.enabled { "on" } else { "off" }
                );
            }
            KeyCode::ArrowUp => {
                self.settings.ao.double_radius();
                info!("occlusion radius {}", self.settings.ao.radius);
            }
            KeyCode::ArrowDown => {
                self.settings.ao.halve_radius();
                info!("occlusion radius {}", self.settings.ao.radius);
            }
            KeyCode::KeyQ | KeyCode::Escape => event_loop.exit(),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        // Fixed-size viewer; the resize path below only handles DPI changes
        // and platforms that ignore this hint.
        let window_attributes = Window::default_attributes()
            .with_title("aoview")
            .with_inner_size(LogicalSize::new(1024, 768))
            .with_resizable(false);

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .expect("failed to create window"),
        );

        let mut engine = RenderEngine::new(window.clone(), &self.settings)
            .block_on()
            .expect("failed to create render engine");

        if let Some(mesh) = self.pending_mesh.take() {
            engine.set_model(mesh);
        }

        info!("controls: left drag pans, middle drag dollies, right drag orbits");
        info!("keys: A toggles occlusion, up/down arrows scale its radius, Q quits");

        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.active_button = Some(button),
                ElementState::Released => {
                    if self.active_button == Some(button) {
                        self.active_button = None;
                    }
                }
            },

            WindowEvent::CursorMoved { position, .. } => {
                #[allow(clippy::cast_possible_truncation)]
                let (dx, dy) = (
                    (position.x - self.cursor.0) as f32,
                    (position.y - self.cursor.1) as f32,
                );
                self.cursor = (position.x, position.y);
                self.handle_drag(dx, dy);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        self.handle_key(event_loop, code);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(engine) = &mut self.engine {
                    if let Err(err) = engine.render(&self.settings) {
                        log::error!("render failed: {err}");
                        event_loop.exit();
                        return;
                    }
                }
                // Continuous redraw.
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}
