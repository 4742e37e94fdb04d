//! Platform layer: window, event loop and the per-frame tick.
//!
//! Each frame polls input, advances the scene by the measured dt and submits
//! it to the render sink. Meshes are released once the loop ends.

use std::time::Instant;

use anyhow::Result;
use renderer::RenderSink;
use scene::{Control, Key, KeyAction, Scene};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const WINDOW_TITLE: &str = "Phong Scene";

/// Advance the scene by `dt` seconds and submit one frame.
pub fn tick(scene: &mut Scene, sink: &mut dyn RenderSink, dt: f32) {
    scene.advance(dt);
    scene.submit(sink);
}

/// Run `frames` fixed-step ticks without a window, then release the meshes.
pub fn run_headless(scene: &mut Scene, sink: &mut dyn RenderSink, frames: u32, dt: f32) {
    log::info!("Running {} headless frames at dt={:.4}s", frames, dt);
    for _ in 0..frames {
        tick(scene, sink, dt);
    }
    scene.release(sink);
}

/// Open a window and drive the scene until it is closed or Escape is pressed.
pub fn run_windowed(
    scene: &mut Scene,
    sink: &mut dyn RenderSink,
    width: u32,
    height: u32,
) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|e| anyhow::anyhow!("Failed to create event loop: {e}"))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut player = ScenePlayer {
        scene,
        sink,
        size: PhysicalSize::new(width.max(1), height.max(1)),
        window: None,
        last_frame: Instant::now(),
        error: None,
    };
    let run = event_loop
        .run_app(&mut player)
        .map_err(|e| anyhow::anyhow!("Event loop error: {e:?}"));

    player.scene.release(player.sink);
    run?;
    match player.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct ScenePlayer<'a> {
    scene: &'a mut Scene,
    sink: &'a mut dyn RenderSink,
    size: PhysicalSize<u32>,
    window: Option<Window>,
    last_frame: Instant,
    error: Option<anyhow::Error>,
}

impl ScenePlayer<'_> {
    fn key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(key) = map_key(code) else {
            return;
        };
        let action = match (event.state, event.repeat) {
            (ElementState::Pressed, false) => KeyAction::Press,
            (ElementState::Pressed, true) => KeyAction::Repeat,
            (ElementState::Released, _) => KeyAction::Release,
        };
        if self.scene.handle_key(key, action) == Control::Exit {
            log::info!("Escape pressed. Exiting event loop.");
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for ScenePlayer<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(self.size);
        match event_loop.create_window(attributes) {
            Ok(window) => {
                let size = window.inner_size();
                log::info!("Window created: {}x{}", size.width, size.height);
                self.window = Some(window);
                self.last_frame = Instant::now();
            }
            Err(err) => {
                self.error = Some(anyhow::anyhow!("Failed to create window: {err}"));
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::debug!("Resized: {}x{}", size.width, size.height);
                if size.width > 0 && size.height > 0 {
                    self.size = size;
                    self.scene.set_aspect(size.width as f32 / size.height as f32);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.key(event_loop, &event),
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame).as_secs_f32();
                self.last_frame = now;
                tick(self.scene, self.sink, dt);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Keys the scene reacts to; everything else is ignored.
pub fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Space => Key::Space,
        KeyCode::Tab => Key::Tab,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyE => Key::E,
        KeyCode::Digit1 | KeyCode::Numpad1 => Key::Digit1,
        KeyCode::Digit2 | KeyCode::Numpad2 => Key::Digit2,
        KeyCode::Digit3 | KeyCode::Numpad3 => Key::Digit3,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use renderer::RecordingSink;
    use scene::SceneConfig;

    use super::*;

    #[test]
    fn maps_scene_keys() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(map_key(KeyCode::Numpad2), Some(Key::Digit2));
        assert_eq!(map_key(KeyCode::ArrowUp), Some(Key::Up));
        assert_eq!(map_key(KeyCode::KeyZ), None);
    }

    #[test]
    fn headless_run_submits_every_frame() {
        let mut scene = Scene::from_config(&SceneConfig::default(), 1.0);
        scene.set_animating(true);
        let mut sink = RecordingSink::default();
        run_headless(&mut scene, &mut sink, 5, 0.1);
        assert_eq!(sink.frames.len(), 5);
        assert!((scene.clock() - 0.5).abs() < 1e-5);
    }
}
