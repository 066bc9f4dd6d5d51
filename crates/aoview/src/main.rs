//! PLY mesh viewer with screen-space ambient occlusion.

mod app;

use log::warn;
use winit::event_loop::EventLoop;

use aoview_core::MeshBuffer;

use crate::app::App;

const DEFAULT_MODEL: &str = "resources/bun_zipper.ply";

fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    // A missing or broken model is not fatal; the viewer runs without it.
    let mesh = match aoview_core::load_ply(&path) {
        Ok(raw) => raw.prepare(),
        Err(err) => {
            warn!("could not load {path}: {err}");
            MeshBuffer::default()
        }
    };

    let event_loop = EventLoop::new().expect("failed to create event loop");
    let mut app = App::new(mesh);
    event_loop.run_app(&mut app).expect("event loop error");
}
