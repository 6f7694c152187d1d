//! Headless orbit demo
//!
//! Drives the instanced frame pipeline against the software device for a
//! fixed number of frames, with a separate thread playing the GPU and
//! firing completion callbacks. This is the external driving loop the
//! engine itself treats as out of scope, reduced to its minimum.
//!
//! Usage: `orbit_headless [frame-count]` (default 300). Set `RUST_LOG` to
//! control verbosity.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use orbit_engine::gpu::software::{SoftwareDevice, SoftwareSurface};
use orbit_engine::render::{Renderer, RendererConfig};

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let frames: usize = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(300);

    log::info!("starting headless orbit demo: {frames} frames");

    let device = SoftwareDevice::new();
    let surface = SoftwareSurface::new();
    let mut renderer = match Renderer::new(device.clone(), RendererConfig::default()) {
        Ok(renderer) => renderer,
        Err(error) => {
            log::error!("renderer construction failed: {error}");
            std::process::exit(1);
        }
    };

    // Completion thread: plays the GPU, finishing the oldest submission
    // with a small lag so several frames stay in flight.
    let stop = Arc::new(AtomicBool::new(false));
    let completer = {
        let device = device.clone();
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            loop {
                thread::sleep(Duration::from_micros(500));
                if device.complete_oldest_submission().is_none()
                    && stop.load(Ordering::Acquire)
                {
                    break;
                }
            }
        })
    };

    let start = Instant::now();
    for _ in 0..frames {
        if let Err(error) = renderer.render_frame(&surface) {
            log::error!("frame submission failed: {error}");
            std::process::exit(1);
        }
    }
    stop.store(true, Ordering::Release);
    if completer.join().is_err() {
        log::error!("completion thread panicked");
        std::process::exit(1);
    }
    let elapsed = start.elapsed();

    let violations = device.violations();
    if !violations.is_empty() {
        for violation in &violations {
            log::error!("{violation}");
        }
        std::process::exit(1);
    }

    log::info!(
        "presented {} frames in {:.1?} ({:.0} fps equivalent)",
        surface.presented_frames(),
        elapsed,
        surface.presented_frames() as f64 / elapsed.as_secs_f64()
    );
}
