//! End-to-end frame pipeline scenarios against the software device.
//!
//! These tests drive real `render_frame` calls from one thread while a
//! second thread plays the GPU, firing completions with a lag, the way a
//! real device's completion callbacks arrive.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use orbit_engine::gpu::software::{SoftwareDevice, SoftwareSurface, SubmissionRecord};
use orbit_engine::render::{BindingMode, Renderer, RendererConfig};

/// Address bound at the instance-array slot of a submission's draw
fn instance_address(record: &SubmissionRecord) -> u64 {
    record.draws[0]
        .vertex_buffers
        .iter()
        .find(|(slot, _)| *slot == 1)
        .map(|(_, address)| *address)
        .expect("instance binding present")
}

#[test]
fn test_ten_frames_three_in_flight() {
    const FRAMES: usize = 10;
    const IN_FLIGHT: usize = 3;

    let device = SoftwareDevice::new();
    let surface = SoftwareSurface::new();
    let mut renderer = Renderer::new(
        device.clone(),
        RendererConfig {
            instance_count: 512,
            frames_in_flight: IN_FLIGHT,
            binding_mode: BindingMode::Direct,
        },
    )
    .expect("renderer");

    let render_surface = surface.clone();
    let composer = thread::spawn(move || {
        for _ in 0..FRAMES {
            renderer.render_frame(&render_surface).expect("frame");
        }
    });

    // Play the GPU: complete submissions in order, lagging behind the CPU
    // so the pacer actually gates frames.
    let mut records = Vec::new();
    while records.len() < FRAMES {
        thread::sleep(Duration::from_millis(2));
        if let Some(record) = device.complete_oldest_submission() {
            records.push(record);
        }
    }
    composer.join().expect("composer thread");

    // Exactly ten generations were presented and committed
    assert_eq!(surface.presented_frames(), FRAMES);
    assert_eq!(device.pending_submissions(), 0);

    // Every generation's instance data is distinct (the angle advanced)
    let generations: HashSet<Vec<u8>> = records
        .iter()
        .map(|record| record.buffer_snapshots[&instance_address(record)].clone())
        .collect();
    assert_eq!(generations.len(), FRAMES);

    // Slots were reused round-robin: each of the three slots carried
    // floor(10/3) or ceil(10/3) frames
    let mut reuse: HashMap<u64, usize> = HashMap::new();
    for record in &records {
        *reuse.entry(instance_address(record)).or_insert(0) += 1;
    }
    assert_eq!(reuse.len(), IN_FLIGHT);
    for (&address, &count) in &reuse {
        assert!(
            count == FRAMES / IN_FLIGHT || count == FRAMES / IN_FLIGHT + 1,
            "slot {address:#x} reused {count} times"
        );
    }

    // No slot was ever rewritten while its previous generation's GPU read
    // was still pending
    assert!(device.violations().is_empty(), "{:?}", device.violations());
}

#[test]
fn test_composer_blocks_when_gate_is_full() {
    const IN_FLIGHT: usize = 3;

    let device = SoftwareDevice::new();
    let surface = SoftwareSurface::new();
    let mut renderer = Renderer::new(
        device.clone(),
        RendererConfig {
            instance_count: 16,
            frames_in_flight: IN_FLIGHT,
            binding_mode: BindingMode::Direct,
        },
    )
    .expect("renderer");

    let (done_tx, done_rx) = mpsc::channel();
    let render_surface = surface.clone();
    let composer = thread::spawn(move || {
        // One more frame than the gate admits; the last must block until a
        // completion arrives.
        for _ in 0..=IN_FLIGHT {
            renderer.render_frame(&render_surface).expect("frame");
        }
        done_tx.send(()).expect("send");
    });

    // With no completions fired, the composer must not finish
    assert!(
        done_rx.recv_timeout(Duration::from_millis(200)).is_err(),
        "fourth frame was submitted with three still in flight"
    );
    assert_eq!(device.pending_submissions(), IN_FLIGHT);

    // One completion unblocks exactly the gated frame
    device.complete_oldest_submission().expect("submission");
    done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("composer never unblocked");
    composer.join().expect("composer thread");

    assert_eq!(device.pending_submissions(), IN_FLIGHT);
    device.drain_submissions();
    assert_eq!(surface.presented_frames(), IN_FLIGHT + 1);
    assert!(device.violations().is_empty());
}

#[test]
fn test_argument_table_pipeline_runs_clean() {
    const FRAMES: usize = 5;

    let device = SoftwareDevice::new();
    let surface = SoftwareSurface::new();
    let mut renderer = Renderer::new(
        device.clone(),
        RendererConfig {
            instance_count: 64,
            frames_in_flight: 2,
            binding_mode: BindingMode::ArgumentTable,
        },
    )
    .expect("renderer");

    let render_surface = surface.clone();
    let composer = thread::spawn(move || {
        for _ in 0..FRAMES {
            renderer.render_frame(&render_surface).expect("frame");
        }
    });

    let mut records = Vec::new();
    while records.len() < FRAMES {
        thread::sleep(Duration::from_millis(1));
        if let Some(record) = device.complete_oldest_submission() {
            records.push(record);
        }
    }
    composer.join().expect("composer thread");

    for record in &records {
        // Indirectly-referenced geometry is declared on every draw
        assert_eq!(record.draws[0].used_resources.len(), 2);
    }
    assert_eq!(surface.presented_frames(), FRAMES);
    assert!(device.violations().is_empty());
}
