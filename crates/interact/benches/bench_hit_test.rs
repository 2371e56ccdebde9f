use std::hint::black_box;
use std::time::Instant;

use cavern_common::{CaveConfig, PopulationConfig};
use cavern_input::InputEvent;
use cavern_interact::{LogAudio, LogDisplay, Session};
use cavern_populate::generate;
use cavern_render::{CaveCamera, CpuPicker, ScenePicker};
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn bench_pick(seed: u64, iterations: usize) {
    let cave = generate(&PopulationConfig::default(), &mut SmallRng::seed_from_u64(seed));
    let camera = CaveCamera::default();
    let picker = CpuPicker;

    let start = Instant::now();
    for i in 0..iterations {
        let x = (i % 21) as f32 / 10.0 - 1.0;
        let ray = camera.ray_through(Vec2::new(x, -0.2));
        let _ = black_box(picker.nearest(black_box(&cave.population), &ray));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  pick ({} nodes, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}",
        cave.population.len()
    );
}

fn bench_frame(seed: u64, frames: usize) {
    let cave = generate(&PopulationConfig::default(), &mut SmallRng::seed_from_u64(seed));
    let mut session = Session::new(
        cave.population,
        &CaveConfig::default(),
        LogDisplay::default(),
        LogAudio::default(),
    );

    let start = Instant::now();
    for i in 0..frames {
        let x = ((i as f32) * 0.01).sin();
        session.input(InputEvent::PointerMoved(Vec2::new(x, -0.1)));
        let _ = black_box(session.tick(i as f32 / 60.0));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / frames as u32;
    println!("  full frame ({frames} frames): {per_iter:?}/frame, total {elapsed:?}");
}

fn main() {
    println!("=== Hit-Test Benchmarks ===\n");

    println!("Pointer pick:");
    bench_pick(1, 1000);
    bench_pick(2, 1000);

    println!("\nSession tick (behavior + hover):");
    bench_frame(1, 600);

    println!("\n=== Done ===");
}
