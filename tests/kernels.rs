extern crate framekernels;
extern crate rand;

use framekernels::escape::{in_main_bulbs, Escape};
use framekernels::{FractalEngine, KernelError, NBodyEngine, MAX_BODIES, MAX_ITERATIONS};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn cardioid_center_renders_black() {
    let mut engine = FractalEngine::new();
    engine.init(100, 100).unwrap();
    engine.set_view(-0.7, 0.0, 1.0).unwrap();
    engine.render_full().unwrap();
    let offset = (50 * 100 + 50) * 4;
    assert_eq!(&engine.output_buffer().unwrap()[offset..offset + 4], &[0u8, 0, 0, 255]);
}

#[test]
fn escaping_pixels_have_counts_under_the_cap() {
    let mut engine = FractalEngine::new();
    engine.init(40, 30).unwrap();
    engine.set_view(-0.75, 0.1, 2.0).unwrap();
    engine.render_full().unwrap();
    let mut escaped = 0;
    for py in 0..30 {
        for px in 0..40 {
            if let Escape::Escaped { iterations, .. } = engine.escape_at(px, py).unwrap() {
                assert!(iterations < MAX_ITERATIONS);
                assert!(!in_main_bulbs(engine.point_at(px, py).unwrap()));
                escaped += 1;
            }
        }
    }
    assert!(escaped > 0);
}

#[test]
fn bands_and_threads_match_the_full_frame() {
    let mut full = FractalEngine::new();
    full.init(90, 70).unwrap();
    full.zoom_view(5.0, 20.0, 20.0).unwrap();
    full.render_full().unwrap();

    let mut banded = FractalEngine::new();
    banded.init(90, 70).unwrap();
    banded.zoom_view(5.0, 20.0, 20.0).unwrap();
    for region in framekernels::regions::partition(70, 6) {
        banded.render_region(region.start, region.end).unwrap();
    }
    assert_eq!(full.output_buffer().unwrap(), banded.output_buffer().unwrap());

    let mut threaded = FractalEngine::new();
    threaded.init(90, 70).unwrap();
    threaded.zoom_view(5.0, 20.0, 20.0).unwrap();
    threaded.render_parallel(4).unwrap();
    assert_eq!(full.output_buffer().unwrap(), threaded.output_buffer().unwrap());
}

#[test]
fn zoom_and_unzoom_round_trip() {
    let mut engine = FractalEngine::new();
    engine.init(300, 200).unwrap();
    engine.set_view(-1.25, 0.3, 12.0).unwrap();
    engine.zoom_view(8.0, 250.0, 12.0).unwrap();
    engine.zoom_view(1.0 / 8.0, 250.0, 12.0).unwrap();
    assert!((engine.center_x() + 1.25).abs() < 1e-9);
    assert!((engine.center_y() - 0.3).abs() < 1e-9);
    assert!((engine.zoom() - 12.0).abs() < 1e-9);
}

#[test]
fn engines_are_independent() {
    let mut a = FractalEngine::new();
    let mut b = FractalEngine::new();
    a.init(10, 10).unwrap();
    b.init(20, 5).unwrap();
    a.set_view(0.3, 0.3, 4.0).unwrap();
    assert_eq!(b.zoom(), 1.0);
    assert_eq!(b.output_buffer().unwrap().len(), 20 * 5 * 4);
}

#[test]
fn too_many_bodies_are_clamped() {
    let mut engine = NBodyEngine::seeded(10);
    engine.init(800, 600, MAX_BODIES * 3).unwrap();
    assert_eq!(engine.body_count(), MAX_BODIES);
}

#[test]
fn bodies_stay_on_the_canvas() {
    let mut engine = NBodyEngine::seeded(77);
    engine.init(320, 240, 30).unwrap();
    engine.set_time_step(0.25);
    for _ in 0..150 {
        engine.step().unwrap();
        for entry in engine.export_snapshot().unwrap() {
            assert!(entry.x >= 0.0 && entry.x <= 320.0);
            assert!(entry.y >= 0.0 && entry.y <= 240.0);
        }
    }
}

#[test]
fn seeded_initialisation_is_reproducible() {
    let mut a = NBodyEngine::seeded(5);
    let mut b = NBodyEngine::new();
    a.init(800, 600, 2).unwrap();
    b.init_with_rng(800, 600, 2, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(a.export_flat().unwrap(), b.export_flat().unwrap());
}

#[test]
fn uninitialised_engines_refuse_to_work() {
    let mut fractal = FractalEngine::new();
    let mut bodies = NBodyEngine::seeded(0);
    assert_eq!(fractal.render_full(), Err(KernelError::Uninitialized("render_full")));
    assert_eq!(bodies.step(), Err(KernelError::Uninitialized("step")));
    assert_eq!(
        FractalEngine::new().init(4, 0),
        Err(KernelError::InvalidDimension { width: 4, height: 0 })
    );
}
