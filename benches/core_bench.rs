use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{DVec2, DVec3};
use std::hint::black_box;
use terrain_measure_editor::app::{
    measure_segment, InputEvent, InputKind, MeasureCommand, MeasureController, PickedFeature,
};
use terrain_measure_editor::core::PointIndex;
use terrain_measure_editor::{
    FeatureId, FeatureKind, Heightmap, InMemoryRegistry, Measure, MeasureMode, MeasureOptions,
    MeasureState, MeasureStatus, RecordingSurface, WorldBounds,
};

/// Sinusförmiges Gelände als Raster (256x256, 2048 m Kantenlänge).
fn build_heightmap() -> Heightmap {
    let size = 256u32;
    let pixels: Vec<f32> = (0..size * size)
        .map(|i| {
            let x = (i % size) as f32 / size as f32;
            let y = (i / size) as f32 / size as f32;
            0.5 + 0.25 * (x * 12.0).sin() * (y * 9.0).cos()
        })
        .collect();
    Heightmap::from_grid(pixels, size, size, WorldBounds::from_map_size(2048.0), 120.0)
        .expect("Raster ist gültig")
}

fn bench_segment_measurement(c: &mut Criterion) {
    let terrain = build_heightmap();
    let options = MeasureOptions::default();
    let mut group = c.benchmark_group("segment_measurement");

    for &length in &[100.0f64, 1000.0, 5000.0] {
        let start = DVec3::new(-400.0, -300.0, 0.0);
        let end = start + DVec3::new(length, length * 0.5, 0.0);
        group.bench_with_input(BenchmarkId::new("ground", length as u64), &end, |b, end| {
            b.iter(|| {
                let m = measure_segment(
                    &terrain,
                    &options,
                    black_box(start),
                    black_box(*end),
                    MeasureMode::Distance.metric(),
                );
                black_box(m.distance)
            })
        });
    }

    group.finish();
}

fn build_measures(count: usize) -> Vec<Measure> {
    (0..count)
        .map(|i| {
            let mut measure = Measure::new(i as u64 + 1, MeasureMode::Distance, i as u32 + 1);
            let base = DVec3::new((i % 100) as f64 * 20.0, (i / 100) as f64 * 20.0, 0.0);
            measure.coordinates = (0..5)
                .map(|k| base + DVec3::new(k as f64 * 3.0, (k % 2) as f64 * 2.0, 0.0))
                .collect();
            measure.status = MeasureStatus::Completed;
            measure
        })
        .collect()
}

fn bench_point_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_index");

    for &count in &[1_000usize, 10_000usize] {
        let measures = build_measures(count);
        group.bench_with_input(BenchmarkId::new("rebuild", count), &measures, |b, measures| {
            b.iter(|| black_box(PointIndex::from_measures(measures.iter()).len()))
        });

        let index = PointIndex::from_measures(measures.iter());
        group.bench_with_input(BenchmarkId::new("duplicate_check", count), &index, |b, index| {
            b.iter(|| {
                let mut hits = 0usize;
                for i in 0..1024 {
                    let query = DVec3::new((i % 100) as f64 * 20.0 + 0.1, (i / 10) as f64, 0.0);
                    if index.has_point_within(black_box(query), 0.3) {
                        hits += 1;
                    }
                }
                black_box(hits)
            })
        });
    }

    group.finish();
}

fn bench_drag_updates(c: &mut Criterion) {
    let mut state = MeasureState::with_id_seed(MeasureOptions::default(), 1);
    let mut controller =
        MeasureController::new(RecordingSurface::new(), build_heightmap(), InMemoryRegistry::new());
    controller.set_mode(&mut state, MeasureMode::Area);
    for point in [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(300.0, 0.0, 0.0),
        DVec3::new(300.0, 300.0, 0.0),
        DVec3::new(0.0, 300.0, 0.0),
    ] {
        controller.handle_input(&mut state, &InputEvent::click(point));
    }
    controller.handle_command(&mut state, MeasureCommand::Finalize { position: None });
    let id = *state.measures.keys().last().expect("Messung angelegt");
    let pick = PickedFeature {
        id: FeatureId::new(MeasureMode::Area, FeatureKind::Point, id).to_string(),
        primitive: state.visuals.get(id).and_then(|v| v.points.first().copied()),
    };

    c.bench_function("drag_closing_point_64_moves", |b| {
        b.iter(|| {
            let start = InputEvent::new(InputKind::DragStart, Some(DVec3::ZERO), DVec2::ZERO)
                .with_pick(pick.clone());
            controller.handle_input(&mut state, &start);
            for step in 1..=64 {
                let offset = step as f64;
                let event = InputEvent::new(
                    InputKind::DragMove,
                    Some(DVec3::new(-offset, -offset, 0.0)),
                    DVec2::new(offset * 4.0, 0.0),
                );
                controller.handle_input(&mut state, black_box(&event));
            }
            // Zurück auf den Ausgangspunkt, damit jede Iteration gleich startet
            let end =
                InputEvent::new(InputKind::DragEnd, Some(DVec3::ZERO), DVec2::new(256.0, 0.0));
            black_box(controller.handle_input(&mut state, &end).len())
        })
    });
}

criterion_group!(
    core_benches,
    bench_segment_measurement,
    bench_point_index,
    bench_drag_updates
);
criterion_main!(core_benches);
