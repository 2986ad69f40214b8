//! 跟踪器与计数器基准测试

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use object_counter::detection::tracker::{distance_matrix, greedy_assign};
use object_counter::{
    BBox, Centroid, CentroidTracker, CountingLine, Detection, LineCounter, Tracker,
};

fn create_test_detections(n_detections: usize, n_frames: usize) -> Vec<Vec<Detection>> {
    (0..n_frames)
        .map(|frame| {
            (0..n_detections)
                .map(|i| {
                    let x = (i * 60) as f32;
                    let y = (frame * 5 + i * 7) as f32;
                    Detection::new(BBox::new(x, y, x + 40.0, y + 30.0), 2, 0.8)
                })
                .collect()
        })
        .collect()
}

fn bench_tracker_update(c: &mut Criterion) {
    let frames = create_test_detections(20, 30);

    c.bench_function("centroid_update_20_detections", |b| {
        b.iter_batched(
            || CentroidTracker::new(50, 50.0).unwrap(),
            |mut tracker| {
                for dets in &frames {
                    let _result = tracker.update(black_box(dets));
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_greedy_assign(c: &mut Criterion) {
    let mut group = c.benchmark_group("greedy_assign");
    for size in [10usize, 50, 200] {
        let rows: Vec<Centroid> = (0..size)
            .map(|i| Centroid::new((i * 13 % 640) as f32, (i * 29 % 480) as f32))
            .collect();
        let cols: Vec<Centroid> = rows
            .iter()
            .map(|p| Centroid::new(p.x + 3.0, p.y - 2.0))
            .collect();
        let distances = distance_matrix(&rows, &cols);

        group.bench_with_input(BenchmarkId::from_parameter(size), &distances, |b, d| {
            b.iter(|| greedy_assign(black_box(d), 50.0))
        });
    }
    group.finish();
}

fn bench_count_pipeline(c: &mut Criterion) {
    let frames = create_test_detections(20, 60);

    c.bench_function("track_and_count_60_frames", |b| {
        b.iter(|| {
            let mut tracker = CentroidTracker::new(50, 50.0).unwrap();
            let mut counter = LineCounter::new(CountingLine::at(200.0), [2]);
            for dets in &frames {
                let tracked = tracker.update(dets);
                counter.process(&tracked);
            }
            black_box(counter.state().total())
        })
    });
}

criterion_group!(
    benches,
    bench_tracker_update,
    bench_greedy_assign,
    bench_count_pipeline
);
criterion_main!(benches);
