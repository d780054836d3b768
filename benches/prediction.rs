//! Motion Prediction Benchmarks
//!
//! Measures per-event update cost and prediction cost for each strategy
//! across stroke shapes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lamco_motion_predict::event::{MotionEvent, PointerAction, PointerCoords};
use lamco_motion_predict::predictor::{MotionEventPredictor, PredictorConfig, PredictorStrategy};
use lamco_motion_predict::PointerKalmanFilter;

/// Generate a stroke sampled every 8ms
fn generate_stroke(len: usize, curved: bool) -> Vec<MotionEvent> {
    (0..len)
        .map(|i| {
            let t = i as f32;
            let (x, y) = if curved {
                (100.0 * (t * 0.05).cos(), 100.0 * (t * 0.05).sin())
            } else {
                (t * 4.0, t * 2.0)
            };
            let action = if i == 0 {
                PointerAction::Down
            } else {
                PointerAction::Move
            };
            MotionEvent::single(action, 0, i as i64 * 8, PointerCoords::new(x, y, 0.8))
        })
        .collect()
}

fn predictor_for(strategy: PredictorStrategy) -> MotionEventPredictor {
    let config = PredictorConfig {
        strategy,
        ..Default::default()
    };
    MotionEventPredictor::new(&config).unwrap()
}

/// Benchmark raw filter updates
fn bench_filter_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("kalman_filter_update");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("1000_samples", |b| {
        b.iter(|| {
            let mut filter = PointerKalmanFilter::default();
            for i in 0..1000 {
                let t = i as f64;
                filter.update(black_box(t * 3.0), black_box(t * 1.5), 0.8);
            }
            black_box(filter.state())
        })
    });

    group.finish();
}

/// Benchmark record + predict per event, as a renderer calls it every frame
fn bench_record_and_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_and_predict");

    for strategy in [PredictorStrategy::Kalman, PredictorStrategy::Linear] {
        for (name, curved) in [("straight", false), ("curved", true)] {
            let stroke = generate_stroke(240, curved);
            group.throughput(Throughput::Elements(stroke.len() as u64));

            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), name),
                &stroke,
                |b, stroke| {
                    b.iter(|| {
                        let mut predictor = predictor_for(strategy);
                        for event in stroke {
                            predictor.record(event);
                            black_box(predictor.predict());
                        }
                    })
                },
            );
        }
    }

    group.finish();
}

/// Benchmark padding cost with an explicit report rate
fn bench_padded_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("padded_predict");

    for target_ms in [8, 20, 50] {
        let config = PredictorConfig {
            prediction_target_ms: target_ms,
            report_rate_ms: Some(4),
            ..Default::default()
        };
        let mut predictor = MotionEventPredictor::new(&config).unwrap();
        for event in generate_stroke(60, true) {
            predictor.record(&event);
        }

        group.bench_function(BenchmarkId::new("target_ms", target_ms), |b| {
            b.iter(|| black_box(predictor.predict()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_filter_update,
    bench_record_and_predict,
    bench_padded_predict
);
criterion_main!(benches);
