use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rewind_history::{
    PositionHistory, PositionSample, Rotator, ShotSynchronizer, Vec3, rewind_location,
};

const TICK: f64 = 1.0 / 60.0;

fn filled_history(max_age: f64, ticks: u32) -> (PositionHistory, f64) {
    let mut history = PositionHistory::new(max_age);
    let mut now = 0.0;
    for i in 0..ticks {
        now = f64::from(i) * TICK;
        let sample = PositionSample::new(
            Vec3::new(i as f32, (i as f32 * 0.1).sin(), 0.0),
            Rotator::ZERO,
            Vec3::X,
            now,
        );
        history.record(sample, now);
    }
    (history, now)
}

fn bench_rewind(c: &mut Criterion) {
    let (history, now) = filled_history(0.3, 600);

    c.bench_function("rewind_location_half_rtt", |b| {
        b.iter(|| rewind_location(black_box(&history), now, Vec3::ZERO, black_box(0.04)))
    });

    c.bench_function("rewind_location_past_history", |b| {
        b.iter(|| rewind_location(black_box(&history), now, Vec3::ZERO, black_box(5.0)))
    });
}

fn bench_record(c: &mut Criterion) {
    c.bench_function("record_and_trim_600_ticks", |b| {
        b.iter(|| filled_history(black_box(0.3), 600))
    });
}

fn bench_shot_sync(c: &mut Criterion) {
    let (history, now) = filled_history(0.3, 600);
    let sync = ShotSynchronizer::new(0.1);
    c.bench_function("delayed_shot_miss", |b| {
        b.iter(|| sync.delayed_shot_found(black_box(&history), now))
    });
}

criterion_group!(benches, bench_rewind, bench_record, bench_shot_sync);
criterion_main!(benches);
