use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tagyou_tracker::services::gazetteer::Gazetteer;

fn benchmark_resolve_area(c: &mut Criterion) {
    // Load the real landmarks once
    let gazetteer = Gazetteer::load_from_file("data/carnival_landmarks.geojson")
        .expect("Failed to load landmarks");

    // A point inside the carnival footprint (Ladbroke Grove)
    let inside = (51.5172, -0.2107);
    // A point far away (forces a full scan to the fallback)
    let outside = (37.7749, -122.4194);

    let mut group = c.benchmark_group("resolve_area");

    group.bench_function("inside_carnival", |b| {
        b.iter(|| gazetteer.resolve_area(black_box(inside.0), black_box(inside.1)))
    });

    group.bench_function("far_away_fallback", |b| {
        b.iter(|| gazetteer.resolve_area(black_box(outside.0), black_box(outside.1)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_resolve_area);
criterion_main!(benches);
