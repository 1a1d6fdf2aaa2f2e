use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pop_map::map::RegionIndex;
use pop_map::ranking::RegionRanker;
use pop_map::region::{DistanceUnit, Region, RegionSet, Shape};
use std::sync::Arc;

/// Grid of half-degree squares over the continental US, about county count
fn county_grid() -> RegionSet {
    let mut regions = Vec::new();
    for row in 0..55 {
        for col in 0..55 {
            let lon = -124.0 + col as f64 * 1.05;
            let lat = 25.0 + row as f64 * 0.44;
            let population = ((row * 7919 + col * 104_729) % 250_000) as f64;
            regions.push(Region::new(
                format!("{row:02}{col:03}"),
                Some(population),
                Shape::rect(lon, lat, lon + 1.05, lat + 0.44),
            ));
        }
    }
    RegionSet::new(regions).expect("grid ids are unique")
}

fn bench_ranking(c: &mut Criterion) {
    let regions = Arc::new(county_grid());
    let ranker = RegionRanker::new(regions.clone(), 8_336_817.0, DistanceUnit::Miles);
    let query = regions.get("27027").expect("grid center");

    c.bench_function("rank_by_distance_3025", |b| {
        b.iter(|| ranker.rank_by_distance(black_box(query)))
    });

    c.bench_function("query_3025", |b| b.iter(|| ranker.query(black_box(query))));
}

fn bench_hit_test(c: &mut Criterion) {
    let regions = county_grid();
    let index = RegionIndex::build(&regions, 1.0);

    c.bench_function("region_at", |b| {
        b.iter(|| index.region_at(&regions, black_box(-97.3), black_box(37.1)))
    });
}

criterion_group!(benches, bench_ranking, bench_hit_test);
criterion_main!(benches);
