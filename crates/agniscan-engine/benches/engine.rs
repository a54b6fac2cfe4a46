use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use agniscan_core::raster::Raster;
use agniscan_core::GeoTransform;
use agniscan_engine::bands::{Acquisition, Band, BandSet};
use agniscan_engine::pipeline::classify;
use agniscan_engine::severity::ClassifierConfig;
use agniscan_engine::{compute_indices, fuse, threshold};

fn create_band(size: usize, seed: usize) -> Raster<f64> {
    let data: Vec<f64> = (0..size * size)
        .map(|i| {
            let (row, col) = (i / size, i % size);
            ((row * 31 + col * 17 + seed * 7) % 97) as f64 / 97.0 * 0.6
        })
        .collect();
    let mut band = Raster::from_vec(data, size, size).unwrap();
    band.set_transform(GeoTransform::new(500_000.0, 6_000_000.0, 20.0, -20.0));
    band
}

fn create_scene(size: usize) -> (BandSet, BandSet, Raster<u8>) {
    let pre = BandSet::new(Acquisition::PreFire)
        .with_band(Band::Red, create_band(size, 1))
        .with_band(Band::Nir, create_band(size, 2))
        .with_band(Band::Swir, create_band(size, 3));
    let post = BandSet::new(Acquisition::PostFire)
        .with_band(Band::Red, create_band(size, 4))
        .with_band(Band::Nir, create_band(size, 5))
        .with_band(Band::Swir, create_band(size, 6));
    let mut mask = Raster::filled(size, size, 1u8);
    mask.set_transform(GeoTransform::new(500_000.0, 6_000_000.0, 20.0, -20.0));
    (pre, post, mask)
}

fn benchmark_indices(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_indices");

    for size in [256, 512, 1024] {
        let (pre, post, _) = create_scene(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| compute_indices(black_box(&pre), black_box(&post)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_fusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("fuse");
    let config = ClassifierConfig::default();

    for size in [256, 512, 1024] {
        let (pre, post, _) = create_scene(size);
        let stack = compute_indices(&pre, &post).unwrap();
        let severity = threshold::classify_severity(&stack.dnbr, &config.severity_scale).unwrap();
        let bai = threshold::classify_verdict(&stack.bai, config.bai_threshold).unwrap();
        let dndvi = threshold::classify_verdict(&stack.dndvi, config.ndvi_threshold).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| fuse(black_box(&severity), black_box(&bai), black_box(&dndvi)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    group.sample_size(20);
    let config = ClassifierConfig::default();

    for size in [256, 512] {
        let (pre, post, mask) = create_scene(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| classify(black_box(&pre), black_box(&post), black_box(&mask), &config).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_indices, benchmark_fusion, benchmark_pipeline);
criterion_main!(benches);
