use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use simrs::design::DesignSpec;
use simrs::sim::{sim_design, SimOptions};

fn bench_sim_design(c: &mut Criterion) {
    let one_sample = DesignSpec::one_sample(1000, 2.0, 1.0);
    c.bench_function("sim_design one_sample n=1000", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(17);
            sim_design(black_box(&one_sample), &SimOptions::default(), &mut rng).unwrap()
        })
    });

    let within = DesignSpec::within(
        "cond",
        500,
        &[("a", 0.0, 1.0), ("b", 1.0, 1.0), ("c", 2.0, 1.0)],
        &[0.5, 0.4, 0.6],
    );
    c.bench_function("sim_design within n=500 c=3", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(17);
            sim_design(black_box(&within), &SimOptions::default(), &mut rng).unwrap()
        })
    });

    c.bench_function("sim_design within n=500 c=3 empirical", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(17);
            sim_design(black_box(&within), &SimOptions::empirical(), &mut rng).unwrap()
        })
    });
}

criterion_group!(benches, bench_sim_design);
criterion_main!(benches);
