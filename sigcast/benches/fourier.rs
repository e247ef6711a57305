use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array1;
use rand::rngs::ThreadRng;
use rand::Rng;
use sigcast::kernel::KernelLifecycle;
use sigcast::signal::fourier::{DftKernel, FourierConfig, IdftKernel};
use sigcast::signal::traits::{Dft1D, Idft1D};
use sigcast::Complex;

/// Noisy sum of a few tones.
fn noisy_tones(mut rng: ThreadRng, n: usize) -> Array1<f64> {
    let t = Array1::linspace(0.0, 1.0, n);
    let tones: Vec<(f64, f64)> = (0..4)
        .map(|_| (rng.random_range(1.0..40.0), rng.random_range(0.0..std::f64::consts::PI)))
        .collect();
    t.mapv(|ti| {
        tones
            .iter()
            .map(|(freq, phase)| (std::f64::consts::TAU * freq * ti + phase).sin())
            .sum::<f64>()
            + rng.random_range(-0.1..0.1)
    })
}

fn dft_sizes(c: &mut Criterion) {
    let dft = DftKernel::try_new(FourierConfig).expect("dft kernel config should be valid");
    let idft = IdftKernel::try_new(FourierConfig).expect("idft kernel config should be valid");

    let mut group = c.benchmark_group("fourier");
    for n in [64usize, 256, 1024] {
        let signal = noisy_tones(rand::rng(), n);
        let spectrum: Vec<Complex<f64>> = dft.run_alloc(&signal).expect("dft should run");

        group.bench_with_input(BenchmarkId::new("dft", n), &signal, |bench, sig| {
            bench.iter(|| dft.run_alloc(black_box(sig)))
        });
        group.bench_with_input(BenchmarkId::new("idft", n), &spectrum, |bench, spec| {
            bench.iter(|| idft.run_alloc(black_box(spec)))
        });
    }
    group.finish();
}

criterion_group!(benches, dft_sizes);
criterion_main!(benches);
