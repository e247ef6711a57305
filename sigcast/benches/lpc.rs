use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sigcast::kernel::KernelLifecycle;
use sigcast::predict::lpc::{LpcForecastConfig, LpcForecastKernel};
use sigcast::signal::traits::LpcForecast1D;

/// AR(2) resonance driven by uniform noise.
fn resonant_noise(n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut out = vec![0.0, 0.0];
    for i in 2..n {
        let drive: f64 = rng.random_range(-1.0..1.0);
        out.push(1.6 * out[i - 1] - 0.8 * out[i - 2] + drive);
    }
    out
}

fn lpc_orders(c: &mut Criterion) {
    const WINDOW: usize = 2048;
    const FRAMES: usize = 256;
    let signal = resonant_noise(WINDOW);

    let mut group = c.benchmark_group("lpc_forecast");
    for order in [4usize, 16, 64] {
        let kernel = LpcForecastKernel::try_new(LpcForecastConfig::new(order, FRAMES))
            .expect("lpc kernel config should be valid");
        group.bench_with_input(BenchmarkId::new("order", order), &signal, |bench, sig| {
            bench.iter(|| kernel.run_alloc(black_box(sig)))
        });
    }
    group.finish();
}

criterion_group!(benches, lpc_orders);
criterion_main!(benches);
