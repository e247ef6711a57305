use anyhow::{anyhow, bail, Context, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sigcast::kernel::{ExecInvariantViolation, KernelLifecycle};
use sigcast::linalg::{polynomial_roots, CompanionBuild1D, CompanionConfig, CompanionKernel};
use sigcast::predict::dead_reckoning::{
    predict_dead_reckoning_1, predict_dead_reckoning_2, DeadReckoningConfig, DeadReckoningKernel,
    DeadReckoningOrder,
};
use sigcast::predict::levinson::{
    autocorrelate as autocorrelate_baseline, estimate_coefficients as estimate_baseline,
    AutocorrelateConfig, AutocorrelateKernel, DegeneratePolicy, LevinsonConfig, LevinsonKernel,
};
use sigcast::predict::lpc::{predict_lpc as lpc_baseline, LpcForecastConfig, LpcForecastKernel};
use sigcast::signal::convolve::{convolve as convolve_baseline, ConvolveConfig, ConvolveKernel};
use sigcast::signal::fourier::{
    dft as dft_baseline, idft as idft_baseline, DftKernel, FourierConfig, IdftKernel,
};
use sigcast::signal::traits::{
    Autocorrelate1D, Convolve1D, DeadReckon1D, Dft1D, Idft1D, LevinsonDurbin1D, LpcForecast1D,
};
use sigcast::Complex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const DEFAULT_PYTHON_BIN: &str = "python";

const PY_SIGNAL_SCRIPT: &str = r#"
import json
import sys
import time
import numpy as np
import scipy.linalg

env = json.loads(sys.stdin.read())
op = env["op"]
iters = int(env["iters"])
p = env["payload"]

def _as_array(key):
    return np.asarray(p[key], dtype=float)

def _flat(v):
    return np.asarray(v, dtype=float).reshape(-1)

def _interleave(z):
    return np.column_stack([z.real, z.imag]).reshape(-1)

def _autocorr(x, order):
    n = len(x)
    return np.asarray([np.dot(x[: n - i], x[i:]) for i in range(order + 1)])

def _lpc(x, order):
    r = _autocorr(x, order)
    return scipy.linalg.solve_toeplitz(r[:order], -r[1 : order + 1])

def _forecast(x, order, frames, threshold):
    tail = x[-3:]
    if np.all(np.abs(np.diff(tail)) < threshold):
        return np.full(frames, tail[-1])
    a = _lpc(x, order)
    hist = list(x)
    for _ in range(frames):
        hist.append(-np.dot(a, hist[::-1][:order]))
    return np.asarray(hist[len(x):])

def _compute():
    if op == "convolve":
        left = _as_array("left")
        right = _as_array("right")
        return np.convolve(left, right)[: len(right)]
    if op == "dft":
        f = np.fft.fft(_as_array("x"))
        return _interleave(-f.imag + 1j * f.real)
    if op == "idft":
        z = _as_array("spectrum").reshape((-1, 2))
        euler = z[:, 1] - 1j * z[:, 0]
        return np.fft.ifft(euler).real
    if op == "autocorrelate":
        return _autocorr(_as_array("x"), int(p["order"]))
    if op == "lpc":
        return _lpc(_as_array("x"), int(p["order"]))
    if op == "lpc_forecast":
        return _forecast(
            _as_array("x"), int(p["order"]), int(p["frames"]), float(p["threshold"])
        )
    if op == "dead_reckoning":
        x = _as_array("x")
        if int(p["order"]) == 1:
            return x[1:] + np.diff(x)
        vel = np.diff(x)
        return x[2:] + vel[1:] + 0.5 * np.diff(vel)
    if op == "companion":
        return scipy.linalg.companion(_as_array("coeffs")).reshape(-1)
    if op == "roots":
        r = np.roots(_as_array("coeffs"))
        return _interleave(r[np.lexsort((r.imag, r.real))])

    raise RuntimeError(f"unsupported op: {op}")

y = _flat(_compute())

t0 = time.perf_counter_ns()
for _ in range(iters):
    _compute()
t1 = time.perf_counter_ns()

print(json.dumps({
    "output": y.tolist(),
    "avg_ns": (t1 - t0) / max(iters, 1),
    "python_version": sys.version.split()[0],
    "numpy_version": np.__version__,
    "scipy_version": scipy.__version__,
    "matplotlib_version": None
}))
"#;

#[derive(Debug, Serialize, Deserialize, Clone)]
struct PythonEval {
    output: Vec<f64>,
    avg_ns: f64,
    python_version: String,
    numpy_version: String,
    scipy_version: Option<String>,
    matplotlib_version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ContractRow {
    case_id: String,
    pearson_r: f64,
    mae: f64,
    rmse: f64,
    max_abs: f64,
    rust_candidate_ns: f64,
    rust_baseline_ns: f64,
    python_ns: f64,
    speedup_vs_baseline: f64,
    speedup_vs_python: f64,
    overlay_plot: String,
    residual_plot: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContractBundle {
    generated_epoch_seconds: u64,
    python_executable: String,
    python_version: String,
    numpy_version: String,
    scipy_version: String,
    matplotlib_version: String,
    rows: Vec<ContractRow>,
}

/// Output directory plus the accumulated rows and plot payloads.
struct ContractRun {
    python_bin: PathBuf,
    plots_dir: PathBuf,
    rows: Vec<ContractRow>,
    plot_payload: Vec<serde_json::Value>,
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("contracts") => run_contracts(),
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo run -p xtask -- contracts");
            Ok(())
        }
    }
}

fn run_contracts() -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/contracts/{ts}"));
    let plots_dir = out_dir.join("plots");
    fs::create_dir_all(&plots_dir).context("creating contract output directories")?;

    let mut run = ContractRun {
        python_bin: detect_python_bin(),
        plots_dir,
        rows: Vec::new(),
        plot_payload: Vec::new(),
    };

    // Shared synthetic input for the 1D cases.
    let signal: Array1<f64> = (0..512)
        .map(|i| {
            let x = i as f64 / 27.0;
            x.sin() + 0.35 * (2.3 * x).cos() + 0.1 * (7.0 * x).sin()
        })
        .collect();
    let window = signal.slice(ndarray::s![..256]).to_owned();

    convolve_case(&mut run, &signal)?;
    fourier_cases(&mut run, &window)?;
    levinson_cases(&mut run, &signal)?;
    forecast_case(&mut run, &signal)?;
    dead_reckoning_cases(&mut run, &window)?;
    companion_cases(&mut run)?;

    let version_probe = python_versions(&run.python_bin)?;
    let report_pdf = out_dir.join("report.pdf");
    generate_plots_and_pdf(&run.python_bin, &run.plot_payload, &report_pdf)?;

    let bundle = ContractBundle {
        generated_epoch_seconds: ts,
        python_executable: run.python_bin.to_string_lossy().into_owned(),
        python_version: version_probe.python_version,
        numpy_version: version_probe.numpy_version,
        scipy_version: version_probe
            .scipy_version
            .unwrap_or_else(|| "unknown".to_string()),
        matplotlib_version: version_probe
            .matplotlib_version
            .unwrap_or_else(|| "unknown".to_string()),
        rows: run.rows,
    };

    write_summary_csv(&out_dir.join("summary.csv"), &bundle.rows)?;
    fs::write(
        out_dir.join("summary.json"),
        serde_json::to_vec_pretty(&bundle).context("serializing summary bundle")?,
    )
    .context("writing summary.json")?;

    println!("Contract artifacts generated in: {}", out_dir.display());
    println!("  - {}", out_dir.join("summary.csv").display());
    println!("  - {}", out_dir.join("summary.json").display());
    println!("  - {}", report_pdf.display());
    println!("  - {}", run.plots_dir.display());
    println!("  - cases: {}", bundle.rows.len());

    Ok(())
}

fn convolve_case(run: &mut ContractRun, signal: &Array1<f64>) -> Result<()> {
    let case_id = "convolve_causal_f64";
    let left: Vec<f64> = (0..63)
        .map(|i| {
            let x = i as f64 / 8.0;
            (-(x * x) / 8.0).exp()
        })
        .collect();
    let right = signal.slice(ndarray::s![..256]).to_vec();

    let kernel = ConvolveKernel::try_new(ConvolveConfig)?;
    let candidate = kernel
        .run_alloc(left.as_slice(), right.as_slice())
        .map_err(|e| anyhow!("convolve candidate execution failed: {e}"))?;
    let baseline = convolve_baseline(&left, &right);
    let py = python_signal_eval(
        &run.python_bin,
        "convolve",
        json!({ "left": left, "right": right }),
        200,
    )?;

    let candidate_ns = benchmark_avg_ns(120, || {
        kernel
            .run_alloc(&left, &right)
            .map(|_| ())
            .map_err(|e| anyhow!("convolve candidate benchmark failed: {e}"))
    })?;
    let baseline_ns = benchmark_avg_ns(120, || {
        let _ = convolve_baseline(&left, &right);
        Ok(())
    })?;

    run.record(case_id, candidate, baseline, py, candidate_ns, baseline_ns)
}

fn fourier_cases(run: &mut ContractRun, window: &Array1<f64>) -> Result<()> {
    let dft = DftKernel::try_new(FourierConfig)?;
    let idft = IdftKernel::try_new(FourierConfig)?;
    let samples = window.to_vec();

    let spectrum: Vec<Complex<f64>> = dft
        .run_alloc(window)
        .map_err(|e| anyhow!("dft candidate execution failed: {e}"))?;
    let baseline =
        dft_baseline(&samples).map_err(|e| anyhow!("dft baseline execution failed: {e}"))?;
    let py = python_signal_eval(&run.python_bin, "dft", json!({ "x": samples }), 20)?;
    let candidate_ns = benchmark_avg_ns(20, || {
        Dft1D::<f64>::run_alloc(&dft, window)
            .map(|_| ())
            .map_err(|e| anyhow!("dft candidate benchmark failed: {e}"))
    })?;
    let baseline_ns = benchmark_avg_ns(20, || {
        dft_baseline(&samples)
            .map(|_| ())
            .map_err(|e| anyhow!("dft baseline benchmark failed: {e}"))
    })?;
    run.record(
        "dft_f64",
        interleave(&spectrum),
        interleave(&baseline),
        py,
        candidate_ns,
        baseline_ns,
    )?;

    let candidate = idft
        .run_alloc(spectrum.as_slice())
        .map_err(|e| anyhow!("idft candidate execution failed: {e}"))?;
    let baseline =
        idft_baseline(&spectrum).map_err(|e| anyhow!("idft baseline execution failed: {e}"))?;
    let py = python_signal_eval(
        &run.python_bin,
        "idft",
        json!({ "spectrum": interleave(&spectrum) }),
        20,
    )?;
    let candidate_ns = benchmark_avg_ns(20, || {
        Idft1D::<f64>::run_alloc(&idft, spectrum.as_slice())
            .map(|_| ())
            .map_err(|e| anyhow!("idft candidate benchmark failed: {e}"))
    })?;
    let baseline_ns = benchmark_avg_ns(20, || {
        idft_baseline(&spectrum)
            .map(|_| ())
            .map_err(|e| anyhow!("idft baseline benchmark failed: {e}"))
    })?;
    run.record(
        "idft_f64",
        candidate,
        baseline,
        py,
        candidate_ns,
        baseline_ns,
    )
}

fn levinson_cases(run: &mut ContractRun, signal: &Array1<f64>) -> Result<()> {
    const ORDER: usize = 12;
    let samples = signal.to_vec();

    let autocorr = AutocorrelateKernel::try_new(AutocorrelateConfig { order: ORDER })?;
    let candidate = autocorr
        .run_alloc(signal)
        .map_err(|e| anyhow!("autocorrelate candidate execution failed: {e}"))?;
    let baseline = autocorrelate_baseline(&samples, ORDER)
        .map_err(|e| anyhow!("autocorrelate baseline execution failed: {e}"))?;
    let py = python_signal_eval(
        &run.python_bin,
        "autocorrelate",
        json!({ "x": samples, "order": ORDER }),
        200,
    )?;
    let candidate_ns = benchmark_avg_ns(200, || {
        Autocorrelate1D::<f64>::run_alloc(&autocorr, signal)
            .map(|_| ())
            .map_err(|e| anyhow!("autocorrelate candidate benchmark failed: {e}"))
    })?;
    let baseline_ns = benchmark_avg_ns(200, || {
        autocorrelate_baseline(&samples, ORDER)
            .map(|_| ())
            .map_err(|e| anyhow!("autocorrelate baseline benchmark failed: {e}"))
    })?;
    run.record(
        "autocorrelate_order12_f64",
        candidate,
        baseline,
        py,
        candidate_ns,
        baseline_ns,
    )?;

    let levinson = LevinsonKernel::try_new(LevinsonConfig {
        order: ORDER,
        degenerate: DegeneratePolicy::Reject,
    })?;
    let candidate = LevinsonDurbin1D::<f64>::run(&levinson, signal)
        .map_err(|e| anyhow!("levinson candidate execution failed: {e}"))?
        .coefficients;
    let baseline = estimate_baseline(&samples, ORDER)
        .map_err(|e| anyhow!("levinson baseline execution failed: {e}"))?;
    let py = python_signal_eval(
        &run.python_bin,
        "lpc",
        json!({ "x": samples, "order": ORDER }),
        200,
    )?;
    let candidate_ns = benchmark_avg_ns(200, || {
        LevinsonDurbin1D::<f64>::run(&levinson, signal)
            .map(|_| ())
            .map_err(|e| anyhow!("levinson candidate benchmark failed: {e}"))
    })?;
    let baseline_ns = benchmark_avg_ns(200, || {
        estimate_baseline(&samples, ORDER)
            .map(|_| ())
            .map_err(|e| anyhow!("levinson baseline benchmark failed: {e}"))
    })?;
    run.record(
        "levinson_order12_f64",
        candidate,
        baseline,
        py,
        candidate_ns,
        baseline_ns,
    )
}

fn forecast_case(run: &mut ContractRun, signal: &Array1<f64>) -> Result<()> {
    const ORDER: usize = 16;
    const FRAMES: usize = 128;
    let history = signal.slice(ndarray::s![..384]).to_vec();
    let config: LpcForecastConfig<f64> = LpcForecastConfig::new(ORDER, FRAMES);

    let kernel = LpcForecastKernel::try_new(config)?;
    let candidate = kernel
        .run_alloc(history.as_slice())
        .map_err(|e| anyhow!("lpc forecast candidate execution failed: {e}"))?;
    let baseline = lpc_baseline(&history, ORDER, FRAMES)
        .map_err(|e| anyhow!("lpc forecast baseline execution failed: {e}"))?;
    let py = python_signal_eval(
        &run.python_bin,
        "lpc_forecast",
        json!({
            "x": history,
            "order": ORDER,
            "frames": FRAMES,
            "threshold": config.stillness_threshold,
        }),
        50,
    )?;
    let candidate_ns = benchmark_avg_ns(50, || {
        kernel
            .run_alloc(history.as_slice())
            .map(|_| ())
            .map_err(|e| anyhow!("lpc forecast candidate benchmark failed: {e}"))
    })?;
    let baseline_ns = benchmark_avg_ns(50, || {
        lpc_baseline(&history, ORDER, FRAMES)
            .map(|_| ())
            .map_err(|e| anyhow!("lpc forecast baseline benchmark failed: {e}"))
    })?;
    run.record(
        "lpc_forecast_order16_f64",
        candidate,
        baseline,
        py,
        candidate_ns,
        baseline_ns,
    )
}

type SingleStep = fn(&[f64]) -> Result<f64, ExecInvariantViolation>;

fn dead_reckoning_cases(run: &mut ContractRun, window: &Array1<f64>) -> Result<()> {
    let samples = window.to_vec();
    let cases: [(&str, DeadReckoningOrder, usize, SingleStep); 2] = [
        (
            "dead_reckoning_velocity_f64",
            DeadReckoningOrder::Velocity,
            1,
            predict_dead_reckoning_1::<f64>,
        ),
        (
            "dead_reckoning_acceleration_f64",
            DeadReckoningOrder::Acceleration,
            2,
            predict_dead_reckoning_2::<f64>,
        ),
    ];

    for (case_id, order, py_order, single_step) in cases {
        let kernel = DeadReckoningKernel::try_new(DeadReckoningConfig { order })?;
        let candidate = kernel
            .run_alloc(window)
            .map_err(|e| anyhow!("{case_id} candidate execution failed: {e}"))?;
        // Baseline: the single-step free function over every prefix.
        let required = order.required_samples();
        let baseline = (required..=samples.len())
            .map(|end| single_step(&samples[end - required..end]))
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|e| anyhow!("{case_id} baseline execution failed: {e}"))?;
        let py = python_signal_eval(
            &run.python_bin,
            "dead_reckoning",
            json!({ "x": samples, "order": py_order }),
            200,
        )?;
        let candidate_ns = benchmark_avg_ns(200, || {
            DeadReckon1D::<f64>::run_alloc(&kernel, window)
                .map(|_| ())
                .map_err(|e| anyhow!("{case_id} candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(200, || {
            for end in required..=samples.len() {
                single_step(&samples[end - required..end])
                    .map_err(|e| anyhow!("{case_id} baseline benchmark failed: {e}"))?;
            }
            Ok(())
        })?;
        run.record(case_id, candidate, baseline, py, candidate_ns, baseline_ns)?;
    }
    Ok(())
}

fn companion_cases(run: &mut ContractRun) -> Result<()> {
    // Prediction-error polynomial of a resonant AR(4) model.
    let coeffs = vec![1.0, -2.76, 3.81, -2.65, 0.92];

    let kernel = CompanionKernel::try_new(CompanionConfig {
        expected_len: Some(coeffs.len()),
    })?;
    let matrix = kernel
        .run(coeffs.as_slice())
        .map_err(|e| anyhow!("companion candidate execution failed: {e}"))?;
    let candidate = flatten_matrix_row_major(&matrix);
    let baseline = flatten_matrix_row_major(
        &CompanionKernel::default()
            .run(coeffs.as_slice())
            .map_err(|e| anyhow!("companion baseline execution failed: {e}"))?,
    );
    let py = python_signal_eval(
        &run.python_bin,
        "companion",
        json!({ "coeffs": coeffs }),
        200,
    )?;
    let candidate_ns = benchmark_avg_ns(200, || {
        CompanionBuild1D::<f64>::run(&kernel, coeffs.as_slice())
            .map(|_| ())
            .map_err(|e| anyhow!("companion candidate benchmark failed: {e}"))
    })?;
    let baseline_ns = benchmark_avg_ns(200, || {
        CompanionBuild1D::<f64>::run(&CompanionKernel::default(), coeffs.as_slice())
            .map(|_| ())
            .map_err(|e| anyhow!("companion baseline benchmark failed: {e}"))
    })?;
    run.record(
        "companion_ar4_f64",
        candidate,
        baseline,
        py,
        candidate_ns,
        baseline_ns,
    )?;

    let mut roots = polynomial_roots(&coeffs)
        .map_err(|e| anyhow!("roots candidate execution failed: {e}"))?;
    roots.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));
    let candidate = interleave(&roots);
    let py = python_signal_eval(&run.python_bin, "roots", json!({ "coeffs": coeffs }), 200)?;
    let candidate_ns = benchmark_avg_ns(200, || {
        polynomial_roots(&coeffs)
            .map(|_| ())
            .map_err(|e| anyhow!("roots candidate benchmark failed: {e}"))
    })?;
    run.record(
        "polynomial_roots_ar4_f64",
        candidate.clone(),
        candidate,
        py,
        candidate_ns,
        candidate_ns,
    )
}

impl ContractRun {
    fn record(
        &mut self,
        case_id: &str,
        candidate: Vec<f64>,
        baseline: Vec<f64>,
        py: PythonEval,
        candidate_ns: f64,
        baseline_ns: f64,
    ) -> Result<()> {
        ensure_same_length(case_id, &candidate, &baseline)?;
        ensure_same_length(case_id, &candidate, &py.output)?;

        let overlay = self.plots_dir.join(format!("{case_id}_overlay.png"));
        let residual = self.plots_dir.join(format!("{case_id}_residual.png"));

        self.rows.push(build_row(RowBuildInput {
            case_id,
            rust_candidate: &candidate,
            python_reference: &py.output,
            rust_candidate_ns: candidate_ns,
            rust_baseline_ns: baseline_ns,
            python_ns: py.avg_ns,
            overlay_plot: &overlay,
            residual_plot: &residual,
        }));

        self.plot_payload.push(json!({
            "case_id": case_id,
            "rust_candidate": candidate,
            "python_reference": py.output,
            "overlay_plot": overlay.to_string_lossy(),
            "residual_plot": residual.to_string_lossy()
        }));
        println!("  case {case_id} recorded");

        Ok(())
    }
}

fn detect_python_bin() -> PathBuf {
    std::env::var_os("SIGCAST_PYTHON")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON_BIN))
}

fn python_versions(python_bin: &Path) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        r#"
import json, sys
import numpy
import scipy
import matplotlib
payload = json.loads(sys.stdin.read())
print(json.dumps({
    "output": [],
    "avg_ns": 0.0,
    "python_version": sys.version.split()[0],
    "numpy_version": numpy.__version__,
    "scipy_version": scipy.__version__,
    "matplotlib_version": matplotlib.__version__
}))
"#,
        json!({}),
    )
}

fn python_signal_eval(
    python_bin: &Path,
    op: &str,
    payload: serde_json::Value,
    iters: usize,
) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        PY_SIGNAL_SCRIPT,
        json!({
            "op": op,
            "iters": iters,
            "payload": payload
        }),
    )
}

fn spawn_python(
    python_bin: &Path,
    script: &str,
    payload: &serde_json::Value,
) -> Result<std::process::Output> {
    let mut child = Command::new(python_bin)
        .arg("-c")
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning python interpreter at {}", python_bin.display()))?;

    {
        let stdin = child.stdin.as_mut().context("opening python stdin")?;
        let payload_bytes = serde_json::to_vec(payload).context("serializing python payload")?;
        stdin
            .write_all(&payload_bytes)
            .context("writing payload to python stdin")?;
    }

    child
        .wait_with_output()
        .context("waiting for python process")
}

fn run_python_eval(
    python_bin: &Path,
    script: &str,
    payload: serde_json::Value,
) -> Result<PythonEval> {
    let output = spawn_python(python_bin, script, &payload)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("python execution failed: {stderr}");
    }
    let stdout = String::from_utf8(output.stdout).context("parsing python stdout utf8")?;
    let parsed: PythonEval = serde_json::from_str(stdout.trim()).context("parsing python json")?;
    Ok(parsed)
}

/// `[re0, im0, re1, im1, ...]`
fn interleave(values: &[Complex<f64>]) -> Vec<f64> {
    values.iter().flat_map(|c| [c.re, c.im]).collect()
}

fn flatten_matrix_row_major(matrix: &sigcast::na::DMatrix<f64>) -> Vec<f64> {
    let mut out = Vec::with_capacity(matrix.nrows() * matrix.ncols());
    for row in 0..matrix.nrows() {
        for col in 0..matrix.ncols() {
            out.push(matrix[(row, col)]);
        }
    }
    out
}

fn ensure_same_length(case_id: &str, a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        bail!(
            "case {case_id} has mismatched output lengths: left={}, right={}",
            a.len(),
            b.len()
        );
    }
    Ok(())
}

fn benchmark_avg_ns<F>(iters: usize, mut f: F) -> Result<f64>
where
    F: FnMut() -> Result<()>,
{
    let start = Instant::now();
    for _ in 0..iters {
        f()?;
    }
    Ok(start.elapsed().as_nanos() as f64 / iters as f64)
}

struct RowBuildInput<'a> {
    case_id: &'a str,
    rust_candidate: &'a [f64],
    python_reference: &'a [f64],
    rust_candidate_ns: f64,
    rust_baseline_ns: f64,
    python_ns: f64,
    overlay_plot: &'a Path,
    residual_plot: &'a Path,
}

fn build_row(args: RowBuildInput<'_>) -> ContractRow {
    let pearson_r = pearson(args.rust_candidate, args.python_reference);
    let mae = mean_abs_error(args.rust_candidate, args.python_reference);
    let rmse = root_mean_squared_error(args.rust_candidate, args.python_reference);
    let max_abs = max_abs_error(args.rust_candidate, args.python_reference);
    ContractRow {
        case_id: args.case_id.to_string(),
        pearson_r,
        mae,
        rmse,
        max_abs,
        rust_candidate_ns: args.rust_candidate_ns,
        rust_baseline_ns: args.rust_baseline_ns,
        python_ns: args.python_ns,
        speedup_vs_baseline: args.rust_baseline_ns / args.rust_candidate_ns,
        speedup_vs_python: args.python_ns / args.rust_candidate_ns,
        overlay_plot: args.overlay_plot.to_string_lossy().into_owned(),
        residual_plot: args.residual_plot.to_string_lossy().into_owned(),
    }
}

fn mean_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .sum::<f64>()
        / a.len() as f64
}

fn root_mean_squared_error(a: &[f64], b: &[f64]) -> f64 {
    (a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        / a.len() as f64)
        .sqrt()
}

fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let (cov, var_a, var_b) =
        a.iter()
            .zip(b.iter())
            .fold((0.0, 0.0, 0.0), |(cov, var_a, var_b), (x, y)| {
                let da = x - mean_a;
                let db = y - mean_b;
                (cov + da * db, var_a + da * da, var_b + db * db)
            });
    if var_a == 0.0 || var_b == 0.0 {
        if a == b {
            1.0
        } else {
            0.0
        }
    } else {
        cov / (var_a.sqrt() * var_b.sqrt())
    }
}

fn write_summary_csv(path: &Path, rows: &[ContractRow]) -> Result<()> {
    let mut out = String::from(
        "case_id,pearson_r,mae,rmse,max_abs,rust_candidate_ns,rust_baseline_ns,python_ns,speedup_vs_baseline,speedup_vs_python,overlay_plot,residual_plot\n",
    );
    for row in rows {
        out.push_str(&format!(
            "{},{:.12},{:.12},{:.12},{:.12},{:.3},{:.3},{:.3},{:.6},{:.6},{},{}\n",
            row.case_id,
            row.pearson_r,
            row.mae,
            row.rmse,
            row.max_abs,
            row.rust_candidate_ns,
            row.rust_baseline_ns,
            row.python_ns,
            row.speedup_vs_baseline,
            row.speedup_vs_python,
            row.overlay_plot,
            row.residual_plot
        ));
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

fn generate_plots_and_pdf(
    python_bin: &Path,
    case_payload: &[serde_json::Value],
    report_pdf: &Path,
) -> Result<()> {
    let payload = json!({
        "cases": case_payload,
        "report_pdf": report_pdf.to_string_lossy()
    });
    let script = r#"
import json
import sys
import matplotlib
matplotlib.use("Agg")
import matplotlib.pyplot as plt
from matplotlib.backends.backend_pdf import PdfPages

payload = json.loads(sys.stdin.read())

def _page(pdf, path, title, ylabel, series):
    fig = plt.figure(figsize=(10, 4))
    ax = fig.add_subplot(1, 1, 1)
    for label, values, kwargs in series:
        ax.plot(range(len(values)), values, label=label, **kwargs)
    ax.set_title(title)
    ax.set_xlabel("index")
    ax.set_ylabel(ylabel)
    ax.legend()
    fig.tight_layout()
    fig.savefig(path, dpi=150)
    pdf.savefig(fig)
    plt.close(fig)

with PdfPages(payload["report_pdf"]) as pdf:
    for case in payload["cases"]:
        rust = case["rust_candidate"]
        py = case["python_reference"]
        _page(pdf, case["overlay_plot"], f"{case['case_id']} :: overlay", "value", [
            ("NumPy reference", py, {"linewidth": 1.6}),
            ("sigcast", rust, {"linewidth": 1.2, "alpha": 0.8}),
        ])
        _page(pdf, case["residual_plot"], f"{case['case_id']} :: residual", "error", [
            ("sigcast - NumPy", [r - p for r, p in zip(rust, py)], {"linewidth": 1.2, "color": "tab:red"}),
        ])
"#;

    let output = spawn_python(python_bin, script, &payload)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("plot/pdf generation failed: {stderr}");
    }

    Ok(())
}
