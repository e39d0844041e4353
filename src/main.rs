use ftsim::{bench_step, bench_step_curve};
use ftsim::{
    AxisStats, Comparison, Engine, EngineConfig, GalaxyConfig, Parameters, PhysicalLaw, RotationModel, Scenario,
    ScenarioConfig, SimResult,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "ftsim", about = "Newtonian vs finite-theory n-body comparison")]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "mercury.yaml")]
    file_name: String,

    /// Wall-clock seconds to run
    #[arg(long, default_value_t = 5.0)]
    seconds: f64,

    /// Interval between statistics reports (ms)
    #[arg(long, default_value_t = 1000)]
    report_ms: u64,

    /// Override the scenario time step (s)
    #[arg(long)]
    dt: Option<f64>,

    /// Run the integrator benchmark instead
    #[arg(long)]
    bench: bool,

    /// Print the benchmark as CSV
    #[arg(long)]
    curve: bool,

    /// Print galactic rotation curves, then spin the five disks for `--seconds`
    #[arg(long)]
    galaxy: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path).with_context(|| format!("opening {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;
    Ok(scenario_cfg)
}

fn print_galaxy() {
    let galaxy = GalaxyConfig::default();
    let curves: Vec<_> = RotationModel::ALL.iter().map(|&m| galaxy.rotation_curve(m)).collect();

    let header: Vec<_> = RotationModel::ALL.iter().map(|m| format!("{}_kms", m.name())).collect();
    println!("r_m,{}", header.join(","));
    for (k, point) in curves[0].iter().enumerate() {
        let speeds: Vec<_> = curves.iter().map(|c| format!("{:.3}", c[k].v / 1000.0)).collect();
        println!("{:.6e},{}", point.r, speeds.join(","));
    }
}

/// Step one disk per rotation model and log how far the stars left their curve
fn run_galaxy(seconds: f64, dt: Option<f64>) -> Result<()> {
    let galaxy = GalaxyConfig::default();
    let parameters = Parameters {
        dt: dt.unwrap_or(1.0e12),
        ..Parameters::default()
    };
    let scenarios = RotationModel::ALL
        .iter()
        .map(|&model| galaxy.disk_scenario(model, PhysicalLaw::Newtonian, parameters.clone()))
        .collect::<SimResult<Vec<_>>>()?;

    let (engine, _handles) = Engine::start(scenarios, &EngineConfig::default(), parameters.dt)?;
    std::thread::sleep(Duration::from_secs_f64(seconds.max(0.0)));

    for (model, scenario) in RotationModel::ALL.iter().zip(engine.shutdown()?) {
        let curve = galaxy.rotation_curve(*model);
        let drift = scenario.bodies()[1..]
            .iter()
            .zip(&curve)
            .map(|(star, point)| (star.p.norm() - point.r).abs() / point.r)
            .fold(0.0, f64::max);
        info!(model = model.name(), ticks = scenario.tick, t = scenario.t, drift, "disk");
    }
    Ok(())
}

fn report(comparison: &mut Comparison, scenario: &Scenario) {
    let tracked: Vec<usize> = comparison.tracked().collect();
    for index in tracked {
        let name = scenario.bodies()[index].name().to_string();
        let Some(axes) = comparison.snapshot(index) else {
            continue;
        };
        for (axis, stats) in ["x", "y", "z"].into_iter().zip(axes) {
            match stats {
                AxisStats::NoData => info!(body = %name, axis, "no data yet"),
                AxisStats::Summary {
                    median,
                    mad,
                    best_median,
                    best_mad,
                    samples,
                } => info!(body = %name, axis, samples, median, mad, best_median, best_mad, "anomaly"),
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.bench {
        if args.curve {
            bench_step_curve()?;
        } else {
            bench_step()?;
        }
        return Ok(());
    }
    if args.galaxy {
        print_galaxy();
        return run_galaxy(args.seconds, args.dt);
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let newtonian = Scenario::build_scenario(&scenario_cfg)?;
    let dt = args.dt.unwrap_or(newtonian.parameters.dt);

    if !scenario_cfg.engine.compare {
        let (engine, handles) = Engine::start(vec![newtonian], &scenario_cfg.engine, dt)?;
        std::thread::sleep(Duration::from_secs_f64(args.seconds.max(0.0)));
        for handle in &handles {
            let frame = handle.frame();
            info!(scenario = handle.name(), tick = frame.tick, t = frame.t, "finished");
        }
        engine.shutdown()?;
        return Ok(());
    }

    let finite = newtonian.dual(PhysicalLaw::FiniteTheory)?;
    let reference = newtonian.clone();
    let (engine, handles) = Engine::start(vec![newtonian, finite], &scenario_cfg.engine, dt)?;
    let (mut left, mut right) = (handles[0].clone(), handles[1].clone());
    let mut comparison = Comparison::new(&left, &right, &scenario_cfg.engine.tracked)?;

    let deadline = Instant::now() + Duration::from_secs_f64(args.seconds.max(0.0));
    let report_every = Duration::from_millis(args.report_ms.max(1));
    let mut next_report = Instant::now() + report_every;

    while Instant::now() < deadline {
        comparison.poll(&mut left, &mut right)?;
        if Instant::now() >= next_report {
            let (l, r) = (left.frame(), right.frame());
            info!(newtonian_tick = l.tick, finite_tick = r.tick, t = l.t, "progress");
            report(&mut comparison, &reference);
            next_report += report_every;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    comparison.poll(&mut left, &mut right)?;
    report(&mut comparison, &reference);

    let scenarios = engine.shutdown()?;
    for s in &scenarios {
        if s.tick == 0 {
            warn!(scenario = %s.name, "no ticks completed");
        }
        info!(scenario = %s.name, ticks = s.tick, t = s.t, "final");
    }
    Ok(())
}
