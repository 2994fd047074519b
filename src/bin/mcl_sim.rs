use anyhow::{Context, Result};
use clap::Parser;
use mcl_localization::perception::sensors::SimulatedRangeFinder;
use mcl_localization::{
    DistanceSensor, Field, LocalizationCore, Mcl, MclConfig, Point, Pose, PoseSource,
};
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::{FRAC_PI_2, PI};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Closed-loop simulation of the localizer correcting drifting odometry
#[derive(Parser, Debug)]
#[command(name = "mcl_sim")]
struct Args {
    /// TOML file with localizer parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the filter and the simulated sensors
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// How long to run, in seconds
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Fractional odometry scale error
    #[arg(long, default_value_t = 0.03)]
    drift: f64,

    /// Range finder noise std dev in inches, also the sensor model's σ
    #[arg(long, default_value_t = 0.5)]
    sensor_noise: f64,

    /// Drive speed in inches per second
    #[arg(long, default_value_t = 15.0)]
    speed: f64,
}

/// Dead-reckoned pose that accumulates scale error
struct SimulatedOdometry {
    pose: Mutex<Pose>,
}

impl PoseSource for SimulatedOdometry {
    fn get_pose(&self) -> Pose {
        *self.pose.lock()
    }

    fn set_pose(&self, pose: Pose) {
        *self.pose.lock() = pose;
    }
}

fn advance(pose: &mut Pose, distance: f64, turn: f64) {
    pose.x += distance * pose.theta.sin();
    pose.y += distance * pose.theta.cos();
    pose.theta += turn;
}

fn mount_sensors(
    field: &Arc<Field>,
    truth: &Arc<RwLock<Pose>>,
    noise: f64,
    seed: u64,
) -> Result<Vec<DistanceSensor>> {
    let mounts = [
        ("front", Point::new(6.0, 0.0), 0.0),
        ("right", Point::new(0.0, -6.0), FRAC_PI_2),
        ("back", Point::new(-6.0, 0.0), PI),
        ("left", Point::new(0.0, 6.0), -FRAC_PI_2),
    ];

    mounts
        .iter()
        .zip(seed..)
        .map(|(&(name, offset, heading_offset), sensor_seed)| {
            let finder = SimulatedRangeFinder::new(
                name,
                Arc::clone(field),
                Arc::clone(truth),
                offset,
                heading_offset,
                noise,
                sensor_seed,
            );
            let sensor = DistanceSensor::new(offset, heading_offset, Box::new(finder))
                .with_noise_std(noise)
                .with_context(|| format!("configuring {} sensor", name))?;
            Ok(sensor)
        })
        .collect()
}

fn load_config(path: Option<&PathBuf>) -> Result<MclConfig> {
    let mut config = match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            MclConfig::from_toml_str(&source)?
        }
        None => MclConfig::default(),
    };
    config.enabled = true;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    info!("Starting simulation with {} particles", config.particle_count);

    let field = Arc::new(Field::new(Point::new(0.0, 0.0), Point::new(144.0, 144.0))?);
    let start = Pose::new(72.0, 102.0, FRAC_PI_2);
    let truth = Arc::new(RwLock::new(start));
    let odometry = Arc::new(SimulatedOdometry {
        pose: Mutex::new(Pose::new(start.x + 3.0, start.y - 2.0, start.theta)),
    });

    let sensors = mount_sensors(&field, &truth, args.sensor_noise, args.seed)?;
    let mcl = Mcl::new(
        config,
        odometry.clone(),
        Arc::clone(&field),
        sensors,
        StdRng::seed_from_u64(args.seed),
    )?;

    let mut core = LocalizationCore::new();
    core.register(mcl);
    core.init()?;

    // Drive a circle about the field center; odometry over-reads every step
    let drive = {
        let truth = Arc::clone(&truth);
        let odometry = Arc::clone(&odometry);
        let (speed, drift) = (args.speed, args.drift);
        tokio::spawn(async move {
            let dt = 0.01;
            let turn_rate = speed / 30.0;
            let mut ticker = tokio::time::interval(Duration::from_secs_f64(dt));
            loop {
                ticker.tick().await;
                advance(&mut truth.write(), speed * dt, turn_rate * dt);
                advance(&mut odometry.pose.lock(), speed * dt * (1.0 + drift), turn_rate * dt);
            }
        })
    };

    let mut report = tokio::time::interval(Duration::from_secs(1));
    let deadline = tokio::time::sleep(Duration::from_secs_f64(args.duration.max(0.0)));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("Failed to listen for ctrl-c: {}", e);
                }
                break;
            }
            _ = report.tick() => {
                let truth = *truth.read();
                let odom = odometry.get_pose();
                if let Some(mcl) = core.component_mut::<Mcl>() {
                    let estimate = mcl.get_point_estimate();
                    info!(
                        cycles = mcl.cycle_count(),
                        variance = mcl.get_position_estimate_variance(),
                        "truth ({:.1}, {:.1}) odometry error {:.2}in estimate error {:.2}in",
                        truth.x,
                        truth.y,
                        (odom.position() - truth.position()).norm(),
                        (estimate - truth.position()).norm(),
                    );
                }
            }
        }
    }

    drive.abort();
    core.shutdown()?;
    info!("Simulation finished");
    Ok(())
}
