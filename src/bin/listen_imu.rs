//! Listen for Sanchi IMU telemetry on a serial port or in a capture file
//!
//! Optionally sends the model's start-up commands, then decodes frames until
//! the stream ends or the time limit passes, logging every sample.

use std::fs::File;
use std::io::{Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use nalgebra::{UnitQuaternion, Vector3};

use sanchi::avec::{
    Sink,
    reader::{self, Config},
};
use sanchi::sans::profile::Model;

#[derive(Parser, Debug)]
#[command(name = "listen_imu")]
#[command(about = "Sanchi IMU telemetry receiver")]
struct Args {
    /// Device model: 100S, 200A, 300A, 200S or 100D2
    #[arg(short, long)]
    model: Model,

    /// Serial port path (e.g., /dev/ttyUSB0)
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    port: Option<String>,

    /// Raw capture file to decode instead of a serial port
    #[arg(long)]
    file: Option<String>,

    /// Serial baud rate
    #[arg(long, default_value = "115200")]
    baud: u32,

    /// Coordinate frame label attached to every sample
    #[arg(long, default_value = "world")]
    frame_id: String,

    /// Skip the start-up command sequence
    #[arg(long)]
    no_setup: bool,

    /// Stop after this many seconds (0 = run until the stream ends)
    #[arg(long, default_value = "0")]
    seconds: u64,
}

/// Logs every sample it receives.
struct LogSink;

impl Sink for LogSink {
    fn publish_orientation(&mut self, q: UnitQuaternion<f64>, frame_id: &str, timestamp: Duration) {
        let (roll, pitch, yaw) = q.euler_angles();
        info!(
            "[{frame_id} {:.3}] orientation rpy=({roll:.4}, {pitch:.4}, {yaw:.4}) rad",
            timestamp.as_secs_f64()
        );
    }

    fn publish_inertial(
        &mut self,
        accel: Vector3<f64>,
        gyro: Vector3<f64>,
        frame_id: &str,
        timestamp: Duration,
    ) {
        info!(
            "[{frame_id} {:.3}] accel=({:.3}, {:.3}, {:.3}) m/s² gyro=({:.4}, {:.4}, {:.4}) rad/s",
            timestamp.as_secs_f64(),
            accel.x,
            accel.y,
            accel.z,
            gyro.x,
            gyro.y,
            gyro.z
        );
    }

    fn publish_magnetic(&mut self, field: Vector3<f64>, frame_id: &str, timestamp: Duration) {
        info!(
            "[{frame_id} {:.3}] magnetic=({:.3}, {:.3}, {:.3})",
            timestamp.as_secs_f64(),
            field.x,
            field.y,
            field.z
        );
    }

    fn publish_gps(
        &mut self,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        frame_id: &str,
        timestamp: Duration,
    ) {
        info!(
            "[{frame_id} {:.3}] fix lat={latitude:.7} lon={longitude:.7} alt={altitude:.2} m",
            timestamp.as_secs_f64()
        );
    }
}

/// Send the model's start-up commands, pausing after each.
fn send_setup(port: &mut impl Write, model: Model) -> Result<()> {
    for command in model.profile().setup {
        let encoded = command
            .encode()
            .with_context(|| format!("Failed to encode {command:?}"))?;

        info!("Sending {command:?}: {:02X?}", encoded.as_ref());
        port.write_all(encoded.as_ref())
            .with_context(|| format!("Failed to send {command:?}"))?;
        port.flush()?;

        thread::sleep(Duration::from_secs(1));
    }
    Ok(())
}

fn run(r: &mut impl Read, config: &Config, seconds: u64) -> Result<()> {
    info!("Decoding {} frames", config.model);

    let start = Instant::now();
    let limit = Duration::from_secs(seconds);
    let keep_running = || seconds == 0 || start.elapsed() < limit;

    let totals = reader::decode(r, config, keep_running, &mut LogSink)
        .context("Failed to read from device")?;

    info!("=== Final Statistics ===");
    info!("Bytes received: {}", totals.bytes);
    info!("Frames accepted: {}", totals.frames);
    info!("Checksum failures: {}", totals.rejected);
    info!("Duration: {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::new(args.model).with_frame_id(args.frame_id);

    if let Some(path) = &args.file {
        let mut file =
            File::open(path).with_context(|| format!("Failed to open capture file {path}"))?;
        return run(&mut file, &config, args.seconds);
    }

    let path = args.port.as_deref().context("No serial port given")?;
    info!("Opening serial port: {path} at {} bps", args.baud);

    let mut port = serialport::new(path, args.baud)
        .timeout(Duration::from_millis(500))
        .open()
        .with_context(|| format!("Failed to open serial port {path}"))?;

    if !args.no_setup {
        send_setup(&mut port, config.model)?;
    }

    run(&mut port, &config, args.seconds)
}
