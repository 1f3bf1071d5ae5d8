use std::net::IpAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use pixelbridge_core::config::{
    DEFAULT_BAUD_RATE, LEDS_PER_UNIVERSE, MATRIX_HEIGHT, MATRIX_WIDTH, NUM_UNIVERSES,
};
use pixelbridge_core::patterns::{self, Pattern, PatternGenerator};
use pixelbridge_core::protocols::artnet::layout::ARTNET_PORT;
use pixelbridge_core::{
    Bridge, BridgeConfig, FrameAssembler, ListenerConfig, MatrixLayout, NetworkListener,
    PortCandidate, SerialConfig, SerialTransmitter, discovery,
};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("PIXELBRIDGE_BUILD_COMMIT"),
    ", ",
    env!("PIXELBRIDGE_BUILD_DATE"),
    ")"
);

const PATTERN_FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 30);

#[derive(Parser, Debug)]
#[command(name = "pixelbridge")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Bridge Art-Net pixel data to an LED matrix over OPC on a serial port.",
    long_about = None,
    after_help = "Examples:\n  pixelbridge --scan\n  pixelbridge /dev/ttyACM0\n  pixelbridge COM3 --baud 115200\n  pixelbridge /dev/ttyACM0 --pattern rainbow"
)]
struct Cli {
    /// Serial device (e.g. /dev/ttyACM0 or COM3); auto-detected when omitted
    port: Option<String>,

    /// List serial ports, test that each opens, then exit
    #[arg(short = 's', long)]
    scan: bool,

    /// Print scan results as JSON
    #[arg(long)]
    json: bool,

    /// Serial baud rate
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Local address to receive Art-Net on
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Delay after opening the port before the first frame (milliseconds)
    #[arg(long, default_value_t = 2000)]
    settle_ms: u64,

    /// Send a test pattern instead of bridging Art-Net
    #[arg(long, value_name = "NAME")]
    pattern: Option<String>,

    /// Matrix width in pixels
    #[arg(long, default_value_t = MATRIX_WIDTH)]
    width: usize,

    /// Matrix height in pixels
    #[arg(long, default_value_t = MATRIX_HEIGHT)]
    height: usize,

    /// Number of Art-Net universes per frame
    #[arg(long, default_value_t = NUM_UNIVERSES)]
    universes: usize,

    /// RGB pixels carried by each universe
    #[arg(long, default_value_t = LEDS_PER_UNIVERSE)]
    leds_per_universe: usize,
}

impl Cli {
    fn wants_scan(&self) -> bool {
        self.scan || self.port.as_deref() == Some("scan")
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = if cli.json && !cli.wants_scan() {
        Err(CliError::new(
            "--json only applies to a port scan",
            Some("use `pixelbridge --scan --json`".to_string()),
        ))
    } else if cli.wants_scan() {
        cmd_scan(cli.baud, cli.json)
    } else {
        cmd_run(cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn scan_hint() -> Option<String> {
    Some(
        "run `pixelbridge --scan` to list ports, then pass one explicitly \
         (e.g. `pixelbridge COM3` or `pixelbridge /dev/ttyACM0`)"
            .to_string(),
    )
}

#[derive(Debug, Serialize)]
struct ScanEntry {
    #[serde(flatten)]
    port: PortCandidate,
    opens: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn cmd_scan(baud: u32, json: bool) -> Result<(), CliError> {
    let ports = discovery::list_ports().context("serial port scan failed")?;
    let entries: Vec<ScanEntry> = ports
        .into_iter()
        .map(|port| {
            let probe = discovery::probe(&port.name, baud);
            ScanEntry {
                port,
                opens: probe.is_ok(),
                error: probe.err().map(|err| err.to_string()),
            }
        })
        .collect();

    if json {
        let out = serde_json::to_string_pretty(&entries).context("JSON serialization failed")?;
        println!("{}", out);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No serial ports found!");
        return Ok(());
    }
    println!("Available serial ports:");
    for entry in &entries {
        let marker = if entry.port.likely_receiver { " *" } else { "" };
        println!("  {}{}", entry.port.describe(), marker);
    }
    println!("\nTesting port connections:");
    for entry in &entries {
        match &entry.error {
            None => println!("  ok   {}", entry.port.name),
            Some(err) => println!("  FAIL {} - {}", entry.port.name, err),
        }
    }
    if entries.iter().any(|e| e.port.likely_receiver) {
        println!("\n* likely pixel receiver");
    }
    Ok(())
}

fn cmd_run(cli: Cli) -> Result<(), CliError> {
    let layout = MatrixLayout::new(cli.width, cli.height, cli.universes, cli.leds_per_universe)
        .map_err(|err| {
            CliError::new(
                format!("invalid matrix layout: {err}"),
                Some("check --width, --height, --universes and --leds-per-universe".to_string()),
            )
        })?;
    let pattern = cli
        .pattern
        .as_deref()
        .map(str::parse::<Pattern>)
        .transpose()
        .map_err(|err| {
            CliError::new(
                err.to_string(),
                Some(format!("available patterns: {}", Pattern::NAMES.join(", "))),
            )
        })?;

    let serial = SerialConfig {
        baud_rate: cli.baud,
        settle_delay: Duration::from_millis(cli.settle_ms),
        ..SerialConfig::new(resolve_port(cli.port, cli.baud)?)
    };

    log::info!(
        "Matrix: {}x{} ({} pixels)",
        layout.width(),
        layout.height(),
        layout.num_pixels()
    );
    log::info!("Serial port: {} at {} baud", serial.port, serial.baud_rate);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            log::info!("Received shutdown signal");
            running.store(false, Ordering::SeqCst);
        })
        .context("failed to install Ctrl-C handler")?;
    }

    let mut transmitter = SerialTransmitter::new(layout.num_pixels(), serial.settle_delay);
    transmitter
        .connect(&serial.port, serial.baud_rate)
        .map_err(|err| CliError::new(format!("serial connection failed: {err}"), scan_hint()))?;

    if let Some(pattern) = pattern {
        log::info!("Pattern: {:?} - press Ctrl+C to stop", pattern);
        let mut generator = PatternGenerator::new(layout.width(), layout.height());
        let sent = patterns::drive(
            &mut transmitter,
            &mut generator,
            pattern,
            &running,
            PATTERN_FRAME_INTERVAL,
        );
        log::info!("Sent {sent} pattern frames");
        return Ok(());
    }

    log::info!(
        "Art-Net: {} universes, {} LEDs/universe, port {}",
        layout.num_universes(),
        layout.leds_per_universe(),
        ARTNET_PORT
    );
    let assembler = Arc::new(FrameAssembler::new(layout));
    let listener_config = ListenerConfig::on_ip(cli.bind);
    let listener = match NetworkListener::start(&listener_config, Arc::clone(&assembler)) {
        Ok(listener) => listener,
        Err(err) => {
            transmitter.disconnect();
            return Err(CliError::new(
                format!("failed to start Art-Net receiver: {err}"),
                Some(format!(
                    "make sure no other application holds UDP port {ARTNET_PORT}, \
                     or choose another --bind address"
                )),
            ));
        }
    };

    log::info!("Press Ctrl+C to stop");
    let bridge = Bridge::new(BridgeConfig::default(), assembler, listener, transmitter);
    let summary = bridge.run(&running);
    log::info!(
        "Bridge stopped: {} frames bridged, {} assembled, {} send failures, \
         {} datagrams received ({} ignored)",
        summary.frames_bridged,
        summary.frames_assembled,
        summary.send_failures,
        summary.datagrams_received,
        summary.datagrams_ignored
    );
    Ok(())
}

/// Uses the explicit port, or auto-detects one and checks that it opens.
fn resolve_port(port: Option<String>, baud: u32) -> Result<String, CliError> {
    if let Some(port) = port {
        return Ok(port);
    }

    log::info!("No port specified, scanning for a pixel receiver...");
    let ports = discovery::list_ports().context("serial port scan failed")?;
    for port in &ports {
        log::info!("  {}", port.describe());
    }
    let Some(detected) = discovery::auto_detect(&ports) else {
        return Err(CliError::new(
            "no serial ports found",
            Some(
                "make sure the receiver is connected; use `pixelbridge --scan` to see all ports"
                    .to_string(),
            ),
        ));
    };
    if !detected.likely_receiver {
        log::warn!(
            "No known receiver detected, falling back to {} of {} port(s)",
            detected.name,
            ports.len()
        );
    }
    log::info!("Auto-detected port: {}", detected.name);

    discovery::probe(&detected.name, baud).map_err(|err| {
        CliError::new(
            format!("auto-detected port failed connection test: {err}"),
            scan_hint(),
        )
    })?;
    Ok(detected.name.clone())
}
