//! pinbus CLI - bring up and exercise a chain of RS485 I/O boards
//!
//! Loads a YAML machine description, runs discovery and
//! configuration, and either streams switch events or fires a single
//! output for bench testing.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pinbus_config::{config_bursts, load_machine, poll_boards, MachineConfig};
use pinbus_driver::{BusDriver, DriverConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pinbus-cli")]
#[command(author, version, about = "RS485 pinball I/O board CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Machine description YAML file
    #[arg(short, long, env = "PINBUS_MACHINE")]
    machine: PathBuf,

    /// Serial device, overrides the machine file
    #[arg(short, long, env = "PINBUS_DEVICE")]
    device: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover boards on the bus and list the active ones
    Boards,

    /// Configure the machine and stream switch events until Ctrl-C
    Run,

    /// Pulse a solenoid for bench testing
    Solenoid {
        /// Solenoid number
        number: u16,

        /// Pulse length in milliseconds
        #[arg(long, default_value = "80")]
        pulse_ms: u64,
    },

    /// Switch a lamp on or off
    Lamp {
        /// Lamp number
        number: u16,

        /// Desired state: on or off
        state: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let machine = load_machine(&cli.machine)
        .with_context(|| format!("loading machine file {}", cli.machine.display()))?;
    let device = cli
        .device
        .clone()
        .unwrap_or_else(|| machine.serial_port.clone());

    let mut config = DriverConfig::serial(device);
    config.boards = poll_boards(&machine);
    let driver = BusDriver::new(config);
    driver.connect().context("connecting to the bus")?;

    let result = match cli.command {
        Commands::Boards => boards(&driver),
        Commands::Run => run(&driver, &machine),
        Commands::Solenoid { number, pulse_ms } => solenoid(&driver, &machine, number, pulse_ms),
        Commands::Lamp { number, state } => lamp(&driver, &machine, number, &state),
    };

    driver.disconnect();
    result
}

fn boards(driver: &BusDriver) -> Result<()> {
    let active = driver.active_boards();
    if active.is_empty() {
        println!("no boards answered the discovery ping");
    } else {
        for address in active {
            println!("board {address}: active");
        }
    }
    Ok(())
}

fn configure(driver: &BusDriver, machine: &MachineConfig) -> Result<()> {
    let bursts = config_bursts(machine).context("building configuration records")?;
    tracing::info!(records = bursts.len(), "configuring boards");
    for burst in &bursts {
        driver.send_config_burst(burst)?;
    }
    Ok(())
}

fn run(driver: &BusDriver, machine: &MachineConfig) -> Result<()> {
    configure(driver, machine)?;
    driver.request_switch_snapshot();
    driver.start()?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))
        .context("installing Ctrl-C handler")?;

    println!("streaming switch events, Ctrl-C to stop");
    while running.load(Ordering::SeqCst) {
        while let Some(switch) = driver.next_switch_state() {
            let state = if switch.state != 0 { "closed" } else { "open" };
            println!("switch {:>3}: {state}", switch.number);
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    Ok(())
}

fn solenoid(driver: &BusDriver, machine: &MachineConfig, number: u16, pulse_ms: u64) -> Result<()> {
    configure(driver, machine)?;
    driver.start()?;

    println!("pulsing solenoid {number} for {pulse_ms} ms");
    driver.set_solenoid_state(number, true);
    std::thread::sleep(Duration::from_millis(pulse_ms));
    driver.set_solenoid_state(number, false);
    // Leave the master loop a moment to drain the outbound queue.
    std::thread::sleep(Duration::from_millis(50));
    Ok(())
}

fn lamp(driver: &BusDriver, machine: &MachineConfig, number: u16, state: &str) -> Result<()> {
    let on = match state {
        "on" => true,
        "off" => false,
        other => anyhow::bail!("invalid lamp state '{other}', expected 'on' or 'off'"),
    };

    configure(driver, machine)?;
    driver.start()?;

    println!("lamp {number}: {state}");
    driver.set_lamp_state(number, on);
    std::thread::sleep(Duration::from_millis(50));
    Ok(())
}
