//! hwwatch - Hardware Register Monitor Binary
//!
//! Samples the board registers, evaluates the configured triggers and runs
//! their actions, once or periodically as a daemon.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use hwwatch::{
    Channel, CommandRunner, Config, Engine, Environment, RegisterSource, SampleSource, SysfsBus,
    DEFAULT_CONFIG_PATH,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[cfg(feature = "i2c")]
use hwwatch::source::bus::{DEFAULT_ADDRESS, DEFAULT_BUS};

#[derive(Parser)]
#[command(name = "hwwatch")]
#[command(about = "Hardware register monitor with threshold-triggered actions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Samples external-input, push-switch and voltage registers at a fixed \
interval and runs configured actions when threshold conditions hold")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Extra KEY=VALUE environment file passed to actions
    #[arg(short, long)]
    env_file: Option<PathBuf>,

    /// Read registers from files in this directory instead of the I2C bus
    #[arg(long)]
    sysfs: Option<PathBuf>,

    /// I2C bus number
    #[cfg(feature = "i2c")]
    #[arg(long, default_value_t = DEFAULT_BUS)]
    i2c_bus: u8,

    /// I2C slave address of the board controller
    #[cfg(feature = "i2c")]
    #[arg(long, default_value_t = DEFAULT_ADDRESS, value_parser = parse_address)]
    i2c_address: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run monitoring passes (default)
    Run(RunArgs),

    /// Validate the configuration and print a summary
    Check,

    /// Read every channel once and print the samples
    Sample(SampleArgs),
}

#[derive(Args, Default)]
struct RunArgs {
    /// Keep running, one pass per interval, until interrupted
    #[arg(short = 'D', long)]
    daemon: bool,

    /// Seconds between passes, overriding the configuration
    #[arg(short, long)]
    interval: Option<f64>,
}

#[derive(Args)]
struct SampleArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Run(args)) => run_command(&cli, args).await?,
        Some(Commands::Check) => check_command(&cli)?,
        Some(Commands::Sample(args)) => sample_command(&cli, args)?,
        None => run_command(&cli, &RunArgs::default()).await?,
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(log_level(cli), &directives))
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn log_level(cli: &Cli) -> LevelFilter {
    if cli.debug {
        LevelFilter::DEBUG
    } else if cli.verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

/// `RUST_LOG` directives when given, otherwise the level from the flags.
fn log_filter(level: LevelFilter, directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives)
}

#[cfg(feature = "i2c")]
fn parse_address(text: &str) -> Result<u16, String> {
    let parsed = match text.strip_prefix("0x") {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid I2C address '{}': {}", text, e))
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    Config::load(&cli.config)
        .with_context(|| format!("invalid configuration {}", cli.config.display()))
}

fn open_source(cli: &Cli) -> anyhow::Result<Box<dyn SampleSource>> {
    if let Some(dir) = &cli.sysfs {
        info!("Reading registers from {}", dir.display());
        return Ok(Box::new(RegisterSource::new(SysfsBus::new(dir))));
    }

    #[cfg(feature = "i2c")]
    let bus = hwwatch::source::bus::I2cBus::new(cli.i2c_bus, cli.i2c_address)?;

    #[cfg(not(feature = "i2c"))]
    let bus = {
        warn!("I2C support not compiled in; register reads will fail without --sysfs");
        hwwatch::DefaultBus::open_default()?
    };

    Ok(Box::new(RegisterSource::new(bus)))
}

async fn run_command(cli: &Cli, args: &RunArgs) -> anyhow::Result<()> {
    let mut config = load_config(cli)?;
    if let Some(secs) = args.interval {
        config = config.with_interval(secs)?;
    }

    let mut env = Environment::from_host();
    if let Some(path) = &cli.env_file {
        env.load_env_file(path)?;
        info!("Loaded action environment from {}", path.display());
    }

    let source = open_source(cli)?;
    let mut engine = Engine::from_config(&config, env, source, CommandRunner::new());

    info!("Starting hwwatch...");
    for monitor in engine.monitors() {
        info!(
            "  - {}: history {}, {} trigger(s)",
            monitor.channel(),
            monitor.history().capacity(),
            monitor.triggers().len()
        );
    }
    if args.daemon {
        info!("  - Interval: {:?}", config.interval());
        let mut shutdown = Shutdown::install()?;
        engine
            .run_until(config.interval(), shutdown.recv())
            .await
            .context("monitoring pass failed")?;
        info!("Interrupted after {} pass(es), exiting", engine.pass_count());
    } else {
        engine.run_pass().context("monitoring pass failed")?;
    }

    Ok(())
}

fn check_command(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;

    println!("Configuration {} is valid", cli.config.display());
    println!("  Interval: {:?}", config.interval());
    for monitor in &config.monitors {
        println!(
            "  {} (history {}):",
            monitor.channel, monitor.history_size
        );
        if monitor.commands.is_empty() {
            println!("    no triggers");
        }
        for cmd in &monitor.commands {
            let selector = if monitor.channel.is_tuple() && cmd.channel != 0 {
                format!(" rail {}", cmd.channel)
            } else {
                String::new()
            };
            println!(
                "    {}{} {}{} -> {}",
                cmd.condition,
                selector,
                cmd.threshold,
                if cmd.oneshot { " (oneshot)" } else { "" },
                cmd.action
            );
        }
    }

    Ok(())
}

fn sample_command(cli: &Cli, args: &SampleArgs) -> anyhow::Result<()> {
    let mut source = open_source(cli)?;
    let taken_at = chrono::Utc::now();

    let mut samples = Vec::with_capacity(Channel::ALL.len());
    for channel in Channel::ALL {
        samples.push((channel, source.read(channel)?));
    }

    match args.format {
        OutputFormat::Json => {
            let mut channels = serde_json::Map::new();
            for (channel, sample) in &samples {
                channels.insert(channel.name().to_string(), serde_json::to_value(sample)?);
            }
            let doc = serde_json::json!({
                "timestamp": taken_at.to_rfc3339(),
                "samples": channels,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Pretty => {
            println!(
                "Register Snapshot ({})",
                taken_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("==========================================");
            for (channel, sample) in &samples {
                println!("  {:<8} {}", channel.name(), sample);
            }
        }
    }

    Ok(())
}

/// Interrupt and terminate signals, registered before the first pass so a
/// signal arriving mid-pass ends the loop once the pass completes.
struct Shutdown {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl Shutdown {
    #[cfg(unix)]
    fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    async fn recv(&mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => {}
            _ = self.terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) {
        let _ = tokio::signal::ctrl_c().await;
    }
}
