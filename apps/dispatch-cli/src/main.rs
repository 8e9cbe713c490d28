use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::thread;
use tracing::info;

use device_registry as devreg;
use motor_driver::MockDriver;

#[derive(Parser, Debug)]
#[command(
    name = "dispatch",
    version,
    about = "Motor controller command dispatch",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a SPARK MAX config file and print the resulting settings
    Translate {
        /// YAML config file path
        #[arg(long)]
        file: String,
        /// Print JSON instead of one setting per line
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Run a command batch through the dispatcher against the mock driver
    Run {
        /// YAML command batch
        #[arg(long)]
        commands: String,
        /// Dispatcher YAML config
        #[arg(long)]
        config: Option<String>,
        /// Sleep one cycle period between cycles
        #[arg(long, action = ArgAction::SetTrue)]
        realtime: bool,
        /// Print Prometheus metrics after the run
        #[arg(long, action = ArgAction::SetTrue)]
        metrics: bool,
    },
    /// List device type and command kind wire tags
    Tags,
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Translate { file, json } => translate(&file, json),
        Commands::Run {
            commands,
            config,
            realtime,
            metrics,
        } => run(&commands, config.as_deref(), realtime, metrics),
        Commands::Tags => tags(),
    }
}

fn setup_tracing() {
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn translate(path: &str, json: bool) -> Result<()> {
    let raw = devreg::load_spark_config(path)?;
    let config = devreg::translate(&devreg::decode_config(&raw))
        .map_err(|e| anyhow::anyhow!("translate failed: {e}"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        for setting in config.settings() {
            println!("{:?}\t{:?}", setting.section(), setting);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct Line<'a> {
    cycle: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    ts: Option<&'a str>,
    #[serde(flatten)]
    outcome: &'a devreg::CommandOutcome,
}

fn run(commands: &str, config: Option<&str>, realtime: bool, metrics: bool) -> Result<()> {
    let config = match config {
        Some(path) => devreg::load_dispatcher_config(path)?,
        None => devreg::DispatcherConfig::default(),
    };
    let batch = devreg::load_command_batch(commands)?;
    info!("Loaded {} commands from {}", batch.len(), commands);

    let mut router = devreg::CommandRouter::new();
    router.register(Box::new(devreg::SparkMaxRegistry::new(MockDriver::new())))?;
    let hub = devreg::MetricsHub::new().map_err(|e| anyhow::anyhow!(e))?;
    let period = config.cycle_period();
    let mut dispatcher = devreg::Dispatcher::new(router, config).with_metrics(hub);
    dispatcher.queue().extend(batch);

    let mut failures = 0usize;
    while !dispatcher.queue().is_empty() {
        let report = dispatcher.run_cycle();
        failures += report.failures();
        for outcome in &report.outcomes {
            let line = Line {
                cycle: report.cycle,
                ts: report.ts.as_deref(),
                outcome,
            };
            println!("{}", serde_json::to_string(&line)?);
        }
        if realtime && report.pending > 0 {
            thread::sleep(period);
        }
    }

    info!(
        "Dispatch finished: {} live devices, {} failed commands",
        dispatcher.router().device_count(),
        failures
    );
    if metrics {
        if let Some(hub) = dispatcher.metrics() {
            print!("{}", hub.encode_text());
        }
    }
    Ok(())
}

fn tags() -> Result<()> {
    println!("device types:");
    for kind in devreg::DeviceType::ALL {
        println!("  {}\t{:?}", kind.tag(), kind);
    }
    println!("command kinds:");
    for kind in devreg::CommandKind::ALL {
        println!("  {}\t{:?}", kind.tag(), kind);
    }
    Ok(())
}
