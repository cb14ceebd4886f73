use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use skarv_config::SkarvConfig;
use skarv_hal::DescriptorInfo;
use skarv_module::{major_api_version, registry, PlatformModule};
use skarv_service::loader;
use skarv_sim::{SimConfig, SimModule};
use skarv_telemetry::{AllocMetrics, ServiceLogger};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the installed module and print backend state
    Probe(ProbeArgs),
    /// Allocate one batch of buffers and print the outcome
    Alloc(AllocArgs),
    /// Hammer the allocator from many threads and report device-side counters
    Stress(StressArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Packed api version for the simulated module (e.g. 0x0100 or 256);
    /// overrides the configured one
    #[arg(long, value_parser = parse_version)]
    pub api_version: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct AllocArgs {
    /// Number of buffers in the batch
    #[arg(long, default_value_t = 1)]
    pub count: u32,
    #[arg(long, default_value_t = 1024)]
    pub width: u32,
    #[arg(long, default_value_t = 1)]
    pub height: u32,
    #[arg(long, default_value_t = 1)]
    pub format: u32,
    /// Layer count; legacy modules reject anything above 1
    #[arg(long, default_value_t = 1)]
    pub layers: u32,
    #[arg(long, default_value_t = 0)]
    pub usage: u64,
    #[arg(long, value_parser = parse_version)]
    pub api_version: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct StressArgs {
    /// Worker threads (defaults to the number of CPUs)
    #[arg(long, default_value_t = num_cpus::get())]
    pub threads: usize,
    /// Allocation calls per thread
    #[arg(long, default_value_t = 100)]
    pub iterations: usize,
    /// Buffers per allocation call
    #[arg(long, default_value_t = 2)]
    pub count: u32,
    #[arg(long, value_parser = parse_version)]
    pub api_version: Option<u32>,
}

fn parse_version(raw: &str) -> Result<u32, String> {
    let parsed = match raw.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|_| format!("invalid api version '{raw}'"))
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = SkarvConfig::load().context("loading configuration")?;
    ServiceLogger::init_with_filter(&config.telemetry.log_filter);
    let metrics = Arc::new(AllocMetrics::new());

    match cli.command {
        Commands::Probe(args) => run_probe(args, &config, metrics),
        Commands::Alloc(args) => run_alloc(args, &config, metrics),
        Commands::Stress(args) => run_stress(args, &config, metrics),
    }
}

/// Installs the simulated module under the configured id so the loader has
/// something to probe. Processes embedding a real platform module install
/// theirs instead.
fn install_module(
    config: &SkarvConfig,
    api_version: Option<u32>,
) -> anyhow::Result<Arc<SimModule>> {
    let module = Arc::new(SimModule::with_api_version(
        &config.service.module_id,
        api_version.unwrap_or(config.sim.api_version),
        SimConfig {
            capacity: config.sim.capacity,
            stride_align: config.sim.stride_align,
        },
    ));
    registry::install(module.clone()).context("installing the simulated module")?;
    Ok(module)
}

fn run_probe(args: ProbeArgs, config: &SkarvConfig, metrics: Arc<AllocMetrics>) -> anyhow::Result<()> {
    let module = install_module(config, args.api_version)?;
    let raw = module.api_version();

    let allocator = loader::load_module(&config.service.module_id, metrics)
        .context("loading the allocation service")?;

    println!("module id: {}", config.service.module_id);
    println!("api version: {:#06x} (major {})", raw, major_api_version(raw));
    println!("{}", allocator.dump_debug_info());
    Ok(())
}

fn run_alloc(args: AllocArgs, config: &SkarvConfig, metrics: Arc<AllocMetrics>) -> anyhow::Result<()> {
    install_module(config, args.api_version)?;
    let allocator = loader::load_module(&config.service.module_id, metrics.clone())
        .context("loading the allocation service")?;

    let descriptor = DescriptorInfo {
        width: args.width,
        height: args.height,
        format: args.format,
        layer_count: args.layers,
        usage: args.usage,
    }
    .encode();

    allocator.allocate(&descriptor, args.count, |result| match result {
        Ok(batch) => {
            println!(
                "allocated {} buffers, stride {} bytes",
                batch.buffers.len(),
                batch.stride
            );
            for handle in &batch.buffers {
                println!("  buffer token {}", handle.token());
            }
            Ok(())
        }
        Err(status) => Err(anyhow::anyhow!("allocation failed: {status}")),
    })?;

    println!("{}", metrics.gather()?);
    Ok(())
}

fn run_stress(
    args: StressArgs,
    config: &SkarvConfig,
    metrics: Arc<AllocMetrics>,
) -> anyhow::Result<()> {
    let module = install_module(config, args.api_version)?;
    let allocator = loader::load_module(&config.service.module_id, metrics.clone())
        .context("loading the allocation service")?;

    let descriptor = DescriptorInfo {
        width: 256,
        height: 256,
        format: 1,
        layer_count: 1,
        usage: 0,
    }
    .encode();

    info!(
        threads = args.threads,
        iterations = args.iterations,
        count = args.count,
        "starting stress run"
    );

    std::thread::scope(|scope| {
        for _ in 0..args.threads {
            let allocator = &allocator;
            let descriptor = &descriptor;
            scope.spawn(move || {
                for _ in 0..args.iterations {
                    allocator.allocate(descriptor, args.count, |result| {
                        if let Err(status) = result {
                            warn!(%status, "stress allocation failed");
                        }
                    });
                }
            });
        }
    });

    println!("allocation calls: {}", module.alloc_calls());
    println!("overlapping device calls: {}", module.overlap_count());
    println!("leaked buffers: {}", module.live_count());
    println!("double frees: {}", module.double_free_count());
    println!("{}", metrics.gather()?);
    Ok(())
}
