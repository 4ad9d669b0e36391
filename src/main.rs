//! ContentFlow CLI Entry Point
//!
//! Runs a content-production workflow against simulated collaborators and
//! prints its progress while polling the store, the same way an API
//! consumer would.
//!
//! # Usage
//!
//! ```bash
//! # Run one interactive workflow
//! contentflow
//!
//! # Produce three content items for specific platforms
//! contentflow --content 3 --platform youtube --platform tiktok
//!
//! # Use a custom niche list
//! contentflow --niche "city pop" --niche "jazzhop"
//!
//! # Run the automated (unmonitored) scheduler instead
//! contentflow --automated
//! ```

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use log::info;

use contentflow::execution::{Engine, PipelineConfig};
use contentflow::generation::simulated::simulated_collaborators;
use contentflow::workflow::{StepStatus, WorkflowStatus};
use contentflow::{APP_NAME, VERSION};

/// Simulated collaborator latency for the demo run.
const DEMO_LATENCY: Duration = Duration::from_millis(300);

/// Poll interval while watching workflow progress.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Command-line configuration parsed from arguments.
#[derive(Debug)]
struct Config {
    platforms: Vec<String>,
    custom_niches: Vec<String>,
    content_per_day: usize,
    automated: bool,
    verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platforms: Vec::new(),
            custom_niches: Vec::new(),
            content_per_day: 1,
            automated: false,
            verbose: false,
        }
    }
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME, VERSION);
    println!("Content Pipeline Workflow Engine");
    println!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: contentflow [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --platform NAME     Target platform (repeatable, default: youtube)");
    println!("  --niche NAME        Custom niche (repeatable, switches to custom strategy)");
    println!("  --content N         Content items per run (default: 1)");
    println!("  --automated         Run the automated scheduler instead of a guided pass");
    println!("  --verbose           Enable debug logging");
    println!("  --help              Show this help message");
    println!("  --version           Show version information");
    println!();
    println!("Examples:");
    println!("  contentflow --platform youtube --platform tiktok --content 2");
    println!("  contentflow --niche \"city pop\" --automated");
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--automated" => {
                config.automated = true;
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--platform" => {
                i += 1;
                if i >= args.len() {
                    return Err("--platform requires a name argument".to_string());
                }
                config.platforms.push(args[i].clone());
            }
            "--niche" => {
                i += 1;
                if i >= args.len() {
                    return Err("--niche requires a name argument".to_string());
                }
                config.custom_niches.push(args[i].clone());
            }
            "--content" => {
                i += 1;
                if i >= args.len() {
                    return Err("--content requires a number argument".to_string());
                }
                config.content_per_day = args[i]
                    .parse()
                    .map_err(|_| format!("Invalid content count: {}", args[i]))?;
            }
            arg => {
                return Err(format!("Unknown option: {}", arg));
            }
        }
        i += 1;
    }

    if config.platforms.is_empty() {
        config.platforms.push("youtube".to_string());
    }

    Ok(config)
}

/// Builds the pipeline configuration from parsed arguments.
fn pipeline_config(config: &Config) -> PipelineConfig {
    let mut pipeline = PipelineConfig::new(config.platforms.clone())
        .with_content_per_day(config.content_per_day);
    if !config.custom_niches.is_empty() {
        pipeline = pipeline.with_custom_niches(config.custom_niches.clone());
    }
    pipeline
}

/// Runs one interactive workflow while polling and printing its progress.
async fn run_interactive(engine: &Engine, pipeline: PipelineConfig) -> Result<(), String> {
    let progress = engine
        .start_interactive(None, pipeline)
        .map_err(|e| e.to_string())?;
    let workflow_id = progress.workflow_id.clone();

    info!("Workflow {} started", workflow_id);
    println!();

    loop {
        tokio::time::sleep(POLL_INTERVAL).await;

        let Some(snapshot) = engine.store().get_workflow_progress(&workflow_id) else {
            return Err("workflow disappeared while polling".to_string());
        };

        let active = snapshot
            .current_step()
            .map(|s| s.name.as_str())
            .unwrap_or("-");
        println!(
            "  [{:>5.1}%] step {}/{}: {}",
            snapshot.overall_progress,
            snapshot.current_step_index + 1,
            snapshot.steps.len(),
            active
        );

        if snapshot.status.is_terminal() {
            println!();
            for step in &snapshot.steps {
                let marker = match step.status {
                    StepStatus::Completed => "ok",
                    StepStatus::Failed => "FAILED",
                    _ => "-",
                };
                println!("  {:<20} {}", step.id, marker);
                if let Some(error) = &step.error {
                    println!("    error: {}", error);
                }
            }
            println!();

            engine.join(&workflow_id).await;
            return if snapshot.status == WorkflowStatus::Completed {
                println!("Workflow completed successfully");
                Ok(())
            } else {
                Err(format!("workflow {} failed", workflow_id))
            };
        }
    }
}

/// Main application entry point.
async fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();

    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    setup_logging(config.verbose);
    print_banner();

    let pipeline = pipeline_config(&config);
    info!(
        "Platforms: {:?}, content per run: {}",
        pipeline.platforms, pipeline.content_per_day
    );

    let engine = Engine::new(simulated_collaborators(DEMO_LATENCY));

    if config.automated {
        info!("Mode: automated (fire-and-forget scheduling)");
        let id = engine.start_automated(pipeline).map_err(|e| e.to_string())?;
        engine.join(&id).await;
        println!("Automated schedule finished");
        return Ok(());
    }

    run_interactive(&engine, pipeline).await
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
