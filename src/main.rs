use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info, LevelFilter};

use duelbots::game::{simulate, BattleConfig};
use duelbots::logging::init_logger;
use duelbots::replay::BattleStatus;
use duelbots::script::parse_program;

// Command line arguments structure
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Paths to the two robot rule scripts.
    #[arg(required = true, num_args = 2)]
    scripts: Vec<PathBuf>,

    /// Arena side length in tiles.
    #[arg(long, default_value_t = duelbots::config::DEFAULT_ARENA_SIZE)]
    arena_size: u32,

    /// Maximum number of simulation ticks.
    #[arg(long, default_value_t = duelbots::config::DEFAULT_MAX_TICKS)]
    max_ticks: u32,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Optional comma-separated list of targets for debug/trace logging
    /// (rules, sense, drive, weapon).
    #[arg(long)]
    debug_filter: Option<String>,

    /// Write the battle result JSON here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print the result JSON.
    #[arg(long)]
    pretty: bool,
}

fn main() {
    let args = Args::parse();

    let log_level_filter = match args.log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => {
            eprintln!(
                "Warning: Invalid log level '{}'. Defaulting to 'info'.",
                args.log_level
            );
            LevelFilter::Info
        }
    };

    if let Err(e) = init_logger(log_level_filter, args.debug_filter.clone()) {
        eprintln!("Failed to set up logging: {}", e);
        process::exit(1);
    }

    // Load and parse both scripts before touching the simulator; a script
    // diagnostic names its file and 1-based line.
    let mut programs = Vec::with_capacity(2);
    for path in &args.scripts {
        let source = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                error!("Error reading {}: {}", path.display(), e);
                process::exit(1);
            }
        };
        match parse_program(&source) {
            Ok(program) => {
                info!(
                    "Parsed {} ({} rules)",
                    path.display(),
                    program.rules.len()
                );
                programs.push(program);
            }
            Err(e) => {
                error!("{}: {}", path.display(), e);
                process::exit(1);
            }
        }
    }

    let cfg = BattleConfig {
        arena_size: args.arena_size,
        max_ticks: args.max_ticks,
        ..BattleConfig::default()
    };

    let result = match simulate(&programs[0], &programs[1], &cfg) {
        Ok(result) => result,
        Err(e) => {
            error!("Battle setup failed: {}", e);
            process::exit(1);
        }
    };

    match result.status {
        BattleStatus::Finished => info!(
            "Result: {} wins after {} ticks",
            result.winner.as_deref().unwrap_or("?"),
            result.ticks.len()
        ),
        BattleStatus::Draw => info!("Result: draw after {} ticks", result.ticks.len()),
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    };
    let json = match json {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize battle result: {}", e);
            process::exit(1);
        }
    };

    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                error!("Failed to write {}: {}", path.display(), e);
                process::exit(1);
            }
            info!("Wrote battle result to {}", path.display());
        }
        None => println!("{}", json),
    }
}
