//! `armswing-cli` – interactive front end for the arm-swing estimator.
//!
//! This binary:
//!
//! 1. Loads `~/.armswing/config.toml` (estimator tolerances and the starting
//!    demo pose), falling back to defaults when it is absent or invalid.
//! 2. Drops the user into an **interactive REPL** that estimates the built-in
//!    mock poses or JSON keypoint files (`/mock`, `/next`, `/estimate`,
//!    `/explain`, `/schema`, `/settings`, `/help`).
//! 3. Intercepts **Ctrl-C** and exits the REPL cleanly.

mod config;
mod demo;
mod input;
mod repl;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

fn main() {
    init_logging();
    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – exiting armswing.".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(
            error = %e,
            "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available"
        );
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let path = config::config_path();
    let cfg = match config::load() {
        Ok(cfg) if path.exists() => {
            println!("  Config loaded from {}", path.display().to_string().bold());
            cfg
        }
        Ok(cfg) => {
            println!(
                "  No config at {} – using defaults. Run {} to save one.",
                path.display().to_string().dimmed(),
                "/settings".bold()
            );
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::with_env_overrides(config::Config::default())
        }
    };
    info!(
        min_projected_norm = cfg.min_projected_norm,
        dead_zone = cfg.dead_zone,
        start_pose = %cfg.start_pose,
        "configuration ready"
    );

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    repl::run(shutdown, cfg);
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

/// Initialise `tracing-subscriber` from `RUST_LOG` (default `"info"`).
///
/// Set `ARMSWING_LOG_FORMAT=json` for newline-delimited JSON logs.  The REPL's
/// user-facing output still goes through `println!`.
fn init_logging() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("ARMSWING_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("  {} {}",
        "armswing".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Sagittal-plane arm-swing estimator");
    println!();
}
