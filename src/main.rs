//! logcat-monitor - Real-time Android log monitoring
//!
//! This is the binary entry point. All logic lives in the workspace crates.

mod cli;

use std::io::Write;

use clap::Parser;
use logmon_adb::{locate_adb, AdbLogcat};
use logmon_app::config::resolve_settings;
use logmon_app::{
    cancel_pair, persist, spawn_signal_handler, summarize, to_json, SessionOutcome,
    StreamController,
};
use logmon_core::prelude::*;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    color_eyre::install().map_err(|e| Error::terminal(e.to_string()))?;
    if let Err(e) = logmon_core::logging::init() {
        eprintln!("⚠️  Diagnostic logging unavailable: {}", e);
    }

    match run(args).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("logmon failed: {}", e);
            eprintln!("❌ {}", e);
            if let Ok(log_file) = logmon_core::logging::get_current_log_file() {
                eprintln!("   Diagnostics: {}", log_file.display());
            }
            std::process::exit(1);
        }
    }
}

/// Run one monitoring session and print its report. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let settings = resolve_settings(args.config.as_deref())?;
    let config = args.monitor_config(&settings)?;

    let follow = config.follow;
    let outcome = match locate_adb(args.adb_hint(&settings).as_deref()) {
        Ok(adb) => {
            info!("Using adb at {}", adb.display());
            let source = AdbLogcat::new(adb, config.device_serial.clone())
                .with_line_buffer(settings.source.line_buffer)
                .with_shutdown_timeout(settings.shutdown_timeout());

            eprintln!("Monitoring logs...");
            if let Some(app) = &config.app_package {
                eprintln!("App: {}", app);
            }

            let (handle, token) = cancel_pair();
            spawn_signal_handler(handle);

            let mut controller = StreamController::new(source, config);
            controller.run(token).await
        }
        Err(e) => {
            error!("Cannot start log source: {}", e);
            SessionOutcome::launch_failed(&config, e)
        }
    };

    if let Some(e) = &outcome.error {
        eprintln!("❌ {}", e);
    }

    let mut exit_code = if outcome.is_failed() { 1 } else { 0 };

    if let Some(dir) = &args.output {
        match persist(&outcome.snapshot, dir) {
            Ok(path) => eprintln!("\nLogs saved to: {}", path.display()),
            Err(e) => {
                error!("Failed to save logs to {}: {}", dir.display(), e);
                eprintln!("❌ Failed to save logs: {}", e);
                exit_code = 1;
            }
        }
    }

    let rendered = if args.json {
        to_json(&outcome.snapshot)?
    } else {
        format!(
            "\n{}",
            summarize(
                &outcome.snapshot,
                args.verbose,
                settings.report.display_width
            )
        )
    };

    // In follow mode stdout belongs to the live stream
    let printed = if follow {
        writeln!(std::io::stderr().lock(), "{}", rendered)
    } else {
        writeln!(std::io::stdout().lock(), "{}", rendered)
    };
    if let Err(e) = printed {
        warn!("Could not print report: {}", e);
    }

    Ok(exit_code)
}
