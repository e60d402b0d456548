//! Lotto Slip Scanner
//!
//! A desktop client for a lottery slip analysis service: mark the corners
//! of a slip photo, send it off for OCR, and keep track of purchase
//! history and winnings.

// Hide console window on Windows release builds
#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

mod analysis;
mod client;
mod config;
mod gui;
mod paths;
mod selector;

use anyhow::Result;
use chrono::Local;
use env_logger::{Env, Target};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};

const LOG_FILE_NAME: &str = "lotto_scanner.log";

/// Writes every log line to a primary sink and, if open, a second one.
struct Tee<A: Write, B: Write> {
    primary: A,
    secondary: Option<B>,
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        if let Some(secondary) = &mut self.secondary {
            // File errors are ignored so console logging keeps working
            let _ = secondary.write_all(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        if let Some(secondary) = &mut self.secondary {
            let _ = secondary.flush();
        }
        Ok(())
    }
}

fn open_log_file() -> Option<File> {
    let log_path = paths::get_logs_dir().join(LOG_FILE_NAME);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| eprintln!("Could not open log file {}: {}", log_path.display(), e))
        .ok()
}

/// Logs to stdout and logs/lotto_scanner.log with a timestamp.
/// `RUST_LOG` overrides the default `info` filter.
fn init_logging() {
    let tee = Tee {
        primary: io::stdout(),
        secondary: open_log_file(),
    };

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(tee)))
        .init();
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        log::error!("[PANIC]{} {}", location, msg);
    }));
}

fn main() -> Result<()> {
    // Log directory must exist before the log file is opened
    let dirs_result = paths::ensure_directories();
    init_logging();
    install_panic_hook();
    if let Err(e) = dirs_result {
        log::warn!("Failed to create output directories: {}", e);
    }

    log::info!("Lotto Slip Scanner {}", env!("CARGO_PKG_VERSION"));
    let config = config::AppConfig::load(&paths::get_config_path());

    log::info!("Starting GUI application...");
    match gui::run_gui(config) {
        Ok(()) => {
            log::info!("GUI application exited normally");
            Ok(())
        }
        Err(e) => {
            log::error!("{:#}", e);
            Err(e)
        }
    }
}
