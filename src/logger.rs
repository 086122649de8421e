//! Tagged console logging for the swap demo.
//!
//! Condensed single-file logger: colored, timestamped lines with a module
//! tag per message. Debug output is gated behind `init(verbose)`.
//!
//! ```rust
//! use swapdesk::logger::{self, LogTag};
//!
//! logger::info(LogTag::Tokens, "Loaded 42 tokens");
//! logger::error(LogTag::Swap, "Transaction reverted");
//! ```

use chrono::Utc;
use colored::*;
use std::io::{ self, Write };
use std::sync::atomic::{ AtomicBool, Ordering };

static VERBOSE: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    System,
    Wallet,
    Tokens,
    Route,
    Swap,
    Rpc,
}

impl LogTag {
    fn label(&self) -> ColoredString {
        match self {
            LogTag::System => "SYSTEM".cyan().bold(),
            LogTag::Wallet => "WALLET".blue().bold(),
            LogTag::Tokens => "TOKENS".magenta().bold(),
            LogTag::Route => "ROUTE".yellow().bold(),
            LogTag::Swap => "SWAP".green().bold(),
            LogTag::Rpc => "RPC".white().bold(),
        }
    }
}

/// Initialize the logger. Call once at startup, before any logging occurs.
pub fn init(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

fn timestamp() -> String {
    Utc::now().format("%H:%M:%S%.3f").to_string()
}

fn emit(icon: ColoredString, tag: LogTag, message: &str) {
    println!(
        "{} {} {} {}",
        icon,
        tag.label(),
        format!("[{}]", timestamp()).dimmed(),
        message
    );
    io::stdout().flush().ok();
}

pub fn info(tag: LogTag, message: &str) {
    emit("ℹ".blue().bold(), tag, message);
}

pub fn warn(tag: LogTag, message: &str) {
    emit("⚠".yellow().bold(), tag, &message.yellow().to_string());
}

pub fn error(tag: LogTag, message: &str) {
    emit("❌".red().bold(), tag, &message.red().to_string());
}

pub fn success(tag: LogTag, message: &str) {
    emit("✅".green().bold(), tag, &message.green().to_string());
}

/// Only shown when started with --verbose.
pub fn debug(tag: LogTag, message: &str) {
    if VERBOSE.load(Ordering::Relaxed) {
        emit("🐛".purple().bold(), tag, &message.dimmed().to_string());
    }
}
