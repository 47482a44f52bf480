// src/logger.rs
// Console output with colored levels, optional timestamps and request lines

use chrono::{DateTime, Local};
use colored::*;
use qrcode::render::unicode;
use qrcode::types::QrError;
use qrcode::QrCode;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Http,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LogLevel::Http => write!(f, "{}", " HTTP ".on_blue().bold().white()),
            LogLevel::Info => write!(f, "{}", " INFO ".on_magenta().bold().white()),
            LogLevel::Warn => write!(f, "{}", " WARN ".on_yellow().bold().black()),
            LogLevel::Error => write!(f, "{}", " ERROR ".on_red().bold().white()),
        }
    }
}

pub struct Logger {
    pub enable_request_logging: bool,
    pub enable_timestamps: bool,
}

impl Logger {
    pub const fn new() -> Self {
        Self {
            enable_request_logging: true,
            enable_timestamps: true,
        }
    }

    pub fn with_request_logging(mut self, enable: bool) -> Self {
        self.enable_request_logging = enable;
        self
    }

    pub fn with_timestamps(mut self, enable: bool) -> Self {
        self.enable_timestamps = enable;
        self
    }

    fn format_timestamp(&self) -> String {
        if self.enable_timestamps {
            let now: DateTime<Local> = Local::now();
            format!("{} ", now.format("%Y-%m-%d %H:%M:%S").to_string().dimmed())
        } else {
            String::new()
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        let timestamp = self.format_timestamp();
        // Warnings and errors go to stderr.
        match level {
            LogLevel::Warn | LogLevel::Error => eprintln!("{}{} {}", timestamp, level, message),
            LogLevel::Http | LogLevel::Info => println!("{}{} {}", timestamp, level, message),
        }
    }

    pub fn http(&self, peer: &str, method: &str, path: &str, status: u16, response_time: u128) {
        if !self.enable_request_logging {
            return;
        }

        let timestamp = self.format_timestamp();
        let status_colored = if status < 400 {
            status.to_string().green()
        } else {
            status.to_string().red()
        };
        println!(
            "{}{} [{}] {} - {} in {} ms",
            timestamp,
            LogLevel::Http,
            peer.yellow(),
            format!("{} {}", method, path).cyan(),
            status_colored,
            response_time
        );
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn startup_info(&self, name: &str, version: &str) {
        self.info(&format!("Starting {} v{}", name.bold(), version.bold()));
    }

    /// Announce where the server listens and how clients reach it.
    pub fn server_info(&self, file_count: usize, bound: &str, reachable_url: Option<&str>) {
        let files = if file_count == 1 { "file" } else { "files" };

        if !atty::is(atty::Stream::Stdout) {
            self.info(&format!("Ready to share {} {}.", file_count, files));
            self.info(&format!("Bound to {}.", bound));
            if let Some(url) = reachable_url {
                self.info(&format!("Server reachable at: {}", url));
            }
            return;
        }

        let mut message = format!(
            "{}\n\n{}  {}",
            format!("Ready to share {} {}!", file_count, files).green().bold(),
            "Bound to:".bold(),
            bound.bright_cyan()
        );
        if let Some(url) = reachable_url {
            message += &format!("\n{}  {}", "Reachable:".bold(), url.bright_cyan());
        }
        self.print_boxed(&message);
    }

    pub fn print_boxed(&self, message: &str) {
        let lines: Vec<&str> = message.lines().collect();
        if lines.is_empty() {
            return;
        }

        let max_width = lines
            .iter()
            .map(|line| strip_ansi_codes(line).chars().count())
            .max()
            .unwrap_or(0);

        // 2 spaces padding on each side
        let box_width = max_width + 4;

        println!("┌{}┐", "─".repeat(box_width));
        println!("│{}│", " ".repeat(box_width));

        for line in lines {
            let stripped_len = strip_ansi_codes(line).chars().count();
            let padding = " ".repeat((box_width - stripped_len) / 2);
            let right_padding = " ".repeat(box_width - stripped_len - padding.len());
            println!("│{}{}{}│", padding, line, right_padding);
        }

        println!("│{}│", " ".repeat(box_width));
        println!("└{}┘", "─".repeat(box_width));
        println!();
    }

    /// Print `url` as a QR code for scanning from a phone.
    pub fn qr_code(&self, url: &str) {
        match render_qr_code(url) {
            Ok(code) => println!("{}", code),
            Err(e) => self.warn(&format!("Unable to render QR code: {}", e)),
        }
    }

    pub fn termination_message(&self, signal: &str) {
        println!();
        self.warn(&format!("Terminating due to signal {}.", signal));
    }

    pub fn force_shutdown_message(&self) {
        println!();
        self.warn("Force-closing all open sockets...");
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

// Helper function to strip ANSI color codes for width calculation
fn strip_ansi_codes(s: &str) -> String {
    let mut result = String::new();
    let mut in_escape = false;
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            in_escape = true;
            continue;
        }

        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
            continue;
        }

        result.push(ch);
    }

    result
}

/// Light modules on dark, which is what terminals usually show.
pub fn render_qr_code(data: &str) -> Result<String, QrError> {
    let code = QrCode::new(data.as_bytes())?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}

static GLOBAL_LOGGER: OnceLock<Logger> = OnceLock::new();
static DEFAULT_LOGGER: Logger = Logger::new();

pub fn init_logger(enable_request_logging: bool, enable_timestamps: bool) {
    let _ = GLOBAL_LOGGER.set(
        Logger::new()
            .with_request_logging(enable_request_logging)
            .with_timestamps(enable_timestamps),
    );
}

pub fn get_logger() -> &'static Logger {
    GLOBAL_LOGGER.get().unwrap_or(&DEFAULT_LOGGER)
}
