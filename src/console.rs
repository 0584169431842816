//! In-app console log, mirrored to the `log` facade

use log::Level;

const MAX_LINES: usize = 500;

#[derive(Debug, Clone)]
pub struct ConsoleLog {
    lines: Vec<String>,
}

impl Default for ConsoleLog {
    fn default() -> Self {
        let mut console = Self { lines: Vec::new() };
        console.info("Movie Tracker started");
        console
    }
}

impl ConsoleLog {
    pub fn push(&mut self, level: Level, message: &str) {
        log::log!(level, "{}", message);
        let tag = match level {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug | Level::Trace => "DEBUG",
        };
        self.lines.push(format!("[{}] [{}] {}", timestamp_now(), tag, message));
        // Keep last 500 lines
        if self.lines.len() > MAX_LINES {
            let excess = self.lines.len() - MAX_LINES;
            self.lines.drain(..excess);
        }
    }

    pub fn info(&mut self, message: &str) {
        self.push(Level::Info, message);
    }

    pub fn warn(&mut self, message: &str) {
        self.push(Level::Warn, message);
    }

    pub fn error(&mut self, message: &str) {
        self.push(Level::Error, message);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.info("Console cleared");
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Local time as HH:MM:SS
fn timestamp_now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
