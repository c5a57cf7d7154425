#[cfg(test)]
use std::cell::RefCell;

#[cfg(test)]
use log::Level;

/// Sink for human-readable progress and skip messages.
///
/// Purely observational: nothing a sink does may change parse results.
pub trait Diagnostics {
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
}

/// Forwards to the `log` facade under a fixed target.
pub struct LogDiagnostics {
    module: &'static str,
}

impl LogDiagnostics {
    pub fn new(module: &'static str) -> Self {
        Self { module }
    }
}

impl Default for LogDiagnostics {
    fn default() -> Self {
        Self::new("expense_insights")
    }
}

impl Diagnostics for LogDiagnostics {
    fn error(&self, message: &str) {
        log::error!(target: self.module, "{message}");
    }

    fn warn(&self, message: &str) {
        log::warn!(target: self.module, "{message}");
    }

    fn info(&self, message: &str) {
        log::info!(target: self.module, "{message}");
    }

    fn debug(&self, message: &str) {
        log::debug!(target: self.module, "{message}");
    }
}

#[cfg(test)]
pub struct NoopDiagnostics;

#[cfg(test)]
impl Diagnostics for NoopDiagnostics {
    fn error(&self, _: &str) {}
    fn warn(&self, _: &str) {}
    fn info(&self, _: &str) {}
    fn debug(&self, _: &str) {}
}

/// Keeps every line in memory, in arrival order.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingDiagnostics {
    lines: RefCell<Vec<(Level, String)>>,
}

#[cfg(test)]
impl RecordingDiagnostics {
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.borrow().clone()
    }

    pub fn at(&self, level: Level) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.lines.borrow_mut().push((level, message.to_string()));
    }
}

#[cfg(test)]
impl Diagnostics for RecordingDiagnostics {
    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn debug(&self, message: &str) {
        self.push(Level::Debug, message);
    }
}
