//! Progress bars for the commit walk and cache writes

use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} {prefix}: [{bar:40.cyan/blue}] {pos}/{len} {msg} ({eta})";

/// An active progress bar
pub trait ProgressHandle: Send + Sync {
    fn inc(&self, n: u64);
    /// Text after the counter; the walk shows the current commit id
    fn set_message(&self, msg: &str);
    fn finish(&self);
}

/// Starts one bar per pipeline phase
pub trait ProgressReporter: Send + Sync {
    fn start(&self, label: &str, total: u64) -> Box<dyn ProgressHandle>;
}

impl ProgressHandle for ProgressBar {
    fn inc(&self, n: u64) {
        ProgressBar::inc(self, n);
    }

    fn set_message(&self, msg: &str) {
        ProgressBar::set_message(self, msg.to_string());
    }

    fn finish(&self) {
        self.finish_and_clear();
    }
}

impl ProgressHandle for () {
    fn inc(&self, _n: u64) {}
    fn set_message(&self, _msg: &str) {}
    fn finish(&self) {}
}

/// indicatif bars on stderr. Hidden bars keep counting without drawing.
pub struct TerminalProgress {
    visible: bool,
}

impl TerminalProgress {
    pub fn new(visible: bool) -> Self {
        Self { visible }
    }

    pub fn bar(&self, label: &str, total: u64) -> ProgressBar {
        let bar = if self.visible {
            ProgressBar::new(total)
        } else {
            ProgressBar::hidden()
        };
        bar.set_length(total);
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.with_prefix(label.to_string())
    }
}

impl ProgressReporter for TerminalProgress {
    fn start(&self, label: &str, total: u64) -> Box<dyn ProgressHandle> {
        Box::new(self.bar(label, total))
    }
}

/// Draws nothing and keeps no counters; used in profile mode and tests
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn start(&self, _label: &str, _total: u64) -> Box<dyn ProgressHandle> {
        Box::new(())
    }
}
