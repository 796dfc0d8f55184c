//! CLI presenter for output formatting

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::records::{InventoryItem, RecommendationRecord, TicketAnalysis};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
    is_spinner_active: Arc<AtomicBool>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self {
            spinner: None,
            is_spinner_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
        self.is_spinner_active.store(true, Ordering::SeqCst);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.is_spinner_active.load(Ordering::SeqCst)
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout (the actual result)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Format capture progress bar
    pub fn format_progress(&self, elapsed_ms: u64, total_ms: u64) -> String {
        let elapsed_secs = elapsed_ms / 1000;
        let total_secs = total_ms / 1000;
        let percent = if total_ms > 0 {
            (elapsed_ms as f64 / total_ms as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        let bar_width = 20;
        let filled = ((percent / 100.0) * bar_width as f64) as usize;
        let empty = bar_width - filled;

        format!(
            "[{}{}] {:>3}s / {}s",
            "█".repeat(filled).cyan(),
            "░".repeat(empty),
            elapsed_secs,
            total_secs
        )
    }

    /// Update capture progress
    pub fn update_capture_progress(&self, elapsed_ms: u64, total_ms: u64) {
        let progress = self.format_progress(elapsed_ms, total_ms);
        self.update_spinner(&format!(
            "Listening... {}  (Enter to send, Ctrl-C to cancel)",
            progress
        ));
    }

    /// Print ranked recommendations to stdout
    pub fn recommendations(&self, records: &[RecommendationRecord]) {
        if records.is_empty() {
            self.info("No recommendations");
            return;
        }
        for (i, record) in records.iter().enumerate() {
            self.output(&format_recommendation(i + 1, record));
        }
    }

    pub fn ticket(&self, analysis: &TicketAnalysis) {
        self.output(&format!("{}", "Core info".bold()));
        for (key, value) in &analysis.core_info {
            self.key_value(&format!("  {}", key), value);
        }
        self.key_value("Validity", &analysis.validity_check);
        self.key_value("Cause match", &analysis.cause_match);
        self.output(&format!("{}", "Solutions".bold()));
        for (i, solution) in analysis.solutions.iter().enumerate() {
            self.output(&format!("  {}. {}", i + 1, solution));
        }
    }

    /// Print one inventory row
    pub fn inventory_item(&self, item: &InventoryItem, today: NaiveDate) {
        self.output(&format_item(item, today));
    }

    pub fn inventory(&self, items: &[InventoryItem], today: NaiveDate) {
        for item in items {
            self.inventory_item(item, today);
        }
    }

    /// Print a markdown document as-is
    pub fn markdown(&self, markdown: &str) {
        self.output(markdown.trim_end());
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_recommendation(position: usize, record: &RecommendationRecord) -> String {
    let local = if record.is_local {
        format!(" {}", "[local]".green())
    } else {
        String::new()
    };
    format!(
        "{}. {} (score {}){}\n   T: {}  A: {} @ {}  B: {} @ {}\n   Source: {}\n   {}",
        position,
        record.scheme().bold(),
        record.score,
        local,
        record.reaction_temp,
        record.dose_a,
        record.heat_a,
        record.dose_b,
        record.heat_b,
        record.source,
        record.details
    )
}

fn format_item(item: &InventoryItem, today: NaiveDate) -> String {
    let expiry = if item.is_expired(today) {
        format!("{} {}", item.expiry_date, "EXPIRED".red())
    } else {
        item.expiry_date.to_string()
    };
    format!(
        "{} | {} | {} | {} {} | {} | {}",
        item.name.bold(),
        item.brand,
        item.spec,
        item.quantity,
        item.unit,
        expiry,
        item.health
    )
}
