//! Console implementation of the reconciler's UI seam.

use std::sync::Mutex;

use console::style;
use discovery_client::{SearchResult, TaskStep};
use reconciler::{Advisory, AdvisoryKind, Provenance, Ui};

use crate::render;

/// Renders reconciler updates as styled terminal lines.
///
/// The trace counter mirrors how many steps have been printed so appended
/// entries continue the numbering instead of restarting it.
pub struct ConsoleUi {
    shown_steps: Mutex<usize>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self {
            shown_steps: Mutex::new(0),
        }
    }

    fn print_step(&self, index: usize, step: &TaskStep) {
        let number = step.step.map(|n| n as usize).unwrap_or(index + 1);
        println!(
            "  {} {}",
            style(format!("[{number}]")).dim(),
            style(step.headline()).bold()
        );
        if let Some(detail) = step.detail() {
            println!("      {detail}");
        }
        if let Some(url) = step.url.as_deref() {
            println!("      {}", style(url).dim());
        }
    }
}

impl Ui for ConsoleUi {
    fn reset(&self) {
        *self.shown_steps.lock().unwrap() = 0;
    }

    fn show_status(&self, text: &str) {
        println!("{} {}", style("status").cyan().bold(), text);
    }

    fn publish_live_url(&self, url: &str) {
        println!(
            "{} watch the browser session live: {}",
            style("live").magenta().bold(),
            style(url).underlined()
        );
    }

    fn replace_trace(&self, steps: &[TaskStep]) {
        println!("{}", style("Execution steps:").bold());
        for (index, step) in steps.iter().enumerate() {
            self.print_step(index, step);
        }
        *self.shown_steps.lock().unwrap() = steps.len();
    }

    fn append_trace(&self, steps: &[TaskStep]) {
        let mut shown = self.shown_steps.lock().unwrap();
        for (offset, step) in steps.iter().enumerate() {
            self.print_step(*shown + offset, step);
        }
        *shown += steps.len();
    }

    fn show_intermediate(&self, result: &SearchResult) {
        println!(
            "{} {} products discovered so far",
            style("progress").cyan().bold(),
            result.products.len()
        );
        for product in &result.products {
            println!("    {} {}", style("-").dim(), product.name);
        }
    }

    fn show_products(&self, result: &SearchResult, provenance: Provenance) {
        render::print_products(result, provenance);
    }

    fn show_advisory(&self, advisory: &Advisory) {
        let tag = match advisory.kind {
            AdvisoryKind::Info => style("note").blue().bold(),
            AdvisoryKind::Warning => style("warning").yellow().bold(),
            AdvisoryKind::Error => style("error").red().bold(),
        };
        println!("{tag} {}", advisory.message);
    }

    fn clear_advisories(&self) {
        // Printed lines cannot be withdrawn; auto-dismiss is a no-op here.
    }

    fn set_submit_enabled(&self, _enabled: bool) {
        // The CLI has no persistent submit control.
    }
}
