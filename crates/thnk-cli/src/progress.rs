//! Per-target build progress.
//!
//! On a terminal each generation gets a spinner fed by the streamed text;
//! otherwise a single `Thnking <target>...` line is printed per target.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use thnk_core::prelude::{GenerationEvent, ProgressObserver};
use tracing::debug;

use crate::cli::OutputFormat;
use crate::output::OutputManager;

pub struct BuildProgress<'a> {
    output: &'a OutputManager,
    spinner: Option<ProgressBar>,
    received: usize,
}

impl<'a> BuildProgress<'a> {
    pub fn new(output: &'a OutputManager) -> Self {
        Self {
            output,
            spinner: None,
            received: 0,
        }
    }

    fn interactive(&self) -> bool {
        self.output.format() == OutputFormat::Human && !self.output.is_quiet()
    }

    fn start(&mut self, target: &str) {
        self.received = 0;
        if !self.interactive() {
            let _ = self.output.print(&format!("Thnking {target}..."));
            return;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("Thnking {target}..."));
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn finish(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl ProgressObserver for BuildProgress<'_> {
    fn on_event(&mut self, target: &str, event: &GenerationEvent) {
        match event {
            GenerationEvent::Started { model, mode } => {
                debug!(rule = target, %model, %mode, "Generation started");
                self.start(target);
            }
            GenerationEvent::TextDelta(delta) => {
                self.received += delta.chars().count();
                if let Some(spinner) = &self.spinner {
                    spinner.set_message(format!("Thnking {target}... {} chars", self.received));
                }
            }
            GenerationEvent::Completed => self.finish(),
        }
    }

    fn on_written(&mut self, target: &str) {
        self.finish();
        let _ = self.output.success(target);
    }
}

impl Drop for BuildProgress<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}
