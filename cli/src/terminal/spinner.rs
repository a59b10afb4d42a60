use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use colored::*;
use indicatif::ProgressStyle;
use tracing::span::Entered;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use probr_common::network::probe::ProbeResult;
use probr_core::engine::ProgressCallback;

use crate::terminal::colors;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
    "▁▁▁▁▁",
];
const TIP: &str = "press 'q' to finish early";

pub fn style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICK_STRINGS)
}

/// Spinner line counting finished probes and positive answers.
pub struct Progress {
    span: Span,
    total: usize,
    hits_label: &'static str,
    done: AtomicUsize,
    hits: AtomicUsize,
}

impl Progress {
    pub fn start(total: usize, hits_label: &'static str) -> Arc<Self> {
        let span: Span = info_span!("probing", indicatif.pb_show = true);
        span.pb_set_style(&style());

        let progress = Arc::new(Self {
            span,
            total,
            hits_label,
            done: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
        });
        progress.refresh(0, 0);
        progress
    }

    /// Shows the spinner until the guard is dropped.
    pub fn enter(&self) -> Entered<'_> {
        self.span.enter()
    }

    pub fn callback(self: &Arc<Self>) -> ProgressCallback {
        let progress = Arc::clone(self);
        Arc::new(move |result: &ProbeResult| progress.record(result))
    }

    fn record(&self, result: &ProbeResult) {
        let done: usize = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let hits: usize = if result.reachable {
            self.hits.fetch_add(1, Ordering::Relaxed) + 1
        } else {
            self.hits.load(Ordering::Relaxed)
        };
        self.refresh(done, hits);
    }

    fn refresh(&self, done: usize, hits: usize) {
        let message: String = format!(
            "{}/{} probes, {} {} {}",
            done,
            self.total,
            hits.to_string().green().bold(),
            self.hits_label,
            format!("({TIP})").italic().color(colors::SEPARATOR)
        );
        self.span
            .pb_set_message(&message.color(colors::TEXT_DEFAULT).to_string());
    }
}
