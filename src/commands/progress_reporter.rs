use crate::facts::Progress;
use core::fmt::{Debug, Formatter};
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Instant;

const TICK_INTERVAL_MS: u64 = 100;

const DETERMINATE_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{bar:25}] {pos}/{len} {msg}";
const DETERMINATE_TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{bar:25}] {pos}/{len} {msg}";
const INDETERMINATE_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{spinner:.cyan}] {elapsed}: {msg}";
const INDETERMINATE_TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{spinner}] {elapsed}: {msg}";

/// A progress bar on stderr that stays hidden until an operation runs past a delay.
pub struct ProgressReporter {
    bar: ProgressBar,
    visible_after: Instant,
    visible: AtomicBool,
    use_colors: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    ///
    /// The bar only becomes visible if work is still being reported after `delay`. When
    /// `use_colors` is false the bar is rendered without ANSI styling.
    #[must_use]
    pub fn new(delay: Duration, use_colors: bool) -> Self {
        let bar = ProgressBar::hidden();

        Self {
            bar,
            visible_after: Instant::now() + delay,
            visible: AtomicBool::new(false),
            use_colors,
        }
    }

    fn reveal_if_due(&self) {
        if !self.visible.load(Ordering::Relaxed) && Instant::now() >= self.visible_after {
            self.visible.store(true, Ordering::Relaxed);
            self.bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        }
    }

    fn style(&self, colored: &str, plain: &str) -> Option<ProgressStyle> {
        let template = if self.use_colors { colored } else { plain };
        ProgressStyle::default_bar().template(template).ok()
    }
}

impl Progress for ProgressReporter {
    fn set_phase(&self, phase: &str) {
        self.bar.reset();
        self.bar.set_prefix(phase.to_string());
        self.bar.set_length(0);
        self.bar.set_message("");

        if let Some(style) = self.style(INDETERMINATE_TEMPLATE, INDETERMINATE_TEMPLATE_NO_COLOR) {
            self.bar.set_style(style);
        }
        self.bar.enable_steady_tick(Duration::from_millis(TICK_INTERVAL_MS));
        self.reveal_if_due();
    }

    fn set_total(&self, total: u64) {
        self.bar.disable_steady_tick();
        self.bar.set_length(total);
        self.bar.set_position(0);

        if let Some(style) = self.style(DETERMINATE_TEMPLATE, DETERMINATE_TEMPLATE_NO_COLOR) {
            self.bar.set_style(style.progress_chars("=> "));
        }
        self.reveal_if_due();
    }

    fn advance(&self, message: &str) {
        if self.bar.length().is_some_and(|len| len > 0) {
            self.bar.inc(1);
        }
        self.bar.set_message(message.to_string());
        self.reveal_if_due();
    }

    fn println(&self, msg: &str) {
        self.bar.suspend(|| eprintln!("{msg}"));
    }

    fn done(&self) {
        self.bar.disable_steady_tick();
        if self.visible.load(Ordering::Relaxed) {
            self.bar.finish_and_clear();
        }
    }
}

impl Debug for ProgressReporter {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("bar", &self.bar)
            .field("visible_after", &self.visible_after)
            .field("visible", &self.visible)
            .field("use_colors", &self.use_colors)
            .finish()
    }
}
