//! Report generation
//!
//! Three outputs are produced from the same [`MetricsDocument`](crate::metrics::MetricsDocument):
//! - **JSON**: the metrics document and the reverse-dependency index, as written to the
//!   output directory for downstream consumers
//! - **HTML**: a self-contained page built from a template with the metrics embedded as JSON
//! - **Console**: totals and the most starred entries, optionally colorized
//!
//! Each generator writes into a [`core::fmt::Write`] so callers decide where the text goes.

mod console;
mod html;
mod json;

pub use console::generate as generate_console;
pub use html::{DEFAULT_TEMPLATE, generate as generate_html};
pub use json::{generate_metrics as generate_metrics_json, generate_reverse_dependencies as generate_reverse_dependencies_json};
