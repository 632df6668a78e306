//! Metric extraction
//!
//! Turns the roster and the fetched repository records into one [`Metric`] per roster entry
//! plus a [`ReverseDependencyIndex`] listing which packages depend on each dependency.
//!
//! Extraction is a pure function: no I/O, no clock, and the same inputs always produce the
//! same output in the same order.

mod deprecation;
mod extractor;
mod metric;
mod reverse_deps;

pub use deprecation::{Deprecation, detect as detect_deprecation};
pub use extractor::{Extraction, extract};
pub use metric::{Metric, MetricsDocument, UNKNOWN_LICENSE};
pub use reverse_deps::ReverseDependencyIndex;
