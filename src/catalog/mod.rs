//! Roster construction
//!
//! The roster is the ordered list of repositories the report covers. It is assembled from
//! the canonical package index, the promoted package index (which only marks entries as
//! current), repositories found through GitHub search that are not published packages, and
//! a curated allow-list from the configuration.

mod builder;
mod index_entry;
mod package_descriptor;

pub use builder::{build_roster, find_duplicates};
pub use index_entry::IndexEntry;
pub use package_descriptor::{PackageDescriptor, ProjectType};
