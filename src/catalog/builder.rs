use super::{IndexEntry, PackageDescriptor, ProjectType};
use std::collections::HashSet;

const LOG_TARGET: &str = "   catalog";

/// Merge the package sources into one roster.
///
/// The result holds the canonical index entries first, then the search-derived projects, then
/// the allow-list entries. Names are not de-duplicated here; see [`find_duplicates`].
#[must_use]
pub fn build_roster(
    canonical: &[IndexEntry],
    promoted: &[String],
    projects: &[PackageDescriptor],
    allow_list: &[String],
) -> Vec<PackageDescriptor> {
    let promoted: HashSet<&str> = promoted.iter().map(String::as_str).collect();

    let mut roster = Vec::with_capacity(canonical.len() + projects.len() + allow_list.len());

    roster.extend(canonical.iter().map(|entry| PackageDescriptor {
        name: entry.name.clone(),
        project_type: ProjectType::Package,
        is_current: promoted.contains(entry.name.as_str()),
        summary: entry.summary.clone(),
        versions: Some(entry.versions.clone()),
    }));

    roster.extend(projects.iter().map(|project| PackageDescriptor {
        project_type: ProjectType::Project,
        versions: None,
        ..project.clone()
    }));

    roster.extend(allow_list.iter().map(|name| PackageDescriptor::project(name.clone(), None)));

    log::info!(
        target: LOG_TARGET,
        "Built roster of {} entries ({} packages, {} projects, {} allow-listed)",
        roster.len(),
        canonical.len(),
        projects.len(),
        allow_list.len()
    );

    roster
}

/// Names that appear more than once in the roster, in order of their second appearance.
#[must_use]
pub fn find_duplicates(roster: &[PackageDescriptor]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(roster.len());
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for desc in roster {
        if !seen.insert(desc.name.as_str()) && reported.insert(desc.name.as_str()) {
            duplicates.push(desc.name.clone());
        }
    }

    duplicates
}
