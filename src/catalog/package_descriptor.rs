use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Whether a roster entry is a published package or a plain repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectType {
    /// Published in the package index
    Package,

    /// A repository that is not in the package index (search result or allow-list entry)
    Project,
}

/// One entry in the roster of repositories to report on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PackageDescriptor {
    /// Repository path in `owner/repo` form.
    pub name: String,

    pub project_type: ProjectType,

    /// Listed in the promoted (currently maintained) package index.
    pub is_current: bool,

    #[serde(default)]
    pub summary: Option<String>,

    /// Published versions, `None` for projects.
    #[serde(default)]
    pub versions: Option<Vec<String>>,
}

impl PackageDescriptor {
    /// Create a project descriptor (not present in the package index).
    #[must_use]
    pub fn project(name: impl Into<String>, summary: Option<String>) -> Self {
        Self {
            name: name.into(),
            project_type: ProjectType::Project,
            is_current: false,
            summary,
            versions: None,
        }
    }

    #[must_use]
    pub fn is_project(&self) -> bool {
        self.project_type == ProjectType::Project
    }
}
