use super::Host;
use super::common::{CommonArgs, Session, write_files};
use crate::Result;
use crate::catalog::{IndexEntry, PackageDescriptor, build_roster};
use crate::facts::{RepositoryDocument, documents};
use crate::metrics::{MetricsDocument, extract as extract_metrics};
use crate::reports::{generate_metrics_json, generate_reverse_dependencies_json};
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn process_extract<H: Host>(host: &mut H, args: &ExtractArgs) -> Result<()> {
    let session = Session::new(&args.common)?;
    extract(host, &session)
}

/// Build the roster from the `primary` documents and write the metrics and reverse-dependency
/// documents to the `output` directory.
pub fn extract<H: Host>(host: &mut H, session: &Session) -> Result<()> {
    let layout = &session.layout;

    let index: Vec<IndexEntry> = documents::load(layout.package_index())?;
    let promoted: Vec<String> = documents::load(layout.promoted_packages())?;
    let projects: Vec<PackageDescriptor> = documents::load(layout.projects())?;
    let repository_data: RepositoryDocument = documents::load(layout.repository_data())?;

    let roster = build_roster(&index, &promoted, &projects, &session.config.allow_list);
    let extraction = extract_metrics(&roster, &repository_data.repositories);

    for name in &extraction.duplicates {
        let _ = writeln!(host.error(), "Warning: '{name}' is listed more than once, only its first entry is reported");
    }

    let document = MetricsDocument {
        retrieved: repository_data.retrieved,
        packages: extraction.metrics,
    };

    let mut metrics_json = String::new();
    generate_metrics_json(&document, &mut metrics_json)?;
    let mut reverse_json = String::new();
    generate_reverse_dependencies_json(&extraction.reverse_dependencies, &mut reverse_json)?;

    let metrics_path = layout.metrics();
    let reverse_path = layout.reverse_dependencies();
    write_files(&[
        (metrics_path.as_path(), metrics_json.as_str()),
        (reverse_path.as_path(), reverse_json.as_str()),
    ])?;

    let _ = writeln!(
        host.output(),
        "Extracted metrics for {} entries into {}",
        document.packages.len(),
        layout.metrics()
    );

    Ok(())
}
