use crate::Result;
use crate::metrics::MetricsDocument;
use core::fmt::Write;
use ohno::bail;

/// The built-in report page, used when no template path is given.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/report.html");

const PACKAGES_PLACEHOLDER: &str = "{{PACKAGES_JSON}}";
const RETRIEVED_PLACEHOLDER: &str = "{{RETRIEVED}}";

/// Render the metrics document into an HTML page.
///
/// `{{PACKAGES_JSON}}` in the template is replaced by the document serialized as JSON and
/// `{{RETRIEVED}}` by the retrieval time. The JSON is escaped so it can sit inside a
/// `<script>` element.
///
/// # Errors
///
/// Returns an error if the template has no `{{PACKAGES_JSON}}` placeholder.
pub fn generate<W: Write>(document: &MetricsDocument, template: &str, writer: &mut W) -> Result<()> {
    if !template.contains(PACKAGES_PLACEHOLDER) {
        bail!("report template does not contain the {PACKAGES_PLACEHOLDER} placeholder");
    }

    let packages_json = script_safe(&serde_json::to_string(document)?);
    let retrieved = document.retrieved.format("%Y-%m-%d %H:%M UTC").to_string();

    // Data goes in last so package text is never scanned for placeholders
    let page = template
        .replace(RETRIEVED_PLACEHOLDER, &retrieved)
        .replace(PACKAGES_PLACEHOLDER, &packages_json);

    write!(writer, "{page}")?;
    Ok(())
}

/// Keep embedded JSON from terminating the surrounding script element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
