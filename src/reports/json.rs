use crate::Result;
use crate::metrics::{MetricsDocument, ReverseDependencyIndex};
use core::fmt::Write;

/// Write the metrics document as pretty-printed JSON.
pub fn generate_metrics<W: Write>(document: &MetricsDocument, writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", serde_json::to_string_pretty(document)?)?;
    Ok(())
}

/// Write the reverse-dependency index as pretty-printed JSON.
pub fn generate_reverse_dependencies<W: Write>(index: &ReverseDependencyIndex, writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", serde_json::to_string_pretty(index)?)?;
    Ok(())
}
