use crate::Result;
use crate::metrics::{Metric, MetricsDocument};
use core::fmt::Write;
use owo_colors::OwoColorize;

/// Write a short summary: totals followed by the `top` most starred entries.
pub fn generate<W: Write>(document: &MetricsDocument, top: usize, use_colors: bool, writer: &mut W) -> Result<()> {
    let packages = &document.packages;
    let projects = packages.iter().filter(|m| m.is_project).count();
    let no_data = packages.iter().filter(|m| m.no_data).count();
    let deprecated = packages.iter().filter(|m| m.deprecated).count();

    let heading = format!("Retrieved {}", document.retrieved.format("%Y-%m-%d %H:%M UTC"));
    if use_colors {
        writeln!(writer, "{}", heading.bold())?;
    } else {
        writeln!(writer, "{heading}")?;
    }

    writeln!(writer, "  Packages   : {}", packages.len() - projects)?;
    writeln!(writer, "  Projects   : {projects}")?;
    writeln!(writer, "  No data    : {no_data}")?;
    writeln!(writer, "  Deprecated : {deprecated}")?;

    let ranked = top_by_stars(packages, top);
    if ranked.is_empty() {
        return Ok(());
    }

    writeln!(writer)?;
    let title = format!("Top {} by stars", ranked.len());
    if use_colors {
        writeln!(writer, "{}", title.bold())?;
    } else {
        writeln!(writer, "{title}")?;
    }

    let name_width = ranked.iter().map(|m| m.name().len()).max().unwrap_or(0);
    let stars_width = ranked.iter().map(|m| m.stars.to_string().len()).max().unwrap_or(0);

    for metric in ranked {
        let stars = format!("{:>stars_width$}", metric.stars);
        let stars = if use_colors { stars.yellow().to_string() } else { stars };
        write!(writer, "  {stars}  {:<name_width$}", metric.name())?;

        if metric.used_by > 0 {
            write!(writer, "  used by {}", metric.used_by)?;
        }

        if metric.deprecated {
            let note = metric
                .deprecation_redirect
                .as_ref()
                .map_or_else(|| "deprecated".to_string(), |target| format!("deprecated, see {target}"));
            if use_colors {
                write!(writer, "  {}", note.red())?;
            } else {
                write!(writer, "  {note}")?;
            }
        }

        writeln!(writer)?;
    }

    Ok(())
}

/// Entries with data, most stars first, ties broken by name.
fn top_by_stars(packages: &[Metric], top: usize) -> Vec<&Metric> {
    let mut ranked: Vec<&Metric> = packages.iter().filter(|m| !m.no_data).collect();
    ranked.sort_by(|a, b| b.stars.cmp(&a.stars).then_with(|| a.name().cmp(b.name())));
    ranked.truncate(top);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PackageDescriptor;
    use chrono::DateTime;

    fn metric(name: &str, stars: u64) -> Metric {
        let mut metric = Metric::with_defaults(PackageDescriptor::project(name, None));
        metric.stars = stars;
        metric
    }

    fn document(packages: Vec<Metric>) -> MetricsDocument {
        MetricsDocument {
            retrieved: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            packages,
        }
    }

    #[test]
    fn test_totals() {
        let mut missing = metric("c/missing", 0);
        missing.no_data = true;
        let mut old = metric("d/old", 3);
        old.deprecated = true;
        old.deprecation_redirect = Some("d/new".to_string());

        let mut output = String::new();
        generate(&document(vec![metric("a/one", 10), missing, old]), 5, false, &mut output).unwrap();

        assert!(output.starts_with("Retrieved 2023-11-14 22:13 UTC\n"));
        assert!(output.contains("  Packages   : 0\n"));
        assert!(output.contains("  Projects   : 3\n"));
        assert!(output.contains("  No data    : 1\n"));
        assert!(output.contains("  Deprecated : 1\n"));
        assert!(output.contains("Top 2 by stars"));
        assert!(output.contains("d/old  deprecated, see d/new"));
        assert!(!output.contains("c/missing"));
    }

    #[test]
    fn test_used_by_shown_when_depended_on() {
        let mut core = metric("a/core", 20);
        core.used_by = 4;

        let mut output = String::new();
        generate(&document(vec![core, metric("b/leaf", 10)]), 5, false, &mut output).unwrap();

        assert!(output.contains("a/core  used by 4\n"));
        assert!(output.contains("b/leaf\n"));
        assert!(!output.contains("used by 0"));
    }

    #[test]
    fn test_top_ordering_and_limit() {
        let packages = vec![metric("b/two", 5), metric("a/one", 5), metric("c/three", 50), metric("d/four", 1)];
        let names: Vec<_> = top_by_stars(&packages, 3).iter().map(|m| m.name()).collect();
        assert_eq!(names, ["c/three", "a/one", "b/two"]);
    }

    #[test]
    fn test_zero_top_skips_ranking() {
        let mut output = String::new();
        generate(&document(vec![metric("a/one", 10)]), 0, false, &mut output).unwrap();
        assert!(!output.contains("Top"));
    }

    #[test]
    fn test_no_colors_has_no_escapes() {
        let mut output = String::new();
        generate(&document(vec![metric("a/one", 10)]), 5, false, &mut output).unwrap();
        assert!(!output.contains('\x1b'));
    }

    #[test]
    fn test_colors_emit_escapes() {
        let mut output = String::new();
        generate(&document(vec![metric("a/one", 10)]), 5, true, &mut output).unwrap();
        assert!(output.contains('\x1b'));
    }
}
