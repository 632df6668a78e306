use super::Host;
use super::common::{CommonArgs, RenderOptions, Session, write_file};
use crate::Result;
use crate::facts::documents;
use crate::metrics::MetricsDocument;
use crate::reports::{DEFAULT_TEMPLATE, generate_console, generate_html};
use clap::Args;
use ohno::IntoAppError;
use std::borrow::Cow;
use std::fs;
use std::io::Write;

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub render: RenderOptions,
}

pub fn process_render<H: Host>(host: &mut H, args: &RenderArgs) -> Result<()> {
    let session = Session::new(&args.common)?;
    render(host, &session, &args.render)
}

/// Render the HTML report from the metrics document, and optionally a console summary.
pub fn render<H: Host>(host: &mut H, session: &Session, options: &RenderOptions) -> Result<()> {
    let layout = &session.layout;
    let document: MetricsDocument = documents::load(layout.metrics())?;

    let template: Cow<'_, str> = match &options.template {
        Some(path) => Cow::Owned(fs::read_to_string(path).into_app_err_with(|| format!("reading report template '{path}'"))?),
        None => Cow::Borrowed(DEFAULT_TEMPLATE),
    };

    let mut html = String::new();
    generate_html(&document, &template, &mut html)?;
    write_file(&layout.report(), &html)?;

    let _ = writeln!(host.output(), "Wrote report to {}", layout.report());

    if options.console {
        let mut summary = String::new();
        generate_console(&document, session.config.console_top, session.color.for_stdout(), &mut summary)?;
        let _ = writeln!(host.output());
        let _ = write!(host.output(), "{summary}");
    }

    Ok(())
}
