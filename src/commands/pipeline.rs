use super::common::{CommonArgs, FetchOptions, RenderOptions, Session};
use super::{Host, extract, fetch, render};
use crate::Result;
use chrono::Utc;
use clap::Args;

#[derive(Args, Debug)]
pub struct PipelineArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub fetch: FetchOptions,

    #[command(flatten)]
    pub render: RenderOptions,
}

/// Fetch, extract and render in one go.
pub async fn process_pipeline<H: Host>(host: &mut H, args: &PipelineArgs) -> Result<()> {
    let session = Session::new(&args.common)?;

    fetch(host, &session, &args.fetch, Utc::now()).await?;
    extract(host, &session)?;
    render(host, &session, &args.render)
}
