use super::utils::{load, print_view, ViewArgs};
use crate::catalog::{client::SongsApi, dashboard::Dashboard};
use anyhow::Result;

#[derive(Debug, clap::Parser)]
pub struct ListArgs {
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, clap::Parser)]
pub struct SearchArgs {
    /// Title or part of a title; blank lists every song
    pub title: Vec<String>,
    #[command(flatten)]
    pub view: ViewArgs,
}

pub async fn list_songs<A: SongsApi>(dashboard: &mut Dashboard<A>, args: &ListArgs) -> Result<()> {
    load(dashboard, None).await?;
    args.view.apply(dashboard);
    print_view(dashboard);
    Ok(())
}

pub async fn search_songs<A: SongsApi>(dashboard: &mut Dashboard<A>, args: &SearchArgs) -> Result<()> {
    let title = args.title.join(" ");
    load(dashboard, Some(&title)).await?;
    args.view.apply(dashboard);
    print_view(dashboard);
    Ok(())
}
