use super::utils::severity_label;
use crate::catalog::{
    alert::Severity,
    client::SongsApi,
    dashboard::Dashboard,
    record::{SongId, Stars},
};
use anyhow::Result;

#[derive(Debug, clap::Parser)]
pub struct RateArgs {
    #[arg(long)]
    pub id: SongId,
    /// Rating from 1 to 5
    #[arg(long)]
    pub stars: Stars,
}

pub async fn rate_song<A: SongsApi>(dashboard: &mut Dashboard<A>, args: &RateArgs) -> Result<()> {
    dashboard.rate(&args.id, args.stars).await;
    let Some(alert) = dashboard.alert() else {
        return Ok(());
    };
    println!("[{}] {}", severity_label(alert.severity), alert.message);
    if alert.severity == Severity::Danger {
        anyhow::bail!("rating song {} failed", args.id);
    }
    Ok(())
}
