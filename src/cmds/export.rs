use super::utils::load;
use crate::catalog::{
    client::SongsApi,
    dashboard::Dashboard,
    export::{Quoting, EXPORT_FILE_NAME},
    transform::{SortConfig, SortDirection},
};
use anyhow::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, clap::Parser)]
pub struct ExportArgs {
    /// Export a title search instead of every song
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(long, requires = "sort")]
    pub desc: bool,
    #[arg(short, long, default_value = EXPORT_FILE_NAME)]
    pub out: PathBuf,
    /// Write cells without CSV quoting
    #[arg(long)]
    pub verbatim: bool,
}

pub fn quoting(verbatim: bool) -> Quoting {
    if verbatim {
        Quoting::Verbatim
    } else {
        Quoting::Standard
    }
}

pub fn write_export<A: SongsApi>(dashboard: &Dashboard<A>, out: &Path, quoting: Quoting) -> Result<()> {
    match dashboard.export(out, quoting)? {
        Some(path) => println!("exported {} songs to {}", dashboard.songs().len(), path.display()),
        None => println!("no songs to export"),
    }
    Ok(())
}

pub async fn export_songs<A: SongsApi>(dashboard: &mut Dashboard<A>, args: &ExportArgs) -> Result<()> {
    load(dashboard, args.title.as_deref()).await?;
    if let Some(key) = &args.sort {
        let direction = if args.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        dashboard.set_sort(SortConfig::by(key, direction));
    }
    write_export(dashboard, &args.out, quoting(args.verbatim))
}
