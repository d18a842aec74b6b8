use self::{
    browse::{list_songs, search_songs, ListArgs, SearchArgs},
    charts::{print_charts, ChartsArgs},
    export::{export_songs, ExportArgs},
    rate::{rate_song, RateArgs},
    shell::run_dashboard,
    utils::load,
};
use crate::catalog::{client::HttpSongsClient, dashboard::Dashboard};
use anyhow::Result;
use clap::Parser;

pub mod browse;
pub mod charts;
pub mod export;
pub mod rate;
pub mod shell;
pub mod table;
pub mod utils;

const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Debug, clap::Parser)]
#[command(version, about = "Browse, rate, chart and export a song catalog")]
struct SongdashCli {
    /// Base URL of the songs backend
    #[arg(long, global = true, env = "SONGDASH_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Show a page of the song table
    List(ListArgs),
    /// Search songs by title
    Search(SearchArgs),
    /// Rate a song
    Rate(RateArgs),
    /// Export songs as CSV
    Export(ExportArgs),
    /// Print the danceability, duration, acousticness, tempo and feature charts
    Charts(ChartsArgs),
    /// Interactive dashboard
    Dashboard,
}

pub async fn handle_commands() -> Result<()> {
    let args = SongdashCli::parse();
    log::debug!("backend {}", args.api_url);

    let client = HttpSongsClient::new(&args.api_url)?;
    let mut dashboard = Dashboard::new(client);

    match args.command {
        Command::List(args) => list_songs(&mut dashboard, &args).await,
        Command::Search(args) => search_songs(&mut dashboard, &args).await,
        Command::Rate(args) => rate_song(&mut dashboard, &args).await,
        Command::Export(args) => export_songs(&mut dashboard, &args).await,
        Command::Charts(args) => {
            load(&mut dashboard, args.title.as_deref()).await?;
            dashboard.set_feature(args.feature);
            print_charts(&dashboard.charts());
            Ok(())
        }
        Command::Dashboard => run_dashboard(&mut dashboard).await,
    }
}
