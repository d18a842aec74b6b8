//! Interactive dashboard.
//!
//! Reads one command per line and redraws the table after each one. Requests
//! run on their own tasks in a `JoinSet` and the loop applies each one as it
//! finishes, so the prompt keeps taking input while a fetch or a rating is in
//! flight. The loop also waits on the current alert's expiry so alerts clear
//! themselves after a few seconds, even while the prompt sits idle.

use super::{
    charts::print_charts,
    export::{quoting, write_export},
    utils::{print_status, print_view},
};
use crate::catalog::{
    alert::AlertToken,
    client::SongsApi,
    dashboard::{Completion, Dashboard},
    export::EXPORT_FILE_NAME,
    record::{SongId, Stars},
    transform::Feature,
};
use anyhow::Result;
use clap::Parser;
use std::{io::Write, path::PathBuf};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::{JoinError, JoinSet},
    time::Instant,
};

type Requests = JoinSet<Completion>;

#[derive(Debug, clap::Parser)]
#[command(no_binary_name = true, disable_help_flag = true, disable_version_flag = true)]
enum ShellCommand {
    /// Reload every song
    Reload,
    /// Search by title, a blank title reloads everything
    Search { title: Vec<String> },
    /// Sort by a column, repeat to flip the direction
    Sort { key: String },
    /// Jump to a page
    Page { number: usize },
    First,
    Prev,
    Next,
    Last,
    /// Rate a song from 1 to 5 stars
    Rate { id: SongId, stars: Stars },
    /// Choose the feature of the selectable bar chart
    Feature {
        #[arg(value_enum)]
        name: Feature,
    },
    Charts,
    /// Export the sorted songs as CSV
    Export {
        out: Option<PathBuf>,
        #[arg(long)]
        verbatim: bool,
    },
    Quit,
}

fn prompt() -> Result<()> {
    print!("songdash> ");
    std::io::stdout().flush()?;
    Ok(())
}

async fn alert_expiry(expiry: Option<(AlertToken, Instant)>) -> AlertToken {
    match expiry {
        Some((token, at)) => {
            tokio::time::sleep_until(at).await;
            token
        }
        None => std::future::pending().await,
    }
}

/// Runs one command, spawning any request it starts onto `requests`.
/// Returns whether the song table should be redrawn.
fn execute<A: SongsApi>(dashboard: &mut Dashboard<A>, requests: &mut Requests, command: ShellCommand) -> bool {
    match command {
        ShellCommand::Reload => {
            requests.spawn(dashboard.start_load_all());
        }
        ShellCommand::Search { title } => {
            requests.spawn(dashboard.start_search(&title.join(" ")));
        }
        ShellCommand::Sort { key } => {
            if !dashboard.headers().contains(&key) {
                println!("no column named {}", key);
                return false;
            }
            dashboard.handle_sort(&key);
        }
        ShellCommand::Page { number } => dashboard.go_to(number),
        ShellCommand::First => dashboard.first(),
        ShellCommand::Prev => dashboard.prev(),
        ShellCommand::Next => dashboard.next(),
        ShellCommand::Last => dashboard.last(),
        ShellCommand::Rate { id, stars } => {
            requests.spawn(dashboard.start_rate(id, stars));
        }
        ShellCommand::Feature { name } => {
            dashboard.set_feature(name);
            print_charts(&dashboard.charts());
            return false;
        }
        ShellCommand::Charts => {
            print_charts(&dashboard.charts());
            return false;
        }
        ShellCommand::Export { out, verbatim } => {
            let out = out.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            if let Err(e) = write_export(dashboard, &out, quoting(verbatim)) {
                log::error!("export to {} failed: {:#}", out.display(), e);
            }
            return false;
        }
        ShellCommand::Quit => return false,
    }
    true
}

/// Applies a finished request task.
fn settle<A: SongsApi>(dashboard: &mut Dashboard<A>, joined: Result<Completion, JoinError>) {
    match joined {
        Ok(completion) => {
            dashboard.complete(completion);
        }
        Err(e) => log::error!("request task failed: {}", e),
    }
}

pub async fn run_dashboard<A: SongsApi>(dashboard: &mut Dashboard<A>) -> Result<()> {
    let mut requests = Requests::new();
    requests.spawn(dashboard.start_load_all());
    print_view(dashboard);
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let expiry = dashboard.alert().map(|alert| (alert.token, alert.expires_at));
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let tokens = line.split_whitespace().collect::<Vec<_>>();
                if !tokens.is_empty() {
                    match ShellCommand::try_parse_from(tokens) {
                        Ok(ShellCommand::Quit) => break,
                        Ok(command) => {
                            if execute(dashboard, &mut requests, command) {
                                print_view(dashboard);
                            }
                        }
                        Err(e) => println!("{}", e),
                    }
                }
                prompt()?;
            }
            Some(joined) = requests.join_next(), if !requests.is_empty() => {
                settle(dashboard, joined);
                println!();
                print_view(dashboard);
                prompt()?;
            }
            token = alert_expiry(expiry) => {
                if dashboard.clear_alert(token) {
                    log::debug!("alert cleared");
                }
            }
        }
    }
    requests.abort_all();
    print_status(dashboard);
    Ok(())
}
