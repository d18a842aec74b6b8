use anyhow::Result;
use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

mod catalog;
mod cmds;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let level = std::env::var("SONGDASH_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info);
    TermLogger::init(
        level,
        Default::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    cmds::handle_commands().await
}
