use super::table::{pagination_bar, songs_table};
use crate::catalog::{
    alert::Severity,
    client::SongsApi,
    dashboard::Dashboard,
    transform::{SortConfig, SortDirection},
};
use anyhow::Result;

#[derive(Debug, clap::Args)]
pub struct ViewArgs {
    /// Page to show, clamped to the available pages
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Column to sort by
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

impl ViewArgs {
    pub fn apply<A: SongsApi>(&self, dashboard: &mut Dashboard<A>) {
        if let Some(key) = &self.sort {
            let direction = if self.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            dashboard.set_sort(SortConfig::by(key, direction));
        }
        dashboard.go_to(self.page);
    }
}

/// Loads the working set for a one-shot command, searching when a title is
/// given. A failed fetch ends the command with the banner as its error.
pub async fn load<A: SongsApi>(dashboard: &mut Dashboard<A>, title: Option<&str>) -> Result<()> {
    match title {
        Some(title) => dashboard.search(title).await,
        None => dashboard.load_all().await,
    }
    match dashboard.error() {
        Some(error) => Err(anyhow::anyhow!("{}", error)),
        None => Ok(()),
    }
}

pub fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "ok",
        Severity::Danger => "error",
    }
}

pub fn print_status<A: SongsApi>(dashboard: &Dashboard<A>) {
    if dashboard.is_loading() {
        println!("Loading…");
    }
    if let Some(error) = dashboard.error() {
        println!("!! {}", error);
    }
    if let Some(alert) = dashboard.alert() {
        println!("[{}] {}", severity_label(alert.severity), alert.message);
    }
    if dashboard.search_active() {
        println!("showing search results");
    }
}

pub fn print_view<A: SongsApi>(dashboard: &Dashboard<A>) {
    print_status(dashboard);
    let page = dashboard.current_page();
    let table = songs_table(&page, &dashboard.headers(), dashboard.sort_config());
    println!("{}", table);
    println!(
        "{}  ({} songs)",
        pagination_bar(page.number, page.total_pages),
        dashboard.songs().len()
    );
}
