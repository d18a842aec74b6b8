use crate::catalog::{dashboard::PageView, transform::SortConfig};
use comfy_table::Table;

const MAX_CELL_CHARS: usize = 40;

pub fn stars(rating: u8) -> String {
    (1..=5)
        .map(|star| if star <= rating { '★' } else { '☆' })
        .collect()
}

fn header_label(header: &str, sort: &SortConfig) -> String {
    match sort.arrow(header) {
        "" => header.to_string(),
        arrow => format!("{} {}", header, arrow),
    }
}

pub fn songs_table(page: &PageView, headers: &[String], sort: &SortConfig) -> Table {
    let mut table = Table::new();
    let mut header_row = headers
        .iter()
        .map(|header| header_label(header, sort))
        .collect::<Vec<_>>();
    header_row.push("Rate".to_string());
    table.set_header(header_row);

    if page.songs.is_empty() {
        table.add_row(vec!["No data"]);
        return table;
    }
    for song in page.songs.iter() {
        let mut row = headers
            .iter()
            .map(|header| song.cell(header).chars().take(MAX_CELL_CHARS).collect())
            .collect::<Vec<String>>();
        row.push(stars(song.rating()));
        table.add_row(row);
    }
    table
}

/// `« First ‹ Prev 1 [2] 3 Next › Last »`
pub fn pagination_bar(number: usize, total_pages: usize) -> String {
    let pages = (1..=total_pages)
        .map(|p| {
            if p == number {
                format!("[{}]", p)
            } else {
                p.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("« First ‹ Prev {} Next › Last »", pages)
}
