use super::record::Song;
use anyhow::Result;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub const EXPORT_FILE_NAME: &str = "songs.csv";
pub const EXPORT_MIME: &str = "text/csv";

/// How cells containing commas, quotes or line breaks are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Quoting {
    /// RFC 4180 quoting, only where a cell needs it.
    #[default]
    Standard,
    /// Cells written as-is, matching the legacy dashboard export.
    Verbatim,
}

/// Renders `songs` as CSV text: a header row, then one row per song in
/// `headers` order. Rows are joined by `\n` with no trailing newline.
pub fn to_csv(headers: &[String], songs: &[Song], quoting: Quoting) -> Result<String> {
    let quote_style = match quoting {
        Quoting::Standard => csv::QuoteStyle::Necessary,
        Quoting::Verbatim => csv::QuoteStyle::Never,
    };
    let mut writer = csv::WriterBuilder::new()
        .quote_style(quote_style)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);
    write_row(&mut writer, headers.to_vec())?;
    for song in songs {
        write_row(&mut writer, headers.iter().map(|header| song.cell(header)).collect())?;
    }
    let mut bytes = writer.into_inner().map_err(|e| e.into_error())?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    Ok(String::from_utf8(bytes)?)
}

fn write_row<W: Write>(writer: &mut csv::Writer<W>, row: Vec<String>) -> Result<()> {
    // csv would write a lone empty field as `""`
    if row.len() <= 1 && row.iter().all(String::is_empty) {
        writer.flush()?;
        writer.get_mut().write_all(b"\n")?;
        return Ok(());
    }
    writer.write_record(&row)?;
    Ok(())
}

/// Writes the export file. Returns `None` without touching the disk when
/// there is nothing to export.
pub fn export_csv(
    out: &Path,
    headers: &[String],
    songs: &[Song],
    quoting: Quoting,
) -> Result<Option<PathBuf>> {
    if songs.is_empty() {
        log::info!("nothing to export");
        return Ok(None);
    }
    let content = to_csv(headers, songs, quoting)?;
    std::fs::write(out, content)?;
    log::debug!("wrote {} songs ({}) to {}", songs.len(), EXPORT_MIME, out.display());
    Ok(Some(out.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn songs(value: serde_json::Value) -> Vec<Song> {
        serde_json::from_value(value).unwrap()
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_row() {
        let list = songs(json!([{"id": 1, "title": "A", "acousticness": 0.5}]));
        let csv = to_csv(&headers(&["id", "title", "acousticness"]), &list, Quoting::Standard).unwrap();
        assert_eq!(csv, "id,title,acousticness\n1,A,0.5");
    }

    #[test]
    fn test_missing_and_nested_cells() {
        let list = songs(json!([
            {"id": 1, "title": null, "tags": [1, 2]},
            {"id": 2}
        ]));
        let csv = to_csv(&headers(&["id", "title", "tags"]), &list, Quoting::Verbatim).unwrap();
        assert_eq!(csv, "id,title,tags\n1,,[1,2]\n2,,");
    }

    #[test]
    fn test_standard_quoting() {
        let list = songs(json!([{"id": 1, "title": "Hello, \"World\""}]));
        let csv = to_csv(&headers(&["id", "title"]), &list, Quoting::Standard).unwrap();
        assert_eq!(csv, "id,title\n1,\"Hello, \"\"World\"\"\"");
    }

    #[test]
    fn test_empty_single_cell_is_blank_line() {
        let list = songs(json!([{"title": null}, {"title": "B"}]));
        let csv = to_csv(&headers(&["title"]), &list, Quoting::Standard).unwrap();
        assert_eq!(csv, "title\n\nB");
        let csv = to_csv(&headers(&["title"]), &list, Quoting::Verbatim).unwrap();
        assert_eq!(csv, "title\n\nB");
    }

    #[test]
    fn test_no_headers_gives_blank_lines() {
        let list = songs(json!([{}, {"id": 1}]));
        let csv = to_csv(&[], &list, Quoting::Standard).unwrap();
        assert_eq!(csv, "\n\n");
    }

    #[test]
    fn test_verbatim_keeps_commas() {
        let list = songs(json!([{"id": 1, "title": "a,b"}]));
        let csv = to_csv(&headers(&["id", "title"]), &list, Quoting::Verbatim).unwrap();
        assert_eq!(csv, "id,title\n1,a,b");
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(EXPORT_FILE_NAME);
        let list = songs(json!([{"id": 1}, {"id": 2}]));
        let written = export_csv(&out, &headers(&["id"]), &list, Quoting::Standard).unwrap();
        assert_eq!(written, Some(out.clone()));
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "id\n1\n2");
    }

    #[test]
    fn test_export_empty_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(EXPORT_FILE_NAME);
        let written = export_csv(&out, &[], &[], Quoting::Standard).unwrap();
        assert_eq!(written, None);
        assert!(!out.exists());
    }
}
