use super::record::Song;
use serde_json::Value;

/// Flattens a backend payload into songs.
///
/// Accepts a bare list or an object carrying the list under `results`.
/// Anything else is treated as no songs at all.
pub fn normalize_response(payload: Value) -> Vec<Song> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove("results") {
            Some(Value::Array(items)) => items,
            _ => vec![],
        },
        _ => vec![],
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(fields) => Some(Song::from(fields)),
            other => {
                log::warn!("skipping non-record entry: {}", other);
                None
            }
        })
        .collect()
}
