use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::{convert::Infallible, fmt, str::FromStr};

/// A song as the backend sends it: an ordered map of column name to JSON value.
///
/// Columns are not declared anywhere, they are whatever keys the backend put
/// in the record, in the order it put them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Song(Map<String, Value>);

impl From<Map<String, Value>> for Song {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl Song {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Value of `key`, treating an explicit `null` the same as a missing key.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn id(&self) -> Option<&Value> {
        self.field("id")
    }

    /// Display title, `None` when absent or empty.
    pub fn title(&self) -> Option<String> {
        self.field("title")
            .map(cell_text)
            .filter(|title| !title.is_empty())
    }

    /// Numeric value of `key`, 0 when absent or not a number.
    pub fn number(&self, key: &str) -> f64 {
        self.field(key).and_then(as_number).unwrap_or(0.0)
    }

    pub fn rating(&self) -> u8 {
        self.number("rating").clamp(0.0, 5.0) as u8
    }

    /// Scalar text for a table or CSV cell.
    pub fn cell(&self, key: &str) -> String {
        self.0.get(key).map(cell_text).unwrap_or_default()
    }
}

/// Text form of a value as it appears in a cell: empty for null, JSON text
/// for objects and arrays.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Column names of a song list: the keys of its first record.
pub fn headers(songs: &[Song]) -> Vec<String> {
    songs
        .first()
        .map(|song| song.keys().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Identifier of a song as typed by a user. Digits become a JSON number,
/// anything else stays text.
#[derive(Debug, Clone, PartialEq)]
pub struct SongId(Value);

impl SongId {
    pub fn matches(&self, value: &Value) -> bool {
        match (&self.0, value) {
            (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
            (a, b) => a == b,
        }
    }
}

impl FromStr for SongId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value = match s.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::from(s),
        };
        Ok(Self(value))
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", cell_text(&self.0))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("rating must be between 1 and 5, got {0}")]
pub struct InvalidStars(String);

/// A star rating, sent over the wire as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Stars {
    One = 1,
    Two,
    Three,
    Four,
    Five,
}

impl Stars {
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Stars {
    type Error = InvalidStars;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Stars::One),
            2 => Ok(Stars::Two),
            3 => Ok(Stars::Three),
            4 => Ok(Stars::Four),
            5 => Ok(Stars::Five),
            other => Err(InvalidStars(other.to_string())),
        }
    }
}

impl FromStr for Stars {
    type Err = InvalidStars;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| InvalidStars(s.to_string()))
            .and_then(Stars::try_from)
    }
}
