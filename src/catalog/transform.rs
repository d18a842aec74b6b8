//! Derived views over the working set: ordering, pages and chart series.
//!
//! Everything here is a pure function of the song list it is handed.

use super::record::{cell_text, Song};
use serde_json::Value;
use std::{cmp::Ordering, collections::BTreeMap};

pub const PAGE_SIZE: usize = 10;
pub const BIN_SECONDS: i64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortConfig {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn by(key: &str, direction: SortDirection) -> Self {
        Self {
            key: Some(key.to_string()),
            direction,
        }
    }

    /// Clicking the sorted column flips it, any other column sorts ascending.
    pub fn toggle(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.direction = self.direction.flipped();
        } else {
            self.key = Some(key.to_string());
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn arrow(&self, key: &str) -> &'static str {
        match (self.key.as_deref() == Some(key), self.direction) {
            (false, _) => "",
            (true, SortDirection::Ascending) => "▲",
            (true, SortDirection::Descending) => "▼",
        }
    }
}

/// Case-insensitive first, lowercase before uppercase on ties.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or_default()
            .total_cmp(&y.as_f64().unwrap_or_default()),
        _ => locale_cmp(&cell_text(a), &cell_text(b)),
    }
}

/// Returns a sorted copy. Records without the key go last in either direction.
pub fn sort_songs(songs: &[Song], config: &SortConfig) -> Vec<Song> {
    let mut sorted = songs.to_vec();
    let Some(key) = config.key.as_deref() else {
        return sorted;
    };
    sorted.sort_by(|a, b| match (a.field(key), b.field(key)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => config.direction.apply(compare_values(a, b)),
    });
    sorted
}

pub fn total_pages(len: usize) -> usize {
    ((len + PAGE_SIZE - 1) / PAGE_SIZE).max(1)
}

pub fn clamp_page(page: usize, len: usize) -> usize {
    page.clamp(1, total_pages(len))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a> {
    pub number: usize,
    pub total_pages: usize,
    pub songs: &'a [Song],
}

pub fn paginate(songs: &[Song], page: usize) -> Page<'_> {
    let number = clamp_page(page, songs.len());
    let start = ((number - 1) * PAGE_SIZE).min(songs.len());
    let end = (start + PAGE_SIZE).min(songs.len());
    Page {
        number,
        total_pages: total_pages(songs.len()),
        songs: &songs[start..end],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationBin {
    pub start: i64,
    pub label: String,
    pub count: usize,
}

/// Buckets songs into 30 second duration bins, skipping empty bins.
pub fn duration_histogram(songs: &[Song]) -> Vec<DurationBin> {
    let mut counts = BTreeMap::<i64, usize>::new();
    for song in songs {
        // half rounds up, not away from zero
        // the cast saturates, so bin edges must too
        let seconds = (song.number("duration_ms") / 1000.0 + 0.5).floor() as i64;
        let start = seconds.div_euclid(BIN_SECONDS).saturating_mul(BIN_SECONDS);
        *counts.entry(start).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(start, count)| DurationBin {
            start,
            label: format!("{}-{}s", start, start.saturating_add(BIN_SECONDS)),
            count,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Feature {
    #[default]
    Acousticness,
    Tempo,
    Energy,
    Valence,
    Danceability,
}

impl Feature {
    pub fn key(self) -> &'static str {
        match self {
            Feature::Acousticness => "acousticness",
            Feature::Tempo => "tempo",
            Feature::Energy => "energy",
            Feature::Valence => "valence",
            Feature::Danceability => "danceability",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Feature::Acousticness => "Acousticness",
            Feature::Tempo => "Tempo",
            Feature::Energy => "Energy",
            Feature::Valence => "Valence",
            Feature::Danceability => "Danceability",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePoint {
    pub label: String,
    pub value: f64,
}

fn display_label(song: &Song, position: usize) -> String {
    song.title()
        .unwrap_or_else(|| format!("Song {}", position))
}

pub fn feature_projection(songs: &[Song], key: &str) -> Vec<FeaturePoint> {
    songs
        .iter()
        .enumerate()
        .map(|(i, song)| FeaturePoint {
            label: display_label(song, i + 1),
            value: song.number(key),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub index: usize,
    pub title: Option<String>,
    pub danceability: f64,
}

pub fn danceability_scatter(songs: &[Song]) -> Vec<ScatterPoint> {
    songs
        .iter()
        .enumerate()
        .map(|(i, song)| ScatterPoint {
            index: i + 1,
            title: song.title(),
            danceability: song.number("danceability"),
        })
        .collect()
}

/// The five chart series, computed over the unsorted working set.
#[derive(Debug, Clone, PartialEq)]
pub struct Charts {
    pub scatter: Vec<ScatterPoint>,
    pub histogram: Vec<DurationBin>,
    pub acousticness: Vec<FeaturePoint>,
    pub tempo: Vec<FeaturePoint>,
    pub feature: Feature,
    pub selected: Vec<FeaturePoint>,
}

impl Charts {
    pub fn from_songs(songs: &[Song], feature: Feature) -> Self {
        Self {
            scatter: danceability_scatter(songs),
            histogram: duration_histogram(songs),
            acousticness: feature_projection(songs, Feature::Acousticness.key()),
            tempo: feature_projection(songs, Feature::Tempo.key()),
            feature,
            selected: feature_projection(songs, feature.key()),
        }
    }
}
