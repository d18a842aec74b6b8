//! State owner for the songs dashboard.
//!
//! Holds the working set and everything the views are derived from: sort
//! order, current page, loading flag, error banner, search flag, the selected
//! chart feature and the alert slot. Views are recomputed from this state on
//! every read.
//!
//! Ratings are applied locally before the request is sent and are never rolled
//! back. A failed submission only raises an alert, so the local value and the
//! backend's can disagree until the next reload.
//!
//! Network calls are split in two. `start_*` updates the state and returns a
//! [`PendingRequest`] that owns everything it needs, so the caller can run it
//! on its own task while the dashboard keeps serving input. The resulting
//! [`Completion`] is handed back through [`Dashboard::complete`].

use super::{
    alert::{Alert, AlertSlot, AlertToken, Severity},
    client::{ApiError, SongsApi},
    export::{export_csv, Quoting},
    record::{headers, Song, SongId, Stars},
    transform::{clamp_page, paginate, sort_songs, total_pages, Charts, Feature, SortConfig},
};
use anyhow::Result;
use serde_json::Value;
use std::{
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
    sync::Arc,
};

pub const LOAD_ERROR: &str = "Failed to load songs";
pub const SEARCH_ERROR: &str = "No song found or API error";
pub const RATE_OK: &str = "Rating updated successfully!";
pub const RATE_FAILED: &str = "Failed to update rating";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    All,
    Search,
}

/// Handed out when a fetch starts. Only the newest ticket may write the
/// working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    kind: FetchKind,
}

/// Outcome of a request started by one of the `start_*` methods.
#[derive(Debug)]
pub enum Completion {
    Fetched(FetchTicket, Result<Vec<Song>, ApiError>),
    Rated(SongId, Result<(), ApiError>),
}

pub type PendingRequest = Pin<Box<dyn Future<Output = Completion> + Send + 'static>>;

#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub number: usize,
    pub total_pages: usize,
    pub songs: Vec<Song>,
}

pub struct Dashboard<A> {
    api: Arc<A>,
    songs: Vec<Song>,
    sort: SortConfig,
    page: usize,
    loading: bool,
    error: Option<String>,
    search_active: bool,
    feature: Feature,
    alert: AlertSlot,
    generation: u64,
}

impl<A: SongsApi> Dashboard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api: Arc::new(api),
            songs: vec![],
            sort: SortConfig::default(),
            page: 1,
            loading: false,
            error: None,
            search_active: false,
            feature: Feature::default(),
            alert: AlertSlot::default(),
            generation: 0,
        }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn headers(&self) -> Vec<String> {
        headers(&self.songs)
    }

    pub fn sort_config(&self) -> &SortConfig {
        &self.sort
    }

    pub fn sorted(&self) -> Vec<Song> {
        sort_songs(&self.songs, &self.sort)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Load or search failure banner. Hidden while a fetch is in flight.
    pub fn error(&self) -> Option<&str> {
        if self.loading {
            return None;
        }
        self.error.as_deref()
    }

    pub fn search_active(&self) -> bool {
        self.search_active
    }

    pub fn feature(&self) -> Feature {
        self.feature
    }

    pub fn set_feature(&mut self, feature: Feature) {
        self.feature = feature;
    }

    pub fn charts(&self) -> Charts {
        Charts::from_songs(&self.songs, self.feature)
    }

    pub fn set_sort(&mut self, sort: SortConfig) {
        self.sort = sort;
        self.page = 1;
    }

    /// Sorts by `key`, flipping the direction when it is already the sort key.
    pub fn handle_sort(&mut self, key: &str) {
        self.sort.toggle(key);
        self.page = 1;
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.songs.len())
    }

    pub fn page(&self) -> usize {
        clamp_page(self.page, self.songs.len())
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = clamp_page(page, self.songs.len());
    }

    pub fn first(&mut self) {
        self.go_to(1);
    }

    pub fn prev(&mut self) {
        self.go_to(self.page().saturating_sub(1));
    }

    pub fn next(&mut self) {
        self.go_to(self.page() + 1);
    }

    pub fn last(&mut self) {
        self.go_to(self.total_pages());
    }

    pub fn current_page(&self) -> PageView {
        let sorted = self.sorted();
        let page = paginate(&sorted, self.page);
        PageView {
            number: page.number,
            total_pages: page.total_pages,
            songs: page.songs.to_vec(),
        }
    }

    pub fn begin_fetch(&mut self, kind: FetchKind) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket {
            generation: self.generation,
            kind,
        }
    }

    /// Applies a finished fetch. Returns `false` when a newer fetch has
    /// started since, in which case the result is dropped.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<Song>, ApiError>) -> bool {
        if ticket.generation != self.generation {
            log::debug!(
                "dropping stale {:?} fetch #{} (latest #{})",
                ticket.kind,
                ticket.generation,
                self.generation
            );
            return false;
        }
        self.loading = false;
        match (ticket.kind, result) {
            (FetchKind::All, Ok(songs)) => {
                self.songs = songs;
                self.error = None;
                self.search_active = false;
            }
            (FetchKind::All, Err(e)) => {
                log::warn!("loading songs failed: {}", e);
                self.error = Some(LOAD_ERROR.to_string());
                self.search_active = false;
            }
            (FetchKind::Search, Ok(songs)) => {
                self.songs = songs;
                self.error = None;
                self.search_active = true;
                self.page = 1;
            }
            (FetchKind::Search, Err(e)) => {
                log::warn!("search failed: {}", e);
                self.error = Some(SEARCH_ERROR.to_string());
            }
        }
        true
    }

    pub fn start_load_all(&mut self) -> PendingRequest {
        let ticket = self.begin_fetch(FetchKind::All);
        let api = Arc::clone(&self.api);
        Box::pin(async move { Completion::Fetched(ticket, api.fetch_all().await) })
    }

    /// Title search. A blank title reloads everything instead.
    pub fn start_search(&mut self, title: &str) -> PendingRequest {
        if title.trim().is_empty() {
            return self.start_load_all();
        }
        let ticket = self.begin_fetch(FetchKind::Search);
        let api = Arc::clone(&self.api);
        let title = title.to_string();
        Box::pin(async move { Completion::Fetched(ticket, api.search_by_title(&title).await) })
    }

    /// Applies the rating locally, then returns the submission. The alert is
    /// raised once the submission completes.
    pub fn start_rate(&mut self, song_id: SongId, stars: Stars) -> PendingRequest {
        self.rate_locally(&song_id, stars);
        let api = Arc::clone(&self.api);
        Box::pin(async move {
            let result = api.rate(&song_id, stars).await;
            Completion::Rated(song_id, result)
        })
    }

    /// Applies a finished request. Returns the alert token for ratings.
    pub fn complete(&mut self, completion: Completion) -> Option<AlertToken> {
        match completion {
            Completion::Fetched(ticket, result) => {
                self.finish_fetch(ticket, result);
                None
            }
            Completion::Rated(song_id, result) => Some(self.finish_rate(&song_id, result)),
        }
    }

    pub fn finish_rate(&mut self, song_id: &SongId, result: Result<(), ApiError>) -> AlertToken {
        match result {
            Ok(()) => self.alert.show(Severity::Success, RATE_OK),
            Err(e) => {
                log::warn!("rating song {} failed: {}", song_id, e);
                self.alert.show(Severity::Danger, RATE_FAILED)
            }
        }
    }

    pub async fn load_all(&mut self) {
        let completion = self.start_load_all().await;
        self.complete(completion);
    }

    pub async fn search(&mut self, title: &str) {
        let completion = self.start_search(title).await;
        self.complete(completion);
    }

    pub async fn rate(&mut self, song_id: &SongId, stars: Stars) -> AlertToken {
        self.rate_locally(song_id, stars);
        let result = self.api.rate(song_id, stars).await;
        self.finish_rate(song_id, result)
    }

    fn rate_locally(&mut self, song_id: &SongId, stars: Stars) {
        if self.apply_rating(song_id, stars) == 0 {
            log::debug!("song {} is not in the working set", song_id);
        }
    }

    /// Sets the rating on every matching song in the working set and returns
    /// how many were updated.
    pub fn apply_rating(&mut self, song_id: &SongId, stars: Stars) -> usize {
        let mut updated = 0;
        for song in self.songs.iter_mut() {
            if song.id().is_some_and(|id| song_id.matches(id)) {
                song.set("rating", Value::from(stars.value()));
                updated += 1;
            }
        }
        updated
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.current()
    }

    pub fn clear_alert(&mut self, token: AlertToken) -> bool {
        self.alert.clear(token)
    }

    /// Exports the sorted, unpaginated working set.
    pub fn export(&self, out: &Path, quoting: Quoting) -> Result<Option<PathBuf>> {
        export_csv(out, &self.headers(), &self.sorted(), quoting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::transform::SortDirection;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeState {
        all: Option<Vec<Song>>,
        search: Option<Vec<Song>>,
        rate_ok: bool,
        calls: Vec<String>,
    }

    #[derive(Clone, Default)]
    struct FakeApi(Arc<Mutex<FakeState>>);

    impl FakeApi {
        fn with_songs(songs: Vec<Song>) -> Self {
            let api = Self::default();
            api.0.lock().unwrap().all = Some(songs);
            api
        }

        fn calls(&self) -> Vec<String> {
            self.0.lock().unwrap().calls.clone()
        }
    }

    fn unavailable() -> ApiError {
        ApiError::Status(503, "unavailable".to_string())
    }

    #[async_trait]
    impl SongsApi for FakeApi {
        async fn fetch_all(&self) -> Result<Vec<Song>, ApiError> {
            let mut state = self.0.lock().unwrap();
            state.calls.push("fetch_all".to_string());
            state.all.clone().ok_or_else(unavailable)
        }

        async fn search_by_title(&self, title: &str) -> Result<Vec<Song>, ApiError> {
            let mut state = self.0.lock().unwrap();
            state.calls.push(format!("search {}", title));
            state
                .search
                .clone()
                .ok_or_else(|| ApiError::Status(404, "No songs found".to_string()))
        }

        async fn rate(&self, song_id: &SongId, stars: Stars) -> Result<(), ApiError> {
            let mut state = self.0.lock().unwrap();
            state.calls.push(format!("rate {} {}", song_id, stars.value()));
            if state.rate_ok {
                Ok(())
            } else {
                Err(unavailable())
            }
        }
    }

    fn catalog(n: usize) -> Vec<Song> {
        (1..=n)
            .map(|i| {
                serde_json::from_value(json!({
                    "id": i,
                    "title": format!("Song {}", i),
                    "tempo": 100 + i,
                    "rating": 0
                }))
                .unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_load_all() {
        let mut dashboard = Dashboard::new(FakeApi::with_songs(catalog(15)));
        dashboard.load_all().await;
        assert_eq!(dashboard.songs().len(), 15);
        assert_eq!(dashboard.headers(), vec!["id", "title", "tempo", "rating"]);
        assert!(!dashboard.is_loading());
        assert!(!dashboard.search_active());
        assert_eq!(dashboard.error(), None);
        assert_eq!(dashboard.total_pages(), 2);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_songs() {
        let api = FakeApi::with_songs(catalog(3));
        let mut dashboard = Dashboard::new(api.clone());
        dashboard.load_all().await;
        api.0.lock().unwrap().all = None;
        dashboard.load_all().await;
        assert_eq!(dashboard.songs().len(), 3);
        assert_eq!(dashboard.error(), Some(LOAD_ERROR));
        assert!(!dashboard.is_loading());
    }

    #[tokio::test]
    async fn test_search() {
        let api = FakeApi::with_songs(catalog(15));
        api.0.lock().unwrap().search = Some(catalog(1));
        let mut dashboard = Dashboard::new(api.clone());
        dashboard.load_all().await;
        dashboard.next();
        assert_eq!(dashboard.page(), 2);

        dashboard.search("Song 1").await;
        assert_eq!(dashboard.songs().len(), 1);
        assert!(dashboard.search_active());
        assert_eq!(dashboard.page(), 1);
        assert_eq!(api.calls(), vec!["fetch_all", "search Song 1"]);
    }

    #[tokio::test]
    async fn test_search_failure_keeps_songs() {
        let mut dashboard = Dashboard::new(FakeApi::with_songs(catalog(4)));
        dashboard.load_all().await;
        dashboard.search("nothing").await;
        assert_eq!(dashboard.songs().len(), 4);
        assert_eq!(dashboard.error(), Some(SEARCH_ERROR));
        assert!(!dashboard.search_active());
        assert!(!dashboard.is_loading());
    }

    #[tokio::test]
    async fn test_blank_search_reloads() {
        let api = FakeApi::with_songs(catalog(5));
        api.0.lock().unwrap().search = Some(catalog(1));
        let mut searched = Dashboard::new(api.clone());
        searched.search("Song").await;
        assert!(searched.search_active());
        searched.search("   ").await;

        let mut reloaded = Dashboard::new(FakeApi::with_songs(catalog(5)));
        reloaded.load_all().await;

        assert_eq!(searched.songs(), reloaded.songs());
        assert_eq!(searched.search_active(), reloaded.search_active());
        assert_eq!(api.calls(), vec!["search Song", "fetch_all"]);
    }

    #[tokio::test]
    async fn test_rating_is_not_reverted() {
        let api = FakeApi::with_songs(catalog(5));
        let mut dashboard = Dashboard::new(api.clone());
        dashboard.load_all().await;

        let id: SongId = "3".parse().unwrap();
        dashboard.rate(&id, Stars::Four).await;
        assert_eq!(dashboard.songs()[2].rating(), 4);
        assert_eq!(dashboard.songs()[1].rating(), 0);
        let alert = dashboard.alert().unwrap();
        assert_eq!(alert.severity, Severity::Danger);
        assert_eq!(alert.message, RATE_FAILED);
        assert_eq!(api.calls(), vec!["fetch_all", "rate 3 4"]);
    }

    #[tokio::test]
    async fn test_rating_success_alert() {
        let api = FakeApi::with_songs(catalog(2));
        api.0.lock().unwrap().rate_ok = true;
        let mut dashboard = Dashboard::new(api);
        dashboard.load_all().await;

        let token = dashboard.rate(&"1".parse().unwrap(), Stars::Five).await;
        assert_eq!(dashboard.songs()[0].rating(), 5);
        assert_eq!(dashboard.alert().unwrap().message, RATE_OK);
        assert!(dashboard.clear_alert(token));
        assert!(dashboard.alert().is_none());
    }

    #[tokio::test]
    async fn test_old_alert_token_does_not_clear_new_alert() {
        let api = FakeApi::with_songs(catalog(2));
        let mut dashboard = Dashboard::new(api);
        dashboard.load_all().await;
        let first = dashboard.rate(&"1".parse().unwrap(), Stars::One).await;
        let second = dashboard.rate(&"2".parse().unwrap(), Stars::Two).await;
        assert!(!dashboard.clear_alert(first));
        assert!(dashboard.alert().is_some());
        assert!(dashboard.clear_alert(second));
    }

    #[tokio::test]
    async fn test_loading_while_request_is_pending() {
        let api = FakeApi::with_songs(catalog(3));
        let mut dashboard = Dashboard::new(api.clone());
        let request = dashboard.start_load_all();
        assert!(dashboard.is_loading());
        assert!(api.calls().is_empty());

        let completion = request.await;
        assert!(dashboard.songs().is_empty());
        assert_eq!(dashboard.complete(completion), None);
        assert!(!dashboard.is_loading());
        assert_eq!(dashboard.songs().len(), 3);

        let request = dashboard.start_rate("2".parse().unwrap(), Stars::Three);
        assert_eq!(dashboard.songs()[1].rating(), 3);
        assert!(dashboard.alert().is_none());
        let token = dashboard.complete(request.await);
        assert_eq!(dashboard.alert().map(|alert| alert.token), token);
        assert_eq!(api.calls(), vec!["fetch_all", "rate 2 3"]);
    }

    #[test]
    fn test_apply_rating_before_response() {
        let mut dashboard = Dashboard::new(FakeApi::default());
        let ticket = dashboard.begin_fetch(FetchKind::All);
        dashboard.finish_fetch(ticket, Ok(catalog(3)));
        let updated = dashboard.apply_rating(&"3".parse().unwrap(), Stars::Four);
        assert_eq!(updated, 1);
        assert_eq!(dashboard.songs()[2].rating(), 4);
    }

    #[test]
    fn test_stale_fetch_is_dropped() {
        let mut dashboard = Dashboard::new(FakeApi::default());
        let older = dashboard.begin_fetch(FetchKind::All);
        let newer = dashboard.begin_fetch(FetchKind::Search);

        assert!(!dashboard.finish_fetch(older, Ok(catalog(10))));
        assert!(dashboard.is_loading());
        assert!(dashboard.songs().is_empty());

        assert!(dashboard.finish_fetch(newer, Ok(catalog(2))));
        assert!(!dashboard.is_loading());
        assert_eq!(dashboard.songs().len(), 2);
        assert!(dashboard.search_active());
    }

    #[test]
    fn test_sorting_and_paging() {
        let mut dashboard = Dashboard::new(FakeApi::default());
        let ticket = dashboard.begin_fetch(FetchKind::All);
        dashboard.finish_fetch(ticket, Ok(catalog(25)));

        dashboard.last();
        assert_eq!(dashboard.page(), 3);
        dashboard.next();
        assert_eq!(dashboard.page(), 3);

        dashboard.handle_sort("tempo");
        assert_eq!(dashboard.page(), 1);
        dashboard.handle_sort("tempo");
        assert_eq!(
            dashboard.sort_config(),
            &SortConfig::by("tempo", SortDirection::Descending)
        );
        let page = dashboard.current_page();
        assert_eq!(page.songs[0].cell("id"), "25");
        assert_eq!(page.songs.len(), 10);

        dashboard.prev();
        assert_eq!(dashboard.page(), 1);
        dashboard.go_to(2);
        assert_eq!(dashboard.current_page().songs[0].cell("id"), "15");
    }

    #[test]
    fn test_export_uses_sorted_songs() {
        let mut dashboard = Dashboard::new(FakeApi::default());
        let ticket = dashboard.begin_fetch(FetchKind::All);
        dashboard.finish_fetch(ticket, Ok(catalog(12)));
        dashboard.set_sort(SortConfig::by("tempo", SortDirection::Descending));

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("songs.csv");
        dashboard.export(&out, Quoting::Standard).unwrap();
        let content = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "id,title,tempo,rating");
        assert_eq!(lines[1], "12,Song 12,112,0");
    }
}
