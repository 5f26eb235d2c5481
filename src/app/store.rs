// src/app/store.rs: fetch / dedupe / cache / filter for the catalog
use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::app::storage::{get_json, set_json, KeyValueStore, StorageError};
use crate::app::tmdb::{ApiError, CatalogApi};
use crate::app::types::{
    Cast, CatalogView, Detail, Genre, IndividualMovie, Movie, MoviePage, Trailer,
};

// Storage keys
pub const KEY_MOVIE_GENRES: &str = "movie_genres";
pub const KEY_MOVIES: &str = "movies";
pub const KEY_PAGE: &str = "page";
pub const KEY_SEARCH: &str = "search";
pub const KEY_FILTERED_GENRES: &str = "filtered_genres";
pub const KEY_MOVIE_DETAIL: &str = "movie_detail";
pub const KEY_MOVIE_CAST: &str = "movie_cast";
pub const KEY_MOVIE_TRAILERS: &str = "movie_trailers";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Cast/trailer lists are cached together with the movie they belong to.
#[derive(Debug, Serialize, Deserialize)]
struct CachedList<T> {
    id: u64,
    items: Vec<T>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListSource {
    Popular,
    Search,
}

pub struct MovieStore<S: KeyValueStore> {
    storage: S,
    pub movie_genres: Vec<Genre>,
    /// Genres that occur in the loaded list (what the chips offer).
    pub filtered_movie_genres: Vec<Genre>,
    pub movies: MoviePage,
    /// `movies` restricted to `filtered_genre_ids`.
    pub filtered_movies: MoviePage,
    pub individual_movie: IndividualMovie,
    /// Next page to request.
    pub page: u32,
    pub search_query: String,
    pub filtered_genre_ids: BTreeSet<u32>,
    pub is_fetching: bool,
    pub is_genre_fetching: bool,
    pub last_error: Option<String>,
}

/// Clears a busy flag on every exit path.
struct BusyGuard<'a>(&'a mut bool);

impl<'a> BusyGuard<'a> {
    fn set(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

impl<S: KeyValueStore> MovieStore<S> {
    /// Hydrate from whatever a previous run left in storage.
    pub fn load(storage: S) -> Self {
        let movie_genres: Vec<Genre> = get_json(&storage, KEY_MOVIE_GENRES).unwrap_or_default();
        let movies: MoviePage = get_json(&storage, KEY_MOVIES).unwrap_or_default();
        let page = storage
            .get(KEY_PAGE)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let search_query = storage.get(KEY_SEARCH).unwrap_or_default();
        let filtered_genre_ids: BTreeSet<u32> =
            get_json(&storage, KEY_FILTERED_GENRES).unwrap_or_default();

        let mut store = Self {
            storage,
            filtered_movie_genres: movie_genres.clone(),
            movie_genres,
            filtered_movies: movies.clone(),
            movies,
            individual_movie: IndividualMovie::default(),
            page,
            search_query,
            filtered_genre_ids,
            is_fetching: false,
            is_genre_fetching: false,
            last_error: None,
        };
        if !store.movies.results.is_empty() {
            store.refresh_genre_views();
            store.apply_genre_filter();
        }
        debug!(
            "store hydrated: {} movies, next page {}, search {:?}",
            store.movies.results.len(),
            store.page,
            store.search_query
        );
        store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn has_more_pages(&self) -> bool {
        self.page <= self.movies.total_pages.max(1)
    }

    pub fn view(&self) -> CatalogView {
        CatalogView {
            movies: self.filtered_movies.results.clone(),
            genres: self.filtered_movie_genres.clone(),
            selected_genres: self.filtered_genre_ids.clone(),
            search_query: self.search_query.clone(),
            page: self.page,
            total_pages: self.movies.total_pages,
            has_more: self.has_more_pages(),
        }
    }

    // ---- genres ----
    pub fn fetch_movie_genres(&mut self, api: &dyn CatalogApi) -> Result<(), StoreError> {
        if !self.movie_genres.is_empty() {
            return Ok(());
        }

        let genres = {
            let _busy = BusyGuard::set(&mut self.is_genre_fetching);
            api.movie_genres()?
        };

        info!("loaded {} genres", genres.len());
        self.movie_genres = genres;
        self.filtered_movie_genres = self.movie_genres.clone();
        if !self.movies.results.is_empty() {
            self.refresh_genre_views();
        }
        set_json(&mut self.storage, KEY_MOVIE_GENRES, &self.movie_genres)?;
        Ok(())
    }

    // ---- paginated lists ----
    /// Load the next page of the current list: popular, or search results when
    /// a query is set. Ignored while another list fetch is running.
    pub fn fetch_popular_movies(&mut self, api: &dyn CatalogApi) {
        if self.is_fetching {
            debug!("fetch already in flight; ignoring");
            return;
        }
        if self.search_query.is_empty() {
            self.fetch_page(api, ListSource::Popular);
        } else {
            self.fetch_page(api, ListSource::Search);
        }
    }

    pub fn fetch_movies_by_title(&mut self, api: &dyn CatalogApi) {
        if self.is_fetching {
            debug!("fetch already in flight; ignoring");
            return;
        }
        self.fetch_page(api, ListSource::Search);
    }

    fn fetch_page(&mut self, api: &dyn CatalogApi, source: ListSource) {
        if !self.has_more_pages() {
            debug!("page {} is past the last page ({})", self.page, self.movies.total_pages);
            return;
        }

        let page = self.page;
        let result = {
            let _busy = BusyGuard::set(&mut self.is_fetching);
            match source {
                ListSource::Popular => api.popular_movies(page),
                ListSource::Search => api.search_movies(&self.search_query, page),
            }
        };

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                error!("fetching page {page} failed: {e}");
                self.last_error = Some(e.to_string());
                return;
            }
        };

        self.last_error = None;
        self.merge_page(resp, source);
        if let Err(e) = self.persist_list() {
            warn!("failed to persist movie list: {e}");
        }
    }

    fn merge_page(&mut self, resp: MoviePage, source: ListSource) {
        let fetched = resp.results.len();
        let mut merged = std::mem::take(&mut self.movies.results);
        merged.extend(resp.results);
        // TMDB repeats movies across pages; ids must be unique for the grid.
        self.movies.results = dedupe_by_id(merged);
        self.movies.total_pages = resp.total_pages.max(1);

        let present = self.refresh_genre_views();
        if source == ListSource::Search {
            let before = self.filtered_genre_ids.len();
            self.filtered_genre_ids.retain(|g| present.contains(g));
            if self.filtered_genre_ids.len() != before {
                debug!("dropped {} stale genre filters", before - self.filtered_genre_ids.len());
            }
            if let Err(e) = set_json(&mut self.storage, KEY_FILTERED_GENRES, &self.filtered_genre_ids) {
                warn!("failed to persist genre filter: {e}");
            }
        }
        self.apply_genre_filter();
        self.page += 1;

        info!(
            "page {} merged: {fetched} fetched, {} unique, {} shown",
            self.page - 1,
            self.movies.results.len(),
            self.filtered_movies.results.len()
        );
    }

    /// Restrict the genre chips to genres present in the loaded list.
    fn refresh_genre_views(&mut self) -> HashSet<u32> {
        let present: HashSet<u32> = self
            .movies
            .results
            .iter()
            .flat_map(|m| m.genre_ids.iter().copied())
            .collect();
        self.filtered_movie_genres = self
            .movie_genres
            .iter()
            .filter(|g| present.contains(&g.id))
            .cloned()
            .collect();
        present
    }

    fn apply_genre_filter(&mut self) {
        self.filtered_movies.results = self
            .movies
            .results
            .iter()
            .filter(|m| m.has_all_genres(&self.filtered_genre_ids))
            .cloned()
            .collect();
        self.filtered_movies.total_pages = self.movies.total_pages;
    }

    fn persist_list(&mut self) -> Result<(), StorageError> {
        set_json(&mut self.storage, KEY_MOVIES, &self.movies)?;
        self.storage.set(KEY_PAGE, &self.page.to_string())
    }

    // ---- search & filters ----
    /// Switch the list to a new title query (empty = popular). Starts over at page 1.
    pub fn set_search_query(&mut self, query: &str) -> Result<(), StoreError> {
        let query = query.trim();
        if query == self.search_query && !self.movies.results.is_empty() {
            return Ok(());
        }
        self.search_query = query.to_string();
        self.page = 1;
        self.movies = MoviePage::default();
        self.filtered_movies = MoviePage::default();
        self.filtered_movie_genres = self.movie_genres.clone();

        self.storage.set(KEY_SEARCH, &self.search_query)?;
        self.persist_list()?;
        Ok(())
    }

    pub fn toggle_genre(&mut self, genre_id: u32) -> Result<(), StoreError> {
        if !self.filtered_genre_ids.remove(&genre_id) {
            self.filtered_genre_ids.insert(genre_id);
        }
        self.apply_genre_filter();
        set_json(&mut self.storage, KEY_FILTERED_GENRES, &self.filtered_genre_ids)?;
        Ok(())
    }

    pub fn clear_genre_filter(&mut self) -> Result<(), StoreError> {
        self.filtered_genre_ids.clear();
        self.apply_genre_filter();
        set_json(&mut self.storage, KEY_FILTERED_GENRES, &self.filtered_genre_ids)?;
        Ok(())
    }

    // ---- single movie ----
    pub fn fetch_movie_detail(&mut self, api: &dyn CatalogApi, id: u64) -> Result<(), StoreError> {
        if let Some(cached) = get_json::<Detail, _>(&self.storage, KEY_MOVIE_DETAIL) {
            if cached.id == id {
                self.individual_movie.detail = Some(cached);
                return Ok(());
            }
        }

        let detail = {
            let _busy = BusyGuard::set(&mut self.is_fetching);
            api.movie_detail(id)?
        };
        set_json(&mut self.storage, KEY_MOVIE_DETAIL, &detail)?;
        self.individual_movie.detail = Some(detail);
        Ok(())
    }

    pub fn fetch_movie_trailers(&mut self, api: &dyn CatalogApi, id: u64) -> Result<(), StoreError> {
        if let Some(items) = self.cached_list::<Trailer>(KEY_MOVIE_TRAILERS, id) {
            self.individual_movie.trailers = items;
            return Ok(());
        }

        let trailers: Vec<Trailer> = api
            .movie_videos(id)?
            .into_iter()
            .filter(Trailer::is_youtube_trailer)
            .collect();
        set_json(
            &mut self.storage,
            KEY_MOVIE_TRAILERS,
            &CachedList {
                id,
                items: trailers.clone(),
            },
        )?;
        self.individual_movie.trailers = trailers;
        Ok(())
    }

    pub fn fetch_movie_cast(&mut self, api: &dyn CatalogApi, id: u64) -> Result<(), StoreError> {
        if let Some(items) = self.cached_list::<Cast>(KEY_MOVIE_CAST, id) {
            self.individual_movie.cast = items;
            return Ok(());
        }

        let cast = api.movie_credits(id)?;
        set_json(
            &mut self.storage,
            KEY_MOVIE_CAST,
            &CachedList {
                id,
                items: cast.clone(),
            },
        )?;
        self.individual_movie.cast = cast;
        Ok(())
    }

    /// Detail, cast and trailers for one movie; the first failure wins.
    pub fn open_movie(&mut self, api: &dyn CatalogApi, id: u64) -> Result<(), StoreError> {
        self.individual_movie = IndividualMovie::default();
        self.fetch_movie_detail(api, id)?;
        self.fetch_movie_cast(api, id)?;
        self.fetch_movie_trailers(api, id)?;
        Ok(())
    }

    /// A cached list only counts when it belongs to `id` and isn't empty.
    fn cached_list<T: serde::de::DeserializeOwned>(&self, key: &str, id: u64) -> Option<Vec<T>> {
        get_json::<CachedList<T>, _>(&self.storage, key)
            .filter(|c| c.id == id && !c.items.is_empty())
            .map(|c| c.items)
    }
}

/// Unique by id. A movie keeps the position of its first appearance and the
/// payload of its latest one.
pub fn dedupe_by_id(movies: Vec<Movie>) -> Vec<Movie> {
    let mut slot: HashMap<u64, usize> = HashMap::with_capacity(movies.len());
    let mut out: Vec<Movie> = Vec::with_capacity(movies.len());
    for m in movies {
        match slot.get(&m.id) {
            Some(&i) => out[i] = m,
            None => {
                slot.insert(m.id, out.len());
                out.push(m);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::storage::MemoryStore;
    use std::cell::RefCell;

    fn movie(id: u64, title: &str, genres: &[u32]) -> Movie {
        Movie {
            id,
            title: title.into(),
            genre_ids: genres.to_vec(),
            ..Default::default()
        }
    }

    fn genre(id: u32, name: &str) -> Genre {
        Genre {
            id,
            name: name.into(),
        }
    }

    #[derive(Default)]
    struct FakeApi {
        genres: Vec<Genre>,
        popular: Vec<MoviePage>,
        search: Vec<MoviePage>,
        fail_lists: bool,
        calls: RefCell<Vec<String>>,
    }

    impl FakeApi {
        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn log(&self, call: String) {
            self.calls.borrow_mut().push(call);
        }
    }

    fn down() -> ApiError {
        ApiError::Status {
            status: 503,
            url: "http://fake".into(),
        }
    }

    impl CatalogApi for FakeApi {
        fn movie_genres(&self) -> Result<Vec<Genre>, ApiError> {
            self.log("genres".into());
            Ok(self.genres.clone())
        }

        fn popular_movies(&self, page: u32) -> Result<MoviePage, ApiError> {
            self.log(format!("popular:{page}"));
            if self.fail_lists {
                return Err(down());
            }
            Ok(self.popular.get(page as usize - 1).cloned().unwrap_or_default())
        }

        fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, ApiError> {
            self.log(format!("search:{query}:{page}"));
            if self.fail_lists {
                return Err(down());
            }
            Ok(self.search.get(page as usize - 1).cloned().unwrap_or_default())
        }

        fn movie_detail(&self, id: u64) -> Result<Detail, ApiError> {
            self.log(format!("detail:{id}"));
            if id == 404 {
                return Err(ApiError::Status {
                    status: 404,
                    url: "http://fake/movie/404".into(),
                });
            }
            Ok(Detail {
                id,
                title: format!("Movie {id}"),
                ..Default::default()
            })
        }

        fn movie_videos(&self, id: u64) -> Result<Vec<Trailer>, ApiError> {
            self.log(format!("videos:{id}"));
            let video = |key: &str, site: &str, kind: &str| Trailer {
                id: key.into(),
                key: key.into(),
                name: key.into(),
                site: site.into(),
                kind: kind.into(),
            };
            Ok(vec![
                video("a", "YouTube", "Trailer"),
                video("b", "YouTube", "Teaser"),
                video("c", "Vimeo", "Trailer"),
            ])
        }

        fn movie_credits(&self, id: u64) -> Result<Vec<Cast>, ApiError> {
            self.log(format!("credits:{id}"));
            Ok(vec![Cast {
                id: 1,
                name: format!("Actor of {id}"),
                ..Default::default()
            }])
        }
    }

    fn page(results: Vec<Movie>, total_pages: u32) -> MoviePage {
        MoviePage {
            results,
            total_pages,
        }
    }

    fn catalog_api() -> FakeApi {
        FakeApi {
            genres: vec![genre(12, "Adventure"), genre(28, "Action"), genre(35, "Comedy"), genre(99, "Documentary")],
            popular: vec![
                page(vec![movie(1, "One", &[28, 12]), movie(2, "Two", &[35])], 2),
                page(vec![movie(2, "Two (updated)", &[35]), movie(3, "Three", &[28])], 2),
            ],
            ..Default::default()
        }
    }

    fn ids(movies: &[Movie]) -> Vec<u64> {
        movies.iter().map(|m| m.id).collect()
    }

    #[test]
    fn dedupe_keeps_first_position_and_last_payload() {
        let out = dedupe_by_id(vec![
            movie(1, "a", &[]),
            movie(2, "b", &[]),
            movie(1, "a2", &[]),
            movie(3, "c", &[]),
        ]);
        assert_eq!(ids(&out), vec![1, 2, 3]);
        assert_eq!(out[0].title, "a2");
    }

    #[test]
    fn pages_append_dedupe_and_persist() {
        let api = catalog_api();
        let mut store = MovieStore::load(MemoryStore::default());
        store.fetch_movie_genres(&api).unwrap();

        store.fetch_popular_movies(&api);
        store.fetch_popular_movies(&api);

        assert_eq!(ids(&store.movies.results), vec![1, 2, 3]);
        assert_eq!(store.movies.results[1].title, "Two (updated)");
        assert_eq!(store.page, 3);
        assert!(!store.has_more_pages());
        assert!(!store.is_fetching);

        // past the last page nothing is requested
        store.fetch_popular_movies(&api);
        assert_eq!(api.calls(), vec!["genres", "popular:1", "popular:2"]);

        assert_eq!(store.storage().get(KEY_PAGE).as_deref(), Some("3"));
        let saved: MoviePage = get_json(store.storage(), KEY_MOVIES).unwrap();
        assert_eq!(ids(&saved.results), vec![1, 2, 3]);
    }

    #[test]
    fn genre_chips_only_offer_genres_in_the_list() {
        let api = catalog_api();
        let mut store = MovieStore::load(MemoryStore::default());
        store.fetch_movie_genres(&api).unwrap();
        assert_eq!(store.filtered_movie_genres.len(), 4);

        store.fetch_popular_movies(&api);
        let offered: Vec<u32> = store.filtered_movie_genres.iter().map(|g| g.id).collect();
        assert_eq!(offered, vec![12, 28, 35]);
    }

    #[test]
    fn genre_filter_requires_all_selected() {
        let api = catalog_api();
        let mut store = MovieStore::load(MemoryStore::default());
        store.fetch_movie_genres(&api).unwrap();
        store.fetch_popular_movies(&api);
        store.fetch_popular_movies(&api);

        store.toggle_genre(28).unwrap();
        assert_eq!(ids(&store.filtered_movies.results), vec![1, 3]);
        store.toggle_genre(12).unwrap();
        assert_eq!(ids(&store.filtered_movies.results), vec![1]);
        store.toggle_genre(28).unwrap();
        assert_eq!(ids(&store.filtered_movies.results), vec![1]);
        assert_eq!(store.storage().get(KEY_FILTERED_GENRES).as_deref(), Some("[12]"));

        store.clear_genre_filter().unwrap();
        assert_eq!(ids(&store.filtered_movies.results), vec![1, 2, 3]);
        // the unfiltered list is never touched by filtering
        assert_eq!(store.movies.results.len(), 3);
    }

    #[test]
    fn genres_are_fetched_once() {
        let api = catalog_api();
        let mut store = MovieStore::load(MemoryStore::default());
        store.fetch_movie_genres(&api).unwrap();
        store.fetch_movie_genres(&api).unwrap();
        assert_eq!(api.calls(), vec!["genres"]);
        assert!(!store.is_genre_fetching);

        // a later run reads them back from storage
        let storage = std::mem::take(&mut store.storage);
        let mut reloaded = MovieStore::load(storage);
        reloaded.fetch_movie_genres(&api).unwrap();
        assert_eq!(api.calls(), vec!["genres"]);
        assert_eq!(reloaded.movie_genres.len(), 4);
    }

    #[test]
    fn search_routes_to_title_endpoint_and_prunes_filters() {
        let mut api = catalog_api();
        api.search = vec![page(vec![movie(7, "Alien", &[28, 878]), movie(8, "Aliens", &[28])], 1)];
        let mut store = MovieStore::load(MemoryStore::default());
        store.fetch_movie_genres(&api).unwrap();
        store.fetch_popular_movies(&api);
        store.toggle_genre(35).unwrap();
        store.toggle_genre(28).unwrap();

        store.set_search_query("  alien ").unwrap();
        assert_eq!(store.page, 1);
        assert!(store.movies.results.is_empty());
        assert_eq!(store.storage().get(KEY_SEARCH).as_deref(), Some("alien"));

        store.fetch_popular_movies(&api);
        assert_eq!(api.calls().last().map(String::as_str), Some("search:alien:1"));
        assert_eq!(ids(&store.movies.results), vec![7, 8]);
        // comedy isn't in the results any more, action still is
        assert_eq!(store.filtered_genre_ids, BTreeSet::from([28]));
        assert_eq!(store.storage().get(KEY_FILTERED_GENRES).as_deref(), Some("[28]"));
        assert_eq!(ids(&store.filtered_movies.results), vec![7, 8]);
    }

    #[test]
    fn clearing_search_returns_to_popular() {
        let mut api = catalog_api();
        api.search = vec![page(vec![movie(7, "Alien", &[28])], 1)];
        let mut store = MovieStore::load(MemoryStore::default());
        store.set_search_query("alien").unwrap();
        store.fetch_popular_movies(&api);
        store.set_search_query("").unwrap();
        store.fetch_popular_movies(&api);
        assert_eq!(api.calls(), vec!["search:alien:1", "popular:1"]);
        assert_eq!(ids(&store.movies.results), vec![1, 2]);
    }

    #[test]
    fn failed_page_is_logged_not_raised() {
        let api = FakeApi {
            fail_lists: true,
            ..Default::default()
        };
        let mut store = MovieStore::load(MemoryStore::default());
        store.fetch_popular_movies(&api);
        assert!(!store.is_fetching);
        assert_eq!(store.page, 1);
        assert!(store.last_error.as_deref().unwrap_or_default().contains("503"));
        assert_eq!(store.storage().get(KEY_PAGE), None);
    }

    #[test]
    fn in_flight_fetch_is_ignored() {
        let api = catalog_api();
        let mut store = MovieStore::load(MemoryStore::default());
        store.is_fetching = true;
        store.fetch_popular_movies(&api);
        store.fetch_movies_by_title(&api);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn hydrates_from_previous_run() {
        let mut storage = MemoryStore::default();
        set_json(&mut storage, KEY_MOVIE_GENRES, &vec![genre(28, "Action"), genre(35, "Comedy"), genre(99, "Documentary")]).unwrap();
        set_json(&mut storage, KEY_MOVIES, &page(vec![movie(1, "One", &[28]), movie(2, "Two", &[35])], 9)).unwrap();
        storage.set(KEY_PAGE, "2").unwrap();
        storage.set(KEY_SEARCH, "one").unwrap();
        storage.set(KEY_FILTERED_GENRES, "[35]").unwrap();

        let store = MovieStore::load(storage);
        assert_eq!(store.page, 2);
        assert_eq!(store.search_query, "one");
        assert_eq!(ids(&store.filtered_movies.results), vec![2]);
        assert_eq!(store.filtered_movie_genres.len(), 2);
        let view = store.view();
        assert_eq!(view.total_pages, 9);
        assert!(view.has_more);
    }

    #[test]
    fn bad_stored_values_fall_back_to_defaults() {
        let mut storage = MemoryStore::default();
        storage.set(KEY_MOVIES, "{oops").unwrap();
        storage.set(KEY_PAGE, "zero").unwrap();
        let store = MovieStore::load(storage);
        assert!(store.movies.results.is_empty());
        assert_eq!(store.movies.total_pages, 1);
        assert_eq!(store.page, 1);
    }

    #[test]
    fn movie_detail_uses_cache_for_same_id() {
        let api = catalog_api();
        let mut store = MovieStore::load(MemoryStore::default());
        store.fetch_movie_detail(&api, 550).unwrap();
        store.fetch_movie_detail(&api, 550).unwrap();
        store.fetch_movie_detail(&api, 551).unwrap();
        assert_eq!(api.calls(), vec!["detail:550", "detail:551"]);
        assert_eq!(store.individual_movie.detail.as_ref().map(|d| d.id), Some(551));
    }

    #[test]
    fn movie_detail_error_propagates_and_clears_busy() {
        let api = catalog_api();
        let mut store = MovieStore::load(MemoryStore::default());
        let err = store.fetch_movie_detail(&api, 404).unwrap_err();
        assert!(matches!(err, StoreError::Api(ApiError::Status { status: 404, .. })));
        assert!(!store.is_fetching);
    }

    #[test]
    fn trailers_keep_youtube_trailers_and_cache_per_movie() {
        let api = catalog_api();
        let mut store = MovieStore::load(MemoryStore::default());
        store.fetch_movie_trailers(&api, 10).unwrap();
        assert_eq!(store.individual_movie.trailers.len(), 1);
        assert_eq!(store.individual_movie.trailers[0].key, "a");

        store.fetch_movie_trailers(&api, 10).unwrap();
        store.fetch_movie_trailers(&api, 11).unwrap();
        assert_eq!(api.calls(), vec!["videos:10", "videos:11"]);
    }

    #[test]
    fn cast_cache_is_not_shared_with_trailers() {
        let api = catalog_api();
        let mut store = MovieStore::load(MemoryStore::default());
        store.fetch_movie_trailers(&api, 10).unwrap();
        store.fetch_movie_cast(&api, 20).unwrap();
        store.fetch_movie_cast(&api, 10).unwrap();
        assert_eq!(store.individual_movie.cast[0].name, "Actor of 10");
        store.fetch_movie_cast(&api, 10).unwrap();
        assert_eq!(api.calls(), vec!["videos:10", "credits:20", "credits:10"]);
    }

    #[test]
    fn open_movie_loads_everything() {
        let api = catalog_api();
        let mut store = MovieStore::load(MemoryStore::default());
        store.open_movie(&api, 5).unwrap();
        let m = &store.individual_movie;
        assert_eq!(m.detail.as_ref().map(|d| d.title.as_str()), Some("Movie 5"));
        assert_eq!(m.cast.len(), 1);
        assert_eq!(m.trailers.len(), 1);

        assert!(store.open_movie(&api, 404).is_err());
        assert!(store.individual_movie.detail.is_none());
    }
}
