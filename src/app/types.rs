// src/app/types.rs
use eframe::egui::TextureHandle;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

// ---- catalog DTOs (mirror the TMDB JSON) ----
/// TMDB sends `null` for unknown strings and numbers; read those as the default.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movie {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub original_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub genre_ids: Vec<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub overview: String,
    pub poster_path: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub vote_average: f32,
}

impl Movie {
    pub fn has_all_genres(&self, wanted: &BTreeSet<u32>) -> bool {
        wanted.iter().all(|g| self.genre_ids.contains(g))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoviePage {
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<Movie>,
    #[serde(deserialize_with = "null_as_default")]
    pub total_pages: u32,
}

impl Default for MoviePage {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            total_pages: 1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionCompany {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub logo_path: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub origin_country: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpokenLanguage {
    #[serde(deserialize_with = "null_as_default")]
    pub english_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub iso_639_1: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Detail {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub tagline: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub vote_average: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    pub runtime: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub revenue: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub budget: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub production_companies: Vec<ProductionCompany>,
    #[serde(deserialize_with = "null_as_default")]
    pub spoken_languages: Vec<SpokenLanguage>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cast {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub character: String,
    pub profile_path: Option<String>,
}

/// One entry of `/movie/{id}/videos`; only YouTube trailers are kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trailer {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub site: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
}

impl Trailer {
    pub fn is_youtube_trailer(&self) -> bool {
        self.kind == "Trailer" && self.site == "YouTube"
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndividualMovie {
    pub detail: Option<Detail>,
    pub cast: Vec<Cast>,
    pub trailers: Vec<Trailer>,
}

// ---- cross-thread messages / data ----
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCmd {
    LoadGenres,
    LoadNextPage,
    Search(String),
    ToggleGenre(u32),
    ClearGenres,
    OpenMovie(u64),
}

/// What the grid needs to paint; produced by the store thread after each command.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogView {
    pub movies: Vec<Movie>,
    pub genres: Vec<Genre>,
    pub selected_genres: BTreeSet<u32>,
    pub search_query: String,
    pub page: u32,
    pub total_pages: u32,
    pub has_more: bool,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self {
            movies: Vec::new(),
            genres: Vec::new(),
            selected_genres: BTreeSet::new(),
            search_query: String::new(),
            page: 1,
            total_pages: 1,
            has_more: true,
        }
    }
}

/// Every command except `OpenMovie` is answered by exactly one `Catalog`.
#[derive(Debug)]
pub enum StoreMsg {
    Catalog(CatalogView),
    Movie(u64, IndividualMovie),
    MovieError(u64, String),
    /// A popular/search page failed to load; paging waits for a retry.
    ListError(String),
    Error(String),
}

pub struct PrefetchDone {
    pub key: String,
    pub result: Result<PathBuf, String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosterState {
    Pending, // queued or downloading
    Cached,  // file present on disk (ready to upload)
    Ready,   // texture uploaded
    Failed,  // permanent failure
}

pub struct PosterSlot {
    pub path: Option<PathBuf>,
    pub tex: Option<TextureHandle>, // UI thread only
    pub state: PosterState,
}
