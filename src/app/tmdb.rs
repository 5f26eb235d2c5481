// src/app/tmdb.rs: blocking TMDB v3 client
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::app::types::{Cast, Detail, Genre, MoviePage, Trailer};
use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no TMDB token configured")]
    MissingToken,
    #[error("GET {url}: {message}")]
    Http { url: String, message: String },
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("decode {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

/// The remote catalog as seen by the movie store.
pub trait CatalogApi {
    fn movie_genres(&self) -> Result<Vec<Genre>, ApiError>;
    fn popular_movies(&self, page: u32) -> Result<MoviePage, ApiError>;
    fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, ApiError>;
    fn movie_detail(&self, id: u64) -> Result<Detail, ApiError>;
    fn movie_videos(&self, id: u64) -> Result<Vec<Trailer>, ApiError>;
    fn movie_credits(&self, id: u64) -> Result<Vec<Cast>, ApiError>;
}

#[derive(Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Deserialize)]
struct VideoList {
    #[serde(default)]
    results: Vec<Trailer>,
}

#[derive(Deserialize)]
struct Credits {
    #[serde(default)]
    cast: Vec<Cast>,
}

pub struct TmdbClient {
    client: Option<Client>,
    base_url: String,
}

impl TmdbClient {
    pub fn new(cfg: &AppConfig) -> Self {
        let client = cfg.api_token.as_deref().and_then(|token| {
            let mut h = HeaderMap::new();
            h.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut v) => {
                    v.set_sensitive(true);
                    h.insert(AUTHORIZATION, v);
                }
                Err(e) => {
                    tracing::warn!("TMDB token is not a valid header value: {e}");
                    return None;
                }
            }
            Client::builder()
                .user_agent("cinedex/catalog")
                .timeout(Duration::from_secs(20))
                .default_headers(h)
                .build()
                .map_err(|e| tracing::warn!("http client build failed: {e}"))
                .ok()
        });

        Self {
            client,
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let client = self.client.as_ref().ok_or(ApiError::MissingToken)?;
        let url = self.endpoint(path);
        debug!("GET {url}");

        let resp = client.get(&url).send().map_err(|e| ApiError::Http {
            url: url.clone(),
            message: e.to_string(),
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let body = resp.bytes().map_err(|e| ApiError::Http {
            url: url.clone(),
            message: format!("read body: {e}"),
        })?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { url, source })
    }
}

pub(crate) fn search_path(query: &str, page: u32) -> String {
    format!(
        "/search/movie?query={}&page={page}",
        urlencoding::encode(query)
    )
}

impl CatalogApi for TmdbClient {
    fn movie_genres(&self) -> Result<Vec<Genre>, ApiError> {
        self.get_json::<GenreList>("/genre/movie/list")
            .map(|list| list.genres)
    }

    fn popular_movies(&self, page: u32) -> Result<MoviePage, ApiError> {
        self.get_json(&format!("/movie/popular?page={page}"))
    }

    fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, ApiError> {
        self.get_json(&search_path(query, page))
    }

    fn movie_detail(&self, id: u64) -> Result<Detail, ApiError> {
        self.get_json(&format!("/movie/{id}"))
    }

    fn movie_videos(&self, id: u64) -> Result<Vec<Trailer>, ApiError> {
        self.get_json::<VideoList>(&format!("/movie/{id}/videos"))
            .map(|list| list.results)
    }

    fn movie_credits(&self, id: u64) -> Result<Vec<Cast>, ApiError> {
        self.get_json::<Credits>(&format!("/movie/{id}/credits"))
            .map(|c| c.cast)
    }
}
