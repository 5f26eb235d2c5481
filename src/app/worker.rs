// src/app/worker.rs: the movie store lives on its own thread
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info, warn};

use crate::app::storage::KeyValueStore;
use crate::app::store::MovieStore;
use crate::app::tmdb::CatalogApi;
use crate::app::types::{StoreCmd, StoreMsg};

/// Spawn the store thread. Commands run one at a time, in order, so no two
/// catalog requests are ever in flight together.
pub fn spawn_store_worker<S, A>(storage: S, api: A) -> (Sender<StoreCmd>, Receiver<StoreMsg>)
where
    S: KeyValueStore + Send + 'static,
    A: CatalogApi + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<StoreCmd>();
    let (msg_tx, msg_rx) = mpsc::channel::<StoreMsg>();

    std::thread::Builder::new()
        .name("movie-store".into())
        .spawn(move || {
            let mut store = MovieStore::load(storage);
            let _ = msg_tx.send(StoreMsg::Catalog(store.view()));

            while let Ok(cmd) = cmd_rx.recv() {
                for msg in run_command(&mut store, &api, cmd) {
                    if msg_tx.send(msg).is_err() {
                        debug!("ui gone; store thread exiting");
                        return;
                    }
                }
            }
            info!("store thread finished");
        })
        .map_err(|e| warn!("failed to spawn store thread: {e}"))
        .ok();

    (cmd_tx, msg_rx)
}

/// Apply one command and report what changed.
pub(crate) fn run_command<S: KeyValueStore>(
    store: &mut MovieStore<S>,
    api: &dyn CatalogApi,
    cmd: StoreCmd,
) -> Vec<StoreMsg> {
    let mut out = Vec::new();
    store.last_error = None;
    match cmd {
        StoreCmd::LoadGenres => {
            if let Err(e) = store.fetch_movie_genres(api) {
                out.push(StoreMsg::Error(format!("Could not load genres: {e}")));
            }
        }
        StoreCmd::LoadNextPage => {
            store.fetch_popular_movies(api);
            if let Some(e) = store.last_error.clone() {
                out.push(StoreMsg::ListError(format!("Could not load movies: {e}")));
            }
        }
        StoreCmd::Search(query) => {
            match store.set_search_query(&query) {
                Ok(()) => store.fetch_popular_movies(api),
                Err(e) => out.push(StoreMsg::Error(format!("Search failed: {e}"))),
            }
            if let Some(e) = store.last_error.clone() {
                out.push(StoreMsg::ListError(format!("Could not load movies: {e}")));
            }
        }
        StoreCmd::ToggleGenre(id) => {
            if let Err(e) = store.toggle_genre(id) {
                out.push(StoreMsg::Error(format!("Could not save genre filter: {e}")));
            }
        }
        StoreCmd::ClearGenres => {
            if let Err(e) = store.clear_genre_filter() {
                out.push(StoreMsg::Error(format!("Could not save genre filter: {e}")));
            }
        }
        StoreCmd::OpenMovie(id) => {
            return match store.open_movie(api, id) {
                Ok(()) => vec![StoreMsg::Movie(id, store.individual_movie.clone())],
                Err(e) => vec![StoreMsg::MovieError(id, format!("Could not load movie {id}: {e}"))],
            };
        }
    }
    out.push(StoreMsg::Catalog(store.view()));
    out
}
