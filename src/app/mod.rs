// src/app/mod.rs: TMDB catalog browser shell

// ---- Standard lib imports ----
use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

// ---- Crates ----
use eframe::egui as eg;
use tracing::{debug, info, warn};

// ---- Local modules ----
pub mod cache;
pub mod detail;
pub mod gfx;
pub mod prefetch;
pub mod prefs;
pub mod storage;
pub mod store;
pub mod tmdb;
pub mod types;
pub mod ui;
pub mod utils;
pub mod worker;

use crate::app::prefetch::WorkItem;
use crate::app::types::{CatalogView, IndividualMovie, PosterSlot, PrefetchDone, StoreCmd, StoreMsg};
use crate::app::utils::Debouncer;
use crate::config::{config, AppConfig};

// ---- Tunables ----
const MAX_STORE_MSGS_PER_FRAME: usize = 16;
pub(crate) const MAX_UPLOADS_PER_FRAME: usize = 6;

pub struct CinedexApp {
    cfg: AppConfig,

    // mirror of the store thread's state
    pub(crate) catalog: CatalogView,
    pub(crate) catalog_received: bool,
    /// Commands sent that still owe a `Catalog` answer.
    pub(crate) outstanding: usize,
    pub(crate) selected_id: Option<u64>,
    pub(crate) movie: Option<IndividualMovie>,
    pub(crate) movie_busy: bool,
    pub(crate) last_error: Option<String>,
    /// Set after a failed catalog fetch; scrolling stops paging until a retry.
    pub(crate) paging_stalled: bool,

    cmd_tx: Option<Sender<StoreCmd>>,
    msg_rx: Option<Receiver<StoreMsg>>,

    // search box
    pub(crate) search_input: String,
    pub(crate) search_debounce: Debouncer,

    // posters
    pub(crate) posters: HashMap<String, PosterSlot>,
    pub(crate) work_tx: Option<Sender<WorkItem>>,
    pub(crate) done_rx: Option<Receiver<PrefetchDone>>,

    // ui prefs
    pub(crate) poster_width_ui: f32,
    pub(crate) detail_panel_width: f32,
    pub(crate) prefs_dirty: bool,
    pub(crate) prefs_last_write: Instant,

    // one-time init guard
    did_init: bool,
}

impl Default for CinedexApp {
    fn default() -> Self {
        Self::with_config(config().clone())
    }
}

impl CinedexApp {
    pub fn with_config(cfg: AppConfig) -> Self {
        let defaults = prefs::UiPrefs::default();
        Self {
            search_debounce: Debouncer::new(Duration::from_millis(cfg.debounce_ms)),
            cfg,

            catalog: CatalogView::default(),
            catalog_received: false,
            outstanding: 0,
            selected_id: None,
            movie: None,
            movie_busy: false,
            last_error: None,
            paging_stalled: false,

            cmd_tx: None,
            msg_rx: None,

            search_input: String::new(),

            posters: HashMap::new(),
            work_tx: None,
            done_rx: None,

            poster_width_ui: defaults.poster_w,
            detail_panel_width: defaults.detail_w,
            prefs_dirty: false,
            prefs_last_write: Instant::now(),

            did_init: false,
        }
    }

    pub(crate) fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    fn init(&mut self) {
        self.did_init = true;
        self.load_prefs();

        let storage = storage::open_default_store();
        let api = tmdb::TmdbClient::new(&self.cfg);
        let (cmd_tx, msg_rx) = worker::spawn_store_worker(storage, api);
        self.cmd_tx = Some(cmd_tx);
        self.msg_rx = Some(msg_rx);

        self.start_poster_workers();
        self.send_cmd(StoreCmd::LoadGenres);
        info!("cache: {}", cache::cache_dir().display());
    }

    // ---- store thread plumbing ----
    pub(crate) fn send_cmd(&mut self, cmd: StoreCmd) {
        let expects_catalog = !matches!(cmd, StoreCmd::OpenMovie(_));
        // filter changes give paging a fresh start
        let resets_paging = matches!(
            cmd,
            StoreCmd::Search(_) | StoreCmd::ToggleGenre(_) | StoreCmd::ClearGenres
        );
        let Some(tx) = &self.cmd_tx else {
            return;
        };
        debug!("store cmd: {cmd:?}");
        if tx.send(cmd).is_err() {
            warn!("store thread is gone");
            self.last_error = Some("Catalog worker stopped; restart the app.".into());
            self.cmd_tx = None;
            return;
        }
        if expects_catalog {
            self.outstanding += 1;
        }
        if resets_paging {
            self.paging_stalled = false;
        }
    }

    pub(crate) fn catalog_busy(&self) -> bool {
        self.outstanding > 0
    }

    /// The scroll trigger: ask for one more page unless a request is
    /// already pending or the list is exhausted.
    pub(crate) fn request_next_page(&mut self) {
        if !self.catalog_received
            || self.catalog_busy()
            || self.paging_stalled
            || !self.catalog.has_more
        {
            return;
        }
        self.send_cmd(StoreCmd::LoadNextPage);
    }

    pub(crate) fn retry_paging(&mut self) {
        self.paging_stalled = false;
        self.last_error = None;
        self.request_next_page();
    }

    pub(crate) fn open_movie(&mut self, id: u64) {
        if self.selected_id == Some(id) && (self.movie.is_some() || self.movie_busy) {
            return;
        }
        self.selected_id = Some(id);
        self.movie = None;
        self.movie_busy = true;
        self.send_cmd(StoreCmd::OpenMovie(id));
    }

    pub(crate) fn close_movie(&mut self) {
        self.selected_id = None;
        self.movie = None;
        self.movie_busy = false;
    }

    fn poll_store(&mut self, ctx: &eg::Context) {
        let mut processed = 0usize;
        while processed < MAX_STORE_MSGS_PER_FRAME {
            let Some(rx) = &self.msg_rx else { break };
            let msg = match rx.try_recv() {
                Ok(msg) => msg,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.msg_rx = None;
                    break;
                }
            };
            processed += 1;

            match msg {
                StoreMsg::Catalog(view) => {
                    if self.catalog_received {
                        self.outstanding = self.outstanding.saturating_sub(1);
                    } else {
                        self.catalog_received = true;
                        self.search_input = view.search_query.clone();
                    }
                    self.catalog = view;
                }
                StoreMsg::Movie(id, movie) => {
                    if self.selected_id == Some(id) {
                        self.movie = Some(movie);
                        self.movie_busy = false;
                    }
                }
                StoreMsg::MovieError(id, e) => {
                    if self.selected_id == Some(id) {
                        self.movie_busy = false;
                    }
                    self.last_error = Some(e);
                }
                StoreMsg::ListError(e) => {
                    self.paging_stalled = true;
                    self.last_error = Some(e);
                }
                StoreMsg::Error(e) => {
                    self.last_error = Some(e);
                }
            }
        }
        if processed > 0 {
            ctx.request_repaint();
        }
    }

    /// Push the search text to the store once typing has paused.
    fn drive_search_debounce(&mut self, ctx: &eg::Context) {
        let now = Instant::now();
        if self.search_debounce.fire(now) {
            let query = self.search_input.trim().to_string();
            if query != self.catalog.search_query {
                self.send_cmd(StoreCmd::Search(query));
            }
        } else if let Some(left) = self.search_debounce.remaining(now) {
            ctx.request_repaint_after(left);
        }
    }
}

// ========== App impl ==========
impl eframe::App for CinedexApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        if !self.did_init {
            self.init();
        }

        self.poll_store(ctx);
        self.poll_posters(ctx);
        self.drive_search_debounce(ctx);

        eg::TopBottomPanel::top("topbar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.ui_render_topbar(ui);
            self.ui_render_genre_chips(ui);
            ui.add_space(4.0);
        });

        eg::TopBottomPanel::bottom("statusbar").show(ctx, |ui| {
            self.ui_render_status(ui);
        });

        if self.selected_id.is_some() {
            self.ui_render_detail_panel(ctx);
        }

        eg::CentralPanel::default().show(ctx, |ui| {
            self.ui_render_grid(ui, ctx);
        });

        // Keep polling while background work is pending
        if self.catalog_busy() || self.movie_busy || !self.catalog_received {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else if self
            .posters
            .values()
            .any(|p| p.state == types::PosterState::Pending)
        {
            ctx.request_repaint_after(Duration::from_millis(150));
        }

        self.maybe_save_prefs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    /// App wired to a local channel pair instead of the store thread.
    fn wired_app() -> (CinedexApp, Receiver<StoreCmd>, Sender<StoreMsg>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (msg_tx, msg_rx) = mpsc::channel();
        let mut app = CinedexApp::with_config(AppConfig::default());
        app.cmd_tx = Some(cmd_tx);
        app.msg_rx = Some(msg_rx);
        (app, cmd_rx, msg_tx)
    }

    fn sent(rx: &Receiver<StoreCmd>) -> Vec<StoreCmd> {
        rx.try_iter().collect()
    }

    #[test]
    fn initial_snapshot_does_not_settle_a_command() {
        let ctx = eg::Context::default();
        let (mut app, cmd_rx, msg_tx) = wired_app();

        app.send_cmd(StoreCmd::LoadGenres);
        assert_eq!(app.outstanding, 1);

        msg_tx.send(StoreMsg::Catalog(CatalogView::default())).unwrap();
        app.poll_store(&ctx);
        assert!(app.catalog_received);
        assert_eq!(app.outstanding, 1);

        msg_tx.send(StoreMsg::Catalog(CatalogView::default())).unwrap();
        app.poll_store(&ctx);
        assert_eq!(app.outstanding, 0);
        assert_eq!(sent(&cmd_rx), vec![StoreCmd::LoadGenres]);
    }

    #[test]
    fn opening_a_movie_does_not_block_paging() {
        let ctx = eg::Context::default();
        let (mut app, cmd_rx, msg_tx) = wired_app();
        msg_tx.send(StoreMsg::Catalog(CatalogView::default())).unwrap();
        app.poll_store(&ctx);

        app.open_movie(550);
        assert_eq!(app.outstanding, 0);
        assert!(app.movie_busy);

        app.request_next_page();
        assert_eq!(sent(&cmd_rx), vec![StoreCmd::OpenMovie(550), StoreCmd::LoadNextPage]);

        msg_tx.send(StoreMsg::Movie(550, IndividualMovie::default())).unwrap();
        app.poll_store(&ctx);
        assert!(!app.movie_busy);
        assert!(app.movie.is_some());
    }

    #[test]
    fn next_page_waits_for_snapshot_and_in_flight_fetch() {
        let ctx = eg::Context::default();
        let (mut app, cmd_rx, msg_tx) = wired_app();

        // nothing before the first snapshot
        app.request_next_page();
        assert!(sent(&cmd_rx).is_empty());

        msg_tx.send(StoreMsg::Catalog(CatalogView::default())).unwrap();
        app.poll_store(&ctx);

        app.request_next_page();
        app.request_next_page();
        assert_eq!(sent(&cmd_rx), vec![StoreCmd::LoadNextPage]);

        // answered; the list is exhausted now
        let done = CatalogView {
            page: 2,
            has_more: false,
            ..CatalogView::default()
        };
        msg_tx.send(StoreMsg::Catalog(done)).unwrap();
        app.poll_store(&ctx);
        assert!(!app.catalog_busy());

        app.request_next_page();
        assert!(sent(&cmd_rx).is_empty());
    }

    #[test]
    fn genre_failure_does_not_stall_paging() {
        let ctx = eg::Context::default();
        let (mut app, cmd_rx, msg_tx) = wired_app();
        app.send_cmd(StoreCmd::LoadGenres);

        msg_tx.send(StoreMsg::Catalog(CatalogView::default())).unwrap();
        msg_tx
            .send(StoreMsg::Error("Could not load genres: HTTP 503".into()))
            .unwrap();
        msg_tx.send(StoreMsg::Catalog(CatalogView::default())).unwrap();
        app.poll_store(&ctx);

        assert!(!app.paging_stalled);
        assert!(app.last_error.is_some());
        app.request_next_page();
        assert_eq!(sent(&cmd_rx), vec![StoreCmd::LoadGenres, StoreCmd::LoadNextPage]);
    }

    #[test]
    fn list_failure_stalls_until_retry_or_new_search() {
        let ctx = eg::Context::default();
        let (mut app, cmd_rx, msg_tx) = wired_app();
        msg_tx.send(StoreMsg::Catalog(CatalogView::default())).unwrap();
        app.poll_store(&ctx);

        app.request_next_page();
        msg_tx
            .send(StoreMsg::ListError("Could not load movies: HTTP 503".into()))
            .unwrap();
        msg_tx.send(StoreMsg::Catalog(CatalogView::default())).unwrap();
        app.poll_store(&ctx);
        assert!(app.paging_stalled);
        assert_eq!(sent(&cmd_rx), vec![StoreCmd::LoadNextPage]);

        app.request_next_page();
        assert!(sent(&cmd_rx).is_empty());

        app.retry_paging();
        assert!(app.last_error.is_none());
        assert_eq!(sent(&cmd_rx), vec![StoreCmd::LoadNextPage]);

        // a new search also clears the stall
        app.paging_stalled = true;
        app.send_cmd(StoreCmd::Search("alien".into()));
        assert!(!app.paging_stalled);
    }
}
