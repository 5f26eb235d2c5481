// src/app/prefetch.rs
use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eframe::egui as eg;
use tracing::{debug, warn};

use crate::app::cache::{download_and_store_resized_with_client, find_cached, url_to_cache_key};
use crate::app::types::{PosterSlot, PosterState, PrefetchDone};

const WORKER_COUNT: usize = 8;
const RESIZE_MAX_W: u32 = 320;
const RESIZE_QUALITY: u8 = 80;
const MAX_DONE_PER_FRAME: usize = 16;

/// (cache key, url)
pub(crate) type WorkItem = (String, String);

impl crate::app::CinedexApp {
    /// Start the download pool. Workers share one reqwest client.
    pub(crate) fn start_poster_workers(&mut self) {
        if self.work_tx.is_some() {
            return;
        }

        let client = match reqwest::blocking::Client::builder()
            .user_agent("cinedex/posters")
            .timeout(Duration::from_secs(20))
            .pool_max_idle_per_host(WORKER_COUNT)
            .default_headers({
                use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
                let mut h = HeaderMap::new();
                h.insert(
                    ACCEPT,
                    HeaderValue::from_static("image/avif,image/webp,image/*;q=0.8,*/*;q=0.5"),
                );
                h
            })
            .build()
        {
            Ok(c) => Arc::new(c),
            Err(e) => {
                warn!("poster http client build failed: {e}");
                self.last_error = Some(format!("Posters unavailable: {e}"));
                return;
            }
        };

        let (work_tx, work_rx) = mpsc::channel::<WorkItem>();
        let (done_tx, done_rx) = mpsc::channel::<PrefetchDone>();
        self.work_tx = Some(work_tx);
        self.done_rx = Some(done_rx);

        let work_rx = Arc::new(Mutex::new(work_rx));
        for _ in 0..WORKER_COUNT {
            let work_rx = Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let client = Arc::clone(&client);

            std::thread::spawn(move || loop {
                let job = {
                    let Ok(rx) = work_rx.lock() else { break };
                    rx.recv()
                };
                let Ok((key, url)) = job else { break };

                let result = download_and_store_resized_with_client(
                    &client,
                    &url,
                    &key,
                    RESIZE_MAX_W,
                    RESIZE_QUALITY,
                );
                if done_tx.send(PrefetchDone { key, result }).is_err() {
                    break;
                }
            });
        }
    }

    /// Make sure the image at `url` is cached; returns its key.
    /// Files already on disk skip the pool entirely.
    pub(crate) fn request_poster(&mut self, url: &str) -> String {
        let key = url_to_cache_key(url);
        if self.posters.contains_key(&key) {
            return key;
        }

        let slot = match find_cached(&key) {
            Some(path) => PosterSlot {
                path: Some(path),
                tex: None,
                state: PosterState::Cached,
            },
            None => {
                let queued = self
                    .work_tx
                    .as_ref()
                    .is_some_and(|tx| tx.send((key.clone(), url.to_string())).is_ok());
                PosterSlot {
                    path: None,
                    tex: None,
                    state: if queued {
                        PosterState::Pending
                    } else {
                        PosterState::Failed
                    },
                }
            }
        };
        self.posters.insert(key.clone(), slot);
        key
    }

    /// Drain finished downloads (bounded per frame).
    pub(crate) fn poll_posters(&mut self, ctx: &eg::Context) {
        let mut drained = 0usize;
        while drained < MAX_DONE_PER_FRAME {
            let Some(rx) = &self.done_rx else { break };
            match rx.try_recv() {
                Ok(msg) => {
                    drained += 1;
                    let Some(slot) = self.posters.get_mut(&msg.key) else {
                        continue;
                    };
                    match msg.result {
                        Ok(path) => {
                            slot.path = Some(path);
                            slot.state = PosterState::Cached;
                        }
                        Err(e) => {
                            debug!("poster {} failed: {e}", msg.key);
                            slot.state = PosterState::Failed;
                        }
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.done_rx = None;
                    break;
                }
            }
        }
        if drained > 0 {
            ctx.request_repaint();
        }
    }

    /// Upload a cached file to the GPU. Returns true if a texture was
    /// uploaded this call.
    pub(crate) fn try_lazy_upload(&mut self, ctx: &eg::Context, key: &str) -> bool {
        let Some(slot) = self.posters.get_mut(key) else {
            return false;
        };
        if slot.tex.is_some() || slot.state != PosterState::Cached {
            return false;
        }
        let Some(path) = slot.path.as_ref() else {
            return false;
        };
        match crate::app::gfx::load_texture_from_path(ctx, path, key) {
            Ok(tex) => {
                slot.tex = Some(tex);
                slot.state = PosterState::Ready;
                true
            }
            Err(e) => {
                debug!("poster {key} unusable: {e}");
                slot.state = PosterState::Failed;
                false
            }
        }
    }

    pub(crate) fn poster_texture(&self, key: &str) -> Option<&eg::TextureHandle> {
        self.posters.get(key).and_then(|s| s.tex.as_ref())
    }
}
