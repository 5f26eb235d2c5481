// src/app/prefs.rs
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::warn;

pub(crate) const POSTER_W_RANGE: std::ops::RangeInclusive<f32> = 120.0..=220.0;
pub(crate) const DETAIL_W_RANGE: std::ops::RangeInclusive<f32> = 300.0..=640.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct UiPrefs {
    pub poster_w: f32,
    pub detail_w: f32,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            poster_w: 160.0,
            detail_w: 380.0,
        }
    }
}

impl UiPrefs {
    pub(crate) fn parse(txt: &str) -> Self {
        let mut prefs = Self::default();
        for line in txt.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((k, v)) = line.split_once('=') else {
                continue;
            };
            match k.trim() {
                "poster_w" => {
                    if let Ok(n) = v.trim().parse::<f32>() {
                        prefs.poster_w = n.clamp(*POSTER_W_RANGE.start(), *POSTER_W_RANGE.end());
                    }
                }
                "detail_w" => {
                    if let Ok(n) = v.trim().parse::<f32>() {
                        prefs.detail_w = n.clamp(*DETAIL_W_RANGE.start(), *DETAIL_W_RANGE.end());
                    }
                }
                _ => {}
            }
        }
        prefs
    }

    pub(crate) fn render(&self) -> String {
        format!(
            "# cinedex ui prefs\n\
             poster_w={:.1}\n\
             detail_w={:.1}\n",
            self.poster_w, self.detail_w,
        )
    }
}

impl crate::app::CinedexApp {
    // ---- tiny flags ----
    pub(crate) fn mark_dirty(&mut self) {
        self.prefs_dirty = true;
    }

    pub(crate) fn maybe_save_prefs(&mut self) {
        // debounce a bit to avoid writing every frame
        if self.prefs_dirty && self.prefs_last_write.elapsed() >= Duration::from_millis(300) {
            self.save_prefs();
            self.prefs_dirty = false;
            self.prefs_last_write = Instant::now();
        }
    }

    pub(crate) fn load_prefs(&mut self) {
        let Ok(txt) = fs::read_to_string(prefs_path()) else {
            return;
        };
        let prefs = UiPrefs::parse(&txt);
        self.poster_width_ui = prefs.poster_w;
        self.detail_panel_width = prefs.detail_w;
    }

    pub(crate) fn save_prefs(&self) {
        let prefs = UiPrefs {
            poster_w: self.poster_width_ui,
            detail_w: self.detail_panel_width,
        };
        if let Err(e) = fs::write(prefs_path(), prefs.render()) {
            warn!("failed to save ui prefs: {e}");
        }
    }
}

pub fn prefs_path() -> PathBuf {
    crate::app::cache::cache_dir().join("ui_prefs.txt")
}

#[cfg(test)]
mod tests {
    use super::UiPrefs;

    #[test]
    fn parse_clamps_and_ignores_junk() {
        let prefs = UiPrefs::parse("# comment\nposter_w=999\ndetail_w = 420\nworkers=8\nnonsense\n");
        assert_eq!(prefs.poster_w, 220.0);
        assert_eq!(prefs.detail_w, 420.0);
    }

    #[test]
    fn render_then_parse_keeps_values() {
        let prefs = UiPrefs {
            poster_w: 180.0,
            detail_w: 500.0,
        };
        assert_eq!(UiPrefs::parse(&prefs.render()), prefs);
    }
}
