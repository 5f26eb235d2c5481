// src/app/utils.rs
use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use std::time::{Duration, Instant};

use crate::app::types::Genre;

/// `<image_base>/<size><path>`; TMDB paths already start with '/'.
pub(crate) fn image_url(base: &str, size: &str, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    format!("{}/{}{}", base.trim_end_matches('/'), size, path)
}

pub(crate) fn youtube_url(key: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", urlencoding::encode(key))
}

fn parse_release_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub(crate) fn release_year(s: &str) -> Option<i32> {
    parse_release_date(s).map(|d| d.year())
}

/// "2023-07-19" -> "Jul 19, 2023"
pub(crate) fn format_release_date(s: &str) -> Option<String> {
    parse_release_date(s).map(|d| d.format("%b %-d, %Y").to_string())
}

pub(crate) fn title_line(title: &str, release_date: &str) -> String {
    match release_year(release_date) {
        Some(y) => format!("{title} ({y})"),
        None => title.to_string(),
    }
}

pub(crate) fn format_runtime(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Whole dollars with thousands separators; TMDB reports 0 for "unknown".
pub(crate) fn format_money(amount: u64) -> String {
    if amount == 0 {
        return "—".into();
    }
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub(crate) fn format_rating(vote_average: f32) -> String {
    format!("★ {:.1}", vote_average)
}

pub(crate) fn genre_names(genres: &[Genre]) -> String {
    genres.iter().map(|g| g.name.as_str()).join(", ")
}

/// True when the viewport bottom is within `margin` of the content end.
/// Content shorter than the viewport counts as "at the bottom" so a short
/// first page keeps pulling until the screen is filled.
pub(crate) fn near_bottom(offset_y: f32, viewport_h: f32, content_h: f32, margin: f32) -> bool {
    if content_h <= viewport_h {
        return true;
    }
    offset_y + viewport_h >= content_h - margin
}

/// Fires once, `wait` after the last `touch`.
#[derive(Debug)]
pub(crate) struct Debouncer {
    wait: Duration,
    last_touch: Option<Instant>,
}

impl Debouncer {
    pub(crate) fn new(wait: Duration) -> Self {
        Self {
            wait,
            last_touch: None,
        }
    }

    pub(crate) fn touch(&mut self, now: Instant) {
        self.last_touch = Some(now);
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.last_touch.is_some()
    }

    /// Time left until the pending call fires.
    pub(crate) fn remaining(&self, now: Instant) -> Option<Duration> {
        self.last_touch
            .map(|t| self.wait.saturating_sub(now.saturating_duration_since(t)))
    }

    pub(crate) fn fire(&mut self, now: Instant) -> bool {
        match self.last_touch {
            Some(t) if now.saturating_duration_since(t) >= self.wait => {
                self.last_touch = None;
                true
            }
            _ => false,
        }
    }
}
