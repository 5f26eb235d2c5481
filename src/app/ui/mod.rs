// src/app/ui/mod.rs
pub mod grid;
pub mod topbar;

use eframe::egui as eg;

use crate::app::types::CatalogView;

/// "Popular  •  40 shown  •  2 of 500 pages loaded"
pub(crate) fn status_line(view: &CatalogView) -> String {
    let source = if view.search_query.is_empty() {
        "Popular".to_string()
    } else {
        format!("Search \u{201c}{}\u{201d}", view.search_query)
    };
    let shown = view.movies.len();
    let loaded = view.page.saturating_sub(1);
    let pages = if loaded == 0 {
        "no pages loaded".to_string()
    } else {
        format!("{loaded} of {} pages loaded", view.total_pages.max(loaded))
    };
    format!("{source}  •  {shown} shown  •  {pages}")
}

impl crate::app::CinedexApp {
    pub(crate) fn ui_render_status(&mut self, ui: &mut eg::Ui) {
        ui.horizontal(|ui| {
            if self.catalog_busy() || self.movie_busy {
                ui.add(eg::Spinner::new().size(12.0));
            }

            ui.label(status_line(&self.catalog));

            if !self.catalog.selected_genres.is_empty() {
                ui.label(
                    eg::RichText::new(format!(
                        "({} genre filter{})",
                        self.catalog.selected_genres.len(),
                        if self.catalog.selected_genres.len() == 1 { "" } else { "s" }
                    ))
                    .weak(),
                );
            }

            if let Some(err) = self.last_error.clone() {
                ui.separator();
                ui.colored_label(eg::Color32::from_rgb(230, 110, 110), err);
                if self.paging_stalled {
                    if ui.small_button("Retry").clicked() {
                        self.retry_paging();
                    }
                } else if ui.small_button("Dismiss").clicked() {
                    self.last_error = None;
                }
            }
        });
    }

    pub(crate) fn ui_render_empty_state(&self, ui: &mut eg::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(48.0);
            if !self.catalog_received || self.catalog_busy() {
                ui.heading("Loading movies…");
                ui.add(eg::Spinner::new().size(18.0));
            } else if self.cfg().api_token.is_none() {
                ui.heading("No TMDB token configured");
                ui.label("Set TMDB_API_KEY or add \"api_token\" to config.json, then restart.");
            } else if !self.catalog.search_query.is_empty() {
                ui.heading("No matches");
                ui.label(format!(
                    "Nothing found for \u{201c}{}\u{201d}.",
                    self.catalog.search_query
                ));
            } else if !self.catalog.selected_genres.is_empty() {
                ui.heading("No movies match every selected genre");
                ui.label("Deselect a genre or clear the filter.");
            } else {
                ui.heading("No movies yet");
            }
            ui.add_space(8.0);
            ui.monospace(format!(
                "Cache: {}",
                crate::app::cache::cache_dir().display()
            ));
        });
    }
}
