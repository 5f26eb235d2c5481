// src/app/ui/topbar.rs
use std::time::Instant;

use eframe::egui as eg;

use crate::app::prefs::POSTER_W_RANGE;
use crate::app::types::StoreCmd;

impl crate::app::CinedexApp {
    // ---------- TOP BAR ----------
    pub(crate) fn ui_render_topbar(&mut self, ui: &mut eg::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Cinedex");
            ui.separator();

            // Search (debounced; the store only sees the text once typing pauses)
            let resp = ui.add(
                eg::TextEdit::singleline(&mut self.search_input)
                    .hint_text("Search titles…")
                    .desired_width(220.0),
            );
            if resp.changed() {
                self.search_debounce.touch(Instant::now());
            }
            if self.search_debounce.is_pending() {
                ui.add(eg::Spinner::new().size(12.0));
            }
            if !self.search_input.is_empty()
                && ui
                    .small_button("✕")
                    .on_hover_text("Back to popular movies")
                    .clicked()
            {
                self.search_input.clear();
                self.search_debounce.touch(Instant::now());
            }

            ui.separator();

            // Poster size
            ui.label("Poster:");
            if ui
                .add(eg::Slider::new(&mut self.poster_width_ui, POSTER_W_RANGE).suffix(" px"))
                .changed()
            {
                self.mark_dirty();
            }
        });
    }

    // ---------- GENRE CHIPS ----------
    /// Genres present in the loaded results; a movie must carry every
    /// selected genre to stay in the grid.
    pub(crate) fn ui_render_genre_chips(&mut self, ui: &mut eg::Ui) {
        if self.catalog.genres.is_empty() {
            return;
        }

        let mut toggled: Option<u32> = None;
        let mut clear = false;

        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            ui.label(eg::RichText::new("Genres:").strong());
            for genre in &self.catalog.genres {
                let selected = self.catalog.selected_genres.contains(&genre.id);
                if ui.selectable_label(selected, &genre.name).clicked() {
                    toggled = Some(genre.id);
                }
            }

            if !self.catalog.selected_genres.is_empty()
                && ui
                    .small_button("Clear genres")
                    .on_hover_text("Show movies of every genre")
                    .clicked()
            {
                clear = true;
            }
        });

        if let Some(id) = toggled {
            self.send_cmd(StoreCmd::ToggleGenre(id));
        } else if clear {
            self.send_cmd(StoreCmd::ClearGenres);
        }
    }
}
