// src/app/detail.rs
use eframe::egui as eg;
use egui_extras::{Column, TableBuilder};
use itertools::Itertools;

use crate::app::prefs::DETAIL_W_RANGE;
use crate::app::types::IndividualMovie;
use crate::app::utils::{
    format_money, format_rating, format_release_date, format_runtime, genre_names, image_url,
    title_line, youtube_url,
};

const CAST_ROW_H: f32 = 64.0;
const CAST_THUMB_W: f32 = 40.0;
const MAX_CAST_ROWS: usize = 20;

impl crate::app::CinedexApp {
    pub(crate) fn ui_render_detail_panel(&mut self, ctx: &eg::Context) {
        // Snap panel width to poster "column steps"
        let screen_w: f32 = ctx.input(|i| i.screen_rect().width());
        let step: f32 = (self.poster_width_ui + crate::app::ui::grid::H_SPACING).max(1.0);
        let min_w = *DETAIL_W_RANGE.start();
        let max_w: f32 = (screen_w * 0.5).clamp(min_w, *DETAIL_W_RANGE.end());
        let snapped_max: f32 = ((max_w / step).floor() * step).max(min_w);

        let snapped_default: f32 =
            ((self.detail_panel_width / step).round() * step).clamp(min_w, snapped_max);

        let panel = eg::SidePanel::right("detail_panel")
            .resizable(true)
            .default_width(snapped_default)
            .min_width(min_w)
            .max_width(snapped_max)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.heading("Details");
                    ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            self.close_movie();
                        }
                    });
                });
                ui.separator();

                if self.movie_busy {
                    ui.vertical_centered(|ui| {
                        ui.add_space(24.0);
                        ui.add(eg::Spinner::new().size(18.0));
                        ui.label("Loading movie…");
                    });
                    return;
                }
                let Some(movie) = self.movie.clone() else {
                    ui.label("Could not load this movie.");
                    return;
                };

                eg::ScrollArea::vertical()
                    .id_source("detail_scroll")
                    .auto_shrink([false; 2])
                    .show(ui, |ui| self.ui_render_movie(ui, ctx, &movie));
            });

        // Persist the (snapped) width so it sticks between runs
        let actual_w = panel.response.rect.width();
        let snapped_new = ((actual_w / step).round() * step).clamp(min_w, snapped_max);
        if (snapped_new - self.detail_panel_width).abs() > 0.5 {
            self.detail_panel_width = snapped_new;
            self.mark_dirty();
        }
    }

    fn ui_render_movie(&mut self, ui: &mut eg::Ui, ctx: &eg::Context, movie: &IndividualMovie) {
        let Some(d) = &movie.detail else {
            ui.label("No details available.");
            return;
        };

        // Poster
        ui.add_space(4.0);
        let avail_w = ui.available_width().clamp(120.0, 320.0);
        let poster_size = eg::vec2(avail_w, avail_w * 1.5);
        let tex = d.poster_path.as_deref().and_then(|p| {
            let url = image_url(&self.cfg().image_base_url, &self.cfg().poster_size, p);
            let key = self.request_poster(&url);
            self.try_lazy_upload(ctx, &key);
            self.poster_texture(&key).cloned()
        });
        ui.vertical_centered(|ui| {
            if let Some(tex) = tex {
                ui.image((tex.id(), poster_size));
            } else {
                let (rect, _resp) = ui.allocate_exact_size(poster_size, eg::Sense::hover());
                ui.painter().rect_filled(rect, 8.0, eg::Color32::from_gray(40));
                ui.painter().text(
                    rect.center(),
                    eg::Align2::CENTER_CENTER,
                    if d.poster_path.is_some() {
                        "Poster loading…"
                    } else {
                        "No poster"
                    },
                    eg::FontId::proportional(14.0),
                    eg::Color32::WHITE,
                );
            }
        });

        ui.add_space(8.0);
        ui.heading(title_line(&d.title, &d.release_date));
        if let Some(tagline) = d.tagline.as_deref().filter(|t| !t.trim().is_empty()) {
            ui.label(eg::RichText::new(tagline).italics().weak());
        }

        // Date • runtime • rating
        let facts = [
            format_release_date(&d.release_date),
            d.runtime.filter(|m| *m > 0).map(format_runtime),
            Some(format_rating(d.vote_average)),
        ];
        ui.label(eg::RichText::new(facts.into_iter().flatten().join("  •  ")).weak());

        ui.add_space(8.0);
        ui.separator();

        eg::Grid::new("detail_facts")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                let row = |ui: &mut eg::Ui, k: &str, v: String| {
                    ui.label(eg::RichText::new(k).strong());
                    ui.add(eg::Label::new(if v.is_empty() { "—".into() } else { v }).wrap());
                    ui.end_row();
                };
                row(ui, "Genres", genre_names(&d.genres));
                row(ui, "Budget", format_money(d.budget));
                row(ui, "Revenue", format_money(d.revenue));
                row(
                    ui,
                    "Studios",
                    d.production_companies.iter().map(|c| c.name.as_str()).join(", "),
                );
                row(
                    ui,
                    "Languages",
                    d.spoken_languages
                        .iter()
                        .map(|l| {
                            if l.english_name.is_empty() {
                                l.name.as_str()
                            } else {
                                l.english_name.as_str()
                            }
                        })
                        .join(", "),
                );
            });

        if !d.overview.trim().is_empty() {
            ui.add_space(8.0);
            ui.label(eg::RichText::new("Overview").strong());
            ui.add(eg::Label::new(&d.overview).wrap());
        }

        if !movie.trailers.is_empty() {
            ui.add_space(8.0);
            ui.label(eg::RichText::new("Trailers").strong());
            for t in &movie.trailers {
                let name = if t.name.is_empty() { "Trailer" } else { t.name.as_str() };
                ui.hyperlink_to(format!("▶ {name}"), youtube_url(&t.key));
            }
        }

        if !movie.cast.is_empty() {
            ui.add_space(8.0);
            ui.label(eg::RichText::new("Cast").strong());
            self.ui_render_cast_table(ui, ctx, movie);
        }
        ui.add_space(12.0);
    }

    fn ui_render_cast_table(&mut self, ui: &mut eg::Ui, ctx: &eg::Context, movie: &IndividualMovie) {
        let base = self.cfg().image_base_url.clone();
        let size = self.cfg().profile_size.clone();

        let rows: Vec<_> = movie
            .cast
            .iter()
            .take(MAX_CAST_ROWS)
            .map(|c| {
                let tex = c.profile_path.as_deref().and_then(|p| {
                    let key = self.request_poster(&image_url(&base, &size, p));
                    self.try_lazy_upload(ctx, &key);
                    self.poster_texture(&key).cloned()
                });
                (c, tex)
            })
            .collect();

        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(eg::Layout::left_to_right(eg::Align::Center))
            .column(Column::exact(CAST_THUMB_W))
            .column(Column::remainder().at_least(100.0).clip(true))
            .header(18.0, |mut header| {
                header.col(|_ui| {});
                header.col(|ui| {
                    ui.strong("Actor / Role");
                });
            })
            .body(|mut body| {
                for (c, tex) in rows {
                    body.row(CAST_ROW_H, |mut row| {
                        row.col(|ui| {
                            let thumb = eg::vec2(CAST_THUMB_W, CAST_THUMB_W * 1.5);
                            match &tex {
                                Some(tex) => {
                                    ui.image((tex.id(), thumb));
                                }
                                None => {
                                    let (rect, _) = ui.allocate_exact_size(thumb, eg::Sense::hover());
                                    ui.painter().rect_filled(rect, 4.0, eg::Color32::from_gray(40));
                                }
                            }
                        });
                        row.col(|ui| {
                            ui.vertical(|ui| {
                                ui.label(&c.name);
                                if !c.character.is_empty() {
                                    ui.label(eg::RichText::new(&c.character).weak());
                                }
                            });
                        });
                    });
                }
            });
    }
}
