// src/app/ui/grid.rs
use eframe::egui as eg;

use crate::app::utils::{format_rating, image_url, near_bottom, title_line};

pub const H_SPACING: f32 = 4.0;
pub const V_SPACING: f32 = 10.0;

/// Start the next page this far (px) before the end of the list.
const LOAD_MORE_MARGIN: f32 = 400.0;

struct Card {
    id: u64,
    label: String,
    rating: String,
    poster_key: Option<String>,
}

fn draw_rating_badge(p: &eg::Painter, rect: eg::Rect, label: &str) {
    let pad = 6.0;
    let r = eg::Rect::from_min_size(
        eg::pos2(rect.left() + pad, rect.top() + pad),
        eg::vec2(52.0, 20.0),
    );

    let visuals = p.ctx().style().visuals.clone();
    let bg = visuals.extreme_bg_color.gamma_multiply(0.92);
    let fg = visuals.strong_text_color();

    p.rect_filled(r, eg::Rounding::same(6.0), bg);
    p.text(
        r.center(),
        eg::Align2::CENTER_CENTER,
        label,
        eg::FontId::monospace(12.0),
        fg,
    );
}

impl crate::app::CinedexApp {
    fn build_cards(&mut self) -> Vec<Card> {
        let base = self.cfg().image_base_url.clone();
        let size = self.cfg().poster_size.clone();
        let movies = self.catalog.movies.clone();

        movies
            .into_iter()
            .map(|m| {
                let poster_key = m
                    .poster_path
                    .as_deref()
                    .map(|p| self.request_poster(&image_url(&base, &size, p)));
                Card {
                    id: m.id,
                    label: title_line(&m.title, &m.release_date),
                    rating: format_rating(m.vote_average),
                    poster_key,
                }
            })
            .collect()
    }

    pub(crate) fn ui_render_grid(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        if self.catalog.movies.is_empty() {
            // nothing to scroll yet: keep pulling until something shows or the list ends
            self.request_next_page();
            self.ui_render_empty_state(ui);
            return;
        }

        let cards = self.build_cards();

        let card_w: f32 = self.poster_width_ui;
        let text_h: f32 = 40.0;
        let card_h: f32 = card_w * 1.5 + text_h;

        let mut uploads_left = crate::app::MAX_UPLOADS_PER_FRAME;
        let mut clicked: Option<u64> = None;

        let out = eg::ScrollArea::vertical()
            .id_source("movie_grid")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let avail = ui.available_width();
                let cols = ((avail + H_SPACING) / (card_w + H_SPACING))
                    .floor()
                    .max(1.0) as usize;

                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing = eg::vec2(H_SPACING, V_SPACING);

                    for (col, card) in cards.iter().enumerate() {
                        if col > 0 && col % cols == 0 {
                            ui.end_row();
                        }

                        ui.allocate_ui_with_layout(
                            eg::vec2(card_w, card_h),
                            eg::Layout::top_down(eg::Align::Min),
                            |ui| {
                                ui.set_min_size(eg::vec2(card_w, card_h));
                                let rect = ui.max_rect();

                                let id = eg::Id::new(("movie_card", card.id));
                                let resp = ui
                                    .interact(rect, id, eg::Sense::click())
                                    .on_hover_cursor(eg::CursorIcon::PointingHand);
                                if resp.clicked() {
                                    clicked = Some(card.id);
                                }

                                if let Some(key) = &card.poster_key {
                                    if uploads_left > 0 && self.try_lazy_upload(ctx, key) {
                                        uploads_left -= 1;
                                    }
                                }

                                let poster_rect = eg::Rect::from_min_max(
                                    rect.min,
                                    eg::pos2(rect.min.x + card_w, rect.min.y + card_w * 1.5),
                                );
                                let text_rect = eg::Rect::from_min_max(
                                    eg::pos2(rect.min.x, poster_rect.max.y),
                                    rect.max,
                                );

                                let tex = card.poster_key.as_deref().and_then(|k| self.poster_texture(k));
                                if let Some(tex) = tex {
                                    ui.painter().image(
                                        tex.id(),
                                        poster_rect,
                                        eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
                                        eg::Color32::WHITE,
                                    );
                                } else {
                                    ui.painter().rect_filled(
                                        poster_rect,
                                        6.0,
                                        eg::Color32::from_gray(40),
                                    );
                                    if card.poster_key.is_none() {
                                        ui.painter().text(
                                            poster_rect.center(),
                                            eg::Align2::CENTER_CENTER,
                                            "No poster",
                                            eg::FontId::proportional(13.0),
                                            eg::Color32::GRAY,
                                        );
                                    }
                                }

                                draw_rating_badge(ui.painter(), poster_rect, &card.rating);

                                ui.allocate_ui_at_rect(text_rect, |ui| {
                                    ui.add(
                                        eg::Label::new(eg::RichText::new(&card.label).size(14.0))
                                            .wrap(),
                                    );
                                });

                                if self.selected_id == Some(card.id) {
                                    ui.painter().rect_stroke(
                                        rect.shrink(1.0),
                                        6.0,
                                        eg::Stroke::new(2.0, eg::Color32::YELLOW),
                                    );
                                } else if resp.hovered() {
                                    ui.painter().rect_stroke(
                                        rect.shrink(1.0),
                                        6.0,
                                        eg::Stroke::new(1.0, eg::Color32::from_gray(160)),
                                    );
                                }
                            },
                        );
                    }

                    ui.end_row();
                });

                if self.catalog_busy() {
                    ui.add_space(8.0);
                    ui.vertical_centered(|ui| {
                        ui.add(eg::Spinner::new().size(18.0));
                    });
                } else if !self.catalog.has_more {
                    ui.add_space(8.0);
                    ui.vertical_centered(|ui| {
                        ui.label(eg::RichText::new("End of results").weak());
                    });
                }
                ui.add_space(12.0);
            });

        if let Some(id) = clicked {
            self.open_movie(id);
        }

        let offset_y = out.state.offset.y;
        let viewport_h = out.inner_rect.height();
        let content_h = out.content_size.y;
        if near_bottom(offset_y, viewport_h, content_h, LOAD_MORE_MARGIN) {
            self.request_next_page();
        }
    }
}
