//! Text toggle button.

use egui::{Align2, Color32, CornerRadius, CursorIcon, Rect, Sense, Ui, vec2};

use crate::{sizing, theme};

/// A toggle button with text label.
/// Uses solid accent background when selected.
pub struct ToggleButton<'a> {
    label: &'a str,
    selected: bool,
    height: f32,
    font_size: f32,
}

impl<'a> ToggleButton<'a> {
    /// Create a new toggle button.
    pub fn new(label: &'a str, selected: bool) -> Self {
        Self {
            label,
            selected,
            height: sizing::SWATCH,
            font_size: 14.0,
        }
    }

    /// Show the button and return (clicked, rect).
    pub fn show(self, ui: &mut Ui) -> (bool, Rect) {
        let font_id = egui::FontId::proportional(self.font_size);
        let galley =
            ui.painter()
                .layout_no_wrap(self.label.to_string(), font_id.clone(), Color32::PLACEHOLDER);
        let text_width = galley.size().x;
        let width = self.height.max(text_width + 12.0);

        let (rect, response) = ui.allocate_exact_size(vec2(width, self.height), Sense::click());

        if ui.is_rect_visible(rect) {
            let bg_color = if self.selected {
                theme::ACCENT
            } else if response.hovered() {
                theme::HOVER_BG
            } else {
                theme::BUTTON_BG
            };
            let text_color = if self.selected {
                Color32::WHITE
            } else {
                theme::TEXT
            };

            ui.painter()
                .rect_filled(rect, CornerRadius::same(sizing::CORNER_RADIUS), bg_color);
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                self.label,
                font_id,
                text_color,
            );
        }

        let clicked = response.clicked();
        response.on_hover_cursor(CursorIcon::PointingHand);
        (clicked, rect)
    }
}
