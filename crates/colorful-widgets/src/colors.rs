//! Color swatches used as the picker's toggle affordance.

use egui::{
    Color32, CornerRadius, CursorIcon, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, Vec2, vec2,
};

use crate::{sizing, theme};

/// A clickable color swatch.
///
/// Translucent colors are painted over a checkerboard so the alpha is
/// visible.
pub struct ColorSwatch<'a> {
    color: Color32,
    tooltip: &'a str,
    selected: bool,
    size: Vec2,
}

impl<'a> ColorSwatch<'a> {
    /// Create a new color swatch.
    pub fn new(color: Color32, tooltip: &'a str) -> Self {
        Self {
            color,
            tooltip,
            selected: false,
            size: vec2(sizing::SWATCH, sizing::SWATCH),
        }
    }

    /// Set whether this swatch is selected.
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Show the swatch and return (clicked, rect).
    pub fn show(self, ui: &mut Ui) -> (bool, Rect) {
        let (rect, response) = ui.allocate_exact_size(self.size, Sense::click());

        if ui.is_rect_visible(rect) {
            if !self.color.is_opaque() {
                paint_checkers(ui, rect);
            }

            let corner_radius = CornerRadius::same(sizing::CORNER_RADIUS);
            ui.painter().rect_filled(rect, corner_radius, self.color);

            let stroke = if self.selected {
                Stroke::new(2.0, theme::ACCENT)
            } else {
                Stroke::new(1.0, theme::BORDER)
            };
            ui.painter()
                .rect_stroke(rect, corner_radius, stroke, StrokeKind::Inside);
        }

        let clicked = response.clicked();
        response
            .on_hover_text(self.tooltip)
            .on_hover_cursor(CursorIcon::PointingHand);
        (clicked, rect)
    }
}

/// A swatch for a value that cannot be painted (white with red diagonal).
pub struct NoColorSwatch<'a> {
    tooltip: &'a str,
    selected: bool,
    size: Vec2,
}

impl<'a> NoColorSwatch<'a> {
    /// Create a new "no color" swatch.
    pub fn new(tooltip: &'a str) -> Self {
        Self {
            tooltip,
            selected: false,
            size: vec2(sizing::SWATCH, sizing::SWATCH),
        }
    }

    /// Set whether this swatch is selected.
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Show the swatch and return (clicked, rect).
    pub fn show(self, ui: &mut Ui) -> (bool, Rect) {
        let (rect, response) = ui.allocate_exact_size(self.size, Sense::click());

        if ui.is_rect_visible(rect) {
            let corner_radius = CornerRadius::same(sizing::CORNER_RADIUS);
            ui.painter().rect_filled(rect, corner_radius, Color32::WHITE);

            // Red diagonal line
            let inset = rect.shrink(rect.width() * 0.2);
            ui.painter().line_segment(
                [inset.left_bottom(), inset.right_top()],
                Stroke::new(2.0, Color32::from_rgb(239, 68, 68)),
            );

            let stroke = if self.selected {
                Stroke::new(2.0, theme::ACCENT)
            } else {
                Stroke::new(1.0, theme::BORDER)
            };
            ui.painter()
                .rect_stroke(rect, corner_radius, stroke, StrokeKind::Inside);
        }

        let clicked = response.clicked();
        response
            .on_hover_text(self.tooltip)
            .on_hover_cursor(CursorIcon::PointingHand);
        (clicked, rect)
    }
}

fn paint_checkers(ui: &Ui, rect: Rect) {
    const CELL: f32 = 4.0;
    let light = Color32::from_gray(250);
    let dark = Color32::from_gray(200);

    ui.painter().rect_filled(rect, 0.0, light);
    let cols = (rect.width() / CELL).ceil() as usize;
    let rows = (rect.height() / CELL).ceil() as usize;
    for row in 0..rows {
        for col in (row % 2..cols).step_by(2) {
            let min = Pos2::new(
                rect.left() + col as f32 * CELL,
                rect.top() + row as f32 * CELL,
            );
            let cell = Rect::from_min_size(min, vec2(CELL, CELL)).intersect(rect);
            ui.painter().rect_filled(cell, 0.0, dark);
        }
    }
}
