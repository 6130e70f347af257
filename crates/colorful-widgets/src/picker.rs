//! The colorful picker as an egui widget.
//!
//! Layout follows [`ColorfulView`]: an optional toggle affordance and the
//! picking surface, inline when the picker has no toggle and in a popup
//! otherwise. All state changes go through the [`ToggleController`], so the
//! widget itself is stateless apart from the HSVA value kept in egui memory
//! to preserve hue while saturation is zero.

use colorful_core::{
    AnyColor, ColorfulProps, ColorfulView, Pending, PropsUpdate, SetProps, ToggleAffordance,
    ToggleController, ToggleDirection,
};
use egui::color_picker::{Alpha, color_picker_hsva_2d};
use egui::ecolor::Hsva;
use egui::{Color32, CornerRadius, Frame, Id, Margin, Pos2, Rect, Stroke, Ui, Vec2, vec2};

use crate::buttons::ToggleButton;
use crate::colors::{ColorSwatch, NoColorSwatch};
use crate::convert::{from_hsva, to_color32, to_hsva};
use crate::{sizing, theme};

/// What happened during one frame of [`ColorfulPicker::show`].
#[derive(Debug, Default)]
pub struct PickerResponse {
    /// The toggle affordance was clicked.
    pub toggled: bool,
    /// The value sent to the host, if the user picked a color.
    pub changed: Option<AnyColor>,
    /// The deferred close scheduled by this pick.
    pub closing: Option<Pending<()>>,
    /// Whether the picking surface was drawn.
    pub picker_shown: bool,
    /// Where the toggle affordance was drawn.
    pub toggle_rect: Option<Rect>,
}

/// A color picker bound to host props.
pub struct ColorfulPicker<'a> {
    controller: &'a ToggleController,
    props: &'a ColorfulProps,
    id: Id,
}

impl<'a> ColorfulPicker<'a> {
    pub fn new(controller: &'a ToggleController, props: &'a ColorfulProps) -> Self {
        let id = Id::new(("colorful", props.id.as_deref().unwrap_or_default()));
        Self {
            controller,
            props,
            id,
        }
    }

    /// Distinguish pickers that share a props `id`.
    pub fn id_salt(mut self, salt: impl std::hash::Hash) -> Self {
        self.id = self.id.with(salt);
        self
    }

    pub fn show(self, ui: &mut Ui) -> PickerResponse {
        let view = ColorfulView::derive(self.props);
        let mut response = PickerResponse::default();

        if let Some(toggle) = &view.toggle {
            let (clicked, rect) = self.show_toggle(ui, toggle);
            response.toggle_rect = Some(rect);
            if clicked {
                response.toggled = self.controller.on_toggle(self.props);
            }
        }

        if !view.picker_visible {
            return response;
        }
        response.picker_shown = true;

        let picked = match response.toggle_rect {
            Some(anchor) => {
                let size = vec2(sizing::POPUP_WIDTH, sizing::POPUP_HEIGHT);
                let pos = popup_position(anchor, self.props.toggle_direction, size);
                egui::Area::new(self.id.with("popup"))
                    .order(egui::Order::Foreground)
                    .fixed_pos(pos)
                    .show(ui.ctx(), |ui| {
                        popup_frame().show(ui, |ui| self.show_surface(ui)).inner
                    })
                    .inner
            }
            None => self.show_surface(ui),
        };

        if let Some(color) = picked {
            log::trace!("Picked {:?}", color);
            response.closing = self.controller.on_change(self.props, color.clone());
            response.changed = Some(color);
        }
        response
    }

    fn show_toggle(&self, ui: &mut Ui, toggle: &ToggleAffordance) -> (bool, Rect) {
        let tooltip = self.props.toggle_button.as_deref().unwrap_or("Pick a color");
        match toggle {
            ToggleAffordance::Swatch(css) => {
                let color = css
                    .as_deref()
                    .and_then(|css| to_color32(&AnyColor::from(css)));
                match color {
                    Some(color) => ColorSwatch::new(color, tooltip)
                        .selected(self.props.active)
                        .show(ui),
                    None => NoColorSwatch::new(tooltip)
                        .selected(self.props.active)
                        .show(ui),
                }
            }
            ToggleAffordance::Label(label) => ToggleButton::new(label, self.props.active).show(ui),
        }
    }

    /// Draw egui's picker and return the new host value when it was edited.
    fn show_surface(&self, ui: &mut Ui) -> Option<AnyColor> {
        let kind = self.props.picker_kind();
        let memory_id = self.id.with("hsva");

        // Reuse the remembered HSVA while it still encodes to the host value.
        let remembered = ui.data(|d| d.get_temp::<Hsva>(memory_id));
        let mut hsva = remembered
            .filter(|hsva| Some(&from_hsva(*hsva, kind)) == self.props.value.as_ref())
            .or_else(|| self.props.value.as_ref().and_then(to_hsva))
            .unwrap_or_else(|| Hsva::from(Color32::BLACK));

        let alpha = if kind.model.has_alpha() {
            Alpha::OnlyBlend
        } else {
            Alpha::Opaque
        };
        if !color_picker_hsva_2d(ui, &mut hsva, alpha) {
            return None;
        }

        ui.data_mut(|d| d.insert_temp(memory_id, hsva));
        let color = from_hsva(hsva, kind);
        (Some(&color) != self.props.value.as_ref()).then_some(color)
    }
}

/// Top-left corner of a popup of `size` opened from `anchor`.
///
/// Vertical directions stack the popup above or below the anchor; the
/// horizontal part says which way it extends. `Left` and `Right` center it
/// vertically beside the anchor.
pub fn popup_position(anchor: Rect, direction: ToggleDirection, size: Vec2) -> Pos2 {
    let gap = sizing::POPUP_GAP;
    let above = anchor.top() - gap - size.y;
    let below = anchor.bottom() + gap;
    let centered_x = anchor.center().x - size.x / 2.0;
    let extends_left = anchor.right() - size.x;
    let extends_right = anchor.left();

    match direction {
        ToggleDirection::Top => Pos2::new(centered_x, above),
        ToggleDirection::TopLeft => Pos2::new(extends_left, above),
        ToggleDirection::TopRight => Pos2::new(extends_right, above),
        ToggleDirection::Bottom => Pos2::new(centered_x, below),
        ToggleDirection::BottomLeft => Pos2::new(extends_left, below),
        ToggleDirection::BottomRight => Pos2::new(extends_right, below),
        ToggleDirection::Left => Pos2::new(
            anchor.left() - gap - size.x,
            anchor.center().y - size.y / 2.0,
        ),
        ToggleDirection::Right => {
            Pos2::new(anchor.right() + gap, anchor.center().y - size.y / 2.0)
        }
    }
}

/// Frame around the popup picker.
pub fn popup_frame() -> Frame {
    Frame::new()
        .fill(theme::PANEL_BG)
        .corner_radius(CornerRadius::same(sizing::PANEL_RADIUS))
        .stroke(Stroke::new(1.0, theme::BORDER))
        .shadow(egui::epaint::Shadow {
            spread: 0,
            blur: 8,
            offset: [0, 2],
            color: Color32::from_black_alpha(15),
        })
        .inner_margin(Margin::same(8))
}

/// A host that asks egui for a new frame after every update.
///
/// Deferred closes fire on the tokio runtime, outside of any frame; without
/// a repaint the popup would stay on screen until the next input event.
pub struct RepaintingHost<H> {
    inner: H,
    ctx: egui::Context,
}

impl<H: SetProps> RepaintingHost<H> {
    pub fn new(inner: H, ctx: egui::Context) -> Self {
        Self { inner, ctx }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: SetProps> SetProps for RepaintingHost<H> {
    fn set_props(&self, update: PropsUpdate) {
        self.inner.set_props(update);
        self.ctx.request_repaint();
    }
}
