//! egui components for the colorful picker.
//!
//! - **Picker**: the toggle affordance plus egui's HSVA picker, wired to a
//!   [`ToggleController`](colorful_core::ToggleController)
//! - **Colors**: color swatches used as toggle buttons
//! - **Buttons**: the text toggle button
//! - **Convert**: host color values to and from egui's `Hsva`

pub mod buttons;
pub mod colors;
pub mod convert;
pub mod picker;

pub use buttons::ToggleButton;
pub use colors::{ColorSwatch, NoColorSwatch};
pub use convert::{from_hsva, from_srgba, to_color32, to_hsva, to_srgba};
pub use picker::{ColorfulPicker, PickerResponse, RepaintingHost, popup_frame, popup_position};

/// Standard sizing constants used across widgets.
pub mod sizing {
    /// Toggle swatch size
    pub const SWATCH: f32 = 24.0;
    /// Gap between the toggle and the popup
    pub const POPUP_GAP: f32 = 6.0;
    /// Approximate size of the popup (picker plus frame margin)
    pub const POPUP_WIDTH: f32 = 220.0;
    pub const POPUP_HEIGHT: f32 = 240.0;
    /// Standard corner radius
    pub const CORNER_RADIUS: u8 = 4;
    /// Panel corner radius
    pub const PANEL_RADIUS: u8 = 8;
}

/// Standard colors used across widgets.
pub mod theme {
    use egui::Color32;

    /// Text color (dark gray)
    pub const TEXT: Color32 = Color32::from_rgb(60, 60, 60);
    /// Border color
    pub const BORDER: Color32 = Color32::from_rgb(220, 220, 220);
    /// Selection/active color (blue)
    pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
    /// Hover background
    pub const HOVER_BG: Color32 = Color32::from_rgb(235, 235, 235);
    /// Idle button background
    pub const BUTTON_BG: Color32 = Color32::from_rgb(245, 245, 245);
    /// Panel background
    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(250, 250, 252, 250);
}
