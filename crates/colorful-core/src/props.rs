//! Props exchanged between the picker and its host.
//!
//! The host owns a [`ColorfulProps`] record and hands it to the widget on
//! every frame. The widget never mutates it directly; it sends
//! [`PropsUpdate`]s back through [`SetProps`](crate::host::SetProps).

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ColorfulError;

/// Label of the toggle button when neither a label nor a swatch is set.
pub const DEFAULT_TOGGLE_LABEL: &str = "🎨";

/// Default delay before the picker closes after a choice, in milliseconds.
pub const DEFAULT_CLOSE_DELAY_MS: u64 = 2500;

/// Color model of the value exchanged with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColorType {
    #[default]
    Hex,
    Rgb,
    Rgba,
    Hsl,
    Hsla,
    Hsv,
    Hsva,
}

impl ColorType {
    /// All supported models.
    pub const ALL: [ColorType; 7] = [
        Self::Hex,
        Self::Rgb,
        Self::Rgba,
        Self::Hsl,
        Self::Hsla,
        Self::Hsv,
        Self::Hsva,
    ];

    /// Name used in props.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Rgb => "rgb",
            Self::Rgba => "rgba",
            Self::Hsl => "hsl",
            Self::Hsla => "hsla",
            Self::Hsv => "hsv",
            Self::Hsva => "hsva",
        }
    }

    /// Look up a model by name. Unknown names fall back to hex.
    pub fn from_name(name: &str) -> Self {
        match Self::ALL.iter().find(|t| t.as_str() == name) {
            Some(t) => *t,
            None => {
                log::warn!("Unknown color type {:?}, falling back to hex", name);
                Self::Hex
            }
        }
    }

    /// Whether values of this model carry an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba | Self::Hsla | Self::Hsva)
    }
}

impl From<String> for ColorType {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<ColorType> for String {
    fn from(color_type: ColorType) -> Self {
        color_type.as_str().to_string()
    }
}

impl fmt::Display for ColorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the picker pops up relative to the toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToggleDirection {
    Top,
    #[default]
    TopLeft,
    TopRight,
    Left,
    Right,
    Bottom,
    BottomLeft,
    BottomRight,
}

impl ToggleDirection {
    pub const ALL: [ToggleDirection; 8] = [
        Self::Top,
        Self::TopLeft,
        Self::TopRight,
        Self::Left,
        Self::Right,
        Self::Bottom,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::Left => "left",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }

    /// CSS class applied to the picker container.
    pub fn css_class(self) -> String {
        format!("toggle-direction-{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbaColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HslColor {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HslaColor {
    pub h: f64,
    pub s: f64,
    pub l: f64,
    pub a: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsvColor {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsvaColor {
    pub h: f64,
    pub s: f64,
    pub v: f64,
    pub a: f64,
}

/// A color value as the host sees it.
///
/// Either a CSS-style string or a component record. The core treats it as
/// opaque; only the external picker interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnyColor {
    Text(String),
    // Alpha variants first: untagged matching ignores unknown fields.
    Rgba(RgbaColor),
    Rgb(RgbColor),
    Hsla(HslaColor),
    Hsl(HslColor),
    Hsva(HsvaColor),
    Hsv(HsvColor),
}

impl AnyColor {
    /// The value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for AnyColor {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for AnyColor {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// How a picker exchanges values with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// CSS-style string such as `rgb(1, 2, 3)`.
    String,
    /// Component record such as `{"r": 1, "g": 2, "b": 3}`.
    Record,
}

/// Which picker variant to mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickerKind {
    pub model: ColorType,
    pub encoding: Encoding,
}

impl PickerKind {
    /// Hex is always a string; other models follow `as_string`.
    pub fn new(model: ColorType, as_string: bool) -> Self {
        let encoding = if model == ColorType::Hex || as_string {
            Encoding::String
        } else {
            Encoding::Record
        };
        Self { model, encoding }
    }
}

/// Full property record of a picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorfulProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Current color value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<AnyColor>,
    /// Color model of `value`.
    #[serde(rename = "type")]
    pub color_type: ColorType,
    /// Show a toggle button that opens the picker.
    pub toggleable: bool,
    /// Label of the toggle button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle_button: Option<String>,
    /// Close the picker once a value is chosen.
    pub toggle_on_choose: bool,
    /// Delay before closing after a choice, in milliseconds.
    pub toggle_on_choose_delay: u64,
    pub toggle_direction: ToggleDirection,
    /// Whether the picker is open.
    pub active: bool,
    /// Use a swatch of the current value as the toggle button.
    pub toggle_button_color: bool,
    /// Exchange string values for every model.
    pub as_string: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Default for ColorfulProps {
    fn default() -> Self {
        Self {
            id: None,
            value: None,
            color_type: ColorType::Hex,
            toggleable: true,
            toggle_button: None,
            toggle_on_choose: true,
            toggle_on_choose_delay: DEFAULT_CLOSE_DELAY_MS,
            toggle_direction: ToggleDirection::TopLeft,
            active: false,
            toggle_button_color: true,
            as_string: false,
            class_name: None,
            style: None,
        }
    }
}

impl ColorfulProps {
    /// Parse props from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ColorfulError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize props to pretty JSON.
    pub fn to_json(&self) -> Result<String, ColorfulError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Merge an update. Returns true if anything changed.
    pub fn apply(&mut self, update: PropsUpdate) -> bool {
        let mut changed = false;
        if let Some(value) = update.value {
            changed |= self.value.as_ref() != Some(&value);
            self.value = Some(value);
        }
        if let Some(active) = update.active {
            changed |= self.active != active;
            self.active = active;
        }
        changed
    }

    /// Delay before closing after a choice.
    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.toggle_on_choose_delay)
    }

    /// Picker variant for the configured model and encoding.
    pub fn picker_kind(&self) -> PickerKind {
        PickerKind::new(self.color_type, self.as_string)
    }
}

/// Partial props sent from the widget to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AnyColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl PropsUpdate {
    pub fn value(value: AnyColor) -> Self {
        Self {
            value: Some(value),
            active: None,
        }
    }

    pub fn active(active: bool) -> Self {
        Self {
            value: None,
            active: Some(active),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.active.is_none()
    }
}
