//! Presentational decisions derived from props.

use crate::props::{ColorfulProps, DEFAULT_TOGGLE_LABEL, PickerKind};

/// What the toggle button shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleAffordance {
    /// A swatch filled with the current value. `None` when the value is not
    /// a CSS string and cannot be used as a background directly.
    Swatch(Option<String>),
    /// A text label.
    Label(String),
}

/// Everything a renderer needs to lay out one picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorfulView {
    pub class_name: String,
    pub picker_class_name: String,
    /// `None` when the picker has no toggle button.
    pub toggle: Option<ToggleAffordance>,
    pub picker_visible: bool,
    pub picker: PickerKind,
}

impl ColorfulView {
    pub fn derive(props: &ColorfulProps) -> Self {
        let mut classes = vec![props.class_name.as_deref().unwrap_or(""), "dash-colorful"];
        if props.active {
            classes.push("active");
        }

        let picker_class_name = format!(
            "dash-color-picker {}",
            props.toggle_direction.css_class()
        );

        let toggle = props.toggleable.then(|| {
            if props.toggle_button_color {
                ToggleAffordance::Swatch(
                    props
                        .value
                        .as_ref()
                        .and_then(|value| value.as_str())
                        .map(str::to_string),
                )
            } else {
                ToggleAffordance::Label(
                    props
                        .toggle_button
                        .clone()
                        .unwrap_or_else(|| DEFAULT_TOGGLE_LABEL.to_string()),
                )
            }
        });

        Self {
            class_name: classes.join(" "),
            picker_class_name,
            toggle,
            picker_visible: !props.toggleable || props.active,
            picker: props.picker_kind(),
        }
    }
}
