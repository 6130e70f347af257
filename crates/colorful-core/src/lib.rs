//! Colorful Core Library
//!
//! UI-agnostic logic of the colorful picker: call coalescing, the toggle
//! state machine and the props contract shared with the host.

pub mod error;
pub mod host;
pub mod props;
pub mod throttle;
pub mod toggle;
pub mod view;

pub use error::{ColorfulError, ThrottleError};
pub use host::{SetProps, SharedProps};
pub use props::{
    AnyColor, ColorType, ColorfulProps, DEFAULT_CLOSE_DELAY_MS, DEFAULT_TOGGLE_LABEL, Encoding,
    HslColor, HslaColor, HsvColor, HsvaColor, PickerKind, PropsUpdate, RgbColor, RgbaColor,
    ToggleDirection,
};
pub use throttle::{Pending, Throttle, ThrottleBuilder, throttle};
pub use toggle::ToggleController;
pub use view::{ColorfulView, ToggleAffordance};
