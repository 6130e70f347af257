//! Conversion between host color values and egui colors.
//!
//! The pivot is unmultiplied sRGB bytes (`[r, g, b, a]`). Strings follow the
//! formats of the host's picker library: `#rrggbb`, `rgb(r, g, b)`,
//! `rgba(r, g, b, a)`, `hsl(h, s%, l%)`, `hsla(h, s%, l%, a)`,
//! `hsv(h, s%, v%)` and `hsva(h, s%, v%, a)`. Hue is in degrees, saturation,
//! lightness and value in percent, alpha in `0..=1`.

use colorful_core::{
    AnyColor, ColorType, Encoding, HslColor, HslaColor, HsvColor, HsvaColor, PickerKind, RgbColor,
    RgbaColor,
};
use egui::Color32;
use egui::ecolor::Hsva;

/// Parse a host value into sRGB bytes. Returns `None` for malformed input.
pub fn to_srgba(color: &AnyColor) -> Option<[u8; 4]> {
    match color {
        AnyColor::Text(text) => parse_text(text.trim()),
        AnyColor::Rgb(c) => Some(rgb_bytes([c.r, c.g, c.b], 1.0)),
        AnyColor::Rgba(c) => Some(rgb_bytes([c.r, c.g, c.b], c.a)),
        AnyColor::Hsl(c) => Some(rgb_bytes(hsl_to_rgb(c.h, c.s, c.l), 1.0)),
        AnyColor::Hsla(c) => Some(rgb_bytes(hsl_to_rgb(c.h, c.s, c.l), c.a)),
        AnyColor::Hsv(c) => Some(rgb_bytes(hsv_to_rgb(c.h, c.s, c.v), 1.0)),
        AnyColor::Hsva(c) => Some(rgb_bytes(hsv_to_rgb(c.h, c.s, c.v), c.a)),
    }
}

/// Parse a host value for egui's picker.
pub fn to_hsva(color: &AnyColor) -> Option<Hsva> {
    to_srgba(color).map(Hsva::from_srgba_unmultiplied)
}

/// Parse a host value for painting.
pub fn to_color32(color: &AnyColor) -> Option<Color32> {
    to_srgba(color).map(|[r, g, b, a]| Color32::from_rgba_unmultiplied(r, g, b, a))
}

/// Encode an egui picker value for the host.
pub fn from_hsva(hsva: Hsva, kind: PickerKind) -> AnyColor {
    from_srgba(hsva.to_srgba_unmultiplied(), kind)
}

/// Encode sRGB bytes in the model and encoding the host expects.
pub fn from_srgba([r, g, b, a]: [u8; 4], kind: PickerKind) -> AnyColor {
    let alpha = round_to(f64::from(a) / 255.0, 2);
    let rgb = [f64::from(r), f64::from(g), f64::from(b)];
    let (h, sv, v) = rgb_to_hsv(rgb);
    let (hl, sl, l) = hsv_to_hsl(h, sv, v);
    let [h, sv, v, hl, sl, l] = [h, sv, v, hl, sl, l].map(f64::round);

    match (kind.model, kind.encoding) {
        (ColorType::Hex, _) => AnyColor::Text(format!("#{r:02x}{g:02x}{b:02x}")),
        (ColorType::Rgb, Encoding::String) => AnyColor::Text(format!("rgb({r}, {g}, {b})")),
        (ColorType::Rgb, Encoding::Record) => AnyColor::Rgb(RgbColor {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
        }),
        (ColorType::Rgba, Encoding::String) => {
            AnyColor::Text(format!("rgba({r}, {g}, {b}, {alpha})"))
        }
        (ColorType::Rgba, Encoding::Record) => AnyColor::Rgba(RgbaColor {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            a: alpha,
        }),
        (ColorType::Hsl, Encoding::String) => AnyColor::Text(format!("hsl({hl}, {sl}%, {l}%)")),
        (ColorType::Hsl, Encoding::Record) => AnyColor::Hsl(HslColor { h: hl, s: sl, l }),
        (ColorType::Hsla, Encoding::String) => {
            AnyColor::Text(format!("hsla({hl}, {sl}%, {l}%, {alpha})"))
        }
        (ColorType::Hsla, Encoding::Record) => AnyColor::Hsla(HslaColor {
            h: hl,
            s: sl,
            l,
            a: alpha,
        }),
        (ColorType::Hsv, Encoding::String) => AnyColor::Text(format!("hsv({h}, {sv}%, {v}%)")),
        (ColorType::Hsv, Encoding::Record) => AnyColor::Hsv(HsvColor { h, s: sv, v }),
        (ColorType::Hsva, Encoding::String) => {
            AnyColor::Text(format!("hsva({h}, {sv}%, {v}%, {alpha})"))
        }
        (ColorType::Hsva, Encoding::Record) => AnyColor::Hsva(HsvaColor {
            h,
            s: sv,
            v,
            a: alpha,
        }),
    }
}

fn parse_text(text: &str) -> Option<[u8; 4]> {
    if text.starts_with('#') {
        return parse_hex(text);
    }

    let (name, args) = parse_functional(text)?;
    let alpha = match args.len() {
        3 => 1.0,
        4 => args[3],
        _ => return None,
    };
    let rgb = match name.to_ascii_lowercase().as_str() {
        "rgb" | "rgba" => [args[0], args[1], args[2]],
        "hsl" | "hsla" => hsl_to_rgb(args[0], args[1], args[2]),
        "hsv" | "hsva" => hsv_to_rgb(args[0], args[1], args[2]),
        _ => return None,
    };
    Some(rgb_bytes(rgb, alpha))
}

/// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
fn parse_hex(text: &str) -> Option<[u8; 4]> {
    let digits = text.strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let short = |i: usize| u8::from_str_radix(&digits[i..=i], 16).ok().map(|d| d * 17);
    let pair = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

    match digits.len() {
        3 => Some([short(0)?, short(1)?, short(2)?, 255]),
        4 => Some([short(0)?, short(1)?, short(2)?, short(3)?]),
        6 => Some([pair(0)?, pair(2)?, pair(4)?, 255]),
        8 => Some([pair(0)?, pair(2)?, pair(4)?, pair(6)?]),
        _ => None,
    }
}

/// Split `name(a, b, c)` into its name and numeric arguments. Percent signs
/// and `deg` suffixes are ignored.
fn parse_functional(text: &str) -> Option<(&str, Vec<f64>)> {
    let open = text.find('(')?;
    let inner = text[open + 1..].strip_suffix(')')?;
    let args = inner
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|arg| !arg.is_empty())
        .map(|arg| {
            arg.trim_end_matches('%')
                .trim_end_matches("deg")
                .parse::<f64>()
                .ok()
        })
        .collect::<Option<Vec<_>>>()?;
    Some((text[..open].trim(), args))
}

fn rgb_bytes(rgb: [f64; 3], alpha: f64) -> [u8; 4] {
    let [r, g, b] = rgb.map(|c| c.round().clamp(0.0, 255.0) as u8);
    [r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8]
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// HSV (degrees, percent, percent) to RGB in `0..=255`.
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [f64; 3] {
    let h = h.rem_euclid(360.0) / 60.0;
    let s = (s / 100.0).clamp(0.0, 1.0);
    let v = (v / 100.0).clamp(0.0, 1.0);
    let c = v * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [(r + m) * 255.0, (g + m) * 255.0, (b + m) * 255.0]
}

/// RGB in `0..=255` to HSV (degrees, percent, percent).
fn rgb_to_hsv(rgb: [f64; 3]) -> (f64, f64, f64) {
    let [r, g, b] = rgb.map(|c| c / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };
    (h, s * 100.0, max * 100.0)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    let (h, s, v) = hsl_to_hsv(h, s, l);
    hsv_to_rgb(h, s, v)
}

fn hsl_to_hsv(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let s = (s / 100.0).clamp(0.0, 1.0);
    let l = (l / 100.0).clamp(0.0, 1.0);
    let v = l + s * l.min(1.0 - l);
    let sv = if v == 0.0 { 0.0 } else { 2.0 * (1.0 - l / v) };
    (h, sv * 100.0, v * 100.0)
}

fn hsv_to_hsl(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let s = s / 100.0;
    let v = v / 100.0;
    let l = v * (1.0 - s / 2.0);
    let sl = if l == 0.0 || l == 1.0 {
        0.0
    } else {
        (v - l) / l.min(1.0 - l)
    };
    (h, sl * 100.0, l * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> AnyColor {
        AnyColor::from(s)
    }

    fn kind(model: ColorType, as_string: bool) -> PickerKind {
        PickerKind::new(model, as_string)
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(to_srgba(&text("#222")), Some([34, 34, 34, 255]));
        assert_eq!(to_srgba(&text("#6366f1")), Some([99, 102, 241, 255]));
        assert_eq!(to_srgba(&text("#ff000080")), Some([255, 0, 0, 128]));
        assert_eq!(to_srgba(&text("#12")), None);
        assert_eq!(to_srgba(&text("#zzzzzz")), None);
    }

    #[test]
    fn test_parse_functional_strings() {
        assert_eq!(to_srgba(&text("rgb(1, 2, 3)")), Some([1, 2, 3, 255]));
        assert_eq!(to_srgba(&text("rgba(10, 20, 30, 0.5)")), Some([10, 20, 30, 128]));
        assert_eq!(
            to_srgba(&text("hsla(120, 100%, 50%, 0.5)")),
            Some([0, 255, 0, 128])
        );
        assert_eq!(to_srgba(&text("hsl(0deg 100% 50%)")), Some([255, 0, 0, 255]));
        assert_eq!(to_srgba(&text("hsv(0, 0%, 100%)")), Some([255, 255, 255, 255]));
        assert_eq!(to_srgba(&text("banana")), None);
        assert_eq!(to_srgba(&text("cmyk(1, 2, 3)")), None);
        assert_eq!(to_srgba(&text("rgb(1, 2)")), None);
    }

    #[test]
    fn test_parse_records() {
        let rgba = AnyColor::Rgba(RgbaColor {
            r: 255.0,
            g: 128.0,
            b: 0.0,
            a: 1.0,
        });
        assert_eq!(to_srgba(&rgba), Some([255, 128, 0, 255]));

        let hsv = AnyColor::Hsv(HsvColor {
            h: 240.0,
            s: 100.0,
            v: 100.0,
        });
        assert_eq!(to_srgba(&hsv), Some([0, 0, 255, 255]));

        let color = to_color32(&hsv).unwrap();
        assert_eq!(color, Color32::from_rgb(0, 0, 255));
    }

    #[test]
    fn test_encode_strings() {
        let red = [255, 0, 0, 128];
        assert_eq!(from_srgba(red, kind(ColorType::Hex, false)), text("#ff0000"));
        assert_eq!(from_srgba(red, kind(ColorType::Rgb, true)), text("rgb(255, 0, 0)"));
        assert_eq!(
            from_srgba(red, kind(ColorType::Rgba, true)),
            text("rgba(255, 0, 0, 0.5)")
        );
        assert_eq!(
            from_srgba(red, kind(ColorType::Hsl, true)),
            text("hsl(0, 100%, 50%)")
        );
        assert_eq!(
            from_srgba(red, kind(ColorType::Hsla, true)),
            text("hsla(0, 100%, 50%, 0.5)")
        );
        assert_eq!(
            from_srgba(red, kind(ColorType::Hsv, true)),
            text("hsv(0, 100%, 100%)")
        );
        assert_eq!(
            from_srgba(red, kind(ColorType::Hsva, true)),
            text("hsva(0, 100%, 100%, 0.5)")
        );
    }

    #[test]
    fn test_encode_records() {
        let teal = [0, 128, 128, 255];
        assert_eq!(
            from_srgba(teal, kind(ColorType::Rgba, false)),
            AnyColor::Rgba(RgbaColor {
                r: 0.0,
                g: 128.0,
                b: 128.0,
                a: 1.0
            })
        );
        assert_eq!(
            from_srgba(teal, kind(ColorType::Hsv, false)),
            AnyColor::Hsv(HsvColor {
                h: 180.0,
                s: 100.0,
                v: 50.0
            })
        );
        assert_eq!(
            from_srgba(teal, kind(ColorType::Hsl, false)),
            AnyColor::Hsl(HslColor {
                h: 180.0,
                s: 100.0,
                l: 25.0
            })
        );
    }

    #[test]
    fn test_hex_picker_ignores_as_string() {
        assert_eq!(
            from_srgba([0, 0, 0, 255], kind(ColorType::Hex, false)),
            text("#000000")
        );
    }
}
