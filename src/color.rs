use std::str::FromStr;

use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Dashboard theme
// ---------------------------------------------------------------------------

/// Classic blue for normal values, red for alerts, light grey chart background.
pub const PRIMARY_HEX: &str = "#288cfa";
pub const ALERT_HEX: &str = "#FF0000";
pub const BACKGROUND_HEX: &str = "#F5F5F5";

/// Parse `#rrggbb`, falling back when the string is malformed.
pub fn from_hex(hex: &str, fallback: Color32) -> Color32 {
    match Srgb::<u8>::from_str(hex) {
        Ok(c) => Color32::from_rgb(c.red, c.green, c.blue),
        Err(e) => {
            log::warn!("Invalid colour '{hex}': {e}");
            fallback
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub primary: Color32,
    pub alert: Color32,
    pub background: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: from_hex(PRIMARY_HEX, Color32::LIGHT_BLUE),
            alert: from_hex(ALERT_HEX, Color32::RED),
            background: from_hex(BACKGROUND_HEX, Color32::from_gray(245)),
        }
    }
}

impl Theme {
    /// Colour for a defect rate: primary at 0 %, alert at `ceiling` and
    /// above, mixed in linear RGB in between.
    pub fn rate_color(&self, rate: f64, ceiling: f64) -> Color32 {
        let t = if ceiling > 0.0 {
            (rate / ceiling).clamp(0.0, 1.0) as f32
        } else {
            1.0
        };
        let mixed = to_linear(self.primary).mix(to_linear(self.alert), t);
        let srgb: Srgb<u8> = Srgb::from_linear(mixed);
        Color32::from_rgb(srgb.red, srgb.green, srgb.blue)
    }
}

fn to_linear(c: Color32) -> LinSrgb {
    Srgb::new(c.r(), c.g(), c.b()).into_format::<f32>().into_linear()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_uses_dashboard_palette() {
        let theme = Theme::default();
        assert_eq!(theme.primary, Color32::from_rgb(0x28, 0x8c, 0xfa));
        assert_eq!(theme.alert, Color32::from_rgb(0xff, 0x00, 0x00));
        assert_eq!(theme.background, Color32::from_rgb(0xf5, 0xf5, 0xf5));
    }

    #[test]
    fn malformed_hex_falls_back() {
        assert_eq!(from_hex("not-a-colour", Color32::GRAY), Color32::GRAY);
    }

    fn close(a: Color32, b: Color32) -> bool {
        let d = |x: u8, y: u8| (x as i16 - y as i16).abs() <= 1;
        d(a.r(), b.r()) && d(a.g(), b.g()) && d(a.b(), b.b())
    }

    #[test]
    fn rate_color_spans_primary_to_alert() {
        let theme = Theme::default();
        assert!(close(theme.rate_color(0.0, 10.0), theme.primary));
        assert!(close(theme.rate_color(10.0, 10.0), theme.alert));
        assert!(close(theme.rate_color(250.0, 10.0), theme.alert));

        let mid = theme.rate_color(5.0, 10.0);
        assert_ne!(mid, theme.primary);
        assert_ne!(mid, theme.alert);
    }
}
