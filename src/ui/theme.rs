use ratatui::style::Color;

use crate::config::ColorsConfig;
use crate::format::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    Auto,
    Truecolor,
    Color256,
    Mono,
}

impl ColorSupport {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "truecolor" | "24bit" => ColorSupport::Truecolor,
            "256" | "256color" => ColorSupport::Color256,
            "mono" | "monochrome" => ColorSupport::Mono,
            _ => ColorSupport::Auto,
        }
    }
}

pub fn detect_color_support() -> ColorSupport {
    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorSupport::Truecolor;
    }
    ColorSupport::Color256
}

pub fn resolve_color_support(config: &str) -> ColorSupport {
    let parsed = ColorSupport::from_config_str(config);
    if parsed == ColorSupport::Auto {
        detect_color_support()
    } else {
        parsed
    }
}

/// User-configured hex colors for the non-neutral severity tiers.
#[derive(Debug, Clone)]
pub struct SeverityOverrides {
    pub low: String,
    pub medium: String,
    pub high: String,
    pub overloaded: String,
}

impl SeverityOverrides {
    pub fn from_config(colors: &ColorsConfig) -> Self {
        Self {
            low: colors.severity_low.clone(),
            medium: colors.severity_medium.clone(),
            high: colors.severity_high.clone(),
            overloaded: colors.severity_overloaded.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub status_ok: Color,
    pub status_err: Color,
    pub statusbar_bg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub accent: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub gauge_filled: Color,
    pub gauge_unfilled: Color,
    pub sparkline_color: Color,
    pub row_highlight_bg: Color,
    /// Indexed by `Severity` declaration order.
    pub severity_colors: [Color; 5],
}

impl Theme {
    pub fn from_config(
        theme_name: &str,
        overrides: &SeverityOverrides,
        support: ColorSupport,
    ) -> Self {
        if support == ColorSupport::Mono {
            return Self::mono();
        }

        let mut theme = match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            "colorblind" => Self::colorblind(),
            _ => Self::dark(),
        };
        // Colorblind palette is chosen for distinguishability; leave it alone.
        if theme.name != "colorblind" {
            theme.apply_severity_overrides(overrides);
        }
        theme.apply_color_support(support);
        theme
    }

    pub fn next(&self, overrides: &SeverityOverrides, support: ColorSupport) -> Self {
        if support == ColorSupport::Mono {
            return Self::mono();
        }
        let next_name = match self.name {
            "dark" => "light",
            "light" => "colorblind",
            _ => "dark",
        };
        Theme::from_config(next_name, overrides, support)
    }

    /// The only place a severity tier turns into a color.
    pub fn severity_color(&self, severity: Severity) -> Color {
        self.severity_colors[severity as usize]
    }

    fn apply_severity_overrides(&mut self, overrides: &SeverityOverrides) {
        let parsed = [
            &overrides.low,
            &overrides.medium,
            &overrides.high,
            &overrides.overloaded,
        ]
        .map(|s| parse_hex_color(s));

        for (slot, color) in self.severity_colors[1..].iter_mut().zip(parsed) {
            if let Some(color) = color {
                *slot = color;
            }
        }
    }

    fn apply_color_support(&mut self, support: ColorSupport) {
        let map = |c: Color| adapt_color(c, support);

        self.header_accent_bg = map(self.header_accent_bg);
        self.header_accent_fg = map(self.header_accent_fg);
        self.status_ok = map(self.status_ok);
        self.status_err = map(self.status_err);
        self.statusbar_bg = map(self.statusbar_bg);
        self.overlay_border = map(self.overlay_border);
        self.text_primary = map(self.text_primary);
        self.text_secondary = map(self.text_secondary);
        self.accent = map(self.accent);
        self.pill_key_bg = map(self.pill_key_bg);
        self.pill_key_fg = map(self.pill_key_fg);
        self.pill_desc_fg = map(self.pill_desc_fg);
        self.surface_bg = map(self.surface_bg);
        self.gauge_filled = map(self.gauge_filled);
        self.gauge_unfilled = map(self.gauge_unfilled);
        self.sparkline_color = map(self.sparkline_color);
        self.row_highlight_bg = map(self.row_highlight_bg);

        self.severity_colors = self.severity_colors.map(map);
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            header_accent_bg: Color::Cyan,
            header_accent_fg: Color::Black,
            status_ok: Color::Green,
            status_err: Color::Red,
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::Blue,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::Magenta,
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            gauge_filled: Color::Rgb(103, 232, 249),
            gauge_unfilled: Color::DarkGray,
            sparkline_color: Color::Rgb(251, 146, 60),
            row_highlight_bg: Color::Rgb(51, 65, 85),
            severity_colors: [
                Color::White,
                Color::Rgb(16, 185, 129),
                Color::Rgb(234, 179, 8),
                Color::Rgb(239, 68, 68),
                Color::Rgb(236, 72, 153),
            ],
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            header_accent_bg: Color::Blue,
            header_accent_fg: Color::White,
            status_ok: Color::Rgb(0, 120, 0),
            status_err: Color::Red,
            statusbar_bg: Color::Rgb(220, 220, 220),
            overlay_border: Color::Rgb(150, 150, 150),
            text_primary: Color::Black,
            text_secondary: Color::DarkGray,
            accent: Color::Blue,
            pill_key_bg: Color::Blue,
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
            surface_bg: Color::Rgb(200, 200, 200),
            gauge_filled: Color::Rgb(70, 130, 180),
            gauge_unfilled: Color::Rgb(200, 200, 200),
            sparkline_color: Color::Rgb(70, 130, 180),
            row_highlight_bg: Color::Rgb(210, 220, 235),
            severity_colors: [
                Color::Black,
                Color::Rgb(0, 128, 0),
                Color::Rgb(180, 120, 0),
                Color::Rgb(200, 30, 30),
                Color::Rgb(160, 0, 160),
            ],
        }
    }

    pub fn colorblind() -> Self {
        Theme {
            name: "colorblind",
            header_accent_bg: Color::Rgb(0, 114, 178),
            header_accent_fg: Color::White,
            status_ok: Color::Rgb(0, 114, 178),
            status_err: Color::Rgb(213, 94, 0),
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::Rgb(86, 180, 233),
            pill_key_bg: Color::Rgb(240, 228, 66),
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            gauge_filled: Color::Rgb(86, 180, 233),
            gauge_unfilled: Color::DarkGray,
            sparkline_color: Color::Rgb(230, 159, 0),
            row_highlight_bg: Color::Rgb(60, 60, 60),
            severity_colors: [
                Color::White,
                Color::Rgb(86, 180, 233),
                Color::Rgb(240, 228, 66),
                Color::Rgb(230, 159, 0),
                Color::Rgb(213, 94, 0),
            ],
        }
    }

    pub fn mono() -> Self {
        Theme {
            name: "mono",
            header_accent_bg: Color::White,
            header_accent_fg: Color::Black,
            status_ok: Color::White,
            status_err: Color::White,
            statusbar_bg: Color::Black,
            overlay_border: Color::White,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::White,
            pill_key_bg: Color::White,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::Black,
            gauge_filled: Color::White,
            gauge_unfilled: Color::Black,
            sparkline_color: Color::White,
            row_highlight_bg: Color::DarkGray,
            severity_colors: [
                Color::Gray,
                Color::Gray,
                Color::White,
                Color::White,
                Color::White,
            ],
        }
    }
}

fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn adapt_color(color: Color, support: ColorSupport) -> Color {
    match support {
        ColorSupport::Truecolor | ColorSupport::Auto => color,
        ColorSupport::Color256 => match color {
            Color::Rgb(r, g, b) => Color::Indexed(rgb_to_ansi256(r, g, b)),
            _ => color,
        },
        ColorSupport::Mono => match color {
            Color::Rgb(r, g, b) => {
                let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
                if luminance > 128.0 {
                    Color::White
                } else {
                    Color::Black
                }
            }
            Color::White | Color::Black | Color::Gray | Color::DarkGray => color,
            _ => Color::White,
        },
    }
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let r = (r as f32 / 255.0 * 5.0).round() as u8;
    let g = (g as f32 / 255.0 * 5.0).round() as u8;
    let b = (b as f32 / 255.0 * 5.0).round() as u8;
    16 + 36 * r + 6 * g + b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides() -> SeverityOverrides {
        SeverityOverrides::from_config(&ColorsConfig::default())
    }

    #[test]
    fn severity_colors_follow_tier_order() {
        let theme = Theme::from_config("dark", &overrides(), ColorSupport::Truecolor);
        assert_eq!(theme.severity_color(Severity::Neutral), Color::White);
        assert_eq!(theme.severity_color(Severity::Low), Color::Rgb(16, 185, 129));
        assert_eq!(theme.severity_color(Severity::Medium), Color::Rgb(234, 179, 8));
        assert_eq!(theme.severity_color(Severity::High), Color::Rgb(239, 68, 68));
        assert_eq!(
            theme.severity_color(Severity::Overloaded),
            Color::Rgb(236, 72, 153)
        );
    }

    #[test]
    fn high_and_overloaded_are_distinct_in_every_color_theme() {
        for name in ["dark", "light", "colorblind"] {
            let theme = Theme::from_config(name, &overrides(), ColorSupport::Truecolor);
            assert_ne!(
                theme.severity_color(Severity::High),
                theme.severity_color(Severity::Overloaded),
                "theme {name}"
            );
        }
    }

    #[test]
    fn overrides_replace_tier_colors() {
        let custom = SeverityOverrides {
            low: "#000001".to_string(),
            medium: "not a color".to_string(),
            high: "#000003".to_string(),
            overloaded: "000004".to_string(),
        };
        let theme = Theme::from_config("dark", &custom, ColorSupport::Truecolor);
        assert_eq!(theme.severity_color(Severity::Low), Color::Rgb(0, 0, 1));
        assert_eq!(theme.severity_color(Severity::Medium), Color::Rgb(234, 179, 8));
        assert_eq!(theme.severity_color(Severity::High), Color::Rgb(0, 0, 3));
        assert_eq!(theme.severity_color(Severity::Overloaded), Color::Rgb(0, 0, 4));
    }

    #[test]
    fn color256_downgrades_rgb() {
        let theme = Theme::from_config("dark", &overrides(), ColorSupport::Color256);
        assert!(matches!(
            theme.severity_color(Severity::High),
            Color::Indexed(_)
        ));
        assert_eq!(theme.severity_color(Severity::Neutral), Color::White);
    }

    #[test]
    fn mono_support_forces_mono_theme() {
        let theme = Theme::from_config("light", &overrides(), ColorSupport::Mono);
        assert_eq!(theme.name, "mono");
        let next = theme.next(&overrides(), ColorSupport::Mono);
        assert_eq!(next.name, "mono");
    }

    #[test]
    fn themes_cycle() {
        let support = ColorSupport::Truecolor;
        let theme = Theme::from_config("dark", &overrides(), support);
        let theme = theme.next(&overrides(), support);
        assert_eq!(theme.name, "light");
        let theme = theme.next(&overrides(), support);
        assert_eq!(theme.name, "colorblind");
        let theme = theme.next(&overrides(), support);
        assert_eq!(theme.name, "dark");
    }

    #[test]
    fn color_support_from_config() {
        assert_eq!(ColorSupport::from_config_str("24bit"), ColorSupport::Truecolor);
        assert_eq!(ColorSupport::from_config_str("256"), ColorSupport::Color256);
        assert_eq!(ColorSupport::from_config_str("mono"), ColorSupport::Mono);
        assert_eq!(ColorSupport::from_config_str("whatever"), ColorSupport::Auto);
    }

    #[test]
    fn rgb_to_ansi256_corners() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
    }
}
