use serde::{Deserialize, Serialize};

/// Named chart colour roles with their light/dark scheme values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorRole {
    ThresholdLine,
    ThresholdLabel,
    AxisLine,
    AxisLabel,
    AxisTicks,
    AxisTickLabel,
    AxisSplitLine,
    SeriesLabel,
}

impl ColorRole {
    #[must_use]
    pub const fn light(self) -> &'static str {
        match self {
            Self::ThresholdLine | Self::ThresholdLabel | Self::SeriesLabel => "rgba(0, 0, 0, 0.76)",
            Self::AxisLine | Self::AxisLabel | Self::AxisTicks | Self::AxisTickLabel => {
                "rgba(0, 0, 0, 0.54)"
            }
            Self::AxisSplitLine => "rgba(0, 0, 0, 0.12)",
        }
    }

    #[must_use]
    pub const fn dark(self) -> &'static str {
        match self {
            Self::ThresholdLine | Self::ThresholdLabel | Self::SeriesLabel => "#eee",
            Self::AxisLine | Self::AxisLabel | Self::AxisTicks | Self::AxisTickLabel => "#B9B8CE",
            Self::AxisSplitLine => "#484753",
        }
    }
}

/// 8-bit RGBA colour parsed from CSS notation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f64,
}

impl Rgba {
    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(...)` and `rgba(...)`.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(hex) = input.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = input.to_ascii_lowercase();
        let body = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let channel = |text: &str| text.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0) as u8);
        let alpha = match parts.get(3) {
            Some(text) => text.parse::<f64>().ok()?.clamp(0.0, 1.0),
            None => 1.0,
        };
        Some(Self {
            red: channel(parts[0])?,
            green: channel(parts[1])?,
            blue: channel(parts[2])?,
            alpha,
        })
    }

    /// Perceived brightness in 0..=255 (ITU-R BT.601 weights).
    #[must_use]
    pub fn brightness(self) -> f64 {
        (f64::from(self.red) * 299.0 + f64::from(self.green) * 587.0 + f64::from(self.blue) * 114.0)
            / 1000.0
    }

    #[must_use]
    pub fn is_dark(self) -> bool {
        self.brightness() < 128.0
    }

    #[must_use]
    pub fn inverted(self) -> Self {
        Self {
            red: 255 - self.red,
            green: 255 - self.green,
            blue: 255 - self.blue,
            alpha: self.alpha,
        }
    }

    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn to_rgb_string(self) -> String {
        if self.alpha >= 1.0 {
            format!("rgb({}, {}, {})", self.red, self.green, self.blue)
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.red, self.green, self.blue, self.alpha
            )
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let digit = |index: usize| u8::from_str_radix(hex.get(index..=index)?, 16).ok();
    let pair = |index: usize| u8::from_str_radix(hex.get(index..index + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Rgba {
            red: digit(0)? * 17,
            green: digit(1)? * 17,
            blue: digit(2)? * 17,
            alpha: 1.0,
        }),
        6 | 8 => Some(Rgba {
            red: pair(0)?,
            green: pair(2)?,
            blue: pair(4)?,
            alpha: if hex.len() == 8 {
                f64::from(pair(6)?) / 255.0
            } else {
                1.0
            },
        }),
        _ => None,
    }
}

/// Adapts a configured colour to the active theme.
///
/// In dark mode a dark colour is swapped for the role's dark scheme colour, or
/// inverted when no role is given. Light mode and unparsable colours pass
/// through unchanged.
#[must_use]
pub fn prepare_theme_color(color: &str, dark_mode: bool, role: Option<ColorRole>) -> String {
    if !dark_mode {
        return color.to_owned();
    }
    match Rgba::parse(color) {
        Some(parsed) if parsed.is_dark() => match role {
            Some(role) => role.dark().to_owned(),
            None => parsed.inverted().to_rgb_string(),
        },
        _ => color.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorRole, Rgba, prepare_theme_color};

    #[test]
    fn parses_css_notations() {
        assert_eq!(
            Rgba::parse("#fff"),
            Some(Rgba {
                red: 255,
                green: 255,
                blue: 255,
                alpha: 1.0
            })
        );
        let parsed = Rgba::parse("rgba(0, 0, 0, 0.54)").expect("rgba");
        assert_eq!(parsed.red, 0);
        assert!((parsed.alpha - 0.54).abs() < 1e-9);
        assert!(Rgba::parse("hsl(1, 2, 3)").is_none());
    }

    #[test]
    fn dark_mode_replaces_dark_role_colors() {
        let light = ColorRole::AxisLine.light();
        assert_eq!(prepare_theme_color(light, false, Some(ColorRole::AxisLine)), light);
        assert_eq!(
            prepare_theme_color(light, true, Some(ColorRole::AxisLine)),
            ColorRole::AxisLine.dark()
        );
        assert_eq!(prepare_theme_color("#000000", true, None), "rgb(255, 255, 255)");
        assert_eq!(prepare_theme_color("#ffff00", true, None), "#ffff00");
    }
}
