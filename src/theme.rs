//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Neon tile colours, indexed by unit colour.
const NEON: [Color; 6] = [
    Color::Rgb(0x00, 0xF0, 0xFF), // cyan
    Color::Rgb(0xD5, 0x2B, 0xFF), // purple
    Color::Rgb(0x39, 0xE6, 0x39), // green
    Color::Rgb(0xFF, 0x2A, 0x2A), // red
    Color::Rgb(0xFF, 0xAA, 0x00), // orange
    Color::Rgb(0x00, 0x88, 0xFF), // blue
];

/// Tile and UI colours.
#[derive(Debug, Clone)]
pub struct Theme {
    pub tiles: [Color; 6],
    /// Board background.
    pub bg: Color,
    /// Empty hex outline.
    pub div_line: Color,
    pub main_fg: Color,
    pub title: Color,
    /// Cursor outline and selected slot.
    pub hi_fg: Color,
    /// Locked cells and spent slots.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::neon()
    }
}

impl Theme {
    pub fn neon() -> Self {
        Self {
            tiles: NEON,
            bg: Color::Rgb(0x12, 0x12, 0x1C),
            div_line: Color::Rgb(0x3A, 0x3A, 0x4E),
            main_fg: Color::Rgb(0xD0, 0xD0, 0xE0),
            title: Color::Rgb(0x00, 0xF0, 0xFF),
            hi_fg: Color::Rgb(0xFF, 0xFF, 0xFF),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    /// Load a btop-style theme file. Missing path or file means the neon
    /// defaults; keys absent from the file keep their default colour.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?)),
            _ => Self::neon(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.tiles = [
                    Color::Rgb(0x00, 0xFF, 0xFF),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0x00),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                ];
                self.bg = Color::Black;
                self.main_fg = Color::White;
            }
            crate::Palette::Colorblind => {
                // Tol "bright" set; distinguishable without red/green.
                self.tiles = [
                    Color::Rgb(0x00, 0x77, 0xBB),
                    Color::Rgb(0xEE, 0x77, 0x33),
                    Color::Rgb(0x00, 0x99, 0x88),
                    Color::Rgb(0xCC, 0x33, 0x11),
                    Color::Rgb(0xEE, 0x33, 0x77),
                    Color::Rgb(0xBB, 0xBB, 0xBB),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let base = Self::neon();
        // Tile colours borrow the btop gradient and box keys in a fixed order.
        let tile_keys = ["hi_fg", "net_box", "mem_box", "cpu_end", "cpu_mid", "cpu_box"];
        let mut tiles = base.tiles;
        for (tile, key) in tiles.iter_mut().zip(tile_keys) {
            if let Some(c) = get(key) {
                *tile = c;
            }
        }
        Self {
            tiles,
            bg: get("main_bg").or_else(|| get("meter_bg")).unwrap_or(base.bg),
            div_line: get("div_line").unwrap_or(base.div_line),
            main_fg: get("main_fg").unwrap_or(base.main_fg),
            title: get("title").unwrap_or(base.title),
            hi_fg: get("selected_fg").unwrap_or(base.hi_fg),
            inactive_fg: get("inactive_fg").unwrap_or(base.inactive_fg),
        }
    }

    #[inline]
    pub fn tile(&self, color: u8) -> Color {
        self.tiles[color as usize % self.tiles.len()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    let (r, g, b) = match s.len() {
        6 => (channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?),
        3 => (
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        ),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#D52BFF").unwrap();
        assert!(matches!(c, Color::Rgb(0xD5, 0x2B, 0xFF)));
    }

    #[test]
    fn test_parse_hex_3() {
        assert!(matches!(parse_hex("#FFF").unwrap(), Color::Rgb(255, 255, 255)));
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("zzz").is_err());
    }

    #[test]
    fn test_theme_file_overrides_only_given_keys() {
        let map = parse_theme_file(
            "# comment\ntheme[main_bg]=\"#000000\"\ntheme[mem_box]='#112233'\nnot a theme line",
        );
        let theme = Theme::from_map(&map);
        assert_eq!(theme.bg, Color::Rgb(0, 0, 0));
        assert_eq!(theme.tile(2), Color::Rgb(0x11, 0x22, 0x33));
        assert_eq!(theme.tile(0), NEON[0]);
        assert_eq!(theme.tile(6), theme.tile(0));
    }
}
