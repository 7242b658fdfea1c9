use serde::{Deserialize, Serialize};

/// Visual attributes of one subtitle layer
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LayerStyle {
    // @field: Font size in script pixels
    pub font_size: u32,

    // @field: ASS colour in `&HAABBGGRR` form
    pub colour: String,

    // @field: Vertical margin from the bottom edge
    pub margin_v: u32,
}

impl LayerStyle {
    /// Default style of the primary (translated) layer: white, large, higher up
    pub fn primary() -> Self {
        Self {
            font_size: 28,
            colour: "&H00FFFFFF".to_string(),
            margin_v: 60,
        }
    }

    /// Default style of the secondary (source) layer: yellow, small, at the bottom
    pub fn secondary() -> Self {
        Self {
            font_size: 20,
            colour: "&H0000FFFF".to_string(),
            margin_v: 20,
        }
    }

    /// Colour as an inline override tag, e.g. `&H0000FFFF` becomes `\c&H00FFFF&`
    ///
    /// The alpha byte is dropped since `\c` only takes BGR. Returns `None`
    /// when the colour is not a hex literal.
    pub fn inline_colour_tag(&self) -> Option<String> {
        let hex = self
            .colour
            .trim()
            .trim_start_matches("&H")
            .trim_start_matches("&h")
            .trim_end_matches('&');

        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let bgr = if hex.len() > 6 { &hex[hex.len() - 6..] } else { hex };
        Some(format!("\\c&H{:0>6}&", bgr.to_uppercase()))
    }

    /// Whether the colour is plain white, which needs no inline override
    pub fn is_untinted(&self) -> bool {
        matches!(self.inline_colour_tag().as_deref(), Some("\\c&HFFFFFF&"))
    }
}

/// Styles of both layers of a bilingual subtitle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylePair {
    pub font_name: String,
    pub primary: LayerStyle,
    pub secondary: LayerStyle,
    /// ASS numpad alignment shared by both layers
    pub alignment: u8,
}

impl Default for StylePair {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            primary: LayerStyle::primary(),
            secondary: LayerStyle::secondary(),
            alignment: 2,
        }
    }
}
