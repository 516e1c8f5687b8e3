use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Visual role of a marker. Each role maps to one [`MarkerStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Start,
    Finish,
    LeftHand,
    RightHand,
    BothHands,
    Foot,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 6] = [
        MarkerKind::Start,
        MarkerKind::Finish,
        MarkerKind::LeftHand,
        MarkerKind::RightHand,
        MarkerKind::BothHands,
        MarkerKind::Foot,
    ];

    /// Single-letter label used when a move carries no text of its own.
    pub fn fallback_label(self) -> Option<&'static str> {
        match self {
            MarkerKind::Start => Some("S"),
            MarkerKind::Finish => Some("F"),
            MarkerKind::LeftHand => Some("L"),
            MarkerKind::RightHand => Some("R"),
            MarkerKind::BothHands => Some("B"),
            MarkerKind::Foot => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "start" => Some(MarkerKind::Start),
            "finish" => Some(MarkerKind::Finish),
            "left_hand" | "left" => Some(MarkerKind::LeftHand),
            "right_hand" | "right" => Some(MarkerKind::RightHand),
            "both_hands" | "both" => Some(MarkerKind::BothHands),
            "foot" => Some(MarkerKind::Foot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Circle,
    Rectangle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub outline: String,
    pub shape: MarkerShape,
    pub text_color: String,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            outline: "rgba(255,255,255,0.9)".to_string(),
            shape: MarkerShape::Circle,
            text_color: "#FFFFFF".to_string(),
        }
    }
}

impl MarkerStyle {
    fn new(outline: &str, shape: MarkerShape, text_color: &str) -> Self {
        Self {
            outline: outline.to_string(),
            shape,
            text_color: text_color.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub markers: BTreeMap<MarkerKind, MarkerStyle>,
    /// Ring used by the hold index overlay.
    pub index_marker: MarkerStyle,
    pub center_dot_color: String,
    pub arrow_color: String,
    pub text_outline_color: String,
    pub title_color: String,
    pub beta_text_color: String,
    pub beta_background: String,
    /// Fill of the band added below the photo when the canvas is extended.
    pub band_background: String,
}

impl Theme {
    /// Palette of the original wall scripts.
    pub fn classic() -> Self {
        let markers = BTreeMap::from([
            (
                MarkerKind::Start,
                MarkerStyle::new("rgb(76,175,80)", MarkerShape::Rectangle, "#FFFFFF"),
            ),
            (
                MarkerKind::Finish,
                MarkerStyle::new("rgb(244,67,54)", MarkerShape::Rectangle, "#FFFFFF"),
            ),
            (
                MarkerKind::LeftHand,
                MarkerStyle::new("rgb(33,150,243)", MarkerShape::Circle, "#FFFFFF"),
            ),
            (
                MarkerKind::RightHand,
                MarkerStyle::new("rgb(255,193,7)", MarkerShape::Circle, "#000000"),
            ),
            (
                MarkerKind::BothHands,
                MarkerStyle::new("rgb(156,39,176)", MarkerShape::Circle, "#FFFFFF"),
            ),
            (
                MarkerKind::Foot,
                MarkerStyle::new("rgba(205,220,57,0.706)", MarkerShape::Circle, "#FFFFFF"),
            ),
        ]);
        Self {
            markers,
            index_marker: MarkerStyle::new("rgb(255,255,0)", MarkerShape::Circle, "#FF0000"),
            center_dot_color: "rgba(255,255,255,0.863)".to_string(),
            arrow_color: "rgba(255,255,255,0.85)".to_string(),
            text_outline_color: "#000000".to_string(),
            title_color: "#FFFFFF".to_string(),
            beta_text_color: "#FFFFFF".to_string(),
            beta_background: "rgba(0,0,0,0.6)".to_string(),
            band_background: "#202020".to_string(),
        }
    }

    /// Saturated rings and an opaque guidance panel for dim or busy photos.
    pub fn high_contrast() -> Self {
        let mut theme = Self::classic();
        for (kind, outline) in [
            (MarkerKind::Start, "#00E676"),
            (MarkerKind::Finish, "#FF1744"),
            (MarkerKind::LeftHand, "#2979FF"),
            (MarkerKind::RightHand, "#FFEA00"),
            (MarkerKind::BothHands, "#D500F9"),
            (MarkerKind::Foot, "#C6FF00"),
        ] {
            if let Some(style) = theme.markers.get_mut(&kind) {
                style.outline = outline.to_string();
            }
        }
        theme.arrow_color = "#FFFFFF".to_string();
        theme.center_dot_color = "#FFFFFF".to_string();
        theme.beta_background = "rgba(0,0,0,0.85)".to_string();
        theme.band_background = "#000000".to_string();
        theme
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" | "default" => Some(Self::classic()),
            "high-contrast" | "high_contrast" | "contrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }

    /// Style for `kind`, falling back to a neutral ring when the theme has none.
    pub fn marker_style(&self, kind: MarkerKind) -> MarkerStyle {
        self.markers.get(&kind).cloned().unwrap_or_default()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_covers_every_kind() {
        let theme = Theme::classic();
        for kind in MarkerKind::ALL {
            assert!(theme.markers.contains_key(&kind), "{kind:?} has no style");
        }
        assert_eq!(
            theme.marker_style(MarkerKind::Start).shape,
            MarkerShape::Rectangle
        );
    }

    #[test]
    fn missing_style_falls_back_to_default() {
        let mut theme = Theme::classic();
        theme.markers.remove(&MarkerKind::BothHands);
        assert_eq!(theme.marker_style(MarkerKind::BothHands), MarkerStyle::default());
    }

    #[test]
    fn fallback_labels_match_move_kinds() {
        let labels: Vec<_> = MarkerKind::ALL
            .iter()
            .map(|kind| kind.fallback_label())
            .collect();
        assert_eq!(
            labels,
            vec![Some("S"), Some("F"), Some("L"), Some("R"), Some("B"), None]
        );
    }

    #[test]
    fn theme_lookup_by_name() {
        assert!(Theme::by_name("classic").is_some());
        assert!(Theme::by_name("High-Contrast").is_some());
        assert!(Theme::by_name("neon").is_none());
    }
}
