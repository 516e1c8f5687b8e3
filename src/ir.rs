use std::collections::BTreeMap;

use serde::Serialize;

use crate::geometry::Point;
use crate::theme::MarkerKind;

/// Hold id to pixel position. Ids are matched case-insensitively.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HoldMap {
    coords: BTreeMap<String, Point>,
}

impl HoldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize_id(id: &str) -> String {
        id.trim().to_lowercase()
    }

    /// Inserts a hold, returning the previous position stored under the same
    /// normalized id.
    pub fn insert(&mut self, id: &str, point: Point) -> Option<Point> {
        self.coords.insert(Self::normalize_id(id), point)
    }

    pub fn get(&self, id: &str) -> Option<Point> {
        self.coords.get(&Self::normalize_id(id)).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.coords.contains_key(&Self::normalize_id(id))
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Point)> {
        self.coords.iter().map(|(id, p)| (id.as_str(), *p))
    }
}

impl<S: AsRef<str>> FromIterator<(S, Point)> for HoldMap {
    fn from_iter<I: IntoIterator<Item = (S, Point)>>(iter: I) -> Self {
        let mut map = HoldMap::new();
        for (id, point) in iter {
            map.insert(id.as_ref(), point);
        }
        map
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    Start,
    Finish,
}

impl MoveType {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "finish" | "top" => Some(Self::Finish),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Left,
    Right,
    Both,
}

impl Hand {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Self::Left),
            "right" | "r" => Some(Self::Right),
            "both" | "b" | "match" => Some(Self::Both),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Move {
    pub hold_id: String,
    pub kind: Option<MoveType>,
    pub hand: Option<Hand>,
    pub text: Option<String>,
}

impl Move {
    pub fn new(hold_id: impl Into<String>) -> Self {
        Self {
            hold_id: hold_id.into(),
            kind: None,
            hand: None,
            text: None,
        }
    }

    pub fn start(hold_id: impl Into<String>) -> Self {
        Self {
            kind: Some(MoveType::Start),
            ..Self::new(hold_id)
        }
    }

    pub fn finish(hold_id: impl Into<String>) -> Self {
        Self {
            kind: Some(MoveType::Finish),
            ..Self::new(hold_id)
        }
    }

    pub fn hand(hold_id: impl Into<String>, hand: Hand) -> Self {
        Self {
            hand: Some(hand),
            ..Self::new(hold_id)
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// `type` wins over `hand`; a move with neither has no marker.
    pub fn marker_kind(&self) -> Option<MarkerKind> {
        match (self.kind, self.hand) {
            (Some(MoveType::Start), _) => Some(MarkerKind::Start),
            (Some(MoveType::Finish), _) => Some(MarkerKind::Finish),
            (None, Some(Hand::Left)) => Some(MarkerKind::LeftHand),
            (None, Some(Hand::Right)) => Some(MarkerKind::RightHand),
            (None, Some(Hand::Both)) => Some(MarkerKind::BothHands),
            (None, None) => None,
        }
    }

    /// Explicit text, else the kind's single-letter fallback. `None` for a
    /// move that gets no marker, whatever its text.
    pub fn label(&self) -> Option<String> {
        let kind = self.marker_kind()?;
        if let Some(text) = self.text.as_deref().map(str::trim)
            && !text.is_empty()
        {
            return Some(text.to_string());
        }
        kind.fallback_label().map(str::to_string)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Route {
    pub name: String,
    pub difficulty: String,
    pub author: String,
    pub moves: Vec<Move>,
    /// Foot holds; order carries no meaning and ids are unique.
    pub foot: Vec<String>,
    pub beta: Option<String>,
}

impl Route {
    pub fn new(name: impl Into<String>, difficulty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            difficulty: difficulty.into(),
            ..Self::default()
        }
    }

    pub fn title(&self) -> String {
        let name = non_empty_or(&self.name, "Untitled");
        let difficulty = non_empty_or(&self.difficulty, "?");
        let author = non_empty_or(&self.author, "anonymous");
        format!("{name} | {difficulty} | by {author}")
    }

    /// Adds a foot hold unless an id equal under hold-map normalization is
    /// already present.
    pub fn add_foot(&mut self, hold_id: impl Into<String>) {
        let hold_id = hold_id.into();
        let key = HoldMap::normalize_id(&hold_id);
        if !self.foot.iter().any(|id| HoldMap::normalize_id(id) == key) {
            self.foot.push(hold_id);
        }
    }

    pub fn beta_text(&self) -> Option<&str> {
        self.beta.as_deref().map(str::trim).filter(|b| !b.is_empty())
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { fallback } else { trimmed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_lookup_is_case_insensitive() {
        let mut holds = HoldMap::new();
        holds.insert("A", Point::new(1.0, 2.0));
        holds.insert(" 12 ", Point::new(3.0, 4.0));
        assert_eq!(holds.get("a"), Some(Point::new(1.0, 2.0)));
        assert_eq!(holds.get("A"), Some(Point::new(1.0, 2.0)));
        assert_eq!(holds.get("12"), Some(Point::new(3.0, 4.0)));
        assert!(holds.get("b").is_none());
    }

    #[test]
    fn type_takes_precedence_over_hand() {
        let mut mv = Move::start("1");
        mv.hand = Some(Hand::Left);
        assert_eq!(mv.marker_kind(), Some(MarkerKind::Start));
        assert_eq!(mv.label().as_deref(), Some("S"));
    }

    #[test]
    fn move_without_type_or_hand_has_no_marker() {
        let mv = Move::new("7");
        assert_eq!(mv.marker_kind(), None);
        assert_eq!(mv.label(), None);
        assert_eq!(Move::new("7").with_text("undercling").label(), None);
    }

    #[test]
    fn explicit_text_overrides_fallback_label() {
        let mv = Move::hand("3", Hand::Right).with_text("crimp");
        assert_eq!(mv.label().as_deref(), Some("crimp"));
        let blank = Move::hand("3", Hand::Both).with_text("  ");
        assert_eq!(blank.label().as_deref(), Some("B"));
    }

    #[test]
    fn foot_holds_are_deduplicated() {
        let mut route = Route::new("r", "V2");
        route.add_foot("a");
        route.add_foot("A");
        route.add_foot("5");
        assert_eq!(route.foot, vec!["a".to_string(), "5".to_string()]);
    }

    #[test]
    fn title_fills_missing_fields() {
        let route = Route::default();
        assert_eq!(route.title(), "Untitled | ? | by anonymous");
    }
}
