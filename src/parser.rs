//! Ingestion of the hold map and route database.
//!
//! Input files come from several generations of tooling, so field names and
//! id types vary. Everything is normalized here into [`HoldMap`] and
//! [`Route`]; the layout code never sees the raw shapes.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{RenderError, RenderResult};
use crate::geometry::Point;
use crate::ir::{Hand, HoldMap, Move, MoveType, Route};

/// Hold ids appear both as strings and as bare integers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s.trim().to_string(),
            RawId::Int(n) => n.to_string(),
            RawId::Float(f) if f.fract() == 0.0 => format!("{}", f as i64),
            RawId::Float(f) => f.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
struct RawMove {
    hold_id: RawId,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    hand: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawHolds {
    #[serde(default)]
    foot: Vec<RawId>,
}

/// Name and grade spellings are separate fields rather than serde aliases:
/// some records carry two of them, and aliases reject that as a duplicate.
#[derive(Debug, Deserialize)]
struct RawRoute {
    #[serde(default, rename = "routeName")]
    route_name_camel: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    route_name: Option<String>,
    #[serde(default)]
    difficulty: Option<RawId>,
    #[serde(default)]
    grade: Option<RawId>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    moves: Vec<RawMove>,
    #[serde(default)]
    holds: RawHolds,
    #[serde(default)]
    beta: Option<String>,
}

impl RawRoute {
    fn normalize(self) -> Route {
        // routeName > name > route_name, difficulty > grade; blanks are skipped.
        let name = [self.route_name_camel, self.name, self.route_name]
            .into_iter()
            .flatten()
            .map(|name| name.trim().to_string())
            .find(|name| !name.is_empty())
            .unwrap_or_default();
        let difficulty = [self.difficulty, self.grade]
            .into_iter()
            .flatten()
            .map(RawId::into_string)
            .find(|grade| !grade.is_empty())
            .unwrap_or_default();
        let mut route = Route {
            name,
            difficulty,
            author: self.author.unwrap_or_default().trim().to_string(),
            moves: Vec::with_capacity(self.moves.len()),
            foot: Vec::new(),
            beta: self.beta,
        };
        for raw in self.moves {
            route.moves.push(Move {
                hold_id: raw.hold_id.into_string(),
                kind: raw.kind.as_deref().and_then(MoveType::from_token),
                hand: raw.hand.as_deref().and_then(Hand::from_token),
                text: raw.text,
            });
        }
        for id in self.holds.foot {
            route.add_foot(id.into_string());
        }
        route
    }
}

/// Parses JSON, falling back to JSON5 for hand-edited files with comments or
/// trailing commas.
fn parse_value(input: &str, what: &'static str) -> RenderResult<Value> {
    match serde_json::from_str::<Value>(input) {
        Ok(value) => Ok(value),
        Err(json_err) => json5::from_str::<Value>(input)
            .map_err(|_| RenderError::parse(what, json_err.to_string())),
    }
}

pub fn parse_hold_map(input: &str) -> RenderResult<HoldMap> {
    let value = parse_value(input, "hold map")?;
    let Value::Object(entries) = value else {
        return Err(RenderError::parse(
            "hold map",
            "expected an object of id -> {x, y}",
        ));
    };
    let mut holds = HoldMap::new();
    for (id, raw) in entries {
        let point: RawPoint = serde_json::from_value(raw)
            .map_err(|err| RenderError::parse("hold map", format!("hold '{id}': {err}")))?;
        if holds.insert(&id, Point::new(point.x, point.y)).is_some() {
            tracing::debug!(hold_id = %id, "hold id repeated with different case, last one wins");
        }
    }
    Ok(holds)
}

/// Accepts `{"routes": [...]}`, a bare array, or a single route object.
pub fn parse_routes(input: &str) -> RenderResult<Vec<Route>> {
    let value = parse_value(input, "route database")?;
    let raw_routes: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("routes") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(RenderError::parse(
                    "route database",
                    "'routes' must be an array",
                ));
            }
            None => vec![Value::Object(map)],
        },
        _ => {
            return Err(RenderError::parse(
                "route database",
                "expected an object or an array of routes",
            ));
        }
    };

    raw_routes
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            serde_json::from_value::<RawRoute>(raw)
                .map(RawRoute::normalize)
                .map_err(|err| RenderError::parse("route database", format!("route #{idx}: {err}")))
        })
        .collect()
}

fn read_asset(path: &Path, what: &'static str) -> RenderResult<String> {
    std::fs::read_to_string(path).map_err(|source| RenderError::MissingAsset {
        what,
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_hold_map(path: &Path) -> RenderResult<HoldMap> {
    let holds = parse_hold_map(&read_asset(path, "hold map")?)?;
    tracing::debug!(path = %path.display(), holds = holds.len(), "loaded hold map");
    Ok(holds)
}

pub fn load_routes(path: &Path) -> RenderResult<Vec<Route>> {
    let routes = parse_routes(&read_asset(path, "route database")?)?;
    tracing::debug!(path = %path.display(), routes = routes.len(), "loaded route database");
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::MarkerKind;

    #[test]
    fn hold_map_accepts_mixed_case_and_floats() {
        let holds = parse_hold_map(r#"{"1": {"x": 100, "y": 800}, "B": {"x": 1.5, "y": 2}}"#)
            .expect("parse");
        assert_eq!(holds.len(), 2);
        assert_eq!(holds.get("b"), Some(Point::new(1.5, 2.0)));
    }

    #[test]
    fn hold_map_rejects_arrays() {
        let err = parse_hold_map("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("hold map"));
    }

    #[test]
    fn hold_map_reports_bad_entry() {
        let err = parse_hold_map(r#"{"7": {"x": 1}}"#).unwrap_err();
        assert!(err.to_string().contains("hold '7'"), "{err}");
    }

    #[test]
    fn routes_accept_wrapped_bare_and_single_shapes() {
        let wrapped = r#"{"routes": [{"routeName": "A", "difficulty": "V1", "moves": []}]}"#;
        let bare = r#"[{"name": "B", "grade": "V2"}]"#;
        let single = r#"{"route_name": "C", "difficulty": 4, "moves": [{"hold_id": 3, "type": "start"}]}"#;
        assert_eq!(parse_routes(wrapped).unwrap()[0].name, "A");
        let b = &parse_routes(bare).unwrap()[0];
        assert_eq!((b.name.as_str(), b.difficulty.as_str()), ("B", "V2"));
        let c = &parse_routes(single).unwrap()[0];
        assert_eq!(c.difficulty, "4");
        assert_eq!(c.moves[0].hold_id, "3");
        assert_eq!(c.moves[0].marker_kind(), Some(MarkerKind::Start));
    }

    #[test]
    fn routes_tolerate_several_name_spellings() {
        let input = r#"[
            {"routeName": "Ladder", "name": "ladder", "difficulty": "V3", "grade": "6a"},
            {"name": "  ", "route_name": "Slab", "difficulty": "", "grade": 2},
            {"route_name": "Roof", "routeName": null}
        ]"#;
        let routes = parse_routes(input).expect("duplicate spellings are tolerated");
        let fields: Vec<_> = routes
            .iter()
            .map(|r| (r.name.as_str(), r.difficulty.as_str()))
            .collect();
        assert_eq!(fields, vec![("Ladder", "V3"), ("Slab", "2"), ("Roof", "")]);
    }

    #[test]
    fn routes_normalize_moves_and_feet() {
        let input = r#"{
            "routeName": "Ladder",
            "difficulty": "V3",
            "author": "kai",
            "moves": [
                {"hold_id": "1", "type": "start"},
                {"hold_id": 2, "hand": "left", "text": "gaston"},
                {"hold_id": "3", "hand": "sideways"}
            ],
            "holds": {"foot": ["a", "A", 4]},
            "beta": "Stay low"
        }"#;
        let route = parse_routes(input).unwrap().remove(0);
        assert_eq!(route.author, "kai");
        assert_eq!(route.moves[1].label().as_deref(), Some("gaston"));
        assert_eq!(route.moves[2].marker_kind(), None);
        assert_eq!(route.foot, vec!["a".to_string(), "4".to_string()]);
        assert_eq!(route.beta_text(), Some("Stay low"));
    }

    #[test]
    fn routes_fall_back_to_json5() {
        let input = "// hand edited\n[{name: 'Slab', grade: 'V0',},]";
        let routes = parse_routes(input).expect("json5 fallback");
        assert_eq!(routes[0].name, "Slab");
    }

    #[test]
    fn missing_file_is_a_missing_asset() {
        let err = load_routes(Path::new("/nonexistent/routes.json")).unwrap_err();
        assert!(matches!(err, RenderError::MissingAsset { what: "route database", .. }));
    }
}
