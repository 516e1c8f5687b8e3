use fontdb::{Database, Family, Query, Source, Stretch, Style, Weight, ID};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ttf_parser::Face;

use crate::config::FontConfig;
use crate::error::Warning;

/// Which text a font is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontRole {
    Title,
    Label,
    Beta,
}

impl FontRole {
    pub fn name(self) -> &'static str {
        match self {
            FontRole::Title => "title",
            FontRole::Label => "label",
            FontRole::Beta => "beta",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalMetrics {
    pub ascent: f32,
    pub descent: f32,
}

impl VerticalMetrics {
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Drawn when neither the fallback family nor any installed face resolves.
/// Tuffy, public domain (`assets/fonts/LICENSE-Tuffy.txt`).
static BUILTIN_FONT: &[u8] = include_bytes!("../assets/fonts/Tuffy.ttf");

#[derive(Debug, Clone)]
struct LoadedFont {
    family: String,
    face: Option<ID>,
}

/// Fonts for the three text roles plus the database the rasterizer draws from.
///
/// Measurement goes through the same faces the renderer uses, so wrapped
/// blocks and right-aligned titles line up with the drawn glyphs.
#[derive(Clone)]
pub struct FontSet {
    db: Arc<Database>,
    title: LoadedFont,
    label: LoadedFont,
    beta: LoadedFont,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("faces", &self.db.len())
            .field("title", &self.title)
            .field("label", &self.label)
            .field("beta", &self.beta)
            .finish()
    }
}

impl FontSet {
    /// Measures text with the built-in width table and draws it with the
    /// bundled face, registered as `sans-serif`. Layout does not depend on
    /// the host's fonts; useful for tests and headless layout.
    pub fn fallback() -> Self {
        let mut db = Database::new();
        if let Some(builtin) = load_builtin(&mut db) {
            db.set_sans_serif_family(builtin.family);
        }
        let generic = LoadedFont {
            family: "sans-serif".to_string(),
            face: None,
        };
        Self {
            db: Arc::new(db),
            title: generic.clone(),
            label: generic.clone(),
            beta: generic,
        }
    }

    /// Loads the configured font files. A file that cannot be read or holds no
    /// usable face is replaced by the fallback family and reported.
    pub fn load(config: &FontConfig) -> (Self, Vec<Warning>) {
        let mut db = Database::new();
        if config.load_system_fonts {
            db.load_system_fonts();
        }
        let mut warnings = Vec::new();
        let fallback = resolve_fallback(&mut db, &config.fallback_family, &mut warnings);

        let mut by_path: HashMap<PathBuf, Option<LoadedFont>> = HashMap::new();
        let mut pick = |role: FontRole, path: Option<&Path>, db: &mut Database| -> LoadedFont {
            let Some(path) = path else {
                return fallback.clone();
            };
            let loaded = by_path
                .entry(path.to_path_buf())
                .or_insert_with(|| load_font_file(db, path))
                .clone();
            match loaded {
                Some(font) => font,
                None => {
                    let warning = Warning::FontUnavailable {
                        role: role.name().to_string(),
                        path: path.to_path_buf(),
                    };
                    tracing::warn!("{warning}");
                    warnings.push(warning);
                    fallback.clone()
                }
            }
        };

        let title = pick(FontRole::Title, config.title.as_deref(), &mut db);
        let label = pick(FontRole::Label, config.label.as_deref(), &mut db);
        let beta = pick(FontRole::Beta, config.beta.as_deref(), &mut db);

        tracing::debug!(
            faces = db.len(),
            title = %title.family,
            label = %label.family,
            beta = %beta.family,
            "fonts ready"
        );

        (
            Self {
                db: Arc::new(db),
                title,
                label,
                beta,
            },
            warnings,
        )
    }

    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }

    fn font(&self, role: FontRole) -> &LoadedFont {
        match role {
            FontRole::Title => &self.title,
            FontRole::Label => &self.label,
            FontRole::Beta => &self.beta,
        }
    }

    pub fn family(&self, role: FontRole) -> &str {
        &self.font(role).family
    }

    pub fn has_face(&self, role: FontRole) -> bool {
        self.font(role).face.is_some()
    }

    /// Advance width of `text`, or `None` when the role has no face.
    pub fn measure_width(&self, role: FontRole, text: &str, font_size: f32) -> Option<f32> {
        if text.is_empty() || font_size <= 0.0 {
            return Some(0.0);
        }
        let id = self.font(role).face?;
        self.db
            .with_face_data(id, |data, index| {
                let face = Face::parse(data, index).ok()?;
                Some(measure_face_width(&face, text, font_size))
            })
            .flatten()
    }

    pub fn vertical_metrics(&self, role: FontRole, font_size: f32) -> Option<VerticalMetrics> {
        let id = self.font(role).face?;
        self.db
            .with_face_data(id, |data, index| {
                let face = Face::parse(data, index).ok()?;
                let scale = font_size / face.units_per_em().max(1) as f32;
                Some(VerticalMetrics {
                    ascent: face.ascender() as f32 * scale,
                    descent: -(face.descender() as f32) * scale,
                })
            })
            .flatten()
    }

    pub fn average_char_width(&self, role: FontRole, font_size: f32) -> Option<f32> {
        if font_size <= 0.0 {
            return None;
        }
        let sample = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let width = self.measure_width(role, sample, font_size)?;
        let count = sample.chars().count().max(1) as f32;
        Some(width / count)
    }
}

fn measure_face_width(face: &Face<'_>, text: &str, font_size: f32) -> f32 {
    let scale = font_size / face.units_per_em().max(1) as f32;
    let fallback = font_size * 0.56;
    let mut width = 0.0f32;
    for ch in text.chars() {
        if ch == '\n' {
            continue;
        }
        let ch = if ch == '\t' { ' ' } else { ch };
        match face
            .glyph_index(ch)
            .and_then(|glyph| face.glyph_hor_advance(glyph))
        {
            Some(advance) => width += advance as f32 * scale,
            None => width += fallback,
        }
    }
    width.max(0.0)
}

fn load_font_file(db: &mut Database, path: &Path) -> Option<LoadedFont> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "font file unreadable");
            return None;
        }
    };
    register_face(db, Source::Binary(Arc::new(bytes)))
}

fn load_builtin(db: &mut Database) -> Option<LoadedFont> {
    register_face(db, Source::Binary(Arc::new(BUILTIN_FONT)))
}

fn register_face(db: &mut Database, source: Source) -> Option<LoadedFont> {
    let ids = db.load_font_source(source);
    let id = *ids.first()?;
    let family = db
        .face(id)
        .and_then(|info| info.families.first())
        .map(|(name, _)| name.clone())?;
    Some(LoadedFont {
        family,
        face: Some(id),
    })
}

/// Resolves the fallback family list to a face. When a generic family maps to
/// a font the system lacks, the first installed face stands in for it; with no
/// installed faces at all the bundled face is used and reported.
fn resolve_fallback(
    db: &mut Database,
    font_family: &str,
    warnings: &mut Vec<Warning>,
) -> LoadedFont {
    #[derive(Clone, Copy)]
    enum FamilyToken {
        Generic(Family<'static>),
        Name(usize),
    }

    let mut names: Vec<String> = Vec::new();
    let mut order: Vec<FamilyToken> = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        match raw.to_ascii_lowercase().as_str() {
            "serif" => order.push(FamilyToken::Generic(Family::Serif)),
            "sans-serif" | "system-ui" => order.push(FamilyToken::Generic(Family::SansSerif)),
            "monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
            "cursive" => order.push(FamilyToken::Generic(Family::Cursive)),
            "fantasy" => order.push(FamilyToken::Generic(Family::Fantasy)),
            _ => {
                order.push(FamilyToken::Name(names.len()));
                names.push(raw.to_string());
            }
        }
    }
    if order.is_empty() {
        order.push(FamilyToken::Generic(Family::SansSerif));
    }

    let families: Vec<Family<'_>> = order
        .iter()
        .map(|token| match *token {
            FamilyToken::Generic(family) => family,
            FamilyToken::Name(idx) => Family::Name(names[idx].as_str()),
        })
        .collect();
    let query = Query {
        families: &families,
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };
    if let Some(id) = db.query(&query) {
        return LoadedFont {
            family: font_family.to_string(),
            face: Some(id),
        };
    }

    let first = db
        .faces()
        .next()
        .and_then(|info| info.families.first().map(|(name, _)| (info.id, name.clone())));
    match first {
        Some((id, name)) => {
            db.set_sans_serif_family(name.clone());
            LoadedFont {
                family: name,
                face: Some(id),
            }
        }
        None => match load_builtin(db) {
            Some(builtin) => {
                db.set_sans_serif_family(builtin.family.clone());
                let warning = Warning::BuiltinFont {
                    requested: font_family.to_string(),
                };
                tracing::warn!("{warning}");
                warnings.push(warning);
                builtin
            }
            None => LoadedFont {
                family: font_family.to_string(),
                face: None,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_set_measures_with_the_table_but_can_draw() {
        let fonts = FontSet::fallback();
        assert!(!fonts.has_face(FontRole::Title));
        assert_eq!(fonts.measure_width(FontRole::Label, "abc", 20.0), None);
        assert_eq!(fonts.vertical_metrics(FontRole::Beta, 20.0), None);
        assert_eq!(fonts.family(FontRole::Beta), "sans-serif");

        let db = fonts.database();
        let query = Query {
            families: &[Family::SansSerif],
            ..Query::default()
        };
        assert!(db.query(&query).is_some());
    }

    #[test]
    fn no_installed_fonts_uses_the_bundled_face() {
        let config = FontConfig {
            title: None,
            label: None,
            beta: None,
            fallback_family: "sans-serif".to_string(),
            load_system_fonts: false,
        };
        let (fonts, warnings) = FontSet::load(&config);
        assert_eq!(
            warnings,
            vec![Warning::BuiltinFont {
                requested: "sans-serif".to_string()
            }]
        );
        for role in [FontRole::Title, FontRole::Label, FontRole::Beta] {
            assert!(fonts.has_face(role), "{} has no face", role.name());
        }
        let width = fonts
            .measure_width(FontRole::Title, "Warm Up", 24.0)
            .expect("bundled face measures");
        assert!(width > 0.0);
    }

    #[test]
    fn empty_text_measures_zero_without_a_face() {
        let fonts = FontSet::fallback();
        assert_eq!(fonts.measure_width(FontRole::Title, "", 20.0), Some(0.0));
    }

    #[test]
    fn missing_font_file_warns_and_falls_back() {
        let config = FontConfig {
            title: Some(PathBuf::from("/nonexistent/title.ttf")),
            label: Some(PathBuf::from("/nonexistent/title.ttf")),
            beta: None,
            fallback_family: "sans-serif".to_string(),
            load_system_fonts: false,
        };
        let (fonts, warnings) = FontSet::load(&config);
        assert_eq!(warnings.len(), 3);
        assert!(matches!(&warnings[0], Warning::BuiltinFont { .. }));
        assert!(matches!(
            &warnings[1],
            Warning::FontUnavailable { role, .. } if role == "title"
        ));
        assert!(matches!(
            &warnings[2],
            Warning::FontUnavailable { role, .. } if role == "label"
        ));
        assert_eq!(fonts.family(FontRole::Title), fonts.family(FontRole::Beta));
        assert!(fonts.has_face(FontRole::Title));
    }
}
