use crate::theme::{MarkerKind, MarkerShape, Theme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where the beta block goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetaPlacement {
    /// Over the photo, in the first corner free of markers and the title.
    #[default]
    Overlay,
    /// In a band appended below the photo.
    Extend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// At most `wrap_width` characters per line.
    #[default]
    Chars,
    /// Measured width limited to `wrap_width` average glyphs.
    Pixels,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub marker_radius: f32,
    pub marker_outline_width: f32,
    pub center_dot_radius: f32,
    pub label_offset: f32,
    pub label_font_size: f32,
    pub label_outline_width: f32,
    pub arrow_width: f32,
    pub arrow_head_length: f32,
    pub arrow_head_angle: f32,
    /// Distance trimmed from both arrow ends so shafts run ring to ring.
    pub arrow_inset: f32,
    pub title_font_size: f32,
    pub title_margin: f32,
    pub title_wrap_width: usize,
    pub title_outline_width: f32,
    pub beta_font_size: f32,
    pub beta_wrap_width: usize,
    pub beta_padding: f32,
    pub beta_margin: f32,
    pub beta_placement: BetaPlacement,
    pub line_spacing: f32,
    pub wrap_mode: WrapMode,
    pub index_marker_radius: f32,
    pub index_font_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            marker_radius: 18.0,
            marker_outline_width: 6.0,
            center_dot_radius: 4.0,
            label_offset: 45.0,
            label_font_size: 70.0,
            label_outline_width: 2.0,
            arrow_width: 4.0,
            arrow_head_length: 30.0,
            arrow_head_angle: 25.0,
            arrow_inset: 18.0,
            title_font_size: 60.0,
            title_margin: 50.0,
            title_wrap_width: 40,
            title_outline_width: 2.0,
            beta_font_size: 40.0,
            beta_wrap_width: 30,
            beta_padding: 20.0,
            beta_margin: 50.0,
            beta_placement: BetaPlacement::Overlay,
            line_spacing: 10.0,
            wrap_mode: WrapMode::Chars,
            index_marker_radius: 10.0,
            index_font_size: 24.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Palette size for the indexed PNG; `None` writes full RGBA.
    pub quantize_colors: Option<u16>,
    /// NeuQuant sampling factor, 1 (best) to 30 (fastest).
    pub quantize_speed: i32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            quantize_colors: Some(256),
            quantize_speed: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    pub title: Option<PathBuf>,
    pub label: Option<PathBuf>,
    pub beta: Option<PathBuf>,
    /// Family used when a font file is missing or not configured.
    pub fallback_family: String,
    pub load_system_fonts: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            title: None,
            label: None,
            beta: None,
            fallback_family: "sans-serif".to_string(),
            load_system_fonts: true,
        }
    }
}

/// Ids a complete wall is expected to carry: `1..=numeric_ids` plus `a..=z`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    pub numeric_ids: u32,
    pub letter_ids: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            numeric_ids: 140,
            letter_ids: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub fonts: FontConfig,
    pub check: CheckConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkerStyleFile {
    outline: Option<String>,
    shape: Option<MarkerShape>,
    text_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    center_dot_color: Option<String>,
    arrow_color: Option<String>,
    text_outline_color: Option<String>,
    title_color: Option<String>,
    beta_text_color: Option<String>,
    beta_background: Option<String>,
    band_background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    marker_radius: Option<f32>,
    marker_outline_width: Option<f32>,
    center_dot_radius: Option<f32>,
    label_offset: Option<f32>,
    label_font_size: Option<f32>,
    label_outline_width: Option<f32>,
    arrow_width: Option<f32>,
    arrow_head_length: Option<f32>,
    arrow_head_angle: Option<f32>,
    arrow_inset: Option<f32>,
    title_font_size: Option<f32>,
    title_margin: Option<f32>,
    title_wrap_width: Option<usize>,
    title_outline_width: Option<f32>,
    beta_font_size: Option<f32>,
    beta_wrap_width: Option<usize>,
    beta_padding: Option<f32>,
    beta_margin: Option<f32>,
    beta_placement: Option<BetaPlacement>,
    line_spacing: Option<f32>,
    wrap_mode: Option<WrapMode>,
    index_marker_radius: Option<f32>,
    index_font_size: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    /// `0` turns quantization off.
    quantize_colors: Option<u16>,
    quantize_speed: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FontConfigFile {
    title: Option<PathBuf>,
    label: Option<PathBuf>,
    beta: Option<PathBuf>,
    /// Sets title, label and beta at once; the specific keys win.
    all: Option<PathBuf>,
    fallback_family: Option<String>,
    load_system_fonts: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckConfigFile {
    numeric_ids: Option<u32>,
    letter_ids: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    markers: Option<BTreeMap<String, MarkerStyleFile>>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
    fonts: Option<FontConfigFile>,
    check: Option<CheckConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    // Relative font paths are taken relative to the config file.
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(resolve_font_paths(config, base))
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents).map_err(|_| json_err)?,
    };
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme '{theme_name}'"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.center_dot_color {
            config.theme.center_dot_color = v;
        }
        if let Some(v) = vars.arrow_color {
            config.theme.arrow_color = v;
        }
        if let Some(v) = vars.text_outline_color {
            config.theme.text_outline_color = v;
        }
        if let Some(v) = vars.title_color {
            config.theme.title_color = v;
        }
        if let Some(v) = vars.beta_text_color {
            config.theme.beta_text_color = v;
        }
        if let Some(v) = vars.beta_background {
            config.theme.beta_background = v;
        }
        if let Some(v) = vars.band_background {
            config.theme.band_background = v;
        }
    }

    if let Some(markers) = parsed.markers {
        for (name, file) in markers {
            if name.eq_ignore_ascii_case("index") {
                apply_marker_style(&mut config.theme.index_marker, file);
                continue;
            }
            let kind = MarkerKind::from_name(&name)
                .ok_or_else(|| anyhow::anyhow!("unknown marker kind '{name}'"))?;
            let style = config.theme.markers.entry(kind).or_default();
            apply_marker_style(style, file);
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.marker_radius {
            target.marker_radius = v;
        }
        if let Some(v) = layout.marker_outline_width {
            target.marker_outline_width = v;
        }
        if let Some(v) = layout.center_dot_radius {
            target.center_dot_radius = v;
        }
        if let Some(v) = layout.label_offset {
            target.label_offset = v;
        }
        if let Some(v) = layout.label_font_size {
            target.label_font_size = v;
        }
        if let Some(v) = layout.label_outline_width {
            target.label_outline_width = v;
        }
        if let Some(v) = layout.arrow_width {
            target.arrow_width = v;
        }
        if let Some(v) = layout.arrow_head_length {
            target.arrow_head_length = v;
        }
        if let Some(v) = layout.arrow_head_angle {
            target.arrow_head_angle = v;
        }
        if let Some(v) = layout.arrow_inset {
            target.arrow_inset = v;
        }
        if let Some(v) = layout.title_font_size {
            target.title_font_size = v;
        }
        if let Some(v) = layout.title_margin {
            target.title_margin = v;
        }
        if let Some(v) = layout.title_wrap_width {
            target.title_wrap_width = v;
        }
        if let Some(v) = layout.title_outline_width {
            target.title_outline_width = v;
        }
        if let Some(v) = layout.beta_font_size {
            target.beta_font_size = v;
        }
        if let Some(v) = layout.beta_wrap_width {
            target.beta_wrap_width = v;
        }
        if let Some(v) = layout.beta_padding {
            target.beta_padding = v;
        }
        if let Some(v) = layout.beta_margin {
            target.beta_margin = v;
        }
        if let Some(v) = layout.beta_placement {
            target.beta_placement = v;
        }
        if let Some(v) = layout.line_spacing {
            target.line_spacing = v;
        }
        if let Some(v) = layout.wrap_mode {
            target.wrap_mode = v;
        }
        if let Some(v) = layout.index_marker_radius {
            target.index_marker_radius = v;
        }
        if let Some(v) = layout.index_font_size {
            target.index_font_size = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.quantize_colors {
            config.render.quantize_colors = (v > 0).then_some(v.min(256));
        }
        if let Some(v) = render.quantize_speed {
            config.render.quantize_speed = v.clamp(1, 30);
        }
    }

    if let Some(fonts) = parsed.fonts {
        if let Some(all) = fonts.all {
            config.fonts.title = Some(all.clone());
            config.fonts.label = Some(all.clone());
            config.fonts.beta = Some(all);
        }
        if let Some(v) = fonts.title {
            config.fonts.title = Some(v);
        }
        if let Some(v) = fonts.label {
            config.fonts.label = Some(v);
        }
        if let Some(v) = fonts.beta {
            config.fonts.beta = Some(v);
        }
        if let Some(v) = fonts.fallback_family {
            config.fonts.fallback_family = v;
        }
        if let Some(v) = fonts.load_system_fonts {
            config.fonts.load_system_fonts = v;
        }
    }

    if let Some(check) = parsed.check {
        if let Some(v) = check.numeric_ids {
            config.check.numeric_ids = v;
        }
        if let Some(v) = check.letter_ids {
            config.check.letter_ids = v;
        }
    }

    Ok(config)
}

fn apply_marker_style(style: &mut crate::theme::MarkerStyle, file: MarkerStyleFile) {
    if let Some(v) = file.outline {
        style.outline = v;
    }
    if let Some(v) = file.shape {
        style.shape = v;
    }
    if let Some(v) = file.text_color {
        style.text_color = v;
    }
}

fn resolve_font_paths(mut config: Config, base: &Path) -> Config {
    for slot in [
        &mut config.fonts.title,
        &mut config.fonts.label,
        &mut config.fonts.beta,
    ] {
        if let Some(path) = slot.as_mut()
            && path.is_relative()
        {
            *path = base.join(&*path);
        }
    }
    config
}
