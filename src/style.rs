use serde::{Deserialize, Serialize};

use crate::error::{LadderError, Result};

const CLASSIC_BACKGROUND: &str = "#f9fafb";
const CLASSIC_FRAME: &str = "#000000";
const CLASSIC_GUIDE: &str = "#888888";
const CLASSIC_VALUE: &str = "#ffd700";
const CLASSIC_TEXT: &str = "#111111";

const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("dracula", include_str!("../themes/dracula.toml")),
    ("gruvbox_dark", include_str!("../themes/gruvbox_dark.toml")),
    ("nord", include_str!("../themes/nord.toml")),
    ("solarized_light", include_str!("../themes/solarized_light.toml")),
];

const FONT_FAMILY: &str = "sans-serif";
const TOP_LABEL_FONT_SIZE: f32 = 18.0;
const TOP_LABEL_FONT_WEIGHT: u16 = 600;
const LEVEL_LABEL_FONT_SIZE: f32 = 12.0;
const FRAME_STROKE_WIDTH: f32 = 2.0;
const VALUE_STROKE_WIDTH: f32 = 2.0;
const VALUE_FILL_OPACITY: f32 = 0.3;
const GUIDE_OPACITY: f32 = 0.5;
const HANDLE_RADIUS: f64 = 10.0;

/// Colors and type settings for the chart surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_frame")]
    pub frame_color: String,
    #[serde(default = "default_guide")]
    pub guide_color: String,
    #[serde(default = "default_value")]
    pub value_fill_color: String,
    #[serde(default = "default_value")]
    pub value_stroke_color: String,
    #[serde(default = "default_text")]
    pub text_color: String,

    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_top_label_font_size")]
    pub top_label_font_size: f32,
    #[serde(default = "default_top_label_font_weight")]
    pub top_label_font_weight: u16,
    #[serde(default = "default_level_label_font_size")]
    pub level_label_font_size: f32,

    #[serde(default = "default_frame_stroke_width")]
    pub frame_stroke_width: f32,
    #[serde(default = "default_value_stroke_width")]
    pub value_stroke_width: f32,
    #[serde(default = "default_value_fill_opacity")]
    pub value_fill_opacity: f32,
    #[serde(default = "default_guide_opacity")]
    pub guide_opacity: f32,
    #[serde(default = "default_handle_radius")]
    pub handle_radius: f64,
}

fn default_background() -> String {
    CLASSIC_BACKGROUND.to_string()
}
fn default_frame() -> String {
    CLASSIC_FRAME.to_string()
}
fn default_guide() -> String {
    CLASSIC_GUIDE.to_string()
}
fn default_value() -> String {
    CLASSIC_VALUE.to_string()
}
fn default_text() -> String {
    CLASSIC_TEXT.to_string()
}
fn default_font_family() -> String {
    FONT_FAMILY.to_string()
}
fn default_top_label_font_size() -> f32 {
    TOP_LABEL_FONT_SIZE
}
fn default_top_label_font_weight() -> u16 {
    TOP_LABEL_FONT_WEIGHT
}
fn default_level_label_font_size() -> f32 {
    LEVEL_LABEL_FONT_SIZE
}
fn default_frame_stroke_width() -> f32 {
    FRAME_STROKE_WIDTH
}
fn default_value_stroke_width() -> f32 {
    VALUE_STROKE_WIDTH
}
fn default_value_fill_opacity() -> f32 {
    VALUE_FILL_OPACITY
}
fn default_guide_opacity() -> f32 {
    GUIDE_OPACITY
}
fn default_handle_radius() -> f64 {
    HANDLE_RADIUS
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::classic()
    }
}

#[derive(Debug, Deserialize)]
struct AlacrittyColors {
    primary: AlacrittyPrimary,
    normal: AlacrittyNormal,
}

#[derive(Debug, Deserialize)]
struct AlacrittyPrimary {
    background: String,
    foreground: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyNormal {
    white: String,
    yellow: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyTheme {
    colors: AlacrittyColors,
}

impl ChartStyle {
    /// Light background, black frame, gold value polygon.
    pub fn classic() -> Self {
        ChartStyle {
            background_color: CLASSIC_BACKGROUND.to_string(),
            frame_color: CLASSIC_FRAME.to_string(),
            guide_color: CLASSIC_GUIDE.to_string(),
            value_fill_color: CLASSIC_VALUE.to_string(),
            value_stroke_color: CLASSIC_VALUE.to_string(),
            text_color: CLASSIC_TEXT.to_string(),

            font_family: FONT_FAMILY.to_string(),
            top_label_font_size: TOP_LABEL_FONT_SIZE,
            top_label_font_weight: TOP_LABEL_FONT_WEIGHT,
            level_label_font_size: LEVEL_LABEL_FONT_SIZE,

            frame_stroke_width: FRAME_STROKE_WIDTH,
            value_stroke_width: VALUE_STROKE_WIDTH,
            value_fill_opacity: VALUE_FILL_OPACITY,
            guide_opacity: GUIDE_OPACITY,
            handle_radius: HANDLE_RADIUS,
        }
    }

    pub fn from_builtin(name: &str) -> Result<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        if normalized == "classic" {
            return Ok(Self::classic());
        }
        let content = BUILTIN_THEMES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, c)| *c)
            .ok_or_else(|| {
                LadderError::Style(format!(
                    "Unknown built-in theme '{}'. Available: {}",
                    name,
                    Self::list_builtins().join(", ")
                ))
            })?;
        Self::from_alacritty_toml(content)
    }

    pub fn list_builtins() -> Vec<&'static str> {
        std::iter::once("classic")
            .chain(BUILTIN_THEMES.iter().map(|(n, _)| *n))
            .collect()
    }

    /// Tries Alacritty TOML first, then YAML.
    pub fn from_theme_file_content(content: &str) -> Result<Self> {
        Self::from_alacritty_toml(content).or_else(|_| Self::from_alacritty_yaml(content))
    }

    pub fn from_alacritty_yaml(content: &str) -> Result<Self> {
        let alacritty: AlacrittyTheme = serde_yaml::from_str(content)
            .map_err(|e| LadderError::Style(format!("Failed to parse Alacritty YAML: {}", e)))?;

        Ok(Self::from_alacritty_theme(alacritty))
    }

    pub fn from_alacritty_toml(content: &str) -> Result<Self> {
        let alacritty: AlacrittyTheme = toml::from_str(content)
            .map_err(|e| LadderError::Style(format!("Failed to parse Alacritty TOML: {}", e)))?;

        Ok(Self::from_alacritty_theme(alacritty))
    }

    fn from_alacritty_theme(alacritty: AlacrittyTheme) -> Self {
        let colors = alacritty.colors;

        ChartStyle {
            background_color: colors.primary.background,
            frame_color: colors.primary.foreground.clone(),
            guide_color: colors.normal.white,
            value_fill_color: colors.normal.yellow.clone(),
            value_stroke_color: colors.normal.yellow,
            text_color: colors.primary.foreground,
            ..Self::classic()
        }
    }
}
