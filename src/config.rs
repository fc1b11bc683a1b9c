use crate::error::{DepictError, Result};
use crate::ir::DEFAULT_DEPTH;
use crate::layout::Rect;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Gap between a container's edge and its children.
    pub margin: f32,
    /// Width:height cap for ring and zigzag items.
    pub aspect_ratio: f32,
    /// Share of a zigzag cell an item actually occupies.
    pub zigzag_fill: f32,
    /// Icon side of a bordered leaf, as a share of its shorter side.
    pub leaf_icon_fraction: f32,
    /// Height of a container's icon/title band, as a share of its shorter side.
    pub band_icon_fraction: f32,
    /// Generations below the focus that stay expanded.
    pub depth: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 2.0,
            aspect_ratio: 4.0 / 3.0,
            zigzag_fill: 0.9,
            leaf_icon_fraction: 0.5,
            band_icon_fraction: 0.125,
            depth: DEFAULT_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl RenderConfig {
    pub fn viewport(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationConfig {
    pub duration_ms: f64,
    /// Quiet time after the last edit before the text is re-interpreted.
    pub debounce_ms: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 500.0,
            debounce_ms: 500.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub animation: AnimationConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfig>,
    render: Option<RenderConfig>,
    animation: Option<AnimationConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    background: Option<String>,
    text_color: Option<String>,
    box_stroke_width: Option<f32>,
    connector_width: Option<f32>,
    connector_opacity: Option<f32>,
    separator_dasharray: Option<String>,
    label_background: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path).map_err(|source| DepictError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_config_file(&contents).map_err(|source| DepictError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    apply_config_file(&mut config, parsed);
    Ok(config)
}

fn parse_config_file(contents: &str) -> serde_json::Result<ConfigFile> {
    serde_json::from_str(contents)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) {
    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.box_stroke_width {
            config.theme.box_stroke_width = v;
        }
        if let Some(v) = vars.connector_width {
            config.theme.connector_width = v;
        }
        if let Some(v) = vars.connector_opacity {
            config.theme.connector_opacity = v;
        }
        if let Some(v) = vars.separator_dasharray {
            config.theme.separator_dasharray = v;
        }
        if let Some(v) = vars.label_background {
            config.theme.label_background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }
    if let Some(render) = parsed.render {
        config.render = render;
    }
    if let Some(animation) = parsed.animation {
        config.animation = animation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).expect("defaults");
        assert_eq!(config.render.width, 1200.0);
        assert_eq!(config.layout.depth, 4);
        assert_eq!(config.animation.duration_ms, 500.0);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let parsed = parse_config_file(
            r#"{
                "theme": "modern",
                "themeVariables": { "connectorOpacity": 0.5 },
                "layout": { "depth": 2 },
                "animation": { "durationMs": 250 }
            }"#,
        )
        .expect("valid config");
        let mut config = Config::default();
        apply_config_file(&mut config, parsed);
        assert_eq!(config.theme.connector_opacity, 0.5);
        assert_eq!(config.theme.font_family, Theme::modern().font_family);
        assert_eq!(config.layout.depth, 2);
        assert_eq!(config.layout.margin, 2.0);
        assert_eq!(config.animation.duration_ms, 250.0);
        assert_eq!(config.animation.debounce_ms, 500.0);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/depict.json"))).unwrap_err();
        assert!(matches!(err, DepictError::Read { .. }));
    }
}
