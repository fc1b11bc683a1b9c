use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub background: String,
    pub text_color: String,
    pub box_stroke_width: f32,
    pub connector_width: f32,
    /// Connectors are drawn slightly transparent so boxes stay readable
    /// underneath.
    pub connector_opacity: f32,
    pub separator_dasharray: String,
    pub label_background: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            background: "#FFFFFF".to_string(),
            text_color: "#000000".to_string(),
            box_stroke_width: 2.0,
            connector_width: 2.0,
            connector_opacity: 0.7,
            separator_dasharray: "2 2".to_string(),
            label_background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            background: "#F8FAFF".to_string(),
            text_color: "#1C2430".to_string(),
            box_stroke_width: 1.4,
            connector_width: 1.6,
            connector_opacity: 0.8,
            separator_dasharray: "3 3".to_string(),
            label_background: "#FFFFFF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
