//! Stage configuration

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::scene::SceneError;
use crate::assets::executable_dir;
use crate::ecs::CompositionMode;
use crate::ui::View;

/// Stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene title, used in logs
    pub title: String,
    /// Policy for components whose required siblings are missing
    pub composition: CompositionMode,
    /// Initial camera rectangle
    pub view: View,
    /// Base directory for relative asset paths (executable directory if unset)
    pub asset_root: Option<PathBuf>,
    /// Fixed step used by [`Stage::step`](super::Stage::step)
    pub frame_time: Duration,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            title: String::from("Scene"),
            composition: CompositionMode::Permissive,
            view: View::default(),
            asset_root: None,
            frame_time: Duration::from_micros(16_667),
        }
    }
}

impl SceneConfig {
    /// Create a new config with a title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_composition(mut self, composition: CompositionMode) -> Self {
        self.composition = composition;
        self
    }

    /// Set the view to a `width` x `height` rectangle at the origin
    pub fn with_view_size(mut self, width: f32, height: f32) -> Self {
        self.view = View::from_size(Vec2::new(width, height));
        self
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = Some(root.into());
        self
    }

    /// Set the fixed frame step from a target rate
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.frame_time = Duration::from_secs(1) / fps.max(1);
        self
    }

    /// Directory relative asset paths resolve against
    #[must_use]
    pub fn asset_base_dir(&self) -> PathBuf {
        self.asset_root.clone().unwrap_or_else(executable_dir)
    }

    /// Parse a RON document
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config
    pub fn from_ron_str(text: &str) -> Result<Self, SceneError> {
        ron::from_str(text).map_err(|e| SceneError::Deserialize(e.to_string()))
    }

    /// Parse a JSON document
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config
    pub fn from_json_str(text: &str) -> Result<Self, SceneError> {
        serde_json::from_str(text).map_err(|e| SceneError::Deserialize(e.to_string()))
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Save the config as RON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Serialize(e.to_string()))?;
        fs::write(path, text).map_err(|e| SceneError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = SceneConfig::default()
            .with_title("Menu")
            .with_composition(CompositionMode::Strict)
            .with_view_size(640.0, 480.0)
            .with_asset_root("/data")
            .with_target_fps(50);

        assert_eq!(config.title, "Menu");
        assert_eq!(config.composition, CompositionMode::Strict);
        assert_eq!(config.view.center, Vec2::new(320.0, 240.0));
        assert_eq!(config.asset_base_dir(), PathBuf::from("/data"));
        assert_eq!(config.frame_time, Duration::from_millis(20));
    }

    #[test]
    fn test_ron_round_trip() {
        let config = SceneConfig::default().with_title("Ron").with_asset_root("assets");
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert_eq!(SceneConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config = SceneConfig::from_json_str(r#"{ "title": "Json", "composition": "Strict" }"#).unwrap();
        assert_eq!(config.title, "Json");
        assert_eq!(config.composition, CompositionMode::Strict);
        assert_eq!(config.view, View::default());
        assert!(config.asset_root.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = SceneConfig::from_json_str("{ \"composition\": \"Sometimes\" }").unwrap_err();
        assert!(matches!(err, SceneError::Deserialize(_)));
    }
}
