//! Frame driver
//!
//! A [`Stage`] owns everything one scene needs between frames: the entity
//! world, the input collaborator, the active view and the asset caches.
//! Whatever drives the window pushes input into [`Stage::input`], then calls
//! [`Stage::update`] and [`Stage::draw`] once per frame.

use std::path::Path;
use std::time::Duration;

use hecs::Entity;

use super::config::SceneConfig;
use super::scene::{self, SceneError};
use super::stats::FrameStats;
use crate::assets::{AssetCache, AssetServer, FileLoader};
use crate::ecs::{UpdateContext, World};
use crate::input::Input;
use crate::renderer::RenderTarget;
use crate::ui::View;

/// A running scene
pub struct Stage {
    config: SceneConfig,
    /// Entity trees
    pub world: World,
    /// Input state for the current frame
    pub input: Input,
    /// Active camera rectangle
    pub view: View,
    /// Asset caches (raw file bytes are registered by default)
    pub assets: AssetServer,
    stats: FrameStats,
}

impl Stage {
    pub fn new(config: SceneConfig) -> Self {
        log::info!("Creating stage: {}", config.title);

        let mut assets = AssetServer::new();
        assets.register(AssetCache::<Vec<u8>>::with_base_dir(
            FileLoader,
            config.asset_base_dir(),
        ));

        Self {
            world: World::with_mode(config.composition),
            input: Input::new(),
            view: config.view,
            assets,
            stats: FrameStats::new(),
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Update every entity tree by `dt`, then clear per-frame input
    pub fn update(&mut self, dt: Duration) {
        let ctx = UpdateContext {
            dt,
            input: &self.input,
            view: &self.view,
        };
        self.world.update_all(&ctx);
        self.input.update();
        self.stats.record_frame(dt);
    }

    /// Update by the configured fixed step
    pub fn step(&mut self) {
        self.update(self.config.frame_time);
    }

    /// Run `frames` fixed steps
    pub fn run(&mut self, frames: u32) {
        for _ in 0..frames {
            self.step();
        }
        log::debug!("{}: {}", self.config.title, self.stats.format_stats());
    }

    /// Draw every visible component, parents before children
    pub fn draw(&self, target: &mut dyn RenderTarget) {
        self.world.draw_all(target, &self.view);
    }

    /// Save every entity tree as XML
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_xml(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        scene::save_scene_xml(&self.world, path)
    }

    /// Add the entity trees of an XML scene file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid scene;
    /// the world is left unchanged in that case
    pub fn load_xml(&mut self, path: impl AsRef<Path>) -> Result<Vec<Entity>, SceneError> {
        scene::load_scene_xml(&mut self.world, path)
    }

    /// Save every entity tree in the binary format
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_binary(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        scene::save_scene_binary(&self.world, path)
    }

    /// Add the entity trees of a binary scene file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed; the
    /// world is left unchanged in that case
    pub fn load_binary(&mut self, path: impl AsRef<Path>) -> Result<Vec<Entity>, SceneError> {
        scene::load_scene_binary(&mut self.world, path)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animation, AnimationSet, Animator};
    use crate::ecs::{CompositionMode, Transform};
    use crate::input::{InputState, MouseButton};
    use crate::renderer::{DrawCommand, DrawList};
    use crate::ui::{IntRect, Sprite};
    use glam::Vec2;

    fn spinner(stage: &mut Stage) -> Entity {
        let e = stage.world.spawn("spinner");
        let mut set = AnimationSet::new();
        set.insert("spin", Animation::uniform(
            [IntRect::new(0, 0, 8, 8), IntRect::new(8, 0, 8, 8)],
            Duration::from_millis(30),
        ));
        let mut animator = Animator::new(set);
        animator.play(None);
        stage.world.add(e, animator).unwrap();
        stage.world.with_component_mut(e, |s: &mut Sprite| s.set_texture("spin.png"));
        stage.world.with_component_mut(e, |t: &mut Transform| t.set_size(Vec2::splat(8.0)));
        e
    }

    #[test]
    fn test_config_applied() {
        let config = SceneConfig::default()
            .with_composition(CompositionMode::Strict)
            .with_view_size(320.0, 240.0)
            .with_asset_root("/nonexistent")
            .with_target_fps(25);
        let stage = Stage::new(config);
        assert_eq!(stage.world.mode(), CompositionMode::Strict);
        assert_eq!(stage.view.size, Vec2::new(320.0, 240.0));
        assert_eq!(stage.config().frame_time, Duration::from_millis(40));
    }

    #[test]
    fn test_step_advances_animation() {
        let mut stage = Stage::new(SceneConfig::default().with_target_fps(50));
        let e = spinner(&mut stage);

        stage.step();
        assert_eq!(stage.world.with_component(e, Animator::frame_index), Some(0));
        stage.step();
        assert_eq!(stage.world.with_component(e, Animator::frame_index), Some(1));
        assert_eq!(
            stage.world.with_component(e, Sprite::texture_rect),
            Some(IntRect::new(8, 0, 8, 8))
        );
        assert_eq!(stage.stats().total_frames(), 2);
        assert_eq!(stage.stats().total_time(), Duration::from_millis(40));
    }

    #[test]
    fn test_update_clears_frame_input() {
        let mut stage = Stage::default();
        stage.input.process_mouse_button(MouseButton::Left, true);
        assert!(stage.input.is_mouse_just_pressed(MouseButton::Left));
        stage.update(Duration::from_millis(16));
        assert!(!stage.input.is_mouse_just_pressed(MouseButton::Left));
        assert!(stage.input.is_mouse_down(MouseButton::Left));
    }

    #[test]
    fn test_draw() {
        let mut stage = Stage::default();
        spinner(&mut stage);
        stage.world.spawn("empty");

        let mut list = DrawList::new();
        stage.draw(&mut list);
        assert_eq!(list.len(), 1);
        assert!(matches!(
            &list.commands()[0],
            DrawCommand::Sprite { texture, .. } if texture == "spin.png"
        ));
    }

    #[test]
    fn test_asset_cache_registered() {
        let mut stage = Stage::new(SceneConfig::default().with_asset_root("/nonexistent"));
        assert!(stage.assets.cache::<Vec<u8>>().is_some());
        assert!(stage.assets.get::<Vec<u8>>("missing.png", false).is_none());
    }

    #[test]
    fn test_save_and_load_files() {
        let dir = std::env::temp_dir().join(format!("scene2d-stage-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut stage = Stage::default();
        spinner(&mut stage);

        stage.save_xml(dir.join("stage.xml")).unwrap();
        stage.save_binary(dir.join("stage.bin")).unwrap();

        let mut restored = Stage::default();
        assert_eq!(restored.load_xml(dir.join("stage.xml")).unwrap().len(), 1);
        assert_eq!(restored.load_binary(dir.join("stage.bin")).unwrap().len(), 1);
        assert_eq!(restored.world.roots().len(), 2);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
