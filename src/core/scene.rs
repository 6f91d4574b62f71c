//! Scene serialization and deserialization
//!
//! Entity trees are saved in attach order, components first and children
//! after, in either the XML or the binary format. Loading restores the
//! saved state: components are re-attached under strict composition rules
//! and their on-added hooks do not run again.
//!
//! ```text
//! <Scene>
//!   <Entity Id="menu">
//!     <Transform ... />
//!     <Children>
//!       <Entity Id="play"> ... </Entity>
//!     </Children>
//!   </Entity>
//! </Scene>
//! ```

use std::fs;
use std::path::Path;

use hecs::Entity;

use crate::ecs::{ComponentError, ComponentKind, World};
use crate::serial::xml::{self, XmlElement, XmlNode};
use crate::serial::{BinaryReader, BinaryWriter, SerialError};

const SCENE_TAG: &str = "Scene";
const ENTITY_TAG: &str = "Entity";
const CHILDREN_TAG: &str = "Children";

/// Errors that can occur during scene operations
#[derive(Debug, Clone)]
pub enum SceneError {
    /// Reading or writing a file failed
    Io(String),
    /// Config serialization failed
    Serialize(String),
    /// Config deserialization failed
    Deserialize(String),
    /// Scene data could not be encoded or decoded
    Format(SerialError),
    /// Saved components violate the composition rules
    Composition(ComponentError),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Serialize(e) => write!(f, "Serialization error: {e}"),
            Self::Deserialize(e) => write!(f, "Deserialization error: {e}"),
            Self::Format(e) => write!(f, "Scene format error: {e}"),
            Self::Composition(e) => write!(f, "Scene composition error: {e}"),
        }
    }
}

impl std::error::Error for SceneError {}

impl From<SerialError> for SceneError {
    fn from(e: SerialError) -> Self {
        Self::Format(e)
    }
}

impl From<ComponentError> for SceneError {
    fn from(e: ComponentError) -> Self {
        Self::Composition(e)
    }
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

fn spawn_under(world: &mut World, name: &str, parent: Option<Entity>) -> Result<Entity, SceneError> {
    match parent {
        Some(parent) => Ok(world.spawn_child(parent, name)?),
        None => Ok(world.spawn(name)),
    }
}

/// Run `fill` on a freshly spawned entity, despawning it (and anything
/// spawned below it) if filling fails
fn build<F>(world: &mut World, name: &str, parent: Option<Entity>, fill: F) -> Result<Entity, SceneError>
where
    F: FnOnce(&mut World, Entity) -> Result<(), SceneError>,
{
    let entity = spawn_under(world, name, parent)?;
    match fill(world, entity) {
        Ok(()) => Ok(entity),
        Err(e) => {
            log::warn!("Failed to load entity '{name}': {e}");
            let _ = world.despawn(entity);
            Err(e)
        }
    }
}

// ── XML ──────────────────────────────────────────────────────────────

/// Describe an entity, its components and its descendants
pub fn entity_to_xml(world: &World, entity: Entity) -> Result<XmlElement, SceneError> {
    let mut element = XmlElement::new(ENTITY_TAG).attr("Id", world.name(entity).unwrap_or_default());
    {
        let components = world
            .components(entity)
            .ok_or(ComponentError::NoSuchEntity)?;
        for component in components.iter() {
            element.push_child(component.to_xml());
        }
    }

    let children = world.children(entity);
    if !children.is_empty() {
        let mut list = XmlElement::new(CHILDREN_TAG);
        for child in children {
            list.push_child(entity_to_xml(world, child)?);
        }
        element.push_child(list);
    }
    Ok(element)
}

/// Recreate an entity tree from its `<Entity>` element.
///
/// Unknown component elements are skipped. On failure nothing is left
/// behind in the world.
pub fn load_entity_xml(
    world: &mut World,
    node: XmlNode<'_, '_>,
    parent: Option<Entity>,
) -> Result<Entity, SceneError> {
    xml::expect_tag(node, ENTITY_TAG)?;
    let name = node.attribute("Id").unwrap_or_default();
    build(world, name, parent, |world, entity| fill_from_xml(world, entity, node))
}

fn fill_from_xml(world: &mut World, entity: Entity, node: XmlNode<'_, '_>) -> Result<(), SceneError> {
    for child in xml::element_children(node) {
        let tag = child.tag_name().name();
        if tag == CHILDREN_TAG {
            for sub in xml::element_children(child).filter(|n| n.tag_name().name() == ENTITY_TAG) {
                let spawned = world.spawn_child(entity, sub.attribute("Id").unwrap_or_default())?;
                fill_from_xml(world, spawned, sub)?;
            }
            continue;
        }

        let Ok(kind) = tag.parse::<ComponentKind>() else {
            log::debug!("Skipping unknown component <{tag}>");
            continue;
        };
        let mut component = kind.create();
        component.load_xml(child)?;
        world.attach_restored(entity, component)?;
    }
    Ok(())
}

/// Describe every root entity tree
pub fn scene_to_xml(world: &World) -> Result<XmlElement, SceneError> {
    let mut scene = XmlElement::new(SCENE_TAG);
    for &root in world.roots() {
        scene.push_child(entity_to_xml(world, root)?);
    }
    Ok(scene)
}

/// Add the entity trees of a `<Scene>` document to the world.
///
/// Returns the new root entities. If any tree fails, every tree loaded by
/// this call is removed again.
pub fn load_scene_xml_str(world: &mut World, text: &str) -> Result<Vec<Entity>, SceneError> {
    let doc = roxmltree::Document::parse(text).map_err(SerialError::from)?;
    let root = doc.root_element();
    xml::expect_tag(root, SCENE_TAG)?;

    let mut loaded = Vec::new();
    for node in xml::element_children(root).filter(|n| n.tag_name().name() == ENTITY_TAG) {
        match load_entity_xml(world, node, None) {
            Ok(entity) => loaded.push(entity),
            Err(e) => {
                discard(world, &loaded);
                return Err(e);
            }
        }
    }
    Ok(loaded)
}

/// Save the world as an XML document
///
/// # Errors
///
/// Returns an error if the file cannot be written
pub fn save_scene_xml(world: &World, path: impl AsRef<Path>) -> Result<(), SceneError> {
    let path = path.as_ref();
    fs::write(path, scene_to_xml(world)?.to_document())?;
    log::info!("Saved scene to {}", path.display());
    Ok(())
}

/// Load an XML scene file into the world
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not describe a
/// valid scene
pub fn load_scene_xml(world: &mut World, path: impl AsRef<Path>) -> Result<Vec<Entity>, SceneError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let roots = load_scene_xml_str(world, &text)?;
    log::info!("Loaded {} entity trees from {}", roots.len(), path.display());
    Ok(roots)
}

// ── Binary ───────────────────────────────────────────────────────────

/// Write an entity tree: id, components (kind name then payload), children
pub fn save_entity_binary(
    world: &World,
    entity: Entity,
    writer: &mut BinaryWriter<'_>,
) -> Result<(), SceneError> {
    let name = world.name(entity).ok_or(ComponentError::NoSuchEntity)?;
    writer.write_string(&name)?;
    {
        let components = world
            .components(entity)
            .ok_or(ComponentError::NoSuchEntity)?;
        writer.write_len(components.len())?;
        for component in components.iter() {
            writer.write_string(component.kind().name())?;
            component.save_binary(writer)?;
        }
    }

    let children = world.children(entity);
    writer.write_len(children.len())?;
    for child in children {
        save_entity_binary(world, child, writer)?;
    }
    Ok(())
}

/// Read an entity tree written by [`save_entity_binary`].
///
/// Unknown component names are an error since the payload length is not
/// recorded. On failure nothing is left behind in the world.
pub fn load_entity_binary(
    world: &mut World,
    reader: &mut BinaryReader<'_>,
    parent: Option<Entity>,
) -> Result<Entity, SceneError> {
    let name = reader.read_string()?;
    build(world, &name, parent, |world, entity| fill_from_binary(world, entity, reader))
}

fn fill_from_binary(
    world: &mut World,
    entity: Entity,
    reader: &mut BinaryReader<'_>,
) -> Result<(), SceneError> {
    let count = reader.read_len()?;
    for _ in 0..count {
        let kind: ComponentKind = reader.read_string()?.parse()?;
        let mut component = kind.create();
        component.load_binary(reader)?;
        world.attach_restored(entity, component)?;
    }

    let children = reader.read_len()?;
    for _ in 0..children {
        let name = reader.read_string()?;
        let child = world.spawn_child(entity, name)?;
        fill_from_binary(world, child, reader)?;
    }
    Ok(())
}

/// Encode every root entity tree
pub fn scene_to_bytes(world: &World) -> Result<Vec<u8>, SceneError> {
    let mut buf = Vec::new();
    let mut writer = BinaryWriter::new(&mut buf);
    writer.write_len(world.roots().len())?;
    for &root in world.roots() {
        save_entity_binary(world, root, &mut writer)?;
    }
    writer.flush()?;
    Ok(buf)
}

/// Add the entity trees encoded by [`scene_to_bytes`] to the world
pub fn load_scene_bytes(world: &mut World, mut bytes: &[u8]) -> Result<Vec<Entity>, SceneError> {
    let mut reader = BinaryReader::new(&mut bytes);
    let count = reader.read_len()?;
    let mut loaded = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        match load_entity_binary(world, &mut reader, None) {
            Ok(entity) => loaded.push(entity),
            Err(e) => {
                discard(world, &loaded);
                return Err(e);
            }
        }
    }
    Ok(loaded)
}

/// Save the world in the binary format
///
/// # Errors
///
/// Returns an error if the file cannot be written
pub fn save_scene_binary(world: &World, path: impl AsRef<Path>) -> Result<(), SceneError> {
    let path = path.as_ref();
    fs::write(path, scene_to_bytes(world)?)?;
    log::info!("Saved scene to {}", path.display());
    Ok(())
}

/// Load a binary scene file into the world
///
/// # Errors
///
/// Returns an error if the file cannot be read or is malformed
pub fn load_scene_binary(world: &mut World, path: impl AsRef<Path>) -> Result<Vec<Entity>, SceneError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let roots = load_scene_bytes(world, &bytes)?;
    log::info!("Loaded {} entity trees from {}", roots.len(), path.display());
    Ok(roots)
}

fn discard(world: &mut World, entities: &[Entity]) {
    for &entity in entities {
        let _ = world.despawn(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animation, AnimationSet, Animator};
    use crate::ecs::{Component, CompositionMode, Transform};
    use crate::ui::{Button, IntRect, Origin, Sprite, TextBox};
    use glam::Vec2;
    use std::time::Duration;

    fn menu(world: &mut World) -> Entity {
        let menu = world.spawn("menu");
        world
            .add(menu, Transform::new(Vec2::new(100.0, 50.0), Vec2::new(300.0, 200.0)))
            .unwrap();

        let play = world.spawn_child(menu, "play").unwrap();
        world
            .add(play, Transform::new(Vec2::new(110.0, 60.0), Vec2::new(120.0, 40.0)))
            .unwrap();
        world.add(play, Button::new(
            IntRect::new(0, 0, 120, 40),
            IntRect::new(0, 40, 120, 40),
            IntRect::new(0, 80, 120, 40),
        ))
        .unwrap();
        world.with_component_mut(play, |t: &mut TextBox| t.set_text("Play"));

        let icon = world.spawn_child(play, "icon").unwrap();
        let mut set = AnimationSet::new();
        set.insert("Spin", Animation::uniform(
            [IntRect::new(0, 0, 8, 8), IntRect::new(8, 0, 8, 8)],
            Duration::from_millis(90),
        ));
        let mut animator = Animator::new(set);
        animator.play(None);
        world.add(icon, animator).unwrap();
        menu
    }

    fn render(world: &World) -> String {
        scene_to_xml(world).unwrap().to_string()
    }

    #[test]
    fn test_xml_round_trip() {
        let mut world = World::new();
        menu(&mut world);
        world.spawn("empty");
        let text = scene_to_xml(&world).unwrap().to_document();
        assert!(text.starts_with(crate::serial::XML_HEADER));

        let mut restored = World::new();
        let roots = load_scene_xml_str(&mut restored, &text).unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(restored.len(), world.len());
        assert_eq!(render(&restored), render(&world));

        let play = restored.children(roots[0])[0];
        assert_eq!(restored.name(play).as_deref(), Some("play"));
        assert_eq!(restored.parent(play), Some(roots[0]));
    }

    #[test]
    fn test_binary_round_trip() {
        let mut world = World::new();
        let menu = menu(&mut world);
        let bytes = scene_to_bytes(&world).unwrap();

        let mut restored = World::new();
        let roots = load_scene_bytes(&mut restored, &bytes).unwrap();
        assert_eq!(render(&restored), render(&world));

        let original = world.with_component(menu, |t: &Transform| t.clone()).unwrap();
        let loaded = restored.with_component(roots[0], |t: &Transform| t.clone()).unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded.base().owner(), Some(roots[0]));
    }

    #[test]
    fn test_binary_and_xml_agree() {
        let mut world = World::new();
        menu(&mut world);

        let mut from_binary = World::new();
        load_scene_bytes(&mut from_binary, &scene_to_bytes(&world).unwrap()).unwrap();
        let mut from_xml = World::new();
        load_scene_xml_str(&mut from_xml, &render(&world)).unwrap();
        assert_eq!(render(&from_binary), render(&from_xml));
    }

    #[test]
    fn test_load_does_not_rerun_on_added() {
        let mut world = World::new();
        let e = world.spawn("b");
        world.add(e, Button::default()).unwrap();
        world.with_component_mut(e, |t: &mut TextBox| t.set_alignment(Origin::BottomLeft));

        let mut restored = World::new();
        let roots = load_scene_xml_str(&mut restored, &render(&world)).unwrap();
        let alignment = restored.with_component(roots[0], TextBox::alignment);
        assert_eq!(alignment, Some(Origin::BottomLeft));
    }

    #[test]
    fn test_unknown_component_skipped() {
        let text = r#"<Scene>
            <Entity Id="a">
                <Transform><Position X="1" Y="2" /><Size X="3" Y="4" /></Transform>
                <Glow Radius="5" />
                <Sprite Texture="a.png" />
            </Entity>
        </Scene>"#;
        let mut world = World::new();
        let roots = load_scene_xml_str(&mut world, text).unwrap();
        let kinds: Vec<_> = world.components(roots[0]).unwrap().kinds().collect();
        assert_eq!(kinds, vec![ComponentKind::Transform, ComponentKind::Sprite]);
    }

    #[test]
    fn test_failed_load_leaves_world_unchanged() {
        let mut world = World::with_mode(CompositionMode::Permissive);
        world.spawn("existing");

        // Sprite before its Transform violates strict restore order
        let text = r#"<Scene>
            <Entity Id="ok" />
            <Entity Id="bad">
                <Children><Entity Id="child"><Sprite /></Entity></Children>
            </Entity>
        </Scene>"#;
        let err = load_scene_xml_str(&mut world, text).unwrap_err();
        assert!(matches!(err, SceneError::Composition(ComponentError::MissingRequired { .. })));
        assert_eq!(world.len(), 1);
        assert_eq!(world.roots().len(), 1);

        // Missing required element
        let text = r#"<Scene><Entity Id="a"><Transform><Size X="1" Y="1" /></Transform></Entity></Scene>"#;
        let err = load_scene_xml_str(&mut world, text).unwrap_err();
        assert!(matches!(err, SceneError::Format(SerialError::MissingElement { .. })));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_truncated_binary_rejected() {
        let mut world = World::new();
        menu(&mut world);
        let bytes = scene_to_bytes(&world).unwrap();

        let mut restored = World::new();
        assert!(load_scene_bytes(&mut restored, &bytes[..bytes.len() / 2]).is_err());
        assert!(restored.is_empty());
    }

    #[test]
    fn test_scene_files() {
        let dir = std::env::temp_dir().join(format!("scene2d-scene-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let mut world = World::new();
        menu(&mut world);

        let xml_path = dir.join("menu.xml");
        save_scene_xml(&world, &xml_path).unwrap();
        let mut from_xml = World::new();
        load_scene_xml(&mut from_xml, &xml_path).unwrap();
        assert_eq!(render(&from_xml), render(&world));

        let bin_path = dir.join("menu.bin");
        save_scene_binary(&world, &bin_path).unwrap();
        let mut from_bin = World::new();
        load_scene_binary(&mut from_bin, &bin_path).unwrap();
        assert_eq!(render(&from_bin), render(&world));

        assert!(matches!(
            load_scene_xml(&mut World::new(), dir.join("missing.xml")),
            Err(SceneError::Io(_))
        ));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_sprite_texture_survives() {
        let mut world = World::new();
        let e = world.spawn("s");
        world.add(e, Sprite::new("gfx/a b&c.png")).unwrap();
        let mut restored = World::new();
        let roots = load_scene_xml_str(&mut restored, &render(&world)).unwrap();
        let texture = restored.with_component(roots[0], |s: &Sprite| s.texture().to_string());
        assert_eq!(texture.as_deref(), Some("gfx/a b&c.png"));
    }
}
