//! Demo scene: a menu with a button, a draining health bar and an animated
//! icon, driven for a few simulated frames and printed as XML

use std::time::Duration;

use scene2d::core::scene;
use scene2d::prelude::*;

fn build_menu(stage: &mut Stage) -> Result<(Entity, Entity), ComponentError> {
    let world = &mut stage.world;

    let menu = world.spawn("menu");
    world.add(menu, Transform::new(Vec2::new(200.0, 150.0), Vec2::new(400.0, 300.0)))?;

    let play = world.spawn_child(menu, "play")?;
    world.add(play, Transform::new(Vec2::new(340.0, 200.0), Vec2::new(120.0, 40.0)))?;
    world.add(play, Button::new(
        IntRect::new(0, 0, 120, 40),
        IntRect::new(0, 40, 120, 40),
        IntRect::new(0, 80, 120, 40),
    ))?;
    world.with_component_mut(play, |s: &mut Sprite| s.set_texture("ui/button.png"));
    world.with_component_mut(play, |t: &mut TextBox| {
        t.set_text("Play");
        t.set_font("fonts/ui.ttf");
    });
    world.with_component(play, |c: &Clickable| {
        c.on_click.subscribe(|e| log::info!("Clicked {:?} at {}", e.entity, e.position));
        c.on_hover.subscribe(|e| log::info!("Hover {:?}: {}", e.entity, e.hovered));
    });

    let health = world.spawn_child(menu, "health")?;
    world.add(health, Transform::new(Vec2::new(300.0, 400.0), Vec2::new(200.0, 20.0)))?;
    world.add(health, Sprite::new("ui/bar.png").with_rect(IntRect::new(0, 0, 200, 20)))?;
    world.add(health, FillBar::new(ValueRange::new(0.0, 100.0, 100.0), IntRect::default()))?;

    let icon = world.spawn_child(menu, "icon")?;
    world.add(icon, Transform::new(Vec2::new(220.0, 170.0), Vec2::new(32.0, 32.0)))?;
    world.add(icon, Sprite::new("ui/icon.png"))?;
    let mut set = AnimationSet::new();
    set.insert("Idle", Animation::uniform(
        (0..4).map(|i| IntRect::new(i * 32, 0, 32, 32)),
        Duration::from_millis(120),
    ));
    let mut animator = Animator::new(set);
    animator.play(None);
    world.add(icon, animator)?;

    Ok((play, health))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load_ron(path)?,
        None => SceneConfig::default()
            .with_title("Demo")
            .with_view_size(800.0, 600.0),
    };
    let mut stage = Stage::new(config);
    let (play, health) = build_menu(&mut stage)?;

    // Point at the button and press it
    stage.input.process_mouse_motion(Vec2::new(400.0, 220.0));
    stage.step();
    stage.input.process_mouse_button(MouseButton::Left, true);
    stage.step();
    stage.input.process_mouse_button(MouseButton::Left, false);

    for _ in 0..30 {
        stage
            .world
            .with_component_mut(health, |bar: &mut FillBar| bar.set_value(bar.value() - 2.5));
        stage.step();
    }

    let mut frame = DrawList::new();
    stage.draw(&mut frame);
    log::info!("{} draw calls, {}", frame.len(), stage.stats().format_stats());
    if let Some(rect) = stage.world.with_component(play, Sprite::texture_rect) {
        log::info!("Button region: {rect:?}");
    }

    println!("{}", scene::scene_to_xml(&stage.world)?.to_document());
    Ok(())
}
