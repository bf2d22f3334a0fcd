//! Demo level: a tiled floor, a grid of selectable tiles and a marker that
//! glides to the last clicked tile

use canvas_engine::prelude::*;

/// Scene id registered with the engine
pub const LEVEL_SCENE: &str = "level";

/// Image name of the floor texture
pub const FLOOR_IMAGE: &str = "floor";

const TILE_SIZE: f32 = 48.0;
const TILE_SPACING: f32 = 64.0;
const GRID_COLUMNS: u32 = 4;
const GRID_ROWS: u32 = 3;

const TILE_COLOR: Color = Color::rgb(90, 110, 140);
const SELECTED_COLOR: Color = Color::rgb(230, 180, 60);
const HOVER_PRIORITY: i32 = 10;

/// Tiles currently selected, shared between tile behaviors and the host
#[derive(Debug, Default)]
pub struct Selection {
    /// Selected tile entities in click order
    pub tiles: Vec<EntityId>,
    /// Undo requests seen
    pub undo_requests: u32,
}

/// Level layout
pub struct Level;

impl Scene for Level {
    fn create(&mut self, ctx: &mut UpdateContext<'_, '_>) -> Result<(), EngineError> {
        let root = ctx.entity;
        let world = &mut *ctx.world;

        let floor = world.create_entity(Some(root), EntityConfig::named("floor").with_z_index(-10))?;
        let floor_image = ImageComponent::new(
            FLOOR_IMAGE,
            Drawable::centered(Vec2::new(TILE_SPACING, TILE_SPACING))
                .with_tiling(Tiling::grid(GRID_COLUMNS + 2, GRID_ROWS + 2))
                .with_opacity(0.6),
        );
        world.add_component(floor, Component::new("floor-image", floor_image.into()))?;

        let marker = world.create_entity(Some(root), EntityConfig::named("marker").with_z_index(10))?;
        let dot = Drawable::centered(Vec2::new(12.0, 12.0)).with_style(
            RenderStyle::new()
                .with_fill(Color::WHITE)
                .with_stroke(Color::BLACK)
                .with_line_width(2.0),
        );
        world.add_component(marker, Component::new("dot", Shape::ellipse(dot).into()))?;
        let glide_x = world.add_component(
            marker,
            Component::new("glide-x", Lerp::fractional(LerpProperty::PositionX, 8.0, 0.05, 0.01).into()),
        )?;
        let glide_y = world.add_component(
            marker,
            Component::new("glide-y", Lerp::fractional(LerpProperty::PositionY, 8.0, 0.05, 0.01).into()),
        )?;
        let marker = MarkerHandle { entity: marker, glide_x, glide_y };

        let origin = Vec2::new(
            -TILE_SPACING * (GRID_COLUMNS - 1) as f32 / 2.0,
            -TILE_SPACING * (GRID_ROWS - 1) as f32 / 2.0,
        );
        for row in 0..GRID_ROWS {
            for column in 0..GRID_COLUMNS {
                let position = origin + Vec2::new(column as f32 * TILE_SPACING, row as f32 * TILE_SPACING);
                let tile = world.create_entity(
                    Some(root),
                    EntityConfig::named(format!("tile-{column}-{row}")).with_position(position),
                )?;
                let body = Drawable::centered(Vec2::new(TILE_SIZE, TILE_SIZE))
                    .with_style(RenderStyle::new().with_fill(TILE_COLOR).with_stroke(Color::BLACK));
                let body = world.add_component(tile, Component::new("body", Shape::rectangle(body).into()))?;
                let target = PointerTarget::rectangle(Vec2::new(TILE_SIZE, TILE_SIZE))
                    .with_hover_cursor(CursorKind::Pointer, HOVER_PRIORITY);
                let target = world.add_component(tile, Component::new("hit", target.into()))?;
                world.set_behavior(
                    tile,
                    Box::new(TileSelector { body, target, position, marker, selected: false }),
                );
            }
        }

        let label = world.create_entity(
            Some(root),
            EntityConfig::named("title")
                .with_position(Vec2::new(0.0, origin.y - TILE_SPACING))
                .with_scale_to_camera(ScaleAxes::X | ScaleAxes::Y),
        )?;
        let text = TextComponent::new("Level 1", 16.0)
            .with_align(TextAlign::Center)
            .with_drawable(Drawable::default().with_style(RenderStyle::new().with_fill(Color::WHITE)));
        world.add_component(label, Component::new("title", text.into()))?;

        log::info!("Level created with {} tiles", GRID_COLUMNS * GRID_ROWS);
        Ok(())
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_, '_>) -> bool {
        let keyboard = ctx.frame.keyboard;
        if keyboard.is_pressed(KeyCode::Z) && keyboard.modifiers().is_chord() {
            if let Some(selection) = ctx.frame.resources.get_mut::<Selection>() {
                selection.undo_requests += 1;
                log::info!("Undo requested ({} so far)", selection.undo_requests);
            }
        }
        false
    }

    fn destroy(&mut self, root: EntityId, _world: &mut World) {
        log::info!("Level {:?} torn down", root);
    }
}

#[derive(Debug, Clone, Copy)]
struct MarkerHandle {
    entity: EntityId,
    glide_x: ComponentId,
    glide_y: ComponentId,
}

impl MarkerHandle {
    fn glide_to(self, world: &mut World, target: Vec2) {
        for (id, value) in [(self.glide_x, target.x), (self.glide_y, target.y)] {
            if let Some(lerp) = world.component_mut(self.entity, id).and_then(Component::as_lerp_mut) {
                lerp.set_target(value);
            }
        }
    }
}

/// Toggles a tile's selection on click
struct TileSelector {
    body: ComponentId,
    target: ComponentId,
    position: Vec2,
    marker: MarkerHandle,
    selected: bool,
}

impl Behavior for TileSelector {
    fn update(&mut self, ctx: &mut UpdateContext<'_, '_>) -> bool {
        let clicked = ctx
            .world
            .component(ctx.entity, self.target)
            .and_then(Component::as_pointer_target)
            .is_some_and(|target| target.state().clicked.has(PointerButton::Primary));
        if !clicked {
            return false;
        }

        self.selected = !self.selected;
        let fill = if self.selected { SELECTED_COLOR } else { TILE_COLOR };
        if let Some(shape) = ctx.world.component_mut(ctx.entity, self.body).and_then(Component::as_shape_mut) {
            shape.drawable.style.fill = Some(fill);
        }

        if let Some(selection) = ctx.frame.resources.get_mut::<Selection>() {
            if self.selected {
                selection.tiles.push(ctx.entity);
            } else {
                selection.tiles.retain(|tile| *tile != ctx.entity);
            }
        }
        self.marker.glide_to(ctx.world, self.position);
        log::debug!("Tile {:?} selected: {}", ctx.entity, self.selected);
        true
    }

    fn destroy(&mut self, entity: EntityId, _world: &mut World) {
        log::trace!("Tile {:?} removed", entity);
    }
}
