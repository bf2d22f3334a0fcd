//! Transform propagation, ordering and render recording

use std::collections::HashMap;

use crate::assets::MemoryImageLoader;
use crate::ecs::components::{Drawable, Shape, ShapeGeometry, Tiling};
use crate::ecs::systems::ImageSystem;
use crate::ecs::{Component, EntityConfig, EntityId, World, WorldStats};
use crate::foundation::math::{Affine2D, Vec2};
use crate::render::{Color, Opcode, RecordingSurface, RenderCommand, RenderStyle, RenderSystem};
use approx::assert_relative_eq;

fn filled(size: f32) -> Component {
    let drawable = Drawable::centered(Vec2::new(size, size)).with_style(RenderStyle::new().with_fill(Color::WHITE));
    Component::new("body", Shape::rectangle(drawable).into())
}

fn record(world: &mut World, renderer: &mut RenderSystem) {
    let mut queue = renderer.begin_frame();
    world.queue_render_commands(&mut queue);
}

fn no_images() -> ImageSystem {
    ImageSystem::new(HashMap::new(), Box::new(MemoryImageLoader::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_level_composition() {
        let mut world = World::new();
        let a = world
            .create_entity(None, EntityConfig::named("a").with_position(Vec2::new(10.0, 0.0)).with_rotation(90.0))
            .unwrap();
        let b = world
            .create_entity(Some(a), EntityConfig::named("b").with_position(Vec2::new(5.0, 0.0)).with_scale(Vec2::new(2.0, 2.0)))
            .unwrap();
        let c = world
            .create_entity(Some(b), EntityConfig::named("c").with_position(Vec2::new(1.0, 0.0)))
            .unwrap();

        let expected = Affine2D::from_trs(Vec2::new(10.0, 0.0), 90.0, Vec2::new(1.0, 1.0))
            * Affine2D::from_trs(Vec2::new(5.0, 0.0), 0.0, Vec2::new(2.0, 2.0))
            * Affine2D::from_trs(Vec2::new(1.0, 0.0), 0.0, Vec2::new(1.0, 1.0));
        let leaf = world.world_matrix(c).unwrap();
        assert_relative_eq!(leaf, expected, epsilon = 1e-4);
        assert_relative_eq!(leaf.transform_point(Vec2::zeros()), Vec2::new(10.0, 7.0), epsilon = 1e-4);
    }

    #[test]
    fn test_dirty_marking_is_minimal() {
        let mut world = World::new();
        let a = world.create_entity(None, EntityConfig::named("a").with_position(Vec2::new(1.0, 0.0))).unwrap();
        let b = world.create_entity(Some(a), EntityConfig::named("b").with_position(Vec2::new(2.0, 0.0))).unwrap();
        let c = world.create_entity(Some(b), EntityConfig::named("c")).unwrap();
        let sibling = world.create_entity(None, EntityConfig::named("sibling")).unwrap();
        let all = [a, b, c, sibling];

        for id in all {
            world.world_matrix(id);
        }
        world.reset_stats();

        // writing the same value is not a change
        assert!(!world.set_position(b, Vec2::new(2.0, 0.0)));
        for id in all {
            world.world_matrix(id);
        }
        assert_eq!(world.stats(), WorldStats::default());

        assert!(world.set_position(b, Vec2::new(3.0, 3.0)));
        for id in all {
            world.world_matrix(id);
        }
        assert_eq!(world.stats(), WorldStats { world_recomputes: 2, local_recomputes: 1 });

        world.reset_stats();
        assert!(world.set_rotation(a, 45.0));
        for id in all {
            world.world_matrix(id);
        }
        assert_eq!(world.stats(), WorldStats { world_recomputes: 3, local_recomputes: 1 });
    }

    #[test]
    fn test_z_order_is_deterministic() {
        let mut world = World::new();
        let parent = world.create_entity(None, EntityConfig::named("parent")).unwrap();
        let children: Vec<EntityId> = [3, -1, 0, -1]
            .into_iter()
            .enumerate()
            .map(|(i, z)| {
                world
                    .create_entity(Some(parent), EntityConfig::named(format!("child-{i}")).with_z_index(z))
                    .unwrap()
            })
            .collect();

        let expected: Vec<EntityId> = [1, 3, 2, 0].into_iter().map(|i| children[i]).collect();
        assert_eq!(world.sorted_children(parent), expected);
        assert_eq!(
            world.traversal_order(parent),
            vec![children[1], children[3], parent, children[2], children[0]]
        );

        world.set_z_index(children[0], -5);
        let expected: Vec<EntityId> = [0, 1, 3, 2].into_iter().map(|i| children[i]).collect();
        assert_eq!(world.sorted_children(parent), expected);
    }

    #[test]
    fn test_drawable_free_subtrees_record_nothing() {
        let mut world = World::new();
        let a = world.create_entity(None, EntityConfig::named("a").with_position(Vec2::new(4.0, 4.0))).unwrap();
        let b = world.create_entity(Some(a), EntityConfig::named("b").with_rotation(30.0)).unwrap();
        let other = world.create_entity(None, EntityConfig::named("other").with_scale(Vec2::new(3.0, 3.0))).unwrap();
        world.create_entity(Some(other), EntityConfig::named("leaf").with_position(Vec2::new(1.0, 1.0))).unwrap();

        let mut renderer = RenderSystem::new(Color::BLACK, true);
        record(&mut world, &mut renderer);
        assert!(renderer.stream().is_empty());

        world.add_component(b, filled(8.0)).unwrap();
        record(&mut world, &mut renderer);
        let stream = renderer.stream();
        assert_eq!(stream.count(Opcode::PushTransform), 2);
        assert_eq!(stream.count(Opcode::PopTransform), 2);
        assert_eq!(stream.draw_count(), 1);
    }

    #[test]
    fn test_identical_styles_share_one_material() {
        let mut world = World::new();
        for i in 0..20 {
            let id = world
                .create_entity(None, EntityConfig::named(format!("tile-{i}")).with_position(Vec2::new(i as f32 * 10.0, 0.0)))
                .unwrap();
            world.add_component(id, filled(8.0)).unwrap();
        }
        let hidden = world.create_entity(None, EntityConfig::named("hidden").disabled()).unwrap();
        let red = Drawable::centered(Vec2::new(8.0, 8.0)).with_style(RenderStyle::new().with_fill(Color::rgb(255, 0, 0)));
        world.add_component(hidden, Component::new("body", Shape::rectangle(red).into())).unwrap();

        let mut renderer = RenderSystem::new(Color::BLACK, true);
        record(&mut world, &mut renderer);
        assert_eq!(renderer.materials().len(), 1);
        assert_eq!(renderer.stream().count(Opcode::SetMaterial), 1);
        assert_eq!(renderer.stream().count(Opcode::SetOpacity), 1);
        assert_eq!(renderer.stream().draw_count(), 20);
    }

    #[test]
    fn test_tiled_shape_is_one_command() {
        let mut world = World::new();
        let id = world.create_entity(None, EntityConfig::named("floor")).unwrap();
        let drawable = Drawable::centered(Vec2::new(16.0, 16.0))
            .with_style(RenderStyle::new().with_fill(Color::WHITE))
            .with_tiling(Tiling::grid(3, 2));
        world.add_component(id, Component::new("floor", Shape::rectangle(drawable).into())).unwrap();

        let mut renderer = RenderSystem::new(Color::BLACK, true);
        record(&mut world, &mut renderer);
        assert_eq!(renderer.stream().draw_count(), 1);

        let mut surface = RecordingSurface::new(64.0, 64.0);
        renderer.replay(&mut surface, &Affine2D::identity(), &no_images());
        assert_eq!(surface.draw_count(), 6);
    }

    #[test]
    fn test_line_missing_end_point_draws_nothing() {
        let mut world = World::new();
        let id = world.create_entity(None, EntityConfig::named("guide")).unwrap();
        let drawable = Drawable::default().with_style(RenderStyle::new().with_stroke(Color::WHITE));
        let broken = Shape { geometry: ShapeGeometry::Line { start: Some(Vec2::zeros()), end: None }, drawable };
        world.add_component(id, Component::new("guide", broken.into())).unwrap();
        world.add_component(id, filled(8.0)).unwrap();

        let mut renderer = RenderSystem::new(Color::BLACK, true);
        record(&mut world, &mut renderer);
        assert_eq!(renderer.stream().draw_count(), 1);
        assert_eq!(renderer.stream().count(Opcode::DrawLine), 0);

        let mut surface = RecordingSurface::new(32.0, 32.0);
        let stats = renderer.replay(&mut surface, &Affine2D::identity(), &no_images());
        assert_eq!(stats.draws, 1);
        assert_eq!(surface.draw_count(), 1);
    }

    #[test]
    fn test_opacity_multiplies_down_the_tree() {
        let mut world = World::new();
        let parent = world.create_entity(None, EntityConfig::named("parent").with_opacity(0.5)).unwrap();
        let child = world.create_entity(Some(parent), EntityConfig::named("child").with_opacity(0.5)).unwrap();
        world.add_component(child, filled(4.0)).unwrap();

        let mut renderer = RenderSystem::new(Color::BLACK, true);
        record(&mut world, &mut renderer);
        assert!(renderer.stream().commands().any(|c| c == RenderCommand::SetOpacity(0.25)));

        world.set_opacity(parent, 0.0);
        record(&mut world, &mut renderer);
        assert_eq!(renderer.stream().draw_count(), 0);
    }
}
