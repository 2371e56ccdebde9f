use cavern_common::{InteractionConfig, NodeId};
use cavern_kernel::Population;
use std::collections::HashSet;

/// One frame of the hover state machine.
///
/// `hovered` is the metadata owner of this frame's nearest hit. Every node in
/// its subtree is lit and eases toward the hover emissive and enlarged scale.
/// Everything else eases back toward its captured original emissive and base
/// scale. The two branches are exclusive per node.
pub fn update(population: &mut Population, hovered: Option<NodeId>, config: &InteractionConfig) {
    let lit: HashSet<NodeId> = hovered
        .map(|owner| population.subtree(owner).into_iter().collect())
        .unwrap_or_default();

    for index in 0..population.len() {
        let id = NodeId(index as u32);
        let is_lit = lit.contains(&id);
        let Some(node) = population.get_mut(id) else {
            continue;
        };
        node.highlight.hovered = is_lit;
        let Some(visual) = node.visual.as_mut() else {
            continue;
        };

        let material = &mut visual.material;
        let original = *node.highlight.original_emissive.get_or_insert(material.emissive);
        if is_lit {
            material.emissive = material
                .emissive
                .lerp(config.hover_emissive, config.acquire_emissive_lerp);
            node.transform.scale = node
                .transform
                .scale
                .lerp(node.base_scale * config.hover_scale, config.acquire_scale_lerp);
            node.highlight.intensity +=
                (1.0 - node.highlight.intensity) * config.acquire_emissive_lerp;
        } else {
            material.emissive = material.emissive.lerp(original, config.release_lerp);
            node.transform.scale = node
                .transform
                .scale
                .lerp(node.base_scale, config.release_lerp);
            node.highlight.intensity -= node.highlight.intensity * config.release_lerp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavern_assets::{Material, Mesh};
    use cavern_common::{Color, Metadata, ObjectKind, Transform};
    use cavern_kernel::{ObjectSpec, Part, PartSpec, Visual};
    use glam::Vec3;

    fn crystal(pop: &mut Population) -> (NodeId, NodeId) {
        let root = pop.add_object(
            ObjectSpec::new(ObjectKind::Mineral, Transform::default())
                .with_metadata(Metadata::new("Crystal Cluster", "Shiny.")),
        );
        let shard = pop
            .add_part(
                root,
                PartSpec::new(Part::Shard, Transform::default()).with_visual(Visual::new(
                    Mesh::cone(0.2, 1.0, 6),
                    Material::standard(0x7be4ff).with_emissive(0x062f3b, 0.1),
                )),
            )
            .unwrap();
        (root, shard)
    }

    #[test]
    fn hovered_subtree_moves_toward_highlight() {
        let config = InteractionConfig::default();
        let mut pop = Population::new();
        let (root, shard) = crystal(&mut pop);
        update(&mut pop, Some(root), &config);

        let node = pop.get(shard).unwrap();
        assert!(node.highlight.hovered);
        assert!((node.transform.scale.x - 1.008).abs() < 1e-5);
        assert_eq!(node.highlight.original_emissive, Some(Color::from_hex(0x062f3b)));
        let emissive = node.visual.as_ref().unwrap().material.emissive;
        let expected = Color::from_hex(0x062f3b).lerp(Color::from_hex(0x222222), 0.25);
        assert!(emissive.distance(expected) < 1e-6);
        assert_eq!(pop.hovered_objects(), vec![root]);
    }

    #[test]
    fn original_emissive_is_captured_once() {
        let config = InteractionConfig::default();
        let mut pop = Population::new();
        let (root, shard) = crystal(&mut pop);
        for _ in 0..10 {
            update(&mut pop, Some(root), &config);
        }
        let node = pop.get(shard).unwrap();
        assert_eq!(node.highlight.original_emissive, Some(Color::from_hex(0x062f3b)));
    }

    #[test]
    fn release_relaxes_monotonically() {
        let config = InteractionConfig::default();
        let mut pop = Population::new();
        let (root, shard) = crystal(&mut pop);
        for _ in 0..30 {
            update(&mut pop, Some(root), &config);
        }
        let original = Color::from_hex(0x062f3b);
        let mut last_scale = f32::INFINITY;
        let mut last_color = f32::INFINITY;
        for _ in 0..100 {
            update(&mut pop, None, &config);
            let node = pop.get(shard).unwrap();
            let scale_gap = (node.transform.scale - node.base_scale).length();
            let color_gap = node.visual.as_ref().unwrap().material.emissive.distance(original);
            assert!(scale_gap <= last_scale);
            assert!(color_gap <= last_color);
            assert!(!node.highlight.hovered);
            last_scale = scale_gap;
            last_color = color_gap;
        }
        assert!(last_scale < 1e-3);
        assert!(pop.hovered_objects().is_empty());
    }

    #[test]
    fn only_the_owner_subtree_is_lit() {
        let config = InteractionConfig::default();
        let mut pop = Population::new();
        let (root, _) = crystal(&mut pop);
        let (_, other_shard) = crystal(&mut pop);
        update(&mut pop, Some(root), &config);
        let other = pop.get(other_shard).unwrap();
        assert!(!other.highlight.hovered);
        assert_eq!(other.transform.scale, Vec3::ONE);
        assert_eq!(pop.hovered_objects(), vec![root]);
    }

    #[test]
    fn intensity_stays_normalized() {
        let config = InteractionConfig::default();
        let mut pop = Population::new();
        let (root, shard) = crystal(&mut pop);
        for i in 0..200 {
            let hovered = (i / 20) % 2 == 0;
            update(&mut pop, hovered.then_some(root), &config);
            let intensity = pop.get(shard).unwrap().highlight.intensity;
            assert!((0.0..=1.0).contains(&intensity));
        }
    }
}
