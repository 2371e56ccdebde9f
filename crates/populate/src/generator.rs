use crate::catalog::{self, Entry};
use cavern_assets::{Material, Mesh};
use cavern_common::{CountRange, Extent, NodeId, ObjectKind, PopulationConfig, Transform};
use cavern_kernel::{BatMotion, Behavior, ObjectSpec, OlmMotion, Part, PartSpec, Population, Visual};
use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_6, PI, TAU};
use std::sync::Arc;

/// Non-interactive geometry: drawn, never hit-tested.
#[derive(Debug, Clone)]
pub struct SceneryPiece {
    pub name: &'static str,
    pub transform: Transform,
    pub visual: Visual,
}

/// A freshly generated cave.
#[derive(Debug, Clone)]
pub struct Cave {
    pub population: Population,
    pub scenery: Vec<SceneryPiece>,
}

/// Surface materials shared as templates. Each node receives its own copy.
#[derive(Debug, Clone, Copy)]
struct Palette {
    stalagmite: Material,
    crystal: Material,
    stalactite: Material,
    fungus: Material,
    bat: Material,
    olm: Material,
}

impl Palette {
    fn new() -> Self {
        let glowing_green = Material::standard(0x55aa33)
            .with_roughness(0.9)
            .with_emissive(0x22ff33, 0.15);
        Self {
            stalagmite: Material::standard(0x222222).with_roughness(1.0),
            crystal: Material::standard(0x7be4ff)
                .with_roughness(0.18)
                .with_metalness(0.12)
                .with_emissive(0x062f3b, 0.1),
            stalactite: Material::standard(0x2a2a2a).with_roughness(1.0),
            fungus: glowing_green,
            bat: Material::standard(0x222222)
                .with_roughness(0.7)
                .with_metalness(0.05),
            olm: Material::standard(0x3b3b3b).with_metalness(0.05),
        }
    }
}

/// Build the full population and scenery. Cannot fail.
pub fn generate<R: Rng>(config: &PopulationConfig, rng: &mut R) -> Cave {
    let mut generator = Generator {
        config,
        rng,
        palette: Palette::new(),
        population: Population::new(),
    };
    generator.stalagmites();
    generator.floor_clusters();
    generator.ceiling();
    generator.bats();
    generator.olms();
    generator.bacteria();

    let population = generator.population;
    for (kind, count) in population.count_by_kind() {
        tracing::debug!(kind = %kind, count, "placed objects");
    }
    tracing::info!(
        objects = population.roots().len(),
        nodes = population.len(),
        "generated cave population"
    );

    Cave {
        population,
        scenery: scenery(),
    }
}

struct Generator<'a, R> {
    config: &'a PopulationConfig,
    rng: &'a mut R,
    palette: Palette,
    population: Population,
}

impl<R: Rng> Generator<'_, R> {
    fn uniform(&mut self, min: f32, max: f32) -> f32 {
        min + self.rng.random::<f32>() * (max - min)
    }

    fn count(&mut self, range: CountRange) -> u32 {
        self.rng.random_range(range.min..=range.max)
    }

    fn point_in(&mut self, extent: Extent) -> Vec3 {
        Vec3::new(
            self.uniform(extent.min.x, extent.max.x),
            self.uniform(extent.min.y, extent.max.y),
            self.uniform(extent.min.z, extent.max.z),
        )
    }

    fn yaw(&mut self) -> Quat {
        Quat::from_rotation_y(self.uniform(0.0, TAU))
    }

    fn deformed(&mut self, mut mesh: Mesh, strength: f32) -> Mesh {
        mesh.deform(strength, &mut *self.rng);
        mesh
    }

    fn glowing(&self, kind: ObjectKind) -> Behavior {
        if kind.glows() {
            Behavior::Glow
        } else {
            Behavior::Static
        }
    }

    fn single(&mut self, kind: ObjectKind, entry: Entry, transform: Transform, visual: Visual) {
        let spec = ObjectSpec::new(kind, transform)
            .with_metadata(entry.metadata())
            .with_visual(visual)
            .with_behavior(self.glowing(kind));
        self.population.add_object(spec);
    }

    /// Attach a part under an object created moments ago.
    fn attach(&mut self, root: NodeId, spec: PartSpec) {
        let attached = self.population.add_part(root, spec);
        debug_assert!(attached.is_some(), "parent {root} was just created");
    }

    /// Each stalagmite is followed by its satellite spikes.
    fn stalagmites(&mut self) {
        for _ in 0..self.config.stalagmite_count {
            let height = self.uniform(2.5, 5.5);
            let radius = self.uniform(0.3, 0.6);
            let mesh = self.deformed(Mesh::cone(radius, height, 10), 0.05);
            let position = self.point_in(self.config.stalagmite_area);
            let visual = Visual::new(mesh, self.palette.stalagmite);
            self.single(
                ObjectKind::Mineral,
                catalog::STALAGMITE,
                Transform::from_position(position),
                visual,
            );

            let spikes = self.count(self.config.spikes_per_stalagmite);
            for _ in 0..spikes {
                let spike_radius = self.uniform(0.05, 0.13);
                let spike_height = self.uniform(0.2, 0.5);
                let spike = self.deformed(Mesh::cone(spike_radius, spike_height, 5), 0.05);
                let angle = self.uniform(0.0, TAU);
                let distance = self.uniform(radius, radius + 0.15);
                let at = Vec3::new(
                    position.x + angle.cos() * distance,
                    self.uniform(-0.2, -0.1),
                    position.z + angle.sin() * distance,
                );
                let transform = Transform::from_position(at).with_rotation(self.yaw());
                let visual = Visual::new(spike, self.palette.stalagmite);
                self.single(ObjectKind::Mineral, catalog::SPIKE, transform, visual);
            }
        }
    }

    /// A group of jittered six-sided shards under one metadata-bearing root.
    fn crystal_cluster(&mut self, position: Vec3, entry: Entry) -> NodeId {
        let root = self.population.add_object(
            ObjectSpec::new(ObjectKind::Mineral, Transform::from_position(position))
                .with_metadata(entry.metadata())
                .with_behavior(Behavior::Glow),
        );
        let shards = self.count(self.config.shards_per_cluster);
        for _ in 0..shards {
            let radius = self.uniform(0.15, 0.40);
            let height = self.uniform(0.6, 1.8);
            let mesh = self.deformed(Mesh::cone(radius, height, 6), 0.15);
            let offset = Vec3::new(
                self.uniform(-0.2, 0.2),
                self.uniform(0.0, 0.3),
                self.uniform(-0.2, 0.2),
            );
            let rotation = Quat::from_euler(
                EulerRot::XYZ,
                self.uniform(0.0, PI),
                self.uniform(0.0, PI),
                self.uniform(0.0, PI),
            );
            let spec = PartSpec::new(Part::Shard, Transform::from_position(offset).with_rotation(rotation))
                .with_visual(Visual::new(mesh, self.palette.crystal));
            self.attach(root, spec);
        }
        root
    }

    fn floor_clusters(&mut self) {
        for _ in 0..self.config.floor_cluster_count {
            let position = self.point_in(self.config.floor_cluster_area);
            self.crystal_cluster(position, catalog::CRYSTAL_CLUSTER);
        }
    }

    fn ceiling(&mut self) {
        for _ in 0..self.config.stalactite_count {
            let height = self.uniform(0.5, 1.7);
            let radius = self.uniform(0.08, 0.2);
            let mesh = self.deformed(Mesh::cone(radius, height, 6), 0.08);
            let position = self.point_in(self.config.stalactite_area);
            let rotation = Quat::from_euler(EulerRot::XYZ, PI, self.uniform(0.0, TAU), 0.0);
            let visual = Visual::new(mesh, self.palette.stalactite);
            self.single(
                ObjectKind::Mineral,
                catalog::STALACTITE,
                Transform::from_position(position).with_rotation(rotation),
                visual,
            );

            if self.rng.random_bool(f64::from(self.config.ceiling_crystal_chance)) {
                let at = position
                    + Vec3::new(self.uniform(-0.3, 0.3), -0.1, self.uniform(-0.3, 0.3));
                self.crystal_cluster(at, catalog::CEILING_CRYSTAL);
            }

            if self.rng.random_bool(f64::from(self.config.fungus_chance)) {
                let radius = self.uniform(0.05, 0.13);
                let at = position
                    + Vec3::new(
                        self.uniform(-0.1, 0.1),
                        self.uniform(-0.1, 0.0),
                        self.uniform(-0.1, 0.1),
                    );
                let visual = Visual::new(Mesh::sphere(radius, 6, 6), self.palette.fungus);
                self.single(
                    ObjectKind::Fungi,
                    catalog::FUNGUS,
                    Transform::from_position(at),
                    visual,
                );
            }
        }
    }

    fn bats(&mut self) {
        let body = Arc::new(Mesh::sphere(0.12, 8, 8));
        let wing = Arc::new(Mesh::cuboid(0.02, 0.18, 0.6));
        for _ in 0..self.config.bat_count {
            let spawn = self.point_in(self.config.flight_volume);
            let root = self.population.add_object(
                ObjectSpec::new(ObjectKind::Bat, Transform::from_position(spawn))
                    .with_metadata(catalog::BAT.metadata())
                    .with_behavior(Behavior::Bat(BatMotion::new(spawn, 0.0))),
            );
            let parts = [
                (Part::Body, Transform::default(), body.clone()),
                (
                    Part::LeftWing,
                    Transform::from_position(Vec3::new(-0.12, 0.0, -0.15))
                        .with_rotation(Quat::from_rotation_x(FRAC_PI_6)),
                    wing.clone(),
                ),
                (
                    Part::RightWing,
                    Transform::from_position(Vec3::new(0.12, 0.0, -0.15))
                        .with_rotation(Quat::from_rotation_x(-FRAC_PI_6)),
                    wing.clone(),
                ),
            ];
            for (part, transform, mesh) in parts {
                let spec = PartSpec::new(part, transform).with_visual(Visual::new(mesh, self.palette.bat));
                self.attach(root, spec);
            }
        }
    }

    fn olms(&mut self) {
        let body = Arc::new(Mesh::cylinder(0.12, 0.12, 1.0, 12));
        let head = Arc::new(Mesh::sphere(0.14, 8, 8));
        let leg = Arc::new(Mesh::cylinder(0.03, 0.03, 0.3, 6));
        for _ in 0..self.config.olm_count {
            let spawn = self.point_in(self.config.crawl_area);
            let transform = Transform::from_position(spawn).with_rotation(self.yaw());
            let root = self.population.add_object(
                ObjectSpec::new(ObjectKind::Olm, transform)
                    .with_metadata(catalog::OLM.metadata())
                    .with_behavior(Behavior::Olm(OlmMotion::new(spawn))),
            );

            let mut parts = vec![
                (
                    Part::Body,
                    Transform::default().with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
                    body.clone(),
                ),
                (
                    Part::Head,
                    Transform::from_position(Vec3::new(0.0, 0.0, 0.55)),
                    head.clone(),
                ),
            ];
            for (x, z) in [(-0.08, 0.2), (0.08, 0.2), (-0.08, -0.2), (0.08, -0.2)] {
                parts.push((
                    Part::Leg,
                    Transform::from_position(Vec3::new(x, -0.1, z))
                        .with_rotation(Quat::from_rotation_z(FRAC_PI_2)),
                    leg.clone(),
                ));
            }
            for (part, transform, mesh) in parts {
                let spec = PartSpec::new(part, transform).with_visual(Visual::new(mesh, self.palette.olm));
                self.attach(root, spec);
            }
        }
    }

    fn bacteria(&mut self) {
        for _ in 0..self.config.bacteria_count {
            let radius = self.uniform(0.05, 0.15);
            let height = self.uniform(0.02, 0.07);
            let mesh = self.deformed(Mesh::cylinder(radius, radius, height, 6), 0.02);
            let position = self.point_in(self.config.bacteria_area);
            let transform = Transform::from_position(position).with_rotation(self.yaw());
            let visual = Visual::new(mesh, self.palette.fungus);
            self.single(ObjectKind::Bacteria, catalog::BACTERIA, transform, visual);
        }
    }
}

/// Floor, ceiling dome and back wall.
pub fn scenery() -> Vec<SceneryPiece> {
    let mut dome = Transform::from_position(Vec3::new(0.0, 14.0, -10.0));
    dome.scale = Vec3::new(1.2, 0.9, 1.2);
    vec![
        SceneryPiece {
            name: "floor",
            transform: Transform::from_position(Vec3::new(0.0, -1.1, 0.0))
                .with_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
            visual: Visual::new(Mesh::plane(120.0, 80.0), Material::standard(0x111111)),
        },
        SceneryPiece {
            name: "ceiling",
            transform: dome,
            visual: Visual::new(Mesh::dome(40.0, 64, 32), Material::standard(0x0b0b0b)),
        },
        SceneryPiece {
            name: "back wall",
            transform: Transform::from_position(Vec3::new(0.0, 8.0, -30.0)),
            visual: Visual::new(Mesh::cuboid(80.0, 30.0, 2.0), Material::standard(0x060607)),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn cave(seed: u64) -> Cave {
        generate(&PopulationConfig::default(), &mut SmallRng::seed_from_u64(seed))
    }

    fn roots_named<'a>(pop: &'a Population, name: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        pop.roots().iter().copied().filter(move |id| {
            pop.get(*id)
                .and_then(|n| n.metadata.as_ref())
                .is_some_and(|m| m.display_name == name)
        })
    }

    #[test]
    fn category_counts_match_config() {
        let cave = cave(7);
        let pop = &cave.population;
        assert_eq!(roots_named(pop, catalog::STALAGMITE.name).count(), 12);
        assert_eq!(roots_named(pop, catalog::CRYSTAL_CLUSTER.name).count(), 8);
        assert_eq!(roots_named(pop, catalog::STALACTITE.name).count(), 60);
        assert_eq!(roots_named(pop, catalog::BACTERIA.name).count(), 20);
        assert_eq!(roots_named(pop, catalog::BAT.name).count(), 8);
        assert_eq!(roots_named(pop, catalog::OLM.name).count(), 6);

        let spikes = roots_named(pop, catalog::SPIKE.name).count();
        assert!((12 * 4..=12 * 8).contains(&spikes), "{spikes} spikes");
        assert!(roots_named(pop, catalog::CEILING_CRYSTAL.name).count() <= 60);
        assert!(roots_named(pop, catalog::FUNGUS.name).count() <= 60);
    }

    #[test]
    fn spikes_ring_their_stalagmite() {
        let config = PopulationConfig::default();
        for seed in 0..4 {
            let cave = generate(&config, &mut SmallRng::seed_from_u64(seed));
            let pop = &cave.population;
            let mut groups: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
            for id in pop.roots() {
                let name = &pop.get(*id).unwrap().metadata.as_ref().unwrap().display_name;
                if name == catalog::STALAGMITE.name {
                    groups.push((*id, Vec::new()));
                } else if name == catalog::SPIKE.name {
                    groups.last_mut().expect("spike before any stalagmite").1.push(*id);
                }
            }
            assert_eq!(groups.len(), 12);

            for (stalagmite, spikes) in groups {
                let range = config.spikes_per_stalagmite;
                let count = spikes.len() as u32;
                assert!((range.min..=range.max).contains(&count), "{count} spikes");

                let node = pop.get(stalagmite).unwrap();
                // Ten-segment base ring spans exactly 2r along z before jitter.
                let bounds = node.visual.as_ref().unwrap().mesh.bounds().unwrap();
                let radius = bounds.size().z / 2.0;
                let center = node.transform.position;
                for spike in spikes {
                    let at = pop.get(spike).unwrap().transform.position;
                    let distance = Vec2::new(at.x - center.x, at.z - center.z).length();
                    assert!(
                        distance >= radius - 0.03 && distance <= radius + 0.18,
                        "spike at {distance} from a stalagmite of radius {radius}"
                    );
                }
            }
        }
    }

    #[test]
    fn every_object_carries_metadata() {
        let cave = cave(11);
        for id in cave.population.roots() {
            assert!(cave.population.get(*id).unwrap().metadata.is_some());
        }
    }

    #[test]
    fn spawn_positions_stay_in_allowed_extents() {
        let config = PopulationConfig::default();
        for seed in 0..8 {
            let cave = generate(&config, &mut SmallRng::seed_from_u64(seed));
            for id in cave.population.roots() {
                let node = cave.population.get(*id).unwrap();
                let inside = config
                    .allowed_extents(node.kind)
                    .iter()
                    .any(|e| e.contains(node.spawn_position));
                assert!(inside, "{} at {}", node.kind, node.spawn_position);
            }
        }
    }

    #[test]
    fn clusters_have_three_to_six_shards() {
        let cave = cave(3);
        let pop = &cave.population;
        let clusters: Vec<_> = roots_named(pop, catalog::CRYSTAL_CLUSTER.name)
            .chain(roots_named(pop, catalog::CEILING_CRYSTAL.name))
            .collect();
        for id in clusters {
            let node = pop.get(id).unwrap();
            assert!((3..=6).contains(&node.children.len()));
            assert!(node.visual.is_none());
            assert!(node.children.iter().all(|c| pop.get(*c).unwrap().part == Part::Shard));
        }
    }

    #[test]
    fn creatures_have_their_parts() {
        let cave = cave(5);
        let pop = &cave.population;
        for id in roots_named(pop, catalog::BAT.name) {
            let parts: Vec<_> = pop.get(id).unwrap().children.iter().map(|c| pop.get(*c).unwrap().part).collect();
            assert_eq!(parts, vec![Part::Body, Part::LeftWing, Part::RightWing]);
            assert!(matches!(pop.get(id).unwrap().behavior, Behavior::Bat(_)));
        }
        for id in roots_named(pop, catalog::OLM.name) {
            let node = pop.get(id).unwrap();
            assert_eq!(node.children.len(), 6);
            let legs = node.children.iter().filter(|c| pop.get(**c).unwrap().part == Part::Leg).count();
            assert_eq!(legs, 4);
            assert!(matches!(node.behavior, Behavior::Olm(_)));
        }
    }

    #[test]
    fn parts_carry_no_metadata() {
        let cave = cave(9);
        for (_, node) in cave.population.iter() {
            if node.parent.is_some() {
                assert!(node.metadata.is_none());
            }
        }
    }

    #[test]
    fn minerals_and_fungi_glow() {
        let cave = cave(2);
        for id in cave.population.roots() {
            let node = cave.population.get(*id).unwrap();
            let glows = matches!(node.behavior, Behavior::Glow);
            assert_eq!(glows, node.kind.glows(), "{}", node.kind);
        }
    }

    #[test]
    fn same_seed_same_cave() {
        let a = cave(42);
        let b = cave(42);
        assert_eq!(a.population.len(), b.population.len());
        for ((_, na), (_, nb)) in a.population.iter().zip(b.population.iter()) {
            assert_eq!(na.transform, nb.transform);
        }
    }

    #[test]
    fn stalactites_hang_downward() {
        let cave = cave(1);
        let pop = &cave.population;
        for id in roots_named(pop, catalog::STALACTITE.name) {
            let up = pop.get(id).unwrap().transform.rotation * Vec3::Y;
            assert!(up.y < -0.99);
        }
    }

    #[test]
    fn materials_are_per_node() {
        let mut cave = cave(4);
        let first = cave.population.roots()[0];
        let second = cave.population.roots()[1];
        let before = cave.population.get(second).unwrap().visual.as_ref().unwrap().material;
        cave.population.get_mut(first).unwrap().visual.as_mut().unwrap().material.emissive =
            cavern_common::Color::from_hex(0xffffff);
        let after = cave.population.get(second).unwrap().visual.as_ref().unwrap().material;
        assert_eq!(before, after);
    }

    #[test]
    fn scenery_has_floor_ceiling_and_wall() {
        let names: Vec<_> = scenery().iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["floor", "ceiling", "back wall"]);
    }

    #[test]
    fn empty_config_generates_nothing() {
        let config = PopulationConfig {
            stalagmite_count: 0,
            floor_cluster_count: 0,
            stalactite_count: 0,
            bacteria_count: 0,
            bat_count: 0,
            olm_count: 0,
            ..PopulationConfig::default()
        };
        let cave = generate(&config, &mut SmallRng::seed_from_u64(0));
        assert!(cave.population.is_empty());
        assert_eq!(cave.scenery.len(), 3);
    }
}
