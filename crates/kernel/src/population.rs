use crate::behavior::Behavior;
use cavern_assets::{Material, Mesh};
use cavern_common::{Color, Metadata, NodeId, ObjectKind, Transform};
use glam::{Mat4, Vec3};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The role a node plays inside its object. Behavior updaters pose parts by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    /// A top-level object.
    Whole,
    Body,
    Head,
    LeftWing,
    RightWing,
    Leg,
    Shard,
}

/// Drawable geometry attached to a node.
#[derive(Debug, Clone)]
pub struct Visual {
    pub mesh: Arc<Mesh>,
    pub material: Material,
}

impl Visual {
    pub fn new(mesh: impl Into<Arc<Mesh>>, material: Material) -> Self {
        Self {
            mesh: mesh.into(),
            material,
        }
    }
}

/// Per-node highlight bookkeeping, rewritten every frame by the hit-test pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Highlight {
    /// Emissive color before the highlight machine first touched this node.
    pub original_emissive: Option<Color>,
    /// Whether the owning object is the hovered one this frame.
    pub hovered: bool,
    /// Normalized hover emphasis in [0, 1].
    pub intensity: f32,
}

/// One node of the population tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: ObjectKind,
    pub part: Part,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub metadata: Option<Arc<Metadata>>,
    /// Local transform relative to the parent (world transform for roots).
    pub transform: Transform,
    /// Scale the highlight machine relaxes back to.
    pub base_scale: Vec3,
    /// Position at creation. Phase offsets derive from it.
    pub spawn_position: Vec3,
    pub visual: Option<Visual>,
    pub highlight: Highlight,
    pub behavior: Behavior,
}

/// Description of a top-level object to add.
#[derive(Debug, Clone)]
pub struct ObjectSpec {
    pub kind: ObjectKind,
    pub transform: Transform,
    pub metadata: Option<Metadata>,
    pub visual: Option<Visual>,
    pub behavior: Behavior,
}

impl ObjectSpec {
    pub fn new(kind: ObjectKind, transform: Transform) -> Self {
        Self {
            kind,
            transform,
            metadata: None,
            visual: None,
            behavior: Behavior::Static,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_visual(mut self, visual: Visual) -> Self {
        self.visual = Some(visual);
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }
}

/// Description of a sub-part to attach under an existing node.
#[derive(Debug, Clone)]
pub struct PartSpec {
    pub part: Part,
    pub transform: Transform,
    pub metadata: Option<Metadata>,
    pub visual: Option<Visual>,
}

impl PartSpec {
    pub fn new(part: Part, transform: Transform) -> Self {
        Self {
            part,
            transform,
            metadata: None,
            visual: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_visual(mut self, visual: Visual) -> Self {
        self.visual = Some(visual);
        self
    }
}

/// The static set of placed objects: an arena-backed ownership tree.
///
/// Objects are created once during scene setup and never removed. Sub-parts
/// inherit their owner's kind. Metadata may sit on any node; a hit on a part
/// without metadata resolves upward to the nearest ancestor that has some.
#[derive(Debug, Clone, Default)]
pub struct Population {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of nodes, parts included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level objects in creation order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Add a top-level object. Returns its id.
    pub fn add_object(&mut self, spec: ObjectSpec) -> NodeId {
        let id = self.push(Node {
            kind: spec.kind,
            part: Part::Whole,
            parent: None,
            children: Vec::new(),
            metadata: spec.metadata.map(Arc::new),
            base_scale: spec.transform.scale,
            spawn_position: spec.transform.position,
            transform: spec.transform,
            visual: spec.visual,
            highlight: Highlight::default(),
            behavior: spec.behavior,
        });
        self.roots.push(id);
        id
    }

    /// Attach a part under `parent`. Returns `None` if the parent does not exist.
    pub fn add_part(&mut self, parent: NodeId, spec: PartSpec) -> Option<NodeId> {
        let kind = self.get(parent)?.kind;
        let id = self.push(Node {
            kind,
            part: spec.part,
            parent: Some(parent),
            children: Vec::new(),
            metadata: spec.metadata.map(Arc::new),
            base_scale: spec.transform.scale,
            spawn_position: spec.transform.position,
            transform: spec.transform,
            visual: spec.visual,
            highlight: Highlight::default(),
            behavior: Behavior::Static,
        });
        self.nodes[parent.index()].children.push(id);
        Some(id)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// `id` and all its descendants, depth-first, parents before children.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(node) = self.get(next) else {
                continue;
            };
            out.push(next);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// The top-level object that owns `id`.
    pub fn object_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.get(current).and_then(|n| n.parent) {
            current = parent;
        }
        current
    }

    /// Nearest node at or above `id` carrying metadata.
    ///
    /// Falls back to the object root when nothing in the chain has metadata;
    /// that root is then the unit that highlights and pulses.
    pub fn metadata_owner(&self, id: NodeId) -> NodeId {
        let mut current = id;
        loop {
            let Some(node) = self.get(current) else {
                return current;
            };
            if node.metadata.is_some() {
                return current;
            }
            match node.parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    /// Metadata of `id`'s owner, or [`Metadata::unknown`] if the chain has none.
    pub fn resolve_metadata(&self, id: NodeId) -> Arc<Metadata> {
        self.get(self.metadata_owner(id))
            .and_then(|node| node.metadata.clone())
            .unwrap_or_else(|| Arc::new(Metadata::unknown()))
    }

    /// Local-to-world matrix, composed through every ancestor.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(cid) = current {
            let Some(node) = self.get(cid) else {
                break;
            };
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// World-space position of a node's origin.
    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).transform_point3(Vec3::ZERO)
    }

    /// Nodes that carry geometry.
    pub fn visuals(&self) -> impl Iterator<Item = (NodeId, &Node, &Visual)> {
        self.iter()
            .filter_map(|(id, node)| node.visual.as_ref().map(|v| (id, node, v)))
    }

    /// Objects currently flagged as hovered. At most one after a hit-test pass.
    pub fn hovered_objects(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(id, node)| node.highlight.hovered && self.metadata_owner(*id) == *id)
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of top-level objects per kind.
    pub fn count_by_kind(&self) -> BTreeMap<ObjectKind, usize> {
        let mut counts = BTreeMap::new();
        for id in &self.roots {
            if let Some(node) = self.get(*id) {
                *counts.entry(node.kind).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn three_level(pop: &mut Population, meta_on_root: bool) -> (NodeId, NodeId, NodeId) {
        let mut spec = ObjectSpec::new(ObjectKind::Mineral, Transform::default());
        if meta_on_root {
            spec = spec.with_metadata(Metadata::new("Crystal Cluster", "Shiny."));
        }
        let root = pop.add_object(spec);
        let mid = pop
            .add_part(root, PartSpec::new(Part::Shard, Transform::default()))
            .unwrap();
        let leaf = pop
            .add_part(mid, PartSpec::new(Part::Shard, Transform::default()))
            .unwrap();
        (root, mid, leaf)
    }

    #[test]
    fn population_starts_empty() {
        let pop = Population::new();
        assert!(pop.is_empty());
        assert!(pop.roots().is_empty());
    }

    #[test]
    fn parts_inherit_kind() {
        let mut pop = Population::new();
        let bat = pop.add_object(ObjectSpec::new(ObjectKind::Bat, Transform::default()));
        let wing = pop
            .add_part(bat, PartSpec::new(Part::LeftWing, Transform::default()))
            .unwrap();
        assert_eq!(pop.get(wing).unwrap().kind, ObjectKind::Bat);
        assert_eq!(pop.roots(), &[bat]);
        assert_eq!(pop.len(), 2);
    }

    #[test]
    fn add_part_to_missing_parent_fails() {
        let mut pop = Population::new();
        assert!(
            pop.add_part(NodeId(9), PartSpec::new(Part::Body, Transform::default()))
                .is_none()
        );
    }

    #[test]
    fn metadata_walk_finds_ancestor_two_levels_up() {
        let mut pop = Population::new();
        let (root, _, leaf) = three_level(&mut pop, true);
        assert_eq!(pop.metadata_owner(leaf), root);
        assert_eq!(pop.resolve_metadata(leaf).display_name, "Crystal Cluster");
    }

    #[test]
    fn metadata_walk_stops_at_nearest_owner() {
        let mut pop = Population::new();
        let (_, mid, leaf) = three_level(&mut pop, true);
        pop.get_mut(mid).unwrap().metadata = Some(Arc::new(Metadata::new("Shard", "One shard.")));
        assert_eq!(pop.metadata_owner(leaf), mid);
    }

    #[test]
    fn metadata_walk_defaults_to_unknown() {
        let mut pop = Population::new();
        let (root, _, leaf) = three_level(&mut pop, false);
        assert_eq!(pop.metadata_owner(leaf), root);
        assert_eq!(*pop.resolve_metadata(leaf), Metadata::unknown());
    }

    #[test]
    fn subtree_is_preorder() {
        let mut pop = Population::new();
        let (root, mid, leaf) = three_level(&mut pop, true);
        let other = pop
            .add_part(root, PartSpec::new(Part::Shard, Transform::default()))
            .unwrap();
        assert_eq!(pop.subtree(root), vec![root, mid, leaf, other]);
        assert_eq!(pop.object_root(leaf), root);
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut pop = Population::new();
        let root = pop.add_object(
            ObjectSpec::new(
                ObjectKind::Olm,
                Transform::from_position(Vec3::new(1.0, 0.0, 0.0))
                    .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
            ),
        );
        let head = pop
            .add_part(
                root,
                PartSpec::new(Part::Head, Transform::from_position(Vec3::new(0.0, 0.0, 1.0))),
            )
            .unwrap();
        let p = pop.world_position(head);
        // +Z rotated a quarter turn about Y becomes +X.
        assert!((p - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn count_by_kind_counts_roots_only() {
        let mut pop = Population::new();
        three_level(&mut pop, true);
        pop.add_object(ObjectSpec::new(ObjectKind::Bat, Transform::default()));
        let counts = pop.count_by_kind();
        assert_eq!(counts[&ObjectKind::Mineral], 1);
        assert_eq!(counts[&ObjectKind::Bat], 1);
        assert!(!counts.contains_key(&ObjectKind::Olm));
    }

    #[test]
    fn hovered_objects_reports_owners() {
        let mut pop = Population::new();
        let (root, mid, _) = three_level(&mut pop, true);
        for id in pop.subtree(root) {
            pop.get_mut(id).unwrap().highlight.hovered = true;
        }
        assert_eq!(pop.hovered_objects(), vec![root]);
        assert!(!pop.hovered_objects().contains(&mid));
    }
}
