use cavern_common::{NodeId, ObjectKind, PopulationConfig};
use cavern_kernel::Population;
use serde::Serialize;
use std::collections::BTreeMap;

/// Read-only queries against the population for debugging and CLI output.
pub struct PopulationInspector;

impl PopulationInspector {
    pub fn summary(population: &Population) -> PopulationSummary {
        let mut meshes = 0;
        let mut triangles = 0;
        for (_, _, visual) in population.visuals() {
            meshes += 1;
            triangles += visual.mesh.triangle_count();
        }
        PopulationSummary {
            objects: population.roots().len(),
            nodes: population.len(),
            meshes,
            triangles,
            per_kind: population.count_by_kind(),
            hovered: population.hovered_objects().len(),
        }
    }

    pub fn inspect(population: &Population, id: NodeId) -> Option<ObjectInfo> {
        let node = population.get(id)?;
        let p = node.transform.position;
        let s = node.transform.scale;
        let meta = population.resolve_metadata(id);
        Some(ObjectInfo {
            id: id.0,
            kind: node.kind,
            name: meta.display_name.clone(),
            position: [p.x, p.y, p.z],
            scale: [s.x, s.y, s.z],
            parts: population.subtree(id).len() - 1,
        })
    }

    /// Every top-level object, in creation order.
    pub fn list(population: &Population) -> Vec<ObjectInfo> {
        population
            .roots()
            .iter()
            .filter_map(|id| Self::inspect(population, *id))
            .collect()
    }

    /// Objects whose spawn position lies outside every extent allowed for
    /// their kind.
    pub fn audit_bounds(population: &Population, config: &PopulationConfig) -> Vec<BoundsViolation> {
        let mut violations = Vec::new();
        for id in population.roots() {
            let Some(node) = population.get(*id) else {
                continue;
            };
            let extents = config.allowed_extents(node.kind);
            if !extents.iter().any(|e| e.contains(node.spawn_position)) {
                let p = node.spawn_position;
                tracing::warn!(id = %id, kind = %node.kind, "spawn outside allowed extents");
                violations.push(BoundsViolation {
                    id: id.0,
                    kind: node.kind,
                    position: [p.x, p.y, p.z],
                });
            }
        }
        violations
    }
}

/// Aggregate counts for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct PopulationSummary {
    pub objects: usize,
    pub nodes: usize,
    pub meshes: usize,
    pub triangles: usize,
    pub per_kind: BTreeMap<ObjectKind, usize>,
    pub hovered: usize,
}

impl std::fmt::Display for PopulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cave: objects={} nodes={} meshes={} triangles={} hovered={}",
            self.objects, self.nodes, self.meshes, self.triangles, self.hovered
        )?;
        for (kind, count) in &self.per_kind {
            write!(f, "\n  {kind:<9} {count}")?;
        }
        Ok(())
    }
}

/// One object as shown by the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectInfo {
    pub id: u32,
    pub kind: ObjectKind,
    pub name: String,
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub parts: usize,
}

impl std::fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{:<4} {:<9} pos=({:.2}, {:.2}, {:.2}) parts={} {}",
            self.id,
            self.kind.as_str(),
            self.position[0],
            self.position[1],
            self.position[2],
            self.parts,
            self.name,
        )
    }
}

/// An object placed outside the extents allowed for its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundsViolation {
    pub id: u32,
    pub kind: ObjectKind,
    pub position: [f32; 3],
}
