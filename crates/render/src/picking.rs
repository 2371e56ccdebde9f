use cavern_assets::Aabb;
use cavern_common::NodeId;
use cavern_kernel::Population;
use glam::Vec3;

/// A half-line in world space. `direction` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or(Vec3::NEG_Z),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Entry distance into an axis-aligned box, clamped to zero when the
    /// origin is inside.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        const EPS: f32 = 1e-6;
        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;
        for axis in 0..3 {
            let o = self.origin[axis];
            let d = self.direction[axis];
            let (mn, mx) = (aabb.min[axis], aabb.max[axis]);
            if d.abs() < EPS {
                if o < mn || o > mx {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (mut t1, mut t2) = ((mn - o) * inv, (mx - o) * inv);
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            tmin = tmin.max(t1);
            tmax = tmax.min(t2);
            if tmax < tmin {
                return None;
            }
        }
        if tmax < 0.0 { None } else { Some(tmin.max(0.0)) }
    }

    /// Two-sided ray/triangle test. Returns the hit distance.
    pub fn intersect_triangle(&self, [a, b, c]: [Vec3; 3]) -> Option<f32> {
        const EPS: f32 = 1e-7;
        let e1 = b - a;
        let e2 = c - a;
        let p = self.direction.cross(e2);
        let det = e1.dot(p);
        if det.abs() < EPS {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(e1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(q) * inv_det;
        (t > EPS).then_some(t)
    }
}

/// One intersection between a ray and a node's geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// The mesh node that was struck, not yet resolved to its owner.
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
}

/// Ray queries against the population.
pub trait ScenePicker {
    /// Every node the ray strikes, nearest first. At most one hit per node.
    fn intersect(&self, population: &Population, ray: &Ray) -> Vec<Hit>;

    /// The nearest hit, if any.
    fn nearest(&self, population: &Population, ray: &Ray) -> Option<Hit> {
        self.intersect(population, ray).into_iter().next()
    }
}

/// Brute-force picker over world-space triangles with a bounding-box early out.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuPicker;

impl ScenePicker for CpuPicker {
    fn intersect(&self, population: &Population, ray: &Ray) -> Vec<Hit> {
        let mut hits = Vec::new();
        for (id, _, visual) in population.visuals() {
            let matrix = population.world_matrix(id);
            let Some(bounds) = visual.mesh.bounds() else {
                continue;
            };
            if ray.intersect_aabb(&bounds.transformed(&matrix)).is_none() {
                continue;
            }
            let best = visual
                .mesh
                .triangles()
                .map(|tri| tri.map(|v| matrix.transform_point3(v)))
                .filter_map(|tri| ray.intersect_triangle(tri))
                .fold(None, |best: Option<f32>, t| match best {
                    Some(b) if b <= t => Some(b),
                    _ => Some(t),
                });
            if let Some(distance) = best {
                hits.push(Hit {
                    node: id,
                    distance,
                    point: ray.at(distance),
                });
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        tracing::trace!(hits = hits.len(), "picked");
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavern_assets::{Material, Mesh};
    use cavern_common::{ObjectKind, Transform};
    use cavern_kernel::{ObjectSpec, Part, PartSpec, Visual};

    fn cube_at(pop: &mut Population, position: Vec3) -> NodeId {
        pop.add_object(
            ObjectSpec::new(ObjectKind::Mineral, Transform::from_position(position))
                .with_visual(Visual::new(Mesh::cuboid(1.0, 1.0, 1.0), Material::default())),
        )
    }

    #[test]
    fn ray_hits_box_in_front() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let aabb = Aabb {
            min: Vec3::new(-1.0, -1.0, -6.0),
            max: Vec3::new(1.0, 1.0, -4.0),
        };
        assert_eq!(ray.intersect_aabb(&aabb), Some(4.0));
    }

    #[test]
    fn ray_misses_box_behind() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let aabb = Aabb {
            min: Vec3::new(-1.0, -1.0, -6.0),
            max: Vec3::new(1.0, 1.0, -4.0),
        };
        assert!(ray.intersect_aabb(&aabb).is_none());
    }

    #[test]
    fn triangle_hit_from_either_side() {
        let tri = [
            Vec3::new(-1.0, -1.0, -3.0),
            Vec3::new(1.0, -1.0, -3.0),
            Vec3::new(0.0, 1.0, -3.0),
        ];
        let front = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let back = Ray::new(Vec3::new(0.0, 0.0, -6.0), Vec3::Z);
        assert!((front.intersect_triangle(tri).unwrap() - 3.0).abs() < 1e-5);
        assert!((back.intersect_triangle(tri).unwrap() - 3.0).abs() < 1e-5);
        let wide = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z);
        assert!(wide.intersect_triangle(tri).is_none());
    }

    #[test]
    fn picker_sorts_nearest_first() {
        let mut pop = Population::new();
        let far = cube_at(&mut pop, Vec3::new(0.0, 0.0, -10.0));
        let near = cube_at(&mut pop, Vec3::new(0.0, 0.0, -4.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hits = CpuPicker.intersect(&pop, &ray);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, near);
        assert_eq!(hits[1].node, far);
        assert!((hits[0].distance - 3.5).abs() < 1e-4);
        assert!((hits[0].point.z + 3.5).abs() < 1e-4);
    }

    #[test]
    fn picker_reports_the_struck_part() {
        let mut pop = Population::new();
        let root = pop.add_object(ObjectSpec::new(
            ObjectKind::Bat,
            Transform::from_position(Vec3::new(0.0, 0.0, -5.0)),
        ));
        let body = pop
            .add_part(
                root,
                PartSpec::new(Part::Body, Transform::default())
                    .with_visual(Visual::new(Mesh::sphere(0.5, 12, 8), Material::default())),
            )
            .unwrap();
        let hit = CpuPicker
            .nearest(&pop, &Ray::new(Vec3::ZERO, Vec3::NEG_Z))
            .unwrap();
        assert_eq!(hit.node, body);
        assert_eq!(pop.metadata_owner(hit.node), root);
    }

    #[test]
    fn picker_follows_moved_objects() {
        let mut pop = Population::new();
        let cube = cube_at(&mut pop, Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(CpuPicker.nearest(&pop, &ray).is_some());
        pop.get_mut(cube).unwrap().transform.position.x = 10.0;
        assert!(CpuPicker.nearest(&pop, &ray).is_none());
    }

    #[test]
    fn empty_population_has_no_hits() {
        let pop = Population::new();
        assert!(CpuPicker.intersect(&pop, &Ray::new(Vec3::ZERO, Vec3::NEG_Z)).is_empty());
    }
}
