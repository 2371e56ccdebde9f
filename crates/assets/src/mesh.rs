use glam::{Mat4, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Bounds of this box after an affine transform.
    pub fn transformed(&self, m: &Mat4) -> Self {
        let corners = (0..8).map(|i| {
            let pick = |bit: u32, lo: f32, hi: f32| if i & bit == 0 { lo } else { hi };
            m.transform_point3(Vec3::new(
                pick(1, self.min.x, self.max.x),
                pick(2, self.min.y, self.max.y),
                pick(4, self.min.z, self.max.z),
            ))
        });
        // Eight corners are always present.
        Self::from_points(corners).unwrap_or(*self)
    }
}

/// Indexed triangle mesh with per-vertex normals.
///
/// Primitives are centred on the origin with +Y up, matching the usual
/// real-time conventions: cones point up, planes face +Z.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Mesh {
    fn from_parts(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let mut mesh = Self {
            normals: vec![Vec3::ZERO; positions.len()],
            positions,
            indices,
        };
        mesh.compute_vertex_normals();
        mesh
    }

    /// Cone with its apex at `+height/2`.
    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        Self::cylinder(0.0, radius, height, radial_segments)
    }

    /// Capped cylinder (or frustum) along Y. A zero top radius gives a cone.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Self {
        let segs = radial_segments.max(3);
        let half = height * 0.5;
        let ring = |radius: f32, y: f32| {
            (0..segs).map(move |i| {
                let theta = i as f32 / segs as f32 * TAU;
                Vec3::new(radius * theta.sin(), y, radius * theta.cos())
            })
        };

        let mut positions = Vec::new();
        let mut indices = Vec::new();

        // Side wall.
        let bottom_start = if radius_top > 0.0 {
            positions.extend(ring(radius_top, half));
            segs
        } else {
            positions.push(Vec3::new(0.0, half, 0.0));
            1
        };
        positions.extend(ring(radius_bottom, -half));
        for i in 0..segs {
            let next = (i + 1) % segs;
            let b = bottom_start + i;
            let c = bottom_start + next;
            if radius_top > 0.0 {
                let (a, d) = (i, next);
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            } else {
                indices.extend_from_slice(&[0, b, c]);
            }
        }

        // Caps get their own vertices so their normals stay flat.
        if radius_top > 0.0 {
            let center = positions.len() as u32;
            positions.push(Vec3::new(0.0, half, 0.0));
            let start = positions.len() as u32;
            positions.extend(ring(radius_top, half));
            for i in 0..segs {
                indices.extend_from_slice(&[start + i, start + (i + 1) % segs, center]);
            }
        }
        if radius_bottom > 0.0 {
            let center = positions.len() as u32;
            positions.push(Vec3::new(0.0, -half, 0.0));
            let start = positions.len() as u32;
            positions.extend(ring(radius_bottom, -half));
            for i in 0..segs {
                indices.extend_from_slice(&[start + (i + 1) % segs, start + i, center]);
            }
        }

        Self::from_parts(positions, indices)
    }

    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self::sphere_section(radius, width_segments, height_segments, PI)
    }

    /// Upper hemisphere, open at the bottom.
    pub fn dome(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self::sphere_section(radius, width_segments, height_segments, PI / 2.0)
    }

    /// Sphere cap from the north pole down to polar angle `theta_length`.
    fn sphere_section(radius: f32, width_segments: u32, height_segments: u32, theta_length: f32) -> Self {
        let w = width_segments.max(3);
        let h = height_segments.max(2);
        let closed = theta_length >= PI - 1e-4;

        let mut positions = vec![Vec3::new(0.0, radius, 0.0)];
        let last_row = if closed { h - 1 } else { h };
        for iy in 1..=last_row {
            let theta = iy as f32 / h as f32 * theta_length;
            for ix in 0..w {
                let phi = ix as f32 / w as f32 * TAU;
                positions.push(Vec3::new(
                    radius * theta.sin() * phi.sin(),
                    radius * theta.cos(),
                    radius * theta.sin() * phi.cos(),
                ));
            }
        }
        let row = |r: u32, i: u32| 1 + (r - 1) * w + i % w;

        let mut indices = Vec::new();
        for i in 0..w {
            indices.extend_from_slice(&[0, row(1, i), row(1, i + 1)]);
        }
        for r in 1..last_row {
            for i in 0..w {
                let (a, b, c, d) = (row(r, i), row(r + 1, i), row(r + 1, i + 1), row(r, i + 1));
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        if closed {
            let pole = positions.len() as u32;
            positions.push(Vec3::new(0.0, -radius, 0.0));
            for i in 0..w {
                indices.extend_from_slice(&[row(last_row, i), pole, row(last_row, i + 1)]);
            }
        }

        Self::from_parts(positions, indices)
    }

    /// Box with flat-shaded faces.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (x, y, z) = (width * 0.5, height * 0.5, depth * 0.5);
        #[rustfmt::skip]
        let positions = vec![
            // +Z
            Vec3::new(-x, -y,  z), Vec3::new( x, -y,  z), Vec3::new( x,  y,  z), Vec3::new(-x,  y,  z),
            // -Z
            Vec3::new( x, -y, -z), Vec3::new(-x, -y, -z), Vec3::new(-x,  y, -z), Vec3::new( x,  y, -z),
            // +X
            Vec3::new( x, -y,  z), Vec3::new( x, -y, -z), Vec3::new( x,  y, -z), Vec3::new( x,  y,  z),
            // -X
            Vec3::new(-x, -y, -z), Vec3::new(-x, -y,  z), Vec3::new(-x,  y,  z), Vec3::new(-x,  y, -z),
            // +Y
            Vec3::new(-x,  y,  z), Vec3::new( x,  y,  z), Vec3::new( x,  y, -z), Vec3::new(-x,  y, -z),
            // -Y
            Vec3::new(-x, -y, -z), Vec3::new( x, -y, -z), Vec3::new( x, -y,  z), Vec3::new(-x, -y,  z),
        ];
        let indices = (0..6u32)
            .flat_map(|f| {
                let o = f * 4;
                [o, o + 1, o + 2, o + 2, o + 3, o]
            })
            .collect();
        Self::from_parts(positions, indices)
    }

    /// Rectangle in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        let (x, y) = (width * 0.5, height * 0.5);
        let positions = vec![
            Vec3::new(-x, -y, 0.0),
            Vec3::new(x, -y, 0.0),
            Vec3::new(x, y, 0.0),
            Vec3::new(-x, y, 0.0),
        ];
        Self::from_parts(positions, vec![0, 1, 2, 2, 3, 0])
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangle corner positions in local space.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ]
        })
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Jitter every vertex by up to `strength / 2` per axis, then rebuild normals.
    ///
    /// Vertices that share a position move together so cap and wall seams stay
    /// closed.
    pub fn deform(&mut self, strength: f32, rng: &mut impl Rng) {
        let mut offsets: HashMap<[u32; 3], Vec3> = HashMap::new();
        for p in &mut self.positions {
            let key = position_key(*p);
            let offset = *offsets.entry(key).or_insert_with(|| {
                Vec3::new(
                    rng.random::<f32>() - 0.5,
                    rng.random::<f32>() - 0.5,
                    rng.random::<f32>() - 0.5,
                ) * strength
            });
            *p += offset;
        }
        self.compute_vertex_normals();
    }

    /// Area-weighted smooth normals from the current positions.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        for n in &mut normals {
            *n = n.try_normalize().unwrap_or(Vec3::Y);
        }
        self.normals = normals;
    }
}

fn position_key(p: Vec3) -> [u32; 3] {
    // `+ 0.0` folds -0.0 into 0.0 so both signs share a key.
    [(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn assert_outward(mesh: &Mesh) {
        let center = mesh.bounds().unwrap().center();
        for tri in mesh.triangles() {
            let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
            if normal.length_squared() < 1e-12 {
                continue;
            }
            let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
            assert!(
                normal.dot(centroid - center) > -1e-5,
                "inward-facing triangle {tri:?}"
            );
        }
    }

    #[test]
    fn cone_spans_height_and_radius() {
        let mesh = Mesh::cone(0.5, 2.0, 6);
        let b = mesh.bounds().unwrap();
        assert!((b.max.y - 1.0).abs() < 1e-6);
        assert!((b.min.y + 1.0).abs() < 1e-6);
        assert!(b.max.x <= 0.5 + 1e-6);
        // apex + ring + bottom cap (center + ring)
        assert_eq!(mesh.vertex_count(), 1 + 6 + 1 + 6);
        assert_eq!(mesh.triangle_count(), 6 + 6);
        assert_outward(&mesh);
    }

    #[test]
    fn cylinder_is_closed_and_outward() {
        let mesh = Mesh::cylinder(0.12, 0.12, 1.0, 12);
        assert_eq!(mesh.triangle_count(), 12 * 2 + 12 * 2);
        assert_outward(&mesh);
    }

    #[test]
    fn sphere_faces_outward() {
        let mesh = Mesh::sphere(1.0, 8, 8);
        assert_outward(&mesh);
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            assert!(n.dot(*p) > 0.0);
        }
    }

    #[test]
    fn dome_is_upper_half() {
        let mesh = Mesh::dome(40.0, 16, 8);
        let b = mesh.bounds().unwrap();
        assert!(b.min.y > -1e-3);
        assert!((b.max.y - 40.0).abs() < 1e-3);
    }

    #[test]
    fn cuboid_has_flat_normals() {
        let mesh = Mesh::cuboid(2.0, 1.0, 0.5);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.normals[0], Vec3::Z);
        assert_eq!(mesh.normals[16], Vec3::Y);
        assert_outward(&mesh);
    }

    #[test]
    fn deform_stays_within_strength() {
        let mut rng = SmallRng::seed_from_u64(7);
        let original = Mesh::cone(0.3, 1.0, 6);
        let mut mesh = original.clone();
        mesh.deform(0.15, &mut rng);
        for (before, after) in original.positions.iter().zip(&mesh.positions) {
            let delta = (*after - *before).abs();
            assert!(delta.max_element() <= 0.075 + 1e-6);
        }
        assert_ne!(original.positions, mesh.positions);
    }

    #[test]
    fn deform_moves_coincident_vertices_together() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut mesh = Mesh::cylinder(0.2, 0.2, 0.5, 6);
        // Side ring vertex 0 and top-cap ring vertex 0 start at the same spot.
        let cap_ring_start = 6 + 6 + 1;
        assert_eq!(mesh.positions[0], mesh.positions[cap_ring_start]);
        mesh.deform(0.3, &mut rng);
        assert_eq!(mesh.positions[0], mesh.positions[cap_ring_start]);
    }

    #[test]
    fn deform_recomputes_normals() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut mesh = Mesh::sphere(1.0, 8, 8);
        mesh.deform(0.4, &mut rng);
        let mut expected = mesh.clone();
        expected.compute_vertex_normals();
        assert_eq!(mesh.normals, expected.normals);
        for n in &mesh.normals {
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn aabb_transform_translates() {
        let b = Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        let moved = b.transformed(&Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(moved.min, Vec3::new(4.0, -1.0, -1.0));
        assert_eq!(moved.max, Vec3::new(6.0, 1.0, 1.0));
    }
}
