use glam::{Vec3, Vec3A};
use std::collections::HashSet;
use tracing::debug;

pub type MeshVertexId = u32;

/// An indexed triangle mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    /// Three vertex ids per triangle.
    pub indices: Vec<MeshVertexId>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [MeshVertexId; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn triangle_positions(&self, tri: [MeshVertexId; 3]) -> [Vec3A; 3] {
        tri.map(|v| Vec3A::from(self.positions[v as usize]))
    }

    /// Unit normal by the right-hand rule, or zero for a degenerate triangle.
    pub fn triangle_normal(&self, tri: [MeshVertexId; 3]) -> Vec3A {
        let p = self.triangle_positions(tri);
        (p[1] - p[0]).cross(p[2] - p[0]).normalize_or_zero()
    }
}

/// Post-processing applied to the raw triangle soup.
pub trait MeshRepair {
    fn repair(&self, mesh: Mesh) -> Mesh;
}

impl<F: Fn(Mesh) -> Mesh> MeshRepair for F {
    fn repair(&self, mesh: Mesh) -> Mesh {
        self(mesh)
    }
}

/// Returns the soup untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRepair;

impl MeshRepair for NoRepair {
    fn repair(&self, mesh: Mesh) -> Mesh {
        mesh
    }
}

/// Removes degenerate and duplicate triangles, then keeps only the connected
/// component with the most triangles.
#[derive(Clone, Copy, Debug, Default)]
pub struct LargestComponent;

impl MeshRepair for LargestComponent {
    fn repair(&self, mesh: Mesh) -> Mesh {
        let num_input = mesh.num_triangles();

        let mut seen = HashSet::new();
        let tris: Vec<[MeshVertexId; 3]> = mesh
            .triangles()
            .filter(|&tri| !is_degenerate(&mesh, tri))
            .filter(|&tri| {
                let mut key = tri;
                key.sort_unstable();
                seen.insert(key)
            })
            .collect();
        let num_clean = tris.len();

        let mut components = VertexSets::new(mesh.positions.len());
        for &[a, b, c] in &tris {
            components.union(a, b);
            components.union(a, c);
        }
        let roots: Vec<MeshVertexId> = tris.iter().map(|t| components.find(t[0])).collect();

        let mut tri_counts = vec![0usize; mesh.positions.len()];
        let mut largest: Option<MeshVertexId> = None;
        for &root in &roots {
            tri_counts[root as usize] += 1;
        }
        for &root in &roots {
            match largest {
                Some(best) if tri_counts[best as usize] >= tri_counts[root as usize] => {}
                _ => largest = Some(root),
            }
        }

        let kept: Vec<[MeshVertexId; 3]> = tris
            .into_iter()
            .zip(roots)
            .filter(|&(_, root)| Some(root) == largest)
            .map(|(tri, _)| tri)
            .collect();

        let compacted = compact(&mesh.positions, &kept);
        debug!(
            input = num_input,
            degenerate_or_duplicate = num_input - num_clean,
            disconnected = num_clean - compacted.num_triangles(),
            vertices = compacted.positions.len(),
            "repaired mesh"
        );
        compacted
    }
}

fn is_degenerate(mesh: &Mesh, [a, b, c]: [MeshVertexId; 3]) -> bool {
    a == b || b == c || a == c || mesh.triangle_normal([a, b, c]) == Vec3A::ZERO
}

/// Drops unreferenced vertices, keeping the relative order of the rest.
fn compact(positions: &[Vec3], tris: &[[MeshVertexId; 3]]) -> Mesh {
    const UNUSED: MeshVertexId = MeshVertexId::MAX;

    let mut remap = vec![UNUSED; positions.len()];
    for &v in tris.iter().flatten() {
        remap[v as usize] = 0;
    }
    let mut new_positions = Vec::new();
    for (old, new) in remap.iter_mut().enumerate() {
        if *new != UNUSED {
            *new = new_positions.len() as MeshVertexId;
            new_positions.push(positions[old]);
        }
    }

    Mesh {
        positions: new_positions,
        indices: tris
            .iter()
            .flatten()
            .map(|&v| remap[v as usize])
            .collect(),
    }
}

/// Union-find over vertex ids.
struct VertexSets {
    parent: Vec<MeshVertexId>,
}

impl VertexSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n as MeshVertexId).collect(),
        }
    }

    fn find(&mut self, mut v: MeshVertexId) -> MeshVertexId {
        while self.parent[v as usize] != v {
            let grandparent = self.parent[self.parent[v as usize] as usize];
            self.parent[v as usize] = grandparent;
            v = grandparent;
        }
        v
    }

    fn union(&mut self, a: MeshVertexId, b: MeshVertexId) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb as usize] = ra;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(origin: Vec3, size: f32, base: MeshVertexId) -> (Vec<Vec3>, Vec<MeshVertexId>) {
        let positions = vec![
            origin,
            origin + Vec3::new(size, 0.0, 0.0),
            origin + Vec3::new(size, size, 0.0),
            origin + Vec3::new(0.0, size, 0.0),
        ];
        let indices = [0, 1, 2, 0, 2, 3].map(|i| i + base).to_vec();
        (positions, indices)
    }

    #[test]
    fn triangle_normal_follows_right_hand_rule() {
        let (positions, indices) = quad(Vec3::ZERO, 1.0, 0);
        let mesh = Mesh { positions, indices };
        for tri in mesh.triangles() {
            assert_eq!(mesh.triangle_normal(tri), Vec3A::Z);
        }
        assert_eq!(mesh.num_triangles(), 2);
    }

    #[test]
    fn keeps_largest_component_and_compacts() {
        // A lone triangle, then a two-triangle quad.
        let mut positions = vec![
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(11.0, 0.0, 0.0),
            Vec3::new(10.0, 1.0, 0.0),
        ];
        let mut indices = vec![0, 1, 2];
        let (quad_positions, quad_indices) = quad(Vec3::ZERO, 1.0, 3);
        positions.extend(quad_positions);
        indices.extend(quad_indices);

        let repaired = LargestComponent.repair(Mesh { positions, indices });
        assert_eq!(repaired.positions.len(), 4);
        assert_eq!(repaired.positions[0], Vec3::ZERO);
        assert_eq!(repaired.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn drops_degenerate_and_duplicate_triangles() {
        let (mut positions, mut indices) = quad(Vec3::ZERO, 1.0, 0);
        // Repeated index.
        indices.extend([0, 0, 1]);
        // Same triangle, other winding.
        indices.extend([2, 1, 0]);
        // Zero area: three collinear points.
        positions.push(Vec3::new(2.0, 0.0, 0.0));
        indices.extend([0, 1, 4]);

        let repaired = LargestComponent.repair(Mesh { positions, indices });
        assert_eq!(repaired.num_triangles(), 2);
        assert_eq!(repaired.positions.len(), 4);
    }

    #[test]
    fn empty_mesh_stays_empty() {
        let repaired = LargestComponent.repair(Mesh::default());
        assert!(repaired.is_empty());
        assert!(repaired.positions.is_empty());
    }

    #[test]
    fn closures_are_repairs() {
        let drop_all = |_: Mesh| Mesh::default();
        let (positions, indices) = quad(Vec3::ZERO, 1.0, 0);
        assert!(drop_all.repair(Mesh { positions, indices }).is_empty());
        assert_eq!(NoRepair.repair(Mesh::default()), Mesh::default());
    }
}
