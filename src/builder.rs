use crate::{
    error::{ContourError, Result},
    geometry::{BuildBounds, CellPosition},
    mesh::{LargestComponent, Mesh, MeshRepair, MeshVertexId},
    options::BuilderOptions,
    surface::{is_inside, SurfaceFunction},
    tables::EDGE_PROBES,
    vertex::CellVertexPlacer,
    vertex_cache::VertexCache,
};
use glam::IVec3;
use ilattice::extent::Extent;
use rayon::prelude::*;
use tracing::info;

/// Turns a surface into a triangle mesh.
pub trait MeshBuilder {
    fn build<S: SurfaceFunction + Sync>(&self, surface: &S, bounds: &BuildBounds) -> Result<Mesh>;
}

/// Uniform-grid dual contouring.
#[derive(Clone, Debug)]
pub struct DualContouringBuilder<R = LargestComponent> {
    options: BuilderOptions,
    repair: R,
}

impl DualContouringBuilder {
    pub fn new(options: BuilderOptions) -> Result<Self> {
        Self::with_repair(options, LargestComponent)
    }
}

impl<R: MeshRepair> DualContouringBuilder<R> {
    pub fn with_repair(options: BuilderOptions, repair: R) -> Result<Self> {
        options.validate()?;
        Ok(Self { options, repair })
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Builds the raw quad soup without running the repair step.
    pub fn contour<S: SurfaceFunction + Sync>(
        &self,
        surface: &S,
        bounds: &BuildBounds,
    ) -> Result<Mesh> {
        let grid = bounds.grid(self.options.cell_size);
        let num_cells = num_cells(&grid);
        info!(shape = ?grid.shape, num_cells, "contouring grid");

        // 0 lets rayon pick the thread count.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.max_parallelism.unwrap_or(0))
            .build()?;

        let cache = VertexCache::default();
        let walker = GridWalker {
            surface,
            bounds,
            cell_size: self.options.cell_size,
            placer: CellVertexPlacer::new(self.options),
            cache: &cache,
        };
        let indices = pool.install(|| {
            (0..num_cells)
                .into_par_iter()
                .map(|i| cell_at(&grid, i))
                .try_fold(Vec::new, |mut tris, cell| {
                    walker.probe_edges(cell, &mut tris)?;
                    Ok::<_, ContourError>(tris)
                })
                .try_reduce(Vec::new, |mut a, mut b| {
                    a.append(&mut b);
                    Ok(a)
                })
        })?;

        Ok(Mesh {
            positions: cache.into_positions(),
            indices,
        })
    }
}

impl<R: MeshRepair> MeshBuilder for DualContouringBuilder<R> {
    fn build<S: SurfaceFunction + Sync>(&self, surface: &S, bounds: &BuildBounds) -> Result<Mesh> {
        let soup = self.contour(surface, bounds)?;
        let (soup_vertices, soup_triangles) = (soup.positions.len(), soup.num_triangles());
        let mesh = self.repair.repair(soup);
        info!(
            soup_vertices,
            soup_triangles,
            vertices = mesh.positions.len(),
            triangles = mesh.num_triangles(),
            "built mesh"
        );
        Ok(mesh)
    }
}

struct GridWalker<'a, S> {
    surface: &'a S,
    bounds: &'a BuildBounds,
    cell_size: f32,
    placer: CellVertexPlacer,
    cache: &'a VertexCache,
}

impl<S: SurfaceFunction + Sync> GridWalker<'_, S> {
    /// Emits a quad for each bipolar grid edge owned by `owner`.
    ///
    /// Owners with a zero coordinate on either guarded axis are skipped
    /// because some of the 4 cells around the edge would be outside the grid.
    fn probe_edges(&self, owner: CellPosition, tris: &mut Vec<MeshVertexId>) -> Result<()> {
        let mut owner_sample = None;
        for probe in &EDGE_PROBES {
            if probe.guard.iter().any(|&axis| owner.coordinate(axis) == 0) {
                continue;
            }

            let owner_inside = *owner_sample.get_or_insert_with(|| self.is_inside(owner));
            let forward = match (owner_inside, self.is_inside(owner.offset_by(probe.step))) {
                (true, false) => true,
                (false, true) => false,
                _ => continue, // Not a bipolar edge.
            };

            let mut quad = [0; 4];
            for (id, offset) in quad.iter_mut().zip(probe.cells) {
                *id = self.cache.get_or_insert_with(owner.offset_by(offset), |cell| {
                    self.placer.place(self.surface, cell, self.bounds)
                })?;
            }

            // Face from the inside end of the edge toward the outside end.
            let [a, b, c, d] = quad;
            if forward {
                tris.extend_from_slice(&[a, b, c, a, c, d]);
            } else {
                tris.extend_from_slice(&[d, c, b, d, b, a]);
            }
        }
        Ok(())
    }

    fn is_inside(&self, p: CellPosition) -> bool {
        is_inside(self.surface.value(self.bounds.grid_point(p, self.cell_size)))
    }
}

fn num_cells(grid: &Extent<IVec3>) -> usize {
    let shape = grid.shape.max(IVec3::ZERO);
    shape.x as usize * shape.y as usize * shape.z as usize
}

/// Cells are numbered with X outermost and Z innermost.
fn cell_at(grid: &Extent<IVec3>, i: usize) -> CellPosition {
    let shape = grid.shape;
    let (h, d) = (shape.y as usize, shape.z as usize);
    let z = i % d;
    let y = (i / d) % h;
    let x = i / (d * h);
    CellPosition::from(grid.minimum + IVec3::new(x as i32, y as i32, z as i32))
}
