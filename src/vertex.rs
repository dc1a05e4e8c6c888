use crate::{
    change_point::ChangePointLocator,
    error::{ContourError, Result},
    geometry::{point_in_box, Axis, BuildBounds, CellPosition},
    options::BuilderOptions,
    qef::{Crossing, Qef},
    surface::{cell_is_bipolar, is_inside, SurfaceFunction},
    tables::{
        Side, BOUNDARY_EDGES, BOUNDARY_FACES, CELL_EDGES, CORNER_OFFSETS, MAX_CORNER, MIN_CORNER,
    },
};
use glam::Vec3A;
use tracing::trace;

/// Places the single mesh vertex of an active cell.
#[derive(Clone, Copy, Debug)]
pub struct CellVertexPlacer {
    options: BuilderOptions,
    locator: ChangePointLocator,
}

impl CellVertexPlacer {
    pub fn new(options: BuilderOptions) -> Self {
        Self {
            locator: ChangePointLocator::new(&options),
            options,
        }
    }

    pub fn place<S: SurfaceFunction + ?Sized>(
        &self,
        surface: &S,
        cell: CellPosition,
        bounds: &BuildBounds,
    ) -> Result<Vec3A> {
        let corners =
            CORNER_OFFSETS.map(|o| bounds.grid_point(cell.offset_by(o), self.options.cell_size));
        let samples = corners.map(|p| surface.value(p));

        if !cell_is_bipolar(&samples) {
            return Err(ContourError::InactiveCell(cell));
        }

        let mut crossings = self.collect_crossings(surface, &corners, &samples)?;
        if self.options.use_bias {
            append_bias(&mut crossings, self.options.bias_strength);
        }

        let min = corners[MIN_CORNER];
        let max = corners[MAX_CORNER];
        let qef = Qef::new(&crossings);
        let mut vertex = qef.solve();
        if self.options.boundary && !point_in_box(vertex, min, max) {
            vertex = solve_on_boundary(&qef, &corners);
            trace!(?cell, %vertex, "vertex pulled onto cell boundary");
        }

        if self.options.clip_to_cell_bounds && !point_in_box(vertex, min, max) {
            vertex = vertex.clamp(min, max);
        }

        Ok(vertex)
    }

    fn collect_crossings<S: SurfaceFunction + ?Sized>(
        &self,
        surface: &S,
        corners: &[Vec3A; 8],
        samples: &[f32; 8],
    ) -> Result<Vec<Crossing>> {
        let mut crossings = Vec::with_capacity(CELL_EDGES.len() + 3);
        for ([c1, c2], axis) in CELL_EDGES {
            if is_inside(samples[c1]) == is_inside(samples[c2]) {
                continue;
            }
            let point = self.locator.locate(
                surface,
                (corners[c1], samples[c1]),
                (corners[c2], samples[c2]),
                axis,
            )?;
            crossings.push(Crossing {
                point,
                normal: surface.normal(point),
            });
        }
        Ok(crossings)
    }
}

/// Pulls the solution toward the mass point with three weak axis-aligned
/// planes through it.
fn append_bias(crossings: &mut Vec<Crossing>, strength: f32) {
    let sum = crossings
        .iter()
        .fold(Vec3A::ZERO, |acc, c| acc + c.point);
    let mass_point = sum / crossings.len() as f32;
    for normal in [Vec3A::X, Vec3A::Y, Vec3A::Z] {
        crossings.push(Crossing {
            point: mass_point,
            normal: normal * strength,
        });
    }
}

/// Searches faces, then edges, then corners of the cell for the lowest-error
/// vertex that stays inside it.
fn solve_on_boundary(qef: &Qef, corners: &[Vec3A; 8]) -> Vec3A {
    let min = corners[MIN_CORNER];
    let max = corners[MAX_CORNER];
    let bound = |axis: Axis, side: Side| match side {
        Side::Min => min[axis.index()],
        Side::Max => max[axis.index()],
    };

    let faces = BOUNDARY_FACES
        .iter()
        .map(|&(axis, side)| qef.fix_axis(axis, bound(axis, side)).solve_with_error());
    if let Some(p) = best_in_box(faces, min, max) {
        return p;
    }

    let edges = BOUNDARY_EDGES.iter().map(|&[(a1, s1), (a2, s2)]| {
        qef.fix_axis(a1, bound(a1, s1))
            .fix_axis(a2, bound(a2, s2))
            .solve_with_error()
    });
    if let Some(p) = best_in_box(edges, min, max) {
        return p;
    }

    let corner_errors = corners.iter().map(|&c| (c, qef.error_at(c)));
    best_in_box(corner_errors, min, max).unwrap_or(min)
}

/// First candidate inside the box with the strictly smallest error.
fn best_in_box(
    candidates: impl Iterator<Item = (Vec3A, f32)>,
    min: Vec3A,
    max: Vec3A,
) -> Option<Vec3A> {
    let mut best: Option<(Vec3A, f32)> = None;
    for (p, error) in candidates {
        if !point_in_box(p, min, max) {
            continue;
        }
        match best {
            Some((_, best_error)) if !(error < best_error) => {}
            _ => best = Some((p, error)),
        }
    }
    best.map(|(p, _)| p)
}
