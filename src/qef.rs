use crate::geometry::Axis;
use glam::Vec3A;
use nalgebra::{DMatrix, DVector};

/// A surface sample: where the surface crosses a cell edge and its normal
/// there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossing {
    pub point: Vec3A,
    pub normal: Vec3A,
}

/// Quadratic Error Function
///
/// `‖A (x - m) - b‖²` where the rows of `A` are crossing normals, `m` is the
/// mass point (centroid of the crossings) and `b[i] = n_i · (p_i - m)`.
///
/// Minimized with the SVD pseudo-inverse of `AᵀA`, so coplanar and parallel
/// normals leave the degenerate directions at the mass point instead of
/// blowing up.
///
/// Axes can be pinned with [`Qef::fix_axis`], which yields a smaller problem
/// over the remaining axes. The base problem is left untouched, so many
/// constrained variants can be probed from one base.
#[derive(Clone, Debug, PartialEq)]
pub struct Qef {
    /// N x k, one column per free axis.
    normals: DMatrix<f32>,
    offsets: DVector<f32>,
    /// Free components of the mass point.
    mass_point: DVector<f32>,
    fixed: [Option<f32>; 3],
}

impl Qef {
    pub fn new(crossings: &[Crossing]) -> Self {
        let mass_point = mass_point(crossings);
        let normals = DMatrix::from_fn(crossings.len(), 3, |row, col| crossings[row].normal[col]);
        let offsets = DVector::from_fn(crossings.len(), |row, _| {
            let c = &crossings[row];
            (c.point - mass_point).dot(c.normal)
        });
        Self {
            normals,
            offsets,
            mass_point: DVector::from_column_slice(&mass_point.to_array()),
            fixed: [None; 3],
        }
    }

    pub fn num_free_axes(&self) -> usize {
        self.normals.ncols()
    }

    /// Returns the problem restricted to the plane `axis = value`.
    ///
    /// # Panics
    ///
    /// If `axis` is already fixed.
    pub fn fix_axis(&self, axis: Axis, value: f32) -> Self {
        let axis_i = axis.index();
        assert!(
            self.fixed[axis_i].is_none(),
            "{axis:?} axis is already fixed"
        );
        let col = self.fixed[..axis_i].iter().filter(|f| f.is_none()).count();

        let shift = value - self.mass_point[col];
        let offsets = DVector::from_fn(self.offsets.len(), |row, _| {
            self.offsets[row] - self.normals[(row, col)] * shift
        });

        let mut fixed = self.fixed;
        fixed[axis_i] = Some(value);

        Self {
            normals: self.normals.clone().remove_column(col),
            offsets,
            mass_point: self.mass_point.clone().remove_row(col),
            fixed,
        }
    }

    pub fn solve(&self) -> Vec3A {
        self.to_point(&self.minimizer())
    }

    pub fn solve_with_error(&self) -> (Vec3A, f32) {
        let x = self.minimizer();
        (self.to_point(&x), self.residual(&x))
    }

    /// Residual L2 norm at an arbitrary point. Components on fixed axes are
    /// ignored.
    pub fn error_at(&self, p: Vec3A) -> f32 {
        let free: Vec<f32> = (0..3)
            .filter(|&i| self.fixed[i].is_none())
            .map(|i| p[i])
            .collect();
        self.residual(&DVector::from_vec(free))
    }

    fn minimizer(&self) -> DVector<f32> {
        let k = self.normals.ncols();
        if k == 0 {
            return DVector::zeros(0);
        }

        let ata = self.normals.tr_mul(&self.normals);
        let atb = self.normals.tr_mul(&self.offsets);

        let svd = ata.svd(true, true);
        // Same cutoff as a standard pseudo-inverse.
        let tolerance = svd.singular_values.max() * k as f32 * f32::EPSILON;
        match svd.solve(&atb, tolerance) {
            Ok(x) => x + &self.mass_point,
            Err(_) => self.mass_point.clone(),
        }
    }

    fn residual(&self, x: &DVector<f32>) -> f32 {
        if self.normals.ncols() == 0 {
            return self.offsets.norm();
        }
        (&self.normals * (x - &self.mass_point) - &self.offsets).norm()
    }

    fn to_point(&self, free: &DVector<f32>) -> Vec3A {
        let mut p = Vec3A::ZERO;
        let mut next_free = 0;
        for i in 0..3 {
            p[i] = match self.fixed[i] {
                Some(value) => value,
                None => {
                    next_free += 1;
                    free[next_free - 1]
                }
            };
        }
        p
    }
}

fn mass_point(crossings: &[Crossing]) -> Vec3A {
    if crossings.is_empty() {
        return Vec3A::ZERO;
    }
    let sum = crossings
        .iter()
        .fold(Vec3A::ZERO, |acc, c| acc + c.point);
    sum / crossings.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn crossing(point: [f32; 3], normal: [f32; 3]) -> Crossing {
        Crossing {
            point: Vec3A::from(point),
            normal: Vec3A::from(normal).normalize(),
        }
    }

    fn assert_point_eq(a: Vec3A, b: Vec3A) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-5);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-5);
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-5);
    }

    #[test]
    fn single_crossing_solves_to_itself() {
        let c = crossing([0.3, 0.7, 0.1], [0.2, 1.0, -0.4]);
        let qef = Qef::new(&[c]);
        let (p, error) = qef.solve_with_error();
        assert_eq!(p, c.point);
        assert_abs_diff_eq!(error, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn three_orthogonal_planes_meet_at_corner() {
        let qef = Qef::new(&[
            crossing([0.8, 0.1, 0.2], [1.0, 0.0, 0.0]),
            crossing([0.3, 0.6, 0.9], [0.0, 1.0, 0.0]),
            crossing([0.5, 0.5, 0.25], [0.0, 0.0, 1.0]),
        ]);
        let (p, error) = qef.solve_with_error();
        assert_point_eq(p, Vec3A::new(0.8, 0.6, 0.25));
        assert_abs_diff_eq!(error, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn parallel_normals_keep_mass_point_in_free_directions() {
        let qef = Qef::new(&[
            crossing([0.0, 0.0, 0.5], [0.0, 0.0, 1.0]),
            crossing([1.0, 0.0, 0.5], [0.0, 0.0, 1.0]),
            crossing([0.0, 1.0, 0.5], [0.0, 0.0, 1.0]),
            crossing([1.0, 1.0, 0.5], [0.0, 0.0, 1.0]),
        ]);
        assert_point_eq(qef.solve(), Vec3A::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn fixed_axis_is_reinserted_exactly() {
        let qef = Qef::new(&[
            crossing([0.2, 0.4, 0.6], [1.0, 1.0, 0.0]),
            crossing([0.9, 0.1, 0.3], [0.0, 1.0, 1.0]),
            crossing([0.5, 0.5, 0.5], [1.0, 0.0, 1.0]),
        ]);
        for axis in Axis::ALL {
            let fixed = qef.fix_axis(axis, 0.123);
            assert_eq!(fixed.num_free_axes(), 2);
            assert_eq!(fixed.solve()[axis.index()], 0.123);
        }

        let edge = qef.fix_axis(Axis::Z, 1.0).fix_axis(Axis::X, 0.0);
        let (p, _) = edge.solve_with_error();
        assert_eq!(p.x, 0.0);
        assert_eq!(p.z, 1.0);

        // Order of fixing does not matter for the reconstructed point.
        let other_order = qef.fix_axis(Axis::X, 0.0).fix_axis(Axis::Z, 1.0);
        assert_point_eq(other_order.solve(), p);
    }

    #[test]
    fn fully_fixed_problem_reports_its_residual() {
        let qef = Qef::new(&[crossing([0.5, 0.5, 0.5], [0.0, 0.0, 1.0])]);
        let corner = qef
            .fix_axis(Axis::X, 1.0)
            .fix_axis(Axis::Y, 1.0)
            .fix_axis(Axis::Z, 1.0);
        let (p, error) = corner.solve_with_error();
        assert_eq!(p, Vec3A::ONE);
        assert_abs_diff_eq!(error, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(error, qef.error_at(Vec3A::ONE), epsilon = 1e-6);
    }

    #[test]
    fn error_at_measures_plane_distance() {
        let qef = Qef::new(&[
            crossing([0.0, 0.0, 0.5], [0.0, 0.0, 1.0]),
            crossing([1.0, 1.0, 0.5], [0.0, 0.0, 1.0]),
        ]);
        assert_abs_diff_eq!(qef.error_at(Vec3A::new(0.3, 0.9, 0.5)), 0.0, epsilon = 1e-6);
        // Two planes, each 0.5 away.
        assert_abs_diff_eq!(
            qef.error_at(Vec3A::new(0.0, 0.0, 1.0)),
            (2.0f32 * 0.25).sqrt(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn fixing_does_not_mutate_base_problem() {
        let qef = Qef::new(&[
            crossing([0.1, 0.2, 0.3], [1.0, 0.0, 0.0]),
            crossing([0.4, 0.5, 0.6], [0.0, 1.0, 0.0]),
        ]);
        let before = qef.clone();
        let _ = qef.fix_axis(Axis::Y, 1.0).fix_axis(Axis::X, 0.0);
        assert_eq!(qef, before);
    }

    #[test]
    #[should_panic]
    fn fixing_an_axis_twice_panics() {
        let qef = Qef::new(&[crossing([0.0, 0.0, 0.0], [1.0, 0.0, 0.0])]);
        let _ = qef.fix_axis(Axis::X, 0.0).fix_axis(Axis::X, 1.0);
    }
}
