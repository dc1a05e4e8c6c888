use crate::{
    error::{ContourError, Result},
    geometry::Axis,
    options::{BuilderOptions, ChangePointMode},
    surface::{is_inside, SurfaceFunction},
};
use glam::Vec3A;

/// Estimates where the surface crosses a bipolar grid edge.
#[derive(Clone, Copy, Debug)]
pub struct ChangePointLocator {
    mode: ChangePointMode,
    cell_size: f32,
    accuracy: f32,
}

impl ChangePointLocator {
    pub fn new(options: &BuilderOptions) -> Self {
        Self {
            mode: options.change_point_mode,
            cell_size: options.cell_size,
            accuracy: options.best_point_accuracy,
        }
    }

    /// `first` must be the lower end of an edge running along `axis`.
    pub fn locate<S: SurfaceFunction + ?Sized>(
        &self,
        surface: &S,
        first: (Vec3A, f32),
        second: (Vec3A, f32),
        axis: Axis,
    ) -> Result<Vec3A> {
        match self.mode {
            ChangePointMode::LinearApproximation => Ok(self.interpolate(first, second, axis)),
            ChangePointMode::BestPointSelection => self.scan(surface, first, second, axis),
        }
    }

    fn interpolate(&self, (p1, s1): (Vec3A, f32), (_, s2): (Vec3A, f32), axis: Axis) -> Vec3A {
        let delta = -s1 / (s2 - s1) * self.cell_size;
        axis.shift(p1, delta)
    }

    fn scan<S: SurfaceFunction + ?Sized>(
        &self,
        surface: &S,
        (p1, s1): (Vec3A, f32),
        (p2, s2): (Vec3A, f32),
        axis: Axis,
    ) -> Result<Vec3A> {
        let length = p2[axis.index()] - p1[axis.index()];
        let num_samples = ((length / self.accuracy) as usize).saturating_add(1).max(2);
        let last = num_samples - 1;
        let first_inside = is_inside(s1);

        let mut prev = p1;
        for i in 1..num_samples {
            let (p, s) = if i == last {
                (p2, s2)
            } else {
                let p = axis.shift(p1, i as f32 * self.accuracy);
                (p, surface.value(p))
            };

            if s == 0.0 {
                return Ok(p);
            }
            if is_inside(s) != first_inside {
                let half = (p[axis.index()] - prev[axis.index()]) / 2.0;
                return Ok(axis.shift(prev, half));
            }
            prev = p;
        }

        Err(ContourError::ChangePointNotFound {
            axis,
            from: p1,
            to: p2,
        })
    }
}
