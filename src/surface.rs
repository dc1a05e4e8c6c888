use glam::Vec3A;

/// An implicit surface: negative values are inside, positive outside, zero on
/// the surface.
///
/// The builder evaluates surfaces from many worker threads at once, so
/// implementations must not rely on mutable state between calls.
pub trait SurfaceFunction {
    fn value(&self, p: Vec3A) -> f32;

    /// Outward-facing unit normal at `p`.
    fn normal(&self, p: Vec3A) -> Vec3A;
}

impl<S: SurfaceFunction + ?Sized> SurfaceFunction for &S {
    fn value(&self, p: Vec3A) -> f32 {
        (**self).value(p)
    }

    fn normal(&self, p: Vec3A) -> Vec3A {
        (**self).normal(p)
    }
}

#[inline]
pub fn is_inside(value: f32) -> bool {
    value < 0.0
}

pub fn cell_is_bipolar(samples: &[f32; 8]) -> bool {
    let mut any_inside = false;
    let mut any_outside = false;
    for &sample in samples {
        any_inside |= is_inside(sample);
        any_outside |= !is_inside(sample);
    }
    any_inside && any_outside
}

pub fn central_gradient(sdf: impl Fn(Vec3A) -> f32, p: Vec3A, delta: f32) -> Vec3A {
    let h = 0.5 * delta;
    let dx = Vec3A::new(h, 0.0, 0.0);
    let dy = Vec3A::new(0.0, h, 0.0);
    let dz = Vec3A::new(0.0, 0.0, h);
    Vec3A::new(
        sdf(p + dx) - sdf(p - dx),
        sdf(p + dy) - sdf(p - dy),
        sdf(p + dz) - sdf(p - dz),
    ) / delta
}

/// A surface given by a signed distance closure. Normals come from central
/// differences.
#[derive(Clone, Copy, Debug)]
pub struct SdfSurface<F> {
    sdf: F,
    gradient_delta: f32,
}

impl<F: Fn(Vec3A) -> f32> SdfSurface<F> {
    pub const DEFAULT_GRADIENT_DELTA: f32 = 0.0001;

    pub fn new(sdf: F) -> Self {
        Self::with_gradient_delta(sdf, Self::DEFAULT_GRADIENT_DELTA)
    }

    pub fn with_gradient_delta(sdf: F, gradient_delta: f32) -> Self {
        Self {
            sdf,
            gradient_delta,
        }
    }
}

impl<F: Fn(Vec3A) -> f32> SurfaceFunction for SdfSurface<F> {
    fn value(&self, p: Vec3A) -> f32 {
        (self.sdf)(p)
    }

    fn normal(&self, p: Vec3A) -> Vec3A {
        central_gradient(&self.sdf, p, self.gradient_delta).normalize_or_zero()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3A,
    pub radius: f32,
}

impl SurfaceFunction for Sphere {
    fn value(&self, p: Vec3A) -> f32 {
        (p - self.center).length() - self.radius
    }

    fn normal(&self, p: Vec3A) -> Vec3A {
        (p - self.center).normalize_or_zero()
    }
}

/// Everything behind a plane. `normal` points out of the solid and must be
/// unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HalfSpace {
    pub origin: Vec3A,
    pub normal: Vec3A,
}

impl SurfaceFunction for HalfSpace {
    fn value(&self, p: Vec3A) -> f32 {
        (p - self.origin).dot(self.normal)
    }

    fn normal(&self, _p: Vec3A) -> Vec3A {
        self.normal
    }
}
