//! Uniform Grid Dual Contouring
//!
//! Extracts a triangle mesh from an implicit surface `f(p)` (negative inside,
//! positive outside) sampled on a regular grid. Every cell with a sign change
//! gets one vertex placed by minimizing a QEF built from the surface crossings
//! and normals on its edges. Every grid edge with a sign change becomes a quad
//! joining the vertices of the 4 cells around it.
//!
//! ```
//! use glam::Vec3A;
//! use grid_dual_contour::{BuildBounds, BuilderOptions, DualContouringBuilder, MeshBuilder, Sphere};
//!
//! let sphere = Sphere { center: Vec3A::ZERO, radius: 0.8 };
//! let options = BuilderOptions { cell_size: 0.25, ..Default::default() };
//! let mesh = DualContouringBuilder::new(options)?.build(&sphere, &BuildBounds::default())?;
//! assert!(!mesh.is_empty());
//! # Ok::<(), grid_dual_contour::ContourError>(())
//! ```
//!
//! # References
//!
//! - Tao Ju, Frank Losasso, Scott Schaefer, Joe Warren ["Dual Contouring of
//!   Hermite Data"](https://www.cs.rice.edu/~jwarren/papers/dualcontour.pdf)
//! - Scott Schaefer, Joe Warren ["Dual Contouring: The Secret
//!   Sauce"](https://people.engr.tamu.edu/schaefer/research/dualcontour.pdf)
//!
//! # Cell Vertices
//!
//! Unconstrained QEF minimizers can land far outside their cell near sharp
//! features. Two remedies can be combined:
//!
//! - `boundary` re-solves the QEF on each face, then each edge, then each
//!   corner of the cell and keeps the lowest-error candidate inside it
//! - `clip_to_cell_bounds` clamps whatever is left outside into the cell box

mod builder;
mod change_point;
mod error;
mod geometry;
mod mesh;
mod options;
mod qef;
mod surface;
mod tables;
mod vertex;
mod vertex_cache;

pub use builder::*;
pub use change_point::ChangePointLocator;
pub use error::*;
pub use geometry::*;
pub use mesh::*;
pub use options::*;
pub use qef::{Crossing, Qef};
pub use surface::*;
pub use vertex::CellVertexPlacer;
pub use vertex_cache::VertexCache;
