/*!
 * @brief      Free-form deformation (FFD) control lattices for wing-like
 *             volumes: a root and a tip cross-section box are interpolated
 *             along a power-law spanwise distribution into a structured grid
 *             of control points, which is written to (and read from) the
 *             plot3d-style .xyz text format used by the geometry tools.
 */
pub mod geometry;
pub mod lattice;
pub mod index;
pub mod xyz;

pub use geometry::{Range2, SectionBox, LatticeResolution};
pub use lattice::{FfdBox, SpanwiseDistribution, ControlPointGrid, linspace, DEFAULT_SPAN_EXPONENT};
pub use index::LatticeIndex;
pub use xyz::{XyzLayout, write_xyz, write_xyz_to, read_xyz, read_xyz_from};




// ============================================================================
#[derive(thiserror::Error, Debug)]
pub enum FfdError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed .xyz data at line {line}: {why}")]
    Parse { line: usize, why: String },
}

impl FfdError {
    pub(crate) fn invalid(why: impl Into<String>) -> Self {
        FfdError::InvalidConfiguration(why.into())
    }
}
