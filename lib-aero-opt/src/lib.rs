/*!
 * @brief      The parts of a single-point airfoil drag minimization that do
 *             not live in the flow solver or the optimizer: KS aggregation,
 *             typed solver/optimizer options, the aerodynamic problem, the
 *             geometric constraint wiring on an FFD lattice, and assembly of
 *             the objective and constraints. The external analysis is reached
 *             through the AnalysisBackend trait.
 */
pub mod ks;
pub mod options;
pub mod problem;
pub mod constraints;
pub mod objective;
pub mod backend;

pub use ks::ks_aggregate;
pub use options::{AeroOptions, MeshOptions, OptimizerKind, OptimizerOptions, SliceRequest, SliceType, SnoptOptions, SlsqpOptions};
pub use problem::{TaskOptions, AeroProblem, DesignVariable, TrimRequest};
pub use constraints::GeometricConstraints;
pub use objective::{FunctionValues, OptimizationProblem, assemble_objective};
pub use backend::{AnalysisBackend, DesignVector, Sensitivities, cruise_funcs, cruise_funcs_sens, pre_trim};




// ============================================================================
#[derive(thiserror::Error, Debug)]
pub enum OptError {
    #[error("option '{name}' {why}")]
    InvalidOption { name: String, why: String },

    #[error("function '{0}' was not evaluated")]
    MissingFunction(String),

    #[error("KS aggregation: {0}")]
    Aggregation(String),

    #[error("analysis backend: {0}")]
    Backend(String),

    #[error(transparent)]
    Lattice(#[from] lib_ffd::FfdError),

    #[error(transparent)]
    Config(#[from] lib_config::ConfigError),
}

impl OptError {
    pub(crate) fn invalid(name: &str, why: impl Into<String>) -> Self {
        OptError::InvalidOption{name: name.into(), why: why.into()}
    }
}
