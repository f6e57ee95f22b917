use std::collections::BTreeMap;
use ndarray::{Array1, Array2};
use crate::{AeroProblem, FunctionValues, OptError, TaskOptions};




// ============================================================================
pub type DesignVector = BTreeMap<String, Array1<f64>>;




/**
 * @brief      Derivatives of each function with respect to each design
 *             variable group: sens[function][variable] has shape
 *             (function size, variable count).
 */
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sensitivities {
    pub values: BTreeMap<String, BTreeMap<String, Array2<f64>>>,
    pub fail: bool,
}




/**
 * @brief      The external analysis: geometry parameterization, geometric
 *             constraints, mesh warping and the flow solver with its adjoint.
 *             Implementations own all of the numerics; the drivers below only
 *             sequence the calls and handle failed solutions.
 */
pub trait AnalysisBackend {
    /// Push a design vector into the geometry and the flight condition.
    fn set_design_vars(&mut self, problem: &mut AeroProblem, x: &DesignVector) -> Result<(), OptError>;

    fn solve(&mut self, problem: &AeroProblem) -> Result<(), OptError>;

    /// Adjust alpha until cl reaches the target.
    fn solve_cl(&mut self, problem: &mut AeroProblem, target_cl: f64, delta: f64, tol: f64, auto_reset: bool) -> Result<(), OptError>;

    /// Geometric constraint values and the solver's functions of interest.
    fn eval_functions(&mut self, problem: &AeroProblem, funcs: &mut FunctionValues) -> Result<(), OptError>;

    fn eval_functions_sens(&mut self, problem: &AeroProblem, sens: &mut Sensitivities) -> Result<(), OptError>;

    fn solution_failed(&self, problem: &AeroProblem) -> bool;

    fn adjoint_failed(&self, problem: &AeroProblem) -> bool;

    fn reset_flow(&mut self, problem: &AeroProblem);

    fn reset_adjoint(&mut self, problem: &AeroProblem);
}




// ============================================================================
pub fn pre_trim<B: AnalysisBackend>(backend: &mut B, problem: &mut AeroProblem, task: &TaskOptions) -> Result<bool, OptError> {
    match task.trim_request() {
        Some(t) => {
            log::info!("trimming to cl={} before optimizing", t.target_cl);
            backend.solve_cl(problem, t.target_cl, t.delta, t.tol, t.auto_reset)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/**
 * @brief      One function evaluation of the cruise point. A failed flow
 *             solution is flagged in the result and the flow is reset, so the
 *             next evaluation does not restart from a diverged state.
 */
pub fn cruise_funcs<B: AnalysisBackend>(backend: &mut B, problem: &mut AeroProblem, x: &DesignVector) -> Result<FunctionValues, OptError> {
    log::debug!("design vector: {:?}", x);
    backend.set_design_vars(problem, x)?;
    backend.solve(problem)?;

    let mut funcs = FunctionValues::new();
    backend.eval_functions(problem, &mut funcs)?;
    funcs.fail = backend.solution_failed(problem);

    if funcs.fail {
        log::warn!("flow solution failed for {}, resetting", problem.name);
        backend.reset_flow(problem);
    }
    Ok(funcs)
}

pub fn cruise_funcs_sens<B: AnalysisBackend>(backend: &mut B, problem: &AeroProblem) -> Result<Sensitivities, OptError> {
    let mut sens = Sensitivities::default();
    backend.eval_functions_sens(problem, &mut sens)?;
    sens.fail = backend.adjoint_failed(problem);

    if sens.fail {
        log::warn!("adjoint failed for {}, resetting", problem.name);
        backend.reset_adjoint(problem);
    }
    Ok(sens)
}
