use std::collections::BTreeMap;
use ndarray::{array, Array1};
use lib_ffd::LatticeIndex;
use crate::constraints::{GeometricConstraints, KS_THICKNESS_SOURCE};
use crate::{ks_aggregate, AeroProblem, DesignVariable, OptError, TaskOptions};




// ============================================================================
pub const KS_RHO: f64 = 1e4;
pub const OBJECTIVE_SCALE: f64 = 1e4;
pub const KS_THICKNESS: &str = "KSThickness";
pub const OBJECTIVE: &str = "obj";




/**
 * @brief      Named function values from one evaluation of the analysis.
 *             Scalars are stored as one-element arrays. A failed evaluation is
 *             flagged rather than dropped so the optimizer can back off.
 */
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FunctionValues {
    values: BTreeMap<String, Array1<f64>>,
    pub fail: bool,
}

impl FunctionValues {
    pub fn new() -> Self {
        FunctionValues::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Array1<f64>) {
        self.values.insert(name.into(), value);
    }

    pub fn insert_scalar(&mut self, name: impl Into<String>, value: f64) {
        self.insert(name, array![value]);
    }

    pub fn get(&self, name: &str) -> Result<&Array1<f64>, OptError> {
        self.values.get(name).ok_or_else(|| OptError::MissingFunction(name.into()))
    }

    pub fn scalar(&self, name: &str) -> Result<f64, OptError> {
        let value = self.get(name)?;
        match value.len() {
            1 => Ok(value[0]),
            n => Err(OptError::invalid(name, format!("is not a scalar ({} values)", n))),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item=(&String, &Array1<f64>)> {
        self.values.iter()
    }
}




/**
 * @brief      Adds the objective and the composite constraints to the raw
 *             function values: drag as the objective, the lift constraint
 *             residual, and the KS-aggregated thickness.
 */
pub fn assemble_objective(funcs: &mut FunctionValues, problem: &AeroProblem, target_cl: f64) -> Result<(), OptError> {
    let cd = funcs.scalar(&problem.function_key("cd"))?;
    let cl = funcs.scalar(&problem.function_key("cl"))?;
    let ks = ks_aggregate(&funcs.get(KS_THICKNESS_SOURCE)?.to_vec(), KS_RHO)?;

    funcs.insert_scalar(OBJECTIVE, cd);
    funcs.insert_scalar(lift_constraint_name(problem), cl - target_cl);
    funcs.insert_scalar(KS_THICKNESS, ks);
    log::debug!("obj={:.6e} cl-cl*={:.3e} KSThickness={:.6}", cd, cl - target_cl, ks);
    Ok(())
}

pub fn lift_constraint_name(problem: &AeroProblem) -> String {
    format!("cl_con_{}", problem.name)
}




// ============================================================================
#[derive(Clone, Debug, PartialEq)]
pub struct Objective {
    pub name: String,
    pub scale: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OptConstraint {
    pub name: String,
    pub count: usize,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub scale: f64,
    pub linear: bool,
    pub wrt: Option<String>,
}

impl OptConstraint {
    fn nonlinear(name: String, count: usize, lower: Option<f64>, upper: Option<f64>, scale: f64) -> Self {
        OptConstraint{name, count, lower, upper, scale, linear: false, wrt: None}
    }
}




/**
 * @brief      Declaration of the optimization problem handed to the sparse
 *             optimizer: objective, design variables and constraints.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizationProblem {
    pub name: String,
    pub objective: Objective,
    pub variables: Vec<DesignVariable>,
    pub constraints: Vec<OptConstraint>,
}

impl OptimizationProblem {
    pub fn build(task: &TaskOptions, problem: &AeroProblem, geometry: &GeometricConstraints, index: &LatticeIndex) -> Self {
        let mut variables = problem.design_variables.clone();
        variables.push(DesignVariable::local_shape(index.len(), 'y'));

        let mut constraints = Vec::new();
        for linked in [&geometry.le_te, &geometry.spanwise] {
            constraints.push(OptConstraint {
                name: linked.name.clone(),
                count: linked.len(),
                lower: Some(linked.lower),
                upper: Some(linked.upper),
                scale: 1.0,
                linear: true,
                wrt: Some("shape".into()),
            });
        }
        for c in geometry.optimizer_constraints() {
            constraints.push(OptConstraint::nonlinear(c.name.clone(), c.len(), c.lower, c.upper, 1.0));
        }
        constraints.push(OptConstraint::nonlinear(lift_constraint_name(problem), 1, Some(0.0), Some(0.0), 1.0));
        constraints.push(OptConstraint {
            wrt: Some("shape".into()),
            ..OptConstraint::nonlinear(KS_THICKNESS.into(), 1, Some(task.tc_min), None, 1.0 / task.tc_min)
        });

        OptimizationProblem {
            name: "opt".into(),
            objective: Objective{name: OBJECTIVE.into(), scale: OBJECTIVE_SCALE},
            variables,
            constraints,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables.iter().map(|v| v.count).sum()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.iter().map(|c| c.count).sum()
    }

    pub fn constraint(&self, name: &str) -> Option<&OptConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lib_ffd::LatticeResolution;

    fn evaluated(problem: &AeroProblem) -> FunctionValues {
        let mut funcs = FunctionValues::new();
        funcs.insert_scalar(problem.function_key("cl"), 0.48);
        funcs.insert_scalar(problem.function_key("cd"), 0.0123);
        funcs.insert(KS_THICKNESS_SOURCE, Array1::from_elem(200, 0.12));
        funcs
    }

    #[test]
    fn objective_is_drag_and_lift_is_a_residual() {
        let problem = AeroProblem::cruise(&TaskOptions::default());
        let mut funcs = evaluated(&problem);
        assemble_objective(&mut funcs, &problem, 0.5).unwrap();

        assert_eq!(funcs.scalar("obj").unwrap(), 0.0123);
        assert_relative_eq!(funcs.scalar("cl_con_fc").unwrap(), -0.02, epsilon = 1e-12);
        assert_relative_eq!(funcs.scalar(KS_THICKNESS).unwrap(), 0.12 + (200.0_f64).ln() / KS_RHO, epsilon = 1e-12);
    }

    #[test]
    fn missing_functions_are_reported_by_name() {
        let problem = AeroProblem::cruise(&TaskOptions::default());
        let mut funcs = FunctionValues::new();
        funcs.insert_scalar("fc_cl", 0.5);
        match assemble_objective(&mut funcs, &problem, 0.5) {
            Err(OptError::MissingFunction(name)) => assert_eq!(name, "fc_cd"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!funcs.contains("obj"));
    }

    #[test]
    fn vector_values_are_not_scalars() {
        let funcs = evaluated(&AeroProblem::cruise(&TaskOptions::default()));
        assert!(funcs.scalar(KS_THICKNESS_SOURCE).is_err());
    }

    #[test]
    fn optimization_problem_lists_variables_and_constraints() {
        let task = TaskOptions::default();
        let problem = AeroProblem::cruise(&task);
        let index = LatticeIndex::from(LatticeResolution::new(6, 2, 8).unwrap());
        let geometry = GeometricConstraints::build(&task, &index).unwrap();
        let opt = OptimizationProblem::build(&task, &problem, &geometry, &index);

        assert_eq!(opt.objective.scale, 1e4);
        assert_eq!(opt.num_variables(), 1 + 96);

        let ks = opt.constraint(KS_THICKNESS).unwrap();
        assert_eq!(ks.lower, Some(0.12));
        assert_eq!(ks.upper, None);
        assert_relative_eq!(ks.scale, 1.0 / 0.12);
        assert_eq!(ks.wrt.as_deref(), Some("shape"));

        let lift = opt.constraint("cl_con_fc").unwrap();
        assert_eq!((lift.lower, lift.upper), (Some(0.0), Some(0.0)));
        assert!(opt.constraint(KS_THICKNESS_SOURCE).is_none());
        assert_eq!(opt.num_constraints(), 2 + 12 + 200 + 200 + 1 + 1);
    }
}
