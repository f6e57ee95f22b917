use std::path::Path;
use lib_config::Value;
use crate::{OptError, TaskOptions};




// ============================================================================
type KeyValues = Vec<(&'static str, Value)>;

fn check_tolerance(name: &str, value: f64) -> Result<(), OptError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(OptError::invalid(name, format!("must lie in (0, 1), got {}", value)))
    }
}

fn check_positive(name: &str, value: usize) -> Result<(), OptError> {
    if value > 0 {
        Ok(())
    } else {
        Err(OptError::invalid(name, "must be positive"))
    }
}

fn in_directory(dir: &str, file: &str) -> String {
    Path::new(dir).join(file).to_string_lossy().into_owned()
}




// ============================================================================
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EquationType {
    Euler,
    LaminarNs,
    Rans,
}

impl EquationType {
    pub fn name(self) -> &'static str {
        match self {
            EquationType::Euler     => "Euler",
            EquationType::LaminarNs => "Laminar NS",
            EquationType::Rans      => "RANS",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Smoother {
    Dadi,
    RungeKutta,
}

impl Smoother {
    pub fn name(self) -> &'static str {
        match self {
            Smoother::Dadi       => "DADI",
            Smoother::RungeKutta => "Runge-Kutta",
        }
    }
}




#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SliceType {
    Absolute,
    Relative,
}

impl SliceType {
    pub fn name(self) -> &'static str {
        match self {
            SliceType::Absolute => "absolute",
            SliceType::Relative => "relative",
        }
    }
}

/**
 * @brief      Planar cuts of the surface solution the flow solver writes out,
 *             normal to `axis` at each of `positions`.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct SliceRequest {
    pub axis: char,
    pub positions: Vec<f64>,
    pub slice_type: SliceType,
}

impl SliceRequest {
    pub fn validate(&self) -> Result<(), OptError> {
        if !matches!(self.axis, 'x' | 'y' | 'z') {
            return Err(OptError::invalid("slices", format!("axis must be x, y or z, got '{}'", self.axis)));
        }
        if self.positions.is_empty() || !self.positions.iter().all(|p| p.is_finite()) {
            return Err(OptError::invalid("slices", "need at least one finite position"));
        }
        Ok(())
    }
}

impl std::fmt::Display for SliceRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {:?} ({})", self.axis, self.positions, self.slice_type.name())
    }
}




/**
 * @brief      Flow solver options. Defaults are a RANS setup with NK and ANK
 *             solvers enabled and a GMRES adjoint.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct AeroOptions {
    pub grid_file: String,
    pub output_directory: String,

    pub equation_type: EquationType,
    pub smoother: Smoother,
    pub mg_cycle: String,
    pub n_cycles: usize,
    pub n_cycles_coarse: usize,
    pub monitor_variables: Vec<String>,
    pub use_nk_solver: bool,
    pub use_ank_solver: bool,
    pub n_sub_iter_turb: usize,
    pub lift_index: usize,
    pub inf_change_correction: bool,
    pub rk_reset: bool,
    pub n_rk_reset: usize,

    pub l2_convergence: f64,
    pub l2_convergence_coarse: f64,

    pub adjoint_solver: String,
    pub adjoint_l2_convergence: f64,
    pub adpc: bool,
    pub adjoint_max_iter: usize,
    pub adjoint_subspace_size: usize,
    pub ilu_fill: usize,
    pub asm_overlap: usize,
    pub outer_precon_its: usize,
    pub nk_subspace_size: usize,
    pub nk_asm_overlap: usize,
    pub nk_pc_ilu_fill: usize,
    pub nk_jacobian_lag: usize,
    pub nk_switch_tol: f64,
    pub nk_outer_precon_its: usize,
    pub nk_inner_precon_its: usize,

    pub write_surface_solution: bool,
    pub write_volume_solution: bool,
    pub write_tecplot_surface_solution: bool,
    pub frozen_turbulence: bool,
    pub restart_adjoint: bool,
    pub low_speed_preconditioner: bool,

    /// Not a solver option; registered with the solver after construction.
    pub slices: Vec<SliceRequest>,
}

impl Default for AeroOptions {
    fn default() -> Self {
        AeroOptions {
            grid_file: "../mesh/n0012.cgns".into(),
            output_directory: "output".into(),
            equation_type: EquationType::Rans,
            smoother: Smoother::Dadi,
            mg_cycle: "3w".into(),
            n_cycles: 20000,
            n_cycles_coarse: 250,
            monitor_variables: ["resrho", "cl", "cd", "cmz", "yplus"].iter().map(|s| s.to_string()).collect(),
            use_nk_solver: true,
            use_ank_solver: true,
            n_sub_iter_turb: 10,
            lift_index: 2,
            inf_change_correction: true,
            rk_reset: false,
            n_rk_reset: 5,
            l2_convergence: 1e-15,
            l2_convergence_coarse: 1e-4,
            adjoint_solver: "GMRES".into(),
            adjoint_l2_convergence: 1e-12,
            adpc: true,
            adjoint_max_iter: 5000,
            adjoint_subspace_size: 400,
            ilu_fill: 3,
            asm_overlap: 3,
            outer_precon_its: 3,
            nk_subspace_size: 400,
            nk_asm_overlap: 4,
            nk_pc_ilu_fill: 4,
            nk_jacobian_lag: 5,
            nk_switch_tol: 1e-6,
            nk_outer_precon_its: 3,
            nk_inner_precon_its: 3,
            write_surface_solution: false,
            write_volume_solution: false,
            write_tecplot_surface_solution: true,
            frozen_turbulence: false,
            restart_adjoint: true,
            low_speed_preconditioner: false,
            slices: vec![SliceRequest{axis: 'z', positions: vec![0.5], slice_type: SliceType::Absolute}],
        }
    }
}

impl AeroOptions {
    /// Defaults with the task's output directory, and low-speed
    /// preconditioning switched on below Mach 0.5.
    pub fn for_task(task: &TaskOptions) -> Self {
        AeroOptions {
            output_directory: task.output.clone(),
            low_speed_preconditioner: task.mach < 0.5,
            ..AeroOptions::default()
        }
    }

    pub fn validate(&self) -> Result<(), OptError> {
        if self.grid_file.is_empty() {
            return Err(OptError::invalid("gridFile", "must name a mesh file"));
        }
        if self.monitor_variables.is_empty() {
            return Err(OptError::invalid("monitorvariables", "must not be empty"));
        }
        if !(self.lift_index == 2 || self.lift_index == 3) {
            return Err(OptError::invalid("liftIndex", format!("must be 2 or 3, got {}", self.lift_index)));
        }
        check_tolerance("L2Convergence", self.l2_convergence)?;
        check_tolerance("L2ConvergenceCoarse", self.l2_convergence_coarse)?;
        check_tolerance("adjointL2Convergence", self.adjoint_l2_convergence)?;
        check_tolerance("nkswitchtol", self.nk_switch_tol)?;
        check_positive("nCycles", self.n_cycles)?;
        check_positive("nCyclesCoarse", self.n_cycles_coarse)?;
        check_positive("adjointMaxIter", self.adjoint_max_iter)?;
        check_positive("adjointSubspaceSize", self.adjoint_subspace_size)?;
        check_positive("NKSubSpaceSize", self.nk_subspace_size)?;
        for slice in &self.slices {
            slice.validate()?;
        }
        Ok(())
    }

    /// The options as the flow solver names them.
    pub fn to_key_values(&self) -> KeyValues {
        vec![
            ("gridFile",                    self.grid_file.as_str().into()),
            ("outputDirectory",             self.output_directory.as_str().into()),
            ("equationType",                self.equation_type.name().into()),
            ("smoother",                    self.smoother.name().into()),
            ("MGCycle",                     self.mg_cycle.as_str().into()),
            ("nCycles",                     self.n_cycles.into()),
            ("nCyclesCoarse",               self.n_cycles_coarse.into()),
            ("monitorvariables",            self.monitor_variables.clone().into()),
            ("useNKSolver",                 self.use_nk_solver.into()),
            ("useanksolver",                self.use_ank_solver.into()),
            ("nsubiterturb",                self.n_sub_iter_turb.into()),
            ("liftIndex",                   self.lift_index.into()),
            ("infchangecorrection",         self.inf_change_correction.into()),
            ("RKReset",                     self.rk_reset.into()),
            ("nRKReset",                    self.n_rk_reset.into()),
            ("L2Convergence",               self.l2_convergence.into()),
            ("L2ConvergenceCoarse",         self.l2_convergence_coarse.into()),
            ("adjointSolver",               self.adjoint_solver.as_str().into()),
            ("adjointL2Convergence",        self.adjoint_l2_convergence.into()),
            ("ADPC",                        self.adpc.into()),
            ("adjointMaxIter",              self.adjoint_max_iter.into()),
            ("adjointSubspaceSize",         self.adjoint_subspace_size.into()),
            ("ILUFill",                     self.ilu_fill.into()),
            ("ASMOverlap",                  self.asm_overlap.into()),
            ("outerPreconIts",              self.outer_precon_its.into()),
            ("NKSubSpaceSize",              self.nk_subspace_size.into()),
            ("NKASMOverlap",                self.nk_asm_overlap.into()),
            ("NKPCILUFill",                 self.nk_pc_ilu_fill.into()),
            ("NKJacobianLag",               self.nk_jacobian_lag.into()),
            ("nkswitchtol",                 self.nk_switch_tol.into()),
            ("nkouterpreconits",            self.nk_outer_precon_its.into()),
            ("NKInnerPreConIts",            self.nk_inner_precon_its.into()),
            ("writeSurfaceSolution",        self.write_surface_solution.into()),
            ("writeVolumeSolution",         self.write_volume_solution.into()),
            ("writeTecplotSurfaceSolution", self.write_tecplot_surface_solution.into()),
            ("frozenTurbulence",            self.frozen_turbulence.into()),
            ("restartADjoint",              self.restart_adjoint.into()),
            ("lowSpeedPreconditioner",      self.low_speed_preconditioner.into()),
        ]
    }
}




// ============================================================================
#[derive(Clone, Debug, PartialEq)]
pub struct MeshOptions {
    pub grid_file: String,
}

impl Default for MeshOptions {
    fn default() -> Self {
        MeshOptions{grid_file: AeroOptions::default().grid_file}
    }
}

impl MeshOptions {
    pub fn to_key_values(&self) -> KeyValues {
        vec![("gridFile", self.grid_file.as_str().into())]
    }
}




// ============================================================================
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OptimizerKind {
    Snopt,
    Slsqp,
}

impl std::str::FromStr for OptimizerKind {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SNOPT" => Ok(OptimizerKind::Snopt),
            "SLSQP" => Ok(OptimizerKind::Slsqp),
            _ => Err(OptError::invalid("optimizer", format!("'{}' is not SNOPT or SLSQP", s))),
        }
    }
}




/**
 * @brief      SNOPT settings. The two switch options (full-memory Hessian and
 *             the non-derivative line search) take no value; they are emitted
 *             only when enabled.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct SnoptOptions {
    pub major_feasibility_tolerance: f64,
    pub major_optimality_tolerance: f64,
    pub difference_interval: f64,
    pub hessian_full_memory: bool,
    pub function_precision: f64,
    pub print_file: String,
    pub summary_file: String,
    pub nonderivative_linesearch: bool,
    pub verify_level: i64,
    pub major_step_limit: f64,
}

impl SnoptOptions {
    pub fn new(output_directory: &str) -> Self {
        SnoptOptions {
            major_feasibility_tolerance: 1e-4,
            major_optimality_tolerance: 1e-4,
            difference_interval: 1e-5,
            hessian_full_memory: true,
            function_precision: 1e-8,
            print_file: in_directory(output_directory, "SNOPT_print.out"),
            summary_file: in_directory(output_directory, "SNOPT_summary.out"),
            nonderivative_linesearch: true,
            verify_level: 0,
            major_step_limit: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SlsqpOptions {
    pub ifile: String,
}

impl SlsqpOptions {
    pub fn new(output_directory: &str) -> Self {
        SlsqpOptions{ifile: in_directory(output_directory, "SLSQP.out")}
    }
}




// ============================================================================
#[derive(Clone, Debug, PartialEq)]
pub enum OptimizerOptions {
    Snopt(SnoptOptions),
    Slsqp(SlsqpOptions),
}

impl OptimizerOptions {
    pub fn new(kind: OptimizerKind, output_directory: &str) -> Self {
        match kind {
            OptimizerKind::Snopt => OptimizerOptions::Snopt(SnoptOptions::new(output_directory)),
            OptimizerKind::Slsqp => OptimizerOptions::Slsqp(SlsqpOptions::new(output_directory)),
        }
    }

    pub fn kind(&self) -> OptimizerKind {
        match self {
            OptimizerOptions::Snopt(_) => OptimizerKind::Snopt,
            OptimizerOptions::Slsqp(_) => OptimizerKind::Slsqp,
        }
    }

    /// Name the optimizer wrapper knows the algorithm by.
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerOptions::Snopt(_) => "snopt",
            OptimizerOptions::Slsqp(_) => "slsqp",
        }
    }

    pub fn history_file(output_directory: &str) -> String {
        in_directory(output_directory, "opt.hst")
    }

    pub fn validate(&self) -> Result<(), OptError> {
        match self {
            OptimizerOptions::Snopt(o) => {
                check_tolerance("Major feasibility tolerance", o.major_feasibility_tolerance)?;
                check_tolerance("Major optimality tolerance", o.major_optimality_tolerance)?;
                check_tolerance("Difference interval", o.difference_interval)?;
                check_tolerance("Function precision", o.function_precision)?;
                if !(-1..=3).contains(&o.verify_level) {
                    return Err(OptError::invalid("Verify level", format!("must lie in [-1, 3], got {}", o.verify_level)));
                }
                if !(o.major_step_limit > 0.0) {
                    return Err(OptError::invalid("Major step limit", "must be positive"));
                }
                Ok(())
            }
            OptimizerOptions::Slsqp(o) => {
                if o.ifile.is_empty() {
                    return Err(OptError::invalid("IFILE", "must name an output file"));
                }
                Ok(())
            }
        }
    }

    pub fn to_key_values(&self) -> KeyValues {
        match self {
            OptimizerOptions::Snopt(o) => {
                let mut kv: KeyValues = vec![
                    ("Major feasibility tolerance", o.major_feasibility_tolerance.into()),
                    ("Major optimality tolerance",  o.major_optimality_tolerance.into()),
                    ("Difference interval",         o.difference_interval.into()),
                    ("Function precision",          o.function_precision.into()),
                    ("Print file",                  o.print_file.as_str().into()),
                    ("Summary file",                o.summary_file.as_str().into()),
                    ("Verify level",                o.verify_level.into()),
                    ("Major step limit",            o.major_step_limit.into()),
                ];
                if o.hessian_full_memory {
                    kv.push(("Hessian full memory", true.into()));
                }
                if o.nonderivative_linesearch {
                    kv.push(("Nonderivative linesearch", true.into()));
                }
                kv
            }
            OptimizerOptions::Slsqp(o) => vec![("IFILE", o.ifile.as_str().into())],
        }
    }
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(kv: &'a KeyValues, key: &str) -> Option<&'a Value> {
        kv.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    #[test]
    fn defaults_validate() {
        assert!(AeroOptions::default().validate().is_ok());
        assert!(OptimizerOptions::new(OptimizerKind::Snopt, "output").validate().is_ok());
        assert!(OptimizerOptions::new(OptimizerKind::Slsqp, "output").validate().is_ok());
    }

    #[test]
    fn low_speed_preconditioner_follows_mach() {
        let slow = TaskOptions{mach: 0.3, ..TaskOptions::default()};
        let fast = TaskOptions{mach: 0.75, output: "run1".into(), ..TaskOptions::default()};
        assert!(AeroOptions::for_task(&slow).low_speed_preconditioner);
        let options = AeroOptions::for_task(&fast);
        assert!(!options.low_speed_preconditioner);
        assert_eq!(options.output_directory, "run1");
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let bad_tol = AeroOptions{l2_convergence: 0.0, ..AeroOptions::default()};
        assert!(matches!(bad_tol.validate(), Err(OptError::InvalidOption{ref name, ..}) if name == "L2Convergence"));

        let bad_lift = AeroOptions{lift_index: 1, ..AeroOptions::default()};
        assert!(bad_lift.validate().is_err());

        let mut snopt = SnoptOptions::new("output");
        snopt.verify_level = 4;
        assert!(OptimizerOptions::Snopt(snopt).validate().is_err());
    }

    #[test]
    fn key_values_use_the_solver_names() {
        let kv = AeroOptions::default().to_key_values();
        assert_eq!(lookup(&kv, "equationType"), Some(&Value::from("RANS")));
        assert_eq!(lookup(&kv, "nCycles"), Some(&Value::I(20000)));
        assert_eq!(lookup(&kv, "L2Convergence"), Some(&Value::F(1e-15)));
        assert_eq!(lookup(&kv, "monitorvariables").map(|v| v.to_string()), Some("resrho,cl,cd,cmz,yplus".to_string()));
        assert_eq!(MeshOptions::default().to_key_values()[0].1, Value::from("../mesh/n0012.cgns"));
    }

    #[test]
    fn midspan_slice_is_requested_by_default() {
        let options = AeroOptions::default();
        assert_eq!(options.slices.len(), 1);
        assert_eq!(options.slices[0].to_string(), "z [0.5] (absolute)");
        assert!(lookup(&options.to_key_values(), "slices").is_none());

        let bad_axis = SliceRequest{axis: 'w', ..options.slices[0].clone()};
        assert!(AeroOptions{slices: vec![bad_axis], ..AeroOptions::default()}.validate().is_err());
        let no_positions = SliceRequest{positions: vec![], ..options.slices[0].clone()};
        assert!(no_positions.validate().is_err());
    }

    #[test]
    fn optimizer_files_land_in_the_output_directory() {
        let snopt = OptimizerOptions::new("snopt".parse().unwrap(), "out");
        let kv = snopt.to_key_values();
        assert_eq!(lookup(&kv, "Print file"), Some(&Value::from(in_directory("out", "SNOPT_print.out"))));
        assert_eq!(lookup(&kv, "Hessian full memory"), Some(&Value::B(true)));
        assert_eq!(snopt.name(), "snopt");

        let slsqp = OptimizerOptions::new(OptimizerKind::Slsqp, "out");
        assert_eq!(slsqp.to_key_values()[0].0, "IFILE");
        assert!("IPOPT".parse::<OptimizerKind>().is_err());
    }
}
