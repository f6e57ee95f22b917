use lib_config::Form;
use crate::OptError;




/**
 * @brief      The task-level knobs of a drag minimization run: flight
 *             condition, lift target, and the bounds of the thickness and
 *             volume constraints.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct TaskOptions {
    pub mach: f64,
    pub output: String,
    pub cl: f64,
    pub alt: f64,
    pub pre_trim: bool,
    pub vol_con: bool,
    pub vol_upper: f64,
    pub vol_lower: f64,
    pub tc_min: f64,
    pub zero_lift: bool,
    pub rel_thick_lower: f64,
    pub abs_thick_lower: f64,
}

impl Default for TaskOptions {
    fn default() -> Self {
        TaskOptions {
            mach: 0.75,
            output: "output".into(),
            cl: 0.5,
            alt: 1e4,
            pre_trim: false,
            vol_con: false,
            vol_upper: 0.07,
            vol_lower: 0.064837137176294343,
            tc_min: 0.12,
            zero_lift: false,
            rel_thick_lower: 0.1,
            abs_thick_lower: 0.00035,
        }
    }
}

impl TaskOptions {
    /// Declares every task option, with its default, on a config form.
    pub fn form() -> Form {
        let d = TaskOptions::default();
        Form::new()
            .item("mach"           , d.mach           , "Cruise Mach number")
            .item("output"         , d.output.as_str(), "Output directory")
            .item("cl"             , d.cl             , "Target lift coefficient")
            .item("alt"            , d.alt            , "Cruise altitude [m]")
            .item("pre_trim"       , d.pre_trim       , "Trim to the target lift before optimizing")
            .item("vol_con"        , d.vol_con        , "Add the volume constraint")
            .item("vol_upper"      , d.vol_upper      , "Volume constraint upper bound")
            .item("vol_lower"      , d.vol_lower      , "Volume constraint lower bound")
            .item("tc_min"         , d.tc_min         , "Minimum KS-aggregated thickness")
            .item("zero_lift"      , d.zero_lift      , "Optimize at zero lift (fixes alpha)")
            .item("rel_thick_lower", d.rel_thick_lower, "Relative thickness lower bound")
            .item("abs_thick_lower", d.abs_thick_lower, "Absolute thickness lower bound")
    }

    pub fn from_form(form: &Form) -> Result<Self, OptError> {
        Ok(TaskOptions {
            mach:            form.get_float("mach")?,
            output:          form.get_string("output")?,
            cl:              form.get_float("cl")?,
            alt:             form.get_float("alt")?,
            pre_trim:        form.get_bool("pre_trim")?,
            vol_con:         form.get_bool("vol_con")?,
            vol_upper:       form.get_float("vol_upper")?,
            vol_lower:       form.get_float("vol_lower")?,
            tc_min:          form.get_float("tc_min")?,
            zero_lift:       form.get_bool("zero_lift")?,
            rel_thick_lower: form.get_float("rel_thick_lower")?,
            abs_thick_lower: form.get_float("abs_thick_lower")?,
        })
    }

    /// Zero lift and a zero lift target imply each other.
    pub fn normalize(mut self) -> Self {
        if self.zero_lift && self.cl != 0.0 {
            self.cl = 0.0;
        } else if !self.zero_lift && self.cl == 0.0 {
            self.zero_lift = true;
        }
        self
    }

    pub fn validate(&self) -> Result<(), OptError> {
        if !(self.mach.is_finite() && self.mach > 0.0) {
            return Err(OptError::invalid("mach", "must be positive"));
        }
        if !(self.tc_min.is_finite() && self.tc_min > 0.0) {
            return Err(OptError::invalid("tc_min", "must be positive"));
        }
        if self.vol_con && self.vol_lower > self.vol_upper {
            return Err(OptError::invalid("vol_lower", format!("exceeds vol_upper ({} > {})", self.vol_lower, self.vol_upper)));
        }
        if self.output.is_empty() {
            return Err(OptError::invalid("output", "must name a directory"));
        }
        Ok(())
    }

    pub fn trim_request(&self) -> Option<TrimRequest> {
        if self.pre_trim && !self.zero_lift {
            Some(TrimRequest{target_cl: self.cl, delta: 0.1, tol: 1e-4, auto_reset: false})
        } else {
            None
        }
    }
}




/**
 * @brief      A request to adjust alpha until the flow solution reaches a
 *             target lift coefficient, made once before optimizing.
 */
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrimRequest {
    pub target_cl: f64,
    pub delta: f64,
    pub tol: f64,
    pub auto_reset: bool,
}




// ============================================================================
#[derive(Clone, Debug, PartialEq)]
pub struct DesignVariable {
    pub name: String,
    pub count: usize,
    pub lower: f64,
    pub upper: f64,
    pub scale: f64,
    pub axis: Option<char>,
}

impl DesignVariable {
    pub fn scalar(name: &str, lower: f64, upper: f64, scale: f64) -> Self {
        DesignVariable{name: name.into(), count: 1, lower, upper, scale, axis: None}
    }

    /// Local FFD displacements, one per control point, along `axis`.
    pub fn local_shape(count: usize, axis: char) -> Self {
        DesignVariable{name: "shape".into(), count, lower: -0.05, upper: 0.05, scale: 1.0, axis: Some(axis)}
    }
}




/**
 * @brief      Flight condition and evaluated functions of the cruise point.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct AeroProblem {
    pub name: String,
    pub alpha: f64,
    pub mach: f64,
    pub altitude: f64,
    pub area_ref: f64,
    pub chord_ref: f64,
    pub eval_funcs: Vec<String>,
    pub design_variables: Vec<DesignVariable>,
}

impl AeroProblem {
    pub fn cruise(task: &TaskOptions) -> Self {
        let alpha0: f64 = if task.zero_lift { 0.0 } else { 1.0 };
        let mut design_variables = Vec::new();

        if !task.zero_lift {
            design_variables.push(DesignVariable::scalar("alpha", -10.0, 10.0, 1.0));
        }
        AeroProblem {
            name: "fc".into(),
            alpha: alpha0.clamp(-4.0, 4.0),
            mach: task.mach,
            altitude: task.alt,
            area_ref: 1.0,
            chord_ref: 1.0,
            eval_funcs: vec!["cl".into(), "cd".into()],
            design_variables,
        }
    }

    /// Key under which the solver reports `function` for this problem.
    pub fn function_key(&self, function: &str) -> String {
        format!("{}_{}", self.name, function)
    }

    pub fn has_alpha_variable(&self) -> bool {
        self.design_variables.iter().any(|dv| dv.name == "alpha")
    }
}
