use lib_ffd::LatticeIndex;
use crate::{OptError, TaskOptions};




// ============================================================================
/// Offset of the thickness/volume stations from the leading and trailing edges.
pub const EDGE_OFFSET: f64 = 1e-4;
/// Prefix the constraint library gives the constraints of one container.
pub const CONTAINER: &str = "DVCon1";
/// Thickness constraint whose values feed the KS-aggregated thickness.
pub const KS_THICKNESS_SOURCE: &str = "DVCon1_thickness_constraints_0";




/**
 * @brief      Pairs of control points whose shape variables are tied together:
 *             a linear constraint factor_a * x[a] + factor_b * x[b] in
 *             [lower, upper] for every (a, b) in zip(set_a, set_b).
 */
#[derive(Clone, Debug, PartialEq)]
pub struct LinkedPoints {
    pub name: String,
    pub set_a: Vec<usize>,
    pub set_b: Vec<usize>,
    pub factor_a: f64,
    pub factor_b: f64,
    pub lower: f64,
    pub upper: f64,
}

impl LinkedPoints {
    pub fn len(&self) -> usize {
        self.set_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set_a.is_empty()
    }
}




/**
 * @brief      Leading- and trailing-edge constraints: the lower and upper
 *             control points at the first and last chord stations move by
 *             equal and opposite amounts, so the edges do not shear.
 */
pub fn le_te_constraint(index: &LatticeIndex) -> Result<LinkedPoints, OptError> {
    let mut set_a = Vec::new();
    let mut set_b = Vec::new();

    for chord in [index.first_chord(), index.last_chord()] {
        set_a.push(index.index(chord, 0, 0)?);
        set_b.push(index.index(chord, 1, 0)?);
    }
    Ok(LinkedPoints {
        name: format!("{}_lete_constraint_0", CONTAINER),
        set_a,
        set_b,
        factor_a: 1.0,
        factor_b: 1.0,
        lower: 0.0,
        upper: 0.0,
    })
}




/**
 * @brief      Ties every control point of the first span station to its
 *             neighbour at the second, for the lower surface first and then
 *             the upper, so the 2D section deforms uniformly along the span.
 */
pub fn spanwise_equality(index: &LatticeIndex) -> Result<LinkedPoints, OptError> {
    let (nx, _, _) = index.shape();
    let mut set_a = Vec::new();
    let mut set_b = Vec::new();

    for thickness in 0..2 {
        for chord in 0..nx {
            set_a.push(index.index(chord, thickness, 0)?);
            set_b.push(index.index(chord, thickness, 1)?);
        }
    }
    Ok(LinkedPoints {
        name: format!("{}_linear_constraint_0", CONTAINER),
        set_a,
        set_b,
        factor_a: 1.0,
        factor_b: -1.0,
        lower: 0.0,
        upper: 0.0,
    })
}




// ============================================================================
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceStations {
    pub leading: Vec<[f64; 3]>,
    pub trailing: Vec<[f64; 3]>,
}

impl Default for SurfaceStations {
    fn default() -> Self {
        let le = EDGE_OFFSET;
        SurfaceStations {
            leading:  vec![[le, 0.0, le], [le, 0.0, 1.0 - le]],
            trailing: vec![[1.0 - le, 0.0, le], [1.0 - le, 0.0, 1.0 - le]],
        }
    }
}




// ============================================================================
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceConstraint {
    pub name: String,
    pub n_span: usize,
    pub n_chord: usize,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub scaled: bool,
    pub add_to_optimizer: bool,
}

impl SurfaceConstraint {
    /// Number of constraint values the library produces.
    pub fn len(&self) -> usize {
        self.n_span * self.n_chord
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}




/**
 * @brief      Every geometric constraint of the airfoil problem, wired onto a
 *             particular FFD lattice.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct GeometricConstraints {
    pub le_te: LinkedPoints,
    pub spanwise: LinkedPoints,
    pub stations: SurfaceStations,
    pub volume: Option<SurfaceConstraint>,
    pub thickness: Vec<SurfaceConstraint>,
}

impl GeometricConstraints {
    pub fn build(task: &TaskOptions, index: &LatticeIndex) -> Result<Self, OptError> {
        let (_, ny, _) = index.shape();
        if ny != 2 {
            return Err(OptError::invalid("nY", format!("the airfoil constraints need exactly 2 thickness levels, got {}", ny)));
        }

        let volume = if task.vol_con {
            Some(SurfaceConstraint {
                name: format!("{}_volume_constraint_0", CONTAINER),
                n_span: 2,
                n_chord: 100,
                lower: Some(task.vol_lower),
                upper: Some(task.vol_upper),
                scaled: false,
                add_to_optimizer: true,
            })
        } else {
            None
        };

        let thickness = |n: usize, lower: Option<f64>, upper: Option<f64>, scaled: bool, add_to_optimizer: bool| SurfaceConstraint {
            name: format!("{}_thickness_constraints_{}", CONTAINER, n),
            n_span: 2,
            n_chord: 100,
            lower,
            upper,
            scaled,
            add_to_optimizer,
        };

        let constraints = GeometricConstraints {
            le_te: le_te_constraint(index)?,
            spanwise: spanwise_equality(index)?,
            stations: SurfaceStations::default(),
            volume,
            thickness: vec![
                thickness(0, None, None, false, false),
                thickness(1, Some(task.rel_thick_lower), Some(3.0), true, true),
                thickness(2, Some(task.abs_thick_lower), Some(3.0), false, true),
            ],
        };
        log::debug!(
            "wired {} LE/TE pairs and {} spanwise pairs on a {:?} lattice",
            constraints.le_te.len(),
            constraints.spanwise.len(),
            index.shape());
        Ok(constraints)
    }

    /// Constraints that appear in the optimization problem.
    pub fn optimizer_constraints(&self) -> impl Iterator<Item=&SurfaceConstraint> {
        self.volume.iter().chain(self.thickness.iter()).filter(|c| c.add_to_optimizer)
    }
}
