use ndarray::prelude::*;
use crate::{FfdError, LatticeResolution, SectionBox, LatticeIndex};




// ============================================================================
pub const DEFAULT_SPAN_EXPONENT: f64 = 0.8;




/**
 * @brief      Samples from start to stop inclusive, with the final sample set
 *             to stop exactly rather than accumulated from the step.
 */
pub fn linspace(start: f64, stop: f64, num: usize) -> Array1<f64> {
    if num == 1 {
        return Array1::from_elem(1, start);
    }
    let step = (stop - start) / (num as f64 - 1.0);
    Array1::from_shape_fn(num, |i| if i + 1 == num { stop } else { start + step * i as f64 })
}




/**
 * @brief      Normalized spanwise stations t_k = (k / (nZ - 1))^p. For p < 1
 *             the stations cluster toward the root.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct SpanwiseDistribution {
    stations: Array1<f64>,
    exponent: f64,
}

impl SpanwiseDistribution {
    pub fn new(nz: usize, exponent: f64) -> Result<Self, FfdError> {
        if nz < 2 {
            return Err(FfdError::invalid(format!("nZ must be at least 2, got {}", nz)));
        }
        if !(exponent.is_finite() && exponent > 0.0) {
            return Err(FfdError::invalid(format!("span exponent must be positive, got {}", exponent)));
        }
        let last = (nz - 1) as f64;
        let stations = Array1::from_shape_fn(nz, |k| (k as f64 / last).powf(exponent));
        Ok(SpanwiseDistribution{stations, exponent})
    }

    pub fn stations(&self) -> ArrayView1<f64> {
        self.stations.view()
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}




/**
 * @brief      The control points of a lattice. Each of x, y, z has shape
 *             (nY * nZ, nX); row k * nY + j holds thickness level j of span
 *             station k, and the columns are the chordwise samples. The blocks
 *             are read-only once the grid exists.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct ControlPointGrid {
    x: Array2<f64>,
    y: Array2<f64>,
    z: Array2<f64>,
    resolution: LatticeResolution,
}

impl ControlPointGrid {
    pub fn from_blocks(resolution: LatticeResolution, x: Array2<f64>, y: Array2<f64>, z: Array2<f64>) -> Result<Self, FfdError> {
        let shape = (resolution.num_rows(), resolution.nx());
        for (name, block) in [("X", &x), ("Y", &y), ("Z", &z)] {
            if block.dim() != shape {
                return Err(FfdError::invalid(format!("{} block has shape {:?}, expected {:?}", name, block.dim(), shape)));
            }
        }
        Ok(ControlPointGrid{x, y, z, resolution})
    }

    pub fn x(&self) -> &Array2<f64> { &self.x }
    pub fn y(&self) -> &Array2<f64> { &self.y }
    pub fn z(&self) -> &Array2<f64> { &self.z }

    pub fn resolution(&self) -> LatticeResolution {
        self.resolution
    }

    pub fn shape(&self) -> (usize, usize) {
        self.x.dim()
    }

    pub fn index(&self) -> LatticeIndex {
        LatticeIndex::from(self.resolution)
    }

    /// The blocks in the order they are serialized.
    pub fn blocks(&self) -> [&Array2<f64>; 3] {
        [&self.x, &self.y, &self.z]
    }

    pub fn point(&self, i: usize, j: usize, k: usize) -> Option<[f64; 3]> {
        let r = self.resolution;
        if i >= r.nx() || j >= r.ny() || k >= r.nz() {
            return None;
        }
        let row = k * r.ny() + j;
        Some([self.x[[row, i]], self.y[[row, i]], self.z[[row, i]]])
    }
}




/**
 * @brief      A wing-like FFD volume described by its root and tip sections.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct FfdBox {
    root: SectionBox,
    tip: SectionBox,
    resolution: LatticeResolution,
    span_distribution: SpanwiseDistribution,
}

impl FfdBox {
    pub fn new(root: SectionBox, tip: SectionBox, resolution: LatticeResolution, span_exponent: f64) -> Result<Self, FfdError> {
        root.validate("root")?;
        tip.validate("tip")?;
        let resolution = LatticeResolution::new(resolution.nx(), resolution.ny(), resolution.nz())?;
        let span_distribution = SpanwiseDistribution::new(resolution.nz(), span_exponent)?;
        Ok(FfdBox{root, tip, resolution, span_distribution})
    }

    pub fn root(&self) -> SectionBox { self.root }
    pub fn tip(&self) -> SectionBox { self.tip }
    pub fn resolution(&self) -> LatticeResolution { self.resolution }

    pub fn span_distribution(&self) -> &SpanwiseDistribution {
        &self.span_distribution
    }

    pub fn generate(&self) -> ControlPointGrid {
        let (nx, ny, nz) = (self.resolution.nx(), self.resolution.ny(), self.resolution.nz());
        let mut x = Array2::zeros((ny * nz, nx));
        let mut y = Array2::zeros((ny * nz, nx));
        let mut z = Array2::zeros((ny * nz, nx));

        for (k, &t) in self.span_distribution.stations().iter().enumerate() {
            let z_k = t * (self.tip.z - self.root.z) + self.root.z;
            let x_k = self.root.x.lerp(self.tip.x, t);
            let y_k = self.root.y.lerp(self.tip.y, t);
            let levels = linspace(y_k.lower(), y_k.upper(), ny);
            let chord = linspace(x_k.lower(), x_k.upper(), nx);

            for j in 0..ny {
                let row = k * ny + j;
                x.row_mut(row).assign(&chord);
                y.row_mut(row).fill(levels[j]);
                z.row_mut(row).fill(z_k);
            }
            log::trace!("station {}: t={:.6} z={:.6} x_te={:.6} x_le={:.6}", k, t, z_k, x_k.lower(), x_k.upper());
        }
        log::debug!("generated {}x{}x{} FFD lattice", nx, ny, nz);

        ControlPointGrid{x, y, z, resolution: self.resolution}
    }
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn wing(exponent: f64) -> FfdBox {
        FfdBox::new(
            SectionBox::new([-0.1, 5.1], [-0.5, 0.5], -0.01),
            SectionBox::new([7.4, 9.2], [-0.25, 0.25], 14.25),
            LatticeResolution::new(6, 2, 8).unwrap(),
            exponent).unwrap()
    }

    #[test]
    fn linspace_has_exact_endpoints() {
        let v = linspace(0.1, 0.7, 7);
        assert_eq!(v.len(), 7);
        assert_eq!(v[0], 0.1);
        assert_eq!(v[6], 0.7);
        assert_relative_eq!(v[3], 0.4, epsilon = 1e-15);
        assert_eq!(linspace(2.0, -2.0, 2), array![2.0, -2.0]);
    }

    #[test]
    fn span_distribution_runs_from_zero_to_one() {
        for nz in 2..12 {
            let d = SpanwiseDistribution::new(nz, 0.8).unwrap();
            let t = d.stations();
            assert_eq!(t[0], 0.0);
            assert_eq!(t[nz - 1], 1.0);
            assert!(t.windows(2).into_iter().all(|w| w[1] >= w[0]));
        }
    }

    #[test]
    fn exponent_below_one_clusters_toward_the_root() {
        let t = SpanwiseDistribution::new(8, 0.8).unwrap();
        let t = t.stations();
        assert!(t[1] - t[0] > t[7] - t[6]);
        let uniform = SpanwiseDistribution::new(5, 1.0).unwrap();
        assert_relative_eq!(uniform.stations()[2], 0.5);
    }

    #[test]
    fn bad_span_parameters_are_invalid() {
        assert!(matches!(SpanwiseDistribution::new(1, 0.8), Err(FfdError::InvalidConfiguration(_))));
        assert!(SpanwiseDistribution::new(4, 0.0).is_err());
        assert!(SpanwiseDistribution::new(4, -1.0).is_err());
        assert!(SpanwiseDistribution::new(4, f64::NAN).is_err());
    }

    #[test]
    fn grid_rows_interpolate_between_root_and_tip() {
        let grid = wing(0.8).generate();
        assert_eq!(grid.shape(), (16, 6));

        // root station, lower and upper surfaces
        assert_eq!(grid.x().row(0), linspace(-0.1, 5.1, 6));
        assert!(grid.y().row(0).iter().all(|&y| y == -0.5));
        assert!(grid.y().row(1).iter().all(|&y| y == 0.5));

        // tip station
        assert_relative_eq!(grid.x()[[15, 0]], 7.4, epsilon = 1e-12);
        assert_relative_eq!(grid.x()[[15, 5]], 9.2, epsilon = 1e-12);
        assert_relative_eq!(grid.y()[[14, 3]], -0.25, epsilon = 1e-12);
        assert_relative_eq!(grid.z()[[15, 2]], 14.25, epsilon = 1e-12);
    }

    #[test]
    fn z_rows_are_constant_and_monotone() {
        let grid = wing(0.8).generate();
        let mut previous = f64::NEG_INFINITY;
        for row in grid.z().rows() {
            assert!(row.iter().all(|&z| z == row[0]));
            assert!(row[0] >= previous);
            previous = row[0];
        }
    }

    #[test]
    fn extra_thickness_levels_are_spaced_evenly() {
        let ffd = FfdBox::new(
            SectionBox::new([0.0, 1.0], [-1.0, 1.0], 0.0),
            SectionBox::new([0.0, 1.0], [-1.0, 1.0], 1.0),
            LatticeResolution::new(3, 3, 2).unwrap(),
            1.0).unwrap();
        let grid = ffd.generate();
        assert_eq!(grid.point(1, 1, 0), Some([0.5, 0.0, 0.0]));
        assert_eq!(grid.point(2, 2, 1), Some([1.0, 1.0, 1.0]));
        assert_eq!(grid.point(3, 0, 0), None);
    }

    #[test]
    fn generated_grid_agrees_with_its_box() {
        let ffd = wing(0.8);
        let grid = ffd.generate();
        assert_eq!(grid.resolution(), ffd.resolution());
        assert_eq!(ffd.span_distribution().len(), ffd.resolution().nz());
        assert_eq!(grid.point(0, 0, 0), Some([-0.1, -0.5, -0.01]));
        assert_eq!(ffd.root().z, -0.01);
        assert_eq!(ffd.tip().z, 14.25);
    }

    #[test]
    fn blocks_must_match_the_resolution() {
        let r = LatticeResolution::new(2, 2, 2).unwrap();
        let ok = Array2::zeros((4, 2));
        let bad = Array2::zeros((3, 2));
        assert!(ControlPointGrid::from_blocks(r, ok.clone(), ok.clone(), ok.clone()).is_ok());
        assert!(ControlPointGrid::from_blocks(r, ok.clone(), bad, ok).is_err());
    }
}
