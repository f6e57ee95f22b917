use crate::FfdError;




// ============================================================================
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Range2(pub f64, pub f64);

impl Range2 {
    pub fn lower(self) -> f64 { self.0 }
    pub fn upper(self) -> f64 { self.1 }

    /// Component `j` (0 = lower, 1 = upper) of the range.
    pub fn component(self, j: usize) -> f64 {
        if j == 0 { self.0 } else { self.1 }
    }

    pub fn from_slice(values: &[f64]) -> Result<Range2, FfdError> {
        match values {
            [a, b] => Ok(Range2(*a, *b)),
            _ => Err(FfdError::invalid(format!("a range needs exactly two values, got {}", values.len()))),
        }
    }

    /// Linear interpolation of both components: `t * (other - self) + self`.
    pub fn lerp(self, other: Range2, t: f64) -> Range2 {
        Range2(
            t * (other.0 - self.0) + self.0,
            t * (other.1 - self.1) + self.1)
    }

    fn is_finite(self) -> bool {
        self.0.is_finite() && self.1.is_finite()
    }
}

impl From<[f64; 2]> for Range2 {
    fn from(a: [f64; 2]) -> Range2 {
        Range2(a[0], a[1])
    }
}

impl From<Range2> for [f64; 2] {
    fn from(r: Range2) -> [f64; 2] {
        [r.0, r.1]
    }
}




/**
 * @brief      The planar extent of the lattice at one spanwise station: a
 *             chordwise range (trailing edge, leading edge), a thickness range
 *             (lower, upper) and the spanwise coordinate of the plane.
 */
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SectionBox {
    pub x: Range2,
    pub y: Range2,
    pub z: f64,
}

impl SectionBox {
    pub fn new(x: impl Into<Range2>, y: impl Into<Range2>, z: f64) -> Self {
        SectionBox{x: x.into(), y: y.into(), z}
    }

    pub fn from_slices(x: &[f64], y: &[f64], z: f64) -> Result<Self, FfdError> {
        Ok(SectionBox{x: Range2::from_slice(x)?, y: Range2::from_slice(y)?, z})
    }

    pub(crate) fn validate(&self, name: &str) -> Result<(), FfdError> {
        if self.x.is_finite() && self.y.is_finite() && self.z.is_finite() {
            Ok(())
        } else {
            Err(FfdError::invalid(format!("{} section has non-finite coordinates", name)))
        }
    }
}




/**
 * @brief      Number of control points along the chord, through the thickness
 *             and along the span. Only constructed through `new`, so every
 *             count is at least 2 and the total point count fits in a usize.
 */
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LatticeResolution {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl LatticeResolution {
    pub fn new(nx: usize, ny: usize, nz: usize) -> Result<Self, FfdError> {
        for (axis, n) in [("nX", nx), ("nY", ny), ("nZ", nz)] {
            if n < 2 {
                return Err(FfdError::invalid(format!("{} must be at least 2, got {}", axis, n)));
            }
        }
        if checked_point_count(nx, ny, nz).is_none() {
            return Err(FfdError::invalid(format!("a {}x{}x{} lattice has too many points", nx, ny, nz)));
        }
        Ok(LatticeResolution{nx, ny, nz})
    }

    pub fn nx(self) -> usize { self.nx }
    pub fn ny(self) -> usize { self.ny }
    pub fn nz(self) -> usize { self.nz }

    pub fn num_rows(self) -> usize {
        self.ny * self.nz
    }

    pub fn num_points(self) -> usize {
        self.nx * self.ny * self.nz
    }
}

/// nx * ny * nz, or None on overflow.
pub(crate) fn checked_point_count(nx: usize, ny: usize, nz: usize) -> Option<usize> {
    nx.checked_mul(ny)?.checked_mul(nz)
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_need_exactly_two_values() {
        assert_eq!(Range2::from_slice(&[-0.1, 5.1]).unwrap(), Range2(-0.1, 5.1));
        assert!(matches!(Range2::from_slice(&[1.0]), Err(FfdError::InvalidConfiguration(_))));
        assert!(matches!(Range2::from_slice(&[1.0, 2.0, 3.0]), Err(FfdError::InvalidConfiguration(_))));
        assert!(SectionBox::from_slices(&[0.0, 1.0], &[], 0.0).is_err());
    }

    #[test]
    fn degenerate_resolutions_are_rejected() {
        assert!(LatticeResolution::new(6, 2, 8).is_ok());
        assert!(matches!(LatticeResolution::new(1, 2, 8), Err(FfdError::InvalidConfiguration(_))));
        assert!(matches!(LatticeResolution::new(6, 0, 8), Err(FfdError::InvalidConfiguration(_))));
        assert!(matches!(LatticeResolution::new(6, 2, 1), Err(FfdError::InvalidConfiguration(_))));
    }

    #[test]
    fn oversized_resolutions_are_rejected() {
        let n: usize = 1 << 32;
        assert!(matches!(LatticeResolution::new(n, n, n), Err(FfdError::InvalidConfiguration(_))));
        assert_eq!(checked_point_count(n, n, n), None);
        assert_eq!(checked_point_count(6, 2, 8), Some(96));

        let r = LatticeResolution::new(6, 2, 8).unwrap();
        assert_eq!((r.nx(), r.ny(), r.nz()), (6, 2, 8));
        assert_eq!((r.num_rows(), r.num_points()), (16, 96));
    }

    #[test]
    fn lattice_boxes_recheck_their_resolution() {
        let section = SectionBox::new([0.0, 1.0], [-0.5, 0.5], 0.0);
        let tip = SectionBox::new([0.0, 1.0], [-0.5, 0.5], 1.0);
        let flat = LatticeResolution{nx: 1, ny: 1, nz: 8};
        let result = crate::FfdBox::new(section, tip, flat, 0.8);
        assert!(matches!(result, Err(FfdError::InvalidConfiguration(_))));
    }

    #[test]
    fn lerp_hits_both_ends() {
        let root = Range2(-0.5, 0.5);
        let tip = Range2(-0.25, 0.25);
        assert_eq!(root.lerp(tip, 0.0), root);
        assert_eq!(root.lerp(tip, 1.0), tip);
        assert_eq!(root.lerp(tip, 0.5), Range2(-0.375, 0.375));
    }

    #[test]
    fn non_finite_sections_fail_validation() {
        assert!(SectionBox::new([0.0, 1.0], [0.0, 1.0], f64::NAN).validate("root").is_err());
        assert!(SectionBox::new([0.0, 1.0], [0.0, 1.0], 0.0).validate("root").is_ok());
    }
}
