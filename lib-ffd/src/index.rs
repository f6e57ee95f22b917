use crate::{FfdError, LatticeResolution};




/**
 * @brief      Flat numbering of the control points of one lattice block. The
 *             chordwise index varies fastest, then thickness, then span, which
 *             is the order points appear in within each .xyz coordinate block.
 *
 * @note       Out-of-range lookups are errors rather than wrapping around, so
 *             "last chord station" has to be asked for by name.
 */
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LatticeIndex {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl From<LatticeResolution> for LatticeIndex {
    fn from(r: LatticeResolution) -> Self {
        LatticeIndex{nx: r.nx(), ny: r.ny(), nz: r.nz()}
    }
}

impl LatticeIndex {
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first_chord(&self) -> usize {
        0
    }

    pub fn last_chord(&self) -> usize {
        self.nx - 1
    }

    pub fn index(&self, chord: usize, thickness: usize, span: usize) -> Result<usize, FfdError> {
        if chord >= self.nx || thickness >= self.ny || span >= self.nz {
            return Err(FfdError::InvalidConfiguration(format!(
                "lattice index ({}, {}, {}) is outside a {}x{}x{} block",
                chord, thickness, span, self.nx, self.ny, self.nz)));
        }
        Ok(chord + self.nx * (thickness + self.ny * span))
    }

    /// Inverse of `index`.
    pub fn unravel(&self, flat: usize) -> Option<(usize, usize, usize)> {
        if flat >= self.len() {
            return None;
        }
        Some((flat % self.nx, (flat / self.nx) % self.ny, flat / (self.nx * self.ny)))
    }

    /// Indices along the chord at a fixed thickness level and span station.
    pub fn chord_line(&self, thickness: usize, span: usize) -> Result<Vec<usize>, FfdError> {
        (0..self.nx).map(|i| self.index(i, thickness, span)).collect()
    }

    /// Indices of every thickness level at one chord and span station.
    pub fn thickness_line(&self, chord: usize, span: usize) -> Result<Vec<usize>, FfdError> {
        (0..self.ny).map(|j| self.index(chord, j, span)).collect()
    }
}
