use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use ndarray::Array2;
use crate::{ControlPointGrid, FfdError, LatticeResolution};
use crate::geometry::checked_point_count;




// ============================================================================
const LEGACY_VALUES_PER_LINE: usize = 6;




/**
 * @brief      How the coordinate values of each block are broken into lines.
 *
 * @note       Legacy reproduces the historical writer: the rows of a block are
 *             concatenated and emitted six values to a line, so for nX = 6
 *             every line is one lattice row. Rows puts each lattice row on its
 *             own line whatever nX is. Readers that tokenize on whitespace
 *             accept both.
 */
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum XyzLayout {
    #[default]
    Legacy,
    Rows,
}

impl std::str::FromStr for XyzLayout {
    type Err = FfdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(XyzLayout::Legacy),
            "rows"   => Ok(XyzLayout::Rows),
            _ => Err(FfdError::InvalidConfiguration(format!("unknown .xyz layout '{}'", s))),
        }
    }
}




// ============================================================================
fn write_values<W: Write>(writer: &mut W, values: &[f64]) -> std::io::Result<()> {
    for v in values {
        write!(writer, "\t{:.8}", v)?;
    }
    writeln!(writer)
}

pub fn write_xyz_to<W: Write>(grid: &ControlPointGrid, writer: &mut W, layout: XyzLayout) -> Result<(), FfdError> {
    let r = grid.resolution();
    writeln!(writer, "\t\t1")?;
    writeln!(writer, "\t\t{}\t\t{}\t\t{}", r.nx(), r.ny(), r.nz())?;

    for block in grid.blocks() {
        match layout {
            XyzLayout::Legacy => {
                let values: Vec<f64> = block.iter().copied().collect();
                for chunk in values.chunks(LEGACY_VALUES_PER_LINE) {
                    write_values(writer, chunk)?;
                }
            }
            XyzLayout::Rows => {
                for row in block.rows() {
                    let values: Vec<f64> = row.iter().copied().collect();
                    write_values(writer, &values)?;
                }
            }
        }
    }
    Ok(())
}




/**
 * @brief      Write the lattice to a file. The data go to a temporary file in
 *             the destination directory which is renamed over the target only
 *             once it has been written and synced, so a failure never leaves a
 *             truncated lattice behind.
 */
pub fn write_xyz<P: AsRef<Path>>(grid: &ControlPointGrid, path: P, layout: XyzLayout) -> Result<(), FfdError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(&mut file);
        write_xyz_to(grid, &mut writer, layout)?;
        writer.flush()?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    log::info!("wrote {} control points to {}", grid.resolution().num_points(), path.display());
    Ok(())
}




// ============================================================================
struct Tokens<R> {
    lines: std::io::Lines<R>,
    line: usize,
    pending: std::vec::IntoIter<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Tokens{lines: reader.lines(), line: 0, pending: Vec::new().into_iter()}
    }

    fn next_token(&mut self) -> Result<Option<String>, FfdError> {
        loop {
            if let Some(token) = self.pending.next() {
                return Ok(Some(token));
            }
            match self.lines.next() {
                None => return Ok(None),
                Some(line) => {
                    self.line += 1;
                    self.pending = line?.split_whitespace().map(String::from).collect::<Vec<_>>().into_iter();
                }
            }
        }
    }

    fn parse_error(&self, why: impl Into<String>) -> FfdError {
        FfdError::Parse{line: self.line, why: why.into()}
    }

    fn expect<T: std::str::FromStr>(&mut self, what: &str) -> Result<T, FfdError> {
        match self.next_token()? {
            None => Err(self.parse_error(format!("unexpected end of data, expected {}", what))),
            Some(token) => token.parse().map_err(|_| self.parse_error(format!("'{}' is not a valid {}", token, what))),
        }
    }
}

pub fn read_xyz_from<R: BufRead>(reader: R) -> Result<ControlPointGrid, FfdError> {
    let mut tokens = Tokens::new(reader);

    let num_blocks: usize = tokens.expect("block count")?;
    if num_blocks != 1 {
        return Err(tokens.parse_error(format!("only single-block lattices are supported, found {} blocks", num_blocks)));
    }
    let nx = tokens.expect("nX")?;
    let ny = tokens.expect("nY")?;
    let nz = tokens.expect("nZ")?;
    if checked_point_count(nx, ny, nz).is_none() {
        return Err(tokens.parse_error(format!("a {}x{}x{} block has more points than can be addressed", nx, ny, nz)));
    }
    let resolution = LatticeResolution::new(nx, ny, nz)?;
    let shape = (resolution.num_rows(), resolution.nx());

    // the header's point count is untrusted, so nothing is preallocated
    let mut read_block = |name: &str| -> Result<Array2<f64>, FfdError> {
        let what = format!("{} coordinate", name);
        let mut values = Vec::new();
        for _ in 0..resolution.num_points() {
            values.push(tokens.expect::<f64>(&what)?);
        }
        Array2::from_shape_vec(shape, values).map_err(|e| FfdError::InvalidConfiguration(e.to_string()))
    };
    let x = read_block("x")?;
    let y = read_block("y")?;
    let z = read_block("z")?;

    if let Some(extra) = tokens.next_token()? {
        return Err(tokens.parse_error(format!("trailing data '{}' after the z block", extra)));
    }
    ControlPointGrid::from_blocks(resolution, x, y, z)
}

pub fn read_xyz<P: AsRef<Path>>(path: P) -> Result<ControlPointGrid, FfdError> {
    let file = std::fs::File::open(path.as_ref())?;
    let grid = read_xyz_from(BufReader::new(file))?;
    log::debug!("read {:?} lattice from {}", grid.index().shape(), path.as_ref().display());
    Ok(grid)
}
