/**
 * @brief      Generates the free-form deformation (FFD) control lattice of a
 *             wing-like volume and writes it as a plot3d-style .xyz file.
 *
 * @copyright  Jonathan Zrake, Clemson University (2020)
 *
 * @note       The lattice is defined by bounding boxes of the root and tip
 *             sections. Control points are spaced linearly along the chord
 *             and clustered toward the root along the span through a power-law
 *             distribution. All options have defaults reproducing the wing box
 *             of the tutorial, e.g.
 *
 *             ffd-lattice --nz 8 --x-tip 7.4,9.2 --output ffd.xyz
 */




// ============================================================================
use anyhow::Context;
use clap::Parser;
use lib_ffd::*;




// ============================================================================
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Layout {
    /// Six values per line, as the legacy writer did
    Legacy,
    /// One line per lattice row
    Rows,
}

impl From<Layout> for XyzLayout {
    fn from(layout: Layout) -> XyzLayout {
        match layout {
            Layout::Legacy => XyzLayout::Legacy,
            Layout::Rows   => XyzLayout::Rows,
        }
    }
}




// ============================================================================
// Ranges are given as two comma-separated values, e.g. --y-root=-0.5,0.5
#[derive(Parser, Debug)]
#[command(version, about = "Generate an FFD control lattice for a wing box")]
struct Opts {
    /// Chordwise extent (trailing edge, leading edge) of the root section
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_values_t = [-0.1, 5.1])]
    x_root: Vec<f64>,

    /// Thickness extent (lower, upper) of the root section
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_values_t = [-0.5, 0.5])]
    y_root: Vec<f64>,

    /// Spanwise coordinate of the root section
    #[arg(long, allow_hyphen_values = true, default_value_t = -0.01)]
    z_root: f64,

    /// Chordwise extent (trailing edge, leading edge) of the tip section
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_values_t = [7.4, 9.2])]
    x_tip: Vec<f64>,

    /// Thickness extent (lower, upper) of the tip section
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_values_t = [-0.25, 0.25])]
    y_tip: Vec<f64>,

    /// Spanwise coordinate of the tip section
    #[arg(long, allow_hyphen_values = true, default_value_t = 14.25)]
    z_tip: f64,

    /// Number of control points along the chord
    #[arg(long, default_value_t = 6)]
    nx: usize,

    /// Number of control points through the thickness
    #[arg(long, default_value_t = 2)]
    ny: usize,

    /// Number of control points along the span
    #[arg(long, default_value_t = 8)]
    nz: usize,

    /// Exponent of the spanwise distribution; below 1 clusters toward the root
    #[arg(long, default_value_t = DEFAULT_SPAN_EXPONENT)]
    span_exponent: f64,

    /// Destination file
    #[arg(short, long, default_value = "ffd.xyz")]
    output: std::path::PathBuf,

    /// Line layout of the coordinate blocks
    #[arg(long, value_enum, default_value_t = Layout::Legacy)]
    layout: Layout,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}




// ============================================================================
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder().filter_level(level).init();
}




// ============================================================================
fn build_lattice(opts: &Opts) -> Result<FfdBox, FfdError> {
    let root = SectionBox::from_slices(&opts.x_root, &opts.y_root, opts.z_root)?;
    let tip = SectionBox::from_slices(&opts.x_tip, &opts.y_tip, opts.z_tip)?;
    let resolution = LatticeResolution::new(opts.nx, opts.ny, opts.nz)?;
    FfdBox::new(root, tip, resolution, opts.span_exponent)
}




// ============================================================================
fn run(opts: Opts) -> anyhow::Result<()> {
    let ffd = build_lattice(&opts).context("invalid lattice definition")?;

    log::info!(
        "root x={:?} y={:?} z={}, tip x={:?} y={:?} z={}",
        opts.x_root, opts.y_root, opts.z_root, opts.x_tip, opts.y_tip, opts.z_tip);
    log::info!("span stations: {:.4}", ffd.span_distribution().stations());

    let grid = ffd.generate();
    write_xyz(&grid, &opts.output, opts.layout.into())
        .with_context(|| format!("failed to write {}", opts.output.display()))?;

    println!("{}", opts.output.display());
    Ok(())
}




// ============================================================================
fn main() {
    let opts = Opts::parse();
    init_logging(opts.verbose);

    if let Err(error) = run(opts) {
        eprintln!("error: {:#}", error);
        std::process::exit(1);
    }
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Opts {
        Opts::try_parse_from(std::iter::once("ffd-lattice").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_describe_the_tutorial_wing() {
        let opts = parse(&[]);
        let ffd = build_lattice(&opts).unwrap();
        assert_eq!(ffd.root(), SectionBox::new([-0.1, 5.1], [-0.5, 0.5], -0.01));
        assert_eq!(ffd.tip(), SectionBox::new([7.4, 9.2], [-0.25, 0.25], 14.25));
        assert_eq!(ffd.resolution(), LatticeResolution::new(6, 2, 8).unwrap());
        assert_eq!(ffd.span_distribution().exponent(), 0.8);
    }

    #[test]
    fn negative_ranges_parse() {
        let opts = parse(&["--y-root", "-0.7,0.7", "--z-root", "-1", "--nz", "3"]);
        assert_eq!(opts.y_root, vec![-0.7, 0.7]);
        assert_eq!(opts.z_root, -1.0);
        assert!(build_lattice(&opts).is_ok());
    }

    #[test]
    fn malformed_ranges_and_resolutions_are_invalid() {
        let opts = parse(&["--x-tip", "7.4,8.0,9.2"]);
        assert!(matches!(build_lattice(&opts), Err(FfdError::InvalidConfiguration(_))));

        let opts = parse(&["--nz", "1"]);
        assert!(matches!(build_lattice(&opts), Err(FfdError::InvalidConfiguration(_))));
    }

    #[test]
    fn run_writes_the_requested_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wing.xyz");
        let opts = parse(&["--output", path.to_str().unwrap(), "--layout", "rows", "--nx", "4"]);
        run(opts).unwrap();

        let grid = read_xyz(&path).unwrap();
        assert_eq!(grid.shape(), (16, 4));
    }

    #[test]
    fn unknown_layout_is_rejected_by_the_parser() {
        let result = Opts::try_parse_from(["ffd-lattice", "--layout", "fortran"]);
        let err = result.err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
        assert!(err.to_string().contains("legacy"));

        assert_eq!(parse(&[]).layout, Layout::Legacy);
        assert_eq!(XyzLayout::from(parse(&["--layout", "rows"]).layout), XyzLayout::Rows);
    }
}
