/**
 * @brief      Sets up a single-point drag minimization of a 2D airfoil at a
 *             fixed lift coefficient, with local FFD shape variables.
 *
 * @copyright  Jonathan Zrake, Clemson University (2020)
 *
 * @note       Model parameters are given as key=value pairs, as with lib_config
 *             elsewhere, e.g.
 *
 *             ./airfoil-opt-cfg mach=0.72 cl=0.45 vol_con=true ffd_file=ffd.xyz
 *
 *             The program reads the FFD lattice, derives the solver and
 *             optimizer options, the cruise problem, the geometric constraints
 *             tied to the lattice, and the optimization problem, and records
 *             all of it in <output>/setup.txt. The flow solution and the
 *             optimization itself are carried out by an AnalysisBackend
 *             implementation around the external solver and optimizer.
 */




// ============================================================================
use std::io::Write;
use std::path::Path;
use anyhow::Context;

use lib_ffd::{read_xyz, LatticeIndex};
use lib_aero_opt::*;
use lib_aero_opt::constraints::LinkedPoints;
use lib_aero_opt::objective::OptConstraint;




// ============================================================================
struct Setup {
    task: TaskOptions,
    index: LatticeIndex,
    aero_options: AeroOptions,
    mesh_options: MeshOptions,
    optimizer_options: OptimizerOptions,
    problem: AeroProblem,
    geometry: GeometricConstraints,
    optimization: OptimizationProblem,
}




// ============================================================================
fn make_opts<T: Iterator<Item=String>>(args: T) -> Result<lib_config::Form, lib_config::ConfigError> {
    let arg_key_vals = lib_config::to_string_map_from_key_val_pairs(args)?;

    TaskOptions::form()
        .item("ffd_file"  , "../ffd/ffd.xyz"    , "FFD lattice file")
        .item("grid_file" , "../mesh/n0012.cgns", "Volume mesh of the airfoil")
        .item("optimizer" , "SNOPT"             , "Optimizer: SNOPT or SLSQP")
        .item("quiet"     , false               , "Only log warnings and errors")
        .merge_string_map(arg_key_vals)
}




// ============================================================================
fn assemble(opts: &lib_config::Form) -> anyhow::Result<Setup> {
    let task = TaskOptions::from_form(opts)?.normalize();
    task.validate()?;

    let ffd_file = opts.get_string("ffd_file")?;
    let grid = read_xyz(&ffd_file).with_context(|| format!("failed to read FFD file {}", ffd_file))?;
    let index = grid.index();

    let grid_file = opts.get_string("grid_file")?;
    let aero_options = AeroOptions{grid_file: grid_file.clone(), ..AeroOptions::for_task(&task)};
    aero_options.validate()?;
    let mesh_options = MeshOptions{grid_file};

    let kind: OptimizerKind = opts.get_string("optimizer")?.parse()?;
    let optimizer_options = OptimizerOptions::new(kind, &task.output);
    optimizer_options.validate()?;

    let problem = AeroProblem::cruise(&task);
    let geometry = GeometricConstraints::build(&task, &index)?;
    let optimization = OptimizationProblem::build(&task, &problem, &geometry, &index);

    log::info!(
        "{} design variables, {} constraint values on a {:?} lattice",
        optimization.num_variables(),
        optimization.num_constraints(),
        index.shape());

    Ok(Setup{task, index, aero_options, mesh_options, optimizer_options, problem, geometry, optimization})
}




// ============================================================================
fn bound(b: Option<f64>) -> String {
    b.map(|x| x.to_string()).unwrap_or_else(|| "-".into())
}

fn write_key_values<W: Write>(w: &mut W, title: &str, kv: &[(&'static str, lib_config::Value)]) -> std::io::Result<()> {
    writeln!(w, "[{}]", title)?;
    for (key, value) in kv {
        writeln!(w, "\t{:.<32} {}", key, value)?;
    }
    writeln!(w)
}

fn write_linked<W: Write>(w: &mut W, linked: &LinkedPoints) -> std::io::Result<()> {
    writeln!(w, "\t{} factors=({}, {}) bounds=[{}, {}]", linked.name, linked.factor_a, linked.factor_b, linked.lower, linked.upper)?;
    writeln!(w, "\t\tA: {:?}", linked.set_a)?;
    writeln!(w, "\t\tB: {:?}", linked.set_b)
}

fn write_constraint<W: Write>(w: &mut W, c: &OptConstraint) -> std::io::Result<()> {
    writeln!(w, "\t{:<36} n={:<4} lower={:<10} upper={:<10} scale={:<10.4} {}{}",
        c.name,
        c.count,
        bound(c.lower),
        bound(c.upper),
        c.scale,
        if c.linear { "linear" } else { "nonlinear" },
        c.wrt.as_ref().map(|s| format!(" wrt={}", s)).unwrap_or_default())
}

fn write_setup<W: Write>(w: &mut W, setup: &Setup) -> std::io::Result<()> {
    write_key_values(w, "aero options", &setup.aero_options.to_key_values())?;
    writeln!(w, "[slices]")?;
    for slice in &setup.aero_options.slices {
        writeln!(w, "\t{}", slice)?;
    }
    writeln!(w)?;
    write_key_values(w, "mesh options", &setup.mesh_options.to_key_values())?;
    write_key_values(w, &format!("optimizer {}", setup.optimizer_options.name()), &setup.optimizer_options.to_key_values())?;
    writeln!(w, "\thistory file: {}\n", OptimizerOptions::history_file(&setup.task.output))?;

    let p = &setup.problem;
    writeln!(w, "[aero problem]")?;
    writeln!(w, "\tname={} alpha={} mach={} altitude={} areaRef={} chordRef={} evalFuncs={:?}",
        p.name, p.alpha, p.mach, p.altitude, p.area_ref, p.chord_ref, p.eval_funcs)?;
    if let Some(t) = setup.task.trim_request() {
        writeln!(w, "\ttrim to cl={} (delta={}, tol={})", t.target_cl, t.delta, t.tol)?;
    }
    writeln!(w)?;

    writeln!(w, "[design variables]")?;
    for dv in &setup.optimization.variables {
        writeln!(w, "\t{:<8} n={:<4} lower={:<8} upper={:<8} scale={}{}",
            dv.name, dv.count, dv.lower, dv.upper, dv.scale,
            dv.axis.map(|a| format!(" axis={}", a)).unwrap_or_default())?;
    }
    writeln!(w)?;

    let (nx, ny, nz) = setup.index.shape();
    writeln!(w, "[geometric constraints] lattice {}x{}x{}", nx, ny, nz)?;
    write_linked(w, &setup.geometry.le_te)?;
    write_linked(w, &setup.geometry.spanwise)?;
    writeln!(w, "\tleading-edge stations:  {:?}", setup.geometry.stations.leading)?;
    writeln!(w, "\ttrailing-edge stations: {:?}", setup.geometry.stations.trailing)?;
    for c in setup.geometry.volume.iter().chain(setup.geometry.thickness.iter()) {
        writeln!(w, "\t{:<36} {}x{} lower={} upper={} scaled={} optimizer={}",
            c.name, c.n_span, c.n_chord, bound(c.lower), bound(c.upper), c.scaled, c.add_to_optimizer)?;
    }
    writeln!(w)?;

    let o = &setup.optimization;
    writeln!(w, "[optimization problem] {}", o.name)?;
    writeln!(w, "\tobjective {} scale={}", o.objective.name, o.objective.scale)?;
    for c in &o.constraints {
        write_constraint(w, c)?;
    }
    Ok(())
}

fn save_setup(setup: &Setup) -> anyhow::Result<std::path::PathBuf> {
    let dir = Path::new(&setup.task.output);
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let path = dir.join("setup.txt");
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = std::io::BufWriter::new(&mut file);
        write_setup(&mut writer, setup)?;
        writer.flush()?;
    }
    file.persist(&path).map_err(|e| e.error).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}




// ============================================================================
fn run() -> anyhow::Result<()> {
    let opts = make_opts(std::env::args().skip(1))?;

    let level = if opts.get_bool("quiet")? { log::LevelFilter::Warn } else { log::LevelFilter::Info };
    env_logger::builder().filter_level(level).init();

    for (key, parameter) in &opts {
        println!("\t{:.<24} {: <20} {}", key, parameter.value, parameter.about);
    }

    let setup = assemble(&opts)?;
    let path = save_setup(&setup)?;
    log::info!("wrote {}", path.display());
    Ok(())
}




// ============================================================================
fn main() {
    if let Err(error) = run() {
        eprintln!("error: {:#}", error);
        std::process::exit(1);
    }
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use lib_ffd::{write_xyz, FfdBox, LatticeResolution, SectionBox, XyzLayout};

    fn args(pairs: &[&str]) -> impl Iterator<Item=String> {
        pairs.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    fn ffd_file(dir: &Path) -> String {
        let grid = FfdBox::new(
            SectionBox::new([-0.001, 1.001], [-0.1, 0.1], 0.0),
            SectionBox::new([-0.001, 1.001], [-0.1, 0.1], 1.0),
            LatticeResolution::new(10, 2, 2).unwrap(),
            1.0).unwrap().generate();
        let path = dir.join("ffd.xyz");
        write_xyz(&grid, &path, XyzLayout::Legacy).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(make_opts(args(&["mach=0.7", "machh=0.7"])).is_err());
        assert!(make_opts(args(&["mach"])).is_err());
    }

    #[test]
    fn setup_is_wired_to_the_lattice() {
        let dir = tempfile::tempdir().unwrap();
        let ffd = ffd_file(dir.path());
        let output = dir.path().join("out");
        let ffd_arg = format!("ffd_file={}", ffd);
        let output_arg = format!("output={}", output.display());
        let opts = make_opts(args(&[ffd_arg.as_str(), output_arg.as_str(), "cl=0", "optimizer=slsqp"])).unwrap();

        let setup = assemble(&opts).unwrap();
        assert!(setup.task.zero_lift);
        assert!(!setup.problem.has_alpha_variable());
        assert_eq!(setup.optimization.num_variables(), 40);
        assert_eq!(setup.geometry.le_te.set_a, vec![0, 9]);
        assert_eq!(setup.optimizer_options.kind(), OptimizerKind::Slsqp);

        let path = save_setup(&setup).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("[optimizer slsqp]"));
        assert!(text.contains("KSThickness"));
        assert!(text.contains("DVCon1_thickness_constraints_2"));
        assert!(text.contains("[slices]\n\tz [0.5] (absolute)\n"));
    }

    #[test]
    fn missing_ffd_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.xyz");
        let ffd_arg = format!("ffd_file={}", missing.display());
        let opts = make_opts(args(&[ffd_arg.as_str()])).unwrap();
        let err = assemble(&opts).err().unwrap();
        assert!(format!("{:#}", err).contains("failed to read FFD file"));
    }
}
