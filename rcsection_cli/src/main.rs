//! # RcSection CLI Application
//!
//! Command-line front end for moment-curvature analysis of
//! reinforced-concrete sections described in JSON files.
//!
//! ## Usage
//!
//! ```text
//! rcsection analyze section.json --csv results/section.csv --json results/section.json
//! rcsection summary section.json
//! rcsection process section.json --out processed/section_processed.json
//! rcsection template my_section.json
//! rcsection demo
//! ```
//!
//! Set `RUST_LOG` to control log output; `--verbose` defaults it to debug.

use std::path::{Path, PathBuf};

use log::info;
use structopt::StructOpt;

use rcsection_core::calculations::{analyze, CurvatureRange};
use rcsection_core::config::SectionConfigFile;
use rcsection_core::errors::SectionResult;
use rcsection_core::file_io::{load_config, save_json, write_results_csv};
use rcsection_core::materials::{ConcreteGrade, SteelGrade};
use rcsection_core::report::{AnalysisReport, BalanceOutcome};
use rcsection_core::section::{ReinforcementLayer, SectionConfiguration, SectionGeometry};
use rcsection_core::AnalysisResult;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "rcsection",
    about = "Moment-curvature analysis of reinforced-concrete sections"
)]
struct Options {
    /// Log at debug level unless RUST_LOG says otherwise
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Run the full analysis described by a configuration file
    Analyze {
        #[structopt(parse(from_os_str))]
        config: PathBuf,

        /// Export the moment-curvature trace as CSV
        #[structopt(long, parse(from_os_str))]
        csv: Option<PathBuf>,

        /// Save the full report as JSON
        #[structopt(long, parse(from_os_str))]
        json: Option<PathBuf>,

        /// Override the number of concrete fibers
        #[structopt(long)]
        fibers: Option<usize>,
    },

    /// Print a summary of a configuration file as JSON
    Summary {
        #[structopt(parse(from_os_str))]
        config: PathBuf,
    },

    /// Save the configuration with calculated material parameters and areas
    Process {
        #[structopt(parse(from_os_str))]
        config: PathBuf,

        /// Output path (default: <name>_processed.json next to the input)
        #[structopt(long, parse(from_os_str))]
        out: Option<PathBuf>,
    },

    /// Write an example configuration file
    Template {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },

    /// Analyze the 300x500 reference beam
    Demo,
}

const RULE: &str = "═══════════════════════════════════════";

fn main() {
    let options = Options::from_args();

    let default_level = if options.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(options.command) {
        eprintln!("Error: {}", e);
        if let Ok(json) = serde_json::to_string_pretty(&e) {
            eprintln!();
            eprintln!("Error JSON:");
            eprintln!("{}", json);
        }
        std::process::exit(1);
    }
}

fn run(command: Command) -> SectionResult<()> {
    match command {
        Command::Analyze {
            config,
            csv,
            json,
            fibers,
        } => run_analyze(&config, csv.as_deref(), json.as_deref(), fibers),
        Command::Summary { config } => {
            let file = load_config(&config)?;
            file.validate()?;
            let summary = file.summary()?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::Process { config, out } => {
            let file = load_config(&config)?;
            let processed = file.process()?;
            let out = out.unwrap_or_else(|| processed_path_for(&config));
            save_json(&processed, &out)?;
            println!("Processed configuration saved to {}", out.display());
            Ok(())
        }
        Command::Template { path } => {
            save_json(&SectionConfigFile::template(), &path)?;
            println!("Template configuration written to {}", path.display());
            Ok(())
        }
        Command::Demo => run_demo(),
    }
}

fn run_analyze(path: &Path, csv: Option<&Path>, json: Option<&Path>, fibers: Option<usize>) -> SectionResult<()> {
    let mut file = load_config(path)?;
    if let Some(fibers) = fibers {
        file.analysis.fiber_count = fibers;
    }
    file.validate()?;

    let config = file.to_configuration()?;
    let request = file.analysis_request()?;
    let result = analyze(&config, &request)?;
    let report = AnalysisReport::assemble(&file, &config, &result, Some(path));

    print_report(&report);

    if let Some(csv) = csv {
        write_results_csv(&result, csv)?;
        println!("Trace exported to {}", csv.display());
    }
    if let Some(json) = json {
        save_json(&report, json)?;
        println!("Report saved to {}", json.display());
    }
    Ok(())
}

fn run_demo() -> SectionResult<()> {
    let config = SectionConfiguration::new(
        ConcreteGrade::C30,
        SteelGrade::Hrb400,
        SectionGeometry::rectangular(300.0, 500.0)?,
        vec![
            ReinforcementLayer::top("top", 942.0, 50.0),
            ReinforcementLayer::bottom("bottom", 942.0, 50.0),
        ],
    )?;
    info!("Running demo section");
    let result = config.sweep(0.0, &CurvatureRange::new(0.0, 0.0015, 200))?;

    println!("{}", RULE);
    println!("  DEMO: 300 x 500 RECTANGULAR BEAM");
    println!("{}", RULE);
    println!();
    println!("Input:");
    println!("  Section:  300 x 500 mm, {} fibers", config.fiber_count());
    println!("  Material: C30 / HRB400");
    println!("  Steel:    942 mm² top and bottom, 50 mm cover");
    println!("  Axial:    N = 0 kN");
    println!();
    print_trace(&result);
    println!();
    print_outcome(&result);
    Ok(())
}

fn print_trace(result: &AnalysisResult) {
    println!("  {:>12} {:>12} {:>12} {:>12}", "kappa", "epsilon0", "M [kN·m]", "min strain");
    for record in result.records() {
        println!(
            "  {:>12.4e} {:>12.4e} {:>12.2} {:>12.5}{}",
            record.curvature,
            record.epsilon0,
            record.moment / 1e6,
            record.min_strain,
            if record.converged { "" } else { "  (residual jump)" }
        );
    }
}

fn print_outcome(result: &AnalysisResult) {
    println!("{}", RULE);
    match result.max_moment() {
        Some(moment) => println!("  MAX MOMENT: {:.2} kN·m", moment / 1e6),
        None => println!("  MAX MOMENT: n/a (no converged steps)"),
    }
    println!("  RESULT: {}", result.failure_mode.label());
    println!("{}", RULE);
}

fn print_report(report: &AnalysisReport) {
    let info = &report.config_info;
    let section = &report.section_info;
    let params = &report.materials.parameters;

    println!("{}", RULE);
    println!("  MOMENT-CURVATURE ANALYSIS");
    println!("{}", RULE);
    println!();
    println!("Section:  {} (v{})", info.section_name, info.version);
    if !info.description.is_empty() {
        println!("          {}", info.description);
    }
    println!(
        "Geometry: height {:.1} mm, area {:.0} mm², {} contour points, {} fibers",
        section.height,
        section.area,
        section.contour.len(),
        section.fiber_count
    );
    println!(
        "Material: {} / {} (f_cd = {:.1} MPa, f_yd = {:.1} MPa)",
        report.materials.concrete, report.materials.steel, params.f_cd, params.f_yd
    );
    println!();
    println!("Reinforcement:");
    for layer in &section.reinforcement {
        let bars = match (layer.count, layer.diameter) {
            (Some(count), Some(diameter)) => format!("{} Ø{:.0}", count, diameter),
            _ => "-".to_string(),
        };
        println!(
            "  {:<10} {:<8} = {:.1} mm² at y = {:.1} mm",
            layer.name, bars, layer.area, layer.position
        );
    }

    if let Some(single) = &report.single_calculation {
        println!();
        println!("Single point (kappa = {:e}, epsilon0 = {:e}):", single.kappa, single.epsilon0);
        println!("  N = {:.2} kN", single.axial_force);
        println!("  M = {:.2} kN·m", single.moment);
    }

    if let Some(balance) = &report.balance_calculation {
        println!();
        println!(
            "Equilibrium (kappa = {:e}, N_target = {:.0} kN):",
            balance.kappa, balance.target_axial_force
        );
        match &balance.outcome {
            BalanceOutcome::Converged {
                epsilon0,
                axial_force,
                moment,
                residual,
            } => {
                println!("  epsilon0 = {:.6}", epsilon0);
                println!("  N = {:.2} kN (residual {:.3e} N)", axial_force, residual);
                println!("  M = {:.2} kN·m", moment);
            }
            BalanceOutcome::Unconverged {
                epsilon0,
                moment,
                residual,
                ..
            } => {
                println!("  not in equilibrium: residual {:.3e} N", residual);
                println!("  nearest state: epsilon0 = {:.6}, M = {:.2} kN·m", epsilon0, moment);
            }
            BalanceOutcome::NonConvergence { reason } => println!("  not converged: {}", reason),
        }
    }

    let full = &report.full_analysis;
    println!();
    println!("Full analysis:");
    println!("  Steps:           {} of {}", full.n_steps, full.requested_steps);
    if let Some(curvature) = full.final_curvature {
        println!("  Final curvature: {:e} 1/mm", curvature);
    }
    if full.unconverged_steps > 0 {
        println!("  Unconverged:     {} steps (excluded from the maximum)", full.unconverged_steps);
    }
    println!();
    println!("{}", RULE);
    match full.max_moment {
        Some(moment) => println!("  MAX MOMENT: {:.2} kN·m", moment),
        None => println!("  MAX MOMENT: n/a (no converged steps)"),
    }
    println!("  RESULT: {}", full.failure_mode);
    println!("{}", RULE);
}

fn processed_path_for(config: &Path) -> PathBuf {
    let stem = config
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    config.with_file_name(format!("{}_processed.json", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processed_path() {
        assert_eq!(
            processed_path_for(Path::new("/data/beam.json")),
            Path::new("/data/beam_processed.json")
        );
    }

    #[test]
    fn test_parse_analyze_options() {
        let options = Options::from_iter(&["rcsection", "-v", "analyze", "beam.json", "--fibers", "120"]);
        assert!(options.verbose);
        match options.command {
            Command::Analyze { config, fibers, csv, .. } => {
                assert_eq!(config, PathBuf::from("beam.json"));
                assert_eq!(fibers, Some(120));
                assert!(csv.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
