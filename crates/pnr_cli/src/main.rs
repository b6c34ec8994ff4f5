//! Command-line driver for the placement-and-routing engine.
//!
//! Reads a netlist document, runs [`pnr_core::place_and_route`] on the
//! requested module, and writes the layout and routes documents. This is
//! the external collaborator described in the project's external-interface
//! contract — `pnr_core` itself has no knowledge of files, argument
//! parsing, or terminal output.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pnr_common::PnrResult;
use pnr_core::config::Config;
use pnr_diagnostics::DiagnosticSink;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Placement-and-routing engine: packs a hierarchical transistor netlist
/// onto a grid and routes every net across a fixed metal stack.
#[derive(Parser, Debug)]
#[command(name = "pnr", version, about = "Hierarchical placement and routing engine")]
struct Cli {
    /// Input netlist document (JSON).
    #[arg(short = 'f', long = "file")]
    file: PathBuf,

    /// Module name to place and route.
    #[arg(short = 'm', long = "module")]
    module: String,

    /// Sub-modules whose referenced module has fewer than this many direct
    /// MOS devices are inlined into their parent instead of placed as an
    /// opaque box.
    #[arg(short = 'n', long = "min-mos")]
    min_mos_num: Option<u32>,

    /// Inner (move-proposal) iterations per outer annealing step.
    #[arg(short = 't', long = "sa-steps")]
    sa_steps: Option<u32>,

    /// Upper bound on outer (temperature) annealing iterations.
    #[arg(short = 'c', long = "circle")]
    circle: Option<u32>,

    /// Starting annealing temperature.
    #[arg(short = 'i', long = "init-temp")]
    init_temp: Option<f64>,

    /// Output path for the layout document.
    #[arg(short = 'l', long = "layout-out", default_value = "layout.json")]
    layout_out: PathBuf,

    /// Output path for the routes document.
    #[arg(short = 'r', long = "routes-out", default_value = "routes.json")]
    routes_out: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> PnrResult<()> {
    let config = build_config(&cli);

    let netlist = pnr_io::load_netlist(&cli.file).map_err(|e| format!("reading `{}`: {e}", cli.file.display()))?;

    let diagnostics = DiagnosticSink::new();
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/100%")
            .unwrap()
            .progress_chars("=> "),
    );
    bar.set_message(format!("annealing `{}`", cli.module));

    // No seed flag on the command line; a fixed seed keeps repeat CLI
    // invocations against the same input reproducible.
    let mut rng = StdRng::seed_from_u64(0);

    let result = pnr_core::place_and_route(
        &netlist,
        &cli.module,
        &cli.module,
        &config,
        &diagnostics,
        &mut rng,
        &mut |progress| bar.set_position((progress * 100.0).round() as u64),
    );
    bar.finish_and_clear();

    let root = result.map_err(|e| e.to_string())?;

    let layout = pnr_core::emit::emit_layout(&root);
    let routes = pnr_core::emit::emit_routes(&root);
    pnr_core::emit::log_summary(&layout, &routes, &diagnostics);

    pnr_io::write_layout(&layout, &cli.layout_out)
        .map_err(|e| format!("writing `{}`: {e}", cli.layout_out.display()))?;
    pnr_io::write_routes(&routes, &cli.routes_out)
        .map_err(|e| format!("writing `{}`: {e}", cli.routes_out.display()))?;

    Ok(())
}

fn build_config(cli: &Cli) -> Config {
    let mut config = Config::default();
    if let Some(v) = cli.min_mos_num {
        config.min_mos_num = v;
    }
    if let Some(v) = cli.sa_steps {
        config.sa_steps = v;
    }
    if let Some(v) = cli.circle {
        config.circle = v;
    }
    if let Some(v) = cli.init_temp {
        config.init_temp = v;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_flags() {
        let cli = Cli::parse_from(["pnr", "-f", "design.json", "-m", "top"]);
        assert_eq!(cli.file, PathBuf::from("design.json"));
        assert_eq!(cli.module, "top");
        assert!(cli.min_mos_num.is_none());
        assert_eq!(cli.layout_out, PathBuf::from("layout.json"));
        assert_eq!(cli.routes_out, PathBuf::from("routes.json"));
    }

    #[test]
    fn parses_long_flags() {
        let cli = Cli::parse_from([
            "pnr",
            "--file",
            "design.json",
            "--module",
            "top",
            "--min-mos",
            "4",
            "--sa-steps",
            "200",
            "--circle",
            "50",
            "--init-temp",
            "500",
            "--layout-out",
            "out/layout.json",
            "--routes-out",
            "out/routes.json",
        ]);
        assert_eq!(cli.min_mos_num, Some(4));
        assert_eq!(cli.sa_steps, Some(200));
        assert_eq!(cli.circle, Some(50));
        assert_eq!(cli.init_temp, Some(500.0));
        assert_eq!(cli.layout_out, PathBuf::from("out/layout.json"));
        assert_eq!(cli.routes_out, PathBuf::from("out/routes.json"));
    }

    #[test]
    fn missing_required_flag_is_an_argument_error() {
        let result = Cli::try_parse_from(["pnr", "-f", "design.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn build_config_overrides_only_given_fields() {
        let cli = Cli::parse_from(["pnr", "-f", "x.json", "-m", "top", "-n", "7"]);
        let config = build_config(&cli);
        assert_eq!(config.min_mos_num, 7);
        assert_eq!(config.sa_steps, Config::default().sa_steps);
    }

    #[test]
    fn missing_module_file_reports_as_error_not_panic() {
        let cli = Cli::parse_from(["pnr", "-f", "/nonexistent/path.json", "-m", "top"]);
        let err = run(cli).unwrap_err();
        assert!(err.message.contains("/nonexistent/path.json"));
    }

    #[test]
    fn end_to_end_writes_layout_and_routes() {
        let dir = tempfile::tempdir().unwrap();
        let netlist_path = dir.path().join("inv.json");
        std::fs::write(
            &netlist_path,
            r#"
            {
                "inverter": {
                    "ports": {
                        "A": {"type": "input", "out": ["m0", "m1"]},
                        "Y": {"type": "output", "in": ["m0", "m1"]},
                        "VCC": {"type": "power", "out": ["m1"]},
                        "GND": {"type": "power", "out": ["m0"]}
                    },
                    "mosfets": {
                        "m0": {"type": "nmos", "drain": "Y", "source": "GND", "gate": "A"},
                        "m1": {"type": "pmos", "drain": "Y", "source": "VCC", "gate": "A"}
                    }
                }
            }
            "#,
        )
        .unwrap();

        let layout_out = dir.path().join("layout.json");
        let routes_out = dir.path().join("routes.json");

        let cli = Cli {
            file: netlist_path,
            module: "inverter".to_string(),
            min_mos_num: None,
            sa_steps: Some(10),
            circle: Some(5),
            init_temp: None,
            layout_out: layout_out.clone(),
            routes_out: routes_out.clone(),
        };

        run(cli).unwrap();

        assert!(layout_out.exists());
        assert!(routes_out.exists());
        let layout_json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&layout_out).unwrap()).unwrap();
        assert_eq!(layout_json["type"], "inverter");
    }
}
