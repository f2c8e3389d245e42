//! Batch driver: run the flammability model over one or more parameter
//! files and print the results.
//!
//! ```text
//! demo-headless [--json] site1.txt site2.txt ...
//! ```
//!
//! Files are independent, so they are processed in parallel; output order
//! follows the argument order.

use std::process::ExitCode;

use rayon::prelude::*;
use tracing::error;

use flammability_core::format::format_result;
use flammability_core::params::site_from_text;
use flammability_core::run_with_defaults;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let files: Vec<&String> = args.iter().filter(|a| *a != "--json").collect();
    if files.is_empty() {
        eprintln!("usage: demo-headless [--json] <parameter file>...");
        return ExitCode::FAILURE;
    }

    let reports: Vec<Result<String, String>> = files
        .par_iter()
        .map(|path| run_file(path, json).map_err(|e| format!("{path}: {e}")))
        .collect();

    let mut failed = false;
    for report in reports {
        match report {
            Ok(text) => println!("{text}"),
            Err(message) => {
                error!("{message}");
                failed = true;
            }
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_file(path: &str, json: bool) -> Result<String, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let site = site_from_text(&text).map_err(|e| e.to_string())?;
    let result =
        run_with_defaults(&site, site.fire_line_length()).map_err(|e| e.to_string())?;
    if json {
        serde_json::to_string_pretty(&result).map_err(|e| e.to_string())
    } else {
        Ok(format!("=== {path} ===\n{}", format_result(&result)))
    }
}
