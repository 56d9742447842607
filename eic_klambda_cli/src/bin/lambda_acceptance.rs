use clap::Arg;
use std::path::PathBuf;

use eic_klambda_cli::{converter_args, converter_command, drive, get_matches_or_exit, init_feedback};
use libeic_klambda::detectors::DetectorConfig;
use libeic_klambda::process::run_lambda_acceptance;

fn main() {
    let command = converter_command(
        "lambda_acceptance",
        "MC-truth Lambda decays with per-subsystem detection flags and hit side tables",
        "lambda_acceptance.csv",
    )
    .arg(
        Arg::new("detectors")
            .short('d')
            .long("detectors")
            .value_name("YAML")
            .help("Subsystem list to check; defaults to the bundled far-forward set"),
    );
    let matches = get_matches_or_exit(command);
    let args = converter_args(&matches);
    let detector_path = matches.get_one::<String>("detectors").map(PathBuf::from);

    let pb_manager = init_feedback();

    let config = match DetectorConfig::new(detector_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    match drive(&pb_manager, move |tx| {
        run_lambda_acceptance(&args, &config, &tx)
    }) {
        Some(summary) => summary.print(),
        None => std::process::exit(1),
    }
}
