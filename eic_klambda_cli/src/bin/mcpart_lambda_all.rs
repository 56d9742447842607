use eic_klambda_cli::{converter_args, converter_command, drive, get_matches_or_exit, init_feedback};
use libeic_klambda::process::run_mcpart_lambda;

fn main() {
    let matches = get_matches_or_exit(converter_command(
        "mcpart_lambda_all",
        "Flatten every matched Lambda decay per event from MC truth to CSV",
        "mcpart_lambda_all.csv",
    ));
    let args = converter_args(&matches);

    let pb_manager = init_feedback();
    match drive(&pb_manager, move |tx| run_mcpart_lambda(&args, true, &tx)) {
        Some(summary) => summary.print(),
        None => std::process::exit(1),
    }
}
