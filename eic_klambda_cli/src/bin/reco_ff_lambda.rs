use eic_klambda_cli::{converter_args, converter_command, drive, get_matches_or_exit, init_feedback};
use libeic_klambda::process::run_reco_ff_lambda;

fn main() {
    let matches = get_matches_or_exit(converter_command(
        "reco_ff_lambda",
        "Flatten reconstructed far-forward Lambda candidates and their decay products to CSV",
        "reco_ff_lambda.csv",
    ));
    let args = converter_args(&matches);

    let pb_manager = init_feedback();
    match drive(&pb_manager, move |tx| run_reco_ff_lambda(&args, &tx)) {
        Some(summary) => summary.print(),
        None => std::process::exit(1),
    }
}
