use eic_klambda_cli::{converter_args, converter_command, drive, get_matches_or_exit, init_feedback};
use libeic_klambda::process::run_reco_dis;

fn main() {
    let matches = get_matches_or_exit(converter_command(
        "reco_dis",
        "Extract per-algorithm reconstructed DIS kinematics and momentum transfer to CSV",
        "reco_dis.csv",
    ));
    let args = converter_args(&matches);

    let pb_manager = init_feedback();
    match drive(&pb_manager, move |tx| run_reco_dis(&args, &tx)) {
        Some(summary) => summary.print(),
        None => std::process::exit(1),
    }
}
