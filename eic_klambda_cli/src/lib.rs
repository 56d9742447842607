//! Shared plumbing for the converter binaries: the uniform argument
//! surface, logging/progress setup, and the worker thread driving a
//! converter while its status feeds the progress bar.

use clap::error::ErrorKind;
use clap::{Arg, ArgMatches, Command};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use libeic_klambda::error::ConverterError;
use libeic_klambda::process::ConverterArgs;
use libeic_klambda::status::ConverterStatus;

/// Build the uniform converter CLI: `<prog> [-n N] [-o OUTFILE] INPUT...`
pub fn converter_command(
    name: &'static str,
    about: &'static str,
    default_output: &'static str,
) -> Command {
    Command::new(name)
        .about(about)
        .arg(
            Arg::new("num-events")
                .short('n')
                .long("num-events")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .help("Cap on total events processed across all inputs"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTFILE")
                .default_value(default_output)
                .help("Primary output CSV path"),
        )
        .arg(
            Arg::new("inputs")
                .value_name("INPUT")
                .num_args(1..)
                .required(true)
                .help("Input event container files"),
        )
}

/// Parse the command line, exiting 0 on help/version and 1 on any error
pub fn get_matches_or_exit(command: Command) -> ArgMatches {
    match command.try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            e.print().expect("Could not print CLI error!");
            std::process::exit(code);
        }
    }
}

/// Extract the uniform arguments
pub fn converter_args(matches: &ArgMatches) -> ConverterArgs {
    ConverterArgs {
        inputs: matches
            .get_many::<String>("inputs")
            .expect("inputs are required")
            .map(PathBuf::from)
            .collect(),
        output: PathBuf::from(
            matches
                .get_one::<String>("output")
                .expect("output has a default"),
        ),
        max_events: matches.get_one::<u64>("num-events").copied(),
    }
}

/// Initialize terminal logging bridged with the progress bar manager
pub fn init_feedback() -> MultiProgress {
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    LogWrapper::new(pb_manager.clone(), logger)
        .try_init()
        .expect("Could not create logging/progress!");

    pb_manager
}

/// Drive a converter on a worker thread, mirroring its status heartbeats
/// into a progress bar. Returns None (after logging) if the conversion
/// failed; the binaries turn that into exit code 1.
pub fn drive<T, F>(pb_manager: &MultiProgress, job: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce(Sender<ConverterStatus>) -> Result<T, ConverterError> + Send + 'static,
{
    let pb = pb_manager.add(ProgressBar::new(100));
    let (tx, rx) = std::sync::mpsc::channel();
    let handle = std::thread::spawn(move || job(tx));

    loop {
        while let Ok(status) = rx.try_recv() {
            pb.set_position((status.progress * 100.0) as u64);
        }
        if handle.is_finished() {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    pb.finish();

    match handle.join() {
        Ok(Ok(result)) => Some(result),
        Ok(Err(e)) => {
            log::error!("Conversion failed with error: {e}");
            None
        }
        Err(_) => {
            log::error!("Failed to join converter task!");
            None
        }
    }
}
