//! bmpinspect: print the structure of a BMP file.
//!
//! Usage: `bmpinspect <file>`. Set `RUST_LOG=bmpinspect=trace` to see the
//! decoder's own log.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use bmpinspect::{InspectRequest, Unstoppable, trace::Trace};
use clap::{Arg, Command, value_parser};

#[rustfmt::skip]
fn create_cmd_args() -> Command {
    Command::new("bmpinspect")
        .about("Print the structure of a BMP file")
        .arg(Arg::new("file")
            .help("BMP file to inspect")
            .value_parser(value_parser!(PathBuf))
            .required(true))
}

fn main() -> ExitCode {
    env_logger::init();

    let matches = match create_cmd_args().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    let Some(path) = matches.get_one::<PathBuf>("file") else {
        return ExitCode::FAILURE;
    };

    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error: {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };
    log::debug!("read {} bytes from {}", data.len(), path.display());

    let partial = InspectRequest::new(&data).inspect_partial(Unstoppable);

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = write!(stdout, "{}", Trace(&partial)).and_then(|()| stdout.flush()) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    if partial.error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
