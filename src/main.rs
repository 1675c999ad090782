//! release-tagger binary entry point.

use std::process::ExitCode;

use release_tagger::ui::output;

fn main() -> ExitCode {
    match release_tagger::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
