use std::process::ExitCode;

fn main() -> ExitCode {
    helply_cli::run()
}
