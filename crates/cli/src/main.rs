use std::process::ExitCode;

fn main() -> ExitCode {
    cartplan_cli::run()
}
