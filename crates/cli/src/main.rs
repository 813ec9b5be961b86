use std::process::ExitCode;

fn main() -> ExitCode {
    vouchers_cli::run()
}
