use aliastool::core;
use aliastool::status::ExitStatus;

/// Entry point - collects argv and calls core::run()
///
/// Returns ExitStatus directly, which implements std::process::Termination.
fn main() -> ExitStatus {
    let args: Vec<String> = std::env::args().collect();
    core::run(args)
}
