//! Vocab tutor webhook server binary.
//! Run with: cargo run --bin vocabot-server

use std::process::ExitCode;

use vocabot::start_tutor;

fn main() -> ExitCode {
    start_tutor::run()
}
