//! # canscan CLI
//!
//! Command-line front end for CanScan Lite.
//!
//! ## Usage
//! ```bash
//! canscan assess --corpus ~/datasets/reference --image scan.png \
//!     --symptom chronic-cough --symptom persistent-fatigue
//! canscan match --corpus ~/datasets/reference --image scan.png --output json
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    canscan_lite::init_tracing();
    cli::run()
}
