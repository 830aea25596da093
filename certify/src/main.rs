//! Certification command-line interface
//!
//! `certify create` writes reference values for a set of shell quartets;
//! `certify run` checks the engines against such a file. The exit status of
//! `run` is the number of failures, capped at 255.

use certify::app::CertifyApplication;
use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;

    let app = CertifyApplication::from_cli()?;
    let nfailed = app.run()?;
    std::process::exit(nfailed.min(255) as i32);
}
