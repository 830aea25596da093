mod create;
mod entries;
mod kernels;
mod run;

pub use create::create_test;
pub use run::{run_test, run_test_d, run_test_exact, BatchReport};

use crate::config::{
    Args, Command, Config, TestMode, DEFAULT_EXACT_PREC, DEFAULT_MIN_ACCURACY_BITS,
};
use crate::io::setup_output;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use gaussint::reference::DOUBLE_TOLERANCE;
use std::fs;
use tracing::info;

pub struct CertifyApplication {
    args: Args,
    config: Config,
}

impl CertifyApplication {
    pub fn from_cli() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Runs the selected command and returns the number of failures.
    pub fn run(self) -> Result<usize> {
        setup_output(self.args.output.as_ref(), self.args.verbose);
        info!("Configuration loaded:\n{:?}", self.config);

        match &self.args.command {
            Command::Create {
                infile,
                outfile,
                integral,
                ndigits,
            } => {
                let header = format!(
                    "Reference values for the {} integral generated with:\n  {}\n",
                    integral.name(),
                    std::env::args().collect::<Vec<_>>().join(" ")
                );
                create_test(infile, outfile, *integral, *ndigits, &header)?;
                Ok(0)
            }
            Command::Run {
                file,
                integral,
                mode,
                target_prec,
            } => {
                let params = &self.config.precision;
                let report = match mode {
                    TestMode::Interval => {
                        run_test(file, *integral, target_prec.or(params.target_prec))?
                    }
                    TestMode::Double => run_test_d(
                        file,
                        *integral,
                        params.double_tolerance.unwrap_or(DOUBLE_TOLERANCE),
                    )?,
                    TestMode::Exact => run_test_exact(
                        file,
                        *integral,
                        params.exact_prec.unwrap_or(DEFAULT_EXACT_PREC),
                        params
                            .min_accuracy_bits
                            .unwrap_or(DEFAULT_MIN_ACCURACY_BITS),
                    )?,
                };
                Ok(report.nfailed)
            }
        }
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let Some(path) = &args.config_file else {
        return Ok(Config::default().with_defaults());
    };
    let config_content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", path))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}
