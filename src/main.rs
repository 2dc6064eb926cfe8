use gumdrop::Options;
use std::fs::File;
use std::io::{self, BufReader};

use korra::report::write_report;
use korra::result::{decode_results, AttackResult};
use korra::{KorraError, ReportConfiguration};

#[macro_use]
extern crate log;

// Read results from the configured file, or from stdin if none is configured.
fn read_results(configuration: &ReportConfiguration) -> Result<Vec<AttackResult>, KorraError> {
    if configuration.input.is_empty() {
        info!("reading results from stdin");
        decode_results(io::stdin().lock())
    } else {
        info!("reading results from {}", configuration.input);
        decode_results(BufReader::new(File::open(&configuration.input)?))
    }
}

fn run(configuration: &ReportConfiguration) -> Result<(), KorraError> {
    // Build the reporter first so configuration errors surface before any input is read.
    let reporter = configuration.build_reporter()?;
    let results = read_results(configuration)?;
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    write_report(reporter.as_ref(), &results, &mut writer)
}

fn main() {
    let configuration = ReportConfiguration::parse_args_default_or_exit();

    // If version flag is set, display package name and version and exit.
    if configuration.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    configuration.initialize_logger();

    if let Err(e) = run(&configuration) {
        error!("{}", e);
        std::process::exit(1);
    }
}
