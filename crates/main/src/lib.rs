//! Process setup shared by the `devops-report` and `text-to-pdf` binaries.

use std::error::Error;

use log::LevelFilter;

/// Environment variable holding the `env_logger` filter.
pub const LOG_ENV: &str = "DEVOPS_REPORT_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn,devops_report=info";

/// Initialises `env_logger`; `DEVOPS_REPORT_LOG` overrides the default filter.
pub fn init_logging() {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Warn)
        .parse_env(env_logger::Env::default().filter_or(LOG_ENV, DEFAULT_LOG_FILTER))
        .init();
}

/// Prints `error` and its `source()` chain to stderr, then exits with status 1.
pub fn exit_with_error(error: &(dyn Error + 'static)) -> ! {
    eprintln!("Error: {}", error);
    print_error_sources(error);
    std::process::exit(1);
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
