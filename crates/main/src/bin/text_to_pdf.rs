use std::path::PathBuf;

use clap::Parser;

use devops_report::text_pdf::{convert_file, DEFAULT_INPUT, DEFAULT_OUTPUT};
use devops_report_cli::{exit_with_error, init_logging};

/// Paginates a plain-text assessment into a Letter-size PDF.
#[derive(Parser)]
#[command(author, version, about = "Create a test PDF for DevOps assessment validation")]
struct Cli {
    #[arg(long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match convert_file(&cli.input, &cli.output) {
        Ok(()) => println!("PDF creado: {}", cli.output.display()),
        Err(err) => exit_with_error(&err),
    }
}
