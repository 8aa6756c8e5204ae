use std::path::PathBuf;

use clap::Parser;

use devops_report::{generate, GenerateOptions, ReportCompiler};
use devops_report_cli::{exit_with_error, init_logging};

const DEFAULT_JSON: &str =
    "/mnt/data/report_1762622884293_reporte_devops_Luis_Arenas_20251108_172737.pdf.json";

/// Generates the DevOps maturity report (DOCX) from an assessment JSON file.
///
/// Chart labels need a TrueType font: place the Roboto faces under `assets/fonts` or point
/// `DEVOPS_REPORT_FONTS_DIR` at them, otherwise a system family is used when available.
#[derive(Parser)]
#[command(author, version, about = "Genera el Word de Reporte de Madurez DevOps")]
struct Cli {
    /// Assessment JSON file.
    #[arg(long, env = "DEVOPS_REPORT_JSON", default_value = DEFAULT_JSON)]
    json: PathBuf,

    /// Logo shown on the cover; skipped with a warning when missing.
    #[arg(
        long,
        env = "DEVOPS_REPORT_LOGO",
        default_value = "/mnt/data/logo_readymind_green.png"
    )]
    logo: PathBuf,

    /// Directory the report is written to.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Also write a PDF rendering next to the DOCX.
    #[arg(long)]
    pdf: bool,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let options = GenerateOptions {
        json: cli.json,
        logo: cli.logo,
        output_dir: cli.output_dir,
        write_pdf: cli.pdf,
    };

    match generate(&ReportCompiler::default(), &options) {
        Ok(files) => {
            println!("Documento generado: {}", files.docx.display());
            if let Some(pdf) = files.pdf {
                println!("Documento generado: {}", pdf.display());
            }
        }
        Err(err) => exit_with_error(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_exported_assessment() {
        let cli = Cli::try_parse_from(["devops-report", "--pdf"]).expect("parse");
        if std::env::var_os("DEVOPS_REPORT_JSON").is_none() {
            assert_eq!(cli.json, PathBuf::from(DEFAULT_JSON));
        }
        assert_eq!(cli.output_dir, PathBuf::from("."));
        assert!(cli.pdf);
    }
}
