use chrono::Local;
use clap::{Parser, Subcommand};
use invoice_pdf::layout::LayoutConfig;
use invoice_pdf::{
    discover_font, records_from_json, render_batch, render_invoice_pdf, write_outputs, FontBook,
    InvoiceError, InvoiceRecord, FONT_ENV,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about = "Render invoices to PDF", long_about = None)]
struct Args {
    /// Font file to set invoices in; defaults to the bundled or system Noto fonts
    #[arg(long, global = true, env = FONT_ENV)]
    font: Option<PathBuf>,

    /// Logo placed in the top-right corner of the first page
    #[arg(long, global = true)]
    logo: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one JSON invoice record to a PDF file
    Render {
        record: PathBuf,
        #[arg(short, long, default_value = "invoice.pdf")]
        output: PathBuf,
    },
    /// Render a JSON array of invoice records into a directory of PDFs
    Batch {
        records: PathBuf,
        #[arg(short, long, default_value = "invoices")]
        output: PathBuf,
    },
}

fn load_fonts(explicit: Option<&Path>) -> Result<FontBook, InvoiceError> {
    let base = std::env::current_dir()?;
    let mut fonts = FontBook::new();
    fonts.add(discover_font(explicit, &base)?);
    Ok(fonts)
}

fn run(args: Args) -> Result<bool, InvoiceError> {
    let fonts = load_fonts(args.font.as_deref())?;
    let config = LayoutConfig::default();
    let logo = args.logo.as_deref();
    let now = Local::now();

    match args.command {
        Command::Render { record, output } => {
            let record = InvoiceRecord::from_json(&fs::read_to_string(&record)?)?;
            let bytes = render_invoice_pdf(&record, &fonts, &config, logo, now)?;
            fs::write(&output, bytes)?;
            println!("wrote {}", output.display());
            Ok(true)
        }
        Command::Batch { records, output } => {
            let records = records_from_json(&fs::read_to_string(&records)?)?;
            let outputs = render_batch(&records, &fonts, &config, logo, now);
            let written = write_outputs(&outputs, &output)?;
            for failed in outputs.iter().filter(|o| o.result.is_err()) {
                if let Err(e) = &failed.result {
                    eprintln!("{}: {e}", failed.file_name);
                }
            }
            println!(
                "wrote {written} of {} invoices to {}",
                outputs.len(),
                output.display()
            );
            Ok(written == outputs.len())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("invoice_pdf=info"))
        .init();

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
