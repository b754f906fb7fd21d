//! Rendering many invoices at once.
//!
//! Every record is rendered on its own: a record that fails to render produces an
//! error in its own [BatchOutput] and nothing else. Output names are derived from
//! invoice numbers and are unique within a batch.

use crate::layout::LayoutConfig;
use crate::pdf::render_invoice_pdf;
use crate::{FontBook, InvoiceError, InvoiceRecord};
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::path::Path;

/// The rendered document for one record, or why it could not be rendered
#[derive(Debug)]
pub struct BatchOutput {
    pub file_name: String,
    pub result: Result<Vec<u8>, InvoiceError>,
}

/// Token standing in for a missing invoice number
pub fn timestamp_token(now: DateTime<Local>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

/// Make an invoice number safe to use inside a file name
fn sanitise(name: &str) -> String {
    name.trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect()
}

/// File names for `records`, in order. Repeated names get `-2`, `-3`, … appended.
pub fn output_names(records: &[InvoiceRecord], timestamp: &str) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    records
        .iter()
        .map(|record| {
            let stem = match sanitise(&record.invoice_no) {
                number if number.is_empty() => timestamp.to_string(),
                number => number,
            };
            let mut name = format!("invoice_{stem}.pdf");
            let mut repeat = 1;
            while used.contains(&name) {
                repeat += 1;
                name = format!("invoice_{stem}-{repeat}.pdf");
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

/// Render every record with the same fonts, layout and logo. `now` names records
/// without an invoice number and dates every document.
pub fn render_batch(
    records: &[InvoiceRecord],
    fonts: &FontBook,
    config: &LayoutConfig,
    logo: Option<&Path>,
    now: DateTime<Local>,
) -> Vec<BatchOutput> {
    let names = output_names(records, &timestamp_token(now));
    records
        .iter()
        .zip(names)
        .map(|(record, file_name)| {
            let result = render_invoice_pdf(record, fonts, config, logo, now);
            match &result {
                Ok(bytes) => log::info!("rendered {file_name} ({} bytes)", bytes.len()),
                Err(e) => log::warn!("failed to render {file_name}: {e}"),
            }
            BatchOutput { file_name, result }
        })
        .collect()
}

/// Write the successful outputs into `dir`, creating it if needed. Returns how many
/// files were written.
pub fn write_outputs(outputs: &[BatchOutput], dir: &Path) -> Result<usize, InvoiceError> {
    std::fs::create_dir_all(dir)?;
    let mut written = 0;
    for output in outputs {
        if let Ok(bytes) = &output.result {
            std::fs::write(dir.join(&output.file_name), bytes)?;
            written += 1;
        }
    }
    Ok(written)
}
