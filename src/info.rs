use crate::refs::{ObjectReferences, RefType};
use crate::InvoiceRecord;
use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use pdf_writer::{Date as PDate, Pdf, TextStr};

/// What the PDF info dictionary says about an invoice
#[derive(Debug, Clone)]
pub struct Info {
    pub title: String,
    /// Written as the document subject
    pub invoice_no: Option<String>,
    /// The seller, written as the document author
    pub issuer: Option<String>,
    pub created: DateTime<FixedOffset>,
}

impl Info {
    /// Describe `record`, falling back to `default_title` when it has no title.
    /// `created` is taken as given, so the same inputs always give the same bytes.
    pub fn for_invoice(
        record: &InvoiceRecord,
        default_title: &str,
        created: DateTime<FixedOffset>,
    ) -> Info {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Info {
            title: non_empty(&record.title).unwrap_or_else(|| default_title.to_string()),
            invoice_no: non_empty(&record.invoice_no),
            issuer: non_empty(&record.seller.name),
            created,
        }
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, writer: &mut Pdf) {
        let id = refs.gen(RefType::Info);
        let mut info = writer.document_info(id);

        info.title(TextStr(&self.title));
        if let Some(invoice_no) = &self.invoice_no {
            info.subject(TextStr(invoice_no));
        }
        if let Some(issuer) = &self.issuer {
            info.author(TextStr(issuer));
        }
        info.creator(TextStr(concat!(
            env!("CARGO_PKG_NAME"),
            " v",
            env!("CARGO_PKG_VERSION")
        )));
        info.creation_date(pdf_date(self.created));
    }
}

/// A PDF date with its UTC offset split into signed hours and unsigned minutes
fn pdf_date(at: DateTime<FixedOffset>) -> PDate {
    let offset = at.offset().local_minus_utc();
    let hours = offset / 3600;
    let minutes = ((offset % 3600) / 60).abs();
    PDate::new(at.year() as u16)
        .month(at.month() as u8)
        .day(at.day() as u8)
        .hour(at.hour() as u8)
        .minute(at.minute() as u8)
        .second(at.second() as u8)
        .utc_offset_hour(hours as i8)
        .utc_offset_minute(minutes as u8)
}
