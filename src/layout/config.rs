use crate::layout::Margins;
use crate::money::format_rate;
use crate::pagesize::{self, PageSize};
use crate::{FontId, Mm, Pt};

/// Every caption printed on the invoice. The defaults are bilingual
/// Japanese / English.
#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    /// Used when the record has no title of its own
    pub title: String,
    pub from: String,
    pub invoice_no: String,
    pub bill_to: String,
    pub date: String,
    pub due_date: String,
    pub currency: String,
    pub tax_rate: String,
    pub items: String,
    /// Description, quantity, unit price, subtotal
    pub columns: [String; 4],
    /// `{rate}` is replaced by the formatted rate, e.g. `10%`
    pub rate_subtotal: String,
    /// `{rate}` is replaced by the formatted rate, e.g. `10%`
    pub rate_tax: String,
    pub subtotal: String,
    pub total: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            title: "請求書 / INVOICE".into(),
            from: "請求元 / From".into(),
            invoice_no: "請求書番号 / Invoice No.".into(),
            bill_to: "請求先 / Bill To".into(),
            date: "請求日 / Date".into(),
            due_date: "支払期日 / Due Date".into(),
            currency: "通貨 / Currency".into(),
            tax_rate: "税率 / Tax Rate".into(),
            items: "明細 / Items".into(),
            columns: [
                "内容 / Description".into(),
                "数量 / Qty".into(),
                "単価 / Unit".into(),
                "小計 / Subtotal".into(),
            ],
            rate_subtotal: "対象小計（{rate}）".into(),
            rate_tax: "消費税（{rate}）".into(),
            subtotal: "小計 / Subtotal".into(),
            total: "合計 / Total".into(),
        }
    }
}

impl Labels {
    pub fn rate_subtotal(&self, rate: f64) -> String {
        self.rate_subtotal.replace("{rate}", &format_rate(rate))
    }

    pub fn rate_tax(&self, rate: f64) -> String {
        self.rate_tax.replace("{rate}", &format_rate(rate))
    }
}

/// Page geometry, type sizes and spacing for the invoice layout.
///
/// Vertical offsets are distances in points; the engine works in PDF user space
/// where `y` grows upwards, so "below" means subtracting.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub page_size: PageSize,
    pub margins: Margins,
    /// The font every run of text is set in
    pub font: FontId,

    pub title_size: Pt,
    pub text_size: Pt,
    pub heading_size: Pt,
    pub total_size: Pt,
    pub note_size: Pt,

    /// Distance from the top margin to the header headings. Continuation pages
    /// put the items heading at the same offset.
    pub header_offset: Pt,
    /// Distance from a heading's baseline to the first line under it
    pub heading_gap: Pt,
    /// Left column / right column boundary, measured from the left margin
    pub column_split: Pt,
    /// Gap between the column boundary and the right column's text
    pub column_gap: Pt,
    /// Lower bound on the left column's wrap width
    pub min_party_width: Pt,
    /// Measured to narrow the left column so text never touches the boundary
    pub wide_char: char,
    /// Side of the square reserved for a logo in the top-right corner
    pub logo_size: Pt,
    pub block_line_height: Pt,
    pub meta_value_line_height: Pt,
    /// Space between the header columns and the bill-to heading
    pub buyer_gap: Pt,
    /// Space between the header blocks and the items heading
    pub table_gap: Pt,

    /// Column starts, measured from the left margin. The last column ends at the
    /// right margin.
    pub table_columns: [Pt; 4],
    pub cell_padding: Pt,
    pub row_line_height: Pt,
    /// A row may not extend below this height above the page bottom
    pub overflow_threshold: Pt,
    /// Distance from the top margin to the first row on a continuation page
    pub continuation_offset: Pt,

    /// Right edge of total labels, measured left from the subtotal column start
    pub totals_label_offset: Pt,
    /// Right edge of total values, measured left from the right margin
    pub totals_value_inset: Pt,
    pub totals_line_height: Pt,

    /// A note line may not start below this height above the page bottom
    pub note_bottom: Pt,
    pub note_line_height: Pt,

    pub labels: Labels,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            page_size: pagesize::A4,
            margins: Margins::all(Mm(18.0)),
            font: FontId(0),
            title_size: Pt(18.0),
            text_size: Pt(10.0),
            heading_size: Pt(11.0),
            total_size: Pt(12.0),
            note_size: Pt(9.0),
            header_offset: Mm(12.0).into(),
            heading_gap: Pt(16.0),
            column_split: Mm(90.0).into(),
            column_gap: Mm(6.0).into(),
            min_party_width: Mm(40.0).into(),
            wide_char: 'あ',
            logo_size: Mm(24.0).into(),
            block_line_height: Pt(12.0),
            meta_value_line_height: Pt(14.0),
            buyer_gap: Mm(10.0).into(),
            table_gap: Mm(8.0).into(),
            table_columns: [
                Pt(0.0),
                Mm(90.0).into(),
                Mm(120.0).into(),
                Mm(145.0).into(),
            ],
            cell_padding: Mm(2.0).into(),
            row_line_height: Pt(14.0),
            overflow_threshold: Mm(40.0).into(),
            continuation_offset: Mm(40.0).into(),
            totals_label_offset: Mm(30.0).into(),
            totals_value_inset: Pt(4.0),
            totals_line_height: Pt(14.0),
            note_bottom: Mm(24.0).into(),
            note_line_height: Pt(12.0),
            labels: Labels::default(),
        }
    }
}

impl LayoutConfig {
    pub fn page_width(&self) -> Pt {
        self.page_size.0
    }

    pub fn page_height(&self) -> Pt {
        self.page_size.1
    }

    /// x of the left margin
    pub fn left(&self) -> Pt {
        self.margins.left
    }

    /// x of the right margin
    pub fn right(&self) -> Pt {
        self.page_width() - self.margins.right
    }

    /// y of the top margin
    pub fn top(&self) -> Pt {
        self.page_height() - self.margins.top
    }

    /// Absolute x of every table column edge, left to right
    pub fn column_edges(&self) -> [Pt; 5] {
        let left = self.left();
        [
            left + self.table_columns[0],
            left + self.table_columns[1],
            left + self.table_columns[2],
            left + self.table_columns[3],
            self.right(),
        ]
    }
}
