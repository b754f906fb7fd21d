use super::config::LayoutConfig;
use super::ops::{Align, DrawOp, ImagePlacement, InvoiceLayout, LaidOutPage, Rule, TextRun};
use super::wrap::wrap_text;
use crate::invoice::{InvoiceRecord, LineItem, Party};
use crate::money::{format_money, format_quantity, format_rate, Currency};
use crate::rect::Rect;
use crate::tax::{aggregate, TaxSummary};
use crate::{FontId, InvoiceError, Pt, TextMeasurer};
use std::path::{Path, PathBuf};

/// header rule, below the column captions' baseline
const CAPTION_RULE_DROP: Pt = Pt(4.0);
/// first item row, below the column captions' baseline
const FIRST_ROW_DROP: Pt = Pt(18.0);
const INVOICE_NO_GAP: Pt = Pt(2.0);
const TOTALS_RULE_GAP: Pt = Pt(6.0);
const AFTER_RULE_DROP: Pt = Pt(18.0);
const NOTE_GAP: Pt = Pt(22.0);

/// Collects draw instructions into pages.
struct PageSink {
    font: FontId,
    pages: Vec<LaidOutPage>,
    current: LaidOutPage,
}

impl PageSink {
    fn new(font: FontId) -> PageSink {
        PageSink {
            font,
            pages: Vec::new(),
            current: LaidOutPage::default(),
        }
    }

    /// Empty text draws nothing
    fn text(&mut self, text: &str, x: Pt, y: Pt, size: Pt, align: Align) {
        if text.is_empty() {
            return;
        }
        self.current.ops.push(DrawOp::Text(TextRun {
            text: text.to_string(),
            x,
            y,
            font: self.font,
            size,
            align,
        }));
    }

    fn rule(&mut self, x1: Pt, x2: Pt, y: Pt) {
        self.current.ops.push(DrawOp::Line(Rule {
            from: (x1, y),
            to: (x2, y),
        }));
    }

    fn image(&mut self, path: &Path, position: Rect) {
        self.current.ops.push(DrawOp::Image(ImagePlacement {
            path: path.to_path_buf(),
            position,
        }));
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
    }

    /// 1-based number of the page being filled
    fn page_number(&self) -> usize {
        self.pages.len() + 1
    }

    fn finish(mut self) -> Vec<LaidOutPage> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Where each header column ended up
struct HeaderBottoms {
    left: Pt,
    right: Pt,
    logo: Pt,
}

/// Turns an [InvoiceRecord] into pages of draw instructions.
///
/// Layout is a pure function of the record, the configuration and the measurer:
/// nothing is drawn here and nothing outlives a call to [LayoutEngine::layout], so one
/// engine can serve any number of renders.
pub struct LayoutEngine<'a, M: TextMeasurer + ?Sized> {
    measurer: &'a M,
    config: &'a LayoutConfig,
    logo: Option<PathBuf>,
}

impl<'a, M: TextMeasurer + ?Sized> LayoutEngine<'a, M> {
    pub fn new(measurer: &'a M, config: &'a LayoutConfig) -> Self {
        LayoutEngine {
            measurer,
            config,
            logo: None,
        }
    }

    /// Reserve the top-right corner for a logo. The file is not read here; a canvas
    /// that cannot load it simply leaves the space empty.
    pub fn with_logo<P: Into<PathBuf>>(mut self, logo: Option<P>) -> Self {
        self.logo = logo.map(Into::into);
        self
    }

    pub fn layout(&self, record: &InvoiceRecord) -> Result<InvoiceLayout, InvoiceError> {
        let cfg = self.config;
        let summary = aggregate(&record.items, record.tax_rate);
        let mut sink = PageSink::new(cfg.font);

        let title = if record.title.is_empty() {
            cfg.labels.title.as_str()
        } else {
            record.title.as_str()
        };
        sink.text(title, cfg.left(), cfg.top(), cfg.title_size, Align::Left);

        let header = self.layout_header(&mut sink, record)?;
        let buyer_bottom = self.layout_buyer(&mut sink, &record.buyer, &header)?;
        let table_top = buyer_bottom.min(header.left).min(header.right) - cfg.table_gap;
        let cursor = self.layout_items(&mut sink, record, table_top)?;
        let cursor = self.layout_totals(&mut sink, record, &summary, cursor);
        self.layout_note(&mut sink, &record.note, cursor - NOTE_GAP)?;

        let pages = sink.finish();
        log::debug!(
            "laid out invoice '{}' on {} page(s)",
            record.invoice_no,
            pages.len()
        );
        Ok(InvoiceLayout { pages, summary })
    }

    fn wrap(&self, text: &str, size: Pt, width: Pt) -> Result<Vec<String>, InvoiceError> {
        wrap_text(self.measurer, text, self.config.font, size, width)
    }

    /// Wrap width for the seller and buyer blocks: the left column, less one
    /// full-width character so text never runs into the column boundary.
    fn party_width(&self) -> Result<Pt, InvoiceError> {
        let cfg = self.config;
        let wide = self
            .measurer
            .measure(cfg.wide_char.encode_utf8(&mut [0; 4]), cfg.font, cfg.text_size)?;
        Ok(cfg.min_party_width.max(cfg.column_split - wide))
    }

    /// Draw a party's lines top-down from `y`, returning the y below the last one
    fn layout_party(
        &self,
        sink: &mut PageSink,
        party: &Party,
        mut y: Pt,
    ) -> Result<Pt, InvoiceError> {
        let cfg = self.config;
        let width = self.party_width()?;
        for field in party.lines() {
            for line in self.wrap(field, cfg.text_size, width)? {
                sink.text(&line, cfg.left(), y, cfg.text_size, Align::Left);
                y -= cfg.block_line_height;
            }
        }
        Ok(y)
    }

    fn layout_header(
        &self,
        sink: &mut PageSink,
        record: &InvoiceRecord,
    ) -> Result<HeaderBottoms, InvoiceError> {
        let cfg = self.config;
        let labels = &cfg.labels;
        let y_top = cfg.top() - cfg.header_offset;
        let meta_x = cfg.left() + cfg.column_split + cfg.column_gap;

        let mut logo_bottom = y_top;
        if let Some(logo) = &self.logo {
            let x = cfg.right() - cfg.logo_size;
            let y = cfg.top() - cfg.logo_size;
            sink.image(logo, Rect::from_origin_size(x, y, cfg.logo_size, cfg.logo_size));
            logo_bottom = y;
        }

        sink.text(&labels.from, cfg.left(), y_top, cfg.heading_size, Align::Left);
        sink.text(&labels.invoice_no, meta_x, y_top, cfg.heading_size, Align::Left);

        let left = self.layout_party(sink, &record.seller, y_top - cfg.heading_gap)?;

        let meta_width = cfg.right() - meta_x;
        let mut right = y_top - cfg.heading_gap;
        if !record.invoice_no.is_empty() {
            for line in self.wrap(&record.invoice_no, cfg.heading_size, meta_width)? {
                sink.text(&line, meta_x, right, cfg.heading_size, Align::Left);
                right -= cfg.meta_value_line_height;
            }
            right -= INVOICE_NO_GAP;
        }

        let meta = [
            (&labels.date, record.date.clone()),
            (&labels.due_date, record.due_date.clone()),
            (&labels.currency, record.currency.code().to_string()),
            (&labels.tax_rate, format_rate(record.tax_rate)),
        ];
        for (label, value) in meta {
            sink.text(label, meta_x, right, cfg.text_size, Align::Left);
            right -= cfg.block_line_height;
            for line in self.wrap(&value, cfg.text_size, meta_width)? {
                sink.text(&line, meta_x, right, cfg.text_size, Align::Left);
                right -= cfg.meta_value_line_height;
            }
        }

        Ok(HeaderBottoms {
            left,
            right,
            logo: logo_bottom,
        })
    }

    fn layout_buyer(
        &self,
        sink: &mut PageSink,
        buyer: &Party,
        header: &HeaderBottoms,
    ) -> Result<Pt, InvoiceError> {
        let cfg = self.config;
        let y = header.left.min(header.right).min(header.logo) - cfg.buyer_gap;
        sink.text(&cfg.labels.bill_to, cfg.left(), y, cfg.heading_size, Align::Left);
        self.layout_party(sink, buyer, y - cfg.heading_gap)
    }

    /// Column captions and the rule under them; returns the first row's y
    fn layout_column_captions(&self, sink: &mut PageSink, y: Pt) -> Pt {
        let cfg = self.config;
        let edges = cfg.column_edges();
        for (caption, x) in cfg.labels.columns.iter().zip(edges) {
            sink.text(caption, x, y, cfg.text_size, Align::Left);
        }
        sink.rule(cfg.left(), cfg.right(), y - CAPTION_RULE_DROP);
        y - FIRST_ROW_DROP
    }

    /// Inner widths of the four table cells
    fn cell_widths(&self) -> [Pt; 4] {
        let cfg = self.config;
        let edges = cfg.column_edges();
        let padding = cfg.cell_padding + cfg.cell_padding;
        [
            edges[1] - edges[0] - padding,
            edges[2] - edges[1] - padding,
            edges[3] - edges[2] - padding,
            edges[4] - edges[3] - padding,
        ]
    }

    /// The wrapped cells of one row: description, quantity, unit price, subtotal
    fn wrap_row(
        &self,
        item: &LineItem,
        currency: Currency,
    ) -> Result<[Vec<String>; 4], InvoiceError> {
        let size = self.config.text_size;
        let widths = self.cell_widths();
        Ok([
            self.wrap(&item.description, size, widths[0])?,
            self.wrap(&format_quantity(item.quantity), size, widths[1])?,
            self.wrap(&format_money(item.unit_price, currency), size, widths[2])?,
            self.wrap(&format_money(item.subtotal(), currency), size, widths[3])?,
        ])
    }

    fn layout_items(
        &self,
        sink: &mut PageSink,
        record: &InvoiceRecord,
        table_top: Pt,
    ) -> Result<Pt, InvoiceError> {
        let cfg = self.config;
        let edges = cfg.column_edges();
        let pad = cfg.cell_padding;

        sink.text(&cfg.labels.items, cfg.left(), table_top, cfg.heading_size, Align::Left);
        let mut row_y = self.layout_column_captions(sink, table_top - cfg.heading_gap);

        for (index, item) in record.items.iter().enumerate() {
            let cells = self.wrap_row(item, record.currency)?;
            let line_count = cells.iter().map(Vec::len).max().unwrap_or(1);
            let row_height = cfg.row_line_height * line_count as f32;

            if row_y - row_height < cfg.overflow_threshold {
                sink.break_page();
                let heading_y = cfg.top() - cfg.header_offset;
                sink.text(&cfg.labels.items, cfg.left(), heading_y, cfg.heading_size, Align::Left);
                self.layout_column_captions(sink, heading_y - cfg.heading_gap);
                row_y = cfg.top() - cfg.continuation_offset;
                log::debug!("item {index} starts page {}", sink.page_number());
            }

            let anchors = [
                (edges[0] + pad, Align::Left),
                (edges[2] - pad, Align::Right),
                (edges[3] - pad, Align::Right),
                (edges[4] - pad, Align::Right),
            ];
            for (lines, (x, align)) in cells.iter().zip(anchors) {
                let mut y = row_y;
                for line in lines {
                    sink.text(line, x, y, cfg.text_size, align);
                    y -= cfg.row_line_height;
                }
            }

            row_y -= row_height;
        }

        Ok(row_y)
    }

    /// Rate breakdown, subtotal and total. The block is kept in one piece: if it
    /// would run past the bottom margin it starts a new page. A block taller than a
    /// whole page breaks between rate pairs, never inside one.
    fn layout_totals(
        &self,
        sink: &mut PageSink,
        record: &InvoiceRecord,
        summary: &TaxSummary,
        mut y: Pt,
    ) -> Pt {
        let cfg = self.config;
        let labels = &cfg.labels;
        let edges = cfg.column_edges();
        let label_x = edges[3] - cfg.totals_label_offset;
        let value_x = edges[4] - cfg.totals_value_inset;
        let money = |amount: f64| format_money(amount, record.currency);

        let pair_height = cfg.totals_line_height * 2.0;
        let tail_height = AFTER_RULE_DROP + cfg.totals_line_height;
        let block_height = TOTALS_RULE_GAP
            + AFTER_RULE_DROP
            + pair_height * summary.buckets.len() as f32
            + tail_height;
        if y - block_height < cfg.margins.bottom {
            sink.break_page();
            y = cfg.top();
            log::debug!("totals moved to page {}", sink.page_number());
        }

        y -= TOTALS_RULE_GAP;
        sink.rule(cfg.left(), cfg.right(), y);
        y -= AFTER_RULE_DROP;

        for bucket in &summary.buckets {
            if y - pair_height < cfg.margins.bottom {
                sink.break_page();
                y = cfg.top();
                log::debug!("rate breakdown continues on page {}", sink.page_number());
            }
            sink.text(
                &labels.rate_subtotal(bucket.rate),
                label_x,
                y,
                cfg.text_size,
                Align::Right,
            );
            sink.text(&money(bucket.subtotal), value_x, y, cfg.text_size, Align::Right);
            y -= cfg.totals_line_height;
            sink.text(&labels.rate_tax(bucket.rate), label_x, y, cfg.text_size, Align::Right);
            sink.text(&money(bucket.tax), value_x, y, cfg.text_size, Align::Right);
            y -= cfg.totals_line_height;
        }

        if y - tail_height < cfg.margins.bottom {
            sink.break_page();
            y = cfg.top();
        }
        sink.rule(cfg.left(), cfg.right(), y);
        y -= AFTER_RULE_DROP;
        sink.text(&labels.subtotal, label_x, y, cfg.text_size, Align::Right);
        sink.text(&money(summary.subtotal), value_x, y, cfg.text_size, Align::Right);
        y -= cfg.totals_line_height;

        sink.text(&labels.total, label_x, y, cfg.total_size, Align::Right);
        sink.text(&money(summary.total()), value_x, y, cfg.total_size, Align::Right);
        y
    }

    /// The note runs across the full content width and continues on bare pages
    fn layout_note(&self, sink: &mut PageSink, note: &str, mut y: Pt) -> Result<(), InvoiceError> {
        let cfg = self.config;
        if note.is_empty() {
            return Ok(());
        }

        let width = cfg.right() - cfg.left();
        for paragraph in note.lines() {
            for line in self.wrap(paragraph, cfg.note_size, width)? {
                if y < cfg.note_bottom {
                    sink.break_page();
                    y = cfg.top();
                }
                sink.text(&line, cfg.left(), y, cfg.note_size, Align::Left);
                y -= cfg.note_line_height;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FixedAdvance, RejectChar};

    fn close(a: Pt, b: Pt) -> bool {
        (a.0 - b.0).abs() < 1e-3
    }

    fn item(description: &str, quantity: f64, unit_price: f64, tax_rate: Option<f64>) -> LineItem {
        LineItem {
            description: description.to_string(),
            quantity,
            unit_price,
            tax_rate,
        }
    }

    fn record(items: Vec<LineItem>) -> InvoiceRecord {
        InvoiceRecord {
            invoice_no: "INV-2025-001".into(),
            date: "2025-01-31".into(),
            due_date: "2025-02-28".into(),
            currency: Currency::Jpy,
            tax_rate: 0.1,
            items,
            ..Default::default()
        }
    }

    fn layout(config: &LayoutConfig, record: &InvoiceRecord) -> InvoiceLayout {
        LayoutEngine::new(&FixedAdvance, config).layout(record).unwrap()
    }

    fn all_texts(layout: &InvoiceLayout) -> Vec<(usize, &TextRun)> {
        layout
            .pages
            .iter()
            .enumerate()
            .flat_map(|(i, page)| page.texts().map(move |run| (i, run)))
            .collect()
    }

    #[test]
    fn empty_invoice_is_one_complete_page() {
        let config = LayoutConfig::default();
        let out = layout(&config, &record(Vec::new()));

        assert_eq!(out.pages.len(), 1);
        let page = &out.pages[0];
        assert!(page.find_text("請求書 / INVOICE").is_some());
        assert!(page.find_text("明細 / Items").is_some());
        assert!(page.find_text("内容 / Description").is_some());
        assert!(page.find_text("対象小計（10%）").is_none());
        let total = page
            .texts()
            .find(|run| run.text == "¥0" && run.size == config.total_size)
            .unwrap();
        assert_eq!(total.align, Align::Right);
        assert_eq!(out.summary.total(), 0.0);
        // caption rule, totals rule, rule above the subtotal
        assert_eq!(page.rules().count(), 3);
    }

    #[test]
    fn row_height_follows_the_tallest_cell() {
        let config = LayoutConfig::default();
        // 48 ascii characters fit the description cell, so 100 need three lines
        let long = "a".repeat(100);
        let items = vec![item(&long, 1.0, 100.0, None), item("next", 1.0, 100.0, None)];
        let out = layout(&config, &record(items));
        let page = &out.pages[0];

        let first = page.find_text(&"a".repeat(48)).unwrap();
        let next = page.find_text("next").unwrap();
        assert!(close(first.y - next.y, config.row_line_height * 3.0));
        assert!(page.find_text("aaaa").is_some());
    }

    #[test]
    fn numeric_cells_are_right_aligned_at_the_column_end() {
        let config = LayoutConfig::default();
        let out = layout(&config, &record(vec![item("Design", 10.0, 5000.0, None)]));
        let page = &out.pages[0];
        let edges = config.column_edges();

        let qty = page.find_text("10").unwrap();
        assert_eq!(qty.align, Align::Right);
        assert_eq!(qty.x, edges[2] - config.cell_padding);
        let unit = page.find_text("¥5,000").unwrap();
        assert_eq!(unit.x, edges[3] - config.cell_padding);
        let description = page.find_text("Design").unwrap();
        assert_eq!(description.align, Align::Left);
        assert_eq!(description.x, edges[0] + config.cell_padding);
        assert_eq!(description.y, qty.y);
    }

    #[test]
    fn overflowing_row_moves_to_a_new_page_whole() {
        let config = LayoutConfig::default();
        let items: Vec<LineItem> = (0..60)
            .map(|i| item(&format!("item-{i:02}"), 1.0, 10.0, None))
            .collect();
        let out = layout(&config, &record(items));
        assert_eq!(out.pages.len(), 2);

        let placed: Vec<(usize, &TextRun)> = all_texts(&out)
            .into_iter()
            .filter(|(_, run)| run.text.starts_with("item-"))
            .collect();
        assert_eq!(placed.len(), 60);

        let split = placed.iter().position(|(page, _)| *page == 1).unwrap();
        assert!(placed[split..].iter().all(|(page, _)| *page == 1));

        let last_on_first = placed[split - 1].1;
        let first_on_second = placed[split].1;
        assert!(last_on_first.y - config.row_line_height >= config.overflow_threshold);
        assert!(last_on_first.y - config.row_line_height * 2.0 < config.overflow_threshold);
        assert!(close(first_on_second.y, config.top() - config.continuation_offset));

        let second = &out.pages[1];
        let heading = second.find_text("明細 / Items").unwrap();
        assert!(close(heading.y, config.top() - config.header_offset));
        assert!(second.find_text("数量 / Qty").is_some());
        assert!(second.find_text("請求元 / From").is_none());
    }

    #[test]
    fn wrapped_rows_never_straddle_pages() {
        let config = LayoutConfig::default();
        let items: Vec<LineItem> = (0..30)
            .map(|_| item(&"b".repeat(100), 1.0, 1.0, None))
            .collect();
        let out = layout(&config, &record(items));
        assert!(out.pages.len() > 1);

        let desc_x = config.column_edges()[0] + config.cell_padding;
        for page in &out.pages {
            let lines = page
                .texts()
                .filter(|run| run.x == desc_x && run.text.starts_with('b'))
                .count();
            assert_eq!(lines % 3, 0);
        }
    }

    #[test]
    fn totals_list_rates_highest_first() {
        let config = LayoutConfig::default();
        let out = layout(
            &config,
            &record(vec![
                item("exempt", 1.0, 200.0, Some(0.0)),
                item("standard", 1.0, 1000.0, None),
                item("reduced", 1.0, 500.0, Some(0.08)),
            ]),
        );
        let page = &out.pages[0];

        let ten = page.find_text("対象小計（10%）").unwrap();
        let eight = page.find_text("対象小計（8%）").unwrap();
        let zero = page.find_text("対象小計（0%）").unwrap();
        assert!(ten.y > eight.y && eight.y > zero.y);
        let ten_tax = page.find_text("消費税（10%）").unwrap();
        assert!(close(ten_tax.y, ten.y - config.totals_line_height));

        assert_eq!(out.summary.subtotal, 1700.0);
        assert!(page.find_text("¥1,700").is_some());
        let total = page.find_text("¥1,840").unwrap();
        assert_eq!(total.align, Align::Right);
        assert!(close(total.x, config.right() - config.totals_value_inset));
    }

    #[test]
    fn party_text_wraps_one_wide_character_short_of_the_column() {
        let config = LayoutConfig::default();
        let mut invoice = record(Vec::new());
        // 10pt per character; the column holds 25, the narrowed width 24
        invoice.seller.name = "株".repeat(30);
        let out = layout(&config, &invoice);

        let page = &out.pages[0];
        let first = page.find_text(&"株".repeat(24)).unwrap();
        let second = page.find_text(&"株".repeat(6)).unwrap();
        assert!(close(first.y - second.y, config.block_line_height));
    }

    #[test]
    fn buyer_sits_below_the_lowest_header_column() {
        let config = LayoutConfig::default();
        let mut invoice = record(Vec::new());
        invoice.seller.address = "x".repeat(800);
        let out = layout(&config, &invoice);
        let page = &out.pages[0];

        let lowest_seller_line = page
            .texts()
            .filter(|run| run.text.starts_with('x'))
            .map(|run| run.y)
            .fold(Pt(f32::MAX), Pt::min);
        let bill_to = page.find_text("請求先 / Bill To").unwrap();
        assert!(close(bill_to.y, lowest_seller_line - config.block_line_height - config.buyer_gap));
    }

    #[test]
    fn logo_is_placed_top_right_and_pushes_the_buyer_down() {
        let config = LayoutConfig {
            logo_size: Pt(200.0),
            ..LayoutConfig::default()
        };
        let out = LayoutEngine::new(&FixedAdvance, &config)
            .with_logo(Some("static/logo.png"))
            .layout(&record(Vec::new()))
            .unwrap();
        let page = &out.pages[0];

        let placement = page
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Image(image) => Some(image),
                _ => None,
            })
            .unwrap();
        assert!(close(placement.position.x2, config.right()));
        assert!(close(placement.position.y2, config.top()));

        let bill_to = page.find_text("請求先 / Bill To").unwrap();
        assert!(close(bill_to.y, config.top() - Pt(200.0) - config.buyer_gap));
    }

    #[test]
    fn no_logo_means_no_image() {
        let out = layout(&LayoutConfig::default(), &record(Vec::new()));
        assert!(!out.pages[0].ops.iter().any(|op| matches!(op, DrawOp::Image(_))));
    }

    #[test]
    fn long_notes_continue_on_bare_pages() {
        let config = LayoutConfig::default();
        let mut invoice = record(Vec::new());
        // 109 ascii characters per line at 9pt, so 200 lines of note
        invoice.note = "n".repeat(109 * 200);
        let out = layout(&config, &invoice);
        assert!(out.pages.len() >= 3);

        let note_lines: Vec<(usize, &TextRun)> = all_texts(&out)
            .into_iter()
            .filter(|(_, run)| run.text.starts_with('n'))
            .collect();
        assert_eq!(note_lines.len(), 200);
        assert!(note_lines.iter().all(|(_, run)| run.y >= config.note_bottom));

        let second = &out.pages[1];
        assert!(second.find_text("明細 / Items").is_none());
        assert!(close(second.texts().next().unwrap().y, config.top()));
    }

    #[test]
    fn note_paragraphs_wrap_separately() {
        let config = LayoutConfig::default();
        let mut invoice = record(Vec::new());
        invoice.note = "Thank you.\nPayment by transfer.".into();
        let out = layout(&config, &invoice);
        let page = &out.pages[0];

        let first = page.find_text("Thank you.").unwrap();
        let second = page.find_text("Payment by transfer.").unwrap();
        assert_eq!(first.size, config.note_size);
        assert!(close(first.y - second.y, config.note_line_height));
    }

    #[test]
    fn totals_keep_together_on_a_new_page() {
        let config = LayoutConfig::default();
        // every item at its own rate: the totals block is taller than what is left
        let items: Vec<LineItem> = (0..12)
            .map(|i| item(&format!("rate-{i}"), 1.0, 100.0, Some(i as f64 / 100.0)))
            .collect();
        let out = layout(&config, &record(items));

        let last = out.pages.last().unwrap();
        let rule_ys: Vec<Pt> = last.rules().map(|rule| rule.from.1).collect();
        assert!(close(rule_ys[0], config.top() - TOTALS_RULE_GAP));
        assert!(last.find_text("合計 / Total").is_some());
        assert!(last.texts().all(|run| !run.text.starts_with("rate-")));
    }

    #[test]
    fn oversized_totals_break_between_rate_pairs() {
        let config = LayoutConfig::default();
        // 80 rates need more than a page of totals
        let items: Vec<LineItem> = (0..80)
            .map(|i| item(&format!("rate-{i}"), 1.0, 100.0, Some(i as f64 / 1000.0)))
            .collect();
        let out = layout(&config, &record(items));
        assert_eq!(out.summary.buckets.len(), 80);

        let texts = all_texts(&out);
        assert!(texts.iter().all(|(_, run)| run.y >= config.margins.bottom));

        for bucket in &out.summary.buckets {
            let (subtotal_page, _) = texts
                .iter()
                .find(|(_, run)| run.text == config.labels.rate_subtotal(bucket.rate))
                .unwrap();
            let (tax_page, _) = texts
                .iter()
                .find(|(_, run)| run.text == config.labels.rate_tax(bucket.rate))
                .unwrap();
            assert_eq!(subtotal_page, tax_page);
        }

        let last = out.pages.last().unwrap();
        assert!(last.find_text("合計 / Total").is_some());
    }

    #[test]
    fn measurement_failures_abort_the_layout() {
        let config = LayoutConfig::default();
        let invoice = record(vec![item("bad ☃ glyph", 1.0, 1.0, None)]);
        let result = LayoutEngine::new(&RejectChar('☃'), &config).layout(&invoice);
        assert!(matches!(result, Err(InvoiceError::MissingGlyph { ch: '☃', .. })));
    }

    #[test]
    fn layout_is_deterministic() {
        let config = LayoutConfig::default();
        let invoice = record(vec![item("Design", 3.0, 1200.0, None)]);
        assert_eq!(layout(&config, &invoice), layout(&config, &invoice));
    }
}
