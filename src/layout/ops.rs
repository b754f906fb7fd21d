//! The output of layout: pages of positioned draw instructions.

use crate::rect::Rect;
use crate::tax::TaxSummary;
use crate::{FontId, Pt};
use std::path::PathBuf;

/// Which end of a text run its anchor point is at
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Align {
    /// The run starts at `x`
    Left,
    /// The run ends at `x`
    Right,
}

/// A single line of text; `y` is the baseline
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: Pt,
    pub y: Pt,
    pub font: FontId,
    pub size: Pt,
    pub align: Align,
}

/// A straight stroked line
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rule {
    pub from: (Pt, Pt),
    pub to: (Pt, Pt),
}

/// An image file stretched into `position`
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    pub path: PathBuf,
    pub position: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text(TextRun),
    Line(Rule),
    Image(ImagePlacement),
}

/// One finished page, in drawing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub ops: Vec<DrawOp>,
}

impl LaidOutPage {
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(run) => Some(run),
            _ => None,
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Line(rule) => Some(rule),
            _ => None,
        })
    }

    /// The first text run with exactly this text
    pub fn find_text(&self, text: &str) -> Option<&TextRun> {
        self.texts().find(|run| run.text == text)
    }
}

/// A laid out invoice: at least one page, plus the tax figures printed on it
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLayout {
    pub pages: Vec<LaidOutPage>,
    pub summary: TaxSummary,
}
