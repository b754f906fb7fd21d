//! The invoice record a single render consumes.
//!
//! Intake is permissive: numeric fields accept numbers or numeric strings and
//! anything unusable becomes `0.0`, optional text becomes empty, and an unknown
//! currency becomes the default one. A record that deserializes is always
//! renderable.

use crate::money::Currency;
use crate::InvoiceError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Name and contact block for the seller or the buyer. Empty fields are not printed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Party {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

impl Party {
    /// The non-empty fields, in print order
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        [&self.name, &self.address, &self.phone, &self.email]
            .into_iter()
            .map(String::as_str)
            .filter(|line| !line.is_empty())
    }
}

/// One billed line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Overrides the invoice's default rate when present
    pub tax_rate: Option<f64>,
}

impl LineItem {
    pub fn subtotal(&self) -> f64 {
        self.quantity * self.unit_price
    }

    pub fn effective_rate(&self, default_rate: f64) -> f64 {
        self.tax_rate.unwrap_or(default_rate)
    }
}

/// Everything printed on one invoice
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InvoiceRecord {
    /// Printed as the document title; the configured default title is used when empty
    pub title: String,
    #[serde(alias = "invoice_number")]
    pub invoice_no: String,
    pub date: String,
    pub due_date: String,
    #[serde(deserialize_with = "de_currency")]
    pub currency: Currency,
    /// Default tax rate as a fraction, e.g. `0.1`
    #[serde(deserialize_with = "de_amount")]
    pub tax_rate: f64,
    pub note: String,
    pub seller: Party,
    pub buyer: Party,
    #[serde(deserialize_with = "de_items")]
    pub items: Vec<LineItem>,
}

impl InvoiceRecord {
    pub fn from_json(json: &str) -> Result<InvoiceRecord, InvoiceError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Read either a single record or an array of records
pub fn records_from_json(json: &str) -> Result<Vec<InvoiceRecord>, InvoiceError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<InvoiceRecord>),
        One(Box<InvoiceRecord>),
    }

    Ok(match serde_json::from_str(json)? {
        OneOrMany::Many(records) => records,
        OneOrMany::One(record) => vec![*record],
    })
}

/// Parse a non-negative amount, coercing anything else to `0.0`
pub fn parse_amount(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

/// Parse an optional rate; blank or unparsable text means "no override"
pub fn parse_rate(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn coerce_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(0.0),
        Value::String(s) => parse_amount(s),
        _ => 0.0,
    }
}

fn coerce_rate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_rate(s),
        _ => None,
    }
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse the compact item list used by spreadsheet exports:
/// `description|quantity|unit price|rate` entries separated by `;`, the rate being
/// optional. Entries with fewer than three fields are skipped.
pub fn parse_compact_items(text: &str) -> Vec<LineItem> {
    text.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let segments: Vec<&str> = part.split('|').map(str::trim).collect();
            if segments.len() < 3 {
                return None;
            }
            Some(LineItem {
                description: segments[0].to_string(),
                quantity: parse_amount(segments[1]),
                unit_price: parse_amount(segments[2]),
                tax_rate: segments.get(3).and_then(|rate| parse_rate(rate)),
            })
        })
        .collect()
}

fn item_from_value(value: &Value) -> Option<LineItem> {
    match value {
        Value::Object(fields) => {
            let field = |names: &[&str]| names.iter().find_map(|name| fields.get(*name));
            Some(LineItem {
                description: field(&["description", "desc"])
                    .map(coerce_text)
                    .unwrap_or_default(),
                quantity: field(&["quantity", "qty"])
                    .map(coerce_amount)
                    .unwrap_or(0.0),
                unit_price: field(&["unit_price", "unit", "price"])
                    .map(coerce_amount)
                    .unwrap_or(0.0),
                tax_rate: field(&["tax_rate", "rate"]).and_then(coerce_rate),
            })
        }
        Value::Array(values) if !values.is_empty() => Some(LineItem {
            description: coerce_text(&values[0]),
            quantity: values.get(1).map(coerce_amount).unwrap_or(0.0),
            unit_price: values.get(2).map(coerce_amount).unwrap_or(0.0),
            tax_rate: values.get(3).and_then(coerce_rate),
        }),
        _ => None,
    }
}

fn de_items<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<LineItem>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values.iter().filter_map(item_from_value).collect(),
        Value::String(compact) => parse_compact_items(&compact),
        _ => Vec::new(),
    })
}

fn de_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(coerce_amount(&Value::deserialize(deserializer)?))
}

fn de_currency<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Currency, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(code) => Currency::from_code(&code),
        _ => Currency::default(),
    })
}
