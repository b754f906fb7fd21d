//! Tax aggregation: line-item subtotals grouped by effective tax rate.

use crate::invoice::LineItem;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A tax rate usable as a map key. Rates are compared by value with a total order;
/// `-0.0` is folded into `0.0` and non-finite rates into `0.0` so that equal-looking
/// rates always land in the same bucket.
#[derive(Debug, Copy, Clone)]
pub struct TaxRate(f64);

impl TaxRate {
    pub fn new(rate: f64) -> TaxRate {
        if rate.is_finite() {
            TaxRate(rate + 0.0)
        } else {
            TaxRate(0.0)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for TaxRate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TaxRate {}

impl PartialOrd for TaxRate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaxRate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Everything taxed at one rate
#[derive(Debug, Clone, PartialEq)]
pub struct TaxBucket {
    pub rate: f64,
    pub subtotal: f64,
    pub tax: f64,
}

/// The result of aggregating an invoice's items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxSummary {
    /// One bucket per distinct effective rate, highest rate first
    pub buckets: Vec<TaxBucket>,
    pub subtotal: f64,
    pub tax: f64,
}

impl TaxSummary {
    pub fn total(&self) -> f64 {
        self.subtotal + self.tax
    }
}

/// Group item subtotals by effective rate (the item's override, else `default_rate`)
/// and compute the tax owed per rate. Buckets come out in descending rate order,
/// which is the order they are printed in.
pub fn aggregate(items: &[LineItem], default_rate: f64) -> TaxSummary {
    let mut by_rate: BTreeMap<TaxRate, f64> = BTreeMap::new();
    for item in items {
        let rate = TaxRate::new(item.effective_rate(default_rate));
        *by_rate.entry(rate).or_insert(0.0) += item.subtotal();
    }

    let mut summary = TaxSummary::default();
    for (rate, subtotal) in by_rate.into_iter().rev() {
        let tax = subtotal * rate.value();
        summary.subtotal += subtotal;
        summary.tax += tax;
        summary.buckets.push(TaxBucket {
            rate: rate.value(),
            subtotal,
            tax,
        });
    }

    log::debug!(
        "aggregated {} items into {} tax buckets",
        items.len(),
        summary.buckets.len()
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(quantity: f64, unit_price: f64, rate: Option<f64>) -> LineItem {
        LineItem {
            description: "item".to_string(),
            quantity,
            unit_price,
            tax_rate: rate,
        }
    }

    #[test]
    fn mixed_rates_are_bucketed_highest_first() {
        let items = vec![
            item(1.0, 200.0, Some(0.0)),
            item(2.0, 500.0, None),
            item(1.0, 500.0, Some(0.08)),
        ];
        let summary = aggregate(&items, 0.10);

        let rates: Vec<f64> = summary.buckets.iter().map(|b| b.rate).collect();
        assert_eq!(rates, vec![0.10, 0.08, 0.0]);
        assert_eq!(summary.subtotal, 1700.0);
        assert!((summary.tax - 140.0).abs() < 1e-9);
        assert!((summary.total() - 1840.0).abs() < 1e-9);
    }

    #[test]
    fn override_equal_to_default_shares_a_bucket() {
        let items = vec![item(1.0, 100.0, Some(0.1)), item(1.0, 100.0, None)];
        let summary = aggregate(&items, 0.1);
        assert_eq!(summary.buckets.len(), 1);
        assert_eq!(summary.buckets[0].subtotal, 200.0);
    }

    #[test]
    fn negative_zero_rate_is_zero() {
        let items = vec![item(1.0, 100.0, Some(-0.0)), item(1.0, 50.0, Some(0.0))];
        let summary = aggregate(&items, 0.1);
        assert_eq!(summary.buckets.len(), 1);
        assert_eq!(summary.buckets[0].subtotal, 150.0);
    }

    #[test]
    fn no_items_means_no_buckets_and_zero_total() {
        let summary = aggregate(&[], 0.1);
        assert!(summary.buckets.is_empty());
        assert_eq!(summary.total(), 0.0);
    }

    proptest! {
        #[test]
        fn totals_match_items_and_buckets_descend(
            raw in prop::collection::vec(
                (
                    0u32..1000,
                    0u32..100_000,
                    prop::option::of(prop::sample::select(vec![0.0, 0.05, 0.08, 0.1])),
                ),
                0..40,
            ),
            default_rate in prop::sample::select(vec![0.0, 0.08, 0.1]),
        ) {
            let items: Vec<LineItem> = raw
                .iter()
                .map(|&(q, p, r)| item(q as f64, p as f64, r))
                .collect();
            let summary = aggregate(&items, default_rate);

            let expected_subtotal: f64 = items.iter().map(|i| i.quantity * i.unit_price).sum();
            let tolerance = 1e-6 * expected_subtotal.max(1.0);
            prop_assert!((summary.subtotal - expected_subtotal).abs() <= tolerance);

            let bucket_tax: f64 = summary.buckets.iter().map(|b| b.subtotal * b.rate).sum();
            prop_assert!((summary.tax - bucket_tax).abs() <= 1e-6 * bucket_tax.max(1.0));

            for pair in summary.buckets.windows(2) {
                prop_assert!(pair[0].rate > pair[1].rate);
            }
        }
    }
}
