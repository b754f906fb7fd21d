//! Formatting of amounts, quantities and tax rates for printing.

use std::fmt;

/// The currencies an invoice can be issued in. The currency decides how amounts are
/// printed; anything unrecognised falls back to [Currency::Jpy].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Currency {
    #[default]
    Jpy,
    Usd,
    Eur,
}

impl Currency {
    /// Parse an ISO code case-insensitively, falling back to the default currency
    pub fn from_code(code: &str) -> Currency {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Currency::Usd,
            "EUR" => Currency::Eur,
            _ => Currency::Jpy,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Jpy => "JPY",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// Digits printed after the decimal point
    pub fn fraction_digits(&self) -> u32 {
        match self {
            Currency::Jpy => 0,
            Currency::Usd | Currency::Eur => 2,
        }
    }

    /// Symbol printed in front of amounts. Currencies without one are labelled by
    /// their code elsewhere on the invoice.
    pub fn symbol(&self) -> Option<char> {
        match self {
            Currency::Jpy => Some('¥'),
            Currency::Usd | Currency::Eur => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Insert a comma every three digits from the right of a run of ASCII digits
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render an amount with thousands separators and the currency's precision.
///
/// Rounds half away from zero at the currency's last printed digit, so
/// `1234.5` yen prints as `¥1,235`. Non-finite amounts print as zero. The rounded
/// value is printed from the float itself, so amounts of any magnitude keep all
/// their integer digits.
pub fn format_money(amount: f64, currency: Currency) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let digits = currency.fraction_digits() as usize;
    let minor = (amount.abs() * 10f64.powi(digits as i32)).round();
    // at least one integer digit ahead of the fraction
    let minor_digits = format!("{:0width$.0}", minor, width = digits + 1);
    let (whole, fraction) = minor_digits.split_at(minor_digits.len() - digits);

    let mut out = String::new();
    if amount < 0.0 && minor != 0.0 {
        out.push('-');
    }
    if let Some(symbol) = currency.symbol() {
        out.push(symbol);
    }
    out.push_str(&group_thousands(whole));
    if digits > 0 {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Quantities print without a fractional part when they are whole.
pub fn format_quantity(quantity: f64) -> String {
    if !quantity.is_finite() {
        return "0".to_string();
    }
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{:.0}", quantity + 0.0)
    } else {
        format!("{quantity}")
    }
}

/// A fractional rate as a percentage, to at most two decimals: `0.1` -> `10%`.
pub fn format_rate(rate: f64) -> String {
    let rate = if rate.is_finite() { rate } else { 0.0 };
    let percent = (rate * 10_000.0).round() / 100.0 + 0.0;
    format!("{percent}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yen_rounds_half_away_from_zero_with_symbol() {
        assert_eq!(format_money(1234.5, Currency::Jpy), "¥1,235");
        assert_eq!(format_money(1234.4, Currency::Jpy), "¥1,234");
    }

    #[test]
    fn two_digit_currencies_have_no_symbol() {
        assert_eq!(format_money(1234.5, Currency::Usd), "1,234.50");
        assert_eq!(format_money(0.0, Currency::Eur), "0.00");
        assert_eq!(format_money(1_000_000.0, Currency::Eur), "1,000,000.00");
    }

    #[test]
    fn small_and_negative_amounts() {
        assert_eq!(format_money(999.0, Currency::Jpy), "¥999");
        assert_eq!(format_money(-1500.0, Currency::Jpy), "-¥1,500");
        assert_eq!(format_money(-0.001, Currency::Usd), "0.00");
        assert_eq!(format_money(f64::NAN, Currency::Usd), "0.00");
    }

    #[test]
    fn amounts_beyond_u64_keep_every_digit() {
        assert_eq!(format_money(2e19, Currency::Usd), "20,000,000,000,000,000,000.00");
        assert_eq!(format_money(3e20, Currency::Jpy), "¥300,000,000,000,000,000,000");
        assert_eq!(format_money(-2e19, Currency::Eur), "-20,000,000,000,000,000,000.00");
        // quantity times unit price, both large but valid
        assert_eq!(format_money(1e10 * 1e10, Currency::Jpy), "¥100,000,000,000,000,000,000");
    }

    #[test]
    fn grouping_handles_short_runs() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("100"), "100");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("123456789"), "123,456,789");
    }

    #[test]
    fn unknown_codes_fall_back_to_yen() {
        assert_eq!(Currency::from_code("usd"), Currency::Usd);
        assert_eq!(Currency::from_code(" EUR "), Currency::Eur);
        assert_eq!(Currency::from_code("GBP"), Currency::Jpy);
        assert_eq!(Currency::from_code(""), Currency::Jpy);
    }

    #[test]
    fn quantities_drop_zero_fractions() {
        assert_eq!(format_quantity(10.0), "10");
        assert_eq!(format_quantity(2.5), "2.5");
        assert_eq!(format_quantity(-0.0), "0");
    }

    #[test]
    fn rates_print_as_percentages() {
        assert_eq!(format_rate(0.1), "10%");
        assert_eq!(format_rate(0.08), "8%");
        assert_eq!(format_rate(0.0), "0%");
        assert_eq!(format_rate(0.085), "8.5%");
        assert_eq!(format_rate(0.29), "29%");
    }
}
