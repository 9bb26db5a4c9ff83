use super::currency::Currency;

/// Group separator used by the uk-UA locale (no-break space).
const GROUP_SEPARATOR: char = '\u{a0}';

/// Format an amount the way the uk-UA locale displays currency:
/// `1234.5` → `"1 234,50 ₴"`.
///
/// At least `min(2, max_fraction_digits)` and at most `max_fraction_digits`
/// fraction digits are shown; extra trailing zeros are trimmed.
pub fn format_currency(amount: f64, currency: Currency, max_fraction_digits: usize) -> String {
    let min_fraction_digits = max_fraction_digits.min(2);
    let formatted = format!("{:.*}", max_fraction_digits, amount.abs());

    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, f),
        None => (formatted.as_str(), ""),
    };

    let mut frac = frac_part.to_string();
    while frac.len() > min_fraction_digits && frac.ends_with('0') {
        frac.pop();
    }

    let mut out = String::new();
    let is_zero = int_part.chars().all(|c| c == '0') && frac.chars().all(|c| c == '0');
    if amount < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac.is_empty() {
        out.push(',');
        out.push_str(&frac);
    }
    out.push(GROUP_SEPARATOR);
    out.push_str(currency.symbol());
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    out
}
