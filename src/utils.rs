use serde_json::Value;

/// Round a dollar amount to whole cents
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Sum amounts after rounding each to cents, so totals match the
/// line items printed in a report
pub fn sum_cents<I: IntoIterator<Item = f64>>(amounts: I) -> f64 {
    let cents = amounts
        .into_iter()
        .map(|a| (a * 100.0).round() as i128)
        .fold(0i128, i128::saturating_add);
    cents as f64 / 100.0
}

pub fn format_usd(amount: f64) -> String {
    format!("${:.2}", round_cents(amount))
}

/// Largest monthly amount accepted from a model answer
pub const MAX_AMOUNT: f64 = 1e12;

/// Read a model-supplied amount: a JSON number, or a string holding a
/// single number such as `"$1,234.50"`, `"~$1,200/month"` or `"12.5 USD"`.
///
/// Free text, ranges and non-finite or out-of-range values yield `None`.
pub fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_amount_str(s)?,
        _ => return None,
    };
    (amount.is_finite() && amount.abs() <= MAX_AMOUNT).then_some(amount)
}

fn parse_amount_str(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = s.strip_prefix('~').unwrap_or(s).trim_start();
    let s = s.strip_prefix('$').unwrap_or(s);
    let s = s.strip_suffix("/month").unwrap_or(s).trim_end();
    let s = s.strip_suffix("USD").unwrap_or(s).trim_end();

    let digits = s.strip_prefix('-').unwrap_or(s);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if let Some(frac) = frac_part {
        if !all_digits(frac) {
            return None;
        }
    }

    let mut groups = int_part.split(',');
    let first = groups.next().unwrap_or_default();
    let grouped = int_part.contains(',');
    if !all_digits(first) || (grouped && first.len() > 3) {
        return None;
    }
    if !groups.all(|g| g.len() == 3 && all_digits(g)) {
        return None;
    }

    s.replace(',', "").parse().ok()
}

/// `data_transfer` -> `Data Transfer`
pub fn title_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == ' ')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
