//! Number presentation rules shared by the game modes.

/// Group the integer part with `,` and keep at most three fraction digits,
/// dropping trailing zeros. `1234567.0` → `1,234,567`, `0.44` → `0.44`.
pub fn group_thousands(value: f64) -> String {
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3 + frac.len() + 2);
    let is_zero = int_part == "0" && frac.is_empty();
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Dollar amounts scaled to trillion / billion / million with two decimals.
pub fn format_usd(value: f64) -> String {
    const TRILLION: f64 = 1_000_000_000_000.0;
    const BILLION: f64 = 1_000_000_000.0;
    const MILLION: f64 = 1_000_000.0;

    if value >= TRILLION {
        format!("${:.2} trillion", value / TRILLION)
    } else if value >= BILLION {
        format!("${:.2} billion", value / BILLION)
    } else if value >= MILLION {
        format!("${:.2} million", value / MILLION)
    } else {
        format!("${}", group_thousands(value))
    }
}
