//! Manual amount entry.

/// Parse a user-typed amount the way a browser's `parseFloat` does, falling
/// back to zero.
///
/// Leading whitespace is skipped and the longest numeric prefix is used, so
/// `"1250.50 INR"` yields `1250.5`. Text without a numeric prefix yields
/// `0.0`, as does anything that overflows to infinity (totals are always
/// finite so they serialize as JSON numbers).
pub fn parse_amount(input: &str) -> f64 {
    let s = input.trim_start();
    let end = numeric_prefix_len(s);
    s[..end].parse::<f64>().map_or(0.0, finite_or_zero)
}

/// Replace `NaN` and the infinities with zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Length of the longest prefix shaped like `[+-]digits[.digits][e[+-]digits]`.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        if digits > 0 {
            i = j;
        }
    }

    if digits == 0 {
        return 0;
    }

    // Exponent only counts when at least one digit follows it.
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}
