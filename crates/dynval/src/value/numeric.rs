//! Numeric-string grammar and canonical number formatting
//!
//! ```text
//! WS* [+-]? ( DIGITS ( '.' DIGITS* )? | '.' DIGITS ) ( [eE] [+-]? DIGITS )? WS*
//! ```
//!
//! A whole string matching the grammar is numeric. The prefix parser used
//! by string-to-number coercion accepts the longest matching prefix and
//! ignores whatever follows.

/// Significant digits used when formatting doubles.
const DOUBLE_PRECISION: i32 = 14;

/// A parsed number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    /// Integer form that fits in 64 bits
    Int(i64),
    /// Anything with a fraction or exponent, or an overflowing integer
    Double(f64),
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Scan the numeric grammar starting at the beginning of `bytes`.
///
/// Returns the parsed number, the index one past it, and whether the
/// integer form overflowed. `None` if no digits were found.
fn scan(bytes: &[u8]) -> Option<(Numeric, usize, bool)> {
    let mut i = 0;
    while i < bytes.len() && is_space(bytes[i]) {
        i += 1;
    }
    let start = i;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut is_double = false;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if int_digits > 0 || j > frac_start {
            is_double = true;
            i = j;
        }
    }
    if int_digits == 0 && !is_double {
        return None;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            is_double = true;
            i = j;
        }
    }

    // The scanned range is pure ASCII.
    let text = std::str::from_utf8(&bytes[start..i]).ok()?;
    if !is_double {
        if let Ok(n) = text.parse::<i64>() {
            return Some((Numeric::Int(n), i, false));
        }
    }
    let d = text.parse::<f64>().ok()?;
    Some((Numeric::Double(d), i, !is_double))
}

/// Classify a whole string. Trailing whitespace is allowed.
pub(crate) fn classify(bytes: &[u8]) -> Option<Numeric> {
    let (n, end, _) = scan(bytes)?;
    if bytes[end..].iter().all(|&b| is_space(b)) {
        Some(n)
    } else {
        None
    }
}

/// Parse the longest numeric prefix; non-numeric input yields `Int(0)`.
///
/// An integer-form prefix that overflows saturates to the i64 bounds
/// rather than becoming a double.
pub(crate) fn parse_prefix_int(bytes: &[u8]) -> i64 {
    match scan(bytes) {
        Some((Numeric::Int(n), _, _)) => n,
        Some((Numeric::Double(d), _, true)) => {
            if d.is_sign_negative() {
                i64::MIN
            } else {
                i64::MAX
            }
        }
        Some((Numeric::Double(d), _, false)) => double_to_int(d),
        None => 0,
    }
}

/// Parse the longest numeric prefix as a double; non-numeric yields 0.0.
pub(crate) fn parse_prefix_double(bytes: &[u8]) -> f64 {
    match scan(bytes) {
        Some((Numeric::Int(n), _, _)) => n as f64,
        Some((Numeric::Double(d), _, _)) => d,
        None => 0.0,
    }
}

/// Truncate toward zero. NaN, infinities and values outside the i64
/// range become 0.
pub(crate) fn double_to_int(d: f64) -> i64 {
    // 2^63 is exactly representable; anything at or beyond it overflows.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if !d.is_finite() || d >= LIMIT || d < -LIMIT {
        0
    } else {
        d as i64
    }
}

/// Canonical text for a double: 14 significant digits, `%G` style.
pub(crate) fn format_double(d: f64) -> String {
    if d.is_nan() {
        return "NAN".to_string();
    }
    if d.is_infinite() {
        return if d > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if d == 0.0 {
        return if d.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rust renders this as "-1.2340000000000e5".
    let sci = format!("{:.*e}", (DOUBLE_PRECISION - 1) as usize, d);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if d < 0.0 { "-" } else { "" };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let digits = digits.trim_end_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };

    if exp < -4 || exp >= DOUBLE_PRECISION {
        let (lead, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{sign}{lead}.{rest}E{exp_sign}{}", exp.abs())
    } else if exp >= 0 {
        let whole = exp as usize + 1;
        if digits.len() <= whole {
            format!("{sign}{digits}{}", "0".repeat(whole - digits.len()))
        } else {
            format!("{sign}{}.{}", &digits[..whole], &digits[whole..])
        }
    } else {
        let zeros = "0".repeat((-exp - 1) as usize);
        format!("{sign}0.{zeros}{digits}")
    }
}
