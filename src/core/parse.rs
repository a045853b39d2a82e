//! Lenient leading-number parsing shared by the record store and the tagged array.
//!
//! Both parsers read the longest numeric prefix of the input and ignore whatever
//! follows it, so `"12abc"` reads as `12` and `"abc"` reads as zero. Leading
//! whitespace and a single sign character are accepted.

/// Parses a leading base-10 integer, saturating at the `i64` bounds.
///
/// # Examples
/// ```
/// use voxel_core::core::parse::leading_int;
///
/// assert_eq!(leading_int("  -42 blocks"), -42);
/// assert_eq!(leading_int("grass"), 0);
/// ```
pub fn leading_int(text: &str) -> i64 {
    let bytes = text.trim_start().as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    let mut value: i64 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        let digit = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

/// Parses a leading floating-point literal.
///
/// Accepts an optional sign, digits with an optional fractional part, and an
/// optional exponent that is only consumed when at least one exponent digit
/// follows. `inf`, `infinity` and `nan` are recognised case-insensitively.
pub fn leading_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let end = float_prefix_len(trimmed);
    if end == 0 {
        return 0.0;
    }
    trimmed[..end].parse::<f64>().unwrap_or(0.0)
}

fn float_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    for word in ["infinity", "inf", "nan"] {
        let rest = &bytes[i..];
        if rest.len() >= word.len() && rest[..word.len()].eq_ignore_ascii_case(word.as_bytes()) {
            return i + word.len();
        }
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        mantissa_digits += j - frac_start;
        if mantissa_digits > 0 {
            i = j;
        }
    }

    if mantissa_digits == 0 {
        return 0;
    }

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_prefix_ignores_trailing_garbage() {
        assert_eq!(leading_int("17;rest"), 17);
        assert_eq!(leading_int("\t+8"), 8);
        assert_eq!(leading_int("-"), 0);
        assert_eq!(leading_int(""), 0);
        assert_eq!(leading_int("3.9"), 3);
    }

    #[test]
    fn int_prefix_saturates() {
        assert_eq!(leading_int("99999999999999999999999"), i64::MAX);
        assert_eq!(leading_int("-99999999999999999999999"), i64::MIN);
    }

    #[test]
    fn float_prefix_forms() {
        assert_eq!(leading_float("1.5"), 1.5);
        assert_eq!(leading_float(" -2.25xyz"), -2.25);
        assert_eq!(leading_float(".5"), 0.5);
        assert_eq!(leading_float("4."), 4.0);
        assert_eq!(leading_float("1e3m"), 1000.0);
        assert_eq!(leading_float("2e"), 2.0);
        assert_eq!(leading_float("7e+x"), 7.0);
        assert_eq!(leading_float("."), 0.0);
        assert_eq!(leading_float("stone"), 0.0);
        assert!(leading_float("INF").is_infinite());
        assert!(leading_float("nan").is_nan());
    }
}
