/// Largest amount the calculator accepts.
pub const MAX_INVESTMENT: u64 = 1_000_000;

/// Used when the entered amount sanitizes to zero.
pub const DEFAULT_INVESTMENT: u64 = 1_000;

/// Keep digits only, parse, cap at `MAX_INVESTMENT`. Empty input is 0.
pub fn sanitize(raw: &str) -> u64 {
    let mut value: u64 = 0;
    for d in raw.chars().filter_map(|c| c.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(d as u64);
        if value > MAX_INVESTMENT {
            return MAX_INVESTMENT;
        }
    }
    value
}

/// 1234567 -> "1,234,567"
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// What the input box shows after each keystroke.
pub fn format_input(raw: &str) -> String {
    group_thousands(sanitize(raw))
}

/// Amount fed to the pipeline: always positive.
pub fn pipeline_amount(raw: &str) -> f64 {
    match sanitize(raw) {
        0 => DEFAULT_INVESTMENT as f64,
        v => v as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_and_caps() {
        assert_eq!(sanitize("1,000"), 1000);
        // the decimal point is not a digit, so cents inflate the amount
        assert_eq!(sanitize("$25,000.00"), MAX_INVESTMENT);
        assert_eq!(sanitize("abc"), 0);
        assert_eq!(sanitize("99999999999999999999999"), MAX_INVESTMENT);
        assert_eq!(sanitize("-500"), 500);
    }

    #[test]
    fn test_format_input() {
        assert_eq!(format_input("1000000"), "1,000,000");
        assert_eq!(format_input("12345"), "12,345");
        assert_eq!(format_input("999"), "999");
        assert_eq!(format_input(""), "0");
    }

    #[test]
    fn test_pipeline_amount_defaults() {
        assert_eq!(pipeline_amount(""), 1000.0);
        assert_eq!(pipeline_amount("0"), 1000.0);
        assert_eq!(pipeline_amount("2,500"), 2500.0);
    }
}
