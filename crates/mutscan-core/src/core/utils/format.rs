const SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

/// Formats `num` with three significant digits and a magnitude suffix, as used in
/// variant-list file names: `100`, `10K`, `1.5M`.
pub fn human_format(num: u64) -> String {
    if num == 0 {
        return "0".to_string();
    }
    let digits = num.ilog10() + 1;
    let mut value = if digits > 3 {
        let scale = 10f64.powi((digits - 3) as i32);
        (num as f64 / scale).round() * scale
    } else {
        num as f64
    };

    let mut magnitude = 0;
    while value.abs() >= 1000.0 && magnitude < SUFFIXES.len() - 1 {
        magnitude += 1;
        value /= 1000.0;
    }
    format!("{}{}", value, SUFFIXES[magnitude])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_format_keeps_small_numbers_verbatim() {
        assert_eq!(human_format(0), "0");
        assert_eq!(human_format(7), "7");
        assert_eq!(human_format(100), "100");
        assert_eq!(human_format(999), "999");
    }

    #[test]
    fn human_format_rounds_to_three_significant_digits() {
        assert_eq!(human_format(1000), "1K");
        assert_eq!(human_format(10_000), "10K");
        assert_eq!(human_format(123_456), "123K");
        assert_eq!(human_format(1_500_000), "1.5M");
        assert_eq!(human_format(2_000_000_000), "2B");
    }

    #[test]
    fn human_format_carries_rounding_into_the_next_suffix() {
        assert_eq!(human_format(999_999), "1M");
    }
}
