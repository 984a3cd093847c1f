/// Format a float with thousands separators and two decimals: 1,234.56
pub fn number(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let fixed = format!("{:.2}", abs);
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative && abs >= 0.005 {
        format!("-{with_commas}.{dec_part}")
    } else {
        format!("{with_commas}.{dec_part}")
    }
}

/// Compact axis label: 950, 1.5k, 12k, 2.5M.
pub fn compact(val: f64) -> String {
    let abs = val.abs();
    let sign = if val < 0.0 { "-" } else { "" };
    let (scaled, suffix) = if abs >= 1_000_000.0 {
        (abs / 1_000_000.0, "M")
    } else if abs >= 1000.0 {
        (abs / 1000.0, "k")
    } else {
        return format!("{sign}{}", abs.round() as u64);
    };
    if scaled == scaled.floor() {
        format!("{sign}{}{suffix}", scaled as u64)
    } else {
        format!("{sign}{:.1}{suffix}", scaled)
    }
}

pub fn percent(val: f64) -> String {
    format!("{:.1}%", val)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(1234.56), "1,234.56");
        assert_eq!(number(-500.0), "-500.00");
        assert_eq!(number(0.0), "0.00");
        assert_eq!(number(1000000.99), "1,000,000.99");
        assert_eq!(number(42.1), "42.10");
        assert_eq!(number(-0.001), "0.00");
    }

    #[test]
    fn test_compact() {
        assert_eq!(compact(950.0), "950");
        assert_eq!(compact(1500.0), "1.5k");
        assert_eq!(compact(12000.0), "12k");
        assert_eq!(compact(2_500_000.0), "2.5M");
        assert_eq!(compact(-3000.0), "-3k");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(12.345), "12.3%");
        assert_eq!(percent(100.0), "100.0%");
    }
}
