/// Display convention for flow magnitudes: "$1,000.5B". The engine itself
/// treats values as unit-less; only the display layer applies units.
pub fn format_amount(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    let whole = rounded.trunc() as u64;
    let tenths = ((rounded - rounded.trunc()) * 10.0).round() as u64;

    let grouped = group_thousands(whole);
    if tenths == 0 {
        format!("${grouped}B")
    } else {
        format!("${grouped}.{tenths}B")
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_format_with_separators_and_unit() {
        assert_eq!(format_amount(0.0), "$0B");
        assert_eq!(format_amount(50.0), "$50B");
        assert_eq!(format_amount(1000.0), "$1,000B");
        assert_eq!(format_amount(1000.5), "$1,000.5B");
        assert_eq!(format_amount(1234567.89), "$1,234,567.9B");
    }
}
