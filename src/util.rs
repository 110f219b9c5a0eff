pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

pub fn format_balance(balance: f64) -> String {
    let rounded = balance.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn short_address(address: &str) -> &str {
    const KEEP: usize = 12;
    match address.char_indices().nth(KEEP) {
        Some((byte_index, _)) => &address[..byte_index],
        None => address,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_balance(0.0), "0");
        assert_eq!(format_balance(999.4), "999");
        assert_eq!(format_balance(500_000.0), "500,000");
        assert_eq!(format_balance(1_234_567.8), "1,234,568");
        assert_eq!(format_balance(-2_500.0), "-2,500");
    }

    #[test]
    fn amounts_keep_two_decimals() {
        assert_eq!(format_amount(40.0), "40.00");
        assert_eq!(format_amount(0.126), "0.13");
    }

    #[test]
    fn shortens_long_addresses_only() {
        assert_eq!(short_address("w_1234"), "w_1234");
        assert_eq!(short_address("w_0123456789abcdef"), "w_0123456789");
    }
}
