use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a currency amount to whole cents, halves away from zero.
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Builds a cent-precise amount, e.g. `cents(1299)` is 12.99.
pub fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{cents, round_to_cents};

    #[test]
    fn rounds_half_cent_away_from_zero() {
        assert_eq!(round_to_cents(Decimal::new(12_345, 3)), cents(1235));
        assert_eq!(round_to_cents(Decimal::new(12_344, 3)), cents(1234));
        assert_eq!(round_to_cents(Decimal::new(-5, 3)), cents(-1));
    }

    #[test]
    fn keeps_whole_cent_amounts_unchanged() {
        assert_eq!(round_to_cents(cents(999)), cents(999));
        assert_eq!(round_to_cents(Decimal::from(4)), Decimal::from(4));
    }
}
