use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherType {
    FixedAmount,
    PercentDiscount,
}

impl VoucherType {
    pub const ALL: [VoucherType; 2] = [VoucherType::FixedAmount, VoucherType::PercentDiscount];

    /// Menu ordinal used by the console.
    pub fn ordinal(self) -> &'static str {
        match self {
            Self::FixedAmount => "1",
            Self::PercentDiscount => "2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FixedAmount => "Fixed Amount",
            Self::PercentDiscount => "Percent Discount",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FixedAmount => "FIXED_AMOUNT",
            Self::PercentDiscount => "PERCENT_DISCOUNT",
        }
    }

    pub fn from_ordinal(raw: &str) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|voucher_type| voucher_type.ordinal() == raw.trim())
            .ok_or_else(|| DomainError::UnknownVoucherType(raw.trim().to_string()))
    }
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoucherType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "1" | "fixed" | "fixed_amount" => Ok(Self::FixedAmount),
            "2" | "percent" | "percent_discount" => Ok(Self::PercentDiscount),
            _ => Err(DomainError::UnknownVoucherType(value.trim().to_string())),
        }
    }
}

/// A discount amount that is legal for its voucher type.
///
/// Fixed amounts must be non-negative; percentages must lie in `0..=100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiscountValue {
    voucher_type: VoucherType,
    value: Decimal,
}

impl DiscountValue {
    pub fn new(voucher_type: VoucherType, value: Decimal) -> Result<Self, DomainError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::NegativeDiscount(value));
        }
        if voucher_type == VoucherType::PercentDiscount && value > Decimal::ONE_HUNDRED {
            return Err(DomainError::PercentOutOfRange(value));
        }

        Ok(Self { voucher_type, value: value.normalize() })
    }

    pub fn parse(voucher_type: VoucherType, raw: &str) -> Result<Self, DomainError> {
        let value = Decimal::from_str(raw.trim())
            .map_err(|_| DomainError::MalformedDiscount(raw.trim().to_string()))?;
        Self::new(voucher_type, value)
    }

    pub fn voucher_type(&self) -> VoucherType {
        self.voucher_type
    }

    pub fn value(&self) -> Decimal {
        self.value
    }
}

impl fmt::Display for DiscountValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Price(Decimal);

impl Price {
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::NegativePrice(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl DiscountValue {
    /// Applies the discount to `price`. Fixed discounts larger than the price are rejected.
    pub fn apply(&self, price: Price) -> Result<Price, DomainError> {
        let original = price.value();
        let discounted = match self.voucher_type {
            VoucherType::PercentDiscount => {
                original * (Decimal::ONE - self.value / Decimal::ONE_HUNDRED)
            }
            VoucherType::FixedAmount => {
                if self.value > original {
                    return Err(DomainError::DiscountExceedsPrice {
                        discount: self.value,
                        price: original,
                    });
                }
                original - self.value
            }
        };

        Ok(Price(discounted))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{DiscountValue, Price, VoucherType};
    use crate::errors::DomainError;

    fn price(raw: &str) -> Price {
        Price::new(raw.parse().expect("decimal")).expect("price")
    }

    #[test]
    fn negative_discounts_are_rejected_for_every_type() {
        for (voucher_type, raw) in [
            (VoucherType::PercentDiscount, "-2.9"),
            (VoucherType::FixedAmount, "-0.1"),
            (VoucherType::PercentDiscount, "-10000"),
        ] {
            let error = DiscountValue::parse(voucher_type, raw).expect_err("negative must fail");
            assert!(matches!(error, DomainError::NegativeDiscount(_)), "{raw}: {error:?}");
        }
    }

    #[test]
    fn percent_above_one_hundred_is_rejected() {
        for raw in ["100.1", "101", "230230"] {
            let error = DiscountValue::parse(VoucherType::PercentDiscount, raw)
                .expect_err("above 100 must fail");
            assert!(matches!(error, DomainError::PercentOutOfRange(_)), "{raw}: {error:?}");
        }
    }

    #[test]
    fn fixed_amount_has_no_upper_bound() {
        let discount = DiscountValue::parse(VoucherType::FixedAmount, "230230").expect("valid");
        assert_eq!(discount.value(), Decimal::new(230230, 0));
    }

    #[test]
    fn percent_bounds_are_inclusive() {
        assert!(DiscountValue::parse(VoucherType::PercentDiscount, "0").is_ok());
        assert!(DiscountValue::parse(VoucherType::PercentDiscount, "100").is_ok());
    }

    #[test]
    fn malformed_input_is_rejected() {
        let error = DiscountValue::parse(VoucherType::FixedAmount, "ten").expect_err("not a number");
        assert_eq!(error, DomainError::MalformedDiscount("ten".to_string()));
    }

    #[test]
    fn percent_discount_scales_price() {
        let discount = DiscountValue::parse(VoucherType::PercentDiscount, "13").expect("valid");
        assert_eq!(discount.apply(price("100")).expect("apply").value(), Decimal::new(87, 0));

        let full = DiscountValue::parse(VoucherType::PercentDiscount, "100").expect("valid");
        assert_eq!(full.apply(price("100")).expect("apply").value(), Decimal::ZERO);
    }

    #[test]
    fn fixed_discount_subtracts_up_to_the_price() {
        for (raw, expected) in [("10", 90), ("100", 0), ("0", 100)] {
            let discount = DiscountValue::parse(VoucherType::FixedAmount, raw).expect("valid");
            let result = discount.apply(price("100")).expect("apply");
            assert_eq!(result.value(), Decimal::new(expected, 0));
        }
    }

    #[test]
    fn fixed_discount_larger_than_price_is_rejected() {
        for (raw, original) in [("10", "2"), ("100", "4"), ("100", "2")] {
            let discount = DiscountValue::parse(VoucherType::FixedAmount, raw).expect("valid");
            let error = discount.apply(price(original)).expect_err("must not go negative");
            assert!(matches!(error, DomainError::DiscountExceedsPrice { .. }));
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(matches!(
            Price::new(Decimal::new(-1, 0)),
            Err(DomainError::NegativePrice(_))
        ));
    }

    #[test]
    fn voucher_type_parses_ordinals_and_names() {
        assert_eq!(VoucherType::from_ordinal("1"), Ok(VoucherType::FixedAmount));
        assert_eq!(VoucherType::from_ordinal("2"), Ok(VoucherType::PercentDiscount));
        for raw in ["0", "3", "12"] {
            assert!(VoucherType::from_ordinal(raw).is_err(), "{raw} should be rejected");
        }

        assert_eq!("percent".parse::<VoucherType>(), Ok(VoucherType::PercentDiscount));
        assert_eq!("FIXED_AMOUNT".parse::<VoucherType>(), Ok(VoucherType::FixedAmount));
        assert!("coupon".parse::<VoucherType>().is_err());
    }
}
