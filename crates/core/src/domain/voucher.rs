use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::customer::CustomerId;
use crate::domain::discount::{DiscountValue, Price, VoucherType};
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoucherId(pub Uuid);

impl VoucherId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| DomainError::MalformedIdentifier(raw.trim().to_string()))
    }
}

impl fmt::Display for VoucherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voucher {
    pub id: VoucherId,
    pub discount: DiscountValue,
    pub created_at: DateTime<Utc>,
    pub customer_id: Option<CustomerId>,
}

impl Voucher {
    pub fn new(discount: DiscountValue) -> Self {
        Self { id: VoucherId::generate(), discount, created_at: Utc::now(), customer_id: None }
    }

    pub fn voucher_type(&self) -> VoucherType {
        self.discount.voucher_type()
    }

    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn apply(&self, price: Price) -> Result<Price, DomainError> {
        self.discount.apply(price)
    }

    pub fn is_owned_by(&self, customer_id: &CustomerId) -> bool {
        self.customer_id.as_ref() == Some(customer_id)
    }
}

impl fmt::Display for Voucher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Voucher{{voucherId={}, voucherType={}, discountValue={}, createdAt={}}}",
            self.id,
            self.voucher_type(),
            self.discount,
            self.created_at.to_rfc3339()
        )
    }
}
