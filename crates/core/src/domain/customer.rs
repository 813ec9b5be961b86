use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub Uuid);

impl CustomerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| DomainError::MalformedIdentifier(raw.trim().to_string()))
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub blacklisted: bool,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        blacklisted: bool,
    ) -> Result<Self, DomainError> {
        let customer = Self {
            id: CustomerId::generate(),
            name: name.into().trim().to_string(),
            email: email.into().trim().to_string(),
            blacklisted,
            created_at: Utc::now(),
        };
        customer.validate()?;
        Ok(customer)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvariantViolation("customer name must not be empty".into()));
        }
        let email = self.email.trim();
        let well_formed = email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && !domain.is_empty())
            .unwrap_or(false);
        if !well_formed {
            return Err(DomainError::InvariantViolation(format!(
                "customer email `{email}` is not a valid address"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Customer{{customerId={}, name={}, email={}, blacklisted={}, createdAt={}}}",
            self.id,
            self.name,
            self.email,
            self.blacklisted,
            self.created_at.to_rfc3339()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Customer, CustomerId};
    use crate::errors::DomainError;

    #[test]
    fn new_customer_trims_fields() {
        let customer = Customer::new("  apple ", "apple@example.com ", false).expect("valid");
        assert_eq!(customer.name, "apple");
        assert_eq!(customer.email, "apple@example.com");
        assert!(!customer.blacklisted);
    }

    #[test]
    fn empty_name_is_rejected() {
        let error = Customer::new(" ", "apple@example.com", false).expect_err("empty name");
        assert!(matches!(error, DomainError::InvariantViolation(message) if message.contains("name")));
    }

    #[test]
    fn malformed_email_is_rejected() {
        for email in ["apple", "@example.com", "apple@"] {
            let error = Customer::new("apple", email, false).expect_err("bad email");
            assert!(matches!(error, DomainError::InvariantViolation(_)), "{email}");
        }
    }

    #[test]
    fn customer_id_parse_rejects_garbage() {
        let id = CustomerId::generate();
        assert_eq!(CustomerId::parse(&format!(" {id} ")), Ok(id));
        assert_eq!(
            CustomerId::parse("customer-1"),
            Err(DomainError::MalformedIdentifier("customer-1".to_string()))
        );
    }
}
