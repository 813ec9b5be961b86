use std::sync::Arc;

use tracing::info;

use vouchers_core::domain::customer::{Customer, CustomerId};
use vouchers_core::errors::ApplicationError;

use crate::repositories::{CustomerRepository, VoucherRepository};

const ENTITY: &str = "customer";

#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerRepository>,
    vouchers: Arc<dyn VoucherRepository>,
}

impl CustomerService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        vouchers: Arc<dyn VoucherRepository>,
    ) -> Self {
        Self { customers, vouchers }
    }

    pub async fn create(&self, customer: Customer) -> Result<Customer, ApplicationError> {
        customer.validate()?;
        if self.customers.find_by_id(&customer.id).await?.is_some() {
            return Err(ApplicationError::already_exists(ENTITY, customer.id));
        }

        self.customers.insert(customer.clone()).await?;
        info!(
            event_name = "customer.created",
            customer_id = %customer.id,
            blacklisted = customer.blacklisted,
            "customer created"
        );
        Ok(customer)
    }

    /// Replaces name, email and black-list flag. Identity and creation time are kept.
    pub async fn update(&self, customer: Customer) -> Result<Customer, ApplicationError> {
        customer.validate()?;
        let existing = self.find_by_id(&customer.id).await?;
        let updated = Customer { created_at: existing.created_at, ..customer };

        if !self.customers.update(updated.clone()).await? {
            return Err(ApplicationError::not_found(ENTITY, updated.id));
        }
        info!(event_name = "customer.updated", customer_id = %updated.id, "customer updated");
        Ok(updated)
    }

    pub async fn find_all(&self) -> Result<Vec<Customer>, ApplicationError> {
        Ok(self.customers.find_all().await?)
    }

    pub async fn find_blacklisted(&self) -> Result<Vec<Customer>, ApplicationError> {
        Ok(self.customers.find_blacklisted().await?)
    }

    pub async fn find_by_id(&self, id: &CustomerId) -> Result<Customer, ApplicationError> {
        self.customers.find_by_id(id).await?.ok_or_else(|| ApplicationError::not_found(ENTITY, id))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Customer, ApplicationError> {
        self.customers
            .find_by_name(name.trim())
            .await?
            .ok_or_else(|| ApplicationError::not_found(ENTITY, name.trim()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Customer, ApplicationError> {
        self.customers
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| ApplicationError::not_found(ENTITY, email.trim()))
    }

    /// Removes every customer and releases every assigned voucher.
    pub async fn delete_all(&self) -> Result<u64, ApplicationError> {
        for customer in self.customers.find_all().await? {
            self.vouchers.clear_owner_for_customer(&customer.id).await?;
        }
        let removed = self.customers.delete_all().await?;
        info!(event_name = "customer.deleted_all", removed, "all customers deleted");
        Ok(removed)
    }

    pub async fn delete_by_id(&self, id: &CustomerId) -> Result<Customer, ApplicationError> {
        let customer = self.find_by_id(id).await?;
        self.remove(customer).await
    }

    pub async fn delete_by_name(&self, name: &str) -> Result<Customer, ApplicationError> {
        let customer = self.find_by_name(name).await?;
        self.remove(customer).await
    }

    pub async fn delete_by_email(&self, email: &str) -> Result<Customer, ApplicationError> {
        let customer = self.find_by_email(email).await?;
        self.remove(customer).await
    }

    async fn remove(&self, customer: Customer) -> Result<Customer, ApplicationError> {
        let released = self.vouchers.clear_owner_for_customer(&customer.id).await?;
        if !self.customers.delete_by_id(&customer.id).await? {
            return Err(ApplicationError::not_found(ENTITY, customer.id));
        }
        info!(
            event_name = "customer.deleted",
            customer_id = %customer.id,
            released_vouchers = released,
            "customer deleted"
        );
        Ok(customer)
    }
}
