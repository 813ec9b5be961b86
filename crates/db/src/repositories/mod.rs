use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use vouchers_core::domain::customer::{Customer, CustomerId};
use vouchers_core::domain::discount::VoucherType;
use vouchers_core::domain::voucher::{Voucher, VoucherId};
use vouchers_core::errors::ApplicationError;

pub mod customer;
pub mod file;
pub mod memory;
pub mod voucher;

pub use customer::SqlCustomerRepository;
pub use file::{FileCustomerRepository, FileVoucherRepository};
pub use memory::{InMemoryCustomerRepository, InMemoryVoucherRepository};
pub use voucher::SqlVoucherRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("file storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("record `{0}` already exists")]
    Conflict(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        ApplicationError::Persistence(error.to_string())
    }
}

/// Persistence contract for customers.
///
/// Listing methods return records ordered by creation time. `update` and
/// `delete_by_id` report whether a record was affected.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn insert(&self, customer: Customer) -> Result<(), RepositoryError>;
    async fn update(&self, customer: Customer) -> Result<bool, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError>;
    async fn find_blacklisted(&self) -> Result<Vec<Customer>, RepositoryError>;
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;
    /// Oldest customer carrying `name`.
    async fn find_by_name(&self, name: &str) -> Result<Option<Customer>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, RepositoryError>;
    async fn delete_all(&self) -> Result<u64, RepositoryError>;
    async fn delete_by_id(&self, id: &CustomerId) -> Result<bool, RepositoryError>;
}

/// Persistence contract for vouchers, including the wallet owner column.
#[async_trait]
pub trait VoucherRepository: Send + Sync {
    async fn insert(&self, voucher: Voucher) -> Result<(), RepositoryError>;
    async fn update(&self, voucher: Voucher) -> Result<bool, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<Voucher>, RepositoryError>;
    async fn find_by_id(&self, id: &VoucherId) -> Result<Option<Voucher>, RepositoryError>;
    async fn find_by_type(
        &self,
        voucher_type: VoucherType,
    ) -> Result<Vec<Voucher>, RepositoryError>;
    /// Vouchers whose UTC creation date is `date`.
    async fn find_by_created_date(&self, date: NaiveDate)
        -> Result<Vec<Voucher>, RepositoryError>;
    async fn find_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Voucher>, RepositoryError>;
    async fn update_owner(
        &self,
        id: &VoucherId,
        customer_id: Option<CustomerId>,
    ) -> Result<bool, RepositoryError>;
    async fn clear_owner_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<u64, RepositoryError>;
    async fn delete_all(&self) -> Result<u64, RepositoryError>;
    async fn delete_by_id(&self, id: &VoucherId) -> Result<bool, RepositoryError>;
}

pub(crate) fn sort_customers(customers: &mut [Customer]) {
    customers.sort_by(|left, right| {
        left.created_at.cmp(&right.created_at).then_with(|| left.id.0.cmp(&right.id.0))
    });
}

pub(crate) fn sort_vouchers(vouchers: &mut [Voucher]) {
    vouchers.sort_by(|left, right| {
        left.created_at.cmp(&right.created_at).then_with(|| left.id.0.cmp(&right.id.0))
    });
}
