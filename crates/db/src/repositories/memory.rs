use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use vouchers_core::domain::customer::{Customer, CustomerId};
use vouchers_core::domain::discount::VoucherType;
use vouchers_core::domain::voucher::{Voucher, VoucherId};

use super::{sort_customers, sort_vouchers, CustomerRepository, RepositoryError, VoucherRepository};

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<HashMap<CustomerId, Customer>>,
}

impl InMemoryCustomerRepository {
    async fn collect(&self, predicate: impl Fn(&Customer) -> bool) -> Vec<Customer> {
        let customers = self.customers.read().await;
        let mut matched: Vec<Customer> =
            customers.values().filter(|customer| predicate(customer)).cloned().collect();
        sort_customers(&mut matched);
        matched
    }
}

#[async_trait::async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn insert(&self, customer: Customer) -> Result<(), RepositoryError> {
        let mut customers = self.customers.write().await;
        if customers.contains_key(&customer.id) {
            return Err(RepositoryError::Conflict(customer.id.to_string()));
        }
        customers.insert(customer.id, customer);
        Ok(())
    }

    async fn update(&self, customer: Customer) -> Result<bool, RepositoryError> {
        let mut customers = self.customers.write().await;
        match customers.get_mut(&customer.id) {
            Some(existing) => {
                *existing = customer;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        Ok(self.collect(|_| true).await)
    }

    async fn find_blacklisted(&self) -> Result<Vec<Customer>, RepositoryError> {
        Ok(self.collect(|customer| customer.blacklisted).await)
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.collect(|customer| customer.name == name).await.into_iter().next())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.collect(|customer| customer.email == email).await.into_iter().next())
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let mut customers = self.customers.write().await;
        let removed = customers.len() as u64;
        customers.clear();
        Ok(removed)
    }

    async fn delete_by_id(&self, id: &CustomerId) -> Result<bool, RepositoryError> {
        let mut customers = self.customers.write().await;
        Ok(customers.remove(id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryVoucherRepository {
    vouchers: RwLock<HashMap<VoucherId, Voucher>>,
}

impl InMemoryVoucherRepository {
    async fn collect(&self, predicate: impl Fn(&Voucher) -> bool) -> Vec<Voucher> {
        let vouchers = self.vouchers.read().await;
        let mut matched: Vec<Voucher> =
            vouchers.values().filter(|voucher| predicate(voucher)).cloned().collect();
        sort_vouchers(&mut matched);
        matched
    }
}

#[async_trait::async_trait]
impl VoucherRepository for InMemoryVoucherRepository {
    async fn insert(&self, voucher: Voucher) -> Result<(), RepositoryError> {
        let mut vouchers = self.vouchers.write().await;
        if vouchers.contains_key(&voucher.id) {
            return Err(RepositoryError::Conflict(voucher.id.to_string()));
        }
        vouchers.insert(voucher.id, voucher);
        Ok(())
    }

    async fn update(&self, voucher: Voucher) -> Result<bool, RepositoryError> {
        let mut vouchers = self.vouchers.write().await;
        match vouchers.get_mut(&voucher.id) {
            Some(existing) => {
                *existing = voucher;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_all(&self) -> Result<Vec<Voucher>, RepositoryError> {
        Ok(self.collect(|_| true).await)
    }

    async fn find_by_id(&self, id: &VoucherId) -> Result<Option<Voucher>, RepositoryError> {
        let vouchers = self.vouchers.read().await;
        Ok(vouchers.get(id).cloned())
    }

    async fn find_by_type(
        &self,
        voucher_type: VoucherType,
    ) -> Result<Vec<Voucher>, RepositoryError> {
        Ok(self.collect(|voucher| voucher.voucher_type() == voucher_type).await)
    }

    async fn find_by_created_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Voucher>, RepositoryError> {
        Ok(self.collect(|voucher| voucher.created_on() == date).await)
    }

    async fn find_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Voucher>, RepositoryError> {
        Ok(self.collect(|voucher| voucher.is_owned_by(customer_id)).await)
    }

    async fn update_owner(
        &self,
        id: &VoucherId,
        customer_id: Option<CustomerId>,
    ) -> Result<bool, RepositoryError> {
        let mut vouchers = self.vouchers.write().await;
        match vouchers.get_mut(id) {
            Some(voucher) => {
                voucher.customer_id = customer_id;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_owner_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<u64, RepositoryError> {
        let mut vouchers = self.vouchers.write().await;
        let mut cleared = 0;
        for voucher in vouchers.values_mut().filter(|voucher| voucher.is_owned_by(customer_id)) {
            voucher.customer_id = None;
            cleared += 1;
        }
        Ok(cleared)
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let mut vouchers = self.vouchers.write().await;
        let removed = vouchers.len() as u64;
        vouchers.clear();
        Ok(removed)
    }

    async fn delete_by_id(&self, id: &VoucherId) -> Result<bool, RepositoryError> {
        let mut vouchers = self.vouchers.write().await;
        Ok(vouchers.remove(id).is_some())
    }
}
