use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use vouchers_core::domain::customer::{Customer, CustomerId};
use vouchers_core::domain::discount::VoucherType;
use vouchers_core::domain::voucher::{Voucher, VoucherId};
use vouchers_core::errors::ApplicationError;

use crate::repositories::{CustomerRepository, VoucherRepository};

/// Assignment of vouchers to customers.
#[derive(Clone)]
pub struct WalletService {
    customers: Arc<dyn CustomerRepository>,
    vouchers: Arc<dyn VoucherRepository>,
}

impl WalletService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        vouchers: Arc<dyn VoucherRepository>,
    ) -> Self {
        Self { customers, vouchers }
    }

    pub async fn assign(
        &self,
        voucher_id: &VoucherId,
        customer_id: &CustomerId,
    ) -> Result<Voucher, ApplicationError> {
        let voucher = self.voucher(voucher_id).await?;
        let customer = self.customer(customer_id).await?;

        if !self.vouchers.update_owner(&voucher.id, Some(customer.id)).await? {
            return Err(ApplicationError::not_found("voucher", voucher_id));
        }
        info!(
            event_name = "wallet.assigned",
            voucher_id = %voucher.id,
            customer_id = %customer.id,
            "voucher assigned to customer"
        );
        Ok(Voucher { customer_id: Some(customer.id), ..voucher })
    }

    pub async fn withdraw(&self, voucher_id: &VoucherId) -> Result<Voucher, ApplicationError> {
        let voucher = self.voucher(voucher_id).await?;

        if !self.vouchers.update_owner(&voucher.id, None).await? {
            return Err(ApplicationError::not_found("voucher", voucher_id));
        }
        info!(
            event_name = "wallet.withdrawn",
            voucher_id = %voucher.id,
            previous_owner = ?voucher.customer_id.map(|id| id.to_string()),
            "voucher withdrawn from wallet"
        );
        Ok(Voucher { customer_id: None, ..voucher })
    }

    pub async fn vouchers_of(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Voucher>, ApplicationError> {
        Ok(self.vouchers.find_by_customer(customer_id).await?)
    }

    pub async fn customer_of(&self, voucher_id: &VoucherId) -> Result<Customer, ApplicationError> {
        let voucher = self.voucher(voucher_id).await?;
        let owner = voucher
            .customer_id
            .ok_or_else(|| ApplicationError::not_found("voucher owner", voucher_id))?;
        self.customer(&owner).await
    }

    /// Distinct owners of vouchers of `voucher_type`, in order of first appearance.
    pub async fn customers_by_voucher_type(
        &self,
        voucher_type: VoucherType,
    ) -> Result<Vec<Customer>, ApplicationError> {
        let mut seen = HashSet::new();
        let mut owners = Vec::new();
        for voucher in self.vouchers.find_by_type(voucher_type).await? {
            let Some(owner_id) = voucher.customer_id else {
                continue;
            };
            if !seen.insert(owner_id) {
                continue;
            }
            if let Some(owner) = self.customers.find_by_id(&owner_id).await? {
                owners.push(owner);
            }
        }
        Ok(owners)
    }

    async fn voucher(&self, id: &VoucherId) -> Result<Voucher, ApplicationError> {
        self.vouchers.find_by_id(id).await?.ok_or_else(|| ApplicationError::not_found("voucher", id))
    }

    async fn customer(&self, id: &CustomerId) -> Result<Customer, ApplicationError> {
        self.customers
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("customer", id))
    }
}

#[cfg(test)]
mod tests {
    use vouchers_core::domain::customer::CustomerId;
    use vouchers_core::domain::discount::VoucherType;
    use vouchers_core::domain::voucher::VoucherId;
    use vouchers_core::errors::ApplicationError;

    use super::WalletService;
    use crate::services::fixtures::{customer, repositories, voucher};

    #[tokio::test]
    async fn assign_then_list_then_withdraw() {
        let (customers, vouchers) = repositories();
        let wallet = WalletService::new(customers.clone(), vouchers.clone());
        let owner = customer("apple");
        let held = voucher(VoucherType::FixedAmount, "10");
        customers.insert(owner.clone()).await.expect("insert customer");
        vouchers.insert(held.clone()).await.expect("insert voucher");

        let assigned = wallet.assign(&held.id, &owner.id).await.expect("assign");
        assert_eq!(assigned.customer_id, Some(owner.id));

        let listed = wallet.vouchers_of(&owner.id).await.expect("vouchers of");
        assert_eq!(listed.iter().map(|v| v.id).collect::<Vec<_>>(), vec![held.id]);
        assert_eq!(wallet.customer_of(&held.id).await.expect("customer of"), owner);

        let withdrawn = wallet.withdraw(&held.id).await.expect("withdraw");
        assert_eq!(withdrawn.customer_id, None);
        assert!(wallet.vouchers_of(&owner.id).await.expect("vouchers of").is_empty());
        assert!(matches!(
            wallet.customer_of(&held.id).await,
            Err(ApplicationError::NotFound { entity: "voucher owner", .. })
        ));
    }

    #[tokio::test]
    async fn assign_requires_both_sides_to_exist() {
        let (customers, vouchers) = repositories();
        let wallet = WalletService::new(customers.clone(), vouchers.clone());
        let owner = customer("apple");
        let held = voucher(VoucherType::FixedAmount, "10");
        customers.insert(owner.clone()).await.expect("insert customer");
        vouchers.insert(held.clone()).await.expect("insert voucher");

        assert!(matches!(
            wallet.assign(&VoucherId::generate(), &owner.id).await,
            Err(ApplicationError::NotFound { entity: "voucher", .. })
        ));
        assert!(matches!(
            wallet.assign(&held.id, &CustomerId::generate()).await,
            Err(ApplicationError::NotFound { entity: "customer", .. })
        ));
        assert!(matches!(
            wallet.withdraw(&VoucherId::generate()).await,
            Err(ApplicationError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn customers_by_voucher_type_are_distinct() {
        let (customers, vouchers) = repositories();
        let wallet = WalletService::new(customers.clone(), vouchers.clone());
        let apple = customer("apple");
        let banana = customer("banana");
        customers.insert(apple.clone()).await.expect("insert");
        customers.insert(banana.clone()).await.expect("insert");

        for (voucher_type, raw, owner) in [
            (VoucherType::PercentDiscount, "10", &apple),
            (VoucherType::PercentDiscount, "20", &apple),
            (VoucherType::FixedAmount, "30", &banana),
        ] {
            let held = voucher(voucher_type, raw);
            vouchers.insert(held.clone()).await.expect("insert voucher");
            wallet.assign(&held.id, &owner.id).await.expect("assign");
        }

        let percent_owners =
            wallet.customers_by_voucher_type(VoucherType::PercentDiscount).await.expect("owners");
        assert_eq!(percent_owners, vec![apple]);

        let fixed_owners =
            wallet.customers_by_voucher_type(VoucherType::FixedAmount).await.expect("owners");
        assert_eq!(fixed_owners, vec![banana]);
    }
}
