use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use vouchers_core::domain::discount::{DiscountValue, Price, VoucherType};
use vouchers_core::domain::voucher::{Voucher, VoucherId};
use vouchers_core::errors::ApplicationError;

use crate::repositories::VoucherRepository;

const ENTITY: &str = "voucher";

#[derive(Clone)]
pub struct VoucherService {
    vouchers: Arc<dyn VoucherRepository>,
}

impl VoucherService {
    pub fn new(vouchers: Arc<dyn VoucherRepository>) -> Self {
        Self { vouchers }
    }

    pub async fn create(&self, voucher: Voucher) -> Result<Voucher, ApplicationError> {
        if self.vouchers.find_by_id(&voucher.id).await?.is_some() {
            return Err(ApplicationError::already_exists(ENTITY, voucher.id));
        }

        self.vouchers.insert(voucher.clone()).await?;
        info!(
            event_name = "voucher.created",
            voucher_id = %voucher.id,
            voucher_type = %voucher.voucher_type(),
            discount_value = %voucher.discount,
            "voucher created"
        );
        Ok(voucher)
    }

    /// Replaces the discount (and with it the type) of an existing voucher.
    pub async fn update(
        &self,
        id: &VoucherId,
        discount: DiscountValue,
    ) -> Result<Voucher, ApplicationError> {
        let existing = self.find_by_id(id).await?;
        let updated = Voucher { discount, ..existing };

        if !self.vouchers.update(updated.clone()).await? {
            return Err(ApplicationError::not_found(ENTITY, id));
        }
        info!(
            event_name = "voucher.updated",
            voucher_id = %updated.id,
            voucher_type = %updated.voucher_type(),
            discount_value = %updated.discount,
            "voucher updated"
        );
        Ok(updated)
    }

    pub async fn find_all(&self) -> Result<Vec<Voucher>, ApplicationError> {
        Ok(self.vouchers.find_all().await?)
    }

    pub async fn find_by_id(&self, id: &VoucherId) -> Result<Voucher, ApplicationError> {
        self.vouchers.find_by_id(id).await?.ok_or_else(|| ApplicationError::not_found(ENTITY, id))
    }

    pub async fn find_by_type(
        &self,
        voucher_type: VoucherType,
    ) -> Result<Vec<Voucher>, ApplicationError> {
        Ok(self.vouchers.find_by_type(voucher_type).await?)
    }

    pub async fn find_by_created_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Voucher>, ApplicationError> {
        Ok(self.vouchers.find_by_created_date(date).await?)
    }

    pub async fn apply(&self, id: &VoucherId, price: Price) -> Result<Price, ApplicationError> {
        let voucher = self.find_by_id(id).await?;
        let discounted = voucher.apply(price)?;
        info!(
            event_name = "voucher.applied",
            voucher_id = %voucher.id,
            original_price = %price,
            discounted_price = %discounted,
            "voucher applied"
        );
        Ok(discounted)
    }

    pub async fn delete_all(&self) -> Result<u64, ApplicationError> {
        let removed = self.vouchers.delete_all().await?;
        info!(event_name = "voucher.deleted_all", removed, "all vouchers deleted");
        Ok(removed)
    }

    pub async fn delete_by_id(&self, id: &VoucherId) -> Result<Voucher, ApplicationError> {
        let voucher = self.find_by_id(id).await?;
        if !self.vouchers.delete_by_id(id).await? {
            return Err(ApplicationError::not_found(ENTITY, id));
        }
        info!(event_name = "voucher.deleted", voucher_id = %voucher.id, "voucher deleted");
        Ok(voucher)
    }
}
