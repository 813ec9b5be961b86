use chrono::NaiveDate;
use sqlx::Row;

use vouchers_core::domain::customer::CustomerId;
use vouchers_core::domain::discount::{DiscountValue, VoucherType};
use vouchers_core::domain::voucher::{Voucher, VoucherId};
use vouchers_core::errors::DomainError;

use super::customer::{parse_timestamp, parse_uuid};
use super::{RepositoryError, VoucherRepository};
use crate::DbPool;

const VOUCHER_COLUMNS: &str = "id, voucher_type, discount_value, created_at, customer_id";

pub struct SqlVoucherRepository {
    pool: DbPool,
}

impl SqlVoucherRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(
        &self,
        filter: &str,
        bind: Option<String>,
    ) -> Result<Vec<Voucher>, RepositoryError> {
        let sql = format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers {filter} ORDER BY created_at ASC, id ASC"
        );
        let mut query = sqlx::query(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_voucher).collect()
    }
}

fn row_to_voucher(row: &sqlx::sqlite::SqliteRow) -> Result<Voucher, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let voucher_type_str: String =
        row.try_get("voucher_type").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let discount_value_str: String =
        row.try_get("discount_value").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let customer_id_str: Option<String> =
        row.try_get("customer_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let voucher_type: VoucherType =
        voucher_type_str.parse().map_err(|e: DomainError| RepositoryError::Decode(e.to_string()))?;
    let discount = DiscountValue::parse(voucher_type, &discount_value_str)
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let customer_id = customer_id_str.as_deref().map(parse_uuid).transpose()?.map(CustomerId);

    Ok(Voucher {
        id: VoucherId(parse_uuid(&id)?),
        discount,
        created_at: parse_timestamp(&created_at_str)?,
        customer_id,
    })
}

#[async_trait::async_trait]
impl VoucherRepository for SqlVoucherRepository {
    async fn insert(&self, voucher: Voucher) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO vouchers (id, voucher_type, discount_value, created_at, customer_id)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(voucher.id.to_string())
        .bind(voucher.voucher_type().as_str())
        .bind(voucher.discount.value().to_string())
        .bind(voucher.created_at.to_rfc3339())
        .bind(voucher.customer_id.map(|id| id.to_string()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() != 1 {
            return Err(RepositoryError::Conflict(voucher.id.to_string()));
        }
        Ok(())
    }

    async fn update(&self, voucher: Voucher) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE vouchers SET voucher_type = ?, discount_value = ?, customer_id = ?
             WHERE id = ?",
        )
        .bind(voucher.voucher_type().as_str())
        .bind(voucher.discount.value().to_string())
        .bind(voucher.customer_id.map(|id| id.to_string()))
        .bind(voucher.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_all(&self) -> Result<Vec<Voucher>, RepositoryError> {
        self.fetch_many("", None).await
    }

    async fn find_by_id(&self, id: &VoucherId) -> Result<Option<Voucher>, RepositoryError> {
        Ok(self.fetch_many("WHERE id = ?", Some(id.to_string())).await?.into_iter().next())
    }

    async fn find_by_type(
        &self,
        voucher_type: VoucherType,
    ) -> Result<Vec<Voucher>, RepositoryError> {
        self.fetch_many("WHERE voucher_type = ?", Some(voucher_type.as_str().to_string())).await
    }

    async fn find_by_created_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Voucher>, RepositoryError> {
        // created_at is stored as a UTC RFC 3339 string.
        let day = date.format("%Y-%m-%d").to_string();
        self.fetch_many("WHERE substr(created_at, 1, 10) = ?", Some(day)).await
    }

    async fn find_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Voucher>, RepositoryError> {
        self.fetch_many("WHERE customer_id = ?", Some(customer_id.to_string())).await
    }

    async fn update_owner(
        &self,
        id: &VoucherId,
        customer_id: Option<CustomerId>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE vouchers SET customer_id = ? WHERE id = ?")
            .bind(customer_id.map(|owner| owner.to_string()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn clear_owner_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("UPDATE vouchers SET customer_id = NULL WHERE customer_id = ?")
            .bind(customer_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM vouchers").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_by_id(&self, id: &VoucherId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM vouchers WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use vouchers_core::domain::customer::Customer;
    use vouchers_core::domain::discount::{DiscountValue, VoucherType};
    use vouchers_core::domain::voucher::Voucher;

    use super::SqlVoucherRepository;
    use crate::repositories::{
        CustomerRepository, RepositoryError, SqlCustomerRepository, VoucherRepository,
    };
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn voucher(voucher_type: VoucherType, raw: &str) -> Voucher {
        Voucher::new(DiscountValue::parse(voucher_type, raw).expect("valid discount"))
    }

    #[tokio::test]
    async fn insert_and_find_by_id_preserves_fields() {
        let repo = SqlVoucherRepository::new(setup().await);
        let stored = voucher(VoucherType::PercentDiscount, "12.5");

        repo.insert(stored.clone()).await.expect("insert");
        let found = repo.find_by_id(&stored.id).await.expect("find").expect("exists");

        assert_eq!(found, stored);
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let repo = SqlVoucherRepository::new(setup().await);
        let stored = voucher(VoucherType::FixedAmount, "10");

        repo.insert(stored.clone()).await.expect("insert");
        let error = repo.insert(stored).await.expect_err("duplicate");

        assert!(matches!(error, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn filters_by_type_and_created_date() {
        let repo = SqlVoucherRepository::new(setup().await);
        let fixed = voucher(VoucherType::FixedAmount, "10");
        let mut old_percent = voucher(VoucherType::PercentDiscount, "30");
        old_percent.created_at = Utc::now() - Duration::days(2);

        repo.insert(fixed.clone()).await.expect("insert fixed");
        repo.insert(old_percent.clone()).await.expect("insert percent");

        let percent = repo.find_by_type(VoucherType::PercentDiscount).await.expect("by type");
        assert_eq!(percent.iter().map(|v| v.id).collect::<Vec<_>>(), vec![old_percent.id]);

        let today = repo.find_by_created_date(fixed.created_on()).await.expect("by date");
        assert_eq!(today.iter().map(|v| v.id).collect::<Vec<_>>(), vec![fixed.id]);

        let all = repo.find_all().await.expect("all");
        assert_eq!(all.iter().map(|v| v.id).collect::<Vec<_>>(), vec![old_percent.id, fixed.id]);
    }

    #[tokio::test]
    async fn owner_assignment_and_customer_deletion() {
        let pool = setup().await;
        let customers = SqlCustomerRepository::new(pool.clone());
        let repo = SqlVoucherRepository::new(pool.clone());

        let owner = Customer::new("apple", "apple@example.com", false).expect("customer");
        customers.insert(owner.clone()).await.expect("insert customer");
        let stored = voucher(VoucherType::FixedAmount, "3000");
        repo.insert(stored.clone()).await.expect("insert voucher");

        assert!(repo.update_owner(&stored.id, Some(owner.id)).await.expect("assign"));
        assert_eq!(repo.find_by_customer(&owner.id).await.expect("owned").len(), 1);

        customers.delete_by_id(&owner.id).await.expect("delete customer");
        let orphaned = repo.find_by_id(&stored.id).await.expect("find").expect("exists");
        assert_eq!(orphaned.customer_id, None);
    }

    #[tokio::test]
    async fn update_rewrites_discount_and_keeps_creation_time() {
        let repo = SqlVoucherRepository::new(setup().await);
        let stored = voucher(VoucherType::FixedAmount, "10");
        repo.insert(stored.clone()).await.expect("insert");

        let mut changed = stored.clone();
        changed.discount = DiscountValue::parse(VoucherType::PercentDiscount, "50").expect("valid");
        assert!(repo.update(changed.clone()).await.expect("update"));

        let found = repo.find_by_id(&stored.id).await.expect("find").expect("exists");
        assert_eq!(found.voucher_type(), VoucherType::PercentDiscount);
        assert_eq!(found.created_at, stored.created_at);

        assert!(repo.delete_by_id(&stored.id).await.expect("delete"));
        assert!(!repo.update(changed).await.expect("update missing"));
    }
}
