//! JSON-lines file storage.
//!
//! Each file holds one serialized record per line. Inserts append a line;
//! updates and deletes rewrite the whole file through a sibling temp file that
//! is renamed over the original.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use vouchers_core::domain::customer::{Customer, CustomerId};
use vouchers_core::domain::discount::{DiscountValue, VoucherType};
use vouchers_core::domain::voucher::{Voucher, VoucherId};

use super::{sort_customers, sort_vouchers, CustomerRepository, RepositoryError, VoucherRepository};

pub const CUSTOMERS_FILE: &str = "customers.jsonl";
pub const VOUCHERS_FILE: &str = "vouchers.jsonl";

struct JsonLinesFile<R> {
    path: PathBuf,
    guard: Mutex<()>,
    _record: PhantomData<fn() -> R>,
}

impl<R> JsonLinesFile<R>
where
    R: Serialize + DeserializeOwned,
{
    async fn open(path: PathBuf) -> Result<Self, RepositoryError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(Self { path, guard: Mutex::new(()), _record: PhantomData })
    }

    async fn read_all(&self) -> Result<Vec<R>, RepositoryError> {
        let _guard = self.guard.lock().await;
        self.read_unlocked().await
    }

    async fn read_unlocked(&self) -> Result<Vec<R>, RepositoryError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        raw.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str::<R>(line).map_err(|error| {
                    RepositoryError::Decode(format!(
                        "{}:{}: {error}",
                        self.path.display(),
                        index + 1
                    ))
                })
            })
            .collect()
    }

    async fn append(&self, record: &R) -> Result<(), RepositoryError> {
        let _guard = self.guard.lock().await;
        let mut line = encode(record)?;
        line.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Applies `edit` to the current records and writes the result back.
    async fn rewrite<T>(
        &self,
        edit: impl FnOnce(&mut Vec<R>) -> T,
    ) -> Result<T, RepositoryError> {
        let _guard = self.guard.lock().await;
        let mut records = self.read_unlocked().await?;
        let outcome = edit(&mut records);

        let mut contents = String::new();
        for record in &records {
            contents.push_str(&encode(record)?);
            contents.push('\n');
        }

        let temp_path = temp_path_for(&self.path);
        fs::write(&temp_path, contents.as_bytes()).await?;
        fs::rename(&temp_path, &self.path).await?;
        Ok(outcome)
    }
}

fn encode<R: Serialize>(record: &R) -> Result<String, RepositoryError> {
    serde_json::to_string(record).map_err(|error| RepositoryError::Decode(error.to_string()))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerRecord {
    customer_id: Uuid,
    name: String,
    email: String,
    blacklisted: bool,
    created_at: DateTime<Utc>,
}

impl From<&Customer> for CustomerRecord {
    fn from(customer: &Customer) -> Self {
        Self {
            customer_id: customer.id.0,
            name: customer.name.clone(),
            email: customer.email.clone(),
            blacklisted: customer.blacklisted,
            created_at: customer.created_at,
        }
    }
}

impl TryFrom<CustomerRecord> for Customer {
    type Error = RepositoryError;

    fn try_from(record: CustomerRecord) -> Result<Self, Self::Error> {
        let customer = Customer {
            id: CustomerId(record.customer_id),
            name: record.name,
            email: record.email,
            blacklisted: record.blacklisted,
            created_at: record.created_at,
        };
        customer.validate().map_err(|error| RepositoryError::Decode(error.to_string()))?;
        Ok(customer)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoucherRecord {
    voucher_id: Uuid,
    voucher_type: VoucherType,
    discount_value: Decimal,
    created_at: DateTime<Utc>,
    customer_id: Option<Uuid>,
}

impl From<&Voucher> for VoucherRecord {
    fn from(voucher: &Voucher) -> Self {
        Self {
            voucher_id: voucher.id.0,
            voucher_type: voucher.voucher_type(),
            discount_value: voucher.discount.value(),
            created_at: voucher.created_at,
            customer_id: voucher.customer_id.map(|id| id.0),
        }
    }
}

impl TryFrom<VoucherRecord> for Voucher {
    type Error = RepositoryError;

    fn try_from(record: VoucherRecord) -> Result<Self, Self::Error> {
        let discount = DiscountValue::new(record.voucher_type, record.discount_value)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        Ok(Voucher {
            id: VoucherId(record.voucher_id),
            discount,
            created_at: record.created_at,
            customer_id: record.customer_id.map(CustomerId),
        })
    }
}

pub struct FileCustomerRepository {
    file: JsonLinesFile<CustomerRecord>,
}

impl FileCustomerRepository {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let file = JsonLinesFile::open(data_dir.as_ref().join(CUSTOMERS_FILE)).await?;
        Ok(Self { file })
    }

    async fn load(&self) -> Result<Vec<Customer>, RepositoryError> {
        let mut customers = self
            .file
            .read_all()
            .await?
            .into_iter()
            .map(Customer::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        sort_customers(&mut customers);
        Ok(customers)
    }
}

#[async_trait::async_trait]
impl CustomerRepository for FileCustomerRepository {
    async fn insert(&self, customer: Customer) -> Result<(), RepositoryError> {
        if self.find_by_id(&customer.id).await?.is_some() {
            return Err(RepositoryError::Conflict(customer.id.to_string()));
        }
        self.file.append(&CustomerRecord::from(&customer)).await
    }

    async fn update(&self, customer: Customer) -> Result<bool, RepositoryError> {
        let replacement = CustomerRecord::from(&customer);
        self.file
            .rewrite(|records| match records.iter_mut().find(|r| r.customer_id == customer.id.0) {
                Some(record) => {
                    *record = replacement;
                    true
                }
                None => false,
            })
            .await
    }

    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        self.load().await
    }

    async fn find_blacklisted(&self) -> Result<Vec<Customer>, RepositoryError> {
        Ok(self.load().await?.into_iter().filter(|customer| customer.blacklisted).collect())
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.load().await?.into_iter().find(|customer| customer.id == *id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.load().await?.into_iter().find(|customer| customer.name == name))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.load().await?.into_iter().find(|customer| customer.email == email))
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        self.file
            .rewrite(|records| {
                let removed = records.len() as u64;
                records.clear();
                removed
            })
            .await
    }

    async fn delete_by_id(&self, id: &CustomerId) -> Result<bool, RepositoryError> {
        self.file
            .rewrite(|records| {
                let before = records.len();
                records.retain(|record| record.customer_id != id.0);
                records.len() != before
            })
            .await
    }
}

pub struct FileVoucherRepository {
    file: JsonLinesFile<VoucherRecord>,
}

impl FileVoucherRepository {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let file = JsonLinesFile::open(data_dir.as_ref().join(VOUCHERS_FILE)).await?;
        Ok(Self { file })
    }

    async fn load(&self) -> Result<Vec<Voucher>, RepositoryError> {
        let mut vouchers = self
            .file
            .read_all()
            .await?
            .into_iter()
            .map(Voucher::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        sort_vouchers(&mut vouchers);
        Ok(vouchers)
    }

    async fn load_where(
        &self,
        predicate: impl Fn(&Voucher) -> bool,
    ) -> Result<Vec<Voucher>, RepositoryError> {
        Ok(self.load().await?.into_iter().filter(|voucher| predicate(voucher)).collect())
    }
}

#[async_trait::async_trait]
impl VoucherRepository for FileVoucherRepository {
    async fn insert(&self, voucher: Voucher) -> Result<(), RepositoryError> {
        if self.find_by_id(&voucher.id).await?.is_some() {
            return Err(RepositoryError::Conflict(voucher.id.to_string()));
        }
        self.file.append(&VoucherRecord::from(&voucher)).await
    }

    async fn update(&self, voucher: Voucher) -> Result<bool, RepositoryError> {
        let replacement = VoucherRecord::from(&voucher);
        self.file
            .rewrite(|records| match records.iter_mut().find(|r| r.voucher_id == voucher.id.0) {
                Some(record) => {
                    *record = replacement;
                    true
                }
                None => false,
            })
            .await
    }

    async fn find_all(&self) -> Result<Vec<Voucher>, RepositoryError> {
        self.load().await
    }

    async fn find_by_id(&self, id: &VoucherId) -> Result<Option<Voucher>, RepositoryError> {
        Ok(self.load().await?.into_iter().find(|voucher| voucher.id == *id))
    }

    async fn find_by_type(
        &self,
        voucher_type: VoucherType,
    ) -> Result<Vec<Voucher>, RepositoryError> {
        self.load_where(|voucher| voucher.voucher_type() == voucher_type).await
    }

    async fn find_by_created_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Voucher>, RepositoryError> {
        self.load_where(|voucher| voucher.created_on() == date).await
    }

    async fn find_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Voucher>, RepositoryError> {
        self.load_where(|voucher| voucher.is_owned_by(customer_id)).await
    }

    async fn update_owner(
        &self,
        id: &VoucherId,
        customer_id: Option<CustomerId>,
    ) -> Result<bool, RepositoryError> {
        self.file
            .rewrite(|records| match records.iter_mut().find(|r| r.voucher_id == id.0) {
                Some(record) => {
                    record.customer_id = customer_id.map(|owner| owner.0);
                    true
                }
                None => false,
            })
            .await
    }

    async fn clear_owner_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<u64, RepositoryError> {
        self.file
            .rewrite(|records| {
                let mut cleared = 0;
                for record in records.iter_mut().filter(|r| r.customer_id == Some(customer_id.0)) {
                    record.customer_id = None;
                    cleared += 1;
                }
                cleared
            })
            .await
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        self.file
            .rewrite(|records| {
                let removed = records.len() as u64;
                records.clear();
                removed
            })
            .await
    }

    async fn delete_by_id(&self, id: &VoucherId) -> Result<bool, RepositoryError> {
        self.file
            .rewrite(|records| {
                let before = records.len();
                records.retain(|record| record.voucher_id != id.0);
                records.len() != before
            })
            .await
    }
}
