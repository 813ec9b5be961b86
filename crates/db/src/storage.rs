use std::path::Path;
use std::sync::Arc;

use tracing::info;

use vouchers_core::config::{AppConfig, StorageBackend};

use crate::repositories::{
    CustomerRepository, FileCustomerRepository, FileVoucherRepository, InMemoryCustomerRepository,
    InMemoryVoucherRepository, RepositoryError, SqlCustomerRepository, SqlVoucherRepository,
    VoucherRepository,
};
use crate::services::{CustomerService, VoucherService, WalletService};
use crate::{connect_from_config, migrations, DbPool};

/// Repositories for the configured backend, shared by every service.
#[derive(Clone)]
pub struct Storage {
    pub backend: StorageBackend,
    pub customers: Arc<dyn CustomerRepository>,
    pub vouchers: Arc<dyn VoucherRepository>,
    pub pool: Option<DbPool>,
}

impl Storage {
    /// Opens the backend selected by `config.storage.backend`. The SQL backend
    /// connects and applies pending migrations.
    pub async fn open(config: &AppConfig) -> Result<Self, RepositoryError> {
        let storage = match config.storage.backend {
            StorageBackend::Memory => Self::in_memory(),
            StorageBackend::File => Self::file(&config.storage.data_dir).await?,
            StorageBackend::Sql => {
                let pool = connect_from_config(&config.database).await?;
                migrations::run_pending(&pool).await?;
                Self::sql(pool)
            }
        };

        info!(
            event_name = "system.storage.opened",
            backend = storage.backend.as_str(),
            "storage backend opened"
        );
        Ok(storage)
    }

    pub fn in_memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            customers: Arc::new(InMemoryCustomerRepository::default()),
            vouchers: Arc::new(InMemoryVoucherRepository::default()),
            pool: None,
        }
    }

    pub async fn file(data_dir: &Path) -> Result<Self, RepositoryError> {
        Ok(Self {
            backend: StorageBackend::File,
            customers: Arc::new(FileCustomerRepository::open(data_dir).await?),
            vouchers: Arc::new(FileVoucherRepository::open(data_dir).await?),
            pool: None,
        })
    }

    pub fn sql(pool: DbPool) -> Self {
        Self {
            backend: StorageBackend::Sql,
            customers: Arc::new(SqlCustomerRepository::new(pool.clone())),
            vouchers: Arc::new(SqlVoucherRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    pub fn customer_service(&self) -> CustomerService {
        CustomerService::new(self.customers.clone(), self.vouchers.clone())
    }

    pub fn voucher_service(&self) -> VoucherService {
        VoucherService::new(self.vouchers.clone())
    }

    pub fn wallet_service(&self) -> WalletService {
        WalletService::new(self.customers.clone(), self.vouchers.clone())
    }

    /// Cheap readiness check of the backing store.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        match &self.pool {
            Some(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            None => self.vouchers.find_all().await.map(|_| ()),
        }
    }
}
