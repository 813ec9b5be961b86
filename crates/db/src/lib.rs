pub mod connection;
pub mod migrations;
pub mod repositories;
pub mod services;
pub mod storage;

pub use connection::{connect_from_config, connect_with_settings, DbPool};
pub use repositories::{CustomerRepository, RepositoryError, VoucherRepository};
pub use services::{CustomerService, VoucherService, WalletService};
pub use storage::Storage;
