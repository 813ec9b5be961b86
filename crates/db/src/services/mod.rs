//! Application services that enforce existence rules on top of the repositories.

pub mod customer;
pub mod voucher;
pub mod wallet;

pub use customer::CustomerService;
pub use voucher::VoucherService;
pub use wallet::WalletService;
