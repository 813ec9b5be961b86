pub mod config;
pub mod domain;
pub mod errors;

pub use domain::customer::{Customer, CustomerId};
pub use domain::discount::{DiscountValue, Price, VoucherType};
pub use domain::voucher::{Voucher, VoucherId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
