pub mod customer;
pub mod discount;
pub mod voucher;
