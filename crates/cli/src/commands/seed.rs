use rust_decimal::Decimal;
use vouchers_core::domain::customer::Customer;
use vouchers_core::domain::discount::{DiscountValue, VoucherType};
use vouchers_core::domain::voucher::Voucher;
use vouchers_core::errors::ApplicationError;
use vouchers_db::{CustomerService, Storage, VoucherService, WalletService};

use crate::commands::{prepare, CommandResult, StepFailure};

/// Demo customers: (name, email, blacklisted).
const DEMO_CUSTOMERS: [(&str, &str, bool); 3] = [
    ("alice", "alice@example.com", false),
    ("bob", "bob@example.com", false),
    ("mallory", "mallory@example.com", true),
];

/// Demo vouchers: (type, discount, owner name).
const DEMO_VOUCHERS: [(VoucherType, i64, Option<&str>); 3] = [
    (VoucherType::FixedAmount, 1_000, Some("alice")),
    (VoucherType::PercentDiscount, 15, Some("bob")),
    (VoucherType::PercentDiscount, 50, None),
];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers_created: usize,
    pub vouchers_created: usize,
}

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let storage =
            Storage::open(&config).await.map_err(|error| ("storage_init", error.to_string(), 4u8))?;
        let summary = seed_storage(&storage)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
        if let Some(pool) = &storage.pool {
            pool.close().await;
        }
        Ok::<SeedSummary, StepFailure>(summary)
    });

    match result {
        Ok(summary) => CommandResult::success(
            "seed",
            format!(
                "demo data loaded into {} storage: {} customers created, {} vouchers created",
                config.storage.backend.as_str(),
                summary.customers_created,
                summary.vouchers_created
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

/// Inserts the demo dataset, skipping customers whose name is already taken and
/// vouchers already held by their demo owner.
pub async fn seed_storage(storage: &Storage) -> Result<SeedSummary, ApplicationError> {
    let customers = storage.customer_service();
    let vouchers = storage.voucher_service();
    let wallets = storage.wallet_service();
    let mut summary = SeedSummary::default();

    for (name, email, blacklisted) in DEMO_CUSTOMERS {
        if find_customer(&customers, name).await?.is_none() {
            customers.create(Customer::new(name, email, blacklisted)?).await?;
            summary.customers_created += 1;
        }
    }

    for (voucher_type, amount, owner) in DEMO_VOUCHERS {
        let discount = DiscountValue::new(voucher_type, Decimal::from(amount))?;
        if voucher_present(&customers, &vouchers, &wallets, &discount, owner).await? {
            continue;
        }

        let created = vouchers.create(Voucher::new(discount)).await?;
        if let Some(owner) = owner {
            let customer = customers.find_by_name(owner).await?;
            wallets.assign(&created.id, &customer.id).await?;
        }
        summary.vouchers_created += 1;
    }

    Ok(summary)
}

async fn find_customer(
    customers: &CustomerService,
    name: &str,
) -> Result<Option<Customer>, ApplicationError> {
    match customers.find_by_name(name).await {
        Ok(customer) => Ok(Some(customer)),
        Err(ApplicationError::NotFound { .. }) => Ok(None),
        Err(error) => Err(error),
    }
}

async fn voucher_present(
    customers: &CustomerService,
    vouchers: &VoucherService,
    wallets: &WalletService,
    discount: &DiscountValue,
    owner: Option<&str>,
) -> Result<bool, ApplicationError> {
    let candidates = match owner {
        Some(owner) => {
            let customer = customers.find_by_name(owner).await?;
            wallets.vouchers_of(&customer.id).await?
        }
        None => vouchers
            .find_all()
            .await?
            .into_iter()
            .filter(|voucher| voucher.customer_id.is_none())
            .collect(),
    };
    Ok(candidates.iter().any(|voucher| &voucher.discount == discount))
}
