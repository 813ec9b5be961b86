//! REST routes under `/api/v1`.
//!
//! - `/api/v1/vouchers/*`  voucher CRUD, lookups and price application
//! - `/api/v1/customers/*` customer CRUD and lookups by id, name, email
//! - `/api/v1/wallets/*`   voucher assignment to customers

use axum::Router;
use serde::Serialize;

use vouchers_db::{CustomerService, Storage, VoucherService, WalletService};

pub mod customers;
pub mod error;
pub mod vouchers;
pub mod wallets;

#[derive(Clone)]
pub struct AppState {
    pub vouchers: VoucherService,
    pub customers: CustomerService,
    pub wallets: WalletService,
}

impl AppState {
    pub fn from_storage(storage: &Storage) -> Self {
        Self {
            vouchers: storage.voucher_service(),
            customers: storage.customer_service(),
            wallets: storage.wallet_service(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeletedCount {
    pub removed: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1/vouchers", vouchers::routes())
        .nest("/api/v1/customers", customers::routes())
        .nest("/api/v1/wallets", wallets::routes())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use vouchers_db::Storage;

    use super::{router, AppState};

    pub fn app() -> Router {
        router(AppState::from_storage(&Storage::in_memory()))
    }

    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => request.body(Body::empty()).expect("request"),
        };

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }
}
