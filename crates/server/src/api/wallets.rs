use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use vouchers_core::domain::customer::CustomerId;
use vouchers_core::domain::discount::VoucherType;
use vouchers_core::domain::voucher::VoucherId;

use super::customers::CustomerResponse;
use super::error::{ApiJson, ApiResult};
use super::vouchers::VoucherResponse;
use super::AppState;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignVoucherRequest {
    pub voucher_id: String,
    pub customer_id: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawVoucherRequest {
    pub voucher_id: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assign", post(assign_voucher))
        .route("/withdraw", post(withdraw_voucher))
        .route("/customer/{customer_id}/vouchers", get(list_customer_vouchers))
        .route("/voucher/{voucher_id}/customer", get(get_voucher_owner))
        .route("/voucher-type/{voucher_type}/customers", get(list_customers_by_voucher_type))
}

pub async fn assign_voucher(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AssignVoucherRequest>,
) -> ApiResult<Json<VoucherResponse>> {
    let voucher_id = VoucherId::parse(&request.voucher_id)?;
    let customer_id = CustomerId::parse(&request.customer_id)?;
    let assigned = state.wallets.assign(&voucher_id, &customer_id).await?;
    Ok(Json(assigned.into()))
}

pub async fn withdraw_voucher(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<WithdrawVoucherRequest>,
) -> ApiResult<Json<VoucherResponse>> {
    let voucher_id = VoucherId::parse(&request.voucher_id)?;
    Ok(Json(state.wallets.withdraw(&voucher_id).await?.into()))
}

pub async fn list_customer_vouchers(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> ApiResult<Json<Vec<VoucherResponse>>> {
    let vouchers = state.wallets.vouchers_of(&CustomerId::parse(&customer_id)?).await?;
    Ok(Json(vouchers.into_iter().map(VoucherResponse::from).collect()))
}

pub async fn get_voucher_owner(
    State(state): State<AppState>,
    Path(voucher_id): Path<String>,
) -> ApiResult<Json<CustomerResponse>> {
    let owner = state.wallets.customer_of(&VoucherId::parse(&voucher_id)?).await?;
    Ok(Json(owner.into()))
}

pub async fn list_customers_by_voucher_type(
    State(state): State<AppState>,
    Path(voucher_type): Path<String>,
) -> ApiResult<Json<Vec<CustomerResponse>>> {
    let voucher_type: VoucherType = voucher_type.parse()?;
    let owners = state.wallets.customers_by_voucher_type(voucher_type).await?;
    Ok(Json(owners.into_iter().map(CustomerResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::api::test_support::{app, send};

    #[tokio::test]
    async fn assign_query_and_withdraw_round() {
        let app = app();
        let (_, customer) = send(
            &app,
            Method::POST,
            "/api/v1/customers/create",
            Some(json!({ "name": "apple", "email": "apple@example.com" })),
        )
        .await;
        let (_, voucher) = send(
            &app,
            Method::POST,
            "/api/v1/vouchers/create",
            Some(json!({ "voucherType": "percent", "discountValue": 10 })),
        )
        .await;
        let customer_id = customer["customerId"].as_str().expect("customer id").to_string();
        let voucher_id = voucher["voucherId"].as_str().expect("voucher id").to_string();

        let (status, assigned) = send(
            &app,
            Method::POST,
            "/api/v1/wallets/assign",
            Some(json!({ "voucherId": voucher_id, "customerId": customer_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(assigned["customerId"], customer["customerId"]);

        let wallet_uri = format!("/api/v1/wallets/customer/{customer_id}/vouchers");
        let (_, held) = send(&app, Method::GET, &wallet_uri, None).await;
        assert_eq!(held, json!([assigned]));

        let owner_uri = format!("/api/v1/wallets/voucher/{voucher_id}/customer");
        let (status, owner) = send(&app, Method::GET, &owner_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(owner, customer);

        let (_, owners) =
            send(&app, Method::GET, "/api/v1/wallets/voucher-type/2/customers", None).await;
        assert_eq!(owners, json!([customer]));

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/wallets/withdraw",
            Some(json!({ "voucherId": voucher_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, held) = send(&app, Method::GET, &wallet_uri, None).await;
        assert_eq!(held, json!([]));
        let (status, _) = send(&app, Method::GET, &owner_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn assign_to_missing_customer_is_not_found() {
        let app = app();
        let (_, voucher) = send(
            &app,
            Method::POST,
            "/api/v1/vouchers/create",
            Some(json!({ "voucherType": "fixed", "discountValue": 10 })),
        )
        .await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/wallets/assign",
            Some(json!({
                "voucherId": voucher["voucherId"],
                "customerId": "0b5e4b8e-0000-4000-8000-000000000000",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_voucher_id_is_a_json_bad_request() {
        let app = app();
        let (status, error) = send(
            &app,
            Method::POST,
            "/api/v1/wallets/withdraw",
            Some(json!({ "customerId": "0b5e4b8e-0000-4000-8000-000000000000" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error["correlationId"].is_string());
    }
}
