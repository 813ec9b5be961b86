use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use vouchers_core::domain::discount::{DiscountValue, Price, VoucherType};
use vouchers_core::domain::voucher::{Voucher, VoucherId};
use vouchers_core::errors::DomainError;

use super::error::{ApiJson, ApiResult};
use super::{AppState, DeletedCount};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherResponse {
    pub voucher_id: Uuid,
    pub voucher_type: VoucherType,
    pub discount_value: Decimal,
    pub created_at: DateTime<Utc>,
    pub customer_id: Option<Uuid>,
}

impl From<Voucher> for VoucherResponse {
    fn from(voucher: Voucher) -> Self {
        Self {
            voucher_id: voucher.id.0,
            voucher_type: voucher.voucher_type(),
            discount_value: voucher.discount.value(),
            created_at: voucher.created_at,
            customer_id: voucher.customer_id.map(|id| id.0),
        }
    }
}

/// `voucherType` accepts an ordinal (`1`, `2`) or a name (`fixed`, `PERCENT_DISCOUNT`, ...).
/// `discountValue` may be a JSON number or a numeric string.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVoucherRequest {
    pub voucher_type: String,
    pub discount_value: Value,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVoucherRequest {
    pub voucher_id: String,
    pub voucher_type: String,
    pub discount_value: Value,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApplyVoucherRequest {
    pub price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyVoucherResponse {
    pub voucher_id: Uuid,
    pub original_price: Decimal,
    pub discounted_price: Decimal,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_voucher))
        .route("/update", post(update_voucher))
        .route("/all", get(list_vouchers).delete(delete_all_vouchers))
        .route("/id/{id}", get(get_voucher))
        .route("/id/{id}/apply", post(apply_voucher))
        .route("/type/{voucher_type}", get(list_vouchers_by_type))
        .route("/created-date/{date}", get(list_vouchers_by_created_date))
        .route("/delete/{id}", delete(delete_voucher))
}

fn discount_from(voucher_type: &str, value: &Value) -> Result<DiscountValue, DomainError> {
    let raw = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    DiscountValue::parse(voucher_type.parse()?, &raw)
}

pub async fn create_voucher(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateVoucherRequest>,
) -> ApiResult<(StatusCode, Json<VoucherResponse>)> {
    let discount = discount_from(&request.voucher_type, &request.discount_value)?;
    let created = state.vouchers.create(Voucher::new(discount)).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update_voucher(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateVoucherRequest>,
) -> ApiResult<Json<VoucherResponse>> {
    let id = VoucherId::parse(&request.voucher_id)?;
    let discount = discount_from(&request.voucher_type, &request.discount_value)?;
    let updated = state.vouchers.update(&id, discount).await?;
    Ok(Json(updated.into()))
}

pub async fn list_vouchers(State(state): State<AppState>) -> ApiResult<Json<Vec<VoucherResponse>>> {
    let vouchers = state.vouchers.find_all().await?;
    Ok(Json(vouchers.into_iter().map(VoucherResponse::from).collect()))
}

pub async fn get_voucher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<VoucherResponse>> {
    let voucher = state.vouchers.find_by_id(&VoucherId::parse(&id)?).await?;
    Ok(Json(voucher.into()))
}

pub async fn list_vouchers_by_type(
    State(state): State<AppState>,
    Path(voucher_type): Path<String>,
) -> ApiResult<Json<Vec<VoucherResponse>>> {
    let voucher_type: VoucherType = voucher_type.parse()?;
    let vouchers = state.vouchers.find_by_type(voucher_type).await?;
    Ok(Json(vouchers.into_iter().map(VoucherResponse::from).collect()))
}

pub async fn list_vouchers_by_created_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<Vec<VoucherResponse>>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::MalformedDate(date.trim().to_string()))?;
    let vouchers = state.vouchers.find_by_created_date(date).await?;
    Ok(Json(vouchers.into_iter().map(VoucherResponse::from).collect()))
}

pub async fn apply_voucher(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ApplyVoucherRequest>,
) -> ApiResult<Json<ApplyVoucherResponse>> {
    let id = VoucherId::parse(&id)?;
    let price = Price::new(request.price)?;
    let discounted = state.vouchers.apply(&id, price).await?;
    Ok(Json(ApplyVoucherResponse {
        voucher_id: id.0,
        original_price: price.value(),
        discounted_price: discounted.value(),
    }))
}

pub async fn delete_voucher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<VoucherResponse>> {
    let removed = state.vouchers.delete_by_id(&VoucherId::parse(&id)?).await?;
    Ok(Json(removed.into()))
}

pub async fn delete_all_vouchers(State(state): State<AppState>) -> ApiResult<Json<DeletedCount>> {
    let removed = state.vouchers.delete_all().await?;
    Ok(Json(DeletedCount { removed }))
}
