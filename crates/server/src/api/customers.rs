use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vouchers_core::domain::customer::{Customer, CustomerId};

use super::error::{ApiJson, ApiResult};
use super::{AppState, DeletedCount};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub customer_id: Uuid,
    pub name: String,
    pub email: String,
    pub blacklisted: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            customer_id: customer.id.0,
            name: customer.name,
            email: customer.email,
            blacklisted: customer.blacklisted,
            created_at: customer.created_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub blacklisted: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub blacklisted: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_customer))
        .route("/update", post(update_customer))
        .route("/all", get(list_customers).delete(delete_all_customers))
        .route("/blacklist", get(list_blacklisted_customers))
        .route("/id/{id}", get(get_customer))
        .route("/name/{name}", get(get_customer_by_name).delete(delete_customer_by_name))
        .route("/email/{email}", get(get_customer_by_email).delete(delete_customer_by_email))
        .route("/delete/{id}", delete(delete_customer))
}

fn to_responses(customers: Vec<Customer>) -> Vec<CustomerResponse> {
    customers.into_iter().map(CustomerResponse::from).collect()
}

pub async fn create_customer(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCustomerRequest>,
) -> ApiResult<(StatusCode, Json<CustomerResponse>)> {
    let customer = Customer::new(request.name, request.email, request.blacklisted)?;
    let created = state.customers.create(customer).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update_customer(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateCustomerRequest>,
) -> ApiResult<Json<CustomerResponse>> {
    let customer = Customer {
        id: CustomerId::parse(&request.customer_id)?,
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        blacklisted: request.blacklisted,
        created_at: Utc::now(),
    };
    let updated = state.customers.update(customer).await?;
    Ok(Json(updated.into()))
}

pub async fn list_customers(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CustomerResponse>>> {
    Ok(Json(to_responses(state.customers.find_all().await?)))
}

pub async fn list_blacklisted_customers(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CustomerResponse>>> {
    Ok(Json(to_responses(state.customers.find_blacklisted().await?)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CustomerResponse>> {
    let customer = state.customers.find_by_id(&CustomerId::parse(&id)?).await?;
    Ok(Json(customer.into()))
}

pub async fn get_customer_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<CustomerResponse>> {
    Ok(Json(state.customers.find_by_name(&name).await?.into()))
}

pub async fn get_customer_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<CustomerResponse>> {
    Ok(Json(state.customers.find_by_email(&email).await?.into()))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CustomerResponse>> {
    let removed = state.customers.delete_by_id(&CustomerId::parse(&id)?).await?;
    Ok(Json(removed.into()))
}

pub async fn delete_customer_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<CustomerResponse>> {
    Ok(Json(state.customers.delete_by_name(&name).await?.into()))
}

pub async fn delete_customer_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<CustomerResponse>> {
    Ok(Json(state.customers.delete_by_email(&email).await?.into()))
}

pub async fn delete_all_customers(
    State(state): State<AppState>,
) -> ApiResult<Json<DeletedCount>> {
    let removed = state.customers.delete_all().await?;
    Ok(Json(DeletedCount { removed }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use crate::api::test_support::{app, send};

    async fn create(app: &axum::Router, name: &str, blacklisted: bool) -> Value {
        let (status, created) = send(
            app,
            Method::POST,
            "/api/v1/customers/create",
            Some(json!({
                "name": name,
                "email": format!("{name}@example.com"),
                "blacklisted": blacklisted,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        created
    }

    #[tokio::test]
    async fn lookups_by_id_name_email_and_blacklist() {
        let app = app();
        let apple = create(&app, "apple", false).await;
        let kiwi = create(&app, "kiwi", true).await;
        let id = apple["customerId"].as_str().expect("id");

        let (status, by_id) =
            send(&app, Method::GET, &format!("/api/v1/customers/id/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_id, apple);

        let (_, by_name) = send(&app, Method::GET, "/api/v1/customers/name/apple", None).await;
        assert_eq!(by_name, apple);

        let (_, by_email) =
            send(&app, Method::GET, "/api/v1/customers/email/kiwi@example.com", None).await;
        assert_eq!(by_email, kiwi);

        let (_, blacklist) = send(&app, Method::GET, "/api/v1/customers/blacklist", None).await;
        assert_eq!(blacklist, json!([kiwi]));

        let (status, _) = send(&app, Method::GET, "/api/v1/customers/name/nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_customer_payload_is_rejected() {
        let app = app();
        let (status, error) = send(
            &app,
            Method::POST,
            "/api/v1/customers/create",
            Some(json!({ "name": "apple", "email": "apple" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error["detail"].as_str().expect("detail").contains("email"));
    }

    #[tokio::test]
    async fn wrongly_typed_fields_are_json_bad_requests() {
        let app = app();
        let (status, error) = send(
            &app,
            Method::POST,
            "/api/v1/customers/create",
            Some(json!({ "name": "apple", "email": "apple@example.com", "blacklisted": "yes" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error["correlationId"].is_string());
        assert!(error["detail"].as_str().expect("detail").contains("blacklisted"));
    }

    #[tokio::test]
    async fn update_flips_blacklist_flag() {
        let app = app();
        let apple = create(&app, "apple", false).await;

        let (status, updated) = send(
            &app,
            Method::POST,
            "/api/v1/customers/update",
            Some(json!({
                "customerId": apple["customerId"],
                "name": "apple",
                "email": "apple@example.com",
                "blacklisted": true,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["blacklisted"], true);
        assert_eq!(updated["createdAt"], apple["createdAt"]);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/customers/update",
            Some(json!({
                "customerId": "0b5e4b8e-0000-4000-8000-000000000000",
                "name": "ghost",
                "email": "ghost@example.com",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_by_each_key_returns_removed_customer() {
        let app = app();
        let apple = create(&app, "apple", false).await;
        create(&app, "banana", false).await;
        create(&app, "cherry", false).await;
        let id = apple["customerId"].as_str().expect("id");

        let (status, removed) =
            send(&app, Method::DELETE, &format!("/api/v1/customers/delete/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(removed, apple);

        let (status, _) = send(&app, Method::DELETE, "/api/v1/customers/name/banana", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) =
            send(&app, Method::DELETE, "/api/v1/customers/email/banana@example.com", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, removed) = send(&app, Method::DELETE, "/api/v1/customers/all", None).await;
        assert_eq!(removed, json!({ "removed": 1 }));
    }
}
