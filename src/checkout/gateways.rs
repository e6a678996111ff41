//! Order and payment API gateways.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde_json::json;

use crate::{
    checkout::{CreatedOrder, OrderDraft, PaymentRedirect},
    http::{ApiClient, ApiError, ApiRequest},
    orders::OrderDetail,
};

/// Order creation and retrieval.
#[automock]
#[async_trait]
pub trait OrdersGateway: Send + Sync {
    /// Submit a draft for creation. The server revalidates items and
    /// computes final pricing.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the order could not be created.
    async fn create_order(&self, draft: OrderDraft) -> Result<CreatedOrder, ApiError>;

    /// Fetch one order for the detail or tracking view.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the order could not be fetched.
    async fn fetch_order(&self, order_id: &str) -> Result<OrderDetail, ApiError>;
}

/// Payment-gateway integration for the online payment path.
#[automock]
#[async_trait]
pub trait PaymentsGateway: Send + Sync {
    /// Request the redirect URL that settles payment for `order_id`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the gateway call fails.
    async fn create_payment_url(&self, order_id: &str) -> Result<PaymentRedirect, ApiError>;
}

/// [`OrdersGateway`] over the authenticated API client.
#[derive(Debug)]
pub struct ApiOrdersGateway {
    client: Arc<ApiClient>,
}

impl ApiOrdersGateway {
    /// Create a gateway over the given client.
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrdersGateway for ApiOrdersGateway {
    async fn create_order(&self, draft: OrderDraft) -> Result<CreatedOrder, ApiError> {
        let body = serde_json::to_value(&draft).map_err(ApiError::Decode)?;

        self.client
            .execute_json(ApiRequest::post("/orders", body).authenticated())
            .await
    }

    async fn fetch_order(&self, order_id: &str) -> Result<OrderDetail, ApiError> {
        self.client
            .execute_json(ApiRequest::get(format!("/orders/{order_id}")).authenticated())
            .await
    }
}

/// [`PaymentsGateway`] over the authenticated API client.
#[derive(Debug)]
pub struct ApiPaymentsGateway {
    client: Arc<ApiClient>,
}

impl ApiPaymentsGateway {
    /// Create a gateway over the given client.
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PaymentsGateway for ApiPaymentsGateway {
    async fn create_payment_url(&self, order_id: &str) -> Result<PaymentRedirect, ApiError> {
        let body = json!({ "orderId": order_id });

        self.client
            .execute_json(ApiRequest::post("/payments/create-payment-url", body).authenticated())
            .await
    }
}
