//! HTTP client for network-based API calls

use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::ApiResponse;
use shared::kitchen::{KitchenItemUpdate, KitchenTicket, OrderSource, TicketAdvance};
use shared::models::{
    AddItemsRequest, DriverOrder, LoginRequest, LoginResponse, OpenTableRequest, Order,
    OrderDetail, OrderStatus, OrderStatusUpdate, PlaceOrderRequest, PublicMenu, StaffUser,
    TableBill, TableOrderDetail, TableOverview,
};

use crate::{ClientConfig, ClientError, ClientResult};

/// HTTP client for mesa-server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            // Error bodies are `ApiResponse<()>` with a non-zero code
            let body: ApiResponse<()> = serde_json::from_slice(&bytes).map_err(|_| {
                ClientError::InvalidResponse(format!(
                    "HTTP {status}: {}",
                    String::from_utf8_lossy(&bytes)
                ))
            })?;
            return match body.into_result() {
                Err(app_error) => Err(ClientError::Api(app_error)),
                Ok(_) => Err(ClientError::InvalidResponse(format!(
                    "HTTP {status} without an error code"
                ))),
            };
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        Self::send(self.request(Method::GET, path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        Self::send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        Self::send(self.request(Method::POST, path)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        Self::send(self.request(Method::PATCH, path).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        Self::send(self.request(Method::DELETE, path)).await
    }

    // ========== Auth API ==========

    /// Log in and keep the returned token for later calls
    pub async fn login(
        &mut self,
        store_slug: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<LoginResponse> {
        let request = LoginRequest {
            store_slug: store_slug.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post("/api/auth/login", &request).await?;
        self.token = Some(response.token.clone());
        Ok(response)
    }

    pub async fn me(&self) -> ClientResult<StaffUser> {
        self.get("/api/auth/me").await
    }

    // ========== Public API ==========

    pub async fn public_menu(&self, slug: &str) -> ClientResult<PublicMenu> {
        self.get(&format!("/api/public/stores/{slug}")).await
    }

    pub async fn place_order(&self, slug: &str, order: &PlaceOrderRequest) -> ClientResult<OrderDetail> {
        self.post(&format!("/api/public/stores/{slug}/orders"), order)
            .await
    }

    pub async fn track_order(&self, code: &str) -> ClientResult<OrderDetail> {
        self.get(&format!("/api/public/orders/{code}")).await
    }

    // ========== PDV API ==========

    pub async fn tables(&self) -> ClientResult<Vec<TableOverview>> {
        self.get("/api/pdv/tables").await
    }

    pub async fn open_table(&self, table_id: i64, request: &OpenTableRequest) -> ClientResult<TableOrderDetail> {
        self.post(&format!("/api/pdv/tables/{table_id}/open"), request)
            .await
    }

    pub async fn add_items(&self, order_id: i64, request: &AddItemsRequest) -> ClientResult<TableOrderDetail> {
        self.post(&format!("/api/pdv/orders/{order_id}/items"), request)
            .await
    }

    pub async fn close_table(&self, table_id: i64) -> ClientResult<TableBill> {
        self.post_empty(&format!("/api/pdv/tables/{table_id}/close"))
            .await
    }

    // ========== Kitchen API ==========

    pub async fn kitchen_tickets(&self, include_ready: bool) -> ClientResult<Vec<KitchenTicket>> {
        self.get(&format!("/api/kitchen/tickets?include_ready={include_ready}"))
            .await
    }

    pub async fn advance_ticket(&self, source: OrderSource, order_id: i64) -> ClientResult<TicketAdvance> {
        self.post_empty(&format!("/api/kitchen/tickets/{source}/{order_id}/advance"))
            .await
    }

    pub async fn update_kitchen_item(
        &self,
        source: OrderSource,
        item_id: i64,
        update: &KitchenItemUpdate,
    ) -> ClientResult<TicketAdvance> {
        self.patch(&format!("/api/kitchen/items/{source}/{item_id}"), update)
            .await
    }

    // ========== Orders API ==========

    pub async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> ClientResult<Order> {
        self.patch(
            &format!("/api/orders/{order_id}/status"),
            &OrderStatusUpdate { status },
        )
        .await
    }

    // ========== Driver API ==========

    /// Orders assigned to the logged-in driver
    pub async fn driver_orders(&self) -> ClientResult<Vec<DriverOrder>> {
        self.get("/api/driver/orders").await
    }

    pub async fn pickup(&self, order_id: i64) -> ClientResult<Order> {
        self.post_empty(&format!("/api/driver/orders/{order_id}/pickup"))
            .await
    }

    pub async fn deliver(&self, order_id: i64) -> ClientResult<Order> {
        self.post_empty(&format!("/api/driver/orders/{order_id}/deliver"))
            .await
    }
}
