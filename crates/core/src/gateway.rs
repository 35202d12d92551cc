use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

/// Backend surface reachable through the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiService {
    Inventory,
    Order,
    User,
}

impl ApiService {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::Order => "order",
            Self::User => "user",
        }
    }
}

impl fmt::Display for ApiService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    NotFound,
    Timeout,
    Backend,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn not_found(service: ApiService, id: &str) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            message: format!("{service} record `{id}` was not found"),
        }
    }

    pub fn timeout(service: ApiService, timeout: Duration) -> Self {
        Self {
            kind: ApiErrorKind::Timeout,
            message: format!("call to {service} service timed out after {}s", timeout.as_secs()),
        }
    }

    pub fn backend(service: ApiService, detail: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Backend,
            message: format!("{service} service failed: {}", detail.into()),
        }
    }
}

/// Access to the backend services the bot consults while answering.
///
/// Implementations make a single attempt per call; retrying is left to
/// the caller and no implementation in this crate retries on its own.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    async fn call(
        &self,
        service: ApiService,
        operation: &str,
        id: &str,
    ) -> Result<Value, ApiError>;
}

// ------ demo backend ------

/// In-memory gateway seeded with a small fixed dataset, used by the
/// server and CLI when no real backend is wired up.
pub struct DemoApiGateway {
    inventory: HashMap<String, Value>,
    orders: HashMap<String, Value>,
    users: HashMap<String, Value>,
}

impl DemoApiGateway {
    pub fn new() -> Self {
        let mut inventory = HashMap::new();
        inventory.insert(
            "laptop_pro".to_string(),
            json!({
                "product_id": "laptop_pro",
                "name": "Laptop Pro",
                "available_quantity": 12,
                "last_updated": "2024-03-10",
            }),
        );
        inventory.insert(
            "smartphone_x".to_string(),
            json!({
                "product_id": "smartphone_x",
                "name": "Smartphone X",
                "available_quantity": 27,
                "last_updated": "2024-03-11",
            }),
        );
        inventory.insert(
            "headphones_wireless".to_string(),
            json!({
                "product_id": "headphones_wireless",
                "name": "Wireless Headphones",
                "available_quantity": 43,
                "last_updated": "2024-03-09",
            }),
        );

        let mut orders = HashMap::new();
        orders.insert(
            "ORD10001".to_string(),
            json!({
                "order_id": "ORD10001",
                "status": "shipped",
                "estimated_delivery": "2024-03-15",
                "tracking_number": "TRK123456789",
                "total": 149.99,
                "order_date": "2024-03-08",
            }),
        );
        orders.insert(
            "ORD10002".to_string(),
            json!({
                "order_id": "ORD10002",
                "status": "processing",
                "estimated_delivery": "2024-03-20",
                "total": 89.5,
                "order_date": "2024-03-12",
            }),
        );

        let mut users = HashMap::new();
        users.insert(
            "alice".to_string(),
            json!({
                "user_id": "alice",
                "name": "Alice Johnson",
                "email": "alice@example.com",
                "membership_level": "premium",
                "account_status": "active",
            }),
        );
        users.insert(
            "bob".to_string(),
            json!({
                "user_id": "bob",
                "name": "Bob Smith",
                "email": "bob@example.com",
                "membership_level": "standard",
                "account_status": "active",
            }),
        );

        Self { inventory, orders, users }
    }

    fn records(&self, service: ApiService) -> &HashMap<String, Value> {
        match service {
            ApiService::Inventory => &self.inventory,
            ApiService::Order => &self.orders,
            ApiService::User => &self.users,
        }
    }
}

impl Default for DemoApiGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiGateway for DemoApiGateway {
    async fn call(
        &self,
        service: ApiService,
        operation: &str,
        id: &str,
    ) -> Result<Value, ApiError> {
        let expected = match service {
            ApiService::Inventory => "get_product",
            ApiService::Order => "get_order",
            ApiService::User => "get_user",
        };
        if operation != expected {
            return Err(ApiError::backend(service, format!("unknown operation `{operation}`")));
        }

        tracing::debug!(
            event_name = "gateway.demo_call",
            service = %service,
            operation,
            id,
            "serving demo record"
        );

        self.records(service).get(id).cloned().ok_or_else(|| ApiError::not_found(service, id))
    }
}

// ------ scripted double ------

/// Gateway double that replays a scripted sequence of results and
/// records every call it receives. Meant for tests that need to force
/// specific backend outcomes.
#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Result<Value, ApiError>>>,
    calls: Mutex<Vec<(ApiService, String, String)>>,
}

impl ScriptedGateway {
    pub fn new(script: Vec<Result<Value, ApiError>>) -> Self {
        Self { script: Mutex::new(script.into()), calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<(ApiService, String, String)> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl ApiGateway for ScriptedGateway {
    async fn call(
        &self,
        service: ApiService,
        operation: &str,
        id: &str,
    ) -> Result<Value, ApiError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((service, operation.to_string(), id.to_string()));

        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::backend(service, "script exhausted")))
    }
}

// ------ timeout wrapper ------

/// Bounds every call to the wrapped gateway with a deadline. An
/// elapsed deadline resolves to [`ApiErrorKind::Timeout`] rather than
/// hanging the handler.
pub struct TimeoutApiGateway {
    inner: Arc<dyn ApiGateway>,
    timeout: Duration,
}

impl TimeoutApiGateway {
    pub fn new(inner: Arc<dyn ApiGateway>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl ApiGateway for TimeoutApiGateway {
    async fn call(
        &self,
        service: ApiService,
        operation: &str,
        id: &str,
    ) -> Result<Value, ApiError> {
        match tokio::time::timeout(self.timeout, self.inner.call(service, operation, id)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    event_name = "gateway.timeout",
                    service = %service,
                    operation,
                    timeout_secs = self.timeout.as_secs(),
                    "gateway call exceeded its deadline"
                );
                Err(ApiError::timeout(service, self.timeout))
            }
        }
    }
}
