//! Scripted in-memory backend for driving console commands.
//!
//! Every endpoint has a queue of replies. A reply can be held behind a
//! oneshot gate so tests decide the order in which overlapping requests
//! complete.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use bakery_client::{BakeryApi, ClientError, ClientResult, MemoryTokenStore, SharedToken, TokenStore};
use bakery_console::{AppState, StateOptions};
use bakery_core::{
    AuthSuccess, Bill, BillRequest, CategoryValue, Credentials, DailyIncomeSeries, DateRange,
    IncomeStats, InventorySummary, Money, Product, ProductDraft, Registration, User,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::oneshot;

pub const LOGIN: &str = "login";
pub const REGISTER: &str = "register";
pub const VERIFY: &str = "verify";
pub const LIST_PRODUCTS: &str = "list_products";
pub const CREATE_PRODUCT: &str = "create_product";
pub const UPDATE_PRODUCT: &str = "update_product";
pub const DELETE_PRODUCT: &str = "delete_product";
pub const INVENTORY_TOTAL: &str = "inventory_total";
pub const CATEGORY_VALUES: &str = "category_values";
pub const INCOME_STATS: &str = "income_stats";
pub const DAILY_INCOME: &str = "daily_income";
pub const GENERATE_BILL: &str = "generate_bill";
pub const LIST_BILLS: &str = "list_bills";
pub const GET_BILL: &str = "get_bill";
pub const TODAY_INCOME: &str = "today_income";
pub const UPDATE_TODAY_INCOME: &str = "update_today_income";

// =============================================================================
// Fake API
// =============================================================================

pub enum Reply {
    Ok(Value),
    Err(ClientError),
    Panic,
}

struct Scripted {
    reply: Reply,
    gate: Option<oneshot::Receiver<()>>,
}

#[derive(Default)]
struct Script {
    queues: HashMap<&'static str, VecDeque<Scripted>>,
    calls: HashMap<&'static str, usize>,
    verified: Vec<String>,
}

/// Cloneable handle; clones share one script.
#[derive(Clone, Default)]
pub struct FakeApi {
    script: Arc<Mutex<Script>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, endpoint: &'static str, reply: Reply, gate: Option<oneshot::Receiver<()>>) {
        self.script
            .lock()
            .unwrap()
            .queues
            .entry(endpoint)
            .or_default()
            .push_back(Scripted { reply, gate });
    }

    pub fn ok(&self, endpoint: &'static str, body: Value) -> &Self {
        self.push(endpoint, Reply::Ok(body), None);
        self
    }

    pub fn fail(&self, endpoint: &'static str, err: ClientError) -> &Self {
        self.push(endpoint, Reply::Err(err), None);
        self
    }

    pub fn panic_on(&self, endpoint: &'static str) -> &Self {
        self.push(endpoint, Reply::Panic, None);
        self
    }

    /// Queues a reply that is held until the returned sender fires.
    pub fn gated(&self, endpoint: &'static str, reply: Reply) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(endpoint, reply, Some(rx));
        tx
    }

    pub fn calls(&self, endpoint: &'static str) -> usize {
        self.script
            .lock()
            .unwrap()
            .calls
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.script.lock().unwrap().calls.values().sum()
    }

    /// Tokens passed to `verify_token`, in call order.
    pub fn verified_tokens(&self) -> Vec<String> {
        self.script.lock().unwrap().verified.clone()
    }

    async fn answer<T: DeserializeOwned>(&self, endpoint: &'static str) -> ClientResult<T> {
        let next = {
            let mut script = self.script.lock().unwrap();
            *script.calls.entry(endpoint).or_default() += 1;
            script.queues.get_mut(endpoint).and_then(VecDeque::pop_front)
        };
        let Some(scripted) = next else {
            return Err(ClientError::Transport(format!("no reply scripted for {}", endpoint)));
        };
        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        match scripted.reply {
            Reply::Ok(body) => Ok(serde_json::from_value(body)?),
            Reply::Err(err) => Err(err),
            Reply::Panic => panic!("scripted panic in {}", endpoint),
        }
    }
}

impl BakeryApi for FakeApi {
    async fn login(&self, _credentials: &Credentials) -> ClientResult<AuthSuccess> {
        self.answer(LOGIN).await
    }

    async fn register(&self, _registration: &Registration) -> ClientResult<()> {
        self.answer(REGISTER).await
    }

    async fn verify_token(&self, token: &str) -> ClientResult<User> {
        self.script.lock().unwrap().verified.push(token.to_string());
        self.answer(VERIFY).await
    }

    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.answer(LIST_PRODUCTS).await
    }

    async fn create_product(&self, _draft: &ProductDraft) -> ClientResult<Product> {
        self.answer(CREATE_PRODUCT).await
    }

    async fn update_product(&self, _id: &str, _draft: &ProductDraft) -> ClientResult<Product> {
        self.answer(UPDATE_PRODUCT).await
    }

    async fn delete_product(&self, _id: &str) -> ClientResult<()> {
        self.answer(DELETE_PRODUCT).await
    }

    async fn inventory_total(&self) -> ClientResult<InventorySummary> {
        self.answer(INVENTORY_TOTAL).await
    }

    async fn category_values(&self) -> ClientResult<Vec<CategoryValue>> {
        self.answer(CATEGORY_VALUES).await
    }

    async fn income_stats(&self, _period: &str) -> ClientResult<IncomeStats> {
        self.answer(INCOME_STATS).await
    }

    async fn daily_income(&self, _range: &DateRange) -> ClientResult<DailyIncomeSeries> {
        self.answer(DAILY_INCOME).await
    }

    async fn generate_bill(&self, _request: &BillRequest) -> ClientResult<Bill> {
        self.answer(GENERATE_BILL).await
    }

    async fn list_bills(&self) -> ClientResult<Vec<Bill>> {
        self.answer(LIST_BILLS).await
    }

    async fn get_bill(&self, _id: &str) -> ClientResult<Bill> {
        self.answer(GET_BILL).await
    }

    async fn today_income(&self) -> ClientResult<Money> {
        self.answer(TODAY_INCOME).await
    }

    async fn update_today_income(&self, _amount: Money) -> ClientResult<Money> {
        self.answer(UPDATE_TODAY_INCOME).await
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub api: FakeApi,
    pub state: AppState<FakeApi>,
    pub tokens: Arc<MemoryTokenStore>,
    pub slot: SharedToken,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(MemoryTokenStore::new(), StateOptions::default())
    }

    /// Boots with `token` already persisted, as after a previous run.
    pub fn with_persisted(token: &str) -> Self {
        Self::build(MemoryTokenStore::with_token(token), StateOptions::default())
    }

    pub fn build(store: MemoryTokenStore, options: StateOptions) -> Self {
        let api = FakeApi::new();
        let tokens = Arc::new(store);
        let slot = SharedToken::default();
        let state = AppState::new(
            api.clone(),
            slot.clone(),
            Arc::clone(&tokens) as Arc<dyn TokenStore>,
            options,
        );
        Harness {
            api,
            state,
            tokens,
            slot,
        }
    }

    pub fn persisted(&self) -> Option<String> {
        self.tokens.load().unwrap()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn user_json() -> Value {
    json!({ "_id": "u1", "name": "Asha", "email": "asha@bakery.test", "role": "admin" })
}

pub fn auth_json(token: &str) -> Value {
    json!({ "token": token, "user": user_json() })
}

pub fn product_json(id: &str, name: &str, stock: i64) -> Value {
    json!({
        "_id": id,
        "name": name,
        "category": "Bread",
        "costPrice": 40,
        "currentStock": stock,
        "minimumStockLevel": 5
    })
}

pub fn bill_json(id: &str, total: f64) -> Value {
    json!({
        "_id": id,
        "items": [
            { "_id": "i1", "product": { "_id": "p1", "name": "Pav" }, "quantity": 2, "cost": total }
        ],
        "totalCost": total,
        "paymentMethod": "cash",
        "createdAt": "2026-10-16T09:30:00Z"
    })
}

pub fn unauthorized(message: &str) -> ClientError {
    ClientError::Unauthorized {
        message: Some(message.to_string()),
    }
}

pub fn rejected(status: u16, message: &str) -> ClientError {
    ClientError::from_status(status, Some(message.to_string()))
}
