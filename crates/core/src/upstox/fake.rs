//! Recording transport used by unit tests across the crate.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::models::{TokenExchangeForm, TokenResponse};
use super::transport::{ProviderCall, ProviderTransport};
use crate::errors::{Error, Result};

#[derive(Default, Clone)]
pub struct FakeTransport {
    pub calls: Arc<Mutex<Vec<ProviderCall>>>,
    pub exchanges: Arc<Mutex<Vec<TokenExchangeForm>>>,
    get_results: Arc<Mutex<VecDeque<Result<Value>>>>,
    exchange_results: Arc<Mutex<VecDeque<Result<TokenResponse>>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_get(&self, result: Result<Value>) {
        self.get_results.lock().unwrap().push_back(result);
    }

    pub fn push_exchange(&self, result: Result<TokenResponse>) {
        self.exchange_results.lock().unwrap().push_back(result);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<ProviderCall> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ProviderTransport for FakeTransport {
    async fn get_json(&self, call: ProviderCall) -> Result<Value> {
        self.calls.lock().unwrap().push(call);
        self.get_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"status": "success", "data": {}})))
    }

    async fn exchange_token(&self, form: TokenExchangeForm) -> Result<TokenResponse> {
        self.exchanges.lock().unwrap().push(form);
        self.exchange_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Unexpected("no exchange result queued".into())))
    }
}
