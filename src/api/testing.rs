//! Scripted transport for client tests

use anyhow::{anyhow, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::client::AdminApiClient;
use super::session::Session;
use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::storage::MemoryStore;

/// Replays queued responses in order and records every request
#[derive(Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(ApiResponse::new(status, body));
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("connection refused"))
    }
}

/// Client signed in as `ops@example.com` with token `test-token`
pub(crate) fn authenticated_client() -> (AdminApiClient<MockTransport>, MemoryStore) {
    let store = MemoryStore::new();
    let session = Session::load(Arc::new(store.clone())).unwrap();
    session.establish("test-token", "ops@example.com").unwrap();

    let client = AdminApiClient::new(
        MockTransport::new(),
        "https://api.test/api/",
        Arc::new(session),
    );
    (client, store)
}
