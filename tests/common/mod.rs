#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Method, Response};
use serde_json::Value;

use crud_api_rust::{app, AppState, MemoryStore};

/// Acting user sent on every admin request
pub const PRINCIPAL: i64 = 7;

pub struct TestServer {
    pub base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    /// Serve the router over a fresh in-memory store on an ephemeral port
    pub async fn spawn() -> Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;
        let router = app(AppState::new(Arc::new(MemoryStore::new())));

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send an admin request with the principal header
    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Response> {
        let mut req = self
            .client
            .request(method, self.url(path))
            .header("x-user-id", PRINCIPAL.to_string());
        if let Some(body) = body {
            req = req.json(&body);
        }
        Ok(req.send().await?)
    }

    /// Send and decode the `{status, message, data}` envelope
    pub async fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<(u16, Value)> {
        let res = self.send(method, path, body).await?;
        let status = res.status().as_u16();
        let body = res.json::<Value>().await.context("response was not JSON")?;
        Ok((status, body))
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(u16, Value)> {
        self.call(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(u16, Value)> {
        self.call(Method::PUT, path, Some(body)).await
    }

    pub async fn get(&self, path: &str) -> Result<(u16, Value)> {
        self.call(Method::GET, path, None).await
    }

    pub async fn delete(&self, path: &str) -> Result<(u16, Value)> {
        self.call(Method::DELETE, path, None).await
    }

    /// The raw client, for requests that must omit the principal header
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

pub async fn spawn() -> Result<TestServer> {
    TestServer::spawn().await
}
