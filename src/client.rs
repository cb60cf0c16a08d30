//! This module provides a client for a path-addressed JSON store exposed over
//! REST (the dialect spoken by Firebase-style realtime databases: `GET`,
//! `PUT`, `DELETE` and `POST` against `{base}/{path}.json`).

use std::error::Error;

use serde_json::Value;
use async_trait::async_trait;

use crate::traits::DataStore;

/// A store that reads and writes its data on a remote REST endpoint
pub struct RestStore {
    base_url: String,
    auth_token: Option<String>,
    http: reqwest::Client,
}

impl RestStore {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>>(base_url: S) -> Result<Self, Box<dyn Error>> {
        let base_url = base_url.as_ref().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err("the store base URL must not be empty".into());
        }

        Ok(Self {
            base_url,
            auth_token: None,
            http: reqwest::Client::new(),
        })
    }

    /// Create a client that authenticates every request with the given token
    pub fn new_with_token<S: AsRef<str>, T: ToString>(base_url: S, auth_token: T) -> Result<Self, Box<dyn Error>> {
        let mut client = Self::new(base_url)?;
        client.auth_token = Some(auth_token.to_string());
        Ok(client)
    }

    fn endpoint(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        match &self.auth_token {
            Some(token) => format!("{}/{}.json?auth={}", self.base_url, path, token),
            None => format!("{}/{}.json", self.base_url, path),
        }
    }
}

#[async_trait]
impl DataStore for RestStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, Box<dyn Error>> {
        let response = self.http
            .get(&self.endpoint(path))
            .send()
            .await?
            .error_for_status()?;
        let value: Value = response.json().await?;
        // the endpoint answers `null` for absent nodes
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), Box<dyn Error>> {
        self.http
            .put(&self.endpoint(path))
            .json(&value)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), Box<dyn Error>> {
        log::debug!("deleting node {}", path);
        self.http
            .delete(&self.endpoint(path))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String, Box<dyn Error>> {
        let response = self.http
            .post(&self.endpoint(path))
            .json(&value)
            .send()
            .await?
            .error_for_status()?;
        let body: Value = response.json().await?;
        match body.get("name").and_then(|n| n.as_str()) {
            Some(key) => Ok(key.to_string()),
            None => Err(format!("push to {}: the store returned no child key", path).into()),
        }
    }
}
