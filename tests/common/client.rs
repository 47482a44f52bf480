//! HTTP client testing utilities

use std::time::Duration;

use reqwest::{Client, Method, Response};

/// HTTP testing client wrapper
pub struct TestClient {
    pub client: Client,
}

impl TestClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        TestClient { client }
    }

    /// Client for servers presenting self-signed certificates.
    pub fn insecure() -> Self {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTPS client");

        TestClient { client }
    }

    pub async fn get(&self, url: &str) -> Result<Response, Box<dyn std::error::Error>> {
        Ok(self.client.get(url).send().await?)
    }

    pub async fn head(&self, url: &str) -> Result<Response, Box<dyn std::error::Error>> {
        Ok(self.client.head(url).send().await?)
    }

    /// Send an arbitrary method with an optional body
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }
        Ok(builder.send().await?)
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
