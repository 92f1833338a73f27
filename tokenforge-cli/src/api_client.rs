// HTTP client for the tokenforge API

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokenforge_core::{
    wire::{
        AirdropRequest, AirdropResponse, BalanceResponse, BurnRequest, ConfirmTransactionRequest,
        ConfirmTransactionResponse, CreateTokenRequest, CreateTokenResponse, ErrorResponse,
        MintRequest, TokenDetails, TokenOperationResponse, TransferRequest,
    },
    Network,
};

pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await.context("Failed to read API response")?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(error) => anyhow!("API error {}: {}", error.code, error.error),
                Err(_) => anyhow!("API error {}: {}", status.as_u16(), body),
            });
        }

        serde_json::from_str(&body).context("Unexpected API response")
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to reach API at {}", self.base_url))?;
        Self::decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to reach API at {}", self.base_url))?;
        Self::decode(response).await
    }

    pub async fn create_token(&self, request: &CreateTokenRequest) -> Result<CreateTokenResponse> {
        self.post("/api/tokens", request).await
    }

    pub async fn transfer(&self, request: &TransferRequest) -> Result<TokenOperationResponse> {
        self.post("/api/tokens/transfer", request).await
    }

    pub async fn mint(&self, request: &MintRequest) -> Result<TokenOperationResponse> {
        self.post("/api/tokens/mint", request).await
    }

    pub async fn burn(&self, request: &BurnRequest) -> Result<TokenOperationResponse> {
        self.post("/api/tokens/burn", request).await
    }

    pub async fn confirm(
        &self,
        request: &ConfirmTransactionRequest,
    ) -> Result<ConfirmTransactionResponse> {
        self.post("/api/tokens/transactions/confirm", request).await
    }

    pub async fn token(&self, mint: &str, network: Network) -> Result<TokenDetails> {
        self.get(
            &format!("/api/tokens/{}", mint),
            &[("network", network.to_string())],
        )
        .await
    }

    /// Tokens created through the API by `owner`
    pub async fn created_tokens(&self, owner: &str, network: Network) -> Result<Value> {
        self.get(
            "/api/tokens",
            &[("owner", owner.to_string()), ("network", network.to_string())],
        )
        .await
    }

    /// Token accounts held by `owner`
    pub async fn owner_tokens(&self, owner: &str, network: Network) -> Result<Value> {
        self.get(
            &format!("/api/tokens/owner/{}", owner),
            &[("network", network.to_string())],
        )
        .await
    }

    pub async fn holders(&self, mint: &str, network: Network) -> Result<Value> {
        self.get(
            &format!("/api/tokens/{}/holders", mint),
            &[("network", network.to_string())],
        )
        .await
    }

    pub async fn transactions(
        &self,
        mint: &str,
        network: Network,
        page: u32,
        limit: u32,
    ) -> Result<Value> {
        self.get(
            &format!("/api/tokens/{}/transactions", mint),
            &[
                ("network", network.to_string()),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    pub async fn balance(&self, address: &str, network: Network) -> Result<BalanceResponse> {
        self.get(
            &format!("/api/wallet/balance/{}", address),
            &[("network", network.to_string())],
        )
        .await
    }

    pub async fn airdrop(&self, request: &AirdropRequest) -> Result<AirdropResponse> {
        self.post("/api/wallet/airdrop", request).await
    }
}
