use crate::domain::ports::LivenessProbe;
use crate::error::{FundingError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: [(); 0],
    id: u64,
}

/// JSON-RPC liveness probe over HTTP.
pub struct HttpProbe {
    client: Client,
    url: String,
    method: String,
}

impl HttpProbe {
    pub fn new(
        url: impl Into<String>,
        method: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            method: method.into(),
        })
    }
}

#[async_trait]
impl LivenessProbe for HttpProbe {
    async fn block_height(&self) -> Result<u64> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: &self.method,
            params: [],
            id: 1,
        };
        let response: Value = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_block_height(&response)
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Extracts the block height from a JSON-RPC response.
///
/// Accepts a JSON number, a decimal string, or a `0x` hex string.
pub fn parse_block_height(response: &Value) -> Result<u64> {
    if let Some(err) = response.get("error") {
        return Err(FundingError::Probe(format!("node returned error: {}", err)));
    }
    let malformed = || FundingError::Parse {
        what: "block height",
        raw: response.to_string(),
    };
    match response.get("result").ok_or_else(malformed)? {
        Value::Number(n) => n.as_u64().ok_or_else(malformed),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16).map_err(|_| malformed()),
                None => s.parse().map_err(|_| malformed()),
            }
        }
        _ => Err(malformed()),
    }
}
