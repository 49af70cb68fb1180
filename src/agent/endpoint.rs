use super::messages::{AgentQuery, AgentReply};
use anyhow::{Context, Result};
use tracing::debug;

/// Remote agent that answers farmer queries
#[async_trait::async_trait]
pub trait AgentEndpoint: Send + Sync {
    async fn query(&self, query: &AgentQuery) -> Result<AgentReply>;
}

/// Agent endpoint reached over HTTP (`POST {base_url}/api/v1/agent/query`)
#[derive(Debug, Clone)]
pub struct HttpAgentClient {
    client: reqwest::Client,
    query_url: String,
    api_token: Option<String>,
}

impl HttpAgentClient {
    pub fn new(base_url: &str, api_token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build agent HTTP client")?;

        Ok(Self {
            client,
            query_url: format!("{}/api/v1/agent/query", base_url.trim_end_matches('/')),
            api_token,
        })
    }

    pub fn query_url(&self) -> &str {
        &self.query_url
    }
}

#[async_trait::async_trait]
impl AgentEndpoint for HttpAgentClient {
    async fn query(&self, query: &AgentQuery) -> Result<AgentReply> {
        debug!("POST {} ({})", self.query_url, query.language);

        let mut request = self.client.post(&self.query_url).json(query);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let reply = request
            .send()
            .await
            .context("Agent request failed")?
            .error_for_status()
            .context("Agent returned an error status")?
            .json::<AgentReply>()
            .await
            .context("Failed to decode agent reply")?;

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_url_joins_base() {
        let client = HttpAgentClient::new("http://localhost:8000/", None).unwrap();
        assert_eq!(client.query_url(), "http://localhost:8000/api/v1/agent/query");
    }
}
