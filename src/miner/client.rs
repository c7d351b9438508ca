use crate::app_config::AppConfig;
use reqwest::header::HeaderValue;
use reqwest::{Client, header};
use thiserror::Error;

pub fn new_client(config: &AppConfig) -> Result<Client, ClientError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(config.http().request_timeout())
        .connect_timeout(config.http().request_timeout())
        .no_proxy()
        .default_headers(headers)
        .build()?;
    Ok(client)
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn new_client_asks_for_json() -> Result<(), ClientError> {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/api/system/info")
            .with_status(200)
            .match_header("accept", "application/json")
            .create_async()
            .await;

        let config = AppConfigBuilder::new().build();
        let client = new_client(&config)?;

        client.get(format!("{}{}", server.url(), "/api/system/info")).send().await?;

        // Verify that the call came in with the expected header
        mock.assert_async().await;

        Ok(())
    }

    #[tokio::test]
    async fn new_client_applies_the_request_timeout() -> Result<(), Box<dyn std::error::Error>> {
        // Accepts connections but never answers them
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let mut connections = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                connections.push(socket);
            }
        });

        let config = AppConfigBuilder::new().request_timeout(Duration::from_millis(100)).build();
        let client = new_client(&config)?;

        let result = client.get(format!("http://{}/api/system/info", address)).send().await;

        let error = result.expect_err("request should time out");
        assert!(error.is_timeout(), "expected a timeout, got {:?}", error);

        server.abort();
        Ok(())
    }
}
