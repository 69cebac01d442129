use std::time::Duration;

use anyhow::Context as _;
use serde::Serialize;

use crate::domain::repository::Mailer;
use crate::error::ApiError;

/// Transactional mail over a JSON HTTP API.
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct SendMailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpMailer {
    pub fn new(
        api_url: String,
        api_key: String,
        from: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build mail http client")?;
        Ok(Self {
            client,
            api_url,
            api_key,
            from,
        })
    }
}

impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&SendMailRequest {
                from: &self.from,
                to,
                subject,
                text,
            })
            .send()
            .await
            .context("send mail request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("mail provider returned {status}: {body}").into());
        }
        Ok(())
    }
}
