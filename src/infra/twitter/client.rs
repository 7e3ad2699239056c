//! Status-posting endpoint client.
//!
//! Statuses are sent as `{"text": ...}` with a bearer token. Responses come
//! either flat (`{"id_str", "text", "created_at"}`) or wrapped in a `data`
//! envelope with `id` instead of `id_str`; a body carrying `errors` is a
//! rejection even when the HTTP status is a success.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fetch::auth::ApiKey;
use crate::fetch::{HttpClient, post_json};
use crate::services::{Notifier, PostedStatus};

pub const DEFAULT_ENDPOINT: &str = "https://api.twitter.com/2/tweets";

#[derive(Serialize)]
struct StatusRequest<'a> {
    text: &'a str,
}

/// Flat response; a numeric `id` may sit next to `id_str` and is ignored.
#[derive(Deserialize)]
struct FlatStatus {
    id_str: String,
    text: String,
    #[serde(default)]
    created_at: Option<String>,
}

/// `data` member of an enveloped response, where `id` is a string.
#[derive(Deserialize)]
struct EnvelopedStatus {
    id: String,
    text: String,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    data: EnvelopedStatus,
}

pub struct StatusApi<C> {
    client: ApiKey<C>,
    endpoint: String,
}

impl<C: HttpClient> StatusApi<C> {
    pub fn new(client: C, endpoint: impl Into<String>, bearer_token: &str) -> Result<Self> {
        Ok(Self {
            client: ApiKey::bearer(client, bearer_token)?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl<C: HttpClient> Notifier for StatusApi<C> {
    async fn post(&self, status: &str) -> Result<PostedStatus> {
        let (http_status, body) =
            post_json(&self.client, &self.endpoint, &StatusRequest { text: status }).await?;

        if !http_status.is_success() {
            return Err(anyhow!("delivery failed with status {http_status}: {body}"));
        }

        parse_posted_status(body)
    }
}

/// Interprets a delivery response body.
pub fn parse_posted_status(body: Value) -> Result<PostedStatus> {
    if body.get("errors").is_some() {
        return Err(anyhow!("delivery rejected: {body}"));
    }

    let (id_str, text, created_at) = if body.get("data").is_some() {
        let Envelope { data } = serde_json::from_value(body.clone())
            .map_err(|e| anyhow!("unexpected delivery response {body}: {e}"))?;
        (data.id, data.text, data.created_at)
    } else {
        let flat: FlatStatus = serde_json::from_value(body.clone())
            .map_err(|e| anyhow!("unexpected delivery response {body}: {e}"))?;
        (flat.id_str, flat.text, flat.created_at)
    };

    Ok(PostedStatus {
        created_at: created_at
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        text,
        id_str,
    })
}
