//! HTTP plumbing shared by the upstream sources and the delivery client.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;

/// GETs `url` and returns the body bytes, failing on non-success statuses.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// GETs `url` and decodes the body as UTF-8 text.
pub async fn fetch_text<C: HttpClient>(client: &C, url: &str) -> Result<String> {
    let bytes = fetch_bytes(client, url).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// POSTs `body` as JSON and returns the status with the parsed JSON response.
///
/// Non-success statuses are not an error here; the caller decides what an
/// error payload means.
pub async fn post_json<C: HttpClient, B: Serialize>(
    client: &C,
    url: &str,
    body: &B,
) -> Result<(reqwest::StatusCode, serde_json::Value)> {
    let mut req = reqwest::Request::new(reqwest::Method::POST, url.parse()?);
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *req.body_mut() = Some(serde_json::to_vec(body)?.into());

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("POST {url}"))?;
    let status = resp.status();
    let text = resp.text().await?;
    let json = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

    Ok((status, json))
}
