//! `ignoreguard sign`: send a signed delivery to a server by hand.

use anyhow::Context;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use uuid::Uuid;

use ignoreguard_infra::admission::{compute_hmac_sha256_hex, DELIVERY_HEADER, EVENT_HEADER, SIGNATURE_256_HEADER};

use super::SignArgs;

/// User agent of hand-sent deliveries. Passes the gate's Hookshot check.
pub const TEST_USER_AGENT: &str = "GitHub-Hookshot/Test";

/// The three headers a signed delivery needs, in send order.
pub fn signed_headers(
    secret: &str,
    event: &str,
    delivery_id: &str,
    body: &[u8],
) -> anyhow::Result<Vec<(&'static str, String)>> {
    let digest = compute_hmac_sha256_hex(secret.as_bytes(), body)?;
    Ok(vec![
        (EVENT_HEADER, event.to_string()),
        (DELIVERY_HEADER, delivery_id.to_string()),
        (SIGNATURE_256_HEADER, format!("sha256={digest}")),
    ])
}

/// POST `body` with `headers` to `url`, returning the status and response text.
pub async fn send(url: &str, headers: &[(&'static str, String)], body: Vec<u8>) -> anyhow::Result<(u16, String)> {
    let mut request = reqwest::Client::new()
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .header(USER_AGENT, TEST_USER_AGENT);
    for (name, value) in headers {
        request = request.header(*name, value);
    }

    let response = request
        .body(body)
        .send()
        .await
        .with_context(|| format!("failed to deliver to {url}"))?;
    let status = response.status().as_u16();
    let text = response.text().await.context("failed to read response body")?;
    Ok((status, text))
}

pub async fn run(args: SignArgs) -> anyhow::Result<()> {
    let secret = args
        .secret
        .filter(|s| !s.is_empty())
        .context("WEBHOOK_SECRET is not set (pass --secret or set the variable)")?;

    let body = tokio::fs::read(&args.payload)
        .await
        .with_context(|| format!("failed to read payload {}", args.payload.display()))?;

    let delivery_id = Uuid::now_v7().to_string();
    let headers = signed_headers(&secret, &args.event, &delivery_id, &body)?;
    for (name, value) in &headers {
        println!("{name}: {value}");
    }
    if args.dry_run {
        return Ok(());
    }

    let (status, text) = send(&args.url, &headers, body).await?;
    println!();
    println!("{status}");
    println!("{text}");
    Ok(())
}
