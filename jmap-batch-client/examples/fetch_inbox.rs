// Client Example: Fetch Inbox
// Finds the inbox, then lists its newest messages and fetches their
// subjects in a single batch.

use anyhow::Result;
use jmap_batch_client::{params, Client, ClientConfig};
use serde_json::json;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let base_url =
        std::env::var("JMAP_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let client = Client::connect(ClientConfig::new(base_url)).await?;
    info!("API endpoint: {}", client.api_url());

    let inbox = client.mailbox().query(params! {
        "filter" => json!({"role": "inbox"}),
        "limit" => 1,
    })?;
    let results = client.execute(&[inbox]).await?;
    let Some(inbox_id) = results[0]["ids"].get(0).cloned() else {
        info!("Server has no inbox");
        return Ok(());
    };
    info!("Inbox: {}", inbox_id);

    // Back-references only stand in for top-level arguments.
    let latest = client.email().query(params! {
        "filter" => json!({"inMailbox": inbox_id}),
        "sort" => json!([{"property": "receivedAt", "isAscending": false}]),
        "limit" => 10,
    })?;
    let messages = client.email().get(params! {
        "ids" => &latest / "ids",
        "properties" => json!(["subject", "from", "receivedAt"]),
    })?;

    let results = client.execute(&[messages]).await?;
    for email in results[0]["list"].as_array().into_iter().flatten() {
        info!("{} {}", email["receivedAt"], email["subject"]);
    }
    Ok(())
}
