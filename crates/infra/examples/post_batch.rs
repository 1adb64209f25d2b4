//! Example: posting a batch of documents to an index pipeline
//!
//! # Setup
//!
//! 1. Point the client at the cluster: ```bash export
//!    INGESTLINK_HOSTS=node-1:8764,node-2:8764 export
//!    INGESTLINK_USERNAME=admin INGESTLINK_PASSWORD=secret
//!    INGESTLINK_REALM=native ```
//!
//! 2. Run this example: ```bash cargo run -p ingestlink-infra --example
//!    post_batch -- /api/apollo/index-pipelines/docs/collections/docs/index
//!    ```

use ingestlink_infra::connect_from_env;
use ingestlink_infra::observability::{init_tracing, LogFormat};
use serde_json::json;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(LogFormat::from_env())?;

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/api/apollo/index-pipelines/docs/collections/docs/index".to_string());

    let client = connect_from_env()?;
    info!(servers = ?client.available_servers()?, "Connected");

    let documents: Vec<_> = (1..=10)
        .map(|i| {
            json!({
                "id": format!("example-{i}"),
                "fields": [{ "name": "title_t", "value": format!("Example document {i}") }]
            })
        })
        .collect();

    let receipt = client.post_documents(&path, &documents)?;
    info!(
        host = %receipt.host,
        attempts = receipt.attempts,
        documents = receipt.documents,
        "Batch accepted"
    );

    for session in client.session_snapshot()? {
        info!(host = %session.host, age_ms = session.age.as_millis() as u64, "Live session");
    }

    client.shutdown();
    Ok(())
}
