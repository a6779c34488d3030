//! Club API demo: serves the built-in entities from an in-memory store and
//! reads the public season list back through a fetch unit
//!
//! ```text
//! CLUBHOUSE_CONFIG=club.yaml RUST_LOG=clubhouse=debug cargo run --example club_api
//! curl localhost:3000/api/entities/seasons
//! curl -H 'Authorization: Bearer admin-token' 'localhost:3000/api/entities/grants?sort=month:desc'
//! ```

use clubhouse::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn seed(store: &InMemoryStore) -> Result<()> {
    let rows = |values: Vec<Value>| -> Vec<Row> {
        values
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect()
    };

    store.seed(
        "committees",
        rows(vec![
            json!({"name": "Board", "sort_order": 1, "is_active": true}),
            json!({"name": "Youth section", "sort_order": 2, "is_active": true}),
            json!({"name": "Events", "sort_order": 3, "is_active": false}),
        ]),
    )?;
    store.seed(
        "seasons",
        rows(vec![
            json!({
                "name": "2023/24",
                "start_date": "2023-09-01",
                "end_date": "2024-06-30",
                "is_closed": true,
            }),
            json!({
                "name": "2024/25",
                "start_date": "2024-09-01",
                "end_date": "2025-06-30",
                "is_active": true,
            }),
        ]),
    )?;
    store.seed(
        "grants",
        rows(vec![
            json!({"name": "Municipal youth fund", "month": 3, "is_active": true}),
            json!({"name": "Equipment grant", "month": 9, "is_active": true}),
        ]),
    )?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var("CLUBHOUSE_CONFIG") {
        Ok(path) => AppConfig::from_yaml_file(&path)?,
        Err(_) => AppConfig::from_yaml_str(
            r#"
auth:
  tokens:
    - { token: admin-token, subject: treasurer, role: admin }
    - { token: member-token, subject: coach, role: authenticated }
"#,
        )?,
    };

    let store = InMemoryStore::new().with_unique("committees", "name");
    seed(&store)?;

    let bind = config.bind_addr().to_string();
    let timeout = config.fetch_timeout();
    let server = ServerBuilder::new()
        .with_store(store)
        .with_auth_provider(config.token_provider())
        .with_builtin_entities()
        .with_config(config);
    let server = tokio::spawn({
        let bind = bind.clone();
        async move { server.serve(&bind).await }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;

    let transport = Arc::new(HttpTransport::new(format!("http://{}", bind)));
    let seasons = create_fetcher::<Season>(
        FetcherConfig::new(Endpoint::entity("seasons"), "seasons", "Could not load seasons")
            .timeout(timeout),
        transport,
    );
    if let Some(handle) = seasons.mount() {
        handle.await?;
    }

    let state = seasons.state();
    match (&state.data, &state.error) {
        (Some(rows), _) => {
            for season in rows {
                println!("season {} ({} - {})", season.name, season.start_date, season.end_date);
            }
        }
        (None, Some(error)) => println!("{}", error),
        (None, None) => println!("no data"),
    }

    server.await?
}
