use dashboard_http::{RequestDescriptor, ResilientClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dashboard_http=debug"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut api = ResilientClient::from_env()?;
    if let Ok(token) = std::env::var("DASHBOARD_TOKEN") {
        api = api.with_bearer_token(token);
    }

    let targets = api.targets();
    tracing::info!(
        primary = %targets.primary.base_url(),
        local = %targets.local.base_url(),
        direct = %targets.direct.base_url(),
        "using endpoint targets"
    );

    let response = api
        .execute(&RequestDescriptor::get("/customer").query("page", 1))
        .await?;

    println!("{} {}", response.status, serde_json::to_string_pretty(&response.body)?);

    Ok(())
}
