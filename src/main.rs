use std::sync::Arc;

use anyhow::{Error, Result};
use notify_service::{
    api::run_api_server, config::Config, dispatcher::NotificationDispatcher, utils::init_tracing,
};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;

    init_tracing(config.json_logs());

    let dispatcher = Arc::new(NotificationDispatcher::from_config(&config)?);

    if let Err(e) = dispatcher.warm_up().await {
        warn!(error = %e, "Mail provider not ready at startup, will retry on first dispatch");
    }

    run_api_server(config, dispatcher).await
}
