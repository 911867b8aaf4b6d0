use std::error::Error;
use std::sync::Arc;

use quizpreview::config::Config;
use quizpreview::database::connection::Connection;
use quizpreview::schema::schema;
use quizpreview::state::QuizState;
use quizpreview::telemetry;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::from_env()?;
    telemetry::init(config.log_level)?;

    let connection = Arc::new(Connection::connect(&config.database_url).await?);
    connection.migrate().await?;

    let bot = Bot::new(&config.teloxide_token);
    tracing::info!("Starting bot...");

    let webhook = config.webhook.clone();
    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![
            InMemStorage::<QuizState>::new(),
            connection,
            Arc::new(config)
        ])
        .enable_ctrlc_handler()
        .build();

    if let Some(webhook) = webhook {
        tracing::info!(url = %webhook.url, addr = %webhook.addr, "listening for webhooks");
        let listener = webhooks::axum(bot, Options::new(webhook.addr, webhook.url)).await?;
        dispatcher
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await;
    } else {
        dispatcher.dispatch().await;
    }

    Ok(())
}
