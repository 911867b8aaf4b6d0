use std::{future::Future, time::Duration};

use teloxide::{prelude::Requester, types::ChatId, Bot, RequestError};
use tokio::task::JoinHandle;

/// How long a transient notification stays in the chat.
pub(crate) const DISMISS_AFTER: Duration = Duration::from_secs(5);

/// Runs `task` on its own once `delay` has passed.
pub(crate) fn after<F>(delay: Duration, task: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        task.await;
    })
}

/// Sends a status message that deletes itself after [`DISMISS_AFTER`].
pub(crate) async fn transient(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
) -> Result<(), RequestError> {
    let sent = bot.send_message(chat_id, text).await?;

    let bot = bot.clone();
    after(DISMISS_AFTER, async move {
        if let Err(err) = bot.delete_message(chat_id, sent.id).await {
            tracing::warn!(error = %err, "failed to dismiss notification");
        }
    });
    Ok(())
}
