use std::sync::Arc;

use teloxide::{payloads::SendMessageSetters, prelude::Requester, types::Message, Bot};
use tracing::instrument;

use crate::config::Config;
use crate::database::connection::{CreateQuiz, RetrieveQuiz};
use crate::keyboard::action_keyboard;
use crate::notify;
use crate::state::QuizState;
use crate::{HandlerResult, UserDialogue};

#[instrument(level = "info", skip(connection, bot, dialogue))]
pub(crate) async fn receive_quiz_name<DbConnection: RetrieveQuiz>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    connection: Arc<DbConnection>,
) -> HandlerResult {
    match msg.text().map(str::trim).filter(|title| !title.is_empty()) {
        Some(title) => {
            let quizes = connection.retrieve_all_quiz_names().await?;
            if quizes.iter().any(|quiz| quiz == title) {
                bot.send_message(msg.chat.id, "Quiz with that name already exists. Try again.")
                    .await?;
            } else {
                bot.send_message(msg.chat.id, "OK. What is the new quiz about?")
                    .await?;
                dialogue
                    .update(QuizState::ReceiveQuizDescription {
                        quiz_name: title.to_owned(),
                    })
                    .await?;
            }
        }
        None => {
            bot.send_message(msg.chat.id, "Please, send a title of the new quiz.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(connection, bot, dialogue, config))]
pub(crate) async fn receive_quiz_description<DbConnection: CreateQuiz>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    quiz_name: String,
    connection: Arc<DbConnection>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(description) = msg.text() else {
        bot.send_message(msg.chat.id, "Please, send a description of the new quiz.")
            .await?;
        return Ok(());
    };

    let author = msg.chat.username().unwrap_or_default();
    let quiz_name = connection
        .create_quiz(&quiz_name, description, author)
        .await?;
    tracing::info!(author, %quiz_name, "quiz created");

    dialogue.update(QuizState::Start).await?;
    notify::transient(&bot, msg.chat.id, format!("Quiz '{quiz_name}' created.")).await?;
    bot.send_message(msg.chat.id, "Add questions to it from the menu.")
        .reply_markup(action_keyboard(config.is_admin(msg.chat.username())))
        .await?;

    Ok(())
}
