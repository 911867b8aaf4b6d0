use std::sync::Arc;

use teloxide::{payloads::SendMessageSetters, prelude::Requester, types::Message, Bot};
use tracing::instrument;

use crate::{
    config::Config,
    database::connection::{DeleteQuestion, RetrieveQuestion},
    keyboard::{action_keyboard, is_no, is_yes, list_keyboard, yes_no_keyboard},
    notify,
    state::QuizState,
    HandlerResult, UserDialogue,
};

pub(crate) const CONFIRM_DELETE: &str =
    "Are you sure you want to delete this item? This action cannot be undone.";

#[instrument(level = "info", skip(bot, dialogue, connection))]
pub(crate) async fn select_quiz<DbConnection: RetrieveQuestion>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    connection: Arc<DbConnection>,
) -> HandlerResult {
    let Some(quiz_name) = msg.text() else {
        bot.send_message(msg.chat.id, "Please, choose a quiz.").await?;
        return Ok(());
    };

    let questions = connection.retrieve_all_question_texts(quiz_name).await?;
    if questions.is_empty() {
        bot.send_message(msg.chat.id, format!("Quiz '{quiz_name}' has no questions."))
            .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, "Which question should be deleted?")
        .reply_markup(list_keyboard(&questions))
        .await?;
    dialogue
        .update(QuizState::DeleteSelectQuestion {
            quiz_name: quiz_name.to_owned(),
        })
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn select_question(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    quiz_name: String,
) -> HandlerResult {
    let Some(question_text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please, choose a question.").await?;
        return Ok(());
    };

    bot.send_message(msg.chat.id, CONFIRM_DELETE)
        .reply_markup(yes_no_keyboard())
        .await?;
    dialogue
        .update(QuizState::ConfirmDelete {
            quiz_name,
            question_text: question_text.to_owned(),
        })
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, connection, config))]
pub(crate) async fn confirm_delete<DbConnection: DeleteQuestion>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (quiz_name, question_text): (String, String),
    connection: Arc<DbConnection>,
    config: Arc<Config>,
) -> HandlerResult {
    match msg.text() {
        Some(text) if is_yes(text) => {
            let deleted = connection.delete_question(&quiz_name, &question_text).await?;
            tracing::info!(%quiz_name, %question_text, deleted, "question deleted");
            let notice = if deleted > 0 {
                "Question deleted."
            } else {
                "Question was already gone."
            };
            notify::transient(&bot, msg.chat.id, notice).await?;
        }
        Some(text) if is_no(text) => {
            notify::transient(&bot, msg.chat.id, "Deletion cancelled.").await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please, answer Yes or No.")
                .reply_markup(yes_no_keyboard())
                .await?;
            return Ok(());
        }
    }

    dialogue.update(QuizState::Start).await?;
    bot.send_message(msg.chat.id, "What do you want to do now?")
        .reply_markup(action_keyboard(config.is_admin(msg.chat.username())))
        .await?;
    Ok(())
}
