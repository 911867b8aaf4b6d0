use std::sync::Arc;

use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{Message, ReplyMarkup},
    Bot,
};
use tracing::instrument;

use crate::{
    authoring::{parse_option_line, QuestionDraft, MAX_KEY_LEN},
    config::Config,
    database::connection::{CreateQuestion, RetrieveQuiz, UpdateQuestion},
    keyboard::{
        action_keyboard, explanation_keyboard, list_keyboard, option_rows_keyboard,
        options_form_keyboard, BACK, CLEAR_EXPLANATION, DONE, REMOVE_OPTION, SKIP,
    },
    notify,
    state::{DraftTarget, QuizState},
    HandlerResult, UserDialogue,
};

/// Summary of the rows entered so far and the keys the answer may be picked from.
pub(crate) fn rows_summary(draft: &QuestionDraft) -> String {
    let rows = draft.rows();
    if rows.is_empty() {
        return "No options yet.".to_owned();
    }

    let mut summary = String::from("Options so far:\n");
    for row in rows.rows() {
        summary.push_str(&row.label());
        summary.push('\n');
    }
    summary.push_str(&format!(
        "\nCorrect answer choices: {}",
        rows.correct_answer_choices().join(", ")
    ));
    summary
}

#[instrument(level = "info", skip(bot, dialogue, connection))]
pub(crate) async fn select_quiz<DbConnection: RetrieveQuiz>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    connection: Arc<DbConnection>,
) -> HandlerResult {
    let Some(quiz_name) = msg.text() else {
        bot.send_message(msg.chat.id, "Please, choose a quiz.").await?;
        return Ok(());
    };

    let quizes = connection.retrieve_all_quiz_names().await?;
    if !quizes.iter().any(|quiz| quiz == quiz_name) {
        bot.send_message(msg.chat.id, format!("Quiz with name '{quiz_name}' not found."))
            .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, "Please enter the question text.")
        .reply_markup(ReplyMarkup::kb_remove())
        .await?;
    dialogue
        .update(QuizState::ReceiveQuestionText {
            quiz_name: quiz_name.to_owned(),
        })
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_question_text(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    quiz_name: String,
) -> HandlerResult {
    let Some(text) = msg.text().map(str::trim).filter(|text| !text.is_empty()) else {
        bot.send_message(msg.chat.id, "Question text is required.").await?;
        return Ok(());
    };

    bot.send_message(
        msg.chat.id,
        format!(
            "Now send the answer options, one per line, as KEY: text \
             (keys up to {MAX_KEY_LEN} characters). Press {DONE} when finished."
        ),
    )
    .reply_markup(options_form_keyboard())
    .await?;
    dialogue
        .update(QuizState::ReceiveOptions {
            quiz_name,
            target: DraftTarget::New,
            draft: QuestionDraft::new(text),
        })
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_options(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (quiz_name, target, mut draft): (String, DraftTarget, QuestionDraft),
) -> HandlerResult {
    match msg.text() {
        Some(DONE) => {
            let choices = draft.rows().correct_answer_choices();
            if choices.is_empty() {
                bot.send_message(msg.chat.id, "At least one option is required.")
                    .await?;
                return Ok(());
            }
            bot.send_message(msg.chat.id, "Which option is the correct answer?")
                .reply_markup(list_keyboard(&choices))
                .await?;
            dialogue
                .update(QuizState::ReceiveCorrectAnswer {
                    quiz_name,
                    target,
                    draft,
                })
                .await?;
        }
        Some(REMOVE_OPTION) => {
            if draft.rows().is_empty() {
                bot.send_message(msg.chat.id, "There are no options to remove.")
                    .await?;
                return Ok(());
            }
            bot.send_message(msg.chat.id, "Which option should be removed?")
                .reply_markup(option_rows_keyboard(draft.rows()))
                .await?;
            dialogue
                .update(QuizState::RemoveOption {
                    quiz_name,
                    target,
                    draft,
                })
                .await?;
        }
        Some(lines) => {
            let mut problems = Vec::new();
            for line in lines.lines().filter(|line| !line.trim().is_empty()) {
                match parse_option_line(line) {
                    Ok(row) => draft.rows_mut().push(row),
                    Err(err) => problems.push(err.to_string()),
                }
            }

            let mut reply = rows_summary(&draft);
            if !problems.is_empty() {
                reply = format!("{}\n\n{reply}", problems.join("\n"));
            }
            bot.send_message(msg.chat.id, reply)
                .reply_markup(options_form_keyboard())
                .await?;
            dialogue
                .update(QuizState::ReceiveOptions {
                    quiz_name,
                    target,
                    draft,
                })
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please, send options as KEY: text.")
                .await?;
        }
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn remove_option(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (quiz_name, target, mut draft): (String, DraftTarget, QuestionDraft),
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please, choose an option to remove.")
            .await?;
        return Ok(());
    };

    if text != BACK {
        let index = draft.rows().rows().iter().position(|row| row.label() == text);
        match index.and_then(|index| draft.rows_mut().remove_row(index)) {
            Some(row) => tracing::debug!(key = row.key.as_str(), "option removed"),
            None => {
                bot.send_message(msg.chat.id, "No such option. Choose one from the list.")
                    .await?;
                return Ok(());
            }
        }
    }

    bot.send_message(msg.chat.id, rows_summary(&draft))
        .reply_markup(options_form_keyboard())
        .await?;
    dialogue
        .update(QuizState::ReceiveOptions {
            quiz_name,
            target,
            draft,
        })
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_correct_answer(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (quiz_name, target, mut draft): (String, DraftTarget, QuestionDraft),
) -> HandlerResult {
    let Some(key) = msg.text() else {
        bot.send_message(msg.chat.id, "Correct answer is required.").await?;
        return Ok(());
    };

    draft.set_correct_answer(key);
    if let Err(err) = draft.finish() {
        bot.send_message(msg.chat.id, format!("{err}."))
            .reply_markup(list_keyboard(&draft.rows().correct_answer_choices()))
            .await?;
        return Ok(());
    }

    let prompt = match draft.explanation() {
        Some(current) => format!(
            "Current explanation: {current}\n\nSend a new one, press {SKIP} to keep it \
             or {CLEAR_EXPLANATION} to remove it."
        ),
        None => format!("Send an explanation shown for wrong answers, or press {SKIP}."),
    };
    bot.send_message(msg.chat.id, prompt)
        .reply_markup(explanation_keyboard(draft.explanation().is_some()))
        .await?;
    dialogue
        .update(QuizState::ReceiveExplanation {
            quiz_name,
            target,
            draft,
        })
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, connection, config))]
pub(crate) async fn receive_explanation<DbConnection: CreateQuestion + UpdateQuestion>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (quiz_name, target, mut draft): (String, DraftTarget, QuestionDraft),
    connection: Arc<DbConnection>,
    config: Arc<Config>,
) -> HandlerResult {
    match msg.text() {
        Some(SKIP) => {}
        Some(CLEAR_EXPLANATION) => draft.set_explanation(None),
        Some(text) => draft.set_explanation(Some(text.to_owned())),
        None => {
            bot.send_message(msg.chat.id, "Please, send the explanation as text.")
                .await?;
            return Ok(());
        }
    }

    let question = match draft.finish() {
        Ok(question) => question,
        Err(err) => {
            bot.send_message(msg.chat.id, format!("{err}.")).await?;
            return Ok(());
        }
    };

    let notice = match target {
        DraftTarget::New => {
            let id = connection.create_question(&quiz_name, &question).await?;
            tracing::info!(%id, %quiz_name, "question added");
            "Question added successfully."
        }
        DraftTarget::Existing(id) => {
            let updated = connection.update_question(id, &question).await?;
            tracing::info!(%id, %quiz_name, updated, "question updated");
            if updated > 0 {
                "Question updated successfully."
            } else {
                "Question was deleted in the meantime."
            }
        }
    };

    dialogue.update(QuizState::Start).await?;
    notify::transient(&bot, msg.chat.id, notice).await?;
    bot.send_message(msg.chat.id, "What do you want to do now?")
        .reply_markup(action_keyboard(config.is_admin(msg.chat.username())))
        .await?;
    Ok(())
}
