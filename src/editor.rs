use std::sync::Arc;

use teloxide::{payloads::SendMessageSetters, prelude::Requester, types::Message, Bot};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    author::rows_summary,
    authoring::{QuestionDraft, MAX_KEY_LEN},
    database::connection::RetrieveQuestion,
    keyboard::{keep_text_keyboard, list_keyboard, options_form_keyboard, DONE, KEEP_TEXT},
    state::{DraftTarget, QuizState},
    HandlerResult, UserDialogue,
};

/// The stored question as it is about to be edited.
fn question_summary(draft: &QuestionDraft) -> String {
    let mut summary = format!("Question: {}\n\n{}", draft.text(), rows_summary(draft));
    if let Some(correct_answer) = draft.correct_answer() {
        summary.push_str(&format!("\nCorrect answer: {correct_answer}"));
    }
    if let Some(explanation) = draft.explanation() {
        summary.push_str(&format!("\nExplanation: {explanation}"));
    }
    summary
}

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

    bot.send_message(msg.chat.id, "Which question should be edited?")
        .reply_markup(list_keyboard(&questions))
        .await?;
    dialogue
        .update(QuizState::EditSelectQuestion {
            quiz_name: quiz_name.to_owned(),
        })
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, connection))]
pub(crate) async fn select_question<DbConnection: RetrieveQuestion>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    quiz_name: String,
    connection: Arc<DbConnection>,
) -> HandlerResult {
    let Some(question_text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please, choose a question.").await?;
        return Ok(());
    };

    let Some((question_id, question)) =
        connection.retrieve_question(&quiz_name, question_text).await?
    else {
        bot.send_message(msg.chat.id, "No such question. Choose one from the list.")
            .await?;
        return Ok(());
    };

    let draft = QuestionDraft::from_record(&question);
    bot.send_message(msg.chat.id, question_summary(&draft)).await?;
    bot.send_message(
        msg.chat.id,
        format!("Send the new question text, or press {KEEP_TEXT}."),
    )
    .reply_markup(keep_text_keyboard())
    .await?;
    dialogue
        .update(QuizState::EditQuestionText {
            quiz_name,
            question_id,
            draft,
        })
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_question_text(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (quiz_name, question_id, mut draft): (String, Uuid, QuestionDraft),
) -> HandlerResult {
    match msg.text().map(str::trim) {
        Some(KEEP_TEXT) => {}
        Some(text) if !text.is_empty() => draft.set_text(text),
        _ => {
            bot.send_message(msg.chat.id, "Question text is required.").await?;
            return Ok(());
        }
    }

    bot.send_message(
        msg.chat.id,
        format!(
            "{}\n\nSend more options as KEY: text (keys up to {MAX_KEY_LEN} characters), \
             remove the ones you no longer need, then press {DONE}.",
            rows_summary(&draft)
        ),
    )
    .reply_markup(options_form_keyboard())
    .await?;
    dialogue
        .update(QuizState::ReceiveOptions {
            quiz_name,
            target: DraftTarget::Existing(question_id),
            draft,
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{Options, QuestionRecord};

    #[test]
    fn summary_shows_the_stored_question() {
        let record = QuestionRecord::new(
            "Capital of France?",
            [("A", "Paris"), ("B", "Lyon")].into_iter().collect::<Options>(),
            "A",
            Some("Paris is the capital.".to_owned()),
        );

        assert_eq!(
            question_summary(&QuestionDraft::from_record(&record)),
            "Question: Capital of France?\n\n\
             Options so far:\nA: Paris\nB: Lyon\n\nCorrect answer choices: A, B\n\
             Correct answer: A\nExplanation: Paris is the capital."
        );
    }

    #[test]
    fn summary_leaves_out_a_missing_explanation() {
        let record = QuestionRecord::new(
            "Q",
            [("T", "true")].into_iter().collect::<Options>(),
            "T",
            None,
        );

        let summary = question_summary(&QuestionDraft::from_record(&record));
        assert!(summary.ends_with("Correct answer: T"));
    }
}
