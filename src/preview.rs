use std::sync::Arc;

use teloxide::{
    dispatching::dialogue::GetChatId,
    payloads::{EditMessageTextSetters, SendMessageSetters},
    prelude::Requester,
    types::{CallbackQuery, Message, ReplyMarkup},
    Bot,
};
use tracing::instrument;

use crate::{
    config::Config,
    database::connection::RetrieveQuiz,
    keyboard::{action_keyboard, preview_keyboard, preview_text},
    navigator::PreviewNavigator,
    state::QuizState,
    HandlerResult, UserDialogue,
};

/// What a preview button asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewAction {
    Previous,
    Next,
    Select(String),
    Close,
}

impl PreviewAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "nav:prev" => Some(Self::Previous),
            "nav:next" => Some(Self::Next),
            "nav:close" => Some(Self::Close),
            _ => data
                .strip_prefix("opt:")
                .map(|key| Self::Select(key.to_owned())),
        }
    }

    pub fn callback_data(&self) -> String {
        match self {
            Self::Previous => "nav:prev".to_owned(),
            Self::Next => "nav:next".to_owned(),
            Self::Close => "nav:close".to_owned(),
            Self::Select(key) => format!("opt:{key}"),
        }
    }

    /// Applies the action, returning whether the view changed. Closing is
    /// left to the caller.
    pub fn apply(&self, navigator: &mut PreviewNavigator) -> bool {
        match self {
            Self::Previous => navigator.retreat(),
            Self::Next => navigator.advance(),
            Self::Select(key) => navigator.select_option(key),
            Self::Close => false,
        }
    }
}

#[instrument(level = "info", skip(bot, dialogue, connection, config))]
pub(crate) async fn selection<Retriever: RetrieveQuiz>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    connection: Arc<Retriever>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(quiz_name) = msg.text() else {
        bot.send_message(msg.chat.id, "Please, choose a quiz to preview.")
            .await?;
        return Ok(());
    };

    let Some(questions) = connection.retrieve_questions_json(quiz_name).await? else {
        tracing::info!(quiz_name, "preview of unknown quiz");
        bot.send_message(msg.chat.id, format!("Quiz with name '{quiz_name}' not found."))
            .await?;
        return Ok(());
    };

    let navigator = PreviewNavigator::from_json(Some(&questions));
    let Some(view) = navigator.view() else {
        bot.send_message(msg.chat.id, "Sorry, this quiz has no questions to preview.")
            .reply_markup(action_keyboard(config.is_admin(msg.chat.username())))
            .await?;
        dialogue.update(QuizState::Start).await?;
        return Ok(());
    };

    tracing::info!(
        user = msg.chat.username().unwrap_or_default(),
        quiz_name,
        questions = navigator.state().len(),
        "starting preview"
    );
    bot.send_message(msg.chat.id, format!("Previewing '{quiz_name}'."))
        .reply_markup(ReplyMarkup::kb_remove())
        .await?;
    bot.send_message(msg.chat.id, preview_text(view))
        .reply_markup(preview_keyboard(view))
        .await?;
    dialogue.update(QuizState::Previewing { navigator }).await?;

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, navigator, config), fields(data = ?q.data))]
pub(crate) async fn handle_action(
    bot: Bot,
    dialogue: UserDialogue,
    q: CallbackQuery,
    mut navigator: PreviewNavigator,
    config: Arc<Config>,
) -> HandlerResult {
    bot.answer_callback_query(&q.id).await?;

    let Some(action) = q.data.as_deref().and_then(PreviewAction::parse) else {
        tracing::warn!("unrecognised preview callback");
        return Ok(());
    };
    let Some(chat_id) = q.chat_id() else {
        return Ok(());
    };

    if action == PreviewAction::Close {
        if let Some(message) = &q.message {
            bot.edit_message_reply_markup(chat_id, message.id()).await?;
        }
        dialogue.update(QuizState::Start).await?;
        bot.send_message(chat_id, "Preview closed. What do you want to do now?")
            .reply_markup(action_keyboard(config.is_admin(q.from.username.as_deref())))
            .await?;
        return Ok(());
    }

    if !action.apply(&mut navigator) {
        tracing::debug!(?action, "preview unchanged");
        return Ok(());
    }

    if let (Some(message), Some(view)) = (&q.message, navigator.view()) {
        bot.edit_message_text(chat_id, message.id(), preview_text(view))
            .reply_markup(preview_keyboard(view))
            .await?;
    }
    dialogue.update(QuizState::Previewing { navigator }).await?;

    Ok(())
}

pub(crate) async fn stray_message(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Use the buttons under the question, or /cancel to leave the preview.",
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{Options, QuestionRecord};

    #[test]
    fn parses_callback_data() {
        assert_eq!(PreviewAction::parse("nav:prev"), Some(PreviewAction::Previous));
        assert_eq!(PreviewAction::parse("nav:next"), Some(PreviewAction::Next));
        assert_eq!(PreviewAction::parse("nav:close"), Some(PreviewAction::Close));
        assert_eq!(
            PreviewAction::parse("opt:A"),
            Some(PreviewAction::Select("A".to_owned()))
        );
        assert_eq!(PreviewAction::parse("nav:sideways"), None);
        assert_eq!(PreviewAction::parse(""), None);
    }

    #[test]
    fn callback_data_parses_back() {
        let actions = [
            PreviewAction::Previous,
            PreviewAction::Next,
            PreviewAction::Close,
            PreviewAction::Select("B:2".to_owned()),
        ];
        for action in actions {
            assert_eq!(PreviewAction::parse(&action.callback_data()), Some(action));
        }
    }

    #[test]
    fn actions_drive_the_navigator() {
        let mut navigator = PreviewNavigator::new(vec![
            QuestionRecord::new(
                "Q1",
                [("A", "x"), ("B", "y")].into_iter().collect::<Options>(),
                "B",
                None,
            ),
            QuestionRecord::new("Q2", [("A", "1")].into_iter().collect::<Options>(), "A", None),
        ]);

        assert!(!PreviewAction::Previous.apply(&mut navigator));
        assert!(PreviewAction::Select("A".to_owned()).apply(&mut navigator));
        assert!(!PreviewAction::Select("A".to_owned()).apply(&mut navigator));
        assert!(PreviewAction::Next.apply(&mut navigator));
        assert_eq!(navigator.current_index(), 1);
        assert!(!PreviewAction::Next.apply(&mut navigator));
        assert!(!PreviewAction::Close.apply(&mut navigator));
    }
}
