use std::{error::Error, sync::Arc};

use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        DpHandlerDescription, UpdateFilterExt, UpdateHandler,
    },
    dptree::{self, Handler},
    payloads::SendMessageSetters,
    prelude::{DependencyMap, Requester},
    types::{Message, ReplyMarkup, Update},
    Bot,
};
use tracing::instrument;

use crate::{
    author,
    commands::{cancel, help, start, Command},
    config::Config,
    constructor,
    database::connection::{Connection, RetrieveQuiz},
    editor,
    keyboard::{
        action_keyboard, list_keyboard, ADD_QUESTION, CREATE_QUIZ, DELETE_QUESTION,
        EDIT_QUESTION, PREVIEW_QUIZ,
    },
    preview, remover,
    state::QuizState,
    HandlerResult, UserDialogue,
};

type BoxedError = Box<dyn Error + Send + Sync + 'static>;
type SchemeHandler = Handler<'static, DependencyMap, Result<(), BoxedError>, DpHandlerDescription>;

/// The whole dispatch tree. Expects `InMemStorage<QuizState>`,
/// `Arc<Connection>` and `Arc<Config>` among the dependencies.
pub fn schema() -> UpdateHandler<BoxedError> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Help].endpoint(help))
        .branch(case![Command::Start].endpoint(start))
        .branch(case![Command::Cancel].endpoint(cancel));

    let handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![QuizState::Start].endpoint(choose_what_to_do::<Connection>))
        .branch(preview_scheme())
        .branch(constructor_scheme())
        .branch(author_scheme())
        .branch(editor_scheme())
        .branch(remover_scheme())
        .endpoint(invalid_state);

    dialogue::enter::<Update, InMemStorage<QuizState>, QuizState, _>()
        .branch(handler)
        .branch(callback_query_scheme())
}

async fn choose_what_to_do<QuizRetriever: RetrieveQuiz>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    connection: Arc<QuizRetriever>,
    config: Arc<Config>,
) -> HandlerResult {
    let username = msg.chat.username();
    let is_admin = config.is_admin(username);

    let (prompt, next) = match msg.text() {
        Some(PREVIEW_QUIZ) => {
            ("Please, choose a quiz to preview:", QuizState::PreviewSelection)
        }
        Some(CREATE_QUIZ) if is_admin => {
            bot.send_message(msg.chat.id, "Let's create a new quiz! What's its title?")
                .reply_markup(ReplyMarkup::kb_remove())
                .await?;
            dialogue.update(QuizState::ReceiveQuizName).await?;
            return Ok(());
        }
        Some(ADD_QUESTION) if is_admin => {
            ("Which quiz gets the new question?", QuizState::AuthorSelectQuiz)
        }
        Some(EDIT_QUESTION) if is_admin => {
            ("Which quiz has the question to edit?", QuizState::EditSelectQuiz)
        }
        Some(DELETE_QUESTION) if is_admin => {
            ("Which quiz do you want to delete from?", QuizState::DeleteSelectQuiz)
        }
        other => {
            tracing::info!(
                user = username.unwrap_or_default(),
                input = ?other,
                "invalid menu choice"
            );
            bot.send_message(msg.chat.id, "Invalid input. Please try again.")
                .reply_markup(action_keyboard(is_admin))
                .await?;
            return Ok(());
        }
    };

    let quizes = connection.retrieve_all_quiz_names().await?;
    if quizes.is_empty() {
        bot.send_message(msg.chat.id, "No available quizes.").await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, prompt)
        .reply_markup(list_keyboard(&quizes))
        .await?;
    dialogue.update(next).await?;
    Ok(())
}

#[instrument(level = "debug")]
fn preview_scheme() -> SchemeHandler {
    use dptree::case;
    tracing::debug!("Building dispatching tree for preview");
    Update::filter_message()
        .branch(
            case![QuizState::PreviewSelection].endpoint(preview::selection::<Connection>),
        )
        .branch(
            case![QuizState::Previewing { navigator }].endpoint(preview::stray_message),
        )
}

#[instrument(level = "debug")]
fn callback_query_scheme() -> SchemeHandler {
    use dptree::case;
    tracing::debug!("Building dispatching tree for callback query");
    Update::filter_callback_query()
        .branch(case![QuizState::Previewing { navigator }].endpoint(preview::handle_action))
}

#[instrument(level = "debug")]
fn constructor_scheme() -> SchemeHandler {
    use dptree::case;
    tracing::debug!("Building dispatching tree for constructor");
    Update::filter_message()
        .branch(
            case![QuizState::ReceiveQuizName]
                .endpoint(constructor::receive_quiz_name::<Connection>),
        )
        .branch(
            case![QuizState::ReceiveQuizDescription { quiz_name }]
                .endpoint(constructor::receive_quiz_description::<Connection>),
        )
}

#[instrument(level = "debug")]
fn author_scheme() -> SchemeHandler {
    use dptree::case;
    tracing::debug!("Building dispatching tree for authoring");
    Update::filter_message()
        .branch(
            case![QuizState::AuthorSelectQuiz].endpoint(author::select_quiz::<Connection>),
        )
        .branch(
            case![QuizState::ReceiveQuestionText { quiz_name }]
                .endpoint(author::receive_question_text),
        )
        .branch(
            case![QuizState::ReceiveOptions {
                quiz_name,
                target,
                draft
            }]
            .endpoint(author::receive_options),
        )
        .branch(
            case![QuizState::RemoveOption {
                quiz_name,
                target,
                draft
            }]
            .endpoint(author::remove_option),
        )
        .branch(
            case![QuizState::ReceiveCorrectAnswer {
                quiz_name,
                target,
                draft
            }]
            .endpoint(author::receive_correct_answer),
        )
        .branch(
            case![QuizState::ReceiveExplanation {
                quiz_name,
                target,
                draft
            }]
            .endpoint(author::receive_explanation::<Connection>),
        )
}

#[instrument(level = "debug")]
fn editor_scheme() -> SchemeHandler {
    use dptree::case;
    tracing::debug!("Building dispatching tree for editing");
    Update::filter_message()
        .branch(case![QuizState::EditSelectQuiz].endpoint(editor::select_quiz::<Connection>))
        .branch(
            case![QuizState::EditSelectQuestion { quiz_name }]
                .endpoint(editor::select_question::<Connection>),
        )
        .branch(
            case![QuizState::EditQuestionText {
                quiz_name,
                question_id,
                draft
            }]
            .endpoint(editor::receive_question_text),
        )
}

#[instrument(level = "debug")]
fn remover_scheme() -> SchemeHandler {
    use dptree::case;
    tracing::debug!("Building dispatching tree for deletion");
    Update::filter_message()
        .branch(
            case![QuizState::DeleteSelectQuiz].endpoint(remover::select_quiz::<Connection>),
        )
        .branch(
            case![QuizState::DeleteSelectQuestion { quiz_name }]
                .endpoint(remover::select_question),
        )
        .branch(
            case![QuizState::ConfirmDelete {
                quiz_name,
                question_text
            }]
            .endpoint(remover::confirm_delete::<Connection>),
        )
}

#[instrument(level = "info", skip(bot))]
async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Unable to handle the message. Enter /help to see usages.",
    )
    .await?;
    Ok(())
}
