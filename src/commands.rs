use std::sync::Arc;

use teloxide::{
    payloads::SendMessageSetters, prelude::Requester, types::Message, utils::command::BotCommands,
    Bot,
};

use crate::{
    config::Config, keyboard::action_keyboard, state::QuizState, HandlerResult, UserDialogue,
};

#[derive(Debug, Clone, BotCommands)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "display help.")]
    Help,
    #[command(description = "start the bot.")]
    Start,
    #[command(description = "leave the current preview or form.")]
    Cancel,
}

pub(crate) async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

pub(crate) async fn cancel(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    config: Arc<Config>,
) -> HandlerResult {
    dialogue.update(QuizState::Start).await?;
    bot.send_message(msg.chat.id, "Cancelled. What do you want to do now?")
        .reply_markup(action_keyboard(config.is_admin(msg.chat.username())))
        .await?;
    Ok(())
}

pub(crate) async fn start(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    config: Arc<Config>,
) -> HandlerResult {
    bot.send_message(msg.chat.id, "Please choose what to do:")
        .reply_markup(action_keyboard(config.is_admin(msg.chat.username())))
        .await?;
    dialogue.update(QuizState::Start).await?;
    Ok(())
}
