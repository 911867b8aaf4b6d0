use state::QuizState;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::Dialogue};

pub mod author;
pub mod authoring;
pub mod commands;
pub mod config;
pub mod constructor;
pub mod database;
pub mod editor;
pub mod keyboard;
pub mod navigator;
pub mod notify;
pub mod preview;
pub mod question;
pub mod remover;
pub mod schema;
pub mod state;
pub mod telemetry;

type UserDialogue = Dialogue<QuizState, InMemStorage<QuizState>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
