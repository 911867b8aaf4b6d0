use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};

use crate::{
    authoring::OptionRows,
    navigator::{OptionMark, PreviewView},
    preview::PreviewAction,
};

pub(crate) const PREVIEW_QUIZ: &str = "Preview a quiz👀";
pub(crate) const CREATE_QUIZ: &str = "Create a new quiz🏗️";
pub(crate) const ADD_QUESTION: &str = "Add a question✏️";
pub(crate) const EDIT_QUESTION: &str = "Edit a question📝";
pub(crate) const DELETE_QUESTION: &str = "Delete a question🗑️";

pub(crate) const YES: &str = "Yes✔️";
pub(crate) const NO: &str = "No❌";

pub(crate) const REMOVE_OPTION: &str = "Remove option➖";
pub(crate) const DONE: &str = "Done✔️";
pub(crate) const BACK: &str = "Back↩️";
pub(crate) const SKIP: &str = "Skip⏭️";
pub(crate) const KEEP_TEXT: &str = "Keep text⏭️";
pub(crate) const CLEAR_EXPLANATION: &str = "No explanation🚫";

pub(crate) fn is_yes(text: &str) -> bool {
    matches!(text, "Yes" | YES)
}

pub(crate) fn is_no(text: &str) -> bool {
    matches!(text, "No" | NO)
}

pub(crate) fn yes_no_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(YES), KeyboardButton::new(NO)]])
}

pub(crate) fn action_keyboard(is_admin: bool) -> KeyboardMarkup {
    let mut keyboard = vec![vec![KeyboardButton::new(PREVIEW_QUIZ)]];

    if is_admin {
        keyboard.push(vec![KeyboardButton::new(CREATE_QUIZ)]);
        keyboard.push(vec![
            KeyboardButton::new(ADD_QUESTION),
            KeyboardButton::new(EDIT_QUESTION),
            KeyboardButton::new(DELETE_QUESTION),
        ]);
    }

    KeyboardMarkup::new(keyboard)
}

/// One button per entry, one entry per row.
pub(crate) fn list_keyboard<S: AsRef<str>>(entries: &[S]) -> KeyboardMarkup {
    let keyboard = entries
        .iter()
        .map(|entry| vec![KeyboardButton::new(entry.as_ref())]);

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn options_form_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(REMOVE_OPTION),
        KeyboardButton::new(DONE),
    ]])
}

pub(crate) fn option_rows_keyboard(rows: &OptionRows) -> KeyboardMarkup {
    let mut keyboard: Vec<Vec<KeyboardButton>> = rows
        .rows()
        .iter()
        .map(|row| vec![KeyboardButton::new(row.label())])
        .collect();
    keyboard.push(vec![KeyboardButton::new(BACK)]);

    KeyboardMarkup::new(keyboard)
}

/// Skip leaves the explanation as it is; a draft that has one may also drop it.
pub(crate) fn explanation_keyboard(has_explanation: bool) -> KeyboardMarkup {
    let mut row = vec![KeyboardButton::new(SKIP)];
    if has_explanation {
        row.push(KeyboardButton::new(CLEAR_EXPLANATION));
    }

    KeyboardMarkup::new(vec![row])
}

pub(crate) fn keep_text_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(KEEP_TEXT)]])
}

fn mark_prefix(mark: Option<OptionMark>) -> &'static str {
    match mark {
        Some(OptionMark::Correct) => "✅ ",
        Some(OptionMark::Incorrect) => "❌ ",
        None => "",
    }
}

/// Telegram rejects longer message texts.
pub(crate) const MAX_MESSAGE_CHARS: usize = 4096;

/// Message text of a preview: progress, question, then explanation notes.
///
/// Repeated notes are drawn once with a count. If the result is still too
/// long the question text is cut first, so the notes stay visible.
pub(crate) fn preview_text(view: &PreviewView) -> String {
    let mut notes: Vec<(&str, usize)> = Vec::new();
    for note in view.notes() {
        match notes.iter_mut().find(|(seen, _)| *seen == note.as_str()) {
            Some((_, count)) => *count += 1,
            None => notes.push((note, 1)),
        }
    }

    let mut tail = String::new();
    for (note, count) in notes {
        tail.push_str("\n\nℹ️ ");
        tail.push_str(note);
        if count > 1 {
            tail.push_str(&format!(" (×{count})"));
        }
    }

    let head = format!("{}\n\n{}", view.progress(), view.question_text());
    let tail_len = tail.chars().count();
    let head_budget = MAX_MESSAGE_CHARS.saturating_sub(tail_len);
    let mut text = truncate(&head, head_budget);
    text.push_str(&tail);
    truncate(&text, MAX_MESSAGE_CHARS)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Option buttons followed by the navigation row. Disabled navigation
/// buttons are left out.
pub(crate) fn preview_keyboard(view: &PreviewView) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = view
        .options()
        .iter()
        .map(|entry| {
            vec![InlineKeyboardButton::callback(
                format!("{}{}", mark_prefix(entry.mark()), entry.label()),
                PreviewAction::Select(entry.key().to_owned()).callback_data(),
            )]
        })
        .collect();

    let mut navigation = Vec::new();
    if view.prev_enabled() {
        navigation.push(InlineKeyboardButton::callback(
            "⬅️ Previous",
            PreviewAction::Previous.callback_data(),
        ));
    }
    if view.next_enabled() {
        navigation.push(InlineKeyboardButton::callback(
            "Next ➡️",
            PreviewAction::Next.callback_data(),
        ));
    }
    if !navigation.is_empty() {
        keyboard.push(navigation);
    }
    keyboard.push(vec![InlineKeyboardButton::callback(
        "Close preview",
        PreviewAction::Close.callback_data(),
    )]);

    InlineKeyboardMarkup::new(keyboard)
}
