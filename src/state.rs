use uuid::Uuid;

use crate::{authoring::QuestionDraft, navigator::PreviewNavigator};

/// Where a finished draft is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftTarget {
    New,
    Existing(Uuid),
}

#[derive(Debug, Clone, Default)]
pub enum QuizState {
    #[default]
    Start,

    // PART FOR --- PREVIEWING ---
    PreviewSelection,
    Previewing {
        navigator: PreviewNavigator,
    },

    // PART FOR --- CREATING QUIZ ---
    ReceiveQuizName,
    ReceiveQuizDescription {
        quiz_name: String,
    },

    // PART FOR --- AUTHORING QUESTIONS ---
    AuthorSelectQuiz,
    ReceiveQuestionText {
        quiz_name: String,
    },
    ReceiveOptions {
        quiz_name: String,
        target: DraftTarget,
        draft: QuestionDraft,
    },
    RemoveOption {
        quiz_name: String,
        target: DraftTarget,
        draft: QuestionDraft,
    },
    ReceiveCorrectAnswer {
        quiz_name: String,
        target: DraftTarget,
        draft: QuestionDraft,
    },
    ReceiveExplanation {
        quiz_name: String,
        target: DraftTarget,
        draft: QuestionDraft,
    },

    // PART FOR --- EDITING QUESTIONS ---
    EditSelectQuiz,
    EditSelectQuestion {
        quiz_name: String,
    },
    EditQuestionText {
        quiz_name: String,
        question_id: Uuid,
        draft: QuestionDraft,
    },

    // PART FOR --- DELETING ---
    DeleteSelectQuiz,
    DeleteSelectQuestion {
        quiz_name: String,
    },
    ConfirmDelete {
        quiz_name: String,
        question_text: String,
    },
}
