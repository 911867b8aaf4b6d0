//! Question authoring form: editable option rows and the draft they feed.

use thiserror::Error;

use crate::question::{Options, QuestionRecord};

/// Longest accepted option key.
pub const MAX_KEY_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Question text is required")]
    MissingText,

    #[error("At least one option is required")]
    NoOptions,

    #[error("Correct answer is required")]
    MissingCorrectAnswer,

    #[error("Correct answer must be one of the options")]
    UnknownCorrectAnswer,

    #[error("'{0}' is not an option. Send it as KEY: text")]
    MalformedOptionLine(String),

    #[error("Option key '{0}' is longer than {MAX_KEY_LEN} characters")]
    KeyTooLong(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionRow {
    pub key: String,
    pub value: String,
}

impl OptionRow {
    pub fn label(&self) -> String {
        format!("{}: {}", self.key.trim(), self.value.trim())
    }
}

/// Parses one `KEY: text` line.
pub fn parse_option_line(line: &str) -> Result<OptionRow, DraftError> {
    let (key, value) = line
        .split_once(':')
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .ok_or_else(|| DraftError::MalformedOptionLine(line.trim().to_owned()))?;

    if key.chars().count() > MAX_KEY_LEN {
        return Err(DraftError::KeyTooLong(key.to_owned()));
    }

    Ok(OptionRow {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}

/// Option rows of the form, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionRows {
    rows: Vec<OptionRow>,
}

impl OptionRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a blank row and returns its index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(OptionRow::default());
        self.rows.len() - 1
    }

    pub fn push(&mut self, row: OptionRow) {
        self.rows.push(row);
    }

    /// Fills row `index`. Returns `false` if there is no such row.
    pub fn set_row(
        &mut self,
        index: usize,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.key = key.into();
                row.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn remove_row(&mut self, index: usize) -> Option<OptionRow> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    pub fn rows(&self) -> &[OptionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keys the correct answer may be picked from: every non-blank key, in
    /// row order.
    pub fn correct_answer_choices(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Rows with both a key and a text. A later row with the same key wins.
    pub fn to_options(&self) -> Options {
        self.rows
            .iter()
            .map(|row| (row.key.trim(), row.value.trim()))
            .filter(|(key, value)| !key.is_empty() && !value.is_empty())
            .collect()
    }
}

/// A question being written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    text: String,
    rows: OptionRows,
    correct_answer: Option<String>,
    explanation: Option<String>,
}

impl QuestionDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Reopens a stored question for editing.
    pub fn from_record(record: &QuestionRecord) -> Self {
        let mut rows = OptionRows::new();
        for (key, value) in record.options().iter() {
            rows.push(OptionRow {
                key: key.to_owned(),
                value: value.to_owned(),
            });
        }

        Self {
            text: record.text().to_owned(),
            rows,
            correct_answer: Some(record.correct_answer().to_owned()),
            explanation: record.explanation().map(str::to_owned),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn correct_answer(&self) -> Option<&str> {
        self.correct_answer.as_deref()
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    pub fn rows(&self) -> &OptionRows {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut OptionRows {
        &mut self.rows
    }

    pub fn set_correct_answer(&mut self, key: impl Into<String>) {
        self.correct_answer = Some(key.into());
    }

    pub fn set_explanation(&mut self, explanation: Option<String>) {
        self.explanation = explanation;
    }

    /// Checks the draft and turns it into a record.
    pub fn finish(&self) -> Result<QuestionRecord, DraftError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(DraftError::MissingText);
        }

        let options = self.rows.to_options();
        if options.is_empty() {
            return Err(DraftError::NoOptions);
        }

        let correct_answer = self
            .correct_answer
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(DraftError::MissingCorrectAnswer)?;
        if !options.contains_key(correct_answer) {
            return Err(DraftError::UnknownCorrectAnswer);
        }

        let explanation = self
            .explanation
            .as_deref()
            .map(str::trim)
            .filter(|explanation| !explanation.is_empty())
            .map(str::to_owned);

        Ok(QuestionRecord::new(text, options, correct_answer, explanation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, value: &str) -> OptionRow {
        OptionRow {
            key: key.to_owned(),
            value: value.to_owned(),
        }
    }

    #[test]
    fn parses_option_lines() {
        assert_eq!(parse_option_line(" A :  Paris ").unwrap(), row("A", "Paris"));
        assert_eq!(
            parse_option_line("B: 12:30 sharp").unwrap(),
            row("B", "12:30 sharp")
        );
        assert_eq!(
            parse_option_line("Paris"),
            Err(DraftError::MalformedOptionLine("Paris".to_owned()))
        );
        assert!(parse_option_line("A:").is_err());
        assert!(parse_option_line(": text").is_err());
        assert_eq!(
            parse_option_line("ABCDEF: text"),
            Err(DraftError::KeyTooLong("ABCDEF".to_owned()))
        );
    }

    #[test]
    fn choices_follow_added_and_removed_rows() {
        let mut rows = OptionRows::new();
        rows.push(row("A", "x"));
        let blank = rows.add_row();
        rows.push(row("C", "z"));
        assert_eq!(rows.correct_answer_choices(), ["A", "C"]);

        assert!(rows.set_row(blank, " B ", "y"));
        assert_eq!(rows.correct_answer_choices(), ["A", "B", "C"]);

        assert_eq!(rows.remove_row(0), Some(row("A", "x")));
        assert_eq!(rows.correct_answer_choices(), ["B", "C"]);
    }

    #[test]
    fn out_of_range_rows_are_left_alone() {
        let mut rows = OptionRows::new();
        rows.push(row("A", "x"));

        assert_eq!(rows.remove_row(3), None);
        assert!(!rows.set_row(1, "B", "y"));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn options_skip_incomplete_rows() {
        let mut rows = OptionRows::new();
        rows.push(row("A", "x"));
        rows.push(row("B", ""));
        rows.add_row();

        let options = rows.to_options();
        assert_eq!(options.len(), 1);
        assert_eq!(options.get("A"), Some("x"));
    }

    #[test]
    fn validation_reports_first_problem() {
        let mut draft = QuestionDraft::new("  ");
        assert_eq!(draft.finish(), Err(DraftError::MissingText));

        draft = QuestionDraft::new("Capital of France?");
        assert_eq!(draft.finish(), Err(DraftError::NoOptions));

        draft.rows_mut().push(row("A", "Paris"));
        draft.rows_mut().push(row("B", "Lyon"));
        assert_eq!(draft.finish(), Err(DraftError::MissingCorrectAnswer));

        draft.set_correct_answer("C");
        assert_eq!(draft.finish(), Err(DraftError::UnknownCorrectAnswer));

        draft.set_correct_answer("A");
        assert!(draft.finish().is_ok());
    }

    #[test]
    fn finished_record_carries_everything() {
        let mut draft = QuestionDraft::new("Capital of France?");
        draft.rows_mut().push(row("B", "Lyon"));
        draft.rows_mut().push(row("A", "Paris"));
        draft.set_correct_answer("A");
        draft.set_explanation(Some("Paris is the capital.".to_owned()));

        let record = draft.finish().unwrap();
        assert_eq!(record.text(), "Capital of France?");
        assert_eq!(record.options().keys().collect::<Vec<_>>(), ["B", "A"]);
        assert_eq!(record.correct_answer(), "A");
        assert_eq!(record.explanation(), Some("Paris is the capital."));
    }

    #[test]
    fn reopened_record_finishes_unchanged() {
        let record = QuestionRecord::new(
            "Capital of France?",
            [("B", "Lyon"), ("A", "Paris")].into_iter().collect::<Options>(),
            "A",
            Some("Paris is the capital.".to_owned()),
        );

        let draft = QuestionDraft::from_record(&record);
        assert_eq!(draft.rows().correct_answer_choices(), ["B", "A"]);
        assert_eq!(draft.correct_answer(), Some("A"));
        assert_eq!(draft.finish(), Ok(record));
    }

    #[test]
    fn edits_to_a_reopened_record_are_validated() {
        let record = QuestionRecord::new(
            "Q",
            [("A", "x"), ("B", "y")].into_iter().collect::<Options>(),
            "B",
            None,
        );
        let mut draft = QuestionDraft::from_record(&record);

        draft.set_text("Q, reworded");
        draft.rows_mut().remove_row(1);
        draft.rows_mut().push(row("C", "z"));
        assert_eq!(draft.rows().correct_answer_choices(), ["A", "C"]);
        assert_eq!(draft.finish(), Err(DraftError::UnknownCorrectAnswer));

        draft.set_correct_answer("C");
        let edited = draft.finish().unwrap();
        assert_eq!(edited.text(), "Q, reworded");
        assert_eq!(edited.options().keys().collect::<Vec<_>>(), ["A", "C"]);
        assert_eq!(edited.correct_answer(), "C");
    }

    #[test]
    fn blank_explanation_is_dropped() {
        let mut draft = QuestionDraft::new("Q");
        draft.rows_mut().push(row("A", "x"));
        draft.set_correct_answer("A");
        draft.set_explanation(Some("   ".to_owned()));

        assert_eq!(draft.finish().unwrap().explanation(), None);
    }
}
