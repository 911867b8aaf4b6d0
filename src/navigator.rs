//! Preview navigator: steps through a fixed list of questions and keeps the
//! rendered view of the current one.
//!
//! Nothing here knows about Telegram. The bot translates button presses into
//! [`PreviewNavigator::advance`], [`PreviewNavigator::retreat`] and
//! [`PreviewNavigator::select_option`] and draws whatever
//! [`PreviewNavigator::view`] holds afterwards.

use crate::question::{decode_questions, QuestionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    key: String,
    label: String,
    mark: Option<OptionMark>,
}

impl OptionEntry {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// `"<key>: <text>"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn mark(&self) -> Option<OptionMark> {
        self.mark
    }
}

/// Everything drawn for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    question_text: String,
    options: Vec<OptionEntry>,
    notes: Vec<String>,
    progress: String,
    prev_enabled: bool,
    next_enabled: bool,
}

impl PreviewView {
    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    pub fn options(&self) -> &[OptionEntry] {
        &self.options
    }

    /// Explanation notes appended below the options, oldest first.
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn progress(&self) -> &str {
        &self.progress
    }

    pub fn prev_enabled(&self) -> bool {
        self.prev_enabled
    }

    pub fn next_enabled(&self) -> bool {
        self.next_enabled
    }

    pub fn option(&self, key: &str) -> Option<&OptionEntry> {
        self.options.iter().find(|entry| entry.key == key)
    }
}

/// Renders the question at `index`, or nothing if `index` is out of range.
pub fn render(questions: &[QuestionRecord], index: usize) -> Option<PreviewView> {
    let question = questions.get(index)?;
    let last = questions.len() - 1;

    Some(PreviewView {
        question_text: question.text().to_owned(),
        options: question
            .options()
            .iter()
            .map(|(key, text)| OptionEntry {
                key: key.to_owned(),
                label: format!("{key}: {text}"),
                mark: None,
            })
            .collect(),
        notes: Vec::new(),
        progress: format!("Question {} of {}", index + 1, questions.len()),
        prev_enabled: index != 0,
        next_enabled: index != last,
    })
}

/// Position within a fixed question list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigatorState {
    questions: Vec<QuestionRecord>,
    current_index: usize,
}

impl NavigatorState {
    pub fn new(questions: Vec<QuestionRecord>) -> Self {
        Self {
            questions,
            current_index: 0,
        }
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current(&self) -> Option<&QuestionRecord> {
        self.questions.get(self.current_index)
    }

    /// Moves forward one question. Returns `false` at the last question.
    pub fn advance(&mut self) -> bool {
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Moves back one question. Returns `false` at the first question.
    pub fn retreat(&mut self) -> bool {
        if self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }
}

/// Navigator state together with the view rendered from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewNavigator {
    state: NavigatorState,
    view: Option<PreviewView>,
}

impl PreviewNavigator {
    pub fn new(questions: Vec<QuestionRecord>) -> Self {
        let view = render(&questions, 0);
        Self {
            state: NavigatorState::new(questions),
            view,
        }
    }

    /// Builds a navigator from JSON question data; unusable data gives an
    /// empty navigator.
    pub fn from_json(raw: Option<&str>) -> Self {
        Self::new(decode_questions(raw))
    }

    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index()
    }

    pub fn view(&self) -> Option<&PreviewView> {
        self.view.as_ref()
    }

    pub fn prev_enabled(&self) -> bool {
        self.view.as_ref().is_some_and(PreviewView::prev_enabled)
    }

    pub fn next_enabled(&self) -> bool {
        self.view.as_ref().is_some_and(PreviewView::next_enabled)
    }

    pub fn advance(&mut self) -> bool {
        let moved = self.state.advance();
        if moved {
            self.rerender();
        }
        moved
    }

    pub fn retreat(&mut self) -> bool {
        let moved = self.state.retreat();
        if moved {
            self.rerender();
        }
        moved
    }

    /// Marks the answer for the current question after `key` was picked.
    ///
    /// The correct option is always marked correct; a wrong pick is also
    /// marked incorrect and, when the question has an explanation, appends it
    /// as a note. Marks and notes accumulate until the question is rendered
    /// again. Returns whether the view changed, so `false` both when `key`
    /// is not on display and when the pick adds nothing new.
    pub fn select_option(&mut self, key: &str) -> bool {
        let (Some(view), Some(question)) = (self.view.as_mut(), self.state.current()) else {
            return false;
        };
        if view.option(key).is_none() {
            return false;
        }

        let mut changed = false;
        for entry in &mut view.options {
            let mark = if question.is_correct(&entry.key) {
                OptionMark::Correct
            } else if entry.key == key {
                OptionMark::Incorrect
            } else {
                continue;
            };
            if entry.mark != Some(mark) {
                entry.mark = Some(mark);
                changed = true;
            }
        }

        if !question.is_correct(key) {
            if let Some(explanation) = question.explanation() {
                view.notes.push(explanation.to_owned());
                changed = true;
            }
        }
        changed
    }

    fn rerender(&mut self) {
        self.view = render(self.state.questions(), self.state.current_index());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::Options;

    fn question(text: &str, options: &[(&str, &str)], correct: &str) -> QuestionRecord {
        QuestionRecord::new(
            text,
            options.iter().copied().collect::<Options>(),
            correct,
            None,
        )
    }

    fn explained(text: &str, options: &[(&str, &str)], correct: &str, why: &str) -> QuestionRecord {
        QuestionRecord::new(
            text,
            options.iter().copied().collect::<Options>(),
            correct,
            Some(why.to_owned()),
        )
    }

    fn three_questions() -> Vec<QuestionRecord> {
        vec![
            question("Q1", &[("A", "x"), ("B", "y")], "B"),
            question("Q2", &[("A", "1")], "A"),
            question("Q3", &[("T", "true"), ("F", "false")], "F"),
        ]
    }

    #[test]
    fn starts_on_first_question() {
        let navigator = PreviewNavigator::new(three_questions());
        let view = navigator.view().unwrap();

        assert_eq!(navigator.current_index(), 0);
        assert_eq!(view.progress(), "Question 1 of 3");
        assert_eq!(view.question_text(), "Q1");
    }

    #[test]
    fn options_are_labelled_in_stored_order() {
        let navigator = PreviewNavigator::new(vec![question(
            "Q",
            &[("C", "third"), ("A", "first")],
            "A",
        )]);
        let labels: Vec<&str> = navigator
            .view()
            .unwrap()
            .options()
            .iter()
            .map(OptionEntry::label)
            .collect();

        assert_eq!(labels, ["C: third", "A: first"]);
    }

    #[test]
    fn advance_stops_at_last_question() {
        let mut navigator = PreviewNavigator::new(three_questions());

        assert!(navigator.advance());
        assert!(navigator.advance());
        assert_eq!(navigator.current_index(), 2);

        assert!(!navigator.advance());
        assert_eq!(navigator.current_index(), 2);
        assert_eq!(navigator.view().unwrap().progress(), "Question 3 of 3");
    }

    #[test]
    fn retreat_at_start_is_noop() {
        let mut navigator = PreviewNavigator::new(three_questions());
        let before = navigator.clone();

        assert!(!navigator.retreat());
        assert_eq!(navigator, before);
    }

    #[test]
    fn retreat_moves_back() {
        let mut navigator = PreviewNavigator::new(three_questions());
        navigator.advance();
        navigator.advance();

        assert!(navigator.retreat());
        assert_eq!(navigator.current_index(), 1);
        assert_eq!(navigator.view().unwrap().question_text(), "Q2");
    }

    #[test]
    fn button_state_follows_boundaries_at_every_index() {
        let questions = three_questions();
        let last = questions.len() - 1;
        let mut navigator = PreviewNavigator::new(questions);

        for index in 0..=last {
            assert_eq!(navigator.current_index(), index);
            assert_eq!(navigator.prev_enabled(), index != 0, "prev at {index}");
            assert_eq!(navigator.next_enabled(), index != last, "next at {index}");
            navigator.advance();
        }
    }

    #[test]
    fn single_question_disables_both_buttons() {
        let navigator = PreviewNavigator::new(vec![question("Q", &[("A", "x")], "A")]);

        assert!(!navigator.prev_enabled());
        assert!(!navigator.next_enabled());
    }

    #[test]
    fn wrong_pick_marks_both_options() {
        let mut navigator =
            PreviewNavigator::new(vec![question("Q1", &[("A", "x"), ("B", "y")], "B")]);

        assert!(navigator.select_option("A"));
        let view = navigator.view().unwrap();
        assert_eq!(view.option("A").unwrap().mark(), Some(OptionMark::Incorrect));
        assert_eq!(view.option("B").unwrap().mark(), Some(OptionMark::Correct));
        assert!(view.notes().is_empty());
    }

    #[test]
    fn right_pick_marks_only_correct_option() {
        let mut navigator =
            PreviewNavigator::new(vec![explained("Q1", &[("A", "x"), ("B", "y")], "B", "Because")]);

        navigator.select_option("B");
        let view = navigator.view().unwrap();
        assert_eq!(view.option("A").unwrap().mark(), None);
        assert_eq!(view.option("B").unwrap().mark(), Some(OptionMark::Correct));
        assert!(view.notes().is_empty());
    }

    #[test]
    fn repeated_wrong_picks_append_repeated_notes() {
        let mut navigator = PreviewNavigator::new(vec![explained(
            "Q1",
            &[("A", "x"), ("B", "y")],
            "B",
            "Because B is right",
        )]);

        navigator.select_option("A");
        assert_eq!(navigator.view().unwrap().notes(), ["Because B is right"]);

        navigator.select_option("A");
        assert_eq!(
            navigator.view().unwrap().notes(),
            ["Because B is right", "Because B is right"]
        );
    }

    #[test]
    fn marks_accumulate_across_picks() {
        let mut navigator = PreviewNavigator::new(vec![question(
            "Q",
            &[("A", "x"), ("B", "y"), ("C", "z")],
            "B",
        )]);

        navigator.select_option("A");
        navigator.select_option("C");
        let view = navigator.view().unwrap();
        assert_eq!(view.option("A").unwrap().mark(), Some(OptionMark::Incorrect));
        assert_eq!(view.option("C").unwrap().mark(), Some(OptionMark::Incorrect));
    }

    #[test]
    fn navigation_resets_selection() {
        let mut navigator = PreviewNavigator::new(vec![
            explained("Q1", &[("A", "x"), ("B", "y")], "B", "Because"),
            question("Q2", &[("A", "1")], "A"),
        ]);

        navigator.select_option("A");
        navigator.advance();
        navigator.retreat();

        let view = navigator.view().unwrap();
        assert!(view.options().iter().all(|entry| entry.mark().is_none()));
        assert!(view.notes().is_empty());
    }

    #[test]
    fn selection_leaves_position_alone() {
        let mut navigator = PreviewNavigator::new(three_questions());
        navigator.advance();

        navigator.select_option("A");
        assert_eq!(navigator.current_index(), 1);
        assert!(navigator.advance());
    }

    #[test]
    fn repeat_pick_without_new_marks_reports_no_change() {
        let mut navigator =
            PreviewNavigator::new(vec![question("Q1", &[("A", "x"), ("B", "y")], "B")]);

        assert!(navigator.select_option("B"));
        let after_first = navigator.clone();
        assert!(!navigator.select_option("B"));
        assert_eq!(navigator, after_first);

        assert!(navigator.select_option("A"));
        let after_wrong = navigator.clone();
        assert!(!navigator.select_option("A"));
        assert_eq!(navigator, after_wrong);
    }

    #[test]
    fn repeat_wrong_pick_with_explanation_still_changes_view() {
        let mut navigator = PreviewNavigator::new(vec![explained(
            "Q1",
            &[("A", "x"), ("B", "y")],
            "B",
            "Because B is right",
        )]);

        assert!(navigator.select_option("A"));
        assert!(navigator.select_option("A"));
        assert_eq!(navigator.view().unwrap().notes().len(), 2);
    }

    #[test]
    fn unknown_key_is_ignored() {
        let mut navigator = PreviewNavigator::new(three_questions());
        let before = navigator.clone();

        assert!(!navigator.select_option("Z"));
        assert_eq!(navigator, before);
    }

    #[test]
    fn empty_navigator_is_inert() {
        let mut navigator = PreviewNavigator::new(Vec::new());

        assert!(navigator.view().is_none());
        assert!(!navigator.prev_enabled());
        assert!(!navigator.next_enabled());
        assert!(!navigator.advance());
        assert!(!navigator.retreat());
        assert!(!navigator.select_option("A"));
        assert!(navigator.view().is_none());
    }

    #[test]
    fn render_is_deterministic_and_bounded() {
        let questions = three_questions();

        assert_eq!(render(&questions, 1), render(&questions, 1));
        assert!(render(&questions, 3).is_none());
        assert!(render(&[], 0).is_none());
    }
}
