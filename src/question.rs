use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use thiserror::Error;

/// Answer options of a question, kept in the order they were written.
///
/// Serializes as a JSON object. Deserializing keeps document order; a repeated
/// key overwrites the earlier value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options(Vec<(String, String)>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an option, returning the previous text for `key`.
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) -> Option<String> {
        let key = key.into();
        let text = text.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, old)) => Some(std::mem::replace(old, text)),
            None => {
                self.0.push((key, text));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, text)| text.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Options {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut options = Options::new();
        for (key, text) in iter {
            options.insert(key, text);
        }
        options
    }
}

impl Serialize for Options {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, text) in &self.0 {
            map.serialize_entry(key, text)?;
        }
        map.end()
    }
}

struct OptionsVisitor;

impl<'de> Visitor<'de> for OptionsVisitor {
    type Value = Options;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping option keys to option texts")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut options = Options::new();
        while let Some((key, text)) = access.next_entry::<String, String>()? {
            options.insert(key, text);
        }
        Ok(options)
    }
}

impl<'de> Deserialize<'de> for Options {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OptionsVisitor)
    }
}

/// One quiz question: what is shown plus its answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    text: String,
    options: Options,
    correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
}

impl QuestionRecord {
    pub fn new(
        text: impl Into<String>,
        options: Options,
        correct_answer: impl Into<String>,
        explanation: Option<String>,
    ) -> Self {
        Self {
            text: text.into(),
            options,
            correct_answer: correct_answer.into(),
            explanation,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// The explanation, if present and not blank.
    pub fn explanation(&self) -> Option<&str> {
        self.explanation
            .as_deref()
            .filter(|explanation| !explanation.is_empty())
    }

    pub fn is_correct(&self, key: &str) -> bool {
        self.correct_answer == key
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed question data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("question #{index} names '{answer}' as correct, which is not one of its options")]
    UnknownCorrectAnswer { index: usize, answer: String },
}

/// Strictly decodes a JSON array of questions.
pub fn try_decode_questions(raw: &str) -> Result<Vec<QuestionRecord>, DecodeError> {
    let questions: Vec<QuestionRecord> = serde_json::from_str(raw)?;
    for (index, question) in questions.iter().enumerate() {
        if !question.options.contains_key(&question.correct_answer) {
            return Err(DecodeError::UnknownCorrectAnswer {
                index: index + 1,
                answer: question.correct_answer.clone(),
            });
        }
    }
    Ok(questions)
}

/// Decodes question data, failing closed: anything absent, blank or
/// malformed becomes an empty list.
pub fn decode_questions(raw: Option<&str>) -> Vec<QuestionRecord> {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => {
            tracing::debug!("no question data supplied");
            return Vec::new();
        }
    };

    match try_decode_questions(raw) {
        Ok(questions) => {
            tracing::debug!(count = questions.len(), "decoded question data");
            questions
        }
        Err(err) => {
            tracing::warn!(error = %err, "discarding question data");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_keep_document_order() {
        let raw = r#"[{"text":"Pick","options":{"C":"c","A":"a","B":"b"},"correct_answer":"A"}]"#;
        let questions = decode_questions(Some(raw));

        assert_eq!(questions.len(), 1);
        let keys: Vec<&str> = questions[0].options().keys().collect();
        assert_eq!(keys, ["C", "A", "B"]);
    }

    #[test]
    fn repeated_key_overwrites_in_place() {
        let options: Options = [("A", "first"), ("B", "b"), ("A", "second")]
            .into_iter()
            .collect();

        assert_eq!(options.len(), 2);
        assert_eq!(options.iter().next(), Some(("A", "second")));
    }

    #[test]
    fn extra_fields_are_ignored_and_null_explanation_is_none() {
        let raw = r#"[{"id":4,"quiz_id":1,"score":10,"text":"Q","options":{"A":"x"},
                      "correct_answer":"A","explanation":null}]"#;
        let questions = decode_questions(Some(raw));

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].explanation(), None);
    }

    #[test]
    fn blank_explanation_counts_as_missing() {
        let record = QuestionRecord::new(
            "Q",
            [("A", "x")].into_iter().collect(),
            "A",
            Some(String::new()),
        );
        assert_eq!(record.explanation(), None);
    }

    #[test]
    fn absent_or_blank_input_is_empty() {
        assert!(decode_questions(None).is_empty());
        assert!(decode_questions(Some("")).is_empty());
        assert!(decode_questions(Some("   ")).is_empty());
    }

    #[test]
    fn shape_mismatches_fail_closed() {
        let cases = [
            "not json",
            "{}",
            r#"[{"text":"Q"}]"#,
            r#"[{"text":"Q","options":{"A":1},"correct_answer":"A"}]"#,
            r#"[{"text":"Q","options":["x"],"correct_answer":"A"}]"#,
            r#"[{"text":"Q","options":{"A":"x"},"correct_answer":"A","explanation":5}]"#,
        ];
        for raw in cases {
            assert!(decode_questions(Some(raw)).is_empty(), "accepted {raw}");
        }
    }

    #[test]
    fn correct_answer_must_be_an_option() {
        let raw = r#"[{"text":"Q","options":{"A":"x"},"correct_answer":"Z"}]"#;

        match try_decode_questions(raw) {
            Err(DecodeError::UnknownCorrectAnswer { index, answer }) => {
                assert_eq!(index, 1);
                assert_eq!(answer, "Z");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(decode_questions(Some(raw)).is_empty());
    }

    #[test]
    fn serializes_back_to_the_input_shape() {
        let record = QuestionRecord::new(
            "Q1",
            [("B", "y"), ("A", "x")].into_iter().collect(),
            "B",
            None,
        );
        let json = serde_json::to_string(&record).unwrap();

        assert_eq!(
            json,
            r#"{"text":"Q1","options":{"B":"y","A":"x"},"correct_answer":"B"}"#
        );
    }
}
