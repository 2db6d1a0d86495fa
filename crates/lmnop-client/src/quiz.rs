//! Built-in quiz catalogue and grading.
//!
//! Quiz sheets are local JSON documents, independent of the backend's
//! `/quizzes` resource. Answers are keyed by question text and compared by
//! exact string equality.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Titles of the catalogue quizzes, in page order (`/quiz1` .. `/quiz5`).
pub const CATALOG: [&str; 5] = [
    "Introduction to Programming",
    "Web Development",
    "Database Management",
    "Networking Fundamentals",
    "Cybersecurity Basics",
];

/// Title of catalogue quiz `n`, counting from 1.
#[must_use]
pub fn catalog_title(n: usize) -> Option<&'static str> {
    n.checked_sub(1).and_then(|i| CATALOG.get(i)).copied()
}

/// How a question is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// Pick one of the listed options.
    Multiple(Vec<String>),
    /// `"True"` or `"False"`.
    TrueFalse,
}

/// One question of a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question text; also the key of its answer.
    pub question: String,
    /// `"multiple"`, or anything else for a True/False question.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Choices for a `multiple` question.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Expected answer.
    pub answer: String,
}

impl Question {
    /// The answering mode.
    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        if self.kind == "multiple" {
            QuestionKind::Multiple(self.options.clone())
        } else {
            QuestionKind::TrueFalse
        }
    }

    /// Choices offered to the student.
    #[must_use]
    pub fn choices(&self) -> Vec<String> {
        match self.kind() {
            QuestionKind::Multiple(options) => options,
            QuestionKind::TrueFalse => vec!["True".to_string(), "False".to_string()],
        }
    }
}

/// A quiz with its questions and answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSheet {
    /// Catalogue number.
    #[serde(default)]
    pub id: usize,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Questions in display order.
    pub questions: Vec<Question>,
}

impl QuizSheet {
    /// Reads a sheet from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Reads a `{question: answer}` map from a JSON file.
pub fn load_answers(path: &Path) -> Result<HashMap<String, String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Grading of a single question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Question text.
    pub question: String,
    /// What the student chose, if anything.
    pub given: Option<String>,
    /// Expected answer.
    pub expected: String,
    /// Whether `given` equals `expected`.
    pub correct: bool,
}

/// Result of grading a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    /// Number of correct answers.
    pub score: usize,
    /// Number of questions.
    pub total: usize,
    /// Per-question outcomes in sheet order.
    pub outcomes: Vec<Outcome>,
}

/// Grades `answers` against `sheet`. Unanswered questions are incorrect.
#[must_use]
pub fn grade(sheet: &QuizSheet, answers: &HashMap<String, String>) -> QuizResult {
    let outcomes: Vec<Outcome> = sheet
        .questions
        .iter()
        .map(|q| {
            let given = answers.get(&q.question).cloned();
            Outcome {
                correct: given.as_deref() == Some(q.answer.as_str()),
                question: q.question.clone(),
                given,
                expected: q.answer.clone(),
            }
        })
        .collect();

    QuizResult {
        score: outcomes.iter().filter(|o| o.correct).count(),
        total: outcomes.len(),
        outcomes,
    }
}
