//! Answer matching per exercise kind.
//!
//! Choice exercises compare the picked option exactly. Word-bank exercises
//! compare the space-joined selection case-insensitively with sentence
//! punctuation removed. Fill-in-the-blank compares trimmed text
//! case-insensitively and keeps punctuation significant.

use crate::exercise::{Exercise, ExerciseKind};

/// Punctuation ignored when comparing assembled sentences.
pub const IGNORED_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];

/// Does `submitted` answer `exercise`? Empty submissions never match.
pub fn matches(exercise: &Exercise, submitted: &str) -> bool {
    if submitted.trim().is_empty() {
        return false;
    }
    match exercise.kind {
        ExerciseKind::SelectMeaning | ExerciseKind::ChooseCorrectTranslation => {
            submitted == exercise.correct_answer
        }
        ExerciseKind::TranslateToTarget
        | ExerciseKind::TranslateToSource
        | ExerciseKind::ListenAndType => {
            let expected = normalize_sentence(&exercise.correct_answer);
            !expected.is_empty() && normalize_sentence(submitted) == expected
        }
        ExerciseKind::FillInTheBlank => {
            normalize_text(submitted) == normalize_text(&exercise.correct_answer)
        }
    }
}

/// Lowercase, drop ignored punctuation, collapse whitespace.
pub fn normalize_sentence(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !IGNORED_PUNCTUATION.contains(c))
        .collect::<String>()
        .to_lowercase();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase and trim.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}
