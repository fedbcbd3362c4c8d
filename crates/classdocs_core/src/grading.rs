//! crates/classdocs_core/src/grading.rs
//!
//! The grading engine: parsing hand-authored answer files into
//! (question number, selected option) pairs and comparing a student
//! response against an answer key.
//!
//! Response files are free text, so unparsable lines are collected as
//! warnings instead of aborting the grade pass. Scoring policy: a key
//! entry with no matching response counts as incorrect, a response entry
//! with no matching key entry is recorded but never enters the
//! denominator, and the total score is matches / key entries.

/// One parsed answer line: question number and the selected option letter
/// (always stored uppercase).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerEntry {
    pub number: u32,
    pub option: char,
}

/// The outcome of parsing one answer file.
#[derive(Debug, Clone, Default)]
pub struct ParsedAnswers {
    pub entries: Vec<AnswerEntry>,
    pub warnings: Vec<String>,
}

/// Parses answer lines of the form `1: A`, `1) A` or `1. A`.
///
/// Blank lines and `#`-prefixed headings (the generator emits a
/// `### Answer Key` heading) are ignored. A duplicated question number
/// keeps the last occurrence. Anything else becomes a warning.
pub fn parse_answers(text: &str) -> ParsedAnswers {
    let mut parsed = ParsedAnswers::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_line(line) {
            Some(entry) => {
                if let Some(existing) = parsed.entries.iter_mut().find(|e| e.number == entry.number)
                {
                    *existing = entry;
                } else {
                    parsed.entries.push(entry);
                }
            }
            None => parsed
                .warnings
                .push(format!("line {}: unparsable answer '{}'", idx + 1, line)),
        }
    }

    parsed
}

fn parse_line(line: &str) -> Option<AnswerEntry> {
    let digits: String = line.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let rest = &line[digits.len()..];
    let rest = rest.trim_start();
    let rest = rest.strip_prefix(&[':', ')', '.'][..])?;
    let option = rest.trim_start().chars().next()?;
    if !option.is_ascii_alphanumeric() {
        return None;
    }
    Some(AnswerEntry {
        number: digits.parse().ok()?,
        option: option.to_ascii_uppercase(),
    })
}

/// Per-question grading outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub number: u32,
    pub expected: char,
    /// `None` when the question was left unanswered.
    pub given: Option<char>,
    pub correct: bool,
}

/// The full report for one response file against one answer key.
#[derive(Debug, Clone)]
pub struct GradeReport {
    pub results: Vec<QuestionResult>,
    /// Response entries whose question number has no key entry. Scored
    /// misses; they do not change the denominator.
    pub extra_responses: Vec<AnswerEntry>,
    pub correct_count: usize,
    pub total: usize,
    pub warnings: Vec<String>,
}

impl GradeReport {
    /// Score as a fraction in `[0, 1]`; 0 for an empty key.
    pub fn score(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct_count as f64 / self.total as f64
        }
    }
}

/// Compares a response against a key, question number by question number.
pub fn grade(key: &[AnswerEntry], responses: &[AnswerEntry]) -> GradeReport {
    let mut results = Vec::with_capacity(key.len());
    let mut correct_count = 0;

    for entry in key {
        let given = responses
            .iter()
            .find(|r| r.number == entry.number)
            .map(|r| r.option);
        let correct = given == Some(entry.option);
        if correct {
            correct_count += 1;
        }
        results.push(QuestionResult {
            number: entry.number,
            expected: entry.option,
            given,
            correct,
        });
    }

    let extra_responses = responses
        .iter()
        .filter(|r| !key.iter().any(|k| k.number == r.number))
        .copied()
        .collect();

    GradeReport {
        results,
        extra_responses,
        correct_count,
        total: key.len(),
        warnings: Vec::new(),
    }
}
