//! Answer binding context construction.
//!
//! For each question in the pool (in pool order) the binder looks up the
//! answer in the assessment's answer map (missing answers bind as `""`) and
//! produces four parallel views: by question id, by human identifier, by a
//! sanitized collision-free key, and a flattened per-question row list. The
//! sanitized-key map is also merged into the top level of the context so a
//! template can reference an answer as `{{ consent_records }}`.

use std::collections::HashSet;

use serde_json::{Map, Value};

use rtk_core::entities::{Assessment, QuestionPool, Study};

/// Reduce a question identifier to a template-safe key: lowercase, every run
/// of characters outside `[a-z0-9]` collapsed to a single underscore, leading
/// and trailing underscores stripped. An empty result falls back to
/// `question`; a leading digit gets a `q_` prefix.
#[must_use]
pub fn sanitize_identifier(value: &str) -> String {
    let mut key = String::new();
    let mut last_was_underscore = false;
    for c in value.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            key.push('_');
            last_was_underscore = true;
        }
    }
    let key = key.trim_matches('_');
    if key.is_empty() {
        return "question".to_string();
    }
    if key.as_bytes()[0].is_ascii_digit() {
        format!("q_{key}")
    } else {
        key.to_string()
    }
}

/// Tracks sanitized keys handed out within one binding pass and disambiguates
/// collisions with `_2`, `_3`, ... suffixes, in pool order.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    used: HashSet<String>,
}

impl KeyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `key` if unused, otherwise the first free suffixed variant.
    pub fn assign(&mut self, key: String) -> String {
        if self.used.insert(key.clone()) {
            return key;
        }
        let mut suffix = 2u32;
        loop {
            let candidate = format!("{key}_{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Build the full rendering context for one assessment.
///
/// Answers whose question id no longer appears in the pool are collected into
/// `extra_answers` instead of being dropped; the pool may have changed since
/// the assessment was created.
///
/// # Errors
///
/// Returns a serialization error if an entity cannot be represented as JSON.
pub fn build_context(
    study: &Study,
    pool: &QuestionPool,
    assessment: &Assessment,
) -> Result<Map<String, Value>, serde_json::Error> {
    let answers = &assessment.answers;
    let pool_question_ids: HashSet<&str> = pool.questions.iter().map(|q| q.id.as_str()).collect();

    let mut answers_by_id = Map::new();
    let mut answers_by_identifier = Map::new();
    let mut answers_by_key = Map::new();
    let mut identifier_keys = Map::new();
    let mut registry = KeyRegistry::new();
    let mut answer_rows = Vec::with_capacity(pool.questions.len());

    for question in &pool.questions {
        let answer = answers.get(&question.id).cloned().unwrap_or_default();
        answers_by_id.insert(question.id.clone(), Value::String(answer.clone()));
        answers_by_identifier.insert(question.identifier.clone(), Value::String(answer.clone()));

        let safe_key = registry.assign(sanitize_identifier(&question.identifier));
        answers_by_key.insert(safe_key.clone(), Value::String(answer.clone()));
        identifier_keys.insert(question.identifier.clone(), Value::String(safe_key));

        // Everything beyond id/identifier/text is question metadata; rows
        // carry it both nested and flattened.
        let mut metadata = serde_json::to_value(question)?
            .as_object()
            .cloned()
            .unwrap_or_default();
        metadata.remove("id");
        metadata.remove("identifier");
        metadata.remove("text");

        let mut row = Map::new();
        row.insert("id".to_string(), Value::String(question.id.clone()));
        row.insert(
            "identifier".to_string(),
            Value::String(question.identifier.clone()),
        );
        row.insert("text".to_string(), Value::String(question.text.clone()));
        row.insert("answered".to_string(), Value::Bool(!answer.is_empty()));
        row.insert("answer".to_string(), Value::String(answer));
        row.insert("metadata".to_string(), Value::Object(metadata.clone()));
        for (k, v) in metadata {
            row.insert(k, v);
        }
        answer_rows.push(Value::Object(row));
    }

    let mut extra_answers = Vec::new();
    for (question_id, answer) in answers {
        if !pool_question_ids.contains(question_id.as_str()) {
            let mut entry = Map::new();
            entry.insert("id".to_string(), Value::String(question_id.clone()));
            entry.insert("answer".to_string(), Value::String(answer.clone()));
            extra_answers.push(Value::Object(entry));
        }
    }

    let mut context = Map::new();
    context.insert("study".to_string(), serde_json::to_value(study)?);
    context.insert("assessment".to_string(), serde_json::to_value(assessment)?);
    context.insert("question_pool".to_string(), serde_json::to_value(pool)?);
    context.insert("answers".to_string(), Value::Array(answer_rows));
    context.insert("answers_by_id".to_string(), Value::Object(answers_by_id));
    context.insert(
        "answers_by_identifier".to_string(),
        Value::Object(answers_by_identifier),
    );
    context.insert(
        "answers_by_key".to_string(),
        Value::Object(answers_by_key.clone()),
    );
    context.insert(
        "identifier_keys".to_string(),
        Value::Object(identifier_keys),
    );
    context.insert("extra_answers".to_string(), Value::Array(extra_answers));
    // Bare sanitized keys at the top level, for direct template references.
    for (k, v) in answers_by_key {
        context.insert(k, v);
    }

    Ok(context)
}
