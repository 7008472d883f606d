//! Prompt Catalog: immutable mapping from prompt key to instruction and
//! valid-response rule.
//!
//! Built once at startup from the built-in prompts, optionally extended from a
//! JSON file, then passed by reference into the scoring engine.

pub mod prompts;
pub mod validator;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::catalog::prompts::{BuiltinResponse, BUILTIN_PROMPTS};
use crate::errors::ScorerError;

/// Report fields that a prompt key may not shadow.
const RESERVED_KEYS: &[&str] = &["id", "text"];

/// The rule a model answer must satisfy to be accepted.
///
/// In catalog files this is written untagged: a JSON array of words is an
/// `ExactSet`, an integer is a `WordCount`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ValidResponse {
    ExactSet(BTreeSet<String>),
    WordCount(usize),
}

impl ValidResponse {
    /// Builds an `ExactSet`, normalizing every member.
    pub fn exact_set<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ValidResponse::ExactSet(
            members
                .into_iter()
                .map(|m| validator::normalize(m.as_ref()))
                .collect(),
        )
    }

    fn normalized(self) -> Self {
        match self {
            ValidResponse::ExactSet(members) => ValidResponse::exact_set(members),
            other => other,
        }
    }
}

impl fmt::Display for ValidResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidResponse::ExactSet(members) => {
                let words: Vec<&str> = members.iter().map(String::as_str).collect();
                write!(f, "one of [{}]", words.join(", "))
            }
            ValidResponse::WordCount(1) => write!(f, "1 word"),
            ValidResponse::WordCount(n) => write!(f, "{n} words"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    pub instruction: String,
    pub valid_response: ValidResponse,
}

/// On-disk shape of a catalog entry.
#[derive(Debug, Deserialize)]
struct PromptEntry {
    prompt: String,
    valid_responses: ValidResponse,
}

#[derive(Debug, Clone, Default)]
pub struct PromptCatalog {
    prompts: BTreeMap<String, PromptSpec>,
}

impl PromptCatalog {
    pub fn builtin() -> Self {
        let prompts = BUILTIN_PROMPTS
            .iter()
            .map(|(key, instruction, response)| {
                let valid_response = match response {
                    BuiltinResponse::OneOf(words) => ValidResponse::exact_set(words.iter()),
                    BuiltinResponse::Words(n) => ValidResponse::WordCount(*n),
                };
                (
                    key.to_string(),
                    PromptSpec {
                        instruction: instruction.to_string(),
                        valid_response,
                    },
                )
            })
            .collect();
        Self { prompts }
    }

    /// Merges prompts from a JSON catalog file. Entries replace built-ins with
    /// the same key. Returns the number of entries read.
    pub fn extend_from_file(&mut self, path: &Path) -> Result<usize, ScorerError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ScorerError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: BTreeMap<String, PromptEntry> =
            serde_json::from_str(&raw).map_err(|source| ScorerError::ParseFile {
                path: path.to_path_buf(),
                source,
            })?;

        let invalid = |reason: String| ScorerError::Catalog {
            path: path.to_path_buf(),
            reason,
        };

        let count = entries.len();
        for (key, entry) in entries {
            if RESERVED_KEYS.contains(&key.as_str()) {
                return Err(invalid(format!("prompt key '{key}' is reserved")));
            }
            if matches!(&entry.valid_responses, ValidResponse::ExactSet(m) if m.is_empty()) {
                return Err(invalid(format!("prompt '{key}' has no valid responses")));
            }
            self.prompts.insert(
                key,
                PromptSpec {
                    instruction: entry.prompt,
                    valid_response: entry.valid_responses.normalized(),
                },
            );
        }
        Ok(count)
    }

    pub fn lookup(&self, key: &str) -> Result<&PromptSpec, ScorerError> {
        self.prompts
            .get(key)
            .ok_or_else(|| ScorerError::UnknownPrompt {
                key: key.to_string(),
                available: self.keys().collect::<Vec<_>>().join(", "),
            })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.prompts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PromptSpec)> {
        self.prompts.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn catalog_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_builtin_contains_all_prompts() {
        let catalog = PromptCatalog::builtin();
        assert_eq!(catalog.keys().count(), 8);
        assert!(catalog.lookup("panic/shame").is_ok());
    }

    #[test]
    fn test_builtin_response_shapes() {
        let catalog = PromptCatalog::builtin();
        assert_eq!(
            catalog.lookup("emotion").unwrap().valid_response,
            ValidResponse::exact_set(["high", "neutral", "low"])
        );
        assert_eq!(
            catalog.lookup("in-a-word").unwrap().valid_response,
            ValidResponse::WordCount(1)
        );
    }

    #[test]
    fn test_unknown_prompt_lists_available_keys() {
        let err = PromptCatalog::builtin().lookup("sarcasm").unwrap_err();
        match err {
            ScorerError::UnknownPrompt { key, available } => {
                assert_eq!(key, "sarcasm");
                assert!(available.contains("emotion"));
                assert!(available.contains("in-a-word"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extend_from_file_adds_and_overrides() {
        let file = catalog_file(
            r#"{
                "certainty": { "prompt": "How certain?", "valid_responses": ["Sure", " Unsure "] },
                "emotion": { "prompt": "Two words please.", "valid_responses": 2 }
            }"#,
        );
        let mut catalog = PromptCatalog::builtin();
        assert_eq!(catalog.extend_from_file(file.path()).unwrap(), 2);

        let certainty = catalog.lookup("certainty").unwrap();
        assert_eq!(
            certainty.valid_response,
            ValidResponse::exact_set(["sure", "unsure"])
        );
        assert_eq!(
            catalog.lookup("emotion").unwrap().valid_response,
            ValidResponse::WordCount(2)
        );
        assert_eq!(catalog.keys().count(), 9);
    }

    #[test]
    fn test_extend_rejects_reserved_key() {
        let file = catalog_file(r#"{ "text": { "prompt": "x", "valid_responses": 1 } }"#);
        let err = PromptCatalog::builtin()
            .extend_from_file(file.path())
            .unwrap_err();
        assert!(matches!(err, ScorerError::Catalog { .. }));
    }

    #[test]
    fn test_extend_rejects_empty_set() {
        let file = catalog_file(r#"{ "empty": { "prompt": "x", "valid_responses": [] } }"#);
        let err = PromptCatalog::builtin()
            .extend_from_file(file.path())
            .unwrap_err();
        assert!(err.to_string().contains("no valid responses"));
    }

    #[test]
    fn test_extend_rejects_malformed_json() {
        let file = catalog_file("{ not json");
        let err = PromptCatalog::builtin()
            .extend_from_file(file.path())
            .unwrap_err();
        assert!(matches!(err, ScorerError::ParseFile { .. }));
    }

    #[test]
    fn test_display_describes_rule() {
        assert_eq!(ValidResponse::WordCount(1).to_string(), "1 word");
        assert_eq!(
            ValidResponse::exact_set(["low", "high"]).to_string(),
            "one of [high, low]"
        );
    }
}
