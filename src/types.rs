//! Core data types for the notewise transform pipeline
//!
//! Wire shapes use camelCase field names so that a browser front end can post
//! and read them directly. Unvalidated request bodies (`*Body`) are kept apart
//! from the validated request types so that every missing or mistyped field
//! can be reported by name.

use crate::error::{NotewiseError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three independent transformation switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOptions {
    /// Reformat the note into clean structured text
    pub auto_format: bool,
    /// Extract key terms for highlighting
    pub highlight_key_terms: bool,
    /// Generate commentary on the note
    pub comments: bool,
}

/// Names one of the three transformation switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformOption {
    AutoFormat,
    HighlightKeyTerms,
    Comments,
}

impl TransformOption {
    /// Every option, in the order instructions are emitted
    pub const ALL: [TransformOption; 3] = [
        TransformOption::AutoFormat,
        TransformOption::HighlightKeyTerms,
        TransformOption::Comments,
    ];

    /// Wire name of the option
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformOption::AutoFormat => "autoFormat",
            TransformOption::HighlightKeyTerms => "highlightKeyTerms",
            TransformOption::Comments => "comments",
        }
    }
}

impl TransformOptions {
    /// Read one switch
    pub fn get(&self, option: TransformOption) -> bool {
        match option {
            TransformOption::AutoFormat => self.auto_format,
            TransformOption::HighlightKeyTerms => self.highlight_key_terms,
            TransformOption::Comments => self.comments,
        }
    }

    /// Set one switch
    pub fn set(&mut self, option: TransformOption, enabled: bool) {
        match option {
            TransformOption::AutoFormat => self.auto_format = enabled,
            TransformOption::HighlightKeyTerms => self.highlight_key_terms = enabled,
            TransformOption::Comments => self.comments = enabled,
        }
    }

    /// Flip one switch and return its new value
    pub fn toggle(&mut self, option: TransformOption) -> bool {
        let next = !self.get(option);
        self.set(option, next);
        next
    }
}

/// A validated transform request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    pub text: String,
    pub options: TransformOptions,
}

impl TransformRequest {
    /// Build a request, rejecting empty text
    pub fn new(text: impl Into<String>, options: TransformOptions) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(NotewiseError::invalid("text", "must be a non-empty string"));
        }
        Ok(Self { text, options })
    }
}

/// Options exactly as received; every switch is required
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOptionsBody {
    pub auto_format: Option<bool>,
    pub highlight_key_terms: Option<bool>,
    pub comments: Option<bool>,
}

/// Transform request exactly as received
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequestBody {
    pub text: Option<String>,
    pub options: Option<TransformOptionsBody>,
}

impl TransformRequestBody {
    /// Validate into a [`TransformRequest`], naming the first offending field
    pub fn validate(self) -> Result<TransformRequest> {
        let text = self
            .text
            .ok_or_else(|| NotewiseError::invalid("text", "is required"))?;
        let options = self
            .options
            .ok_or_else(|| NotewiseError::invalid("options", "is required"))?;

        let require = |value: Option<bool>, option: TransformOption| {
            value.ok_or_else(|| {
                NotewiseError::invalid(
                    format!("options.{}", option.as_str()),
                    "must be a boolean",
                )
            })
        };

        let options = TransformOptions {
            auto_format: require(options.auto_format, TransformOption::AutoFormat)?,
            highlight_key_terms: require(
                options.highlight_key_terms,
                TransformOption::HighlightKeyTerms,
            )?,
            comments: require(options.comments, TransformOption::Comments)?,
        };

        TransformRequest::new(text, options)
    }
}

/// Structured result of one transform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    #[serde(default)]
    pub formatted_text: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl TransformResult {
    /// Drop fields whose option was not requested, whatever the model sent
    pub fn enforce_options(mut self, options: &TransformOptions) -> Self {
        if !options.highlight_key_terms {
            self.highlights.clear();
        }
        if !options.comments {
            self.comments.clear();
        }
        self
    }
}

/// A validated single-term definition request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRequest {
    pub term: String,
    #[serde(default)]
    pub context: String,
}

impl DefinitionRequest {
    /// Build a request, rejecting blank terms
    pub fn new(term: impl Into<String>, context: impl Into<String>) -> Result<Self> {
        let term = term.into();
        if term.trim().is_empty() {
            return Err(NotewiseError::invalid("term", "must be a non-empty string"));
        }
        Ok(Self {
            term,
            context: context.into(),
        })
    }
}

/// Definition request exactly as received
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefinitionRequestBody {
    pub term: Option<String>,
    pub context: Option<String>,
}

impl DefinitionRequestBody {
    pub fn validate(self) -> Result<DefinitionRequest> {
        let term = self
            .term
            .ok_or_else(|| NotewiseError::invalid("term", "is required"))?;
        DefinitionRequest::new(term, self.context.unwrap_or_default())
    }
}

/// One looked-up definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionEntry {
    pub term: String,
    pub definition: String,
}

/// Unique identifier for notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub Uuid);

impl NoteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> std::result::Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub Uuid);

impl FolderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FolderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A free-form note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub folder_id: Option<FolderId>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A folder grouping notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
