//! Field rules for task titles and descriptions.
//!
//! Trimming happens here and nowhere else: once a [`TaskTitle`] or
//! [`TaskDescription`] exists its text is final, so repositories persist it
//! verbatim.

use std::fmt;

use thiserror::Error;

/// Maximum title length in characters, after trimming.
pub const TITLE_MAX_CHARS: usize = 200;
/// Maximum description length in characters, after trimming.
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Reasons a task field is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters (got {actual})")]
    TitleTooLong { max: usize, actual: usize },
    #[error("description must be at most {max} characters (got {actual})")]
    DescriptionTooLong { max: usize, actual: usize },
}

impl TaskValidationError {
    /// Name of the offending request field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::DescriptionTooLong { .. } => "description",
        }
    }

    /// Stable machine-readable reason.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "empty",
            Self::TitleTooLong { .. } | Self::DescriptionTooLong { .. } => "too_long",
        }
    }
}

/// Trimmed, non-empty task title of at most [`TITLE_MAX_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTitle(String);

impl TaskTitle {
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trimmed task description of at most [`DESCRIPTION_MAX_CHARS`] characters.
///
/// Empty descriptions are valid and are the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDescription(String);

impl TaskDescription {
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for TaskDescription {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validate and normalise a task title.
///
/// # Examples
/// ```
/// use taskflow::domain::tasks::validate_title;
///
/// let title = validate_title("  Buy groceries ").expect("valid title");
/// assert_eq!(title.as_str(), "Buy groceries");
/// assert!(validate_title("   ").is_err());
/// ```
pub fn validate_title(raw: &str) -> Result<TaskTitle, TaskValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    let actual = trimmed.chars().count();
    if actual > TITLE_MAX_CHARS {
        return Err(TaskValidationError::TitleTooLong {
            max: TITLE_MAX_CHARS,
            actual,
        });
    }
    Ok(TaskTitle(trimmed.to_owned()))
}

/// Validate and normalise a task description.
pub fn validate_description(raw: &str) -> Result<TaskDescription, TaskValidationError> {
    let trimmed = raw.trim();
    let actual = trimmed.chars().count();
    if actual > DESCRIPTION_MAX_CHARS {
        return Err(TaskValidationError::DescriptionTooLong {
            max: DESCRIPTION_MAX_CHARS,
            actual,
        });
    }
    Ok(TaskDescription(trimmed.to_owned()))
}

/// Validated title/description pair ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: TaskTitle,
    pub description: TaskDescription,
}

impl TaskDraft {
    /// Validate both fields, title first.
    ///
    /// When both fields are invalid the title error is reported. A missing
    /// description is treated as empty.
    ///
    /// # Examples
    /// ```
    /// use taskflow::domain::tasks::{TaskDraft, TaskValidationError};
    ///
    /// let long = "x".repeat(1001);
    /// let err = TaskDraft::validate("", Some(&long)).expect_err("both invalid");
    /// assert_eq!(err, TaskValidationError::EmptyTitle);
    /// ```
    pub fn validate(title: &str, description: Option<&str>) -> Result<Self, TaskValidationError> {
        let title = validate_title(title)?;
        let description = validate_description(description.unwrap_or_default())?;
        Ok(Self { title, description })
    }
}
