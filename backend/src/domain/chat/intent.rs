//! Keyword matching for assistant commands.
//!
//! Matching is case-insensitive. Only ASCII is folded, so byte offsets found
//! in the folded copy are valid in the original text and titles keep their
//! original casing.

use crate::domain::tasks::TaskId;

/// Title used when `add task` is sent with nothing after it.
pub const DEFAULT_TASK_TITLE: &str = "New task";

const ADD_TRIGGERS: [&str; 1] = ["add task"];
const LIST_TRIGGERS: [&str; 2] = ["list tasks", "show tasks"];
const COMPLETE_TRIGGERS: [&str; 2] = ["complete task", "mark task"];
const COMPLETE_VERBS: [&str; 2] = ["complete", "mark"];
const DELETE_TRIGGERS: [&str; 2] = ["delete task", "remove task"];
const DELETE_VERBS: [&str; 2] = ["delete", "remove"];

/// Which task a complete or delete command refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskTarget {
    /// `complete task 3`.
    Id(TaskId),
    /// A number was given but it can never name a task (`task 0`, overflow).
    InvalidId,
    /// `complete task buy milk`: matched against titles.
    Title(String),
    /// The trigger was sent on its own.
    Unspecified,
}

/// What the assistant was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddTask { title: String },
    ListTasks,
    CompleteTask(TaskTarget),
    DeleteTask(TaskTarget),
    Unknown,
}

impl Intent {
    /// Classify a message. Triggers are tried in the order add, list,
    /// complete, delete; the first one present anywhere in the text wins.
    #[must_use]
    pub fn parse(message: &str) -> Self {
        let text = message.trim();
        let folded = text.to_ascii_lowercase();

        if let Some(rest) = after_trigger(text, &folded, &ADD_TRIGGERS) {
            return Self::AddTask {
                title: add_title(rest),
            };
        }
        if LIST_TRIGGERS.iter().any(|trigger| folded.contains(trigger)) {
            return Self::ListTasks;
        }
        if let Some(rest) = after_trigger(text, &folded, &COMPLETE_TRIGGERS) {
            return Self::CompleteTask(target(&folded, &COMPLETE_VERBS, rest));
        }
        if let Some(rest) = after_trigger(text, &folded, &DELETE_TRIGGERS) {
            return Self::DeleteTask(target(&folded, &DELETE_VERBS, rest));
        }
        Self::Unknown
    }
}

/// Trimmed text following the first trigger that occurs, checked in the
/// order given.
fn after_trigger<'a>(text: &'a str, folded: &str, triggers: &[&str]) -> Option<&'a str> {
    triggers.iter().find_map(|trigger| {
        folded
            .find(trigger)
            .and_then(|start| text.get(start + trigger.len()..))
            .map(str::trim)
    })
}

fn add_title(rest: &str) -> String {
    let title = rest
        .get(..3)
        .filter(|prefix| prefix.eq_ignore_ascii_case("to "))
        .and_then(|_| rest.get(3..))
        .map_or(rest, str::trim);
    if title.is_empty() {
        DEFAULT_TASK_TITLE.to_owned()
    } else {
        title.to_owned()
    }
}

fn target(folded: &str, verbs: &[&str], rest: &str) -> TaskTarget {
    if let Some(digits) = numbered_task(folded, verbs) {
        return digits
            .parse::<i64>()
            .ok()
            .and_then(|raw| TaskId::new(raw).ok())
            .map_or(TaskTarget::InvalidId, TaskTarget::Id);
    }
    if rest.is_empty() {
        TaskTarget::Unspecified
    } else {
        TaskTarget::Title(rest.to_owned())
    }
}

/// Digits of the leftmost `<verb> task <digits>` phrase, if any.
fn numbered_task<'a>(folded: &'a str, verbs: &[&str]) -> Option<&'a str> {
    verbs
        .iter()
        .flat_map(|verb| {
            folded.match_indices(verb).filter_map(move |(start, matched)| {
                folded
                    .get(start + matched.len()..)
                    .and_then(digits_after_task)
                    .map(|digits| (start, digits))
            })
        })
        .min_by_key(|&(start, _)| start)
        .map(|(_, digits)| digits)
}

/// Matches `\s+task\s+(\d+)` at the start of `rest`.
fn digits_after_task(rest: &str) -> Option<&str> {
    let after_verb = required_whitespace(rest)?;
    let after_keyword = after_verb.strip_prefix("task")?;
    let number = required_whitespace(after_keyword)?;
    let end = number
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(number.len());
    number.get(..end).filter(|digits| !digits.is_empty())
}

fn required_whitespace(rest: &str) -> Option<&str> {
    let trimmed = rest.trim_start();
    (trimmed.len() < rest.len()).then_some(trimmed)
}
