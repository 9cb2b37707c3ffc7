//! Rule-based assistant answering chat messages with task operations.
//!
//! Every turn is recorded: the user's message first, then the reply together
//! with the task operation that produced it. Task operations go through the
//! task driving ports, so the same validation and owner scoping apply as for
//! the REST endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::domain::OwnerId;
use crate::domain::ports::{
    ChatCommand, ChatQuery, ChatReply, ChatRequest, ConversationRepository,
    ConversationRepositoryError, CreateTaskRequest, TaskCommand, TaskQuery,
    ToggleCompletionRequest,
};
use crate::domain::tasks::{Task, TaskId, TaskListFilter, TaskServiceError};

use super::{
    ChatServiceError, ConversationId, Intent, Message, NewMessage, Sender, TaskTarget, ToolCall,
    validate_message,
};

/// Reply for a task id that does not exist for the owner.
pub const TASK_NOT_FOUND_REPLY: &str = "Task not found or unauthorized";
/// Reply for messages that match no command.
pub const UNKNOWN_COMMAND_REPLY: &str = "Sorry, I didn't understand that. Try 'add task buy milk', \
     'list tasks', 'complete task 3' or 'delete task 2'.";

/// Reply text plus the task operation behind it, if any.
struct Turn {
    text: String,
    tool: Option<ToolCall>,
}

impl Turn {
    fn say(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool: None,
        }
    }

    fn with_tool(text: impl Into<String>, name: &str, arguments: Value, output: Value) -> Self {
        Self {
            text: text.into(),
            tool: Some(ToolCall {
                name: name.to_owned(),
                arguments,
                output,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Complete,
    Delete,
}

impl Action {
    const fn tool_name(self) -> &'static str {
        match self {
            Self::Complete => "complete_task",
            Self::Delete => "delete_task",
        }
    }

    fn done_by_id(self, task_id: TaskId) -> String {
        match self {
            Self::Complete => format!("Task {task_id} marked as completed."),
            Self::Delete => format!("Task {task_id} deleted successfully."),
        }
    }

    fn done_by_title(self, title: &str) -> String {
        match self {
            Self::Complete => format!("Task '{title}' marked as completed."),
            Self::Delete => format!("Task '{title}' deleted successfully."),
        }
    }

    const fn prompt(self) -> &'static str {
        match self {
            Self::Complete => {
                "Please specify which task to complete, for example: \
                 'complete task 3' or 'complete task buy milk'."
            }
            Self::Delete => {
                "Please specify which task to delete, for example: \
                 'delete task 2' or 'delete task buy milk'."
            }
        }
    }
}

const fn status(task: &Task) -> &'static str {
    if task.completed() { "completed" } else { "pending" }
}

/// Storage faults fail the turn; any other task error is handed back so it
/// can be answered in text.
fn split_storage_fault<T>(
    result: Result<T, TaskServiceError>,
) -> Result<Result<T, TaskServiceError>, ChatServiceError> {
    match result {
        Err(TaskServiceError::Storage { message, retryable }) => {
            Err(ChatServiceError::Storage { message, retryable })
        }
        other => Ok(other),
    }
}

fn storage_failure(
    operation: &'static str,
    owner_id: &OwnerId,
    error: ConversationRepositoryError,
) -> ChatServiceError {
    if !matches!(error, ConversationRepositoryError::NotFound { .. }) {
        warn!(
            operation,
            owner_id = %owner_id,
            error = %error,
            "conversation repository call failed"
        );
    }
    ChatServiceError::from(error)
}

/// Chat service backed by the task ports and a [`ConversationRepository`].
pub struct ChatService<R: ?Sized> {
    tasks: Arc<dyn TaskCommand>,
    tasks_query: Arc<dyn TaskQuery>,
    conversations: Arc<R>,
}

impl<R: ?Sized> Clone for ChatService<R> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            tasks_query: Arc::clone(&self.tasks_query),
            conversations: Arc::clone(&self.conversations),
        }
    }
}

impl<R: ?Sized> ChatService<R> {
    pub const fn new(
        tasks: Arc<dyn TaskCommand>,
        tasks_query: Arc<dyn TaskQuery>,
        conversations: Arc<R>,
    ) -> Self {
        Self {
            tasks,
            tasks_query,
            conversations,
        }
    }

    async fn respond(&self, owner_id: &OwnerId, text: &str) -> Result<Turn, ChatServiceError> {
        match Intent::parse(text) {
            Intent::AddTask { title } => self.add_task(owner_id, title).await,
            Intent::ListTasks => self.list_tasks(owner_id).await,
            Intent::CompleteTask(target) => self.act_on(owner_id, Action::Complete, target).await,
            Intent::DeleteTask(target) => self.act_on(owner_id, Action::Delete, target).await,
            Intent::Unknown => Ok(Turn::say(UNKNOWN_COMMAND_REPLY)),
        }
    }

    async fn add_task(&self, owner_id: &OwnerId, title: String) -> Result<Turn, ChatServiceError> {
        let arguments = json!({ "title": title });
        let request = CreateTaskRequest {
            owner_id: owner_id.clone(),
            title,
            description: None,
        };
        let turn = match split_storage_fault(self.tasks.create_task(request).await)? {
            Ok(task) => Turn::with_tool(
                format!("Task '{}' added successfully.", task.title()),
                "add_task",
                arguments,
                json!({ "id": task.id().get(), "title": task.title(), "status": "created" }),
            ),
            Err(err) => Turn::with_tool(
                format!("I couldn't add that task: {err}."),
                "add_task",
                arguments,
                json!({ "error": err.to_string() }),
            ),
        };
        Ok(turn)
    }

    async fn list_tasks(&self, owner_id: &OwnerId) -> Result<Turn, ChatServiceError> {
        let tasks = self
            .tasks_query
            .list_tasks(owner_id, TaskListFilter::default())
            .await?;
        let output: Vec<Value> = tasks
            .iter()
            .map(|task| {
                json!({
                    "id": task.id().get(),
                    "title": task.title(),
                    "description": task.description(),
                    "status": status(task),
                })
            })
            .collect();
        let text = if tasks.is_empty() {
            "You have no tasks yet.".to_owned()
        } else {
            let items: Vec<String> = tasks
                .iter()
                .map(|task| format!("{}: {} ({})", task.id(), task.title(), status(task)))
                .collect();
            format!("Here are your tasks: {}.", items.join("; "))
        };
        Ok(Turn::with_tool(text, "list_tasks", json!({}), Value::Array(output)))
    }

    async fn act_on(
        &self,
        owner_id: &OwnerId,
        action: Action,
        target: TaskTarget,
    ) -> Result<Turn, ChatServiceError> {
        match target {
            TaskTarget::Id(task_id) => {
                self.apply(owner_id, action, task_id, action.done_by_id(task_id))
                    .await
            }
            TaskTarget::InvalidId => Ok(Turn::say(TASK_NOT_FOUND_REPLY)),
            TaskTarget::Unspecified => Ok(Turn::say(action.prompt())),
            TaskTarget::Title(query) => self.act_on_title(owner_id, action, &query).await,
        }
    }

    async fn act_on_title(
        &self,
        owner_id: &OwnerId,
        action: Action,
        query: &str,
    ) -> Result<Turn, ChatServiceError> {
        let needle = query.to_lowercase();
        let tasks = self
            .tasks_query
            .list_tasks(owner_id, TaskListFilter::default())
            .await?;
        let matches: Vec<&Task> = tasks
            .iter()
            .filter(|task| task.title().to_lowercase().contains(&needle))
            .collect();

        match matches.as_slice() {
            [] => Ok(Turn::say(format!(
                "No task found with a title matching '{query}'."
            ))),
            [task] => {
                let text = action.done_by_title(task.title());
                self.apply(owner_id, action, task.id(), text).await
            }
            several => {
                let ids: Vec<String> = several.iter().map(|task| task.id().to_string()).collect();
                Ok(Turn::say(format!(
                    "Multiple tasks match '{query}'. Please specify the task ID instead (one of: {}).",
                    ids.join(", ")
                )))
            }
        }
    }

    /// Run `action` on one task; `done` is the reply when it succeeds.
    async fn apply(
        &self,
        owner_id: &OwnerId,
        action: Action,
        task_id: TaskId,
        done: String,
    ) -> Result<Turn, ChatServiceError> {
        let output = match action {
            Action::Complete => {
                let request = ToggleCompletionRequest {
                    owner_id: owner_id.clone(),
                    task_id,
                    completed: true,
                };
                split_storage_fault(self.tasks.toggle_completion(request).await)?
                    .ok()
                    .map(|task| {
                        json!({ "id": task.id().get(), "title": task.title(), "status": status(&task) })
                    })
            }
            Action::Delete => split_storage_fault(self.tasks.delete_task(owner_id, task_id).await)?
                .ok()
                .filter(|removed| *removed)
                .map(|_| json!({ "status": "success", "message": format!("Task {task_id} deleted.") })),
        };

        let arguments = json!({ "task_id": task_id.get() });
        Ok(match output {
            Some(output) => Turn::with_tool(done, action.tool_name(), arguments, output),
            None => Turn::with_tool(
                TASK_NOT_FOUND_REPLY,
                action.tool_name(),
                arguments,
                json!({ "error": TASK_NOT_FOUND_REPLY }),
            ),
        })
    }
}

impl<R> ChatService<R>
where
    R: ConversationRepository + ?Sized,
{
    async fn open_conversation(
        &self,
        owner_id: &OwnerId,
        requested: Option<ConversationId>,
    ) -> Result<ConversationId, ChatServiceError> {
        let Some(conversation_id) = requested else {
            let conversation = self
                .conversations
                .create_conversation(owner_id)
                .await
                .map_err(|err| storage_failure("create_conversation", owner_id, err))?;
            debug!(owner_id = %owner_id, conversation_id = conversation.id.get(), "conversation started");
            return Ok(conversation.id);
        };
        self.conversations
            .find_conversation(owner_id, conversation_id)
            .await
            .map_err(|err| storage_failure("find_conversation", owner_id, err))?
            .map(|conversation| conversation.id)
            .ok_or(ChatServiceError::ConversationNotFound { conversation_id })
    }

    async fn record(&self, owner_id: &OwnerId, message: NewMessage) -> Result<(), ChatServiceError> {
        self.conversations
            .append_message(owner_id, &message)
            .await
            .map_err(|err| storage_failure("append_message", owner_id, err))?;
        Ok(())
    }
}

#[async_trait]
impl<R> ChatCommand for ChatService<R>
where
    R: ConversationRepository + ?Sized,
{
    async fn send_message(&self, request: ChatRequest) -> Result<ChatReply, ChatServiceError> {
        let ChatRequest {
            owner_id,
            conversation_id,
            message,
        } = request;
        let text = validate_message(&message)?;
        let conversation_id = self.open_conversation(&owner_id, conversation_id).await?;

        self.record(
            &owner_id,
            NewMessage {
                conversation_id,
                sender: Sender::User,
                content: text.to_owned(),
                tool: None,
            },
        )
        .await?;

        let turn = self.respond(&owner_id, text).await?;
        debug!(
            owner_id = %owner_id,
            conversation_id = conversation_id.get(),
            tool = turn.tool.as_ref().map(|tool| tool.name.as_str()),
            "assistant replied"
        );

        self.record(
            &owner_id,
            NewMessage {
                conversation_id,
                sender: Sender::Assistant,
                content: turn.text.clone(),
                tool: turn.tool,
            },
        )
        .await?;

        Ok(ChatReply {
            conversation_id,
            response: turn.text,
        })
    }
}

#[async_trait]
impl<R> ChatQuery for ChatService<R>
where
    R: ConversationRepository + ?Sized,
{
    async fn conversation_messages(
        &self,
        owner_id: &OwnerId,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, ChatServiceError> {
        let conversation_id = self.open_conversation(owner_id, Some(conversation_id)).await?;
        self.conversations
            .list_messages(owner_id, conversation_id)
            .await
            .map_err(|err| storage_failure("list_messages", owner_id, err))
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
