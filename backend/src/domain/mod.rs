//! Domain primitives, services and ports.
//!
//! Public surface:
//! - `DomainError` / `ErrorCode`: transport-agnostic failure payload.
//! - `TraceId`: request correlation identifier held in task-local storage.
//! - `OwnerId`: identity of the user owning a task.
//! - `tasks`: the task entity, its validator and the task service.
//! - `chat`: the keyword-driven task assistant and its conversation records.
//! - `ports`: traits implemented by adapters at the edges.

pub mod chat;
pub mod error;
pub mod owner;
pub mod ports;
pub mod tasks;
pub mod trace_id;

pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::owner::{OWNER_ID_MAX_CHARS, OwnerId, OwnerIdValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use taskflow::domain::{ApiResult, DomainError};
///
/// fn handler() -> ApiResult<()> {
///     Err(DomainError::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, DomainError>;
