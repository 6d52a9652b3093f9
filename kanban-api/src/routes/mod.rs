/// API route handlers
///
/// One module per resource. Handlers parse ids and bodies, call the matching
/// service with the caller from the auth gate, and wrap the result in the
/// response envelope.
///
/// - `health`: health check
/// - `auth`: register, login, refresh, logout, current user
/// - `boards`, `columns`, `tasks`: the board hierarchy
/// - `comments`, `attachments`: task children
/// - `labels`: global labels and task associations

pub mod attachments;
pub mod auth;
pub mod boards;
pub mod columns;
pub mod comments;
pub mod health;
pub mod labels;
pub mod tasks;
