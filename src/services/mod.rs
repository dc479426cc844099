mod auth;
mod operation;
mod users;

pub use auth::AuthService;
pub use operation::{Operation, OperationTracker};
pub use users::UserService;
