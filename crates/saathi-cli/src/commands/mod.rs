//! Command implementations.

pub mod chat;
pub mod schema;
pub mod submissions;

pub use self::chat::{build_intake, execute_chat, CliIntake};
pub use self::schema::execute_schema;
pub use self::submissions::{execute_show, execute_submissions};
