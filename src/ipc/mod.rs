/*!
 * IPC Module
 * Message passing built on reserve-then-commit allocation
 */

pub mod mailbox;
pub mod types;

// Re-export for convenience
pub use mailbox::Mailbox;
pub use types::*;
