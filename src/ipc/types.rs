/*!
 * IPC Types
 * Common types for the mailbox
 */

use crate::core::types::Address;
use crate::memory::MemoryError;
use miette::Diagnostic;
use thiserror::Error;

/// IPC operation result
pub type IpcResult<T> = Result<T, IpcError>;

/// Mailbox errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum IpcError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Memory(#[from] MemoryError),

    #[error("No pending message at offset 0x{0:x}")]
    #[diagnostic(
        code(ipc::not_pending),
        help("Messages must be created with init_message and can only be sent once.")
    )]
    NotPending(Address),
}

/// Invoked with the message offset after a message is committed
pub type MessageCallback = Box<dyn FnMut(Address) + Send>;
