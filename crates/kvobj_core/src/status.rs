//! Public operation status and the mapping from engine outcomes.

use kvobj_storage::EngineStatus;
use std::fmt;

/// Status of an object-store operation as seen by the command layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectStatus {
    /// The operation found (or created) its value.
    Ok,
    /// The key does not exist.
    NotFound,
    /// The key holds a value of a different type.
    WrongType,
}

impl fmt::Display for ObjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ok => "OK",
            Self::NotFound => "NOTFOUND",
            Self::WrongType => "WRONGTYPE",
        };
        f.write_str(label)
    }
}

/// Which dispatcher entry point produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationPath {
    /// Read-modify-write, header or footer output.
    Rmw,
    /// Read into a fixed header.
    Read,
    /// Read into a footer (also used by scans).
    ReadWithOutput,
}

/// Maps a terminal engine outcome and the capsule's content length to an
/// [`ObjectStatus`].
///
/// Zero content on a found record means the type check failed. On the
/// footer read path an empty footer is a type mismatch whatever the found
/// flag says; `NotFound` there requires a non-empty footer.
///
/// # Panics
///
/// Debug builds panic on a pending outcome.
#[must_use]
pub fn translate(status: &EngineStatus, content_len: usize, path: OperationPath) -> ObjectStatus {
    debug_assert!(!status.is_pending(), "status must be terminal");

    if content_len == 0 && (status.is_found() || path == OperationPath::ReadWithOutput) {
        return ObjectStatus::WrongType;
    }

    let record = status.record();
    let ok = match path {
        OperationPath::Rmw => status.is_found() || record.created,
        // Mutation flags on the read path mean a write-shaped callback ran.
        OperationPath::Read => status.is_found() && !record.any(),
        OperationPath::ReadWithOutput => status.is_found(),
    };

    if ok {
        ObjectStatus::Ok
    } else {
        ObjectStatus::NotFound
    }
}
