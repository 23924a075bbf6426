//! Engine outcome flags.

/// Record-level flags reported by an RMW.
///
/// They are orthogonal: an RMW sets at most the flag that matches the path
/// the engine took. Read operations never set them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RecordFlags {
    /// The record did not exist and was created by the initial updater.
    pub created: bool,
    /// The record was updated by copying it to the tail of the log.
    pub copy_updated: bool,
    /// The record was updated in place.
    pub in_place_updated: bool,
}

impl RecordFlags {
    /// No flags set.
    pub const NONE: Self = Self {
        created: false,
        copy_updated: false,
        in_place_updated: false,
    };

    /// Returns true if any mutation flag is set.
    #[must_use]
    pub const fn any(self) -> bool {
        self.created || self.copy_updated || self.in_place_updated
    }
}

/// Outcome of a single engine call.
///
/// A pending outcome is not terminal: neither the found flag nor the output
/// capsule may be inspected until the pending operation has been completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineStatus {
    found: bool,
    pending: bool,
    record: RecordFlags,
}

impl EngineStatus {
    /// The key existed.
    #[must_use]
    pub const fn found() -> Self {
        Self {
            found: true,
            pending: false,
            record: RecordFlags::NONE,
        }
    }

    /// The key did not exist.
    #[must_use]
    pub const fn not_found() -> Self {
        Self {
            found: false,
            pending: false,
            record: RecordFlags::NONE,
        }
    }

    /// The engine went asynchronous (e.g. the record lives on disk).
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            found: false,
            pending: true,
            record: RecordFlags::NONE,
        }
    }

    /// The key was absent and the RMW created it.
    #[must_use]
    pub const fn created() -> Self {
        Self::not_found().with_record(RecordFlags {
            created: true,
            copy_updated: false,
            in_place_updated: false,
        })
    }

    /// The key existed and was updated in place.
    #[must_use]
    pub const fn in_place_updated() -> Self {
        Self::found().with_record(RecordFlags {
            created: false,
            copy_updated: false,
            in_place_updated: true,
        })
    }

    /// The key existed and was copied forward by the update.
    #[must_use]
    pub const fn copy_updated() -> Self {
        Self::found().with_record(RecordFlags {
            created: false,
            copy_updated: true,
            in_place_updated: false,
        })
    }

    /// Replaces the record flags.
    #[must_use]
    pub const fn with_record(mut self, record: RecordFlags) -> Self {
        self.record = record;
        self
    }

    /// Returns true if the key existed.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        self.found
    }

    /// Returns true if the key did not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        !self.found
    }

    /// Returns true if the operation still needs to be completed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Record flags set by an RMW.
    #[must_use]
    pub const fn record(&self) -> RecordFlags {
        self.record
    }
}
