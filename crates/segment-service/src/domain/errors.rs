//! # Domain Errors
//!
//! The closed error taxonomy shared by the store, the service and the HTTP
//! layer.
//!
//! | Kind | Raised by |
//! |------|-----------|
//! | SegmentAlreadyExists | create segment |
//! | SegmentNotFound | delete segment, add user to segments |
//! | UserAlreadyInSegment | add user to segments |
//! | UserNotInSegment | delete user from segments |
//! | StorageFailure | any operation |
//!
//! Store errors never carry database types. The service tags every failure
//! with the operation it came from and keeps all failures of a request, so
//! callers test for kinds instead of matching strings.

use std::fmt;
use thiserror::Error;

/// Classified failure reason, independent of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Name collision on create.
    SegmentAlreadyExists,
    /// Referenced segment is absent.
    SegmentNotFound,
    /// Membership already present.
    UserAlreadyInSegment,
    /// Membership absent on delete.
    UserNotInSegment,
    /// Unclassified persistence failure.
    StorageFailure,
}

impl ErrorKind {
    /// Order in which combined membership failures are reported.
    pub const REPORT_ORDER: [ErrorKind; 3] = [
        ErrorKind::SegmentNotFound,
        ErrorKind::UserNotInSegment,
        ErrorKind::UserAlreadyInSegment,
    ];

    /// False only for [`ErrorKind::StorageFailure`].
    pub fn is_domain(self) -> bool {
        !matches!(self, ErrorKind::StorageFailure)
    }

    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::SegmentAlreadyExists => "SegmentAlreadyExists",
            ErrorKind::SegmentNotFound => "SegmentNotFound",
            ErrorKind::UserAlreadyInSegment => "UserAlreadyInSegment",
            ErrorKind::UserNotInSegment => "UserNotInSegment",
            ErrorKind::StorageFailure => "StorageFailure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by a segment store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A segment with this name already exists.
    #[error("segment already exists")]
    SegmentAlreadyExists,

    /// The referenced segment does not exist.
    #[error("segment not found")]
    SegmentNotFound,

    /// The user already belongs to the segment.
    #[error("user already in segment")]
    UserAlreadyInSegment,

    /// The user does not belong to any of the given segments.
    #[error("user not in segment")]
    UserNotInSegment,

    /// Backing store unreachable or returned an unexpected error.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl StoreError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::SegmentAlreadyExists => ErrorKind::SegmentAlreadyExists,
            StoreError::SegmentNotFound => ErrorKind::SegmentNotFound,
            StoreError::UserAlreadyInSegment => ErrorKind::UserAlreadyInSegment,
            StoreError::UserNotInSegment => ErrorKind::UserNotInSegment,
            StoreError::Storage(_) => ErrorKind::StorageFailure,
        }
    }

    /// Wrap any displayable error as an unclassified storage failure.
    pub fn storage(err: impl fmt::Display) -> Self {
        StoreError::Storage(err.to_string())
    }
}

/// Store operation a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateSegment,
    DeleteSegment,
    AddUserToSegments,
    DeleteUserFromSegments,
    GetUserSegments,
}

impl Operation {
    /// Context prefix used when reporting a failure.
    pub fn context(self) -> &'static str {
        match self {
            Operation::CreateSegment => "creating segment",
            Operation::DeleteSegment => "deleting segment",
            Operation::AddUserToSegments => "adding user to segments",
            Operation::DeleteUserFromSegments => "deleting user from segments",
            Operation::GetUserSegments => "getting segments",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.context())
    }
}

/// One failed store call, tagged with its operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation}: {error}")]
pub struct OperationFailure {
    /// Operation that failed
    pub operation: Operation,
    /// Underlying store error
    #[source]
    pub error: StoreError,
}

impl OperationFailure {
    pub fn new(operation: Operation, error: StoreError) -> Self {
        Self { operation, error }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Error returned by the segment service.
///
/// Holds one entry per failed sub-operation, in the order they were
/// attempted. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    failures: Vec<OperationFailure>,
}

impl ServiceError {
    /// Error for a single failed operation.
    pub fn new(operation: Operation, error: StoreError) -> Self {
        Self {
            failures: vec![OperationFailure::new(operation, error)],
        }
    }

    /// `Ok(())` when nothing failed, otherwise all failures joined.
    pub fn from_failures(failures: Vec<OperationFailure>) -> Result<(), ServiceError> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Self { failures })
        }
    }

    /// Failures in attempt order.
    pub fn failures(&self) -> &[OperationFailure] {
        &self.failures
    }

    /// Kinds of all failures in attempt order.
    pub fn kinds(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.failures.iter().map(OperationFailure::kind)
    }

    /// True if any failure is of `kind`.
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.kinds().any(|k| k == kind)
    }

    /// Matched membership kinds, ordered by [`ErrorKind::REPORT_ORDER`].
    pub fn domain_kinds_in_report_order(&self) -> Vec<ErrorKind> {
        ErrorKind::REPORT_ORDER
            .into_iter()
            .filter(|kind| self.has_kind(*kind))
            .collect()
    }

    /// True when no failure carries a domain kind.
    pub fn is_storage_failure(&self) -> bool {
        !self.kinds().any(ErrorKind::is_domain)
    }
}

impl From<OperationFailure> for ServiceError {
    fn from(failure: OperationFailure) -> Self {
        Self {
            failures: vec![failure],
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.failures.as_slice() {
            [only] => Some(&only.error),
            _ => None,
        }
    }
}

/// Live schema does not match the constraint table the store relies on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A named constraint is absent.
    #[error("constraint {name} is missing on table {table}")]
    MissingConstraint {
        /// Constraint name
        name: &'static str,
        /// Table it should be declared on
        table: &'static str,
    },

    /// A named constraint exists with a different type.
    #[error("constraint {name} has type {found}, expected {expected}")]
    WrongConstraintType {
        /// Constraint name
        name: &'static str,
        /// Expected type
        expected: &'static str,
        /// Type found in the catalog
        found: String,
    },

    /// The catalog could not be queried.
    #[error(transparent)]
    Store(#[from] StoreError),
}
