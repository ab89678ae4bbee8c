//! Constraint-violation classification.
//!
//! PostgreSQL reports which named constraint rejected a write. The store
//! maps that name to a domain error through [`CONSTRAINT_RULES`]; the
//! runtime checks the table against the live catalog at startup so a
//! renamed constraint fails loudly instead of degrading to a generic
//! storage failure.

use crate::domain::StoreError;

/// SQLSTATE for `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for `foreign_key_violation`.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Kind of table constraint a rule refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintType {
    PrimaryKey,
    Unique,
    ForeignKey,
}

impl ConstraintType {
    /// SQLSTATE raised when this constraint rejects a row.
    pub fn sqlstate(self) -> &'static str {
        match self {
            ConstraintType::PrimaryKey | ConstraintType::Unique => UNIQUE_VIOLATION,
            ConstraintType::ForeignKey => FOREIGN_KEY_VIOLATION,
        }
    }

    /// Value of `pg_constraint.contype`.
    pub fn contype(self) -> &'static str {
        match self {
            ConstraintType::PrimaryKey => "p",
            ConstraintType::Unique => "u",
            ConstraintType::ForeignKey => "f",
        }
    }
}

/// One named constraint and the domain error its violation means.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintRule {
    pub name: &'static str,
    pub table: &'static str,
    pub constraint_type: ConstraintType,
    error: fn() -> StoreError,
}

impl ConstraintRule {
    /// Domain error for a violation of this constraint.
    pub fn error(&self) -> StoreError {
        (self.error)()
    }
}

/// Every constraint the store relies on for classification.
pub const CONSTRAINT_RULES: &[ConstraintRule] = &[
    ConstraintRule {
        name: "segment_pkey",
        table: "segment",
        constraint_type: ConstraintType::PrimaryKey,
        error: || StoreError::SegmentAlreadyExists,
    },
    ConstraintRule {
        name: "users_in_segment_segment_fkey",
        table: "users_in_segment",
        constraint_type: ConstraintType::ForeignKey,
        error: || StoreError::SegmentNotFound,
    },
    ConstraintRule {
        name: "users_in_segment_user_id_segment_key",
        table: "users_in_segment",
        constraint_type: ConstraintType::Unique,
        error: || StoreError::UserAlreadyInSegment,
    },
];

/// Rule registered under `name`.
pub fn rule_for(name: &str) -> Option<&'static ConstraintRule> {
    CONSTRAINT_RULES.iter().find(|rule| rule.name == name)
}

/// Map a database error to a domain error.
///
/// Both the constraint name and the SQLSTATE must match a rule; anything
/// else becomes [`StoreError::Storage`] carrying `message`.
pub fn classify(constraint: Option<&str>, sqlstate: Option<&str>, message: &str) -> StoreError {
    constraint
        .and_then(rule_for)
        .filter(|rule| sqlstate == Some(rule.constraint_type.sqlstate()))
        .map(ConstraintRule::error)
        .unwrap_or_else(|| StoreError::storage(message))
}
