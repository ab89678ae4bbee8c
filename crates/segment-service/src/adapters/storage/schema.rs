//! Schema definition and catalog checks.

use super::constraints::CONSTRAINT_RULES;
use crate::domain::SchemaError;

/// Advisory lock key held while the schema is created, so processes
/// starting together do not race in the system catalog.
pub const SCHEMA_LOCK_KEY: i64 = 0x5345_474D_454E_5453;

/// Takes [`SCHEMA_LOCK_KEY`] until the surrounding transaction ends.
pub const SCHEMA_LOCK_QUERY: &str = "SELECT pg_advisory_xact_lock($1)";

/// Idempotent DDL, executed in order inside one transaction.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS segment (
        name TEXT NOT NULL,
        CONSTRAINT segment_pkey PRIMARY KEY (name)
    )",
    "CREATE TABLE IF NOT EXISTS users_in_segment (
        user_id BIGINT NOT NULL,
        segment TEXT NOT NULL,
        CONSTRAINT users_in_segment_segment_fkey FOREIGN KEY (segment)
            REFERENCES segment (name) ON DELETE CASCADE,
        CONSTRAINT users_in_segment_user_id_segment_key UNIQUE (user_id, segment)
    )",
    "CREATE INDEX IF NOT EXISTS users_in_segment_user_id_idx ON users_in_segment (user_id)",
];

/// Lists `(constraint, table, contype)` for the given constraint names.
pub const CONSTRAINT_CATALOG_QUERY: &str = "\
    SELECT c.conname::TEXT, t.relname::TEXT, c.contype::TEXT \
    FROM pg_constraint c \
    JOIN pg_class t ON t.oid = c.conrelid \
    WHERE c.conname::TEXT = ANY($1)";

/// A row of [`CONSTRAINT_CATALOG_QUERY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConstraint {
    pub name: String,
    pub table: String,
    pub contype: String,
}

/// Compare catalog rows against the constraint rules.
pub fn check_constraints(found: &[CatalogConstraint]) -> Result<(), SchemaError> {
    for rule in CONSTRAINT_RULES {
        let entry = found
            .iter()
            .find(|c| c.name == rule.name && c.table == rule.table)
            .ok_or(SchemaError::MissingConstraint {
                name: rule.name,
                table: rule.table,
            })?;

        let expected = rule.constraint_type.contype();
        if entry.contype != expected {
            return Err(SchemaError::WrongConstraintType {
                name: rule.name,
                expected,
                found: entry.contype.clone(),
            });
        }
    }
    Ok(())
}
