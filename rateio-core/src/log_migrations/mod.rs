//! Event log schema, embedded at build time
//!
//! `BOOTSTRAP_MIGRATION` is idempotent and runs on every open. Each entry of
//! `LOG_MIGRATIONS` runs once and is then recorded in `sys_migrations`.

pub const BOOTSTRAP_MIGRATION: &str = include_str!("000_migrations.sql");

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial_schema.sql",
    include_str!("001_initial_schema.sql"),
)];
