//! Event log database migrations
//!
//! Applied to `logs.duckdb` by `LoggingService`, separately from the store
//! database, so the log can be cleared or deleted without touching data.

/// Ordered `(filename, sql)` pairs; the bootstrap file comes first
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
