use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::{
    config::DatabaseConfig,
    error::{StoreError, UniqueField},
};

pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect(&cfg.url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;
    info!(max_connections = cfg.max_connections, "database ready");
    Ok(db)
}

/// Maps a named unique constraint onto the field it guards.
pub(crate) fn unique_field(constraint: &str) -> Option<UniqueField> {
    match constraint {
        "users_username_key" => Some(UniqueField::Username),
        "users_email_key" => Some(UniqueField::Email),
        "users_access_token_key" => Some(UniqueField::AccessToken),
        _ => None,
    }
}

pub(crate) fn check_message(constraint: &str) -> String {
    match constraint {
        "thoughts_message_len" => "message must be between 5 and 140 characters".into(),
        "thoughts_hearts_nonneg" => "hearts must not be negative".into(),
        "users_username_len" => "username must be at least 2 characters".into(),
        other => format!("constraint {other} violated"),
    }
}

/// Translates a driver error into the closed store error set.
pub(crate) fn classify(e: sqlx::Error, op: &'static str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        let constraint = db_err.constraint().unwrap_or_default();
        if db_err.is_unique_violation() {
            if let Some(field) = unique_field(constraint) {
                return StoreError::Duplicate(field);
            }
            warn!(constraint, op, "unique violation on unmapped constraint");
        } else if db_err.is_check_violation() {
            return StoreError::Constraint(check_message(constraint));
        }
    }
    StoreError::Backend(anyhow::Error::new(e).context(op))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_unique_constraints_to_fields() {
        assert_eq!(unique_field("users_username_key"), Some(UniqueField::Username));
        assert_eq!(unique_field("users_email_key"), Some(UniqueField::Email));
        assert_eq!(unique_field("users_access_token_key"), Some(UniqueField::AccessToken));
        assert_eq!(unique_field("thoughts_pkey"), None);
    }

    #[test]
    fn check_messages_are_readable() {
        assert!(check_message("thoughts_message_len").contains("140"));
        assert_eq!(check_message("mystery"), "constraint mystery violated");
    }

    #[test]
    fn non_database_errors_are_backend() {
        let err = classify(sqlx::Error::RowNotFound, "find thing");
        match err {
            StoreError::Backend(e) => assert!(format!("{e:#}").contains("find thing")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
