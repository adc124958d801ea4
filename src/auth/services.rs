use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::{
    auth::{
        dto::Session,
        password,
        repo::UserStore,
        repo_types::NewUser,
        token,
    },
    error::{AppError, StoreError, UniqueField},
};

pub const MIN_USERNAME_CHARS: usize = 2;
pub const MIN_PASSWORD_CHARS: usize = 4;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Normalized registration input that passed every field rule.
#[derive(Debug)]
struct Registration {
    username: String,
    email: Option<String>,
}

fn validate_registration(
    username: &str,
    password: &str,
    email: Option<&str>,
) -> Result<Registration, AppError> {
    let mut errors = Vec::new();
    let username = username.trim();

    if username.is_empty() || password.trim().is_empty() {
        errors.push("username and password are required".to_string());
    } else {
        if username.chars().count() < MIN_USERNAME_CHARS {
            errors.push(format!("username must be at least {MIN_USERNAME_CHARS} characters"));
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            errors.push(format!("password must be at least {MIN_PASSWORD_CHARS} characters"));
        }
    }

    // An empty email is the same as no email.
    let email = email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());
    if let Some(e) = &email {
        if !is_valid_email(e) {
            errors.push(format!("{e} is not a valid email address"));
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    Ok(Registration {
        username: username.to_string(),
        email,
    })
}

/// Creates an account and returns its id together with the freshly issued token.
/// Uniqueness is left entirely to the store.
pub async fn register(
    users: &dyn UserStore,
    username: &str,
    password: &str,
    email: Option<&str>,
) -> Result<Session, AppError> {
    let reg = validate_registration(username, password, email)?;

    let password_hash = password::hash(password)?;
    let access_token = token::issue();

    let user = users
        .insert(NewUser {
            username: reg.username,
            email: reg.email,
            password_hash,
            access_token,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(UniqueField::AccessToken) => {
                AppError::Server(anyhow::anyhow!("issued access token collided"))
            }
            StoreError::Duplicate(field) => {
                warn!(%field, "registration rejected: duplicate");
                AppError::DuplicateKey(field)
            }
            other => other.into(),
        })?;

    info!(user_id = %user.id, "user registered");
    Ok(Session {
        user_id: user.id,
        access_token: user.access_token,
    })
}

/// Checks a username/password pair. An unknown username and a wrong password are
/// reported as different errors.
pub async fn login(
    users: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<Session, AppError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::validation("username and password are required"));
    }

    let Some(user) = users.find_by_username(username).await? else {
        debug!("login for unknown username");
        return Err(AppError::NotFound("User does not exist".into()));
    };

    if !password::verify(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredential);
    }

    info!(user_id = %user.id, "user logged in");
    Ok(Session {
        user_id: user.id,
        access_token: user.access_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("ann@example.com"));
        assert!(!is_valid_email("ann@example"));
        assert!(!is_valid_email("ann example@x.io"));
        assert!(!is_valid_email("@x.io"));
    }

    #[test]
    fn registration_rules() {
        assert!(validate_registration("ab", "abcd", None).is_ok());
        match validate_registration("a", "abc", Some("nope")) {
            Err(AppError::Validation(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
        assert!(validate_registration("   ", "abcd", None).is_err());
        assert!(validate_registration("ann", "", None).is_err());
    }

    #[test]
    fn email_is_normalized() {
        let reg = validate_registration("  ann ", "abcd", Some("  Ann@Example.COM ")).unwrap();
        assert_eq!(reg.username, "ann");
        assert_eq!(reg.email.as_deref(), Some("ann@example.com"));
        assert!(validate_registration("ann", "abcd", Some("  ")).unwrap().email.is_none());
    }

    #[tokio::test]
    async fn register_then_login_returns_same_token() {
        let store = MemoryStore::new();
        let reg = register(&store, "ann", "pass", Some("ann@x.io")).await.unwrap();
        assert_eq!(reg.access_token.len(), 64);

        let session = login(&store, "ann", "pass").await.unwrap();
        assert_eq!(session, reg);
    }

    #[tokio::test]
    async fn duplicate_username_keeps_first_account() {
        let store = MemoryStore::new();
        let first = register(&store, "ann", "first", None).await.unwrap();

        let err = register(&store, "ann", "second", None).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey(UniqueField::Username)));

        let session = login(&store, "ann", "first").await.unwrap();
        assert_eq!(session, first);
        assert!(matches!(
            login(&store, "ann", "second").await,
            Err(AppError::InvalidCredential)
        ));
    }

    #[tokio::test]
    async fn duplicate_email_is_named() {
        let store = MemoryStore::new();
        register(&store, "ann", "pass", Some("same@x.io")).await.unwrap();
        let err = register(&store, "bob", "pass", Some("SAME@x.io")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey(UniqueField::Email)));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_differ() {
        let store = MemoryStore::new();
        register(&store, "ann", "pass", None).await.unwrap();

        assert!(matches!(
            login(&store, "nobody", "anything").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            login(&store, "ann", "wrong").await,
            Err(AppError::InvalidCredential)
        ));
    }
}
