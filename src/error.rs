/*!
Error types shared by the storage, service, and http layers
*/
use std::borrow::Cow;

// postgres SQLSTATE codes
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Coarse classification of an `Error`, used to pick the http
/// status and decide whether the message is safe to show a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Invariant,
    Authorization,
    Authentication,
    PayloadTooLarge,
    Server,
}

impl ErrorKind {
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Invariant => 400,
            ErrorKind::Authorization => 403,
            ErrorKind::Authentication => 401,
            ErrorKind::PayloadTooLarge => 413,
            ErrorKind::Server => 500,
        }
    }

    pub fn is_client_error(self) -> bool {
        self != ErrorKind::Server
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// A business rule or payload schema was violated
    #[error("{0}")]
    Invariant(String),

    /// The caller is known but has no rights over the resource
    #[error("{0}")]
    Authorization(String),

    /// The caller could not be identified
    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Invariant(_) => ErrorKind::Invariant,
            Error::Authorization(_) => ErrorKind::Authorization,
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::PayloadTooLarge(_) => ErrorKind::PayloadTooLarge,
            Error::Database(_) | Error::Io(_) | Error::Json(_) | Error::Server(_) => {
                ErrorKind::Server
            }
        }
    }

    pub fn status(&self) -> u16 {
        self.kind().status()
    }

    /// The message a client is allowed to see. Server faults are
    /// replaced with a generic message.
    pub fn public_message(&self) -> Cow<'_, str> {
        match self.kind() {
            ErrorKind::Server => Cow::Borrowed("an internal server error occurred"),
            _ => Cow::Owned(self.to_string()),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::Invariant(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Error::Authorization(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        Error::Authentication(msg.into())
    }
}

/// Constraint violations reported by postgres are the last line of
/// defense for integrity, so they surface as client errors rather
/// than server faults.
impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return Error::Invariant(format!("record already exists: {}", db.message()))
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return Error::NotFound(format!(
                        "referenced record does not exist: {}",
                        db.message()
                    ))
                }
                _ => (),
            }
        }
        Error::Database(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(Error::not_found("x").status(), 404);
        assert_eq!(Error::invariant("x").status(), 400);
        assert_eq!(Error::authorization("x").status(), 403);
        assert_eq!(Error::authentication("x").status(), 401);
        assert_eq!(Error::PayloadTooLarge("x".into()).status(), 413);
        assert_eq!(se!("boom {}", 1).status(), 500);
    }

    #[test]
    fn server_faults_hide_details() {
        let e = se!("connection refused on 10.0.0.3");
        assert_eq!(e.public_message(), "an internal server error occurred");
        let e = Error::invariant("\"name\" is required");
        assert_eq!(e.public_message(), "\"name\" is required");
        assert!(e.kind().is_client_error());
        assert!(!sqlx_row_not_found().kind().is_client_error());
    }

    fn sqlx_row_not_found() -> Error {
        Error::from(sqlx::Error::RowNotFound)
    }
}
