use std::fmt;

use sea_orm::DbErr;

/// The kind of row a request referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Post,
    Tag,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Post => "post",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error from a [`crate::Query`] or [`crate::Mutation`] operation
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input was rejected; nothing was written
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),
    /// The targeted row does not exist
    #[error("Invalid {0} ID")]
    NotFound(Resource),
    /// The database refused the operation
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl ServiceError {
    /// The user-facing messages carried by this error.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message() {
        assert_eq!(
            ServiceError::NotFound(Resource::User).to_string(),
            "Invalid user ID"
        );
        assert_eq!(
            ServiceError::NotFound(Resource::Tag).messages(),
            vec!["Invalid tag ID".to_owned()]
        );
    }

    #[test]
    fn validation_messages_are_kept_apart() {
        let err = ServiceError::Validation(vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(err.messages(), vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(err.to_string(), "a; b");
    }
}
