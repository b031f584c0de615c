use crate::{Result, ServiceError};

pub fn missing_parameter(key: &str) -> String {
    format!("missing parameter: {key}")
}

pub fn requires_nonwhitespace_chars(key: &str) -> String {
    format!("{key} must contain non-whitespace characters")
}

pub fn invalid_tag_id(raw: impl std::fmt::Display) -> String {
    format!("Invalid tag ID {raw}")
}

/// Collects input errors while string parameters are pulled out of a request.
///
/// Every problem is recorded rather than returned early, so a single response
/// can report all of them at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the whitespace-trimmed value of `key`, or records why it is unusable.
    ///
    /// An absent value is only an error when `optional` is false. A value that
    /// is present but blank is always an error.
    pub fn field(&mut self, key: &str, value: Option<&str>, optional: bool) -> Option<String> {
        let Some(raw) = value else {
            if !optional {
                self.errors.push(missing_parameter(key));
            }
            return None;
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.errors.push(requires_nonwhitespace_chars(key));
            None
        } else {
            Some(trimmed.to_owned())
        }
    }

    pub fn required(&mut self, key: &str, value: Option<&str>) -> Option<String> {
        self.field(key, value, false)
    }

    pub fn optional(&mut self, key: &str, value: Option<&str>) -> Option<String> {
        self.field(key, value, true)
    }

    pub fn push(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<()> {
        self.finish_with(Some(()))
    }

    /// Hands back `value` when nothing was recorded.
    ///
    /// Required fields always record an error when they come back `None`, so a
    /// `None` here only happens together with a non-empty error list.
    pub fn finish_with<T>(self, value: Option<T>) -> Result<T> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(ServiceError::Validation(self.errors)),
        }
    }
}
