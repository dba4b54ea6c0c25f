use std::fmt;

use crate::error::MissingTokenError;

/// Opaque bearer credential issued by the provider.
///
/// Never parsed or altered; the only check is that it is not empty.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Result<Self, MissingTokenError> {
        let value = value.into();
        if value.is_empty() {
            return Err(MissingTokenError);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_is_rejected() {
        assert_eq!(SessionToken::new(""), Err(MissingTokenError));
    }

    #[test]
    fn value_is_kept_verbatim() {
        let token = SessionToken::new(" a.b.c ").unwrap();
        assert_eq!(token.as_str(), " a.b.c ");
    }

    #[test]
    fn debug_does_not_leak_value() {
        let token = SessionToken::new("xyz-secret-token").unwrap();
        assert!(!format!("{token:?}").contains("xyz-secret-token"));
    }
}
