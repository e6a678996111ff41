//! Token material held by a session.

use std::fmt;

use zeroize::Zeroize;

/// An opaque token string that must not leak through logs.
///
/// The value is redacted from `Debug` output and zeroized on drop.
#[derive(Clone)]
pub struct SecretToken {
    value: String,
}

impl SecretToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Borrow the raw token for transmission.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretToken(**redacted**)")?;
        Ok(())
    }
}

impl Drop for SecretToken {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// The access/refresh token pair backing an authenticated session.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived token attached to each request.
    pub access: SecretToken,

    /// Long-lived token exchanged for fresh pairs.
    pub refresh: SecretToken,
}

impl TokenPair {
    /// Build a pair from raw token strings.
    #[must_use]
    pub fn new(access: String, refresh: String) -> Self {
        Self {
            access: SecretToken::new(access),
            refresh: SecretToken::new(refresh),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let token = SecretToken::new("very-secret".to_owned());

        let rendered = format!("{token:?}");

        assert!(
            !rendered.contains("very-secret"),
            "token material must not appear in debug output"
        );
    }

    #[test]
    fn expose_returns_raw_value() {
        let token = SecretToken::new("abc".to_owned());

        assert_eq!(token.expose(), "abc");
    }
}
