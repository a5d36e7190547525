//! Safe display of secrets
//!
//! Subscription secrets are never rendered in plaintext once set, neither in
//! command output nor in log lines.

use std::fmt;

/// Width of the mask, independent of the secret's length
const MASK_WIDTH: usize = 20;

/// Masked representation of a signing secret
#[derive(Clone, Debug)]
pub struct MaskedSecret<'a> {
    inner: Option<&'a str>,
}

impl<'a> MaskedSecret<'a> {
    /// # Example
    /// ```
    /// use hookhub_console::logging::MaskedSecret;
    ///
    /// assert_eq!(MaskedSecret::new(Some("whsec_123")).to_string(), "•".repeat(20));
    /// assert_eq!(MaskedSecret::new(None).to_string(), "-");
    /// ```
    pub fn new(secret: Option<&'a str>) -> Self {
        Self {
            inner: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_set(&self) -> bool {
        self.inner.is_some()
    }
}

impl<'a> fmt::Display for MaskedSecret<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner {
            Some(_) => write!(f, "{}", "•".repeat(MASK_WIDTH)),
            None => write!(f, "-"),
        }
    }
}

pub fn mask_secret(secret: Option<&str>) -> String {
    MaskedSecret::new(secret).to_string()
}
