//! Provider credential — the one secret the relay holds.
//!
//! The raw value never appears in `Debug` output, and [`Credential::redact`]
//! scrubs it from any diagnostic text before that text is logged or returned.

use std::fmt;

const MASK: &str = "***";

/// An API key for the upstream provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Build a credential, stripping every whitespace character
    /// (keys pasted into env files often pick up stray spaces or newlines).
    ///
    /// Returns `None` if nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned))
        }
    }

    /// The raw key. Only for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Replace every occurrence of the key in `text` with a mask.
    pub fn redact(&self, text: &str) -> String {
        text.replace(&self.0, MASK)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({MASK})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_all_whitespace() {
        let cred = Credential::new("  sk-or-\tabc 123\n").unwrap();
        assert_eq!(cred.expose(), "sk-or-abc123");
    }

    #[test]
    fn test_blank_is_none() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new(" \n\t ").is_none());
    }

    #[test]
    fn test_debug_never_shows_key() {
        let cred = Credential::new("sk-or-secret").unwrap();
        let printed = format!("{cred:?}");
        assert!(!printed.contains("sk-or-secret"));
        assert_eq!(printed, "Credential(***)");
    }

    #[test]
    fn test_redact() {
        let cred = Credential::new("sk-or-secret").unwrap();
        assert_eq!(
            cred.redact("bad header: Bearer sk-or-secret (sk-or-secret)"),
            "bad header: Bearer *** (***)"
        );
        assert_eq!(cred.redact("nothing here"), "nothing here");
    }
}
