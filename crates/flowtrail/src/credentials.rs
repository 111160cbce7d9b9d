//! Access-token pool used to spread request volume across credentials.

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use rand::seq::IndexedRandom;

/// An opaque API access token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("token {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// An immutable set of credentials.
///
/// Selection is uniform-random and stateless; the pool is cheap to clone and
/// safe to share between tasks.
#[derive(Debug, Clone, Default)]
pub struct CredentialPool {
    credentials: Arc<[Credential]>,
}

impl CredentialPool {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let credentials: Vec<Credential> = tokens
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.trim().is_empty())
            .map(|t| Credential::new(t.trim()))
            .collect();
        Self {
            credentials: credentials.into(),
        }
    }

    /// Parse newline-delimited tokens, ignoring blank lines.
    pub fn from_lines(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Load newline-delimited tokens from a file.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_lines(&text))
    }

    /// Pick a credential for one outgoing request.
    pub fn select(&self) -> Option<&Credential> {
        self.credentials.choose(&mut rand::rng())
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_pool_selects_nothing() {
        let pool = CredentialPool::default();
        assert!(pool.is_empty());
        assert!(pool.select().is_none());
    }

    #[test]
    fn from_lines_skips_blank_lines_and_trims() {
        let pool = CredentialPool::from_lines("ghp_one\n\n  ghp_two  \n\t\n");
        assert_eq!(pool.len(), 2);
        let selected = pool.select().expect("non-empty pool");
        assert!(["ghp_one", "ghp_two"].contains(&selected.expose()));
    }

    #[test]
    fn selection_eventually_uses_every_credential() {
        let pool = CredentialPool::new(["a", "b", "c"]);
        let seen: HashSet<&str> = (0..500)
            .filter_map(|_| pool.select())
            .map(Credential::expose)
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn debug_output_redacts_token() {
        let cred = Credential::new("ghp_secret");
        assert_eq!(format!("{cred:?}"), "Credential(***)");
        assert_eq!(cred.authorization(), "token ghp_secret");
    }

    #[test]
    fn from_file_reads_tokens_and_reports_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ghp_a").unwrap();
        writeln!(file, "ghp_b").unwrap();

        let pool = CredentialPool::from_file(file.path()).unwrap();
        assert_eq!(pool.len(), 2);

        let missing = file.path().with_extension("missing");
        assert!(CredentialPool::from_file(missing).is_err());
    }
}
