//! Mention detection.

/// The `@**<name>**` token addressing one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    token: String,
}

impl Mention {
    /// Creates the mention token for a display name.
    pub fn new(full_name: &str) -> Self {
        Self {
            token: format!("@**{full_name}**"),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether `content` starts with the mention.
    pub fn matches(&self, content: &str) -> bool {
        content.starts_with(&self.token)
    }

    /// Removes a leading mention and at most one following space.
    ///
    /// Returns `None` when `content` does not start with the mention.
    pub fn strip<'a>(&self, content: &'a str) -> Option<&'a str> {
        let rest = content.strip_prefix(self.token.as_str())?;
        Some(rest.strip_prefix(' ').unwrap_or(rest))
    }
}
