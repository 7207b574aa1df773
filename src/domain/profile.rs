use serde::{Deserialize, Serialize};

pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Display data for a comment author, looked up from the `profiles` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl AuthorProfile {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Display name, then username, then "Anonymous".
    pub fn display_name(&self) -> &str {
        non_blank(self.display_name.as_deref())
            .or_else(|| non_blank(self.username.as_deref()))
            .unwrap_or(ANONYMOUS_NAME)
    }

    pub fn avatar_url(&self) -> Option<&str> {
        non_blank(self.avatar_url.as_deref())
    }

    pub fn is_anonymous(&self) -> bool {
        self.display_name() == ANONYMOUS_NAME && self.avatar_url().is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
