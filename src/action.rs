use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Operation a principal wants to perform on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    /// Ban or unban an account.
    ToggleActive,
    /// Grant or revoke staff status.
    TogglePermission,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::ToggleActive,
        Action::TogglePermission,
    ];

    /// Returns the canonical snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::ToggleActive => "toggle_active",
            Self::TogglePermission => "toggle_permission",
        }
    }

    /// Returns true for every action that changes stored state.
    pub fn is_write(self) -> bool {
        !matches!(self, Self::Read)
    }

    /// Maps an HTTP method to the action it performs.
    ///
    /// Safe methods read; anything not covered by the CRUD verbs is `None`.
    #[cfg(feature = "axum")]
    pub fn from_method(method: &http::Method) -> Option<Self> {
        use http::Method;

        match *method {
            Method::GET | Method::HEAD | Method::OPTIONS => Some(Self::Read),
            Method::POST => Some(Self::Create),
            Method::PUT | Method::PATCH => Some(Self::Update),
            Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    /// Parses an action name, ignoring case and surrounding whitespace.
    /// Both `toggle_active` and `toggle-active` are accepted.
    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        if normalized.is_empty() {
            return Err(Error::InvalidAction("action must not be empty".to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| Error::InvalidAction(format!("unknown action `{}`", value.trim())))
    }
}

impl TryFrom<&str> for Action {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}
