use std::fmt;

/// Terminal failure classes of a remote operation, as seen by the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Timeout,
    Unauthorized,
    NotFound,
    Validation,
    Server(u16),
    HttpStatus(u16),
    TooLarge,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Unauthorized => write!(f, "authentication failed"),
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::Validation => write!(f, "validation failed"),
            FailureKind::Server(code) => write!(f, "server error {code}"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::TooLarge => write!(f, "response too large"),
            FailureKind::Decode => write!(f, "undecodable response"),
        }
    }
}

/// User-triggered or view-triggered operation a notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Star,
    Unstar,
    Fork,
    Create,
    LoadPublic,
    LoadMine,
    LoadStarred,
    Search,
    LoadDetail,
    VerifyUser,
}

/// Result of a relation mutation whose remote call succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Local snapshot updated.
    Applied,
    /// Remote call succeeded, the relation was already recorded.
    Unchanged,
    /// Remote call succeeded but the snapshot to record could not be fetched.
    RemoteOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    pub fn success(action: Action) -> Option<Self> {
        let text = match action {
            Action::Star => "Gist starred successfully!",
            Action::Unstar => "Gist unstarred successfully!",
            Action::Fork => "Gist forked successfully!",
            Action::Create => "Gist created successfully!",
            _ => return None,
        };
        Some(Self::new(Severity::Success, text))
    }

    pub fn remote_only(action: Action) -> Self {
        let done = match action {
            Action::Unstar => "unstarred",
            Action::Fork => "forked",
            _ => "starred",
        };
        Self::new(
            Severity::Error,
            format!("Gist {done}, but failed to update local list."),
        )
    }

    pub fn failure(action: Action, kind: FailureKind) -> Self {
        let text = match (action, kind) {
            (Action::Star | Action::Unstar, FailureKind::NotFound) => {
                "Gist not found. Make sure the gist exists and you have access to it.".to_string()
            }
            (Action::Star | Action::Unstar, FailureKind::Unauthorized) => format!(
                "Authentication required. Please log in to {} gists.",
                verb(action)
            ),
            (Action::Star | Action::Unstar, _) => format!("Failed to {} gist.", verb(action)),
            (Action::Fork, _) => "Failed to fork gist. Make sure you are logged in.".to_string(),
            (Action::Create, _) => "Failed to create gist.".to_string(),
            (Action::LoadStarred, FailureKind::Unauthorized) => {
                "Authentication required. Please log in to view starred gists.".to_string()
            }
            (Action::LoadStarred, _) => "Failed to load starred gists.".to_string(),
            (Action::LoadPublic, _) => "Failed to load public gists.".to_string(),
            (Action::LoadMine, _) => "Failed to load your gists.".to_string(),
            (Action::Search, _) => "Failed to search gists.".to_string(),
            (Action::LoadDetail, FailureKind::NotFound) => "Gist not found.".to_string(),
            (Action::LoadDetail, _) => "Failed to load gist details.".to_string(),
            (Action::VerifyUser, _) => "Authentication failed. Please log in again.".to_string(),
        };
        Self::new(Severity::Error, text)
    }
}

fn verb(action: Action) -> &'static str {
    match action {
        Action::Unstar => "unstar",
        Action::Fork => "fork",
        _ => "star",
    }
}
