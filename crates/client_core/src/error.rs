use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single remote store call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request could not be dispatched, the server was unreachable, or the response
    /// body could not be read.
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("{method} {url} rejected with status {status}")]
    Rejected {
        method: &'static str,
        url: String,
        status: StatusCode,
    },
    /// The endpoint url could not be resolved against the api base.
    #[error("cannot resolve `{path}` against {base}: {source}")]
    Endpoint {
        base: String,
        path: &'static str,
        #[source]
        source: url::ParseError,
    },
}

impl StoreError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status(),
            Self::Endpoint { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("cannot handle `{event}` while {from}")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },
    #[error("loaded record {loaded} does not match pending edit of {pending}")]
    MismatchedRecord { pending: String, loaded: String },
}

#[derive(Debug, Error)]
pub enum ApiBaseError {
    #[error("invalid api base url `{url}`: {source}")]
    Parse {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("api base url `{0}` cannot carry a path")]
    NotHierarchical(String),
}
