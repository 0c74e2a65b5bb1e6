/// Errors returned by the navigation entry points.
///
/// Only malformed calls and resource limits are reported synchronously to the
/// caller; the window keeps whatever content it was displaying. Fetch-level
/// failures (authentication, certificates, timeouts, generic fetch errors)
/// are absorbed by the engine and turned into an internal prompt page
/// instead; they never surface through a `Result`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    #[error("Bad parameter")]
    BadParameter,

    #[error("Out of memory")]
    NoMemory,

    #[error("Frame nesting too deep")]
    FrameDepth,

    #[error("Internal query requires posted context")]
    NeedData,

    #[error("Authentication required")]
    BadAuth,

    #[error("Certificate verification failed")]
    BadCerts,

    #[error("Connection timed out")]
    Timeout,

    #[error("No handler for this content type")]
    NoFetchHandler,

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Not found")]
    NotFound,
}
