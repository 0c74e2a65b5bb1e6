//! The seam to the external content cache / fetch layer.
//!
//! The engine never performs I/O. It submits [`RetrieveRequest`]s to a
//! [`FetchProvider`], receives an opaque [`ContentHandle`] back, and is then
//! driven by the provider's completion events (see
//! [`ContentEvent`](crate::engine::sink::ContentEvent)). Handles are
//! reference-like capabilities: the engine owns each acquired handle in
//! exactly one slot at a time and must release it exactly once.

pub mod cert;
pub mod null;

pub use cert::{CertChain, CertError, CertInfo};
pub use null::NullFetch;

use crate::engine::params::{FetchFlags, PostBody};
use crate::engine::sink::ContentEvent;
use crate::engine::window::WindowId;
use url::Url;
use uuid::Uuid;

/// An opaque capability representing fetched-and-decoded content held by the
/// provider.
///
/// Treat this as a token: it can be copied, compared, and used as a map key,
/// but only the provider knows what it refers to. The engine must hand every
/// acquired handle back via [`FetchProvider::release`] exactly once, after
/// aborting it first if the fetch was still in flight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHandle(Uuid);

impl ContentHandle {
    /// Mint a fresh handle. Called by providers, not by the engine.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContentHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broad classification of a piece of content.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Image,
    Other,
}

/// One frame declared by a frameset document.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDecl {
    pub name: Option<String>,
    pub url: Option<Url>,
}

/// The frame grid declared by a frameset document, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FramesetDecl {
    pub rows: u32,
    pub cols: u32,
    pub children: Vec<FrameDecl>,
}

/// One inline frame declared by a document.
#[derive(Debug, Clone, PartialEq)]
pub struct IframeDecl {
    pub name: Option<String>,
    pub url: Url,
    pub area: crate::viewport::Viewport,
}

/// Snapshot of everything the engine may ask about a piece of content.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentInfo {
    /// Final URL, after any redirects the provider followed.
    pub url: Url,
    pub title: Option<String>,
    pub kind: ContentKind,
    pub charset: Option<String>,
    pub quirks: bool,
    /// Provider status line shown once the content is done.
    pub status: String,
    pub frameset: Option<FramesetDecl>,
    pub iframes: Vec<IframeDecl>,
    /// `rel="icon"` link, if the document declared one.
    pub icon_link: Option<Url>,
    /// `rel="shortcut icon"` link, if the document declared one.
    pub shortcut_icon_link: Option<Url>,
    pub width: u32,
    pub height: u32,
}

impl ContentInfo {
    pub fn new(url: Url, kind: ContentKind) -> Self {
        Self {
            url,
            title: None,
            kind,
            charset: None,
            quirks: false,
            status: "Done".to_string(),
            frameset: None,
            iframes: Vec::new(),
            icon_link: None,
            shortcut_icon_link: None,
            width: 800,
            height: 600,
        }
    }
}

/// A fully described fetch submission.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrieveRequest {
    pub url: Url,
    pub flags: FetchFlags,
    pub referrer: Option<Url>,
    pub post: Option<PostBody>,
    /// The window the completion events should be delivered to.
    pub window: WindowId,
    pub parent_charset: Option<String>,
    pub parent_quirks: bool,
}

/// Synchronous failures reported by [`FetchProvider::retrieve`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetrieveError {
    #[error("no handler for this URL or content type")]
    NoHandler,

    #[error("out of memory")]
    NoMemory,

    #[error("fetch could not be started: {0}")]
    Failed(String),
}

/// Asynchronous fetch failures, delivered through the event sink. Every one
/// of these is absorbed into a prompt page; none is surfaced to the caller
/// that started the navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The site demanded credentials for the given realm.
    BadAuth { realm: String },
    /// Certificate verification failed; the chain arrived separately via
    /// [`ContentEvent::CertChain`].
    BadCerts,
    Timeout,
    Failed { message: String },
}

/// The external content cache / fetch layer.
///
/// Implementations complete fetches out of line and deliver
/// `(window, handle, event)` triples back through [`poll_event`]
/// (or by invoking the engine's sink directly). After
/// [`abort`](FetchProvider::abort) no further event for that handle may be
/// delivered.
///
/// [`poll_event`]: FetchProvider::poll_event
pub trait FetchProvider {
    /// Start fetching. Returns a handle owned by the caller until it is
    /// released.
    fn retrieve(&mut self, req: &RetrieveRequest) -> Result<ContentHandle, RetrieveError>;

    /// Hand the URL straight to the provider's download machinery. No handle
    /// is returned; the download side owns the transfer end to end.
    fn download(&mut self, req: &RetrieveRequest) -> Result<(), RetrieveError>;

    /// Stop an in-flight fetch. Idempotent. The handle still has to be
    /// released afterwards.
    fn abort(&mut self, handle: ContentHandle);

    /// Give the handle back. Must be called exactly once per acquired handle.
    fn release(&mut self, handle: ContentHandle);

    /// Describe a piece of content. `None` for unknown handles.
    fn describe(&self, handle: ContentHandle) -> Option<ContentInfo>;

    /// Lay the content out for the given unscaled size.
    fn reformat(&mut self, handle: ContentHandle, width: u32, height: u32);

    /// The content is now displayed in `window` and may receive interaction.
    fn open(&mut self, handle: ContentHandle, window: WindowId);

    /// The content is no longer displayed anywhere.
    fn close(&mut self, handle: ContentHandle);

    /// Next pending completion event, if any. The engine drains this from
    /// its event loop; providers pushing through another channel may leave
    /// the default in place.
    fn poll_event(&mut self) -> Option<(WindowId, ContentHandle, ContentEvent)> {
        None
    }
}
