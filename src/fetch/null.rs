//! A fully functional, non-I/O fetch provider.
//!
//! `NullFetch` synthesizes content for every URL it is asked for, including
//! the reserved `about:` pages, and queues the completion events a real
//! provider would deliver out of line. Responses can be scripted per URL and
//! every call is recorded, which is what the engine's own tests run against;
//! an embedder can also use it to drive the engine headless.

use crate::engine::sink::ContentEvent;
use crate::engine::window::WindowId;
use crate::fetch::{
    CertChain, ContentHandle, ContentInfo, ContentKind, FetchError, FetchProvider, RetrieveError,
    RetrieveRequest,
};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use url::Url;

/// What the provider should do when a URL is retrieved.
#[derive(Debug, Clone)]
pub enum NullResponse {
    /// Deliver Loading, Ready, Done for this content.
    Page(ContentInfo),
    /// Deliver Loading, the chain if present, then the error.
    Error {
        error: FetchError,
        chain: Option<CertChain>,
    },
    /// Refuse synchronously: nothing handles this URL.
    NoHandler,
    /// Refuse synchronously with a message.
    Refuse(String),
}

/// One recorded provider call.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchCall {
    Retrieve(Url),
    Download(Url),
    Abort(ContentHandle),
    Release(ContentHandle),
    Open(ContentHandle),
    Close(ContentHandle),
    Reformat(ContentHandle, u32, u32),
}

#[derive(Default)]
struct Inner {
    scripts: HashMap<String, NullResponse>,
    refreshes: HashMap<String, (u32, Url)>,
    contents: HashMap<ContentHandle, ContentInfo>,
    releases: HashMap<ContentHandle, u32>,
    queue: VecDeque<(WindowId, ContentHandle, ContentEvent)>,
    calls: Vec<FetchCall>,
    retrieves: Vec<RetrieveRequest>,
    downloads: Vec<RetrieveRequest>,
}

/// The null fetch provider. Cloning shares the underlying state, so a test
/// can keep a handle for scripting and assertions after the engine has taken
/// ownership of its own clone.
#[derive(Clone, Default)]
pub struct NullFetch {
    inner: Rc<RefCell<Inner>>,
}

impl NullFetch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response for a URL. Later scripts replace earlier ones.
    pub fn script(&self, url: &str, response: NullResponse) {
        self.inner
            .borrow_mut()
            .scripts
            .insert(url.to_string(), response);
    }

    /// Script a successful page for a URL, adjusting the default description.
    pub fn script_page(&self, url: &str, adjust: impl FnOnce(&mut ContentInfo)) {
        let parsed = Url::parse(url).expect("scripted URL is valid");
        let mut info = default_info(&parsed);
        adjust(&mut info);
        self.script(url, NullResponse::Page(info));
    }

    /// Make the page at `url` announce a refresh before completing.
    pub fn script_refresh(&self, url: &str, delay: u32, target: &str) {
        let target = Url::parse(target).expect("scripted URL is valid");
        self.inner
            .borrow_mut()
            .refreshes
            .insert(url.to_string(), (delay, target));
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.inner.borrow().calls.clone()
    }

    pub fn count(&self, matcher: impl Fn(&FetchCall) -> bool) -> usize {
        self.inner.borrow().calls.iter().filter(|c| matcher(c)).count()
    }

    pub fn release_count(&self, handle: ContentHandle) -> u32 {
        self.inner
            .borrow()
            .releases
            .get(&handle)
            .copied()
            .unwrap_or(0)
    }

    pub fn retrieve_requests(&self) -> Vec<RetrieveRequest> {
        self.inner.borrow().retrieves.clone()
    }

    pub fn download_requests(&self) -> Vec<RetrieveRequest> {
        self.inner.borrow().downloads.clone()
    }

    pub fn queued_events(&self) -> usize {
        self.inner.borrow().queue.len()
    }
}

/// Description synthesized for URLs with no script attached.
fn default_info(url: &Url) -> ContentInfo {
    let mut info = ContentInfo::new(url.clone(), ContentKind::Html);
    match (url.scheme(), url.path()) {
        ("about", "query_auth") => info.title = Some("Authentication required".to_string()),
        ("about", "query_ssl") => info.title = Some("Certificate problem".to_string()),
        ("about", "query_timeout") => info.title = Some("Connection timed out".to_string()),
        ("about", "query_fetcherror") => info.title = Some("Problem loading page".to_string()),
        ("about", "blank") => info.title = Some("Blank page".to_string()),
        ("about", "favicon") => {
            info.kind = ContentKind::Image;
            info.width = 16;
            info.height = 16;
        }
        ("about", _) => {}
        _ => info.title = url.host_str().map(str::to_owned),
    }
    info
}

impl FetchProvider for NullFetch {
    fn retrieve(&mut self, req: &RetrieveRequest) -> Result<ContentHandle, RetrieveError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(FetchCall::Retrieve(req.url.clone()));
        inner.retrieves.push(req.clone());

        let response = inner
            .scripts
            .get(req.url.as_str())
            .cloned()
            .unwrap_or_else(|| NullResponse::Page(default_info(&req.url)));

        match response {
            NullResponse::NoHandler => Err(RetrieveError::NoHandler),
            NullResponse::Refuse(message) => Err(RetrieveError::Failed(message)),
            NullResponse::Page(info) => {
                let handle = ContentHandle::new();
                let refresh = inner.refreshes.get(req.url.as_str()).cloned();
                inner.contents.insert(handle, info);
                inner.queue.push_back((
                    req.window,
                    handle,
                    ContentEvent::Loading {
                        status: format!("Fetching {}", req.url),
                    },
                ));
                inner.queue.push_back((req.window, handle, ContentEvent::Ready));
                if let Some((delay, url)) = refresh {
                    inner
                        .queue
                        .push_back((req.window, handle, ContentEvent::Refresh { delay, url }));
                }
                inner.queue.push_back((req.window, handle, ContentEvent::Done));
                Ok(handle)
            }
            NullResponse::Error { error, chain } => {
                let handle = ContentHandle::new();
                inner.contents.insert(handle, default_info(&req.url));
                inner.queue.push_back((
                    req.window,
                    handle,
                    ContentEvent::Loading {
                        status: format!("Fetching {}", req.url),
                    },
                ));
                if let Some(chain) = chain {
                    inner
                        .queue
                        .push_back((req.window, handle, ContentEvent::CertChain { chain }));
                }
                inner
                    .queue
                    .push_back((req.window, handle, ContentEvent::Error { error }));
                Ok(handle)
            }
        }
    }

    fn download(&mut self, req: &RetrieveRequest) -> Result<(), RetrieveError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(FetchCall::Download(req.url.clone()));
        inner.downloads.push(req.clone());
        match inner.scripts.get(req.url.as_str()) {
            Some(NullResponse::NoHandler) => Err(RetrieveError::NoHandler),
            Some(NullResponse::Refuse(message)) => Err(RetrieveError::Failed(message.clone())),
            _ => Ok(()),
        }
    }

    fn abort(&mut self, handle: ContentHandle) {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(FetchCall::Abort(handle));
        // An aborted fetch must never call back.
        inner.queue.retain(|(_, h, _)| *h != handle);
    }

    fn release(&mut self, handle: ContentHandle) {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(FetchCall::Release(handle));
        *inner.releases.entry(handle).or_insert(0) += 1;
    }

    fn describe(&self, handle: ContentHandle) -> Option<ContentInfo> {
        self.inner.borrow().contents.get(&handle).cloned()
    }

    fn reformat(&mut self, handle: ContentHandle, width: u32, height: u32) {
        self.inner
            .borrow_mut()
            .calls
            .push(FetchCall::Reformat(handle, width, height));
    }

    fn open(&mut self, handle: ContentHandle, _window: WindowId) {
        self.inner.borrow_mut().calls.push(FetchCall::Open(handle));
    }

    fn close(&mut self, handle: ContentHandle) {
        self.inner.borrow_mut().calls.push(FetchCall::Close(handle));
    }

    fn poll_event(&mut self) -> Option<(WindowId, ContentHandle, ContentEvent)> {
        self.inner.borrow_mut().queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::params::FetchFlags;

    fn request(url: &str) -> RetrieveRequest {
        RetrieveRequest {
            url: Url::parse(url).unwrap(),
            flags: FetchFlags::VERIFIABLE,
            referrer: None,
            post: None,
            window: WindowId::new(),
            parent_charset: None,
            parent_quirks: false,
        }
    }

    #[test]
    fn default_page_delivers_loading_ready_done() {
        let mut fetch = NullFetch::new();
        let handle = fetch.retrieve(&request("https://example.com/")).unwrap();

        let events: Vec<_> = std::iter::from_fn(|| fetch.poll_event()).collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0].2, ContentEvent::Loading { .. }));
        assert_eq!(events[1].2, ContentEvent::Ready);
        assert_eq!(events[2].2, ContentEvent::Done);
        assert!(events.iter().all(|(_, h, _)| *h == handle));
        assert_eq!(
            fetch.describe(handle).unwrap().title.as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn abort_drops_pending_events() {
        let mut fetch = NullFetch::new();
        let handle = fetch.retrieve(&request("https://example.com/")).unwrap();
        fetch.abort(handle);
        assert!(fetch.poll_event().is_none());
        fetch.release(handle);
        assert_eq!(fetch.release_count(handle), 1);
    }

    #[test]
    fn scripted_error_delivers_chain_then_error() {
        let mut fetch = NullFetch::new();
        fetch.script(
            "https://bad.example/",
            NullResponse::Error {
                error: FetchError::BadCerts,
                chain: Some(CertChain::default()),
            },
        );
        fetch.retrieve(&request("https://bad.example/")).unwrap();

        let kinds: Vec<_> = std::iter::from_fn(|| fetch.poll_event())
            .map(|(_, _, e)| e)
            .collect();
        assert!(matches!(kinds[0], ContentEvent::Loading { .. }));
        assert!(matches!(kinds[1], ContentEvent::CertChain { .. }));
        assert!(matches!(kinds[2], ContentEvent::Error { .. }));
    }

    #[test]
    fn reserved_pages_are_synthesized() {
        let mut fetch = NullFetch::new();
        let handle = fetch.retrieve(&request("about:query_auth")).unwrap();
        let info = fetch.describe(handle).unwrap();
        assert_eq!(info.title.as_deref(), Some("Authentication required"));
        assert_eq!(info.kind, ContentKind::Html);

        let icon = fetch.retrieve(&request("about:favicon")).unwrap();
        assert_eq!(fetch.describe(icon).unwrap().kind, ContentKind::Image);
    }
}
