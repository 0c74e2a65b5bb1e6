//! Routing of navigation parameters: reserved internal URLs are dispatched
//! to a recovery flow; everything else goes to the fetch provider.
//!
//! The reserved URLs form a small contract with the content layer: a GET of
//! `about:query_auth` (or its siblings) renders a prompt page from the
//! multipart context it was posted with, and a later POST to the same URL
//! carries the user's decision back into the engine.

use crate::engine::engine::SkiffEngine;
use crate::engine::params::{FetchFlags, FetchParams, NavigationFlags};
use crate::engine::window::WindowId;
use crate::errors::NavError;
use crate::fetch::{RetrieveError, RetrieveRequest};
use url::Url;

pub(crate) const INTERNAL_SCHEME: &str = "about";
pub(crate) const QUERY_AUTH: &str = "query_auth";
pub(crate) const QUERY_SSL: &str = "query_ssl";
pub(crate) const QUERY_TIMEOUT: &str = "query_timeout";
pub(crate) const QUERY_FETCHERROR: &str = "query_fetcherror";

/// Which recovery flow a reserved internal URL belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum QueryKind {
    Auth,
    Ssl,
    Timeout,
    FetchError,
}

pub(crate) fn classify_internal(url: &Url) -> Option<QueryKind> {
    if url.scheme() != INTERNAL_SCHEME {
        return None;
    }
    match url.path() {
        QUERY_AUTH => Some(QueryKind::Auth),
        QUERY_SSL => Some(QueryKind::Ssl),
        QUERY_TIMEOUT => Some(QueryKind::Timeout),
        QUERY_FETCHERROR => Some(QueryKind::FetchError),
        _ => None,
    }
}

pub(crate) fn internal_url(path: &str) -> Url {
    Url::parse(&format!("{INTERNAL_SCHEME}:{path}")).expect("reserved internal URL is valid")
}

impl SkiffEngine {
    /// Dispatch prepared parameters: recovery flows for the reserved URLs,
    /// a real fetch for everything else.
    pub(crate) fn route(&mut self, id: WindowId, params: &FetchParams) -> Result<(), NavError> {
        match classify_internal(&params.url) {
            Some(QueryKind::Auth) => self.query_auth(id, params),
            Some(QueryKind::Ssl) => self.query_ssl(id, params),
            Some(QueryKind::Timeout) => self.query_timeout(id, params),
            Some(QueryKind::FetchError) => self.query_fetcherror(id, params),
            None => self.start_fetch(id, params),
        }
    }

    /// Submit the parameters to the fetch provider and adopt the returned
    /// handle as the window's loading content.
    pub(crate) fn start_fetch(&mut self, id: WindowId, params: &FetchParams) -> Result<(), NavError> {
        let internal = {
            let win = self.win_mut(id)?;
            // A fresh attempt invalidates whatever chain the previous one saw.
            win.loading_cert_chain = None;
            win.internal_nav
        };

        let mut flags = FetchFlags::SNIFF_TYPE;
        if !params.flags.contains(NavigationFlags::UNVERIFIABLE) {
            flags |= FetchFlags::VERIFIABLE | FetchFlags::MAY_DOWNLOAD;
        }
        let req = RetrieveRequest {
            url: params.url.clone(),
            flags,
            referrer: params.referrer.clone(),
            post: params.post.clone(),
            window: id,
            parent_charset: params.parent_charset.clone(),
            parent_quirks: params.parent_quirks,
        };

        match self.provider.retrieve(&req) {
            Ok(handle) => {
                log::debug!("window {id} fetching {} as {handle}", params.url);
                self.win_mut(id)?.loading_content = Some(handle);
                self.start_throbber(id);
                self.platform.set_icon(id, None);
                if !internal {
                    self.platform.set_url(id, &params.url);
                }
                Ok(())
            }
            Err(RetrieveError::NoHandler) => {
                log::debug!("no handler for {}; launching externally", params.url);
                self.platform.launch_url(&params.url);
                Ok(())
            }
            Err(err) => {
                log::warn!("fetch of {} could not start: {err}", params.url);
                self.set_status(id, &err.to_string());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{engine, url};
    use crate::fetch::null::{FetchCall, NullResponse};
    use crate::platform::PlatformCall;

    #[test]
    fn reserved_paths_classify() {
        assert_eq!(classify_internal(&url("about:query_auth")), Some(QueryKind::Auth));
        assert_eq!(classify_internal(&url("about:query_ssl")), Some(QueryKind::Ssl));
        assert_eq!(classify_internal(&url("about:query_timeout")), Some(QueryKind::Timeout));
        assert_eq!(
            classify_internal(&url("about:query_fetcherror")),
            Some(QueryKind::FetchError)
        );
        assert_eq!(classify_internal(&url("about:blank")), None);
        assert_eq!(classify_internal(&url("https://example.com/query_auth")), None);
    }

    #[test]
    fn plain_fetch_adopts_handle_and_starts_throbber() {
        let (mut eng, fetch, platform) = engine();
        let win = eng.create_window(None);
        eng.navigate(
            win,
            url("https://example.com/"),
            None,
            NavigationFlags::HISTORY,
            None,
            None,
        )
        .unwrap();

        let w = eng.window(win).unwrap();
        assert!(w.loading_content().is_some());
        assert!(w.current_content().is_none());
        assert!(fetch.count(|c| matches!(c, FetchCall::Retrieve(_))) == 1);
        assert!(platform.count(|c| matches!(c, PlatformCall::Throbber(_, true))) == 1);
        // The address display is refreshed up front for a real navigation.
        assert_eq!(platform.last_set_url(win).unwrap().as_str(), "https://example.com/");
    }

    #[test]
    fn verifiable_unless_flagged_otherwise() {
        let (mut eng, fetch, _platform) = engine();
        let win = eng.create_window(None);
        eng.navigate(win, url("https://a.example/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        eng.navigate(
            win,
            url("https://b.example/"),
            None,
            NavigationFlags::UNVERIFIABLE,
            None,
            None,
        )
        .unwrap();

        let reqs = fetch.retrieve_requests();
        assert!(reqs[0].flags.contains(FetchFlags::VERIFIABLE));
        assert!(!reqs[1].flags.contains(FetchFlags::VERIFIABLE));
    }

    #[test]
    fn unhandled_content_type_launches_externally() {
        let (mut eng, fetch, platform) = engine();
        let win = eng.create_window(None);
        fetch.script("mailto:someone@example.com", NullResponse::NoHandler);
        eng.navigate(
            win,
            url("mailto:someone@example.com"),
            None,
            NavigationFlags::empty(),
            None,
            None,
        )
        .unwrap();

        assert!(eng.window(win).unwrap().loading_content().is_none());
        assert_eq!(platform.count(|c| matches!(c, PlatformCall::LaunchUrl(_))), 1);
    }

    #[test]
    fn refused_fetch_leaves_window_idle_with_status() {
        let (mut eng, fetch, platform) = engine();
        let win = eng.create_window(None);
        fetch.script(
            "https://down.example/",
            NullResponse::Refuse("connection refused".to_string()),
        );
        eng.navigate(
            win,
            url("https://down.example/"),
            None,
            NavigationFlags::HISTORY,
            None,
            None,
        )
        .unwrap();

        let w = eng.window(win).unwrap();
        assert!(w.loading_content().is_none());
        assert!(w.current_content().is_none());
        assert!(platform
            .statuses(win)
            .last()
            .unwrap()
            .contains("connection refused"));
    }
}
