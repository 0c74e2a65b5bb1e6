//! Favicon fetching: a small retry machine layered on the content event
//! sink. At most one icon fetch is in flight per window; a failed icon falls
//! back to the fixed internal default once and then gives up.

use crate::engine::engine::SkiffEngine;
use crate::engine::params::FetchFlags;
use crate::engine::query::internal_url;
use crate::engine::sink::ContentEvent;
use crate::engine::window::WindowId;
use crate::fetch::{ContentHandle, ContentInfo, RetrieveRequest};
use url::Url;

pub(crate) fn default_favicon_url() -> Url {
    internal_url("favicon")
}

impl SkiffEngine {
    /// Pick an icon for freshly loaded content: a declared icon link, then a
    /// declared shortcut icon, then the conventional `/favicon.ico` at the
    /// document origin, then the internal default.
    pub(crate) fn favicon_after_load(&mut self, id: WindowId, info: &ContentInfo) {
        let busy = self
            .windows
            .get(id)
            .is_some_and(|w| w.favicon.loading.is_some());
        if busy {
            return;
        }
        let url = info
            .icon_link
            .clone()
            .or_else(|| info.shortcut_icon_link.clone())
            .or_else(|| {
                matches!(info.url.scheme(), "http" | "https")
                    .then(|| info.url.join("/favicon.ico").ok())
                    .flatten()
            })
            .unwrap_or_else(default_favicon_url);
        self.favicon_retrieve(id, url);
    }

    /// Content declared an icon link after the fact.
    pub(crate) fn favicon_link(&mut self, id: WindowId, url: Url) {
        let busy = self
            .windows
            .get(id)
            .is_some_and(|w| w.favicon.loading.is_some());
        if busy {
            return;
        }
        self.favicon_retrieve(id, url);
    }

    fn favicon_retrieve(&mut self, id: WindowId, url: Url) {
        if url == default_favicon_url() {
            if let Some(win) = self.windows.get_mut(id) {
                win.favicon.tried_default = true;
            }
        }
        let req = RetrieveRequest {
            url: url.clone(),
            flags: FetchFlags::SNIFF_TYPE,
            referrer: None,
            post: None,
            window: id,
            parent_charset: None,
            parent_quirks: false,
        };
        match self.provider.retrieve(&req) {
            Ok(handle) => {
                log::trace!("window {id} fetching icon {url}");
                if let Some(win) = self.windows.get_mut(id) {
                    win.favicon.loading = Some(handle);
                } else {
                    // The window vanished between the call sites; do not
                    // leak the handle.
                    self.provider.abort(handle);
                    self.provider.release(handle);
                }
            }
            Err(err) => {
                log::debug!("icon fetch {url} refused: {err}");
                self.favicon_failed(id);
            }
        }
    }

    fn favicon_failed(&mut self, id: WindowId) {
        let retry = self
            .windows
            .get(id)
            .is_some_and(|w| !w.favicon.tried_default);
        if retry {
            self.favicon_retrieve(id, default_favicon_url());
        }
    }

    /// Sink branch for events whose handle matches the in-flight icon fetch.
    pub(crate) fn favicon_event(&mut self, id: WindowId, handle: ContentHandle, event: ContentEvent) {
        match event {
            ContentEvent::Done => {
                let old = {
                    let Some(win) = self.windows.get_mut(id) else {
                        return;
                    };
                    win.favicon.loading = None;
                    win.favicon.current.replace(handle)
                };
                if let Some(old) = old {
                    self.provider.release(old);
                }
                self.platform.set_icon(id, Some(handle));
            }
            ContentEvent::Error { .. } => {
                if let Some(win) = self.windows.get_mut(id) {
                    win.favicon.loading = None;
                }
                self.provider.release(handle);
                self.favicon_failed(id);
            }
            // Progress and sizing events mean nothing for an icon.
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::params::NavigationFlags;
    use crate::engine::testutil::{engine, url};
    use crate::fetch::null::{FetchCall, NullResponse};
    use crate::fetch::FetchError;

    #[test]
    fn done_triggers_a_favicon_fetch_and_icon_update() {
        let (mut eng, fetch, platform) = engine();
        let win = eng.create_window(None);
        eng.navigate(win, url("https://example.com/page"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        eng.pump();

        assert_eq!(
            fetch.count(|c| matches!(c, FetchCall::Retrieve(u) if u.as_str() == "https://example.com/favicon.ico")),
            1
        );
        let icon = eng.window(win).unwrap().favicon();
        assert!(icon.is_some());
        assert_eq!(platform.last_icon(win).unwrap(), icon);
    }

    #[test]
    fn declared_icon_link_wins_over_convention() {
        let (mut eng, fetch, _platform) = engine();
        let win = eng.create_window(None);
        fetch.script_page("https://example.com/", |info| {
            info.icon_link = Some(url("https://cdn.example/icon.png"));
        });
        eng.navigate(win, url("https://example.com/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        eng.pump();

        assert_eq!(
            fetch.count(|c| matches!(c, FetchCall::Retrieve(u) if u.as_str() == "https://cdn.example/icon.png")),
            1
        );
        assert_eq!(
            fetch.count(|c| matches!(c, FetchCall::Retrieve(u) if u.as_str() == "https://example.com/favicon.ico")),
            0
        );
    }

    #[test]
    fn failed_icon_falls_back_to_the_default_once() {
        let (mut eng, fetch, _platform) = engine();
        let win = eng.create_window(None);
        fetch.script(
            "https://example.com/favicon.ico",
            NullResponse::Error {
                error: FetchError::Failed {
                    message: "404".to_string(),
                },
                chain: None,
            },
        );
        eng.navigate(win, url("https://example.com/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        eng.pump();

        assert_eq!(
            fetch.count(|c| matches!(c, FetchCall::Retrieve(u) if u.scheme() == "about" && u.path() == "favicon")),
            1
        );
        assert!(eng.window(win).unwrap().favicon().is_some());
    }

    #[test]
    fn failing_default_does_not_loop() {
        let (mut eng, fetch, _platform) = engine();
        let win = eng.create_window(None);
        let failure = NullResponse::Error {
            error: FetchError::Failed {
                message: "no icon".to_string(),
            },
            chain: None,
        };
        fetch.script("https://example.com/favicon.ico", failure.clone());
        fetch.script("about:favicon", failure);
        eng.navigate(win, url("https://example.com/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        eng.pump();

        // One conventional attempt, one default attempt, then nothing.
        assert_eq!(
            fetch.count(|c| matches!(c, FetchCall::Retrieve(u) if u.path() == "favicon" || u.path() == "/favicon.ico")),
            2
        );
        assert!(eng.window(win).unwrap().favicon().is_none());
        // Every failed icon handle was released.
        assert_eq!(fetch.count(|c| matches!(c, FetchCall::Release(_))), 2);
    }

    #[test]
    fn replacement_icon_releases_the_previous_one() {
        let (mut eng, fetch, _platform) = engine();
        let win = eng.create_window(None);
        eng.navigate(win, url("https://a.example/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        eng.pump();
        let first = eng.window(win).unwrap().favicon().unwrap();

        eng.navigate(win, url("https://b.example/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        eng.pump();
        let second = eng.window(win).unwrap().favicon().unwrap();

        assert_ne!(first, second);
        assert_eq!(fetch.release_count(first), 1);
        assert_eq!(fetch.release_count(second), 0);
    }
}
