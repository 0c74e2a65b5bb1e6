//! The content event sink: the single dispatch point the fetch provider
//! drives with asynchronous outcomes.
//!
//! Events are keyed by `(window, handle)`. A handle matching the window's
//! favicon slot is routed to the favicon machine; a handle matching neither
//! content slot is stale (the fetch was aborted or the slot already moved
//! on) and is dropped.

use crate::engine::engine::SkiffEngine;
use crate::engine::params::NavigationFlags;
use crate::engine::window::{DragKind, PendingRefresh, WindowId, WindowKind};
use crate::fetch::{CertChain, ContentHandle, ContentInfo, FetchError};
use crate::platform::{DragSaveKind, PointerShape, ScheduledTask};
use url::Url;

/// Everything the fetch provider can tell the engine about a piece of
/// content, one payload shape per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentEvent {
    /// Fetch progress; carries the provider's current status message.
    Loading { status: String },
    /// The content has enough data to be sized and formatted.
    Ready,
    /// The content is fully loaded.
    Done,
    /// The attempt failed. Terminal for this handle; the window may start a
    /// recovery attempt immediately.
    Error { error: FetchError },
    /// The provider followed a redirect.
    Redirect { from: Url, to: Url },
    /// The site presented a certificate chain.
    CertChain { chain: CertChain },
    /// The document announced a refresh, in provider ticks.
    Refresh { delay: u32, url: Url },
    /// The content's geometry changed.
    Reformat { background: bool },
    /// The document declared an icon link relation.
    IconLink { url: Url },

    // Object-level requests, forwarded to the platform.
    ScrollTo { x: i32, y: i32 },
    DragSave { kind: DragSaveKind },
    Pointer { shape: PointerShape },
    CaretSet { x: i32, y: i32, height: i32 },
    CaretRemove,
    Selection { owned: bool },
    SelectMenu,
    FileGadget,
    SearchHourglass { active: bool },
    SearchStatus { found: bool },
}

impl SkiffEngine {
    /// Deliver one completion event from the fetch provider.
    pub fn content_event(&mut self, id: WindowId, handle: ContentHandle, event: ContentEvent) {
        let Some(win) = self.windows.get(id) else {
            log::debug!("content event for unknown window {id}");
            return;
        };
        if win.favicon.loading == Some(handle) {
            self.favicon_event(id, handle, event);
            return;
        }
        let known =
            win.loading_content == Some(handle) || win.current_content == Some(handle);
        if !known {
            log::debug!("stale content event for window {id}, handle {handle}");
            return;
        }

        match event {
            ContentEvent::Loading { status } => {
                self.set_status(id, &status);
                // New data restarts the refresh countdown; a stale
                // announcement must not fire mid-load.
                if let Some(win) = self.windows.get_mut(id) {
                    win.refresh = None;
                }
                self.platform.schedule(
                    -1,
                    id,
                    ScheduledTask::Refresh {
                        url: self.config.blank_url.clone(),
                    },
                );
            }
            ContentEvent::Ready => self.content_ready(id, handle),
            ContentEvent::Done => self.content_done(id, handle),
            ContentEvent::Error { error } => self.content_error(id, handle, error),
            ContentEvent::Redirect { from, to } => {
                log::debug!("window {id} redirected {from} -> {to}");
                self.platform.record_redirect(&from, &to);
                self.platform.set_url(id, &to);
            }
            ContentEvent::CertChain { chain } => {
                if let Some(win) = self.windows.get_mut(id) {
                    win.loading_cert_chain = Some(chain);
                }
            }
            ContentEvent::Refresh { delay, url } => {
                if let Some(win) = self.windows.get_mut(id) {
                    win.refresh = Some(PendingRefresh { delay, url });
                }
            }
            ContentEvent::Reformat { background } => {
                self.recalc_frame_geometry(id);
                // The caret is hidden during reflow but stays logically
                // placed.
                let has_caret = self.windows.get(id).is_some_and(|w| w.caret);
                if has_caret {
                    self.platform.remove_caret(id);
                }
                if !background {
                    self.platform.invalidate(id, None);
                }
            }
            ContentEvent::IconLink { url } => {
                let is_top = self
                    .windows
                    .get(id)
                    .is_some_and(|w| w.kind == WindowKind::Top);
                if is_top {
                    self.favicon_link(id, url);
                }
            }

            ContentEvent::ScrollTo { x, y } => self.platform.scroll_to(id, x, y),
            ContentEvent::DragSave { kind } => {
                let root = self.windows.find_root(id);
                if let Some(root_win) = self.windows.get_mut(root) {
                    root_win.drag = DragKind::Selection;
                }
                self.platform.drag_save(root, kind);
            }
            ContentEvent::Pointer { shape } => {
                let root = self.windows.find_root(id);
                self.platform.set_pointer(root, shape);
            }
            ContentEvent::CaretSet { x, y, height } => {
                if let Some(win) = self.windows.get_mut(id) {
                    win.caret = true;
                }
                self.platform.place_caret(id, x, y, height);
            }
            ContentEvent::CaretRemove => {
                if let Some(win) = self.windows.get_mut(id) {
                    win.caret = false;
                }
                self.platform.remove_caret(id);
            }
            ContentEvent::Selection { owned } => {
                let root = self.windows.find_root(id);
                if let Some(root_win) = self.windows.get_mut(root) {
                    if owned {
                        root_win.selection_owner = Some(id);
                    } else if root_win.selection_owner == Some(id) {
                        root_win.selection_owner = None;
                    }
                }
            }
            ContentEvent::SelectMenu => {
                let root = self.windows.find_root(id);
                self.platform.open_select_menu(root);
            }
            ContentEvent::FileGadget => {
                let root = self.windows.find_root(id);
                self.platform.open_file_gadget(root);
            }
            ContentEvent::SearchHourglass { active } => {
                self.platform.search_hourglass(id, active);
            }
            ContentEvent::SearchStatus { found } => self.platform.search_status(id, found),
        }
    }

    /// The loading attempt can be displayed: commit it. The handle moves
    /// loading -> current in one step; the displaced content is closed and
    /// released. For an internal prompt the parameter and certificate
    /// snapshots stay where they are, so the user's original request can
    /// still be resumed from the loading slot.
    fn content_ready(&mut self, id: WindowId, handle: ContentHandle) {
        let (old_current, internal, viewport, scale) = {
            let Some(win) = self.windows.get_mut(id) else {
                return;
            };
            if win.loading_content != Some(handle) {
                log::debug!("ready for a handle window {id} is not loading");
                return;
            }
            win.loading_content = None;
            let old = win.current_content.replace(handle);
            let internal = win.internal_nav;
            if !internal {
                win.current_params = win.loading_params.take();
                win.current_cert_chain = win.loading_cert_chain.take();
            }
            (old, internal, win.viewport, win.scale)
        };
        if let Some(old) = old_current {
            self.provider.close(old);
            self.provider.release(old);
        }

        let scale_div = if scale <= 0.0 { 1.0 } else { scale };
        self.provider.reformat(
            handle,
            (viewport.width as f32 / scale_div) as u32,
            (viewport.height as f32 / scale_div) as u32,
        );
        let info = self.provider.describe(handle);
        log::debug!("window {id} committed {handle}");

        let record = !internal
            && self
                .windows
                .get(id)
                .and_then(|w| w.current_params.as_ref())
                .is_some_and(|p| p.flags.contains(NavigationFlags::HISTORY));
        if record {
            let fragment = self.windows.get(id).and_then(|w| w.fragment.clone());
            let entry_url = info
                .as_ref()
                .map(|i| i.url.clone())
                .or_else(|| {
                    self.windows
                        .get(id)
                        .and_then(|w| w.current_params.as_ref())
                        .map(|p| p.url.clone())
                });
            let root = self.windows.find_root(id);
            if let (Some(history), Some(entry_url)) = (
                self.windows.get_mut(root).and_then(|w| w.history.as_mut()),
                entry_url,
            ) {
                history.add(entry_url, fragment);
            }
        }

        // A caret from the previous page makes no sense in the new one.
        if let Some(win) = self.windows.get_mut(id) {
            win.caret = false;
            win.scroll_x = 0;
            win.scroll_y = 0;
        }
        self.platform.remove_caret(id);

        if let Some(info) = &info {
            if let Some(title) = &info.title {
                self.platform.set_title(id, title);
            }
            if !internal {
                self.platform.set_url(id, &info.url);
            }
        }
        self.platform.update_extent(id);
        self.platform.scroll_to(id, 0, 0);
        self.platform.invalidate(id, None);

        self.provider.open(handle, id);

        if let Some(info) = info {
            self.materialize_children(id, handle, &info);
        }
    }

    /// Build the declared frame grid and iframe list under a freshly
    /// committed document, navigating each child. The whole subtree exists
    /// before this returns; re-entrant calls never observe a half-built
    /// frameset.
    fn materialize_children(&mut self, id: WindowId, handle: ContentHandle, info: &ContentInfo) {
        if let Some(frameset) = &info.frameset {
            {
                let Some(win) = self.windows.get_mut(id) else {
                    return;
                };
                win.frame_rows = frameset.rows;
                win.frame_cols = frameset.cols;
                if win.kind == WindowKind::Frame {
                    win.kind = WindowKind::Frameset;
                }
            }
            for decl in &frameset.children {
                let child = match self.create_child(id, WindowKind::Frame, decl.name.clone()) {
                    Ok(child) => child,
                    Err(err) => {
                        log::warn!("frame creation under {id} failed: {err}");
                        continue;
                    }
                };
                if let Some(child_url) = decl.url.clone() {
                    if let Err(err) = self.navigate(
                        child,
                        child_url,
                        Some(info.url.clone()),
                        NavigationFlags::empty(),
                        None,
                        Some(handle),
                    ) {
                        log::warn!("frame navigation under {id} failed: {err}");
                    }
                }
            }
            self.recalc_frame_geometry(id);
        }

        for decl in &info.iframes {
            let child = match self.create_child(id, WindowKind::Iframe, decl.name.clone()) {
                Ok(child) => child,
                Err(err) => {
                    log::warn!("iframe creation under {id} failed: {err}");
                    continue;
                }
            };
            if let Some(win) = self.windows.get_mut(child) {
                win.viewport = decl.area;
            }
            if let Err(err) = self.navigate(
                child,
                decl.url.clone(),
                Some(info.url.clone()),
                NavigationFlags::UNVERIFIABLE,
                None,
                Some(handle),
            ) {
                log::warn!("iframe navigation under {id} failed: {err}");
            }
        }
    }

    fn content_done(&mut self, id: WindowId, handle: ContentHandle) {
        let (kind, viewport, scale, internal, refresh) = {
            let Some(win) = self.windows.get_mut(id) else {
                return;
            };
            (
                win.kind,
                win.viewport,
                win.scale,
                win.internal_nav,
                win.refresh.take(),
            )
        };
        let info = self.provider.describe(handle);
        log::debug!("window {id} finished loading {handle}");

        // Frames and iframes manage their own layout and scrollbars; a
        // top-level window's toolkit does that for it.
        if kind != WindowKind::Top {
            let scale_div = if scale <= 0.0 { 1.0 } else { scale };
            self.provider.reformat(
                handle,
                (viewport.width as f32 / scale_div) as u32,
                (viewport.height as f32 / scale_div) as u32,
            );
            self.platform.update_extent(id);
        }
        self.platform.invalidate(id, None);
        if let Some(info) = &info {
            self.set_status(id, &info.status);
        }
        self.stop_throbber(id);

        // Only top-level windows carry a window icon.
        if kind == WindowKind::Top {
            if let Some(info) = &info {
                self.favicon_after_load(id, info);
            }
        }

        if !internal {
            if let Some(info) = &info {
                // Coming back through history restores where the user was.
                let root = self.windows.find_root(id);
                let fraction = self
                    .windows
                    .get(root)
                    .and_then(|w| w.history.as_ref())
                    .and_then(|h| h.current())
                    .filter(|entry| entry.url == info.url)
                    .and_then(|entry| entry.scroll_fraction);
                if let Some(fraction) = fraction {
                    let y = (fraction * info.height as f32) as i32;
                    if let Some(win) = self.windows.get_mut(id) {
                        win.scroll_y = y;
                    }
                    self.platform.scroll_to(id, 0, y);
                }

                if let Some(title) = info.title.as_deref() {
                    if let Some(history) =
                        self.windows.get_mut(root).and_then(|w| w.history.as_mut())
                    {
                        history.update_current_title(title);
                    }
                }
                self.platform.record_visit(&info.url, info.title.as_deref());
                self.platform.hotlist_visited(&info.url);
            }
        }

        if let Some(refresh) = refresh {
            // Provider ticks are a tenth of the scheduler's unit.
            let delay = refresh.delay.saturating_mul(10).min(i32::MAX as u32) as i32;
            log::debug!("window {id} scheduling refresh to {} in {delay}cs", refresh.url);
            self.platform
                .schedule(delay, id, ScheduledTask::Refresh { url: refresh.url });
        }
    }

    /// A failed attempt releases its handle and hands the window to the
    /// matching recovery flow; the failure itself is never surfaced to the
    /// caller that started the navigation.
    fn content_error(&mut self, id: WindowId, handle: ContentHandle, error: FetchError) {
        {
            let Some(win) = self.windows.get_mut(id) else {
                return;
            };
            if win.loading_content == Some(handle) {
                win.loading_content = None;
            } else if win.current_content == Some(handle) {
                win.current_content = None;
            } else {
                return;
            }
        }
        self.provider.release(handle);
        self.stop_throbber(id);
        log::debug!("window {id} fetch failed: {error:?}");

        let outcome = match error {
            FetchError::BadAuth { realm } => self.query_auth_begin(id, &realm),
            FetchError::BadCerts => self.query_ssl_begin(id),
            FetchError::Timeout => self.query_timeout_begin(id),
            FetchError::Failed { message } => self.query_fetcherror_begin(id, &message),
        };
        if let Err(err) = outcome {
            log::error!("recovery prompt for window {id} failed: {err}");
            self.set_status(id, &err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{engine, url};
    use crate::fetch::null::FetchCall;
    use crate::fetch::{ContentKind, FrameDecl, FramesetDecl, IframeDecl};
    use crate::platform::PlatformCall;
    use crate::viewport::Viewport;

    #[test]
    fn successful_navigation_commits_and_records_history() {
        let (mut eng, _fetch, platform) = engine();
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
        eng.pump();

        let w = eng.window(win).unwrap();
        assert!(w.current_content().is_some());
        assert!(w.loading_content().is_none(), "loading slot empties on commit");
        assert_eq!(w.history().unwrap().len(), 1);
        assert_eq!(
            w.history().unwrap().current().unwrap().url.as_str(),
            "https://example.com/"
        );
        assert_eq!(
            platform.last_set_url(win).unwrap().as_str(),
            "https://example.com/"
        );
        // The throbber ran and was silenced again.
        assert!(platform.count(|c| matches!(c, PlatformCall::Throbber(_, true))) >= 1);
        assert!(platform.count(|c| matches!(c, PlatformCall::Throbber(_, false))) >= 1);
    }

    #[test]
    fn commit_releases_the_displaced_content_exactly_once() {
        let (mut eng, fetch, _platform) = engine();
        let win = eng.create_window(None);
        eng.navigate(win, url("https://a.example/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        eng.pump();
        let first = eng.window(win).unwrap().current_content().unwrap();

        eng.navigate(win, url("https://b.example/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        eng.pump();

        assert_eq!(fetch.count(|c| matches!(c, FetchCall::Close(h) if *h == first)), 1);
        assert_eq!(fetch.release_count(first), 1);
        let second = eng.window(win).unwrap().current_content().unwrap();
        assert_ne!(first, second);
        assert_eq!(fetch.release_count(second), 0);
    }

    #[test]
    fn destroying_a_loading_window_aborts_and_releases_once() {
        let (mut eng, fetch, platform) = engine();
        let win = eng.create_window(None);
        eng.navigate(win, url("https://slow.example/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        let handle = eng.window(win).unwrap().loading_content().unwrap();

        eng.close_window(win).unwrap();

        assert_eq!(fetch.count(|c| matches!(c, FetchCall::Abort(h) if *h == handle)), 1);
        assert_eq!(fetch.release_count(handle), 1);
        assert_eq!(platform.count(|c| matches!(c, PlatformCall::WindowDestroyed(_))), 1);
        // Nothing from the aborted fetch is delivered afterwards.
        assert_eq!(eng.pump(), 0);
    }

    #[test]
    fn redirect_updates_address_and_url_database() {
        let (mut eng, _fetch, platform) = engine();
        let win = eng.create_window(None);
        eng.navigate(win, url("https://a.example/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        let handle = eng.window(win).unwrap().loading_content().unwrap();
        eng.content_event(
            win,
            handle,
            ContentEvent::Redirect {
                from: url("https://a.example/"),
                to: url("https://b.example/"),
            },
        );

        assert_eq!(
            platform.count(|c| matches!(c, PlatformCall::RecordRedirect(_, _))),
            1
        );
        assert_eq!(platform.last_set_url(win).unwrap().as_str(), "https://b.example/");
        // Redirects do not change the window's slots.
        assert_eq!(eng.window(win).unwrap().loading_content(), Some(handle));
    }

    #[test]
    fn cert_chain_event_replaces_the_loading_snapshot() {
        let (mut eng, _fetch, _platform) = engine();
        let win = eng.create_window(None);
        eng.navigate(win, url("https://a.example/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        let handle = eng.window(win).unwrap().loading_content().unwrap();

        let chain = CertChain {
            certs: vec![crate::fetch::CertInfo {
                subject: "CN=a.example".to_string(),
                issuer: "CN=Root".to_string(),
                error: None,
            }],
        };
        eng.content_event(win, handle, ContentEvent::CertChain { chain: chain.clone() });
        eng.pump();

        // Committed along with the content on the ready transition.
        assert_eq!(eng.window(win).unwrap().current_cert_chain(), Some(&chain));
    }

    #[test]
    fn stale_events_are_dropped() {
        let (mut eng, _fetch, platform) = engine();
        let win = eng.create_window(None);
        let ghost = ContentHandle::new();
        let before = platform.calls().len();
        eng.content_event(win, ghost, ContentEvent::Done);
        eng.content_event(win, ghost, ContentEvent::ScrollTo { x: 1, y: 2 });
        assert_eq!(platform.calls().len(), before);
    }

    #[test]
    fn refresh_announcement_schedules_after_done() {
        let (mut eng, fetch, platform) = engine();
        let win = eng.create_window(None);
        fetch.script_page("https://meta.example/", |info| {
            info.title = Some("Refreshing".to_string());
        });
        // The announcement arrives mid-load, before done.
        fetch.script_refresh("https://meta.example/", 3, "https://meta.example/next");
        eng.navigate(win, url("https://meta.example/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        eng.pump();

        let scheduled: Vec<_> = platform
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::Schedule(delay, w, ScheduledTask::Refresh { url }) if delay >= 0 => {
                    Some((delay, w, url))
                }
                _ => None,
            })
            .collect();
        assert_eq!(scheduled.len(), 1);
        let (delay, scheduled_win, target) = &scheduled[0];
        assert_eq!(*delay, 30, "provider ticks are scaled by ten");
        assert_eq!(*scheduled_win, win);
        assert_eq!(target.as_str(), "https://meta.example/next");

        // Firing the task renavigates the window.
        eng.run_scheduled(win, ScheduledTask::Refresh { url: target.clone() });
        eng.pump();
        assert_eq!(eng.current_url(win).unwrap().as_str(), "https://meta.example/next");
    }

    #[test]
    fn frameset_content_materializes_children() {
        let (mut eng, fetch, _platform) = engine();
        let win = eng.create_window(None);
        fetch.script_page("https://frames.example/", |info| {
            info.frameset = Some(FramesetDecl {
                rows: 1,
                cols: 2,
                children: vec![
                    FrameDecl {
                        name: Some("nav".to_string()),
                        url: Some(Url::parse("https://frames.example/nav").unwrap()),
                    },
                    FrameDecl {
                        name: Some("body".to_string()),
                        url: Some(Url::parse("https://frames.example/body").unwrap()),
                    },
                ],
            });
            info.iframes = vec![IframeDecl {
                name: None,
                url: Url::parse("https://ads.example/banner").unwrap(),
                area: Viewport::new(10, 10, 200, 50),
            }];
        });

        eng.navigate(win, url("https://frames.example/"), None, NavigationFlags::HISTORY, None, None)
            .unwrap();
        eng.pump();

        let w = eng.window(win).unwrap();
        assert_eq!(w.frames().len(), 2);
        assert_eq!(w.iframes().len(), 1);
        assert_eq!(eng.window_count(), 4);

        // Children committed their own content.
        let nav = eng.find_target(win, "nav").unwrap();
        assert_ne!(nav, win);
        assert!(eng.window(nav).unwrap().current_content().is_some());
        assert_eq!(
            eng.current_url(nav).unwrap().as_str(),
            "https://frames.example/nav"
        );

        // Iframe fetches are not verifiable top-level navigations.
        let iframe_req = fetch
            .retrieve_requests()
            .into_iter()
            .find(|r| r.url.as_str() == "https://ads.example/banner")
            .unwrap();
        assert!(!iframe_req.flags.contains(crate::engine::FetchFlags::VERIFIABLE));

        // Only the root history records; one entry for the frameset page.
        assert_eq!(w.history().unwrap().len(), 1);
    }

    #[test]
    fn object_level_events_are_forwarded_with_scoping() {
        let (mut eng, _fetch, platform) = engine();
        let win = eng.create_window(None);
        eng.navigate(win, url("https://example.com/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        eng.pump();
        let handle = eng.window(win).unwrap().current_content().unwrap();

        eng.content_event(win, handle, ContentEvent::ScrollTo { x: 3, y: 40 });
        eng.content_event(win, handle, ContentEvent::Pointer { shape: PointerShape::Point });
        eng.content_event(win, handle, ContentEvent::DragSave { kind: DragSaveKind::Selection });
        assert!(eng.window(win).unwrap().drag_active());
        eng.content_event(win, handle, ContentEvent::CaretSet { x: 1, y: 2, height: 12 });
        assert!(eng.window(win).unwrap().caret);
        eng.content_event(win, handle, ContentEvent::CaretRemove);
        assert!(!eng.window(win).unwrap().caret);

        assert_eq!(platform.count(|c| matches!(c, PlatformCall::ScrollTo(_, 3, 40))), 1);
        assert_eq!(platform.count(|c| matches!(c, PlatformCall::SetPointer(_, _))), 1);
        assert_eq!(platform.count(|c| matches!(c, PlatformCall::DragSave(_, _))), 1);
        assert_eq!(platform.count(|c| matches!(c, PlatformCall::PlaceCaret(_))), 1);
    }

    #[test]
    fn back_restores_the_saved_scroll_fraction() {
        let (mut eng, fetch, platform) = engine();
        let win = eng.create_window(None);
        fetch.script_page("https://long.example/", |info| {
            info.height = 4000;
        });
        eng.navigate(win, url("https://long.example/"), None, NavigationFlags::HISTORY, None, None)
            .unwrap();
        eng.pump();
        // The user scrolls halfway down, then leaves.
        eng.set_scroll(win, 0, 2000).unwrap();
        eng.navigate(win, url("https://other.example/"), None, NavigationFlags::HISTORY, None, None)
            .unwrap();
        eng.pump();

        eng.go_back(win).unwrap();
        eng.pump();

        assert_eq!(eng.current_url(win).unwrap().as_str(), "https://long.example/");
        assert!(platform.count(|c| matches!(c, PlatformCall::ScrollTo(_, 0, 2000))) >= 1);
    }

    #[test]
    fn html_parent_donates_charset_and_quirks() {
        let (mut eng, fetch, _platform) = engine();
        let win = eng.create_window(None);
        fetch.script_page("https://doc.example/", |info| {
            info.charset = Some("iso-8859-1".to_string());
            info.quirks = true;
            info.kind = ContentKind::Html;
        });
        eng.navigate(win, url("https://doc.example/"), None, NavigationFlags::empty(), None, None)
            .unwrap();
        eng.pump();
        let parent = eng.window(win).unwrap().current_content().unwrap();

        let child = eng
            .create_child(win, WindowKind::Iframe, None)
            .unwrap();
        eng.navigate(
            child,
            url("https://doc.example/frame"),
            None,
            NavigationFlags::UNVERIFIABLE,
            None,
            Some(parent),
        )
        .unwrap();

        let req = fetch
            .retrieve_requests()
            .into_iter()
            .find(|r| r.url.as_str() == "https://doc.example/frame")
            .unwrap();
        assert_eq!(req.parent_charset.as_deref(), Some("iso-8859-1"));
        assert!(req.parent_quirks);
    }
}
