//! The navigation controller: validates a navigation request, handles the
//! cases that never reach the network (downloads, same-document fragment
//! moves), and otherwise tears the window down to a clean slate before
//! handing the prepared parameters to the router.

use crate::engine::engine::SkiffEngine;
use crate::engine::params::{FetchFlags, FetchParams, NavigationFlags, PostBody};
use crate::engine::query::classify_internal;
use crate::engine::window::WindowId;
use crate::errors::NavError;
use crate::fetch::{ContentHandle, ContentKind, RetrieveRequest};
use url::Url;

impl SkiffEngine {
    /// Start a navigation on a window.
    ///
    /// `parent` is the content embedding this window (for frame and iframe
    /// loads); an HTML parent donates its charset and quirks mode to the
    /// child fetch.
    ///
    /// Synchronous failures ([`NavError::BadParameter`],
    /// [`NavError::FrameDepth`], [`NavError::NeedData`]) leave the window's
    /// committed content untouched. Fetch-level failures arrive later
    /// through the event sink and are absorbed into a prompt page.
    pub fn navigate(
        &mut self,
        id: WindowId,
        url: Url,
        referrer: Option<Url>,
        flags: NavigationFlags,
        post: Option<PostBody>,
        parent: Option<ContentHandle>,
    ) -> Result<(), NavError> {
        let (parent_charset, parent_quirks) = parent
            .and_then(|handle| self.provider.describe(handle))
            .filter(|info| info.kind == ContentKind::Html)
            .map(|info| (info.charset, info.quirks))
            .unwrap_or((None, false));

        let params = FetchParams {
            url,
            referrer,
            post,
            flags,
            parent_charset,
            parent_quirks,
        };
        self.navigate_inner(id, params, true)
    }

    /// The controller proper. `publish` is false for the engine's own
    /// re-entrant calls that pass a stack-local parameter set (prompt
    /// display); those must not disturb the published loading parameters,
    /// which still describe the user's original request.
    pub(crate) fn navigate_inner(
        &mut self,
        id: WindowId,
        mut params: FetchParams,
        publish: bool,
    ) -> Result<(), NavError> {
        if !self.windows.contains(id) {
            return Err(NavError::BadParameter);
        }

        // A reserved internal URL may only be navigated to with its prompt
        // context attached. An incoming multipart POST (the prompt page
        // answering) upgrades itself.
        let internal_query = classify_internal(&params.url).is_some();
        if internal_query && !params.flags.contains(NavigationFlags::INTERNAL) {
            match &params.post {
                Some(PostBody::Multipart(_)) => {
                    params
                        .flags
                        .insert(NavigationFlags::INTERNAL | NavigationFlags::HISTORY);
                }
                _ => return Err(NavError::NeedData),
            }
        }
        let internal = params.flags.contains(NavigationFlags::INTERNAL);
        log::debug!(
            "window {id} navigating to {} (internal={internal}, publish={publish})",
            params.url
        );

        // History must capture the departing page, not the arriving one.
        if !internal && !params.flags.contains(NavigationFlags::NO_TERMINAL_HISTORY_UPDATE) {
            let has_current = self.win(id)?.current_content.is_some();
            if has_current {
                let fraction = self.scroll_fraction(id);
                let root = self.windows.find_root(id);
                if let Some(history) = self.windows.get_mut(root).and_then(|w| w.history.as_mut())
                {
                    if !history.is_empty() {
                        history.update_current_scroll(fraction);
                    }
                }
            }
        }

        if self.windows.depth(id) > self.config.max_frame_depth {
            log::warn!("window {id} rejected navigation: frame nesting too deep");
            return Err(NavError::FrameDepth);
        }

        // Downloads bypass the whole state machine; the provider's download
        // side owns the transfer.
        if params.flags.contains(NavigationFlags::DOWNLOAD) {
            let req = RetrieveRequest {
                url: params.url.clone(),
                flags: FetchFlags::FORCE_FETCH | FetchFlags::STREAM,
                referrer: params.referrer.clone(),
                post: params.post.clone(),
                window: id,
                parent_charset: None,
                parent_quirks: false,
            };
            if let Err(err) = self.provider.download(&req) {
                log::warn!("download of {} could not start: {err}", params.url);
                self.set_status(id, &err.to_string());
            }
            return Ok(());
        }

        if self.try_fragment_shortcut(id, &params)? {
            return Ok(());
        }

        // Full navigation: stop everything on this window, discard its frame
        // tree, publish the fresh attempt, and hand over to the router.
        self.stop_window(id);
        self.destroy_children(id);
        {
            let win = self.win_mut(id)?;
            win.internal_nav = internal_query;
            win.fragment = params.url.fragment().map(str::to_owned);
            if publish && !internal {
                win.loading_params = Some(params.clone());
            }
        }
        self.route(id, &params)
    }

    /// A navigation that differs from the committed page only by fragment
    /// scrolls in place instead of fetching. The comparison uses the
    /// committed content's URL; the fragment comes from the URL being
    /// navigated to — while an internal prompt is in flight those are
    /// intentionally different sources.
    fn try_fragment_shortcut(&mut self, id: WindowId, params: &FetchParams) -> Result<bool, NavError> {
        if params.post.is_some() || params.url.query().is_some() {
            return Ok(false);
        }
        let Some(fragment) = params.url.fragment().map(str::to_owned) else {
            return Ok(false);
        };
        let current_url = {
            let win = self.win(id)?;
            let Some(handle) = win.current_content else {
                return Ok(false);
            };
            match self.provider.describe(handle) {
                Some(info) => info.url,
                None => return Ok(false),
            }
        };
        if !same_apart_from_fragment(&params.url, &current_url) {
            return Ok(false);
        }

        log::debug!("window {id} fragment move to #{fragment}");
        self.win_mut(id)?.fragment = Some(fragment.clone());
        if params.flags.contains(NavigationFlags::HISTORY) {
            let root = self.windows.find_root(id);
            if let Some(history) = self.windows.get_mut(root).and_then(|w| w.history.as_mut()) {
                history.add(params.url.clone(), Some(fragment.clone()));
            }
        }
        self.platform.set_url(id, &params.url);
        self.platform.scroll_to_fragment(id, &fragment);
        self.platform.invalidate(id, None);
        Ok(true)
    }
}

fn same_apart_from_fragment(a: &Url, b: &Url) -> bool {
    let mut a = a.clone();
    let mut b = b.clone();
    a.set_fragment(None);
    b.set_fragment(None);
    a == b
}
