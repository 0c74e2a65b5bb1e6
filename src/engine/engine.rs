use crate::config::EngineConfig;
use crate::engine::history::History;
use crate::engine::window::{DragKind, Window, WindowId, WindowKind, WindowTree};
use crate::engine::NavigationFlags;
use crate::errors::NavError;
use crate::fetch::FetchProvider;
use crate::platform::{Platform, ScheduledTask};
use crate::viewport::Viewport;
use url::Url;

/// The navigation engine.
///
/// Owns every browsing viewport, the fetch provider, and the platform host.
/// All state is manipulated from one logical event loop: the embedder calls
/// the public entry points, the provider's completions come back through
/// [`content_event`](SkiffEngine::content_event) (or [`pump`](SkiffEngine::pump)),
/// and scheduled work re-enters through
/// [`run_scheduled`](SkiffEngine::run_scheduled).
pub struct SkiffEngine {
    pub(crate) config: EngineConfig,
    pub(crate) windows: WindowTree,
    pub(crate) provider: Box<dyn FetchProvider>,
    pub(crate) platform: Box<dyn Platform>,
}

impl SkiffEngine {
    /// Create a new engine. If `config` is `None`, [`EngineConfig::default`]
    /// is used.
    pub fn new(
        config: Option<EngineConfig>,
        provider: Box<dyn FetchProvider>,
        platform: Box<dyn Platform>,
    ) -> Self {
        Self {
            config: config.unwrap_or_default(),
            windows: WindowTree::new(),
            provider,
            platform,
        }
    }

    /// Create a new top-level window with its own session history.
    pub fn create_window(&mut self, name: Option<String>) -> WindowId {
        let id = WindowId::new();
        let mut window = Window::new(id, WindowKind::Top, name, None);
        window.history = Some(History::new(self.config.max_history));
        self.windows.insert(window);
        self.platform.window_created(id, WindowKind::Top);
        log::debug!("created top-level window {id}");
        id
    }

    /// Create a frame or iframe child of an existing window.
    pub(crate) fn create_child(
        &mut self,
        parent: WindowId,
        kind: WindowKind,
        name: Option<String>,
    ) -> Result<WindowId, NavError> {
        let id = WindowId::new();
        {
            let parent_win = self.win_mut(parent)?;
            match kind {
                WindowKind::Iframe => parent_win.iframes.push(id),
                _ => parent_win.frames.push(id),
            }
        }
        self.windows
            .insert(Window::new(id, kind, name, Some(parent)));
        self.platform.window_created(id, kind);
        Ok(id)
    }

    /// Destroy a window and its whole subtree, aborting any in-flight
    /// fetches and releasing every owned handle. Children go first.
    pub fn close_window(&mut self, id: WindowId) -> Result<(), NavError> {
        let parent = self.win(id)?.parent;
        if let Some(parent) = parent {
            if let Some(parent_win) = self.windows.get_mut(parent) {
                parent_win.frames.retain(|c| *c != id);
                parent_win.iframes.retain(|c| *c != id);
            }
        }
        self.destroy_recursive(id);
        Ok(())
    }

    pub(crate) fn destroy_recursive(&mut self, id: WindowId) {
        for child in self.windows.children_of(id) {
            self.destroy_recursive(child);
        }
        self.stop_window(id);
        if let Some(win) = self.windows.remove(id) {
            if let Some(handle) = win.current_content {
                self.provider.close(handle);
                self.provider.release(handle);
            }
            if let Some(handle) = win.favicon.current {
                self.provider.release(handle);
            }
            self.platform.window_destroyed(id);
            log::debug!("destroyed window {id}");
        }
    }

    /// Tear down every frame/iframe child of `id`, leaving `id` itself
    /// intact.
    pub(crate) fn destroy_children(&mut self, id: WindowId) {
        for child in self.windows.children_of(id) {
            self.destroy_recursive(child);
        }
        if let Some(win) = self.windows.get_mut(id) {
            win.frames.clear();
            win.iframes.clear();
            win.frame_rows = 0;
            win.frame_cols = 0;
        }
    }

    /// Stop all activity on a window and its subtree. Safe to call on an
    /// idle window.
    pub fn stop(&mut self, id: WindowId) -> Result<(), NavError> {
        if !self.windows.contains(id) {
            return Err(NavError::BadParameter);
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            stack.extend(self.windows.children_of(next));
            self.stop_window(next);
        }
        Ok(())
    }

    /// Stop activity on a single window: abort the in-flight fetch and
    /// favicon fetch, drop pending timers, detach caret and selection. The
    /// committed content is untouched.
    pub(crate) fn stop_window(&mut self, id: WindowId) {
        let Some(win) = self.windows.get_mut(id) else {
            return;
        };
        let loading = win.loading_content.take();
        let favicon = win.favicon.loading.take();
        let was_throbbing = win.throbbing;
        let had_caret = win.caret;
        win.throbbing = false;
        win.caret = false;
        win.refresh = None;
        win.drag = DragKind::None;

        if let Some(handle) = loading {
            self.provider.abort(handle);
            self.provider.release(handle);
        }
        if let Some(handle) = favicon {
            self.provider.abort(handle);
            self.provider.release(handle);
        }
        // Scheduled work must never fire for a stopped attempt; cancellation
        // is idempotent.
        self.platform.schedule(
            -1,
            id,
            ScheduledTask::Refresh {
                url: self.config.blank_url.clone(),
            },
        );
        self.platform.schedule(-1, id, ScheduledTask::Reformat);
        if had_caret {
            self.platform.remove_caret(id);
        }

        let root = self.windows.find_root(id);
        if let Some(root_win) = self.windows.get_mut(root) {
            if root_win.selection_owner == Some(id) {
                root_win.selection_owner = None;
            }
        }
        if was_throbbing {
            self.refresh_throbber(root);
        }
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(id)
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub(crate) fn win(&self, id: WindowId) -> Result<&Window, NavError> {
        self.windows.get(id).ok_or(NavError::BadParameter)
    }

    pub(crate) fn win_mut(&mut self, id: WindowId) -> Result<&mut Window, NavError> {
        self.windows.get_mut(id).ok_or(NavError::BadParameter)
    }

    /// Resolve a link target name relative to `id`.
    pub fn find_target(&self, id: WindowId, name: &str) -> Result<WindowId, NavError> {
        if !self.windows.contains(id) {
            return Err(NavError::BadParameter);
        }
        Ok(self.windows.find_target(id, name))
    }

    /// The currently displayed URL, or the one being loaded when nothing is
    /// displayed yet.
    pub fn current_url(&self, id: WindowId) -> Result<Url, NavError> {
        let win = self.win(id)?;
        if let Some(handle) = win.current_content {
            if let Some(info) = self.provider.describe(handle) {
                return Ok(info.url);
            }
        }
        if let Some(params) = &win.current_params {
            return Ok(params.url.clone());
        }
        if let Some(params) = &win.loading_params {
            return Ok(params.url.clone());
        }
        Ok(self.config.blank_url.clone())
    }

    pub fn scale(&self, id: WindowId) -> Result<f32, NavError> {
        Ok(self.win(id)?.scale)
    }

    /// Set the viewport scale. `absolute` applies `value` directly; otherwise
    /// `value` is a delta on the current scale, snapping to 1.0 when the
    /// result lands within the configured tolerance of unity. The result is
    /// clamped to the configured range and propagated to the whole subtree.
    pub fn set_scale(&mut self, id: WindowId, value: f32, absolute: bool) -> Result<f32, NavError> {
        if !value.is_finite() {
            return Err(NavError::BadParameter);
        }
        let current = self.win(id)?.scale;
        let mut scale = if absolute { value } else { current + value };
        if !absolute && (scale - 1.0).abs() < self.config.scale_snap {
            scale = 1.0;
        }
        scale = scale.clamp(self.config.scale_min, self.config.scale_max);

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            stack.extend(self.windows.children_of(next));
            let content = {
                let Some(win) = self.windows.get_mut(next) else {
                    continue;
                };
                win.scale = scale;
                win.current_content.map(|handle| (handle, win.viewport))
            };
            if let Some((handle, viewport)) = content {
                let (w, h) = unscaled(viewport, scale);
                self.provider.reformat(handle, w, h);
            }
        }
        self.platform.invalidate(id, None);
        Ok(scale)
    }

    /// Resize a window's viewport and reflow its content and frame grid.
    pub fn set_viewport(&mut self, id: WindowId, viewport: Viewport) -> Result<(), NavError> {
        let (content, scale) = {
            let win = self.win_mut(id)?;
            win.viewport = viewport;
            (win.current_content, win.scale)
        };
        if let Some(handle) = content {
            let (w, h) = unscaled(viewport, scale);
            self.provider.reformat(handle, w, h);
        }
        self.recalc_frame_geometry(id);
        self.platform.invalidate(id, None);
        Ok(())
    }

    pub fn set_scroll(&mut self, id: WindowId, x: i32, y: i32) -> Result<(), NavError> {
        let win = self.win_mut(id)?;
        win.scroll_x = x;
        win.scroll_y = y;
        Ok(())
    }

    /// Renavigate to the previous session-history entry of this tree.
    pub fn go_back(&mut self, id: WindowId) -> Result<(), NavError> {
        self.history_step(id, true)
    }

    /// Renavigate to the next session-history entry of this tree.
    pub fn go_forward(&mut self, id: WindowId) -> Result<(), NavError> {
        self.history_step(id, false)
    }

    fn history_step(&mut self, id: WindowId, back: bool) -> Result<(), NavError> {
        if !self.windows.contains(id) {
            return Err(NavError::BadParameter);
        }
        let root = self.windows.find_root(id);
        let fraction = self.scroll_fraction(root);
        let url = {
            let win = self.win_mut(root)?;
            let history = win.history.as_mut().ok_or(NavError::NotFound)?;
            history.update_current_scroll(fraction);
            if back {
                history.back()
            } else {
                history.forward()
            }
        }
        .ok_or(NavError::NotFound)?;
        // The cursor already points at the target entry; suppress the
        // departing-page touch-up so it is not overwritten.
        self.navigate(
            root,
            url,
            None,
            NavigationFlags::NO_TERMINAL_HISTORY_UPDATE,
            None,
            None,
        )
    }

    /// Coalesce expensive reflow work: re-arm a deferred reformat for this
    /// window, replacing any reformat already pending.
    pub fn schedule_reformat(&mut self, id: WindowId) -> Result<(), NavError> {
        if !self.windows.contains(id) {
            return Err(NavError::BadParameter);
        }
        self.platform.schedule(-1, id, ScheduledTask::Reformat);
        self.platform.schedule(0, id, ScheduledTask::Reformat);
        Ok(())
    }

    /// Run a task the platform scheduler armed earlier.
    pub fn run_scheduled(&mut self, id: WindowId, task: ScheduledTask) {
        if !self.windows.contains(id) {
            log::warn!("scheduled task fired for destroyed window {id}");
            return;
        }
        match task {
            ScheduledTask::Refresh { url } => {
                let same = self
                    .current_url(id)
                    .map(|current| current == url)
                    .unwrap_or(false);
                let mut flags = NavigationFlags::UNVERIFIABLE;
                if !same {
                    flags |= NavigationFlags::HISTORY;
                }
                if let Err(err) = self.navigate(id, url, None, flags, None, None) {
                    log::warn!("scheduled refresh of {id} failed: {err}");
                }
            }
            ScheduledTask::Reformat => {
                self.recalc_frame_geometry(id);
                self.platform.invalidate(id, None);
            }
        }
    }

    /// Drain the provider's pending completion events into the sink.
    /// Returns the number of events dispatched.
    pub fn pump(&mut self) -> usize {
        let mut count = 0;
        while let Some((win, handle, event)) = self.provider.poll_event() {
            self.content_event(win, handle, event);
            count += 1;
        }
        count
    }

    /// Route status text through the root window's cache so identical
    /// consecutive updates never reach the platform.
    pub(crate) fn set_status(&mut self, id: WindowId, text: &str) {
        let root = self.windows.find_root(id);
        let Some(win) = self.windows.get_mut(root) else {
            return;
        };
        if win.status.text.as_deref() == Some(text) {
            win.status.hits += 1;
            return;
        }
        win.status.misses += 1;
        win.status.text = Some(text.to_string());
        self.platform.set_status(root, text);
    }

    pub(crate) fn start_throbber(&mut self, id: WindowId) {
        if let Some(win) = self.windows.get_mut(id) {
            win.throbbing = true;
        }
        let root = self.windows.find_root(id);
        self.platform.throbber(root, true);
    }

    pub(crate) fn stop_throbber(&mut self, id: WindowId) {
        if let Some(win) = self.windows.get_mut(id) {
            win.throbbing = false;
        }
        let root = self.windows.find_root(id);
        self.refresh_throbber(root);
    }

    /// Silence the root throbber only once nothing in the tree is loading.
    pub(crate) fn refresh_throbber(&mut self, root: WindowId) {
        if !self.windows.any_throbbing(root) {
            self.platform.throbber(root, false);
        }
    }

    pub(crate) fn scroll_fraction(&self, id: WindowId) -> f32 {
        let Some(win) = self.windows.get(id) else {
            return 0.0;
        };
        let Some(handle) = win.current_content else {
            return 0.0;
        };
        let Some(info) = self.provider.describe(handle) else {
            return 0.0;
        };
        if info.height == 0 {
            0.0
        } else {
            (win.scroll_y as f32 / info.height as f32).clamp(0.0, 1.0)
        }
    }

    /// Recompute the frame grid and iframe placement from the window's
    /// viewport. Frame cells share the grid evenly; iframes keep their
    /// declared areas.
    pub(crate) fn recalc_frame_geometry(&mut self, id: WindowId) {
        let Some(win) = self.windows.get(id) else {
            return;
        };
        let rows = win.frame_rows.max(1);
        let cols = win.frame_cols.max(1);
        let viewport = win.viewport;
        let frames = win.frames.clone();
        let iframes = win.iframes.clone();

        let cell_w = viewport.width / cols;
        let cell_h = viewport.height / rows;
        for (index, child) in frames.iter().enumerate() {
            let row = index as u32 / cols;
            let col = index as u32 % cols;
            let area = Viewport::new(
                viewport.x + (col * cell_w) as i32,
                viewport.y + (row * cell_h) as i32,
                cell_w,
                cell_h,
            );
            let content = {
                let Some(child_win) = self.windows.get_mut(*child) else {
                    continue;
                };
                child_win.viewport = area;
                child_win.current_content.map(|h| (h, child_win.scale))
            };
            if let Some((handle, scale)) = content {
                let (w, h) = unscaled(area, scale);
                self.provider.reformat(handle, w, h);
            }
        }
        for child in iframes {
            let content = self
                .windows
                .get(child)
                .and_then(|w| w.current_content.map(|h| (h, w.viewport, w.scale)));
            if let Some((handle, area, scale)) = content {
                let (w, h) = unscaled(area, scale);
                self.provider.reformat(handle, w, h);
            }
        }
    }
}

fn unscaled(viewport: Viewport, scale: f32) -> (u32, u32) {
    let scale = if scale <= 0.0 { 1.0 } else { scale };
    (
        (viewport.width as f32 / scale) as u32,
        (viewport.height as f32 / scale) as u32,
    )
}
