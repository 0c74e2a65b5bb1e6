use crate::engine::history::History;
use crate::engine::params::FetchParams;
use crate::fetch::{CertChain, ContentHandle};
use crate::viewport::Viewport;
use std::collections::HashMap;
use url::Url;
use uuid::Uuid;

/// A unique identifier for one browsing viewport (top-level window, frame, or
/// iframe) in the navigation tree.
///
/// Internally a `WindowId` wraps a [`Uuid`]; treat it as an opaque handle.
/// It implements `Copy`, `Eq`, `Hash` and the ordering traits so it can be
/// freely duplicated, compared, and used as a map key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(Uuid);

impl WindowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a window is embedded in the tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WindowKind {
    /// A top-level platform window. Owns the session history and the
    /// tree-wide state (throbber, selection owner, status line).
    Top,
    /// One cell of a frameset grid.
    Frame,
    /// An independently scrollable embedded viewport.
    Iframe,
    /// A non-top container that only hosts a nested frame grid.
    Frameset,
}

/// Favicon sub-state for one window.
#[derive(Debug, Default)]
pub(crate) struct FaviconState {
    pub loading: Option<ContentHandle>,
    pub current: Option<ContentHandle>,
    /// Set once the fixed fallback icon has been attempted, so a failing
    /// fallback cannot retry itself forever.
    pub tried_default: bool,
}

/// Cached status-bar text, root window only. Consecutive identical updates
/// are counted but not resent to the platform.
#[derive(Debug, Default)]
pub(crate) struct StatusCache {
    pub text: Option<String>,
    pub hits: u64,
    pub misses: u64,
}

/// A meta-refresh announced by the content, in provider ticks.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PendingRefresh {
    pub delay: u32,
    pub url: Url,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum DragKind {
    #[default]
    None,
    Selection,
}

/// One browsing viewport in the navigation tree.
///
/// Windows are stored in an id-keyed arena ([`WindowTree`]); the parent link
/// is a plain back-reference and ownership of children lives in the
/// `frames`/`iframes` id lists, so destruction always walks children first
/// and never frees through an alias.
pub struct Window {
    pub(crate) id: WindowId,
    pub(crate) name: Option<String>,
    pub(crate) kind: WindowKind,
    pub(crate) parent: Option<WindowId>,

    /// Frameset grid children, row-major.
    pub(crate) frames: Vec<WindowId>,
    pub(crate) frame_rows: u32,
    pub(crate) frame_cols: u32,
    pub(crate) iframes: Vec<WindowId>,

    /// The fetch in flight, if any. Exclusively owned until released or
    /// moved into `current_content` on the ready transition.
    pub(crate) loading_content: Option<ContentHandle>,
    /// The committed, displayed content.
    pub(crate) current_content: Option<ContentHandle>,

    pub(crate) loading_params: Option<FetchParams>,
    pub(crate) current_params: Option<FetchParams>,

    pub(crate) loading_cert_chain: Option<CertChain>,
    pub(crate) current_cert_chain: Option<CertChain>,

    /// Fragment identifier of the last navigated URL.
    pub(crate) fragment: Option<String>,

    /// True while the loading/committed content is an internal prompt page
    /// rather than a page the user asked to visit. Governs which parameter
    /// slot a reload resurrects and whether the ready transition moves the
    /// parameter snapshots across.
    pub(crate) internal_nav: bool,

    pub(crate) favicon: FaviconState,
    pub(crate) refresh: Option<PendingRefresh>,

    /// Session history; populated on `Top` windows only.
    pub(crate) history: Option<History>,

    pub(crate) viewport: Viewport,
    pub(crate) scroll_x: i32,
    pub(crate) scroll_y: i32,
    pub(crate) scale: f32,
    pub(crate) throbbing: bool,
    pub(crate) caret: bool,
    /// Which descendant owns the selection; root window only.
    pub(crate) selection_owner: Option<WindowId>,
    pub(crate) drag: DragKind,
    pub(crate) status: StatusCache,
}

impl Window {
    pub(crate) fn new(
        id: WindowId,
        kind: WindowKind,
        name: Option<String>,
        parent: Option<WindowId>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            parent,
            frames: Vec::new(),
            frame_rows: 0,
            frame_cols: 0,
            iframes: Vec::new(),
            loading_content: None,
            current_content: None,
            loading_params: None,
            current_params: None,
            loading_cert_chain: None,
            current_cert_chain: None,
            fragment: None,
            internal_nav: false,
            favicon: FaviconState::default(),
            refresh: None,
            history: None,
            viewport: Viewport::default(),
            scroll_x: 0,
            scroll_y: 0,
            scale: 1.0,
            throbbing: false,
            caret: false,
            selection_owner: None,
            drag: DragKind::default(),
            status: StatusCache::default(),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> Option<WindowId> {
        self.parent
    }

    pub fn frames(&self) -> &[WindowId] {
        &self.frames
    }

    pub fn iframes(&self) -> &[WindowId] {
        &self.iframes
    }

    pub fn loading_content(&self) -> Option<ContentHandle> {
        self.loading_content
    }

    pub fn current_content(&self) -> Option<ContentHandle> {
        self.current_content
    }

    pub fn current_params(&self) -> Option<&FetchParams> {
        self.current_params.as_ref()
    }

    pub fn loading_params(&self) -> Option<&FetchParams> {
        self.loading_params.as_ref()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn internal_nav(&self) -> bool {
        self.internal_nav
    }

    pub fn is_loading(&self) -> bool {
        self.loading_content.is_some()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    pub fn current_cert_chain(&self) -> Option<&CertChain> {
        self.current_cert_chain.as_ref()
    }

    pub fn favicon(&self) -> Option<ContentHandle> {
        self.favicon.current
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll(&self) -> (i32, i32) {
        (self.scroll_x, self.scroll_y)
    }

    pub fn drag_active(&self) -> bool {
        self.drag != DragKind::None
    }

    /// Status-line cache counters: (suppressed repeats, updates sent).
    pub fn status_counters(&self) -> (u64, u64) {
        (self.status.hits, self.status.misses)
    }
}

/// Id-keyed arena holding every window of every tree managed by the engine.
#[derive(Default)]
pub(crate) struct WindowTree {
    map: HashMap<WindowId, Window>,
}

impl WindowTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, window: Window) {
        self.map.insert(window.id, window);
    }

    pub fn remove(&mut self, id: WindowId) -> Option<Window> {
        self.map.remove(&id)
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.map.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.map.get_mut(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.map.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Walk parent links up to the top of this window's tree.
    pub fn find_root(&self, id: WindowId) -> WindowId {
        let mut cur = id;
        while let Some(parent) = self.map.get(&cur).and_then(|w| w.parent) {
            cur = parent;
        }
        cur
    }

    /// Number of ancestors above `id`.
    pub fn depth(&self, id: WindowId) -> usize {
        let mut depth = 0;
        let mut cur = id;
        while let Some(parent) = self.map.get(&cur).and_then(|w| w.parent) {
            depth += 1;
            cur = parent;
        }
        depth
    }

    /// Direct children, frames first.
    pub fn children_of(&self, id: WindowId) -> Vec<WindowId> {
        let Some(win) = self.map.get(&id) else {
            return Vec::new();
        };
        let mut out = win.frames.clone();
        out.extend_from_slice(&win.iframes);
        out
    }

    /// Depth-first: is any window in this subtree still loading?
    pub fn any_throbbing(&self, id: WindowId) -> bool {
        let Some(win) = self.map.get(&id) else {
            return false;
        };
        if win.throbbing {
            return true;
        }
        self.children_of(id)
            .into_iter()
            .any(|child| self.any_throbbing(child))
    }

    /// Resolve a link target name to a window, the way frame targets do:
    /// `_self`, `_parent` and `_top` are positional; anything else is looked
    /// up depth-first across the whole tree, falling back to `from` when no
    /// frame carries the name.
    pub fn find_target(&self, from: WindowId, name: &str) -> WindowId {
        match name {
            "" | "_self" => from,
            "_parent" => self
                .map
                .get(&from)
                .and_then(|w| w.parent)
                .unwrap_or(from),
            "_top" => self.find_root(from),
            _ => self
                .find_named(self.find_root(from), name)
                .unwrap_or(from),
        }
    }

    fn find_named(&self, id: WindowId, name: &str) -> Option<WindowId> {
        let win = self.map.get(&id)?;
        if win.name.as_deref() == Some(name) {
            return Some(id);
        }
        self.children_of(id)
            .into_iter()
            .find_map(|child| self.find_named(child, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(tree: &mut WindowTree, parent: WindowId, kind: WindowKind, name: Option<&str>) -> WindowId {
        let id = WindowId::new();
        tree.insert(Window::new(id, kind, name.map(str::to_owned), Some(parent)));
        match kind {
            WindowKind::Iframe => tree.get_mut(parent).unwrap().iframes.push(id),
            _ => tree.get_mut(parent).unwrap().frames.push(id),
        }
        id
    }

    fn top(tree: &mut WindowTree) -> WindowId {
        let id = WindowId::new();
        tree.insert(Window::new(id, WindowKind::Top, None, None));
        id
    }

    #[test]
    fn find_root_and_depth() {
        let mut tree = WindowTree::new();
        let root = top(&mut tree);
        let frame = child(&mut tree, root, WindowKind::Frame, None);
        let iframe = child(&mut tree, frame, WindowKind::Iframe, None);

        assert_eq!(tree.find_root(iframe), root);
        assert_eq!(tree.find_root(root), root);
        assert_eq!(tree.depth(root), 0);
        assert_eq!(tree.depth(frame), 1);
        assert_eq!(tree.depth(iframe), 2);
    }

    #[test]
    fn throbbing_is_visible_from_the_root() {
        let mut tree = WindowTree::new();
        let root = top(&mut tree);
        let frame = child(&mut tree, root, WindowKind::Frame, None);
        let leaf = child(&mut tree, frame, WindowKind::Iframe, None);

        assert!(!tree.any_throbbing(root));
        tree.get_mut(leaf).unwrap().throbbing = true;
        assert!(tree.any_throbbing(root));
        assert!(tree.any_throbbing(frame));
        tree.get_mut(leaf).unwrap().throbbing = false;
        assert!(!tree.any_throbbing(root));
    }

    #[test]
    fn target_names_resolve_positionally_and_by_name() {
        let mut tree = WindowTree::new();
        let root = top(&mut tree);
        let left = child(&mut tree, root, WindowKind::Frame, Some("nav"));
        let right = child(&mut tree, root, WindowKind::Frame, Some("body"));

        assert_eq!(tree.find_target(left, "_self"), left);
        assert_eq!(tree.find_target(left, "_parent"), root);
        assert_eq!(tree.find_target(left, "_top"), root);
        assert_eq!(tree.find_target(left, "body"), right);
        // Unknown names stay where the link was followed.
        assert_eq!(tree.find_target(left, "nowhere"), left);
        // A root has no parent to go to.
        assert_eq!(tree.find_target(root, "_parent"), root);
    }

    #[test]
    fn two_trees_stay_isolated() {
        let mut tree = WindowTree::new();
        let a = top(&mut tree);
        let b = top(&mut tree);
        let a_frame = child(&mut tree, a, WindowKind::Frame, Some("shared"));

        tree.get_mut(a_frame).unwrap().throbbing = true;
        assert!(!tree.any_throbbing(b));
        // Name lookup never crosses into another tree.
        assert_eq!(tree.find_target(b, "shared"), b);
    }
}
