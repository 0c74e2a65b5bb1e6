//! The seam to the platform windowing / toolkit layer.
//!
//! Everything the engine wants from the GUI is expressed as a capability on
//! [`Platform`]. All methods default to no-ops so an embedder only implements
//! what its toolkit can do; the in-crate [`NullPlatform`] records every call
//! and backs the test suite.

pub mod null;

pub use null::{NullPlatform, PlatformCall};

use crate::engine::window::{WindowId, WindowKind};
use crate::fetch::ContentHandle;
use crate::viewport::Viewport;
use url::Url;

/// Mouse pointer shapes the engine may request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerShape {
    Default,
    Point,
    Caret,
    Menu,
    Cross,
    Move,
    Wait,
    Help,
    NoDrop,
    Progress,
}

/// What a drag-save gesture should save.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DragSaveKind {
    Page,
    Complete,
    Object,
    Selection,
}

/// Work the engine asked the platform scheduler to run later.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledTask {
    /// Meta-refresh: renavigate the window to the target.
    Refresh { url: Url },
    /// Coalesced frame-geometry recalculation.
    Reformat,
}

impl ScheduledTask {
    pub fn kind(&self) -> ScheduledTaskKind {
        match self {
            ScheduledTask::Refresh { .. } => ScheduledTaskKind::Refresh,
            ScheduledTask::Reformat => ScheduledTaskKind::Reformat,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScheduledTaskKind {
    Refresh,
    Reformat,
}

/// Capability set consumed from the platform window layer.
///
/// The scheduler contract: `schedule(delay_cs, window, task)` runs
/// `SkiffEngine::run_scheduled(window, task)` after `delay_cs` centiseconds.
/// A negative delay cancels any pending task of the same kind for that
/// window; cancellation is idempotent and the engine always issues it during
/// window teardown, so a scheduled task never fires for a destroyed window.
#[allow(unused_variables)]
pub trait Platform {
    fn window_created(&mut self, win: WindowId, kind: WindowKind) {}
    fn window_destroyed(&mut self, win: WindowId) {}

    fn set_title(&mut self, win: WindowId, title: &str) {}
    fn set_url(&mut self, win: WindowId, url: &Url) {}
    fn set_status(&mut self, win: WindowId, text: &str) {}
    fn set_icon(&mut self, win: WindowId, icon: Option<ContentHandle>) {}
    fn set_pointer(&mut self, win: WindowId, pointer: PointerShape) {}

    /// Mark an area (or the whole window) as needing a redraw.
    fn invalidate(&mut self, win: WindowId, area: Option<Viewport>) {}
    fn scroll_to(&mut self, win: WindowId, x: i32, y: i32) {}
    /// Scroll so the named anchor is visible; layout knows where it is.
    fn scroll_to_fragment(&mut self, win: WindowId, fragment: &str) {}
    /// The content size changed; adjust scrollbars.
    fn update_extent(&mut self, win: WindowId) {}
    fn throbber(&mut self, win: WindowId, active: bool) {}

    fn place_caret(&mut self, win: WindowId, x: i32, y: i32, height: i32) {}
    fn remove_caret(&mut self, win: WindowId) {}

    fn schedule(&mut self, delay_cs: i32, win: WindowId, task: ScheduledTask) {}

    /// Hand a URL the engine has no fetch handler for to the OS.
    fn launch_url(&mut self, url: &Url) {}
    fn console_log(&mut self, win: WindowId, message: &str) {}

    // Fire-and-forget notifications to the URL database and friends.
    fn record_visit(&mut self, url: &Url, title: Option<&str>) {}
    fn record_redirect(&mut self, from: &Url, to: &Url) {}
    fn hotlist_visited(&mut self, url: &Url) {}
    fn store_login(&mut self, url: &Url, realm: &str, username: &str, password: &str) {}
    /// Remember that the user chose to proceed past a failing certificate.
    fn record_cert_override(&mut self, url: &Url) {}

    // Object-level forwards.
    fn drag_save(&mut self, win: WindowId, kind: DragSaveKind) {}
    fn open_select_menu(&mut self, win: WindowId) {}
    fn open_file_gadget(&mut self, win: WindowId) {}
    fn search_hourglass(&mut self, win: WindowId, active: bool) {}
    fn search_status(&mut self, win: WindowId, found: bool) {}
}
