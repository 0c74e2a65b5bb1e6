//! A platform host that records every capability call.
//!
//! Backs the engine's tests and headless embeddings the same way the null
//! fetch provider does on the content side.

use crate::engine::window::{WindowId, WindowKind};
use crate::fetch::ContentHandle;
use crate::platform::{DragSaveKind, Platform, PointerShape, ScheduledTask};
use crate::viewport::Viewport;
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;

/// One recorded platform call.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    WindowCreated(WindowId, WindowKind),
    WindowDestroyed(WindowId),
    SetTitle(WindowId, String),
    SetUrl(WindowId, Url),
    SetStatus(WindowId, String),
    SetIcon(WindowId, Option<ContentHandle>),
    SetPointer(WindowId, PointerShape),
    Invalidate(WindowId, Option<Viewport>),
    ScrollTo(WindowId, i32, i32),
    ScrollToFragment(WindowId, String),
    UpdateExtent(WindowId),
    Throbber(WindowId, bool),
    PlaceCaret(WindowId),
    RemoveCaret(WindowId),
    Schedule(i32, WindowId, ScheduledTask),
    LaunchUrl(Url),
    ConsoleLog(WindowId, String),
    RecordVisit(Url),
    RecordRedirect(Url, Url),
    HotlistVisited(Url),
    StoreLogin {
        url: Url,
        realm: String,
        username: String,
        password: String,
    },
    CertOverride(Url),
    DragSave(WindowId, DragSaveKind),
    OpenSelectMenu(WindowId),
    OpenFileGadget(WindowId),
    SearchHourglass(WindowId, bool),
    SearchStatus(WindowId, bool),
}

/// The recording platform host. Cloning shares the call log.
#[derive(Clone, Default)]
pub struct NullPlatform {
    calls: Rc<RefCell<Vec<PlatformCall>>>,
}

impl NullPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: PlatformCall) {
        self.calls.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, matcher: impl Fn(&PlatformCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| matcher(c)).count()
    }

    /// The most recent address-bar update for a window.
    pub fn last_set_url(&self, win: WindowId) -> Option<Url> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find_map(|call| match call {
                PlatformCall::SetUrl(w, url) if *w == win => Some(url.clone()),
                _ => None,
            })
    }

    /// Every status line shown for a window, oldest first.
    pub fn statuses(&self, win: WindowId) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::SetStatus(w, text) if *w == win => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// The most recent window icon for a window.
    pub fn last_icon(&self, win: WindowId) -> Option<Option<ContentHandle>> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find_map(|call| match call {
                PlatformCall::SetIcon(w, icon) if *w == win => Some(*icon),
                _ => None,
            })
    }
}

impl Platform for NullPlatform {
    fn window_created(&mut self, win: WindowId, kind: WindowKind) {
        self.push(PlatformCall::WindowCreated(win, kind));
    }

    fn window_destroyed(&mut self, win: WindowId) {
        self.push(PlatformCall::WindowDestroyed(win));
    }

    fn set_title(&mut self, win: WindowId, title: &str) {
        self.push(PlatformCall::SetTitle(win, title.to_string()));
    }

    fn set_url(&mut self, win: WindowId, url: &Url) {
        self.push(PlatformCall::SetUrl(win, url.clone()));
    }

    fn set_status(&mut self, win: WindowId, text: &str) {
        self.push(PlatformCall::SetStatus(win, text.to_string()));
    }

    fn set_icon(&mut self, win: WindowId, icon: Option<ContentHandle>) {
        self.push(PlatformCall::SetIcon(win, icon));
    }

    fn set_pointer(&mut self, win: WindowId, pointer: PointerShape) {
        self.push(PlatformCall::SetPointer(win, pointer));
    }

    fn invalidate(&mut self, win: WindowId, area: Option<Viewport>) {
        self.push(PlatformCall::Invalidate(win, area));
    }

    fn scroll_to(&mut self, win: WindowId, x: i32, y: i32) {
        self.push(PlatformCall::ScrollTo(win, x, y));
    }

    fn scroll_to_fragment(&mut self, win: WindowId, fragment: &str) {
        self.push(PlatformCall::ScrollToFragment(win, fragment.to_string()));
    }

    fn update_extent(&mut self, win: WindowId) {
        self.push(PlatformCall::UpdateExtent(win));
    }

    fn throbber(&mut self, win: WindowId, active: bool) {
        self.push(PlatformCall::Throbber(win, active));
    }

    fn place_caret(&mut self, win: WindowId, _x: i32, _y: i32, _height: i32) {
        self.push(PlatformCall::PlaceCaret(win));
    }

    fn remove_caret(&mut self, win: WindowId) {
        self.push(PlatformCall::RemoveCaret(win));
    }

    fn schedule(&mut self, delay_cs: i32, win: WindowId, task: ScheduledTask) {
        self.push(PlatformCall::Schedule(delay_cs, win, task));
    }

    fn launch_url(&mut self, url: &Url) {
        self.push(PlatformCall::LaunchUrl(url.clone()));
    }

    fn console_log(&mut self, win: WindowId, message: &str) {
        self.push(PlatformCall::ConsoleLog(win, message.to_string()));
    }

    fn record_visit(&mut self, url: &Url, _title: Option<&str>) {
        self.push(PlatformCall::RecordVisit(url.clone()));
    }

    fn record_redirect(&mut self, from: &Url, to: &Url) {
        self.push(PlatformCall::RecordRedirect(from.clone(), to.clone()));
    }

    fn hotlist_visited(&mut self, url: &Url) {
        self.push(PlatformCall::HotlistVisited(url.clone()));
    }

    fn store_login(&mut self, url: &Url, realm: &str, username: &str, password: &str) {
        self.push(PlatformCall::StoreLogin {
            url: url.clone(),
            realm: realm.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        });
    }

    fn record_cert_override(&mut self, url: &Url) {
        self.push(PlatformCall::CertOverride(url.clone()));
    }

    fn drag_save(&mut self, win: WindowId, kind: DragSaveKind) {
        self.push(PlatformCall::DragSave(win, kind));
    }

    fn open_select_menu(&mut self, win: WindowId) {
        self.push(PlatformCall::OpenSelectMenu(win));
    }

    fn open_file_gadget(&mut self, win: WindowId) {
        self.push(PlatformCall::OpenFileGadget(win));
    }

    fn search_hourglass(&mut self, win: WindowId, active: bool) {
        self.push(PlatformCall::SearchHourglass(win, active));
    }

    fn search_status(&mut self, win: WindowId, found: bool) {
        self.push(PlatformCall::SearchStatus(win, found));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_call_log() {
        let platform = NullPlatform::new();
        let mut engine_side: Box<dyn Platform> = Box::new(platform.clone());
        let win = WindowId::new();
        engine_side.set_status(win, "Hello");
        engine_side.throbber(win, true);

        assert_eq!(platform.calls().len(), 2);
        assert_eq!(platform.statuses(win), vec!["Hello".to_string()]);
        assert_eq!(platform.count(|c| matches!(c, PlatformCall::Throbber(_, true))), 1);
    }
}
