//! The navigation and resource-lifecycle engine.
//!
//! [`SkiffEngine`] owns a tree of browsing viewports ([`Window`]), drives
//! content fetches through the external [`FetchProvider`](crate::fetch::FetchProvider),
//! and reacts to every asynchronous outcome to keep the tree and the session
//! history consistent. The `impl` blocks are spread across this module's
//! files by concern:
//!
//! - [`navigate`]: validating and launching a navigation request
//! - [`query`]: routing reserved internal URLs away from the network
//! - [`sink`]: the completion-event dispatch point
//! - [`favicon`]: the favicon retry machine
//! - [`recovery`]: auth/certificate/timeout/error prompt cycles

pub mod engine;
pub mod favicon;
pub mod history;
pub mod navigate;
pub mod params;
pub mod query;
pub mod recovery;
pub mod sink;
pub mod window;

pub use engine::SkiffEngine;
pub use history::{History, HistoryEntry};
pub use params::{FetchFlags, FetchParams, FormField, NavigationFlags, PostBody};
pub use sink::ContentEvent;
pub use window::{Window, WindowId, WindowKind};
