//! Recovery flows: the request -> display -> decision cycle that turns a
//! fetch failure into a prompt page and, on the user's answer, resumes or
//! abandons the original request.
//!
//! On first entry (the error just happened) a flow builds synthetic
//! parameters targeting its reserved URL, with the machine-readable context
//! as multipart fields, and re-enters the navigation controller with a
//! stack-local parameter set — the published loading parameters still
//! describe the user's original request. When the displayed prompt posts
//! back to the same URL, the router lands here again and the fields are
//! interpreted as the decision.

use crate::engine::engine::SkiffEngine;
use crate::engine::params::{FetchParams, FormField, NavigationFlags};
use crate::engine::query::{internal_url, QUERY_AUTH, QUERY_FETCHERROR, QUERY_SSL, QUERY_TIMEOUT};
use crate::engine::window::WindowId;
use crate::errors::NavError;
use url::Url;

impl SkiffEngine {
    /// The URL whose fetch failed and whose parameters a decision may
    /// resume.
    fn failed_site_url(&self, id: WindowId) -> Result<Url, NavError> {
        let win = self.win(id)?;
        win.loading_params
            .as_ref()
            .or(win.current_params.as_ref())
            .map(|p| p.url.clone())
            .ok_or(NavError::NotFound)
    }

    pub(crate) fn query_auth_begin(&mut self, id: WindowId, realm: &str) -> Result<(), NavError> {
        let site = self.failed_site_url(id)?;
        log::debug!("window {id} prompting for credentials, realm {realm:?}");
        let fields = vec![
            FormField::new("siteurl", site.as_str()),
            FormField::new("realm", realm),
            FormField::new("username", ""),
            FormField::new("password", ""),
        ];
        self.navigate_inner(id, FetchParams::internal(internal_url(QUERY_AUTH), fields), false)
    }

    pub(crate) fn query_ssl_begin(&mut self, id: WindowId) -> Result<(), NavError> {
        let site = self.failed_site_url(id)?;
        let (chain, reason) = {
            let win = self.win(id)?;
            match &win.loading_cert_chain {
                Some(chain) => (
                    chain.serialize(),
                    chain
                        .failure_reason()
                        .unwrap_or("certificate could not be verified")
                        .to_string(),
                ),
                None => (String::new(), "certificate could not be verified".to_string()),
            }
        };
        log::debug!("window {id} prompting about certificates: {reason}");
        let fields = vec![
            FormField::new("siteurl", site.as_str()),
            FormField::new("chain", chain),
            FormField::new("reason", reason),
        ];
        self.navigate_inner(id, FetchParams::internal(internal_url(QUERY_SSL), fields), false)
    }

    pub(crate) fn query_timeout_begin(&mut self, id: WindowId) -> Result<(), NavError> {
        let site = self.failed_site_url(id)?;
        log::debug!("window {id} prompting about a timeout");
        let fields = vec![FormField::new("siteurl", site.as_str())];
        self.navigate_inner(
            id,
            FetchParams::internal(internal_url(QUERY_TIMEOUT), fields),
            false,
        )
    }

    pub(crate) fn query_fetcherror_begin(
        &mut self,
        id: WindowId,
        reason: &str,
    ) -> Result<(), NavError> {
        let site = self.failed_site_url(id)?;
        log::debug!("window {id} prompting about a fetch failure: {reason}");
        let fields = vec![
            FormField::new("siteurl", site.as_str()),
            FormField::new("reason", reason),
        ];
        self.navigate_inner(
            id,
            FetchParams::internal(internal_url(QUERY_FETCHERROR), fields),
            false,
        )
    }

    /// Router handler for `about:query_auth`.
    pub(crate) fn query_auth(&mut self, id: WindowId, params: &FetchParams) -> Result<(), NavError> {
        if params.field("login").is_some() {
            let username = params.field("username").ok_or(NavError::BadParameter)?.to_string();
            let password = params.field("password").ok_or(NavError::BadParameter)?.to_string();
            let realm = params.field("realm").ok_or(NavError::BadParameter)?.to_string();
            let site = parse_field_url(params, "siteurl")?;
            self.platform.store_login(&site, &realm, &username, &password);
            self.resume_original(id, None)
        } else if params.field("cancel").is_some() {
            self.reload_last_committed(id)
        } else {
            self.start_fetch(id, params)
        }
    }

    /// Router handler for `about:query_ssl`.
    pub(crate) fn query_ssl(&mut self, id: WindowId, params: &FetchParams) -> Result<(), NavError> {
        if params.field("proceed").is_some() {
            // The posted site URL is authoritative; the published parameters
            // may have been touched since the prompt went up.
            let site = parse_field_url(params, "siteurl")?;
            self.platform.record_cert_override(&site);
            self.resume_original(id, Some(site))
        } else if params.field("back").is_some() {
            self.reload_last_committed(id)
        } else {
            self.start_fetch(id, params)
        }
    }

    /// Router handler for `about:query_timeout`.
    pub(crate) fn query_timeout(&mut self, id: WindowId, params: &FetchParams) -> Result<(), NavError> {
        self.query_retry_page(id, params)
    }

    /// Router handler for `about:query_fetcherror`.
    pub(crate) fn query_fetcherror(
        &mut self,
        id: WindowId,
        params: &FetchParams,
    ) -> Result<(), NavError> {
        self.query_retry_page(id, params)
    }

    fn query_retry_page(&mut self, id: WindowId, params: &FetchParams) -> Result<(), NavError> {
        if params.field("retry").is_some() {
            self.resume_original(id, None)
        } else if params.field("back").is_some() {
            self.reload_last_committed(id)
        } else {
            self.start_fetch(id, params)
        }
    }

    /// Resume the pre-error attempt still held in the loading parameter
    /// slot, exactly as published (URL substituted when the decision says
    /// so).
    fn resume_original(&mut self, id: WindowId, substitute: Option<Url>) -> Result<(), NavError> {
        let params = {
            let win = self.win_mut(id)?;
            win.internal_nav = false;
            let mut params = win.loading_params.clone().ok_or(NavError::NotFound)?;
            if let Some(url) = substitute {
                params.url = url;
                win.loading_params = Some(params.clone());
            }
            params
        };
        log::debug!("window {id} resuming original fetch of {}", params.url);
        self.route(id, &params)
    }

    /// Abandon the failed attempt and go back to the last committed page,
    /// with the POST body removed and no new history entry. Falls back to
    /// the blank page when nothing was ever committed.
    pub(crate) fn reload_last_committed(&mut self, id: WindowId) -> Result<(), NavError> {
        let blank = self.config.blank_url.clone();
        let params = {
            let win = self.win_mut(id)?;
            let mut params = win
                .current_params
                .clone()
                .unwrap_or_else(|| FetchParams::new(blank));
            params.flags.remove(NavigationFlags::HISTORY);
            params.post = None;
            win.internal_nav = false;
            win.loading_params = Some(params.clone());
            params
        };
        log::debug!("window {id} going back to {}", params.url);
        self.route(id, &params)
    }
}

fn parse_field_url(params: &FetchParams, name: &str) -> Result<Url, NavError> {
    let raw = params.field(name).ok_or(NavError::BadParameter)?;
    Url::parse(raw).map_err(|_| NavError::BadParameter)
}
