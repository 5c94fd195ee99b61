//! Postback session: drives one synthetic page through loads, synchronous
//! submissions and partial postbacks.

use std::path::Path;

use postback_config::{Config, SessionConfig};
use postback_page::{apply, FormRequest, PatchOutcome, PostbackAction, SyntheticPage, ASYNC_POST};
use postback_protocols::{DeltaResponse, LengthUnit};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::PostbackError;
use crate::http::{HttpCollaborator, HttpRequest, HttpResponse, ReqwestCollaborator};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No page loaded yet.
    Idle,
    /// A page is loaded and its controls are addressable.
    Ready,
    /// A request is in flight.
    AwaitingResponse,
    /// The last interaction failed; only `load` is accepted.
    Faulted,
}

/// Successful result of a session operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PostbackOutcome {
    /// A new page replaced the previous one.
    Loaded,
    /// The current page was patched in place.
    Updated,
    /// The server redirected to `url`. When redirects are followed the
    /// target is already loaded.
    Redirected { url: String },
}

/// A browsing session over web-forms pages.
///
/// Every operation takes `&mut self`: one interaction completes before the
/// next one starts. Use one session per concurrent caller.
pub struct PostbackSession<H> {
    http: H,
    config: SessionConfig,
    length_unit: LengthUnit,
    state: SessionState,
    page: Option<SyntheticPage>,
    last_delta: Option<DeltaResponse>,
    dump_count: usize,
}

impl PostbackSession<ReqwestCollaborator> {
    /// Session backed by a `reqwest` client built from `config`.
    pub fn from_config(config: &Config) -> Result<Self, PostbackError> {
        let http = ReqwestCollaborator::from_config(&config.http)?;
        Ok(Self::new(http, config.session.clone(), config.delta.length_unit))
    }
}

impl<H: HttpCollaborator> PostbackSession<H> {
    pub fn new(http: H, config: SessionConfig, length_unit: LengthUnit) -> Self {
        Self {
            http,
            config,
            length_unit,
            state: SessionState::Idle,
            page: None,
            last_delta: None,
            dump_count: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn page(&self) -> Option<&SyntheticPage> {
        self.page.as_ref()
    }

    /// Delta response of the last partial postback, kept for inspection of
    /// the fragments that do not change the page.
    pub fn last_delta(&self) -> Option<&DeltaResponse> {
        self.last_delta.as_ref()
    }

    /// Load `url` as a new page. Relative URLs resolve against the current
    /// page. Accepted in every state.
    pub async fn load(&mut self, url: &str) -> Result<PostbackOutcome, PostbackError> {
        let url = self.resolve(url)?;
        info!(url = %url, "Loading page");

        let response = self.send(HttpRequest::get(url)).await?;
        self.replace_page(response);

        Ok(PostbackOutcome::Loaded)
    }

    pub fn get_control(&self, name: &str) -> Result<String, PostbackError> {
        Ok(self.ready_page()?.get(name)?)
    }

    pub fn set_control(&mut self, name: &str, value: &str) -> Result<(), PostbackError> {
        self.ready_page()?;
        let page = self.page.as_mut().ok_or(PostbackError::NoPage)?;
        page.set(name, value)?;
        debug!(name, "Control set");
        Ok(())
    }

    /// Submit the active form as a full navigation. The response replaces
    /// the page.
    pub async fn submit(&mut self, action: &PostbackAction) -> Result<PostbackOutcome, PostbackError> {
        let form = FormRequest::build(self.ready_page()?, action, &self.config.transient_fields)?;
        info!(event_target = %action.target, url = %form.url, "Submitting form");

        let response = self.send(HttpRequest::from_form(form)).await?;
        self.replace_page(response);

        Ok(PostbackOutcome::Loaded)
    }

    /// Partial postback: the response is a delta stream applied to the
    /// current page.
    ///
    /// `scriptmanager` is the value posted under the page's script-manager
    /// id, usually `<update panel unique id>|<event target>`.
    pub async fn postback(
        &mut self,
        action: &PostbackAction,
        scriptmanager: &str,
    ) -> Result<PostbackOutcome, PostbackError> {
        let page = self.ready_page()?;
        let manager_id = page
            .script_manager_id()
            .ok_or(PostbackError::MissingScriptManager)?
            .to_string();

        let mut form = FormRequest::build(page, action, &self.config.transient_fields)?;
        form.fields.set(manager_id, scriptmanager);
        form.fields.set(ASYNC_POST, "true");
        info!(event_target = %action.target, url = %form.url, "Posting back");

        let request = HttpRequest::from_form(form)
            .with_header("Cache-Control", "no-cache")
            .with_header("X-MicrosoftAjax", "Delta=true")
            .with_header("X-Requested-With", "XMLHttpRequest");
        let response = self.send(request).await?;

        let delta = match DeltaResponse::parse(&response.body, self.length_unit) {
            Ok(delta) => delta,
            Err(e) => {
                warn!(error = %e, "Undecodable delta response");
                self.state = SessionState::Faulted;
                return Err(e.into());
            }
        };

        let page = self.page.as_mut().ok_or(PostbackError::NoPage)?;
        let outcome = apply(page, &delta);
        self.last_delta = Some(delta);

        match outcome {
            Ok(PatchOutcome::Applied) => {
                self.state = SessionState::Ready;
                self.dump_page().await;
                Ok(PostbackOutcome::Updated)
            }
            Ok(PatchOutcome::Errored { code, message }) => {
                warn!(code = %code, message = %message, "Server reported an error");
                self.state = SessionState::Faulted;
                Err(PostbackError::Protocol { code, message })
            }
            Ok(PatchOutcome::Redirected { url }) => {
                let target = match self.resolve(&url) {
                    Ok(target) => target,
                    Err(e) => {
                        warn!(url = %url, error = %e, "Unusable redirect target");
                        self.state = SessionState::Faulted;
                        return Err(e);
                    }
                };
                info!(url = %target, "Server redirected");
                self.state = SessionState::Ready;
                if self.config.follow_redirects {
                    self.load(target.as_str()).await?;
                }
                Ok(PostbackOutcome::Redirected {
                    url: target.to_string(),
                })
            }
            Err(e) => {
                self.state = SessionState::Faulted;
                Err(e.into())
            }
        }
    }

    fn ready_page(&self) -> Result<&SyntheticPage, PostbackError> {
        match self.state {
            SessionState::Faulted => Err(PostbackError::Faulted),
            _ => self.page.as_ref().ok_or(PostbackError::NoPage),
        }
    }

    fn resolve(&self, url: &str) -> Result<Url, PostbackError> {
        let base = self.page.as_ref().and_then(|p| p.url());
        let resolved = match base {
            Some(base) => base.join(url),
            None => Url::parse(url),
        };
        resolved.map_err(|e| PostbackError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn send(&mut self, request: HttpRequest) -> Result<HttpResponse, PostbackError> {
        self.state = SessionState::AwaitingResponse;
        debug!(method = request.method.as_str(), url = %request.url, "Sending request");

        match self.http.send(request).await {
            Ok(response) => {
                debug!(status = response.status, bytes = response.body.len(), "Response received");
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "Transport failure");
                self.state = SessionState::Faulted;
                Err(e.into())
            }
        }
    }

    fn replace_page(&mut self, response: HttpResponse) {
        let page = SyntheticPage::parse(&response.body, Some(response.url));
        debug!(
            script_manager_id = ?page.script_manager_id(),
            active_form_id = ?page.active_form_id(),
            "Page loaded"
        );
        self.page = Some(page);
        self.state = SessionState::Ready;
    }

    async fn dump_page(&mut self) {
        let (Some(dir), Some(page)) = (self.config.responses_dir.as_deref(), self.page.as_ref()) else {
            return;
        };

        self.dump_count += 1;
        let path = dir.join(format!("{}-updated.html", self.dump_count));
        match write_dump(dir, &path, page.to_html()).await {
            Ok(()) => info!(path = %path.display(), "Result saved"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to save result"),
        }
    }
}

async fn write_dump(dir: &Path, path: &Path, html: String) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(path, html).await
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
