//! Authentication surfaces available from the terminal.
//!
//! There is no embedded browser here: the user logs in with their own
//! browser and pastes the `Cookie` header back, or passes it on the
//! command line for scripted runs.

use clipper_core::{AuthSurface, SurfaceAction};
use dialoguer::{Confirm, Input};
use engine_logging::{engine_info, engine_warn};

/// Interactive capture driven by terminal prompts.
#[derive(Debug, Default)]
pub struct TerminalAuthSurface {
    url: String,
    header: Option<String>,
}

impl TerminalAuthSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn prompt(&mut self) -> Result<SurfaceAction, dialoguer::Error> {
        let landed: String = Input::new()
            .with_prompt("Page you ended up on after logging in")
            .default(self.url.clone())
            .interact_text()?;
        let header: String = Input::new()
            .with_prompt("Cookie header for that page (empty for none)")
            .allow_empty(true)
            .interact_text()?;
        let proceed = Confirm::new()
            .with_prompt("Submit with these cookies?")
            .default(true)
            .interact()?;
        if !proceed {
            return Ok(SurfaceAction::Dismiss);
        }
        self.url = landed.trim().to_string();
        let header = header.trim();
        self.header = (!header.is_empty()).then(|| header.to_string());
        Ok(SurfaceAction::Confirm)
    }
}

impl AuthSurface for TerminalAuthSurface {
    fn navigate(&mut self, url: &str) {
        self.url = url.to_string();
        eprintln!("Log in at {url} in your browser, then copy the Cookie header.");
    }

    fn await_user(&mut self) -> SurfaceAction {
        match self.prompt() {
            Ok(action) => action,
            Err(err) => {
                engine_warn!("Login prompt aborted: {}", err);
                SurfaceAction::Dismiss
            }
        }
    }

    fn current_url(&self) -> String {
        self.url.clone()
    }

    fn cookie_header(&self, _url: &str) -> Option<String> {
        self.header.clone()
    }

    fn close(&mut self) {
        engine_info!("Login surface closed");
    }
}

/// Non-interactive surface returning a fixed header, used for `--cookie-header`.
#[derive(Debug, Clone)]
pub struct HeaderAuthSurface {
    url: String,
    header: String,
}

impl HeaderAuthSurface {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            url: String::new(),
            header: header.into(),
        }
    }
}

impl AuthSurface for HeaderAuthSurface {
    fn navigate(&mut self, url: &str) {
        self.url = url.to_string();
    }

    fn await_user(&mut self) -> SurfaceAction {
        SurfaceAction::Confirm
    }

    fn current_url(&self) -> String {
        self.url.clone()
    }

    fn cookie_header(&self, _url: &str) -> Option<String> {
        Some(self.header.clone())
    }

    fn close(&mut self) {}
}
