//! Pre-submission credential capture.
//!
//! An [`AuthSurface`] is whatever lets the user log in to the target site
//! (an embedded browser, a terminal prompt, a fixed header for scripting).
//! [`capture_credentials`] drives it and turns the cookies visible for the
//! page the user ended up on into a credential set.

use crate::cookie::parse_cookie_header;
use crate::Cookie;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAction {
    /// The user finished logging in and wants the cookies.
    Confirm,
    /// The user backed out; nothing is captured and nothing is submitted.
    Dismiss,
}

pub trait AuthSurface {
    /// Show the site at `url` so the user can authenticate.
    fn navigate(&mut self, url: &str);
    /// Block until the user confirms or dismisses.
    fn await_user(&mut self) -> SurfaceAction;
    /// URL the surface currently shows; may differ from the initial one after redirects.
    fn current_url(&self) -> String;
    /// Raw cookie string (`a=1; b=2`) visible for `url`, if any. Must not clear the store.
    fn cookie_header(&self, url: &str) -> Option<String>;
    fn close(&mut self);
}

/// Runs one capture session. Returns `None` when the user dismissed the
/// surface, otherwise the (possibly empty) cookies for the current page.
pub fn capture_credentials(surface: &mut dyn AuthSurface, url: &str) -> Option<Vec<Cookie>> {
    surface.navigate(url);
    let action = surface.await_user();
    let captured = match action {
        SurfaceAction::Dismiss => None,
        SurfaceAction::Confirm => {
            let current = surface.current_url();
            let cookies = surface
                .cookie_header(&current)
                .map(|header| parse_cookie_header(&header, &current))
                .unwrap_or_default();
            Some(cookies)
        }
    };
    surface.close();
    captured
}
