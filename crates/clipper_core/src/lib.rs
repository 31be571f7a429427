//! Site clipper core: pure conversion-job state machine, data model and
//! credential capture helpers.
mod capture;
mod cookie;
mod effect;
mod msg;
mod state;
mod types;
mod update;
mod url_extract;
mod view_model;

pub use capture::{capture_credentials, AuthSurface, SurfaceAction};
pub use cookie::{host_of, parse_cookie_header};
pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, ClientState};
pub use types::{
    Cookie, CrawlMode, CrawlRequest, Generation, TaskHandle, TaskSnapshot, TaskStatus,
    UploadResult,
};
pub use update::update;
pub use url_extract::extract_url;
pub use view_model::AppViewModel;
