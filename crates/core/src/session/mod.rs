//! Session lifecycle
//!
//! - [`SessionTable`]: host key to [`Session`] map
//! - [`SessionStore`]: the table and cookie jar behind one lock
//! - [`SessionManager`]: establish, validate, reset and rebuild sessions

mod cookies;
mod manager;
mod store;
mod table;

pub use cookies::{CookieJar, StoredCookie};
pub use manager::SessionManager;
pub use store::SessionStore;
pub use table::{DocsSentMeter, Session, SessionInfo, SessionTable};
