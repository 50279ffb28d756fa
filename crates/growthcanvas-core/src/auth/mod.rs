//! Authentication module for bearer credentials and where they are kept.
//!
//! This module provides:
//! - `Credential` / `TokenResponse`: access/refresh token pair and the
//!   login/refresh response body
//! - `SessionStore`: storage trait with memory, keychain and file backends
//! - `Session`: typed access to the stored credential, shared by the API client
//!
//! There is no session object beyond the stored values: a session exists
//! while an access token is stored.

pub mod credential;
pub mod credentials;
pub mod file_store;
pub mod session;
pub mod store;

pub use credential::{Credential, TokenResponse, DEFAULT_TOKEN_TYPE};
pub use credentials::KeyringSessionStore;
pub use file_store::FileSessionStore;
pub use session::Session;
pub use store::{MemorySessionStore, SessionError, SessionKey, SessionStore};
