pub mod rest;
pub mod server;
pub mod session;

pub use rest::AppState;
pub use server::ApiServer;
pub use session::{SessionStore, UserIdentity};
