mod auth;
mod handler;
mod protocol;
mod record;
mod registry;
mod storage;

pub use auth::*;
pub use handler::*;
pub use protocol::*;
pub use record::*;
pub use registry::*;
pub use storage::*;
