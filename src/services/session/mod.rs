pub mod durable;
pub mod expiring;
pub mod memory;
pub mod store;

pub use durable::{DurableSessionStore, SessionBackend};
pub use expiring::ExpiringSessionStore;
pub use memory::MemorySessionStore;
pub use store::{SessionError, SessionRecord, SessionResult, SessionStore};
