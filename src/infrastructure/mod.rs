pub mod memory_store;
pub mod models;
pub mod remote_store;
pub mod sqlite_store;
pub mod whatsapp;

pub use memory_store::MemoryStore;
pub use remote_store::RemoteStore;
pub use sqlite_store::SqliteStore;
pub use whatsapp::WhatsAppNotifier;
