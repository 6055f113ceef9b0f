pub mod local;
pub mod offline;
pub mod remote;

pub use local::{LocalStore, StoreEvent};
pub use offline::OfflineStore;
pub use remote::RemoteStore;
