//! Store traits (ports)

mod stores;

pub use stores::{MessageStore, StoreResult, TokenStore, UserStore};
