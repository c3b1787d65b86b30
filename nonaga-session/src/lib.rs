//! NONAGA Session - Versioned game store
//!
//! Holds live games for whatever transport sits in front of it:
//! - `session`: game ids and stored records, with JSON snapshots
//! - `store`: the compare-and-swap store itself
//!
//! The rules live in `nonaga-core`; this crate only sequences writers.

pub mod error;
pub mod session;
pub mod store;

pub use error::StoreError;
pub use session::{GameId, Session, GAME_ID_LEN};
pub use store::SessionStore;
