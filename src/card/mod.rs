pub mod sync;
pub mod types;

pub use sync::CardSyncClient;
pub use types::*;
