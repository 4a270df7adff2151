//! Client core: the submission validator, the live list synchronizer, and
//! the item mutators. Everything external (identity, store, notifications)
//! arrives through injected dependencies.

pub mod item;
pub mod notify;
pub mod submit;
pub mod sync;

pub use item::*;
pub use notify::*;
pub use submit::*;
pub use sync::*;
