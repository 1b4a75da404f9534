//! Catalog domain module.
//!
//! Business rules for the sweets catalog and purchases, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod filter;
pub mod item;
pub mod price;
pub mod purchase;
pub mod seed;

pub use category::{Category, CategoryFilter};
pub use filter::{ItemFilter, newest_first};
pub use item::{Item, ItemPatch, NewItem, ensure_positive};
pub use price::Price;
pub use purchase::Purchase;
