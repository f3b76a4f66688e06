pub mod catalog;
pub mod engine;
pub mod error;
pub mod export;
pub mod sanitizer;
pub mod types;

pub use catalog::{Catalog, Choice};
pub use engine::{build_checklist, filter_controls, ChecklistEngine};
pub use error::{ChecklistError, Result};
pub use sanitizer::{InputSanitizer, ItemUpdate};
pub use types::{ChecklistItem, Control, ItemStatus, Selection, UserId, WILDCARD};
