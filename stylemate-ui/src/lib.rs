//! StyleMate controller and view layer
//!
//! [`WardrobeSession`] owns the in-memory wardrobe, outfit list and profile,
//! and coordinates the Local Store with the AI gateway. The `stylemate`
//! binary is a thin command-line front-end over it.

pub mod error;
pub mod session;
pub mod views;

pub use error::{Result, SessionError};
pub use session::{progress_message, FileOutcome, FileReport, UploadFile, WardrobeSession};
pub use views::{outfit_cards, wardrobe_view, CategoryFilter, OutfitCard, SortOrder};
