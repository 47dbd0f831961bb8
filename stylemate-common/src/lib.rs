//! # StyleMate Common Library
//!
//! Shared code for the StyleMate crates including:
//! - Entity model (clothing items, outfits, the user profile)
//! - Local Store (per-device record store with three collections)
//! - Versioned schema migrations
//! - Identity token verification
//! - Configuration loading
//! - Utility functions

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod store;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use models::{
    Category, ClassifiedItem, ClothingItem, GeneratedOutfit, ImageData, Outfit, UserProfile,
    UserTraits, WardrobeEntry, PROFILE_ID,
};
pub use store::LocalStore;
