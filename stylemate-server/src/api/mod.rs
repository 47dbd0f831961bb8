//! HTTP API handlers for stylemate-server

pub mod ai;
pub mod auth;
pub mod images;
pub mod items;
pub mod outfits;
pub mod profile;
pub mod service;

pub use ai::{classify, extract_traits, generate_outfits};
pub use auth::auth_middleware;
pub use images::{delete_image, download_image, upload_image};
pub use items::{create_item, delete_item, list_items, set_item_tags};
pub use outfits::{create_outfit, delete_outfit, list_outfits};
pub use profile::{clear_profile, get_profile, put_profile};
pub use service::service_routes;

use serde::Deserialize;

/// `?id=` query used by collection deletes
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    pub fn require(self) -> crate::ApiResult<String> {
        crate::error::non_blank(self.id)
            .ok_or_else(|| crate::ApiError::BadRequest("id required".to_string()))
    }
}
