//! Wardrobe session controller
//!
//! Holds the transient copies of the three collections. The Local Store is
//! the source of truth; the lists here are loaded once and then kept in step
//! with every successful write.

use std::path::Path;

use stylemate_ai::{OutfitRequest, StyleGateway};
use stylemate_common::{ClothingItem, ImageData, LocalStore, Outfit, UserProfile, WardrobeEntry};
use tracing::{debug, error, info, warn};

use crate::error::{Result, SessionError};
use crate::views::{self, CategoryFilter, OutfitCard, SortOrder};

/// An image queued for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub image: ImageData,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, image: ImageData) -> Self {
        Self { name: name.into(), image }
    }

    /// Read an image file, detecting its MIME type from the contents
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path.display().to_string();

        let mime_type = infer::get(&bytes)
            .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
            .map(|kind| kind.mime_type())
            .ok_or_else(|| SessionError::UnsupportedImage(name.clone()))?;

        Ok(Self::new(name, ImageData::from_bytes(mime_type, &bytes)))
    }
}

/// What happened to one file of a batch upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Ids of the items created from this file, possibly none
    Added(Vec<String>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub name: String,
    pub outcome: FileOutcome,
}

/// Progress line shown while a batch is analyzed (1-based)
pub fn progress_message(index: usize, total: usize) -> String {
    format!("Analyzing image {} of {}...", index + 1, total)
}

/// Controller for one user's wardrobe on this device
pub struct WardrobeSession {
    store: LocalStore,
    gateway: Option<StyleGateway>,
    items: Vec<ClothingItem>,
    outfits: Vec<Outfit>,
    profile: Option<UserProfile>,
}

impl WardrobeSession {
    /// Empty session; call [`load`](Self::load) to read the store
    pub fn new(store: LocalStore) -> Self {
        Self {
            store,
            gateway: None,
            items: Vec::new(),
            outfits: Vec::new(),
            profile: None,
        }
    }

    pub fn with_gateway(mut self, gateway: StyleGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Read all three collections. Store failures leave that part empty.
    pub async fn load(&mut self) {
        self.items = match self.store.get_all::<ClothingItem>().await {
            Ok(mut items) => {
                items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                items
            }
            Err(e) => {
                error!("Failed to load wardrobe items: {}", e);
                Vec::new()
            }
        };

        self.outfits = match self.store.get_all::<Outfit>().await {
            Ok(outfits) => outfits,
            Err(e) => {
                error!("Failed to load outfits: {}", e);
                Vec::new()
            }
        };

        // A cleared record is the same as no profile
        self.profile = match self.store.get_profile().await {
            Ok(profile) => profile.filter(UserProfile::has_photo),
            Err(e) => {
                error!("Failed to load profile: {}", e);
                None
            }
        };

        info!(
            items = self.items.len(),
            outfits = self.outfits.len(),
            has_profile = self.profile.is_some(),
            "Session loaded"
        );
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Wardrobe items, newest first unless sorted by a view
    pub fn items(&self) -> &[ClothingItem] {
        &self.items
    }

    /// The displayed outfits (the latest generated batch after a generate)
    pub fn outfits(&self) -> &[Outfit] {
        &self.outfits
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn wardrobe_view(&self, filter: CategoryFilter, sort: SortOrder) -> Vec<&ClothingItem> {
        views::wardrobe_view(&self.items, filter, sort)
    }

    pub fn outfit_cards(&self) -> Vec<OutfitCard<'_>> {
        views::outfit_cards(&self.outfits, &self.items)
    }

    fn gateway(&self) -> Result<&StyleGateway> {
        self.gateway.as_ref().ok_or(SessionError::GatewayUnavailable)
    }

    /// Classify and store a batch of photos, one file at a time in input order.
    ///
    /// Items from each file land ahead of everything already shown, so the
    /// last file's items end up first. A failing file is logged and skipped.
    pub async fn upload_batch(
        &mut self,
        files: Vec<UploadFile>,
        mut on_progress: impl FnMut(&str),
    ) -> Result<Vec<FileReport>> {
        let gateway = self.gateway()?.clone();
        let total = files.len();
        let mut reports = Vec::with_capacity(total);

        for (index, file) in files.into_iter().enumerate() {
            let message = progress_message(index, total);
            info!("{}", message);
            on_progress(&message);

            let classified = gateway.classify(&file.image).await;
            let image_url = file.image.to_data_url();

            let mut added: Vec<ClothingItem> = Vec::with_capacity(classified.len());
            let mut failure = None;
            for entry in classified {
                let item = ClothingItem::new(image_url.clone(), entry.category, entry.description);
                if let Err(e) = self.store.save(&item).await {
                    failure = Some(e);
                    break;
                }
                added.push(item);
            }

            let ids: Vec<String> = added.iter().map(|item| item.id.clone()).collect();
            // Whatever reached the store is shown, even if the file failed part way
            self.items.splice(0..0, added);

            let outcome = match failure {
                None => {
                    debug!(file = %file.name, count = ids.len(), "File processed");
                    FileOutcome::Added(ids)
                }
                Some(e) => {
                    error!(file = %file.name, "Failed to process file: {}", e);
                    FileOutcome::Failed(e.to_string())
                }
            };
            reports.push(FileReport { name: file.name, outcome });
        }

        Ok(reports)
    }

    /// Remove an item. Outfits that reference it are left alone.
    pub async fn delete_item(&mut self, id: &str) -> Result<()> {
        self.store.delete::<ClothingItem>(id).await?;
        self.items.retain(|item| item.id != id);
        Ok(())
    }

    /// Returns false when nothing changed (unknown id, blank or duplicate tag)
    pub async fn add_tag(&mut self, id: &str, tag: &str) -> Result<bool> {
        self.update_item(id, |item| item.add_tag(tag)).await
    }

    pub async fn remove_tag(&mut self, id: &str, tag: &str) -> Result<bool> {
        self.update_item(id, |item| item.remove_tag(tag)).await
    }

    /// Read-modify-write of one whole item record
    async fn update_item(
        &mut self,
        id: &str,
        edit: impl FnOnce(&mut ClothingItem) -> bool,
    ) -> Result<bool> {
        let Some(position) = self.items.iter().position(|item| item.id == id) else {
            warn!(item_id = %id, "No such item");
            return Ok(false);
        };

        let mut updated = self.items[position].clone();
        if !edit(&mut updated) {
            return Ok(false);
        }

        self.store.save(&updated).await?;
        self.items[position] = updated;
        Ok(true)
    }

    /// Set the profile photo and the traits read from it
    pub async fn set_profile_photo(&mut self, image: ImageData) -> Result<&UserProfile> {
        let traits = self.gateway()?.extract_traits(&image).await;
        let profile = UserProfile::with_photo(image.to_data_url(), traits);

        self.store.save_profile(&profile).await?;
        info!("Profile photo updated");
        let profile = &*self.profile.insert(profile);
        Ok(profile)
    }

    pub async fn clear_profile(&mut self) -> Result<()> {
        self.store.save_profile(&UserProfile::cleared()).await?;
        self.profile = None;
        info!("Profile cleared");
        Ok(())
    }

    /// Ask for new outfits and show only those.
    ///
    /// Every generated outfit is stored; previously stored outfits stay in
    /// the store but are no longer displayed.
    pub async fn generate_outfits(&mut self, request: Option<&str>) -> Result<&[Outfit]> {
        if self.items.len() < 2 {
            return Err(SessionError::NotEnoughItems(self.items.len()));
        }
        let gateway = self.gateway()?;

        let wardrobe: Vec<WardrobeEntry> = self.items.iter().map(WardrobeEntry::from).collect();
        let profile_image = self
            .profile
            .as_ref()
            .and_then(|p| p.image_url.as_deref())
            .and_then(ImageData::from_data_url);
        let traits = self.profile.as_ref().map(|p| &p.traits).filter(|t| !t.is_empty());

        let generated = gateway
            .generate_outfits(
                &wardrobe,
                OutfitRequest {
                    profile_image: profile_image.as_ref(),
                    traits,
                    user_request: request.map(str::trim).filter(|r| !r.is_empty()),
                },
            )
            .await;

        let outfits: Vec<Outfit> = generated.into_iter().map(Outfit::from_generated).collect();
        for outfit in &outfits {
            self.store.save(outfit).await?;
        }

        info!(count = outfits.len(), "Generated outfits");
        self.outfits = outfits;
        Ok(&self.outfits)
    }
}
