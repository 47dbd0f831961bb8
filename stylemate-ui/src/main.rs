//! stylemate - local wardrobe CLI
//!
//! Works against the Local Store in the root folder. Commands that need the
//! generative model (upload, profile set, generate) require a Gemini API key.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stylemate_ai::{GeminiClient, StyleGateway};
use stylemate_common::config::{
    ensure_root_folder, load_toml_config, resolve_gemini_api_key, resolve_root_folder,
};
use stylemate_common::{time, LocalStore};
use stylemate_ui::{CategoryFilter, FileOutcome, SortOrder, UploadFile, WardrobeSession};

#[derive(Parser, Debug)]
#[command(name = "stylemate")]
#[command(about = "AI-assisted wardrobe organizer")]
#[command(version)]
struct Args {
    /// Folder holding the local database
    #[arg(short, long, global = true)]
    root_folder: Option<PathBuf>,

    /// Explicit TOML config file
    #[arg(short, long, global = true, env = "STYLEMATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show wardrobe items
    List {
        /// "all" or a category name
        #[arg(long, default_value = "all")]
        category: CategoryFilter,

        /// newest, oldest or category
        #[arg(long, default_value = "newest")]
        sort: SortOrder,
    },
    /// Add photos; every garment found becomes an item
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete an item
    Delete { id: String },
    /// Add or remove an item tag
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },
    /// Show, set or clear the profile photo
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Generate three outfits from the wardrobe
    Generate {
        /// Free-text styling request, e.g. "something for a beach wedding"
        #[arg(long)]
        request: Option<String>,
    },
    /// Show stored outfits with their items
    Outfits,
}

#[derive(Subcommand, Debug)]
enum TagAction {
    Add { id: String, tag: String },
    Remove { id: String, tag: String },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    Show,
    Set { photo: PathBuf },
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_toml_config(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    ensure_root_folder(&root_folder)?;

    let mut session = WardrobeSession::new(LocalStore::in_root_folder(&root_folder));
    if let Some(path) = session.store().path() {
        info!("Local store: {}", path.display());
    }

    match resolve_gemini_api_key(&config) {
        Some(api_key) => {
            let client = GeminiClient::from_config(api_key, &config.gemini)
                .context("Failed to create Gemini client")?;
            info!("AI gateway enabled (model {})", client.model());
            session = session.with_gateway(StyleGateway::new(Arc::new(client)));
        }
        None => warn!("No Gemini API key configured; AI commands are unavailable"),
    }

    session.load().await;
    let result = run(&mut session, args.command).await;
    session.store().close().await;
    result
}

async fn run(session: &mut WardrobeSession, command: Command) -> Result<()> {
    match command {
        Command::List { category, sort } => {
            let view = session.wardrobe_view(category, sort);
            if view.is_empty() {
                println!("Your wardrobe is empty. Add photos with `stylemate upload`.");
            }
            for item in view {
                print_item(item);
            }
        }

        Command::Upload { files } => {
            let mut batch = Vec::with_capacity(files.len());
            for path in &files {
                match UploadFile::read(path) {
                    Ok(file) => batch.push(file),
                    Err(e) => eprintln!("Skipping {}: {}", path.display(), e),
                }
            }

            let reports = session.upload_batch(batch, |message| eprintln!("{}", message)).await?;
            for report in reports {
                match report.outcome {
                    FileOutcome::Added(ids) if ids.is_empty() => {
                        println!("{}: no clothing found", report.name)
                    }
                    FileOutcome::Added(ids) => {
                        println!("{}: added {} item(s)", report.name, ids.len())
                    }
                    FileOutcome::Failed(reason) => println!("{}: failed ({})", report.name, reason),
                }
            }
        }

        Command::Delete { id } => {
            session.delete_item(&id).await?;
            println!("Deleted {}", id);
        }

        Command::Tag { action } => {
            let changed = match &action {
                TagAction::Add { id, tag } => session.add_tag(id, tag).await?,
                TagAction::Remove { id, tag } => session.remove_tag(id, tag).await?,
            };
            if !changed {
                println!("No change");
            }
        }

        Command::Profile { action } => match action {
            ProfileAction::Show => match session.profile() {
                Some(profile) => {
                    let traits = &profile.traits;
                    println!("Skin tone:  {}", traits.skin_tone.as_deref().unwrap_or("-"));
                    println!("Hair color: {}", traits.hair_color.as_deref().unwrap_or("-"));
                    println!("Body type:  {}", traits.body_type.as_deref().unwrap_or("-"));
                }
                None => println!("No profile photo set"),
            },
            ProfileAction::Set { photo } => {
                let file = UploadFile::read(&photo)?;
                eprintln!("Analyzing profile photo...");
                let profile = session.set_profile_photo(file.image).await?;
                println!("Profile updated: {:?}", profile.traits);
            }
            ProfileAction::Clear => {
                session.clear_profile().await?;
                println!("Profile cleared");
            }
        },

        Command::Generate { request } => {
            eprintln!("Styling your wardrobe...");
            let outfits = session.generate_outfits(request.as_deref()).await?;
            if outfits.is_empty() {
                println!("No outfits could be generated. Try again later.");
                return Ok(());
            }
            print_outfits(session);
        }

        Command::Outfits => print_outfits(session),
    }
    Ok(())
}

fn print_item(item: &stylemate_common::ClothingItem) {
    let tags = if item.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", item.tags.join(", "))
    };
    let added = time::from_millis(item.created_at)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("{}  {}  {:<11}  {}{}", item.id, added, item.category, item.description, tags);
}

fn print_outfits(session: &WardrobeSession) {
    let cards = session.outfit_cards();
    if cards.is_empty() {
        println!("No outfits yet. Run `stylemate generate`.");
    }
    for card in cards {
        println!("{} ({})", card.outfit.name, card.outfit.style);
        if !card.outfit.description.is_empty() {
            println!("  {}", card.outfit.description);
        }
        for item in card.items {
            println!("  - {} {}", item.category, item.description);
        }
    }
}
