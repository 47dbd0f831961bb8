//! Derived views over the session lists

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use stylemate_common::{Category, ClothingItem, Outfit};

/// Wardrobe category filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, item: &ClothingItem) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => item.category == *category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse::<Category>()
            .map(CategoryFilter::Only)
            .map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    /// Alphabetical by category name
    Category,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "category" => Ok(SortOrder::Category),
            other => Err(format!("unknown sort order '{}' (newest, oldest, category)", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::Category => "category",
        })
    }
}

/// Filter then sort. Sorting is stable, so ties keep list order.
pub fn wardrobe_view(
    items: &[ClothingItem],
    filter: CategoryFilter,
    sort: SortOrder,
) -> Vec<&ClothingItem> {
    let mut view: Vec<&ClothingItem> = items.iter().filter(|item| filter.matches(item)).collect();

    match sort {
        SortOrder::Newest => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Oldest => view.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Category => view.sort_by(|a, b| a.category.as_str().cmp(b.category.as_str())),
    }
    view
}

/// An outfit with its references resolved
#[derive(Debug, Clone, PartialEq)]
pub struct OutfitCard<'a> {
    pub outfit: &'a Outfit,
    pub items: Vec<&'a ClothingItem>,
}

/// Resolve outfit item ids against the wardrobe.
///
/// Missing ids are skipped; an outfit with nothing left is not shown.
pub fn outfit_cards<'a>(
    outfits: &'a [Outfit],
    wardrobe: &'a [ClothingItem],
) -> Vec<OutfitCard<'a>> {
    let by_id: HashMap<&str, &ClothingItem> =
        wardrobe.iter().map(|item| (item.id.as_str(), item)).collect();

    outfits
        .iter()
        .filter_map(|outfit| {
            let items: Vec<&ClothingItem> = outfit
                .item_ids
                .iter()
                .filter_map(|id| by_id.get(id.as_str()).copied())
                .collect();
            (!items.is_empty()).then_some(OutfitCard { outfit, items })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, category: Category, created_at: i64) -> ClothingItem {
        ClothingItem {
            id: id.to_string(),
            image_url: "data:image/png;base64,AAAA".to_string(),
            category,
            description: format!("{} item", id),
            created_at,
            tags: vec![],
        }
    }

    fn outfit(id: &str, item_ids: &[&str]) -> Outfit {
        Outfit {
            id: id.to_string(),
            name: format!("Outfit {}", id),
            style: "Casual".to_string(),
            tags: vec!["Casual".to_string()],
            description: String::new(),
            item_ids: item_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn ids<'a>(view: &[&'a ClothingItem]) -> Vec<&'a str> {
        view.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_wardrobe_view_sorting() {
        let items = vec![
            item("shirt", Category::Tops, 200),
            item("boots", Category::Footwear, 100),
            item("scarf", Category::Accessories, 300),
        ];

        assert_eq!(
            ids(&wardrobe_view(&items, CategoryFilter::All, SortOrder::Newest)),
            ["scarf", "shirt", "boots"]
        );
        assert_eq!(
            ids(&wardrobe_view(&items, CategoryFilter::All, SortOrder::Oldest)),
            ["boots", "shirt", "scarf"]
        );
        assert_eq!(
            ids(&wardrobe_view(&items, CategoryFilter::All, SortOrder::Category)),
            ["scarf", "boots", "shirt"]
        );
    }

    #[test]
    fn test_wardrobe_view_filter() {
        let items = vec![
            item("a", Category::Tops, 1),
            item("b", Category::Bottoms, 2),
            item("c", Category::Tops, 3),
        ];

        let view = wardrobe_view(&items, CategoryFilter::Only(Category::Tops), SortOrder::Newest);
        assert_eq!(ids(&view), ["c", "a"]);

        let view =
            wardrobe_view(&items, CategoryFilter::Only(Category::Outerwear), SortOrder::Newest);
        assert!(view.is_empty());
    }

    #[test]
    fn test_outfit_cards_skip_dangling_ids() {
        let wardrobe = vec![item("a", Category::Tops, 1), item("b", Category::Bottoms, 2)];
        let outfits = vec![
            outfit("o1", &["a", "deleted", "b"]),
            outfit("o2", &["gone", "also-gone"]),
            outfit("o3", &["b"]),
        ];

        let cards = outfit_cards(&outfits, &wardrobe);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].outfit.id, "o1");
        assert_eq!(ids(&cards[0].items), ["a", "b"]);
        assert_eq!(cards[1].outfit.id, "o3");
    }

    #[test]
    fn test_parse_filter_and_sort() {
        assert_eq!("all".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
        assert_eq!(
            "footwear".parse::<CategoryFilter>(),
            Ok(CategoryFilter::Only(Category::Footwear))
        );
        assert!("hats".parse::<CategoryFilter>().is_err());

        assert_eq!("Oldest".parse::<SortOrder>(), Ok(SortOrder::Oldest));
        assert!("random".parse::<SortOrder>().is_err());
    }
}
