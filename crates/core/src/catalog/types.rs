#![allow(missing_docs)]

//! Records returned by the catalog service.

use serde::{Deserialize, Deserializer};

use crate::models::GameListItem;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Total number of matches across all pages.
    #[serde(default)]
    pub count: u64,
    /// URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page, if any.
    #[serde(default)]
    pub previous: Option<String>,
    /// Entries on this page.
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Whether the service reported a following page.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Results<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub(crate) results: Vec<T>,
}

/// Small `{id, name, slug}` reference used for genres, developers and the like.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedRef {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Platform entry nested inside a game record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GamePlatform {
    pub platform: NamedRef,
    #[serde(default)]
    pub released_at: Option<String>,
}

/// Game as it appears in search and trending listings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub image_background: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub metacritic: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub platforms: Vec<GamePlatform>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<NamedRef>,
}

/// Full game record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameDetails {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description_raw: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub image_background: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub metacritic: Option<u32>,
    #[serde(default)]
    pub playtime: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub platforms: Vec<GamePlatform>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<NamedRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub developers: Vec<NamedRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub publishers: Vec<NamedRef>,
}

/// Game screenshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Screenshot {
    pub id: u64,
    pub image: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Video sources for a trailer, keyed by resolution.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrailerSources {
    #[serde(rename = "480", default)]
    pub low: Option<String>,
    #[serde(default)]
    pub max: Option<String>,
}

/// Game trailer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trailer {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub data: TrailerSources,
}

impl Trailer {
    /// Best available video URL.
    pub fn best_source(&self) -> Option<&str> {
        self.data.max.as_deref().or(self.data.low.as_deref())
    }
}

/// Platform (console) as it appears in search listings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Platform {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub games_count: Option<u64>,
    #[serde(default)]
    pub image_background: Option<String>,
    #[serde(default)]
    pub year_start: Option<i32>,
    #[serde(default)]
    pub year_end: Option<i32>,
}

/// Full platform record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlatformDetails {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub games_count: Option<u64>,
    #[serde(default)]
    pub image_background: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub year_start: Option<i32>,
    #[serde(default)]
    pub year_end: Option<i32>,
}

impl From<&GameSummary> for GameListItem {
    fn from(game: &GameSummary) -> Self {
        Self {
            id: game.id,
            name: game.name.clone(),
            image: game
                .background_image
                .clone()
                .or_else(|| game.image_background.clone()),
            rating: game.rating,
            released: game.released.clone(),
        }
    }
}

impl From<&GameDetails> for GameListItem {
    fn from(game: &GameDetails) -> Self {
        Self {
            id: game.id,
            name: game.name.clone(),
            image: game
                .background_image
                .clone()
                .or_else(|| game.image_background.clone()),
            rating: game.rating,
            released: game.released.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn parses_search_page_with_nulls() -> Result<()> {
        let page: Page<GameSummary> = serde_json::from_str(
            r#"{
                "count": 2,
                "next": "https://api.rawg.io/api/games?page=2",
                "previous": null,
                "results": [
                    {"id": 3498, "name": "Grand Theft Auto V", "released": "2013-09-17",
                     "background_image": "https://media.example/gta.jpg", "rating": 4.47,
                     "metacritic": 92, "platforms": [{"platform": {"id": 4, "name": "PC", "slug": "pc"}}],
                     "genres": [{"id": 4, "name": "Action", "slug": "action"}]},
                    {"id": 1, "name": "Obscure", "platforms": null, "rating": null}
                ]
            }"#,
        )?;
        assert!(page.has_next());
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].platforms[0].platform.name, "PC");
        assert!(page.results[1].platforms.is_empty());
        assert_eq!(page.results[1].rating, None);
        Ok(())
    }

    #[test]
    fn snapshot_prefers_background_image() {
        let mut game = GameSummary {
            id: 101,
            name: "Chrono Trigger".into(),
            slug: None,
            released: Some("1995-03-11".into()),
            background_image: None,
            image_background: Some("https://media.example/fallback.jpg".into()),
            rating: Some(4.6),
            metacritic: None,
            platforms: Vec::new(),
            genres: Vec::new(),
        };

        let item = GameListItem::from(&game);
        assert_eq!(item.image.as_deref(), Some("https://media.example/fallback.jpg"));
        assert_eq!(item.rating, Some(4.6));

        game.background_image = Some("https://media.example/cover.jpg".into());
        let item = GameListItem::from(&game);
        assert_eq!(item.image.as_deref(), Some("https://media.example/cover.jpg"));
        assert_eq!(item.released.as_deref(), Some("1995-03-11"));
    }

    #[test]
    fn trailer_prefers_max_source() -> Result<()> {
        let trailer: Trailer = serde_json::from_str(
            r#"{"id": 9, "name": "Launch", "preview": "p.jpg", "data": {"480": "low.mp4", "max": "max.mp4"}}"#,
        )?;
        assert_eq!(trailer.best_source(), Some("max.mp4"));

        let trailer: Trailer = serde_json::from_str(r#"{"id": 9, "name": "Teaser"}"#)?;
        assert_eq!(trailer.best_source(), None);
        Ok(())
    }
}
