//! Portfolio of past work, grouped as `"<Main> > <Sub>"` categories.

use crate::access::require_admin;
use crate::{StorefrontError, StorefrontResult};
use chrono::{DateTime, Utc};
use platform_client::{DataStore, Filter, PlatformError};
use serde::{Deserialize, Serialize};
use session_controller::CurrentUser;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

pub const PORTFOLIO_TABLE: &str = "portfolio_items";

const SEPARATOR: &str = " > ";

/// Main categories and their subcategories, as offered in the admin panel.
pub const CATEGORY_STRUCTURE: &[(&str, &[&str])] = &[
    (
        "Wedding",
        &[
            "Invitations",
            "Save the Date",
            "Thank You Cards",
            "Menu Cards",
            "Programs",
            "Place Cards",
        ],
    ),
    (
        "Corporate",
        &[
            "Business Cards",
            "Letterheads",
            "Brochures",
            "Presentations",
            "Annual Reports",
            "Event Materials",
        ],
    ),
    (
        "Personal",
        &[
            "Birthday Invitations",
            "Anniversary Cards",
            "Holiday Cards",
            "Graduation",
            "Baby Shower",
            "Personal Stationery",
        ],
    ),
    (
        "Digital",
        &[
            "Social Media Graphics",
            "Email Templates",
            "Web Banners",
            "Digital Invitations",
            "Instagram Stories",
            "Logo Design",
        ],
    ),
];

/// A validated portfolio category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionCategory {
    main: &'static str,
    sub: &'static str,
}

impl CollectionCategory {
    /// Look up `main > sub`, ignoring case.
    pub fn new(main: &str, sub: &str) -> StorefrontResult<Self> {
        let invalid = |reason: String| StorefrontError::Validation {
            field: "category",
            reason,
        };
        let &(main, subs) = CATEGORY_STRUCTURE
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(main.trim()))
            .ok_or_else(|| invalid(format!("unknown main category {:?}", main.trim())))?;
        let sub = subs
            .iter()
            .copied()
            .find(|name| name.eq_ignore_ascii_case(sub.trim()))
            .ok_or_else(|| invalid(format!("{:?} is not a {main} subcategory", sub.trim())))?;
        Ok(Self { main, sub })
    }

    pub fn main(&self) -> &'static str {
        self.main
    }

    pub fn sub(&self) -> &'static str {
        self.sub
    }
}

impl FromStr for CollectionCategory {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (main, sub) = s.split_once(SEPARATOR.trim()).ok_or_else(|| {
            StorefrontError::Validation {
                field: "category",
                reason: format!("expected \"<Main> > <Sub>\", got {s:?}"),
            }
        })?;
        Self::new(main, sub)
    }
}

impl fmt::Display for CollectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.main, self.sub)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image: String,
    /// Stored text; older rows may predate the two-level format.
    pub category: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PortfolioItem {
    pub fn parsed_category(&self) -> Option<CollectionCategory> {
        self.category.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioDraft {
    pub title: String,
    pub description: Option<String>,
    pub image: String,
    pub category: CollectionCategory,
}

impl PortfolioDraft {
    pub fn validate(&self) -> StorefrontResult<()> {
        if self.title.trim().is_empty() {
            return Err(StorefrontError::required("title"));
        }
        if self.image.trim().is_empty() {
            return Err(StorefrontError::required("image"));
        }
        Ok(())
    }

    fn to_row(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title.trim(),
            "description": self.description,
            "image": self.image.trim(),
            "category": self.category.to_string(),
        })
    }
}

pub struct PortfolioRepository {
    data: Arc<dyn DataStore>,
}

impl PortfolioRepository {
    pub fn new(data: Arc<dyn DataStore>) -> Self {
        Self { data }
    }

    /// Items newest first.
    pub async fn list(&self) -> StorefrontResult<Vec<PortfolioItem>> {
        self.data
            .select(PORTFOLIO_TABLE, &Filter::new().order_by("created_at", false))
            .await?
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(StorefrontError::from))
            .collect()
    }

    /// Items under one main category, newest first.
    pub async fn list_in(&self, main: &str) -> StorefrontResult<Vec<PortfolioItem>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|item| {
                item.parsed_category()
                    .is_some_and(|c| c.main().eq_ignore_ascii_case(main))
            })
            .collect())
    }

    pub async fn list_public(&self) -> Vec<PortfolioItem> {
        self.list().await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to load portfolio");
            Vec::new()
        })
    }

    pub async fn create(
        &self,
        actor: &CurrentUser,
        draft: &PortfolioDraft,
    ) -> StorefrontResult<PortfolioItem> {
        require_admin(actor)?;
        draft.validate()?;
        let row = self.data.insert(PORTFOLIO_TABLE, draft.to_row()).await?;
        let item: PortfolioItem = serde_json::from_value(row)?;
        info!(id = %item.id, category = %draft.category, "portfolio item created");
        Ok(item)
    }

    pub async fn update(
        &self,
        actor: &CurrentUser,
        id: &str,
        draft: &PortfolioDraft,
    ) -> StorefrontResult<PortfolioItem> {
        require_admin(actor)?;
        draft.validate()?;
        let row = self
            .data
            .update(PORTFOLIO_TABLE, &Filter::by_id(id), draft.to_row())
            .await
            .map_err(|e| match e {
                PlatformError::NoRows => StorefrontError::NotFound {
                    kind: "portfolio item",
                    id: id.to_string(),
                },
                other => other.into(),
            })?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete(&self, actor: &CurrentUser, id: &str) -> StorefrontResult<()> {
        require_admin(actor)?;
        self.data.delete(PORTFOLIO_TABLE, &Filter::by_id(id)).await?;
        info!(id, "portfolio item deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::tests::{admin, member};
    use platform_client::memory::MemoryDataStore;
    use serde_json::json;

    fn draft(category: &str) -> PortfolioDraft {
        PortfolioDraft {
            title: "Garden Suite".to_string(),
            description: None,
            image: "https://cdn.inkleaf.studio/garden.png".to_string(),
            category: category.parse().unwrap(),
        }
    }

    #[test]
    fn test_category_parse_and_format() {
        let category: CollectionCategory = "wedding > save the date".parse().unwrap();
        assert_eq!(category.main(), "Wedding");
        assert_eq!(category.to_string(), "Wedding > Save the Date");

        assert!("Wedding".parse::<CollectionCategory>().is_err());
        assert!("Wedding > Logo Design".parse::<CollectionCategory>().is_err());
        assert!("Garden > Invitations".parse::<CollectionCategory>().is_err());
    }

    #[tokio::test]
    async fn test_create_and_filter_by_main() {
        let data = Arc::new(MemoryDataStore::new());
        let portfolio = PortfolioRepository::new(data.clone());
        portfolio
            .create(&admin(), &draft("Wedding > Invitations"))
            .await
            .unwrap();
        portfolio
            .create(&admin(), &draft("Digital > Web Banners"))
            .await
            .unwrap();
        data.seed(
            PORTFOLIO_TABLE,
            json!({ "id": "legacy", "title": "Old", "image": "x", "category": "Birthday" }),
        );

        assert_eq!(portfolio.list().await.unwrap().len(), 3);
        let weddings = portfolio.list_in("wedding").await.unwrap();
        assert_eq!(weddings.len(), 1);
        assert_eq!(weddings[0].category, "Wedding > Invitations");
    }

    #[tokio::test]
    async fn test_mutations_require_admin() {
        let portfolio = PortfolioRepository::new(Arc::new(MemoryDataStore::new()));
        assert!(matches!(
            portfolio
                .create(&member(), &draft("Personal > Graduation"))
                .await,
            Err(StorefrontError::Forbidden)
        ));
        assert!(matches!(
            portfolio.delete(&member(), "x").await,
            Err(StorefrontError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected() {
        let portfolio = PortfolioRepository::new(Arc::new(MemoryDataStore::new()));
        let mut bad = draft("Corporate > Brochures");
        bad.title = "  ".to_string();
        assert!(matches!(
            portfolio.create(&admin(), &bad).await,
            Err(StorefrontError::Validation { field: "title", .. })
        ));
    }
}
