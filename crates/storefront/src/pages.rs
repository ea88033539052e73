//! Editable copy of the home and about pages.
//!
//! Each page is a single row in its own table. Until an admin saves the page
//! for the first time the table is empty and the public page shows its
//! built-in copy.

use crate::access::require_admin;
use crate::StorefrontResult;
use platform_client::{DataStore, Filter, PlatformError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use session_controller::CurrentUser;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A page stored as one row.
pub trait PageContent: Serialize + DeserializeOwned + Send + Sync {
    const TABLE: &'static str;

    fn id(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub hero_heading: String,
    pub hero_subheading: String,
    pub hero_cta_text: String,
    pub process_heading: String,
    pub process_description: String,
    pub unforgettable_heading: String,
    pub unforgettable_description: String,
    pub unforgettable_image: String,
    pub unforgettable_button_text: String,
    pub cta_heading: String,
    pub cta_description: String,
    pub cta_button_text: String,
}

impl PageContent for HomeContent {
    const TABLE: &'static str = "home_content";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub title: String,
    pub image: String,
    pub bio: String,
}

/// About page; columns are camelCase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AboutContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub heading: String,
    pub tagline: String,
    pub main_content: String,
    pub founder_image: String,
    pub founder_name: String,
    pub founder_title: String,
    pub founder_bio: String,
    pub team_members: Vec<TeamMember>,
}

impl PageContent for AboutContent {
    const TABLE: &'static str = "about_content";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Loads and saves the single row of a [`PageContent`] table.
pub struct PageRepository<T> {
    data: Arc<dyn DataStore>,
    _page: PhantomData<fn() -> T>,
}

pub type HomeContentRepository = PageRepository<HomeContent>;
pub type AboutContentRepository = PageRepository<AboutContent>;

impl<T: PageContent> PageRepository<T> {
    pub fn new(data: Arc<dyn DataStore>) -> Self {
        Self {
            data,
            _page: PhantomData,
        }
    }

    /// The stored page, or `None` before it was first saved.
    pub async fn load(&self) -> StorefrontResult<Option<T>> {
        match self.data.select_single(T::TABLE, &Filter::new()).await {
            Ok(row) => Ok(Some(serde_json::from_value(row)?)),
            Err(PlatformError::NoRows) => {
                debug!(table = T::TABLE, "no page content yet");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Page for public display; errors are logged and yield `None`.
    pub async fn load_public(&self) -> Option<T> {
        self.load().await.unwrap_or_else(|e| {
            warn!(table = T::TABLE, error = %e, "failed to load page content");
            None
        })
    }

    /// Insert the page when absent, otherwise update the existing row.
    pub async fn save(&self, actor: &CurrentUser, content: &T) -> StorefrontResult<T> {
        require_admin(actor)?;

        let existing_id = match content.id() {
            Some(id) => Some(id.to_string()),
            None => self
                .load()
                .await?
                .and_then(|stored| stored.id().map(str::to_string)),
        };

        let mut row = serde_json::to_value(content)?;
        if let Value::Object(fields) = &mut row {
            fields.remove("id");
            fields.remove("created_at");
        }

        let saved = match existing_id {
            Some(id) => {
                let saved = self.data.update(T::TABLE, &Filter::by_id(&id), row).await?;
                info!(table = T::TABLE, id = %id, "page content updated");
                saved
            }
            None => {
                let saved = self.data.insert(T::TABLE, row).await?;
                info!(table = T::TABLE, "page content created");
                saved
            }
        };
        Ok(serde_json::from_value(saved)?)
    }
}
