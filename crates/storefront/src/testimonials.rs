//! Customer testimonials.

use crate::access::require_admin;
use crate::{StorefrontError, StorefrontResult};
use chrono::{DateTime, NaiveDate, Utc};
use platform_client::{DataStore, Filter, PlatformError};
use serde::{Deserialize, Serialize};
use session_controller::CurrentUser;
use std::sync::Arc;
use tracing::{info, warn};

pub const TESTIMONIALS_TABLE: &str = "testimonials";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub rating: u8,
    /// Day the testimonial was given, `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields an admin edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestimonialDraft {
    pub name: String,
    pub title: String,
    pub company: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub rating: u8,
    pub date: String,
    pub is_featured: bool,
}

impl Default for TestimonialDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: String::new(),
            company: None,
            content: String::new(),
            image_url: None,
            rating: 5,
            date: String::new(),
            is_featured: false,
        }
    }
}

impl TestimonialDraft {
    pub fn validate(&self) -> StorefrontResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("title", &self.title),
            ("content", &self.content),
            ("date", &self.date),
        ] {
            if value.trim().is_empty() {
                return Err(StorefrontError::required(field));
            }
        }
        if !(1..=5).contains(&self.rating) {
            return Err(StorefrontError::Validation {
                field: "rating",
                reason: format!("{} is outside 1..=5", self.rating),
            });
        }
        if NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").is_err() {
            return Err(StorefrontError::Validation {
                field: "date",
                reason: format!("{:?} is not YYYY-MM-DD", self.date),
            });
        }
        Ok(())
    }

    fn to_row(&self) -> StorefrontResult<serde_json::Value> {
        let mut draft = self.clone();
        draft.date = draft.date.trim().to_string();
        Ok(serde_json::to_value(draft)?)
    }
}

pub struct TestimonialRepository {
    data: Arc<dyn DataStore>,
}

impl TestimonialRepository {
    pub fn new(data: Arc<dyn DataStore>) -> Self {
        Self { data }
    }

    fn decode(rows: Vec<serde_json::Value>) -> StorefrontResult<Vec<Testimonial>> {
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(StorefrontError::from))
            .collect()
    }

    /// Every testimonial, newest first.
    pub async fn list(&self) -> StorefrontResult<Vec<Testimonial>> {
        let rows = self
            .data
            .select(
                TESTIMONIALS_TABLE,
                &Filter::new().order_by("created_at", false),
            )
            .await?;
        Self::decode(rows)
    }

    pub async fn list_featured(&self) -> StorefrontResult<Vec<Testimonial>> {
        let rows = self
            .data
            .select(
                TESTIMONIALS_TABLE,
                &Filter::new()
                    .eq("is_featured", true)
                    .order_by("created_at", false),
            )
            .await?;
        Self::decode(rows)
    }

    /// Listing for public pages: errors are logged and yield nothing.
    pub async fn list_public(&self) -> Vec<Testimonial> {
        self.list().await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to load testimonials");
            Vec::new()
        })
    }

    pub async fn create(
        &self,
        actor: &CurrentUser,
        draft: &TestimonialDraft,
    ) -> StorefrontResult<Testimonial> {
        require_admin(actor)?;
        draft.validate()?;
        let row = self.data.insert(TESTIMONIALS_TABLE, draft.to_row()?).await?;
        let created: Testimonial = serde_json::from_value(row)?;
        info!(id = %created.id, "testimonial created");
        Ok(created)
    }

    /// Visitor-submitted testimonial. Anyone may submit; submissions are
    /// never featured until an admin edits them.
    pub async fn submit_public(&self, draft: &TestimonialDraft) -> StorefrontResult<Testimonial> {
        draft.validate()?;
        let mut draft = draft.clone();
        draft.is_featured = false;
        let mut row = draft.to_row()?;
        if let serde_json::Value::Object(fields) = &mut row {
            fields.insert("created_at".into(), serde_json::to_value(Utc::now())?);
        }
        let row = self.data.insert(TESTIMONIALS_TABLE, row).await?;
        let submitted: Testimonial = serde_json::from_value(row)?;
        info!(id = %submitted.id, "testimonial submitted");
        Ok(submitted)
    }

    pub async fn update(
        &self,
        actor: &CurrentUser,
        id: &str,
        draft: &TestimonialDraft,
    ) -> StorefrontResult<Testimonial> {
        require_admin(actor)?;
        draft.validate()?;
        let row = self
            .data
            .update(TESTIMONIALS_TABLE, &Filter::by_id(id), draft.to_row()?)
            .await
            .map_err(|e| match e {
                PlatformError::NoRows => StorefrontError::NotFound {
                    kind: "testimonial",
                    id: id.to_string(),
                },
                other => other.into(),
            })?;
        info!(id, "testimonial updated");
        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete(&self, actor: &CurrentUser, id: &str) -> StorefrontResult<()> {
        require_admin(actor)?;
        self.data
            .delete(TESTIMONIALS_TABLE, &Filter::by_id(id))
            .await?;
        info!(id, "testimonial deleted");
        Ok(())
    }
}
