//! CLI command implementations.

mod auth;
mod content;
mod shop;

pub use auth::{login, logout, status, verify};
pub use content::{
    home_show, portfolio_list, testimonials_add, testimonials_delete, testimonials_list,
    testimonials_submit,
};
pub use shop::catalog;

use crate::context::App;
use anyhow::Result;
use session_controller::CurrentUser;

/// The signed-in admin, or an error telling the user what is missing.
async fn require_admin(app: &App) -> Result<CurrentUser> {
    let snapshot = app.settled().await?;
    match storefront::admin_from(&snapshot) {
        Ok(user) => Ok(user.clone()),
        Err(_) if snapshot.current_user.is_none() => {
            anyhow::bail!("Not logged in. Run 'inkleaf login <email>' first")
        }
        Err(e) => Err(e.into()),
    }
}
