//! Inkleaf storefront domain: the collection catalog, the cart and the
//! admin-edited site content.
//!
//! Content repositories read and write through [`platform_client::DataStore`]
//! and accept mutations only from an admin [`session_controller::CurrentUser`].

mod access;
mod cart;
mod catalog;
mod error;
mod images;
mod money;
mod pages;
mod portfolio;
mod testimonials;

pub use access::{admin_from, require_admin};
pub use cart::{Cart, CartLine, CheckoutDetails, OrderConfirmation};
pub use catalog::{Catalog, Collection, ALL_CATEGORIES};
pub use error::{CartError, StorefrontError, StorefrontResult};
pub use images::{upload_image, IMAGES_BUCKET};
pub use money::Money;
pub use pages::{
    AboutContent, AboutContentRepository, HomeContent, HomeContentRepository, PageContent,
    PageRepository, TeamMember,
};
pub use portfolio::{
    CollectionCategory, PortfolioDraft, PortfolioItem, PortfolioRepository, CATEGORY_STRUCTURE,
    PORTFOLIO_TABLE,
};
pub use testimonials::{Testimonial, TestimonialDraft, TestimonialRepository, TESTIMONIALS_TABLE};
