//! Site content commands.

use super::require_admin;
use crate::context::App;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use storefront::{HomeContentRepository, PortfolioRepository, TestimonialDraft, TestimonialRepository};

pub async fn testimonials_list(app: &App, featured: bool) -> Result<()> {
    let repo = TestimonialRepository::new(app.data.clone());
    let testimonials = if featured {
        repo.list_featured().await?
    } else {
        repo.list().await?
    };

    if app.format == OutputFormat::Json {
        output::json(&testimonials);
        return Ok(());
    }

    if testimonials.is_empty() {
        println!("No testimonials yet.");
        return Ok(());
    }

    output::heading("Testimonials");
    for t in &testimonials {
        let stars = "*".repeat(usize::from(t.rating));
        let featured = if t.is_featured { " (featured)" } else { "" };
        println!("  {} - {}, {} {}{}", t.id, t.name, t.title, stars, featured);
        println!("    \"{}\"", t.content);
    }
    Ok(())
}

pub async fn testimonials_add(app: &App, draft: &TestimonialDraft) -> Result<()> {
    let admin = require_admin(app).await?;
    let created = TestimonialRepository::new(app.data.clone())
        .create(&admin, draft)
        .await?;

    match app.format {
        OutputFormat::Json => output::json(&created),
        OutputFormat::Text => println!("Testimonial added: {}", created.id),
    }
    Ok(())
}

pub async fn testimonials_submit(app: &App, draft: &TestimonialDraft) -> Result<()> {
    let submitted = TestimonialRepository::new(app.data.clone())
        .submit_public(draft)
        .await?;

    match app.format {
        OutputFormat::Json => output::json(&submitted),
        OutputFormat::Text => app.format.success("Thank you! Your testimonial was submitted."),
    }
    Ok(())
}

pub async fn testimonials_delete(app: &App, id: &str) -> Result<()> {
    let admin = require_admin(app).await?;
    TestimonialRepository::new(app.data.clone())
        .delete(&admin, id)
        .await?;
    app.format.success(&format!("Testimonial {} deleted", id));
    Ok(())
}

pub async fn portfolio_list(app: &App, category: Option<&str>) -> Result<()> {
    let repo = PortfolioRepository::new(app.data.clone());
    let items = match category {
        Some(main) => repo.list_in(main).await?,
        None => repo.list().await?,
    };

    if app.format == OutputFormat::Json {
        output::json(&items);
        return Ok(());
    }

    if items.is_empty() {
        println!("No portfolio items.");
        return Ok(());
    }

    output::heading("Portfolio");
    for item in &items {
        println!("  {:<28} {}", item.title, item.category);
    }
    Ok(())
}

pub async fn home_show(app: &App) -> Result<()> {
    require_admin(app).await?;
    let home = HomeContentRepository::new(app.data.clone()).load().await?;

    match (app.format, home) {
        (OutputFormat::Json, home) => output::json(&home),
        (OutputFormat::Text, None) => println!("Home page has not been edited yet."),
        (OutputFormat::Text, Some(home)) => {
            output::heading("Home page");
            output::row("Hero", &home.hero_heading);
            output::row("Subheading", &home.hero_subheading);
            output::row("Hero button", &home.hero_cta_text);
            output::row("Process", &home.process_heading);
            output::row("Feature", &home.unforgettable_heading);
            output::row("Call to action", &home.cta_heading);
        }
    }
    Ok(())
}
