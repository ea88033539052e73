//! Authentication commands.

use crate::context::App;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use platform_client::memory::DEFAULT_ACCEPTED_CODE;
use session_controller::{admin_guard, SessionSnapshot};

/// Request a code for `email`, prompt for it and verify it.
pub async fn login(app: &App, email: &str) -> Result<()> {
    let snapshot = app.settled().await?;
    if let Some(user) = &snapshot.current_user {
        if user.email.eq_ignore_ascii_case(email.trim()) {
            app.format.success(&format!("Already logged in as {}", user.email));
            return Ok(());
        }
    }

    app.session.request_code(email).await?;
    let pending = app
        .session
        .snapshot()
        .pending_email
        .unwrap_or_else(|| email.to_string());
    if app.format == OutputFormat::Text {
        println!("A sign-in code was sent to {}", pending);
        if app.offline {
            println!("(offline: the code is {})", DEFAULT_ACCEPTED_CODE);
        }
    }

    let code = rpassword::prompt_password("Code: ")?;
    if code.trim().is_empty() {
        app.format.error("Code is required");
        return Ok(());
    }

    verify_and_report(app, &pending, &code).await
}

/// Verify a code without prompting.
pub async fn verify(app: &App, email: &str, code: &str) -> Result<()> {
    app.settled().await?;
    verify_and_report(app, email, code).await
}

async fn verify_and_report(app: &App, email: &str, code: &str) -> Result<()> {
    app.session.verify_code(email, code).await?;
    let snapshot = app.session.snapshot();
    match &snapshot.current_user {
        Some(user) => {
            app.format.success(&format!("Logged in as {}", user.email));
            Ok(())
        }
        None => anyhow::bail!("Login did not complete"),
    }
}

/// Sign out remotely and clear local storage.
pub async fn logout(app: &App) -> Result<()> {
    app.settled().await?;
    app.session.sign_out().await?;
    app.format.success("Logged out");
    Ok(())
}

/// Show the restored session.
pub async fn status(app: &App) -> Result<()> {
    let snapshot = app.settled().await?;
    match app.format {
        OutputFormat::Json => output::json(&serde_json::json!({
            "session": snapshot,
            "admin_guard": admin_guard(&snapshot),
            "offline": app.offline,
        })),
        OutputFormat::Text => print_status(app, &snapshot),
    }
    Ok(())
}

fn print_status(app: &App, snapshot: &SessionSnapshot) {
    output::heading("Session");
    output::row("Phase", snapshot.phase.as_str());
    match &snapshot.current_user {
        Some(user) => {
            output::row("Email", &user.email);
            output::row("Name", &user.display_name);
            output::row("Admin", if user.is_admin { "yes" } else { "no" });
        }
        None => output::row("User", "not logged in"),
    }
    if let Some(email) = &snapshot.pending_email {
        output::row("Code sent to", email);
    }
    if app.offline {
        output::row("Platform", "offline");
    } else {
        let project = app
            .config
            .project_ref()
            .unwrap_or_else(|_| app.config.platform.url.clone());
        output::row("Platform", &project);
    }
}
