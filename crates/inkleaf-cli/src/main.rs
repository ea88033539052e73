//! Inkleaf CLI - sign in to the storefront and manage its content.

mod commands;
mod context;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inkleaf CLI - Sign in with an emailed code and manage the storefront.
#[derive(Parser)]
#[command(name = "inkleaf")]
#[command(about = "Inkleaf CLI for storefront sign-in and content management")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "INKLEAF_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Directory for config, local storage and logs (default: ~/.inkleaf)
    #[arg(long, env = "INKLEAF_HOME", global = true)]
    base_dir: Option<PathBuf>,

    /// Use in-process services instead of the hosted platform
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with a one-time code sent by email
    Login {
        /// Email address
        email: String,
    },

    /// Verify a code sent by an earlier login
    Verify {
        /// Email address the code was sent to
        email: String,
        /// The one-time code
        code: String,
    },

    /// Sign out and clear local storage
    Logout,

    /// Show the current session
    Status,

    /// List invitation collections
    Catalog {
        /// Only show this style category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Manage testimonials
    Testimonials {
        #[command(subcommand)]
        command: TestimonialCommands,
    },

    /// Browse the portfolio
    Portfolio {
        #[command(subcommand)]
        command: PortfolioCommands,
    },

    /// Home page content
    Home {
        #[command(subcommand)]
        command: HomeCommands,
    },
}

#[derive(Subcommand)]
enum TestimonialCommands {
    /// List testimonials, newest first
    List {
        /// Only featured testimonials
        #[arg(long)]
        featured: bool,
    },
    /// Add a testimonial (admin)
    Add {
        /// Customer name
        #[arg(long)]
        name: String,
        /// Customer title, e.g. "Bride"
        #[arg(long)]
        title: String,
        /// Testimonial text
        #[arg(long)]
        content: String,
        /// Rating from 1 to 5
        #[arg(long, default_value = "5")]
        rating: u8,
        /// Date given, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Company name
        #[arg(long)]
        company: Option<String>,
        /// Show on the home page
        #[arg(long)]
        featured: bool,
    },
    /// Submit your own testimonial (no sign-in needed)
    Submit {
        /// Your name
        #[arg(long)]
        name: String,
        /// Your title, e.g. "Bride"
        #[arg(long)]
        title: String,
        /// Testimonial text
        #[arg(long)]
        content: String,
        /// Rating from 1 to 5
        #[arg(long, default_value = "5")]
        rating: u8,
        /// Company name
        #[arg(long)]
        company: Option<String>,
    },
    /// Delete a testimonial (admin)
    Delete {
        /// Testimonial ID
        id: String,
    },
}

#[derive(Subcommand)]
enum PortfolioCommands {
    /// List portfolio items, newest first
    List {
        /// Only this main category (Wedding, Corporate, Personal, Digital)
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[derive(Subcommand)]
enum HomeCommands {
    /// Show the stored home page copy (admin)
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    let result = run(cli).await;

    if let Err(e) = result {
        format.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let app = context::App::connect(context::Options {
        base_dir: cli.base_dir,
        log_level: cli.log_level,
        offline: cli.offline,
        format: cli.format,
    })?;

    let result = match cli.command {
        Commands::Login { email } => commands::login(&app, &email).await,
        Commands::Verify { email, code } => commands::verify(&app, &email, &code).await,
        Commands::Logout => commands::logout(&app).await,
        Commands::Status => commands::status(&app).await,
        Commands::Catalog { category } => commands::catalog(&app, category.as_deref()),
        Commands::Testimonials { command } => match command {
            TestimonialCommands::List { featured } => {
                commands::testimonials_list(&app, featured).await
            }
            TestimonialCommands::Add {
                name,
                title,
                content,
                rating,
                date,
                company,
                featured,
            } => {
                let draft = storefront::TestimonialDraft {
                    name,
                    title,
                    company,
                    content,
                    image_url: None,
                    rating,
                    date: date.unwrap_or_else(today),
                    is_featured: featured,
                };
                commands::testimonials_add(&app, &draft).await
            }
            TestimonialCommands::Submit {
                name,
                title,
                content,
                rating,
                company,
            } => {
                let draft = storefront::TestimonialDraft {
                    name,
                    title,
                    company,
                    content,
                    image_url: None,
                    rating,
                    date: today(),
                    is_featured: false,
                };
                commands::testimonials_submit(&app, &draft).await
            }
            TestimonialCommands::Delete { id } => commands::testimonials_delete(&app, &id).await,
        },
        Commands::Portfolio { command } => match command {
            PortfolioCommands::List { category } => {
                commands::portfolio_list(&app, category.as_deref()).await
            }
        },
        Commands::Home { command } => match command {
            HomeCommands::Show => commands::home_show(&app).await,
        },
    };

    app.session.shutdown();
    result
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}
