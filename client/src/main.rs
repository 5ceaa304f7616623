use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use client::ApiClient;
use client::forms::{LoginForm, RegisterForm, ReviewForm};
use client::handlers;

/// Command-line driver for the review-service form handlers.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Base URL of the review service.
    #[arg(long, default_value = "http://localhost:5000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with an email and password.
    Login { email: String, password: String },
    /// Register a new account; the activation link arrives by mail.
    Register { email: String, password: String },
    /// Submit a review.  Rating and price values cross as entered; the
    /// server enforces the ranges.
    Review {
        #[arg(long)]
        food_name: String,
        #[arg(long)]
        restaurant_name: String,
        #[arg(long)]
        food_price: String,
        #[arg(long)]
        service_rating: String,
        #[arg(long)]
        food_rating: String,
        #[arg(long)]
        recommend_rating: String,
        #[arg(long, default_value = "")]
        descriptive_tags: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let api = ApiClient::new(args.server);

    let redirect = match args.command {
        Command::Login { email, password } => {
            let status = handlers::handle_login_submit(&api, LoginForm { email, password }).await?;
            status.redirect()
        }
        Command::Register { email, password } => {
            let status =
                handlers::handle_register_submit(&api, RegisterForm { email, password }).await?;
            status.redirect()
        }
        Command::Review {
            food_name,
            restaurant_name,
            food_price,
            service_rating,
            food_rating,
            recommend_rating,
            descriptive_tags,
        } => {
            let form = ReviewForm {
                food_name,
                restaurant_name,
                food_price,
                service_rating,
                food_rating,
                recommend_rating,
                descriptive_tags,
            };
            let status = handlers::handle_review_submit(&api, form).await?;
            status.redirect()
        }
    };

    // A browser would navigate; the CLI reports where it would have gone.
    if let Some(target) = redirect {
        println!("-> {}", target);
    }

    Ok(())
}
