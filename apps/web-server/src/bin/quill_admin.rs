//! quill-admin: bootstrap administrators from the command line.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use quill_core::services::AdminUserCreate;
use web_server::AppState;
use web_server::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "quill-admin", version, about = "Quill administration tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new user with the admin flag set
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// Falls back to QUILL_ADMIN_PASSWORD so it stays out of shell history
        #[arg(long, env = "QUILL_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Grant the admin flag to an existing user
    Promote {
        /// Email address of the user
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    if config.database.is_none() {
        bail!("DATABASE_URL must be set; changes to the in-memory store would be lost");
    }
    let state = AppState::new(&config).await;
    let admin = state.user_admin();

    match cli.command {
        Commands::CreateAdmin {
            username,
            email,
            password,
        } => {
            let user = admin
                .create(AdminUserCreate {
                    username,
                    email,
                    password2: password.clone(),
                    password,
                    about_me: None,
                    admin: true,
                })
                .await
                .context("could not create admin")?;
            println!("Created admin {} ({})", user.username, user.id);
        }
        Commands::Promote { email } => {
            let user = admin
                .promote(&email)
                .await
                .with_context(|| format!("could not promote {email}"))?;
            println!("{} is now an admin", user.username);
        }
    }

    Ok(())
}
