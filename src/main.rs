//! Rosterload CLI - provision users and groups into JumpCloud
//!
//! # Main Commands
//!
//! ```bash
//! rosterload sync                  # Full run: groups → users → updates → membership
//! rosterload validate              # Offline validation of the input files
//! ```
//!
//! # Lookup Commands (read-only)
//!
//! ```bash
//! rosterload orgs                  # List organizations for this API key
//! rosterload directories --gsuite  # List linked (G Suite) directories
//! rosterload groups                # List groups
//! rosterload users --limit 50      # List system users
//! rosterload user <id>             # Fetch one user by platform id
//! ```

use clap::{Parser, Subcommand};
use rosterload::sync::{DEFAULT_COMPANY, DEFAULT_EMAIL_DOMAIN, DEFAULT_MFA_EXCLUSION_DAYS};
use rosterload::{
    load_groups, load_mapping, load_membership, load_users, run_sync, DirectoryClient,
    SyncOptions,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rosterload")]
#[command(about = "Provision users and groups into JumpCloud from CSV/JSON rosters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full sync pipeline
    Sync {
        /// Directory holding groups.csv, users.csv, group_membership.csv,
        /// group_mapping.json
        #[arg(long, default_value = "files")]
        files_dir: PathBuf,

        /// Email domain for platform accounts
        #[arg(long, default_value = DEFAULT_EMAIL_DOMAIN)]
        email_domain: String,

        /// Company name carried on detail updates
        #[arg(long, default_value = DEFAULT_COMPANY)]
        company: String,

        /// Days until the MFA exclusion window closes
        #[arg(long, default_value_t = DEFAULT_MFA_EXCLUSION_DAYS)]
        mfa_exclusion_days: i64,

        /// Override the console API base URL
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Validate the input files without touching the network
    Validate {
        /// Directory holding the input files
        #[arg(long, default_value = "files")]
        files_dir: PathBuf,
    },

    /// List organizations for this API key
    Orgs,

    /// List linked external directories
    Directories {
        /// Only G Suite directories
        #[arg(long)]
        gsuite: bool,
    },

    /// List groups
    Groups,

    /// List system users
    Users {
        /// Maximum number of users to return
        #[arg(long, default_value = "100")]
        limit: u32,
    },

    /// Fetch one user by platform id
    User {
        /// Platform user id
        id: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sync {
            files_dir,
            email_domain,
            company,
            mfa_exclusion_days,
            base_url,
        } => {
            cmd_sync(
                SyncOptions {
                    files_dir,
                    email_domain,
                    company,
                    mfa_exclusion_days,
                },
                base_url,
            )
            .await
        }

        Commands::Validate { files_dir } => cmd_validate(&files_dir),

        Commands::Orgs => cmd_orgs().await,

        Commands::Directories { gsuite } => cmd_directories(gsuite).await,

        Commands::Groups => cmd_groups().await,

        Commands::Users { limit } => cmd_users(limit).await,

        Commands::User { id } => cmd_user(&id).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn client(base_url: Option<&str>) -> Result<DirectoryClient, Box<dyn std::error::Error>> {
    let client = DirectoryClient::from_env()?;
    Ok(match base_url {
        Some(url) => client.with_base_url(url),
        None => client,
    })
}

async fn cmd_sync(
    options: SyncOptions,
    base_url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = client(base_url.as_deref())?;

    let report = run_sync(&client, &options).await?;
    report.print_summary();

    if report.has_failures() {
        std::process::exit(1);
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_validate(files_dir: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating input files in {}...", files_dir.display());

    let groups = load_groups(files_dir)?;
    eprintln!("   ✅ groups.csv: {} rows", groups.len());

    let users = load_users(files_dir)?;
    eprintln!("   ✅ users.csv: {} rows", users.len());

    let membership = load_membership(files_dir)?;
    eprintln!("   ✅ group_membership.csv: {} rows", membership.len());

    let mapping = load_mapping(files_dir)?;
    eprintln!("   ✅ group_mapping.json: {} mappings", mapping.groups.len());

    eprintln!("\n✨ All inputs valid");
    Ok(())
}

async fn cmd_orgs() -> Result<(), Box<dyn std::error::Error>> {
    let organizations = client(None)?.list_organizations().await?;

    eprintln!("🏢 {} organization(s):", organizations.len());
    for org in organizations {
        println!("  {} ({})", org.display_name, org.id);
    }
    Ok(())
}

async fn cmd_directories(gsuite_only: bool) -> Result<(), Box<dyn std::error::Error>> {
    let client = client(None)?;
    let directories = if gsuite_only {
        client.list_gsuite_directories().await?
    } else {
        client.list_directories().await?
    };

    eprintln!("📁 {} directory(ies):", directories.len());
    for dir in directories {
        println!("  {} [{}] ({})", dir.name, dir.kind, dir.id);
    }
    Ok(())
}

async fn cmd_groups() -> Result<(), Box<dyn std::error::Error>> {
    let groups = client(None)?.list_groups().await?;

    eprintln!("📦 {} group(s):", groups.len());
    for group in groups {
        println!("  {} ({})", group.name, group.id);
    }
    Ok(())
}

async fn cmd_users(limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let users = client(None)?.list_system_users(limit).await?;

    eprintln!("👥 {} user(s):", users.len());
    for user in users {
        println!(
            "  {} ({} {} <{}>) ({})",
            user.username, user.firstname, user.lastname, user.email, user.id
        );
    }
    Ok(())
}

async fn cmd_user(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let user = client(None)?.get_system_user(id).await?;

    println!("{} ({} {} <{}>)", user.username, user.firstname, user.lastname, user.email);
    Ok(())
}
