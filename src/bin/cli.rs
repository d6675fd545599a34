//! Bugboard CLI Client
//! Mission: Drive the API through the shared client core

use anyhow::Result;
use bugboard_backend::api::bugs::{BugRequest, BugStatus};
use bugboard_backend::api::projects::ProjectRequest;
use bugboard_backend::auth::models::RegisterRequest;
use bugboard_backend::client::ApiClient;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bugboard-cli", about = "Terminal client for the bugboard API")]
struct Cli {
    /// Server base URL
    #[arg(long, env = "BUGBOARD_SERVER", default_value = "http://127.0.0.1:5000")]
    server: String,

    /// Directory holding client state (session file)
    #[arg(long, env = "BUGBOARD_STATE_DIR", default_value = ".bugboard")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session
    Login { email: String, password: String },
    /// Register a new account
    Register {
        name: String,
        email: String,
        password: String,
    },
    /// Clear the persisted session
    Logout,
    /// Show the current session
    Whoami,
    /// List bugs
    Bugs,
    /// Show one bug
    Bug { id: i64 },
    /// File a new bug
    NewBug {
        title: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// Mark a bug resolved
    Resolve { id: i64 },
    /// Delete a bug (manager or admin)
    DeleteBug { id: i64 },
    /// List projects
    Projects,
    /// Create a project (manager or admin)
    NewProject {
        name: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// List users
    Users,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bugboard_backend=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.server, &cli.state_dir)?;

    match cli.command {
        Command::Login { email, password } => {
            let identity = client.login(&email, &password).await?;
            println!(
                "Logged in as {} <{}> (admin: {}, manager: {})",
                identity.name, identity.email, identity.is_admin, identity.is_manager
            );
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let identity = client
                .register(&RegisterRequest {
                    name,
                    email,
                    confirm_password: password.clone(),
                    password,
                })
                .await?;
            println!("Registered and logged in as {}", identity.email);
        }
        Command::Logout => {
            client.logout();
            println!("Logged out");
        }
        Command::Whoami => match client.store.session() {
            Some(session) => println!(
                "{} <{}> (admin: {}, manager: {})",
                session.user.name, session.user.email, session.user.is_admin, session.user.is_manager
            ),
            None => println!("Not logged in"),
        },
        Command::Bugs => {
            let bugs = client.list_bugs().await?;
            if bugs.is_empty() {
                println!("No bugs. Suspicious.");
            }
            for bug in bugs {
                println!("#{:<4} [{}] {}", bug.id, bug.status.as_str(), bug.title);
            }
        }
        Command::Bug { id } => {
            let bug = client.get_bug(id).await?;
            println!("#{} [{}] {}", bug.id, bug.status.as_str(), bug.title);
            if !bug.description.is_empty() {
                println!("{}", bug.description);
            }
            if let Some(assignee) = bug.assigned_to {
                println!("assigned to: {}", assignee);
            }
        }
        Command::NewBug { title, description } => {
            let bug = client
                .create_bug(&BugRequest {
                    title,
                    description,
                    ..Default::default()
                })
                .await?;
            println!("Filed bug #{}", bug.id);
        }
        Command::Resolve { id } => {
            let bug = client.get_bug(id).await?;
            let updated = client
                .update_bug(
                    id,
                    &BugRequest {
                        title: bug.title,
                        description: bug.description,
                        status: Some(BugStatus::Resolved),
                        project_id: bug.project_id,
                        assigned_to: bug.assigned_to,
                    },
                )
                .await?;
            println!("Bug #{} is now {}", updated.id, updated.status.as_str());
        }
        Command::DeleteBug { id } => {
            client.delete_bug(id).await?;
            println!("Deleted bug #{}", id);
        }
        Command::Projects => {
            let projects = client.list_projects().await?;
            for project in projects {
                println!("#{:<4} {}", project.id, project.name);
            }
        }
        Command::NewProject { name, description } => {
            let project = client
                .create_project(&ProjectRequest {
                    name,
                    description,
                    manager_id: None,
                })
                .await?;
            println!("Created project #{}", project.id);
        }
        Command::Users => {
            let users = client.list_users().await?;
            for user in users {
                println!(
                    "{} <{}> (admin: {}, manager: {})",
                    user.name, user.email, user.is_admin, user.is_manager
                );
            }
        }
    }

    Ok(())
}
