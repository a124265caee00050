use clap::{Parser, Subcommand};
use shield_cms::config::{self, CmsConfig};
use shield_cms::content::SiteContent;
use shield_cms::credentials::DeployCredentials;
use shield_cms::gate::AccessGate;
use shield_cms::history::UploadHistory;
use shield_cms::kv::{FileKvStore, KeyValueStore};
use shield_cms::provider::{ContentProvider, use_content};
use shield_cms::site::{self, GalleryFilter};
use shield_cms::store::ContentStore;
use shield_cms::sync::{Deployer, RepoClient};
use shield_cms::upload::UploadSession;
use shield_cms::{export, output};
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "shield-cms")]
#[command(about = "Content manager for the Shield Finishing Services website")]
#[command(long_about = "\
Content manager for the Shield Finishing Services website

Edits are stored locally in <data-dir>/storage.json. Deploying pushes the
generated constants.tsx and gallery page to the site repository, which
triggers the host to rebuild the live site.

Admin commands (content set/reset, credentials, export, deploy) require a
session: run 'shield-cms login <KEY>' first.

Run 'shield-cms gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Data directory (default: $SHIELD_CMS_DATA_DIR or the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: <data-dir>/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Repository credentials given on the command line.
#[derive(clap::Args, Clone, Default)]
struct CredentialArgs {
    /// Access token with contents write permission
    #[arg(long)]
    token: Option<String>,
    /// Repository owner (user or organisation)
    #[arg(long)]
    owner: Option<String>,
    /// Repository name
    #[arg(long)]
    repo: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an admin session
    Login {
        /// Access key
        key: String,
    },
    /// End the admin session
    Logout,
    /// Show session, credential and cache status
    Status,
    /// Inspect or replace site content
    #[command(subcommand)]
    Content(ContentCommand),
    /// Manage cached contact-page uploads
    #[command(subcommand)]
    Uploads(UploadsCommand),
    /// Show or update deploy credentials
    Credentials(CredentialArgs),
    /// Write the project archive (.zip)
    Export {
        /// Output path (default: ./<export.archive_name>)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Push generated sources to the site repository
    Deploy(CredentialArgs),
    /// Render a local HTML preview of the site
    Preview {
        /// Output directory
        #[arg(long, default_value = "preview")]
        output: PathBuf,
        /// Gallery category: All, Painting, Plastering or Commercial
        #[arg(long, default_value = "All")]
        gallery_filter: GalleryFilter,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum ContentCommand {
    /// Summarise the current content
    Show,
    /// Replace all content from a JSON file
    Set {
        /// Content JSON file
        file: PathBuf,
    },
    /// Restore the built-in default content
    Reset,
    /// Print the current content as JSON
    Dump,
}

#[derive(Subcommand)]
enum UploadsCommand {
    /// List cached uploads, most recent first
    List,
    /// Attach an image (max 5 MB by default)
    Add {
        /// Image file
        file: PathBuf,
    },
    /// Remove a cached upload
    Remove {
        /// Upload id
        id: String,
    },
    /// Reuse a cached upload
    Use {
        /// Upload id
        id: String,
    },
}

fn tracing_filter() -> tracing_subscriber::EnvFilter {
    let explicit = env::var("SHIELD_CMS_LOG")
        .or_else(|_| env::var("RUST_LOG"))
        .ok();
    match explicit {
        Some(filter) => tracing_subscriber::EnvFilter::new(filter),
        None => tracing_subscriber::EnvFilter::new("warn"),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let data_dir = config::resolve_data_dir(cli.data_dir)?;
    let cms_config = config::load_config(&data_dir, cli.config.as_deref())?;
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::open(&data_dir)?);
    let gate = AccessGate::new(kv.clone());
    tracing::debug!(data_dir = %data_dir.display(), "storage opened");

    match cli.command {
        Command::Login { key } => {
            gate.authenticate(&key)?;
            println!("Admin session started");
        }
        Command::Logout => {
            gate.logout()?;
            println!("Logged out");
        }
        Command::Status => {
            let creds = DeployCredentials::load(kv.as_ref());
            let uploads = UploadHistory::load(kv.clone()).entries().len();
            output::print_status(gate.is_authenticated(), &data_dir, &creds, uploads);
        }
        Command::Content(cmd) => run_content(cmd, &gate, kv)?,
        Command::Uploads(cmd) => run_uploads(cmd, &cms_config, kv).await?,
        Command::Credentials(args) => {
            gate.require()?;
            let creds = merged_credentials(&args, kv.as_ref())?;
            output::print_credentials(&creds);
        }
        Command::Export { output: path } => {
            gate.require()?;
            let path = path.unwrap_or_else(|| PathBuf::from(&cms_config.export.archive_name));
            let content = ContentStore::load(kv.as_ref());
            let bytes = export::write_archive(&content, &path)?;
            output::print_export_output(&path, bytes);
        }
        Command::Deploy(args) => {
            gate.require()?;
            let creds = merged_credentials(&args, kv.as_ref())?;
            let content = ContentStore::load(kv.as_ref());
            let client = RepoClient::new()?.with_base_url(&cms_config.deploy.api_base_url);
            let (tx, rx) = mpsc::channel();
            let progress = std::thread::spawn(move || {
                for state in rx {
                    output::print_deploy_state(&state);
                }
            });
            let mut deployer =
                Deployer::new(client, cms_config.success_display()).with_events(tx);
            let result = deployer.deploy(&creds, &content).await;
            drop(deployer);
            let _ = progress.join();
            output::print_sync_report(&result?);
        }
        Command::Preview {
            output: dir,
            gallery_filter,
        } => {
            let provider = ContentProvider::new(ContentStore::open(kv));
            let pages = provider.provide(|| site::render_site(&dir, gallery_filter))?;
            output::print_preview_output(&dir, &pages);
        }
        // Printed before storage is opened.
        Command::GenConfig => {}
    }

    Ok(())
}

fn run_content(
    cmd: ContentCommand,
    gate: &AccessGate,
    kv: Arc<dyn KeyValueStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ContentCommand::Show => {
            output::print_content_summary(&ContentStore::load(kv.as_ref()));
        }
        ContentCommand::Dump => {
            let content = ContentStore::load(kv.as_ref());
            println!("{}", serde_json::to_string_pretty(&content)?);
        }
        ContentCommand::Set { file } => {
            gate.require()?;
            let raw = std::fs::read_to_string(&file)?;
            let new_content: SiteContent = serde_json::from_str(&raw)?;
            let provider = ContentProvider::new(ContentStore::open(kv));
            provider.provide(|| use_content().update_all(new_content))?;
            output::print_content_summary(&provider.snapshot());
        }
        ContentCommand::Reset => {
            gate.require()?;
            ContentStore::open(kv).reset()?;
            println!("Content restored to defaults");
        }
    }
    Ok(())
}

async fn run_uploads(
    cmd: UploadsCommand,
    cms_config: &CmsConfig,
    kv: Arc<dyn KeyValueStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut history = UploadHistory::load(kv);
    match cmd {
        UploadsCommand::List => output::print_uploads(history.entries()),
        UploadsCommand::Add { file } => {
            let mut session = UploadSession::new(cms_config.upload_settings());
            println!("Uploading {}...", file.display());
            session.select_file(&file, &mut history).await?;
            output::print_upload_outcome(&session);
        }
        UploadsCommand::Remove { id } => {
            history.remove(&id)?;
            output::print_uploads(history.entries());
        }
        UploadsCommand::Use { id } => {
            let mut session = UploadSession::new(cms_config.upload_settings());
            if session.use_history_image(&history, &id).is_none() {
                return Err(format!("No cached upload with id {id}").into());
            }
            output::print_upload_outcome(&session);
        }
    }
    Ok(())
}

/// Stored credentials with command-line overrides applied and saved back.
fn merged_credentials(
    args: &CredentialArgs,
    kv: &dyn KeyValueStore,
) -> Result<DeployCredentials, Box<dyn std::error::Error>> {
    let creds = DeployCredentials::load(kv).with_overrides(
        args.token.clone(),
        args.owner.clone(),
        args.repo.clone(),
    );
    creds.save(kv)?;
    Ok(creds)
}
