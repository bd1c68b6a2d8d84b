//! peerlink daemon. Runs the Discord bot or administers the identity store.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;

use peerlink_directory::Credentials;
use peerlink_discord::{Bot, BotConfig, Secrets};
use peerlink_store::IdentityStore;
use peerlink_store_lmdb::{check_data_dir, LmdbEnvironment};
use peerlink_types::PlatformUserId;
use peerlink_utils::LogFormat;

#[derive(Parser)]
#[command(name = "peerlink-daemon", about = "Links Discord members to School 21 accounts")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "PEERLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the identity store.
    #[arg(long, env = "PEERLINK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Port for the interactions endpoint.
    #[arg(long, env = "PEERLINK_PORT")]
    port: Option<u16>,

    /// Log format: "human" or "json".
    #[arg(long, env = "PEERLINK_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "PEERLINK_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the bot.
    Run(RunArgs),
    /// Inspect or remove stored identities.
    Identity {
        #[command(subcommand)]
        action: IdentityAction,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    discord_token: Option<String>,

    #[arg(long, env = "DISCORD_APPLICATION_ID")]
    application_id: Option<u64>,

    /// Hex-encoded interactions public key.
    #[arg(long, env = "DISCORD_PUBLIC_KEY")]
    public_key: Option<String>,

    /// Register commands on this guild only.
    #[arg(long, env = "DISCORD_GUILD_ID")]
    guild_id: Option<u64>,

    #[arg(long, env = "S21_USERNAME")]
    s21_username: Option<String>,

    #[arg(long, env = "S21_PASSWORD", hide_env_values = true)]
    s21_password: Option<String>,

    #[arg(long, env = "PEER_ROLE_ID")]
    peer_role_id: Option<u64>,

    #[arg(long, env = "PHOENIX_ROLE_ID")]
    phoenix_role_id: Option<u64>,

    #[arg(long, env = "DRAGON_ROLE_ID")]
    dragon_role_id: Option<u64>,

    #[arg(long, env = "MINOTAUR_ROLE_ID")]
    minotaur_role_id: Option<u64>,

    #[arg(long, env = "PEGASUS_ROLE_ID")]
    pegasus_role_id: Option<u64>,
}

#[derive(clap::Subcommand)]
enum IdentityAction {
    /// Show the stored link for a Discord user.
    Show { user: PlatformUserId },
    /// Delete the stored link for a Discord user.
    Remove { user: PlatformUserId },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BotConfig::from_toml_file(path)?,
        None => BotConfig::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(port) = cli.port {
        config.listen_port = port;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    peerlink_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Run(args) => run(config, args).await,
        Command::Identity { action } => identity(&config, action),
    }
}

async fn run(mut config: BotConfig, args: RunArgs) -> anyhow::Result<()> {
    if let Some(id) = args.application_id {
        config.discord.application_id = id;
    }
    if let Some(key) = args.public_key {
        config.discord.public_key = key;
    }
    if let Some(guild) = args.guild_id {
        config.discord.guild_id = guild;
    }
    let roles = &mut config.roles;
    for (slot, value) in [
        (&mut roles.peer, args.peer_role_id),
        (&mut roles.phoenix, args.phoenix_role_id),
        (&mut roles.dragon, args.dragon_role_id),
        (&mut roles.minotaur, args.minotaur_role_id),
        (&mut roles.pegasus, args.pegasus_role_id),
    ] {
        if let Some(value) = value {
            *slot = value;
        }
    }

    let Some(bot_token) = args.discord_token.filter(|t| !t.trim().is_empty()) else {
        bail!("DISCORD_TOKEN not found in environment variables");
    };
    let (Some(username), Some(password)) = (args.s21_username, args.s21_password) else {
        bail!("S21_USERNAME and S21_PASSWORD must be set");
    };

    tracing::info!(
        port = config.listen_port,
        data_dir = %config.data_dir.display(),
        guild = config.discord.guild_id,
        "starting peerlink bot"
    );

    let bot = Bot::new(
        config,
        Secrets {
            bot_token,
            directory: Credentials::new(username, password),
        },
    )
    .context("failed to start bot")?;
    bot.run().await?;

    tracing::info!("peerlink daemon exited cleanly");
    Ok(())
}

fn identity(config: &BotConfig, action: IdentityAction) -> anyhow::Result<()> {
    check_data_dir(&config.data_dir).map_err(anyhow::Error::msg)?;
    let env = LmdbEnvironment::open(&config.data_dir, config.map_size)
        .with_context(|| format!("failed to open {}", config.data_dir.display()))?;
    let store = env.identity_store();
    store.initialize()?;

    match action {
        IdentityAction::Show { user } => match store.find_by_platform_id(user)? {
            Some(identity) => {
                println!("user:        {}", identity.platform_user_id);
                println!("login:       {}", identity.external_login);
                println!(
                    "coalition:   {}",
                    identity.group_label.as_deref().unwrap_or("-")
                );
                println!("verified at: {}", identity.verified_at.as_secs());
            }
            None => println!("{user} is not verified"),
        },
        IdentityAction::Remove { user } => {
            if store.remove(user)? {
                tracing::info!(%user, "identity removed");
                println!("removed {user}");
            } else {
                println!("{user} is not verified");
            }
        }
    }
    Ok(())
}
