//! Bot runtime: wires storage, the directory client and the Discord side
//! together and serves the interactions endpoint until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use peerlink_directory::{Credentials, DirectoryClient};
use peerlink_store::IdentityStore;
use peerlink_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment};
use peerlink_verification::VerificationService;

use crate::commands;
use crate::config::BotConfig;
use crate::interactions::{router, AppState};
use crate::metrics::BotMetrics;
use crate::rest::DiscordRest;
use crate::shutdown::ShutdownController;
use crate::signature::SignatureVerifier;
use crate::DiscordError;

/// Values that never come from the config file.
pub struct Secrets {
    pub bot_token: String,
    pub directory: Credentials,
}

pub struct Bot {
    config: BotConfig,
    // Keeps the environment open for the lifetime of the bot.
    _env: LmdbEnvironment,
    directory: Arc<DirectoryClient>,
    state: Arc<AppState>,
    shutdown: Arc<ShutdownController>,
}

impl Bot {
    /// Open the store and build every client. Nothing touches the network
    /// until [`Bot::run`].
    pub fn new(config: BotConfig, secrets: Secrets) -> Result<Self, DiscordError> {
        config.validate()?;
        if secrets.bot_token.trim().is_empty() {
            return Err(DiscordError::Config("bot token is not set".into()));
        }

        check_data_dir(&config.data_dir).map_err(DiscordError::Config)?;
        let env = LmdbEnvironment::open(&config.data_dir, config.map_size)?;
        let store = Arc::new(env.identity_store());
        store.initialize()?;

        let report = check_integrity(env.env())?;
        if report.is_healthy() {
            tracing::info!(
                identities = report.identities,
                path = %config.data_dir.display(),
                "identity store ready"
            );
        } else {
            for error in &report.errors {
                tracing::warn!(%error, "identity store integrity problem");
            }
        }

        let directory = Arc::new(DirectoryClient::new(
            config.directory.clone(),
            secrets.directory,
        )?);
        let rest = Arc::new(DiscordRest::new(
            &config.discord.api_base,
            &secrets.bot_token,
            config.discord.application_id,
        )?);
        let verifier = SignatureVerifier::from_hex(&config.discord.public_key)?;
        let metrics = Arc::new(BotMetrics::new()?);
        let service = Arc::new(VerificationService::new(store, config.roles.clone()));

        let state = Arc::new(AppState {
            service,
            directory: directory.clone(),
            rest,
            verifier,
            metrics,
        });

        Ok(Self {
            config,
            _env: env,
            directory,
            state,
            shutdown: Arc::new(ShutdownController::new()),
        })
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn shutdown_controller(&self) -> &Arc<ShutdownController> {
        &self.shutdown
    }

    /// Register slash commands. Failure is logged; the bot keeps running
    /// with whatever commands Discord already has.
    pub async fn register_commands(&self) {
        let guild = (self.config.discord.guild_id != 0).then_some(self.config.discord.guild_id);
        match self
            .state
            .rest
            .register_commands(guild, &commands::definitions())
            .await
        {
            Ok(count) => tracing::info!(count, ?guild, "synced slash commands"),
            Err(e) => tracing::error!(error = %e, "failed to sync commands"),
        }
    }

    /// Serve until SIGINT/SIGTERM, then release the directory session.
    pub async fn run(self) -> Result<(), DiscordError> {
        self.register_commands().await;

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.listen_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "interactions endpoint listening");

        let signals = Arc::clone(&self.shutdown);
        tokio::spawn(async move { signals.stop_on_signal().await });

        axum::serve(listener, router(Arc::clone(&self.state)))
            .with_graceful_shutdown(self.shutdown.stopped())
            .await?;

        self.directory.close();
        tracing::info!("bot stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &std::path::Path) -> BotConfig {
        let mut config = BotConfig {
            data_dir: dir.join("data"),
            map_size: 1 << 20,
            ..Default::default()
        };
        config.discord.application_id = 1;
        config.discord.public_key = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a".into();
        config
    }

    fn secrets(token: &str) -> Secrets {
        Secrets {
            bot_token: token.into(),
            directory: Credentials::new("svc", "secret"),
        }
    }

    #[test]
    fn builds_from_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let bot = Bot::new(config(dir.path()), secrets("token")).unwrap();
        assert!(bot.state().service.lookup(peerlink_types::PlatformUserId::new(1)).unwrap().is_none());
        assert!(dir.path().join("data").join("data.mdb").exists());
    }

    #[test]
    fn refuses_to_start_without_token() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Bot::new(config(dir.path()), secrets("  ")),
            Err(DiscordError::Config(_))
        ));
    }

    #[test]
    fn rejects_bad_public_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.discord.public_key = "xyz".into();
        assert!(matches!(
            Bot::new(config, secrets("token")),
            Err(DiscordError::Signature(_))
        ));
    }
}
