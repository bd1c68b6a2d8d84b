//! Prometheus metrics for the bot.
//!
//! [`BotMetrics`] owns a dedicated [`Registry`] that `GET /metrics` encodes
//! into the Prometheus text exposition format.

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry, Encoder,
    IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use peerlink_verification::VerifyOutcome;

pub struct BotMetrics {
    pub registry: Registry,

    /// Signed interactions accepted, including PINGs.
    pub interactions_received: IntCounter,
    /// Requests dropped because the signature did not check out.
    pub signatures_rejected: IntCounter,
    /// Slash commands by name.
    pub commands: IntCounterVec,
    /// Verification attempts by outcome.
    pub verifications: IntCounterVec,
}

impl BotMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let interactions_received = register_int_counter_with_registry!(
            Opts::new(
                "peerlink_interactions_received_total",
                "Signed interactions received"
            ),
            registry
        )?;

        let signatures_rejected = register_int_counter_with_registry!(
            Opts::new(
                "peerlink_signatures_rejected_total",
                "Interaction requests with a missing or invalid signature"
            ),
            registry
        )?;

        let commands = register_int_counter_vec_with_registry!(
            Opts::new("peerlink_commands_total", "Slash commands handled"),
            &["command"],
            registry
        )?;

        let verifications = register_int_counter_vec_with_registry!(
            Opts::new("peerlink_verifications_total", "Verification attempts by outcome"),
            &["outcome"],
            registry
        )?;

        Ok(Self {
            registry,
            interactions_received,
            signatures_rejected,
            commands,
            verifications,
        })
    }

    pub fn record_outcome(&self, outcome: VerifyOutcome) {
        self.verifications
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    /// Encode all metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
