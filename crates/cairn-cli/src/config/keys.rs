//! Key resolution.

use anyhow::Context;
use cairn_core::EncryptionKey;
use cairn_pipeline::PipelineKeys;
use clap::Args;

/// Key overrides shared by the commands that encrypt or decrypt.
///
/// Values given here (or through the environment) win over the ones in the
/// JSON configuration.
#[derive(Debug, Clone, Default, Args)]
pub struct KeyArgs {
    /// Key sealing chunk contents: 64 hex characters or a 32 byte passphrase.
    #[arg(long, env = "CAIRN_CHUNK_KEY", hide_env_values = true)]
    pub chunk_key: Option<String>,

    /// Key sealing routing payloads: 64 hex characters or a 32 byte passphrase.
    #[arg(long, env = "CAIRN_ROUTING_KEY", hide_env_values = true)]
    pub routing_key: Option<String>,
}

impl KeyArgs {
    /// Resolves both keys, preferring these arguments over `chunk` and
    /// `routing` from the configuration file.
    pub fn resolve(
        &self,
        chunk: Option<&str>,
        routing: Option<&str>,
    ) -> anyhow::Result<PipelineKeys> {
        let chunk = resolve_key("chunk", self.chunk_key.as_deref().or(chunk))?;
        let routing = resolve_key("routing", self.routing_key.as_deref().or(routing))?;
        Ok(PipelineKeys::new(chunk, routing))
    }
}

fn resolve_key(name: &str, value: Option<&str>) -> anyhow::Result<EncryptionKey> {
    let value = value.with_context(|| {
        format!(
            "no {name} key configured: pass --{name}-key, set CAIRN_{}_KEY or add '{name}Key' to the configuration file",
            name.to_uppercase()
        )
    })?;

    EncryptionKey::parse(value.trim()).with_context(|| format!("invalid {name} key"))
}
