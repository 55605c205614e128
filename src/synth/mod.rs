//! Synthesis entry point and manifest emission
//!
//! Wires the code-repository declaration, the pipeline declaration, and the
//! backup stack into one synthesis pass and emits a checksummed manifest.
//! Configuration is explicit; [`SynthConfig::from_env`] is the one place the
//! process environment is read.

use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::accounts::AccountResourceMap;
use crate::graph::ResourceGraph;
use crate::pipeline::{DeploymentStage, PipelineSpec, RepositorySeedSpec};
use crate::resolver::{ResolverConfig, VaultPolicyResolver};
use crate::stack::BackupStack;
use crate::vault::VaultTier;
use crate::Result;

/// Errors assembling synthesis configuration
#[derive(Error, Debug)]
pub enum SynthError {
    /// A required environment variable is not set
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
}

/// Target account and region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Account id
    pub account: String,
    /// Region name
    pub region: String,
}

impl Environment {
    /// An explicit account/region pair
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }
}

/// Explicit synthesis configuration
///
/// Nothing in the core reads globals; whatever layer invokes synthesis fills
/// this in, from the environment, a config file, or test fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Organization whose principals may copy into the vault
    pub organization_id: String,
    /// Account and region the stacks deploy into
    pub environment: Environment,
    /// Source repository name, also the stack name prefix
    pub repository_name: String,
    /// Branch the pipeline watches
    pub branch_name: String,
    /// Name of the silver vault
    pub silver_vault_name: String,
    /// Side-file with per-account resource selections, if configured
    pub account_map_path: Option<PathBuf>,
}

impl SynthConfig {
    /// Configuration with the standard names
    pub fn new(organization_id: impl Into<String>, environment: Environment) -> Self {
        Self {
            organization_id: organization_id.into(),
            environment,
            repository_name: "backup-infra".to_string(),
            branch_name: "master".to_string(),
            silver_vault_name: "backup-vault-silver".to_string(),
            account_map_path: None,
        }
    }

    /// Read configuration from `VAULTGRAPH_ORG_ID`, `VAULTGRAPH_ACCOUNT`,
    /// `VAULTGRAPH_REGION` and the optional `VAULTGRAPH_ACCOUNT_MAP`
    pub fn from_env() -> std::result::Result<Self, SynthError> {
        fn required(name: &'static str) -> std::result::Result<String, SynthError> {
            env::var(name).map_err(|_| SynthError::MissingEnv(name))
        }

        let organization_id = required("VAULTGRAPH_ORG_ID")?;
        let account = required("VAULTGRAPH_ACCOUNT")?;
        let region = required("VAULTGRAPH_REGION")?;
        let mut config = Self::new(organization_id, Environment::new(account, region));
        config.account_map_path = env::var("VAULTGRAPH_ACCOUNT_MAP").ok().map(PathBuf::from);
        Ok(config)
    }

    /// Point synthesis at an account resource map side-file
    pub fn with_account_map_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.account_map_path = Some(path.into());
        self
    }

    /// Override the silver vault name
    pub fn with_silver_vault_name(mut self, name: impl Into<String>) -> Self {
        self.silver_vault_name = name.into();
        self
    }
}

/// Runs one synthesis pass over a configuration
#[derive(Debug, Clone)]
pub struct Synthesizer {
    config: SynthConfig,
}

impl Synthesizer {
    /// Create a synthesizer over an explicit configuration
    pub fn new(config: SynthConfig) -> Self {
        Self { config }
    }

    /// Synthesize, reading the account map from the configured path (an
    /// unreadable file is fatal; no path at all means no selections)
    pub fn synthesize(&self) -> Result<Manifest> {
        let map = match &self.config.account_map_path {
            Some(path) => AccountResourceMap::from_path(path)?,
            None => AccountResourceMap::empty(),
        };
        self.synthesize_with_map(&map)
    }

    /// Synthesize against an already-loaded account map
    pub fn synthesize_with_map(&self, map: &AccountResourceMap) -> Result<Manifest> {
        let config = &self.config;

        let repository =
            RepositorySeedSpec::new(&config.repository_name, ".").synthesize(None)?;

        let pipeline_name = format!("{}-pipeline", config.repository_name);
        let pipeline = PipelineSpec::new(&config.repository_name, &config.branch_name)
            .synth_command("cargo run --release")
            .add_stage(DeploymentStage::new(
                format!("{}-{}", pipeline_name, config.branch_name),
                &config.environment.account,
                &config.environment.region,
            ))
            .synthesize()?;

        // One silver stack; stricter tiers stay reachable through the
        // resolver API but are not wired into the shipped synthesis.
        let resolver = VaultPolicyResolver::new(ResolverConfig::new(&config.organization_id));
        let backup = BackupStack::new(
            format!("{}-backup", config.repository_name),
            VaultTier::Silver,
            &config.silver_vault_name,
            &config.environment.account,
            resolver,
        )
        .synthesize(map)?;

        let manifest = Manifest::from_graphs(&[repository, pipeline, backup])?;
        info!(
            run_id = %manifest.run_id,
            stacks = manifest.stacks.len(),
            checksum = %manifest.checksum,
            "synthesis complete"
        );
        Ok(manifest)
    }
}

/// The emitted declaration: every synthesized stack plus integrity metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Identity of this synthesis run
    pub run_id: Uuid,
    /// When the manifest was produced
    pub synthesized_at: DateTime<Utc>,
    /// One entry per stack, deterministic content
    pub stacks: Vec<serde_json::Value>,
    /// SHA-256 over the serialized stacks, lowercase hex
    pub checksum: String,
}

impl Manifest {
    /// Build a manifest from synthesized graphs
    pub fn from_graphs(graphs: &[ResourceGraph]) -> Result<Self> {
        let stacks: Vec<serde_json::Value> =
            graphs.iter().map(ResourceGraph::to_manifest_value).collect();
        let body = serde_json::to_vec(&stacks)?;
        Ok(Self {
            run_id: Uuid::new_v4(),
            synthesized_at: Utc::now(),
            stacks,
            checksum: sha256_hex(&body),
        })
    }

    /// Pretty-printed JSON for downstream submission
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Install a `tracing` subscriber honoring `RUST_LOG`
///
/// For binaries and tests; repeated calls are ignored.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SynthConfig {
        SynthConfig::new("o-abc123", Environment::new("111", "ap-southeast-2"))
    }

    #[test]
    fn test_synthesis_emits_three_stacks() {
        let manifest = Synthesizer::new(config())
            .synthesize_with_map(&AccountResourceMap::empty())
            .expect("synthesis");
        assert_eq!(manifest.stacks.len(), 3);
    }

    #[test]
    fn test_checksum_is_deterministic_across_runs() {
        let synthesizer = Synthesizer::new(config());
        let first = synthesizer
            .synthesize_with_map(&AccountResourceMap::empty())
            .expect("first run");
        let second = synthesizer
            .synthesize_with_map(&AccountResourceMap::empty())
            .expect("second run");
        assert_eq!(first.checksum, second.checksum);
        assert_ne!(first.run_id, second.run_id);
    }

    #[test]
    fn test_manifest_round_trips() {
        let manifest = Synthesizer::new(config())
            .synthesize_with_map(&AccountResourceMap::empty())
            .expect("synthesis");
        let raw = manifest.to_json_string().expect("serializes");
        let parsed: Manifest = serde_json::from_str(&raw).expect("parses back");
        assert_eq!(parsed.checksum, manifest.checksum);
    }
}
