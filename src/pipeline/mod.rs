//! Declarative deployment pipeline and repository seeding
//!
//! Collaborator declarations only: the pipeline wiring and the seed archive
//! are described as data. Running installs, archiving source trees, and
//! creating repositories are the caller's concern, reached through the
//! [`SeedArtifactSource`] interface.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::graph::{GraphBuilder, ResourceGraph, ResourceKind};
use crate::Result;

/// A deployment target wired into the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStage {
    /// Stage name, e.g. `backup-pipeline-master`
    pub name: String,
    /// Account the stage deploys into
    pub account: String,
    /// Region the stage deploys into
    pub region: String,
}

impl DeploymentStage {
    /// A stage deploying into one account/region
    pub fn new(
        name: impl Into<String>,
        account: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            account: account.into(),
            region: region.into(),
        }
    }
}

/// Declarative pipeline: source trigger, build commands, deployment stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Pipeline name
    pub name: String,
    /// Source repository the pipeline watches
    pub repository_name: String,
    /// Branch that triggers the pipeline
    pub branch_name: String,
    /// Commands run before the build
    pub install_commands: Vec<String>,
    /// Commands producing the deployable declaration
    pub synth_commands: Vec<String>,
    /// Deployment stages, in order
    pub stages: Vec<DeploymentStage>,
}

impl PipelineSpec {
    /// A pipeline watching `repository_name` on `branch_name`
    pub fn new(repository_name: impl Into<String>, branch_name: impl Into<String>) -> Self {
        let repository_name = repository_name.into();
        Self {
            name: format!("{repository_name}-pipeline"),
            repository_name,
            branch_name: branch_name.into(),
            install_commands: Vec::new(),
            synth_commands: Vec::new(),
            stages: Vec::new(),
        }
    }

    /// Append an install command
    pub fn install_command(mut self, command: impl Into<String>) -> Self {
        self.install_commands.push(command.into());
        self
    }

    /// Append a synth command
    pub fn synth_command(mut self, command: impl Into<String>) -> Self {
        self.synth_commands.push(command.into());
        self
    }

    /// Append a deployment stage
    pub fn add_stage(mut self, stage: DeploymentStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Declare the pipeline as a single-node resource graph
    pub fn synthesize(&self) -> Result<ResourceGraph> {
        let graph = GraphBuilder::new(&self.name)
            .add_resource(
                "pipeline",
                ResourceKind::Pipeline,
                serde_json::to_value(self)?,
            )
            .build()?;
        Ok(graph)
    }
}

/// Declaration of a seeded source repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySeedSpec {
    /// Repository to create
    pub repository_name: String,
    /// Repository description
    pub description: String,
    /// Branch the seed lands on
    pub branch_name: String,
    /// Source tree to package
    pub source_dir: PathBuf,
    /// Patterns excluded from the seed archive
    pub ignore_patterns: Vec<String>,
}

impl RepositorySeedSpec {
    /// Seed `repository_name` from `source_dir`, excluding build products and
    /// VCS metadata
    pub fn new(repository_name: impl Into<String>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            repository_name: repository_name.into(),
            description: "Declarative backup infrastructure".to_string(),
            branch_name: "master".to_string(),
            source_dir: source_dir.into(),
            ignore_patterns: ["target", ".git", "*.zip"]
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
        }
    }

    /// Declare the repository (and its seed artifact, if already packaged) as
    /// a resource graph
    pub fn synthesize(&self, artifact: Option<&SeedArtifact>) -> Result<ResourceGraph> {
        let mut properties = serde_json::to_value(self)?;
        if let (Some(artifact), Some(object)) = (artifact, properties.as_object_mut()) {
            object.insert("seed_artifact".to_string(), serde_json::to_value(artifact)?);
        }
        let graph = GraphBuilder::new(format!("{}-code", self.repository_name))
            .add_resource("code-repository", ResourceKind::Repository, properties)
            .build()?;
        Ok(graph)
    }
}

/// Handle to a packaged seed archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedArtifact {
    /// Where the archive was staged
    pub object_key: String,
    /// SHA-256 of the archive contents, lowercase hex
    pub sha256_hex: String,
    /// Archive size in bytes
    pub size_bytes: u64,
}

impl SeedArtifact {
    /// The canonical fingerprint implementations put in `sha256_hex`
    pub fn fingerprint(contents: &[u8]) -> String {
        let digest = Sha256::digest(contents);
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Packages a source tree into a seed archive
///
/// The one place the declaration layer touches the filesystem, kept behind a
/// trait so the core never does.
pub trait SeedArtifactSource {
    /// Stage the tree described by `spec` and return a handle to the archive
    fn package(&self, spec: &RepositorySeedSpec) -> Result<SeedArtifact>;
}
