//! Base extraction and per-instance patch generation.
//!
//! Resources are partitioned by type identity; each partition is narrowed to
//! a shared base by folding the two-way patch / subtract pair over its
//! members, then every member gets a normalized patch against that base.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::diff::{reorder_patch, subtract, two_way_patch};
use crate::error::{Error, Result};
use crate::schema::{SchemaIndex, TypeIdentity};
use crate::value::Map;

/// Generates one [`PatchPartition`] per resource type found in the input.
#[derive(Debug)]
pub struct PatchGenerator {
    schemas: SchemaIndex,
}

/// One original instance together with its name and generated patch.
#[derive(Debug, Clone)]
pub struct PatchSource {
    name: String,
    original: Map,
    patch: Map,
}

/// The shared base and per-instance patches for one resource type.
#[derive(Debug, Clone)]
pub struct PatchPartition {
    identity: TypeIdentity,
    base: Map,
    sources: Vec<PatchSource>,
}

/// Conversion result for one partition. Failures stay contained to the
/// partition they occurred in; independent partitions are unaffected.
#[derive(Debug)]
pub struct PartitionOutcome {
    pub identity: TypeIdentity,
    pub result: Result<PatchPartition>,
}

impl PatchGenerator {
    /// Creates a generator over an already-loaded schema index.
    pub fn new(schemas: SchemaIndex) -> Self {
        PatchGenerator { schemas }
    }

    /// Creates a generator loading every schema document in a directory.
    pub fn from_schema_dir(directory: &Path) -> Result<Self> {
        Ok(PatchGenerator::new(SchemaIndex::from_dir(directory)?))
    }

    /// Groups decoded resources by type identity, keeping input order within
    /// each group. A resource without usable `apiVersion`/`kind` fields is
    /// fatal for the whole run.
    pub fn partition(resources: Vec<Map>) -> Result<BTreeMap<TypeIdentity, Vec<Map>>> {
        let mut partitions: BTreeMap<TypeIdentity, Vec<Map>> = BTreeMap::new();
        for resource in resources {
            let identity = TypeIdentity::of(&resource)?;
            partitions.entry(identity).or_default().push(resource);
        }
        Ok(partitions)
    }

    /// Converts every partition found in `resources`, reporting each outcome
    /// independently. A failed partition is logged and carried as an error in
    /// its outcome; it never aborts the remaining partitions.
    pub fn execute(&self, resources: Vec<Map>) -> Result<Vec<PartitionOutcome>> {
        let partitions = Self::partition(resources)?;
        let mut outcomes = Vec::with_capacity(partitions.len());
        for (identity, members) in partitions {
            let result = self.convert_partition(&identity, &members);
            if let Err(ref error) = result {
                log::error!("skipping partition {}: {}", identity, error);
            }
            outcomes.push(PartitionOutcome { identity, result });
        }
        Ok(outcomes)
    }

    fn convert_partition(
        &self,
        identity: &TypeIdentity,
        members: &[Map],
    ) -> Result<PatchPartition> {
        let ctx = self.schemas.context_for(identity)?;

        let mut names = Vec::with_capacity(members.len());
        for member in members {
            let name = resource_name(member)
                .ok_or_else(|| Error::missing_identifier(identity.to_string()))?;
            names.push(name.to_string());
        }

        // Narrow the base: seed with the first member, then strip everything
        // any later member disagrees with.
        let mut base = members[0].clone();
        for member in &members[1..] {
            let patch = two_way_patch(member, &base, ctx)?;
            base = subtract(&base, &patch, ctx)?;
        }

        let mut sources = Vec::with_capacity(members.len());
        for (member, name) in members.iter().zip(names) {
            let patch = reorder_patch(&two_way_patch(&base, member, ctx)?);
            sources.push(PatchSource {
                name,
                original: member.clone(),
                patch,
            });
        }

        Ok(PatchPartition {
            identity: identity.clone(),
            base,
            sources,
        })
    }
}

impl PatchSource {
    /// The instance's identifier, taken from `metadata.name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The original document.
    pub fn original(&self) -> &Map {
        &self.original
    }

    /// The generated patch; empty when the instance equals the base.
    pub fn patch(&self) -> &Map {
        &self.patch
    }
}

impl PatchPartition {
    /// The resource type this partition covers.
    pub fn identity(&self) -> &TypeIdentity {
        &self.identity
    }

    /// The shared base document.
    pub fn base(&self) -> &Map {
        &self.base
    }

    /// The partition's members in input order.
    pub fn sources(&self) -> &[PatchSource] {
        &self.sources
    }

    /// Renders the base document as YAML.
    pub fn base_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.base)?)
    }

    /// Renders every non-empty patch as YAML, in member order.
    pub fn patch_yamls(&self) -> Result<Vec<String>> {
        self.sources
            .iter()
            .filter(|source| !source.patch.is_empty())
            .map(|source| Ok(serde_yaml::to_string(&source.patch)?))
            .collect()
    }

    /// Renders every original document as YAML, in member order.
    pub fn original_yamls(&self) -> Result<Vec<String>> {
        self.sources
            .iter()
            .map(|source| Ok(serde_yaml::to_string(&source.original)?))
            .collect()
    }

    /// Writes `base.yaml` plus one `<name>.yaml` per member with a non-empty
    /// patch into a folder named after the partition's type identity.
    pub fn dump_to_folder(&self, directory: &Path) -> Result<()> {
        let root = directory.join(self.identity.folder_name());
        fs::create_dir_all(&root)?;
        fs::write(root.join("base.yaml"), self.base_yaml()?)?;
        for source in &self.sources {
            if source.patch.is_empty() {
                continue;
            }
            fs::write(
                root.join(format!("{}.yaml", source.name)),
                serde_yaml::to_string(&source.patch)?,
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for PatchPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = self.base_yaml().map_err(|_| fmt::Error)?;
        write!(f, "{}\n\n{}", self.identity, base)
    }
}

/// Extracts the instance identifier from `metadata.name`.
fn resource_name(resource: &Map) -> Option<&str> {
    resource.get("metadata")?.as_map()?.get("name")?.as_str()
}
