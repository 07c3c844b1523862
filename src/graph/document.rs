//! Persisted form of a cloning graph: three parallel collections plus files

use super::cloning_graph::CloningGraph;
use super::entity::{Attachment, Primer, Sequence};
use super::error::{LineageError, LineageResult};
use super::source::Source;
use super::validate::InvariantViolation;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Wire shape of a cloning graph
///
/// Sources, sequences and primers are stored in separate arrays; `files`
/// holds attachments keyed by sequence id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub sequences: Vec<Sequence>,
    #[serde(default)]
    pub primers: Vec<Primer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<Attachment>,
}

impl From<&CloningGraph> for GraphDocument {
    fn from(graph: &CloningGraph) -> Self {
        Self {
            sources: graph.sources().cloned().collect(),
            sequences: graph.sequences().cloned().collect(),
            primers: graph.primers().cloned().collect(),
            files: graph.attachments().to_vec(),
        }
    }
}

impl TryFrom<GraphDocument> for CloningGraph {
    type Error = LineageError;

    /// Rebuild the arena and re-check every invariant
    fn try_from(document: GraphDocument) -> LineageResult<Self> {
        let mut graph = CloningGraph::new();
        for source in document.sources {
            graph.insert(source)?;
        }
        for sequence in document.sequences {
            graph.insert(sequence)?;
        }
        for primer in document.primers {
            graph.insert(primer)?;
        }
        for file in document.files {
            graph.push_attachment_unchecked(file);
        }
        graph.validate()?;
        Ok(graph)
    }
}

impl CloningGraph {
    /// Parse and validate a JSON document
    ///
    /// Text that does not fit the document shape is reported as
    /// [`InvariantViolation::MalformedDocument`].
    pub fn from_json_str(text: &str) -> LineageResult<Self> {
        let document: GraphDocument = serde_json::from_str(text)
            .map_err(|e| InvariantViolation::MalformedDocument(e.to_string()))?;
        Self::try_from(document)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> LineageResult<String> {
        Ok(serde_json::to_string_pretty(&GraphDocument::from(self))?)
    }

    /// Read and validate a document from disk
    pub fn load_from_path(path: impl AsRef<Path>) -> LineageResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Write the document to disk
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> LineageResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
