//! Sequences, primers and the arena variant that holds them

use super::id::EntityId;
use super::source::Source;
use serde::{Deserialize, Serialize};

/// Kind of a sequence record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceKind {
    /// A real molecule whose content came from a file or a computation
    TextFileSequence,
    /// Placeholder input of a template strategy, replaced by grafting
    TemplateSequence,
}

/// A DNA molecule, produced by exactly one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    /// Unique identifier
    pub id: EntityId,
    /// Record kind
    #[serde(rename = "type")]
    pub kind: SequenceKind,
    /// Whether the molecule is circular
    #[serde(default)]
    pub circular: bool,
    /// Length in base pairs, as reported by the parsing collaborator
    #[serde(default)]
    pub length: usize,
    /// Opaque file content (GenBank, FASTA, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
    /// Format of `file_content`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_file_format: Option<String>,
}

impl Sequence {
    /// Create a real sequence of the given length
    pub fn new(id: EntityId, length: usize) -> Self {
        Self {
            id,
            kind: SequenceKind::TextFileSequence,
            circular: false,
            length,
            file_content: None,
            sequence_file_format: None,
        }
    }

    /// Create a template placeholder
    pub fn template(id: EntityId) -> Self {
        Self {
            kind: SequenceKind::TemplateSequence,
            ..Self::new(id, 0)
        }
    }

    /// Mark the sequence circular
    pub fn circular(mut self) -> Self {
        self.circular = true;
        self
    }

    /// Attach opaque file content
    pub fn with_content(mut self, format: impl Into<String>, content: impl Into<String>) -> Self {
        self.sequence_file_format = Some(format.into());
        self.file_content = Some(content.into());
        self
    }

    pub fn is_template(&self) -> bool {
        self.kind == SequenceKind::TemplateSequence
    }
}

/// A named oligonucleotide, shared by reference between sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primer {
    /// Unique identifier
    pub id: EntityId,
    /// Name, unique within a graph
    pub name: String,
    /// Nucleotide sequence
    pub sequence: String,
    /// Identity in an external primer database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<i64>,
}

impl Primer {
    pub fn new(id: EntityId, name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sequence: sequence.into(),
            database_id: None,
        }
    }

    /// Set the external database identity
    pub fn with_database_id(mut self, database_id: i64) -> Self {
        self.database_id = Some(database_id);
        self
    }

    /// Whether two primers carry the same content, ignoring their ids
    pub fn same_content(&self, other: &Primer) -> bool {
        self.name == other.name
            && self.sequence == other.sequence
            && self.database_id == other.database_id
    }
}

/// Out-of-band file attached to a sequence (e.g. a sequencing read)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Sequence this file belongs to
    pub sequence_id: EntityId,
    /// File name
    pub file_name: String,
    /// Free-form file type (e.g. "Sequencing file")
    pub file_type: String,
}

impl Attachment {
    pub fn new(sequence_id: EntityId, file_name: impl Into<String>, file_type: impl Into<String>) -> Self {
        Self {
            sequence_id,
            file_name: file_name.into(),
            file_type: file_type.into(),
        }
    }
}

/// Which of the three entity kinds an id names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Source,
    Sequence,
    Primer,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Source => "source",
            EntityKind::Sequence => "sequence",
            EntityKind::Primer => "primer",
        };
        f.write_str(name)
    }
}

/// One node of the arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Source(Source),
    Sequence(Sequence),
    Primer(Primer),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Source(s) => s.id,
            Entity::Sequence(s) => s.id,
            Entity::Primer(p) => p.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Source(_) => EntityKind::Source,
            Entity::Sequence(_) => EntityKind::Sequence,
            Entity::Primer(_) => EntityKind::Primer,
        }
    }

    /// Replace the entity's own id
    pub(crate) fn set_id(&mut self, id: EntityId) {
        match self {
            Entity::Source(s) => s.id = id,
            Entity::Sequence(s) => s.id = id,
            Entity::Primer(p) => p.id = id,
        }
    }
}

impl From<Source> for Entity {
    fn from(source: Source) -> Self {
        Entity::Source(source)
    }
}

impl From<Sequence> for Entity {
    fn from(sequence: Sequence) -> Self {
        Entity::Sequence(sequence)
    }
}

impl From<Primer> for Entity {
    fn from(primer: Primer) -> Self {
        Entity::Primer(primer)
    }
}
