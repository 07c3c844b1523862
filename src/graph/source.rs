//! Sources: one cloning step each, consuming inputs and producing at most one sequence

use super::id::EntityId;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// A region on a sequence
///
/// 0-based and end-exclusive. `end < start` describes a region that spans
/// the origin of a circular molecule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

impl Location {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn spans_origin(&self) -> bool {
        self.end < self.start
    }
}

/// One ordered input of a source
///
/// The framing fields describe how the input contributes to the output of
/// an assembly-family operation. They are `None`/`false` elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInput {
    /// Referenced sequence or primer
    pub sequence: EntityId,
    /// Junction with the previous fragment, in fragment coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_location: Option<Location>,
    /// Junction with the next fragment, in fragment coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_location: Option<Location>,
    /// Whether the fragment enters the product reverse-complemented
    #[serde(default)]
    pub reverse_complemented: bool,
}

impl SourceInput {
    /// Plain reference without framing
    pub fn new(sequence: EntityId) -> Self {
        Self {
            sequence,
            left_location: None,
            right_location: None,
            reverse_complemented: false,
        }
    }

    /// Assembly fragment with junction locations
    pub fn fragment(sequence: EntityId, left: Option<Location>, right: Option<Location>) -> Self {
        Self {
            left_location: left,
            right_location: right,
            ..Self::new(sequence)
        }
    }

    /// Mark the fragment reverse-complemented
    pub fn reverse_complemented(mut self) -> Self {
        self.reverse_complemented = true;
        self
    }

    /// Whether any framing metadata is present
    pub fn has_framing(&self) -> bool {
        self.left_location.is_some() || self.right_location.is_some()
    }
}

/// Where a primer anneals, in primer coordinates
///
/// `location.start` is the length of the 5' tail, i.e. the offset at
/// which the 3' annealing part begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimerBinding {
    pub primer: EntityId,
    pub location: Location,
}

impl PrimerBinding {
    pub fn new(primer: EntityId, location: Location) -> Self {
        Self { primer, location }
    }
}

/// The fixed set of cloning operations, each with its own parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    #[serde(rename = "ManuallyTypedSource")]
    ManuallyTyped { user_input: String },

    #[serde(rename = "UploadedFileSource")]
    UploadedFile {
        file_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index_in_file: Option<usize>,
    },

    #[serde(rename = "RepositoryIdSource")]
    RepositoryId {
        repository_name: String,
        repository_id: String,
    },

    #[serde(rename = "GenomeCoordinatesSource")]
    GenomeCoordinates {
        assembly_accession: String,
        sequence_accession: String,
        start: usize,
        end: usize,
        strand: i8,
    },

    #[serde(rename = "RestrictionEnzymeDigestionSource")]
    RestrictionEnzymeDigestion {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left_enzyme: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right_enzyme: Option<String>,
    },

    #[serde(rename = "PCRSource")]
    Pcr {
        forward_primer: PrimerBinding,
        reverse_primer: PrimerBinding,
        #[serde(default)]
        add_primer_features: bool,
    },

    #[serde(rename = "LigationSource")]
    Ligation,

    #[serde(rename = "GibsonAssemblySource")]
    GibsonAssembly,

    #[serde(rename = "InFusionSource")]
    InFusion,

    #[serde(rename = "OverlapExtensionPCRLigationSource")]
    OverlapExtensionPcrLigation,

    #[serde(rename = "InVivoAssemblySource")]
    InVivoAssembly,

    #[serde(rename = "HomologousRecombinationSource")]
    HomologousRecombination,

    #[serde(rename = "CRISPRSource")]
    Crispr { guides: Vec<EntityId> },

    #[serde(rename = "RestrictionAndLigationSource")]
    RestrictionAndLigation { restriction_enzymes: Vec<String> },

    #[serde(rename = "GatewaySource")]
    Gateway {
        reaction_type: String,
        #[serde(default)]
        greedy: bool,
    },

    #[serde(rename = "CreLoxRecombinationSource")]
    CreLoxRecombination,

    #[serde(rename = "OligoHybridizationSource")]
    OligoHybridization {
        forward_oligo: EntityId,
        reverse_oligo: EntityId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        overhang_crick_3prime: Option<i64>,
    },

    #[serde(rename = "PolymeraseExtensionSource")]
    PolymeraseExtension,
}

impl Operation {
    /// The `type` tag used on the wire
    pub fn type_name(&self) -> &'static str {
        match self {
            Operation::ManuallyTyped { .. } => "ManuallyTypedSource",
            Operation::UploadedFile { .. } => "UploadedFileSource",
            Operation::RepositoryId { .. } => "RepositoryIdSource",
            Operation::GenomeCoordinates { .. } => "GenomeCoordinatesSource",
            Operation::RestrictionEnzymeDigestion { .. } => "RestrictionEnzymeDigestionSource",
            Operation::Pcr { .. } => "PCRSource",
            Operation::Ligation => "LigationSource",
            Operation::GibsonAssembly => "GibsonAssemblySource",
            Operation::InFusion => "InFusionSource",
            Operation::OverlapExtensionPcrLigation => "OverlapExtensionPCRLigationSource",
            Operation::InVivoAssembly => "InVivoAssemblySource",
            Operation::HomologousRecombination => "HomologousRecombinationSource",
            Operation::Crispr { .. } => "CRISPRSource",
            Operation::RestrictionAndLigation { .. } => "RestrictionAndLigationSource",
            Operation::Gateway { .. } => "GatewaySource",
            Operation::CreLoxRecombination => "CreLoxRecombinationSource",
            Operation::OligoHybridization { .. } => "OligoHybridizationSource",
            Operation::PolymeraseExtension => "PolymeraseExtensionSource",
        }
    }

    /// Operations whose inputs carry fragment framing
    pub fn is_assembly(&self) -> bool {
        matches!(
            self,
            Operation::Pcr { .. }
                | Operation::Ligation
                | Operation::GibsonAssembly
                | Operation::InFusion
                | Operation::OverlapExtensionPcrLigation
                | Operation::InVivoAssembly
                | Operation::HomologousRecombination
                | Operation::Crispr { .. }
                | Operation::RestrictionAndLigation { .. }
                | Operation::Gateway { .. }
                | Operation::CreLoxRecombination
        )
    }

    /// Primers referenced by the operation's own parameters
    pub fn primer_ids(&self) -> Vec<EntityId> {
        match self {
            Operation::Pcr {
                forward_primer,
                reverse_primer,
                ..
            } => vec![forward_primer.primer, reverse_primer.primer],
            Operation::OligoHybridization {
                forward_oligo,
                reverse_oligo,
                ..
            } => vec![*forward_oligo, *reverse_oligo],
            Operation::Crispr { guides } => guides.clone(),
            _ => Vec::new(),
        }
    }

    /// Rewrite every primer reference through `f`
    pub fn map_primer_ids(&mut self, f: &impl Fn(EntityId) -> EntityId) {
        match self {
            Operation::Pcr {
                forward_primer,
                reverse_primer,
                ..
            } => {
                forward_primer.primer = f(forward_primer.primer);
                reverse_primer.primer = f(reverse_primer.primer);
            }
            Operation::OligoHybridization {
                forward_oligo,
                reverse_oligo,
                ..
            } => {
                *forward_oligo = f(*forward_oligo);
                *reverse_oligo = f(*reverse_oligo);
            }
            Operation::Crispr { guides } => {
                for guide in guides.iter_mut() {
                    *guide = f(*guide);
                }
            }
            _ => {}
        }
    }

    /// Offset at which output coordinates start for the first fragment
    pub fn assembly_start_offset(&self) -> usize {
        match self {
            Operation::Pcr { forward_primer, .. } => forward_primer.location.start,
            _ => 0,
        }
    }
}

/// A cloning step
///
/// On the wire the operation's `type` tag and parameters sit directly on
/// the source. An undefined source carries `"type": null` and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "SourceRecord")]
pub struct Source {
    /// Unique identifier
    pub id: EntityId,
    /// Ordered input references
    pub input: Vec<SourceInput>,
    /// Produced sequence, `None` while pending
    pub output: Option<EntityId>,
    /// Operation kind and parameters, `None` while undefined
    pub operation: Option<Operation>,
}

/// A source as read from a document, before its operation is resolved
#[derive(Deserialize)]
struct SourceRecord {
    id: EntityId,
    #[serde(default)]
    input: Vec<SourceInput>,
    #[serde(default)]
    output: Option<EntityId>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(flatten)]
    parameters: Map<String, Value>,
}

impl TryFrom<SourceRecord> for Source {
    type Error = String;

    fn try_from(record: SourceRecord) -> Result<Self, Self::Error> {
        let operation = match record.kind {
            None if record.parameters.is_empty() => None,
            None => {
                let keys: Vec<&str> = record.parameters.keys().map(String::as_str).collect();
                return Err(format!(
                    "source {} has no type but carries {}",
                    record.id,
                    keys.join(", ")
                ));
            }
            Some(kind) => {
                let mut fields = record.parameters;
                fields.insert("type".into(), Value::String(kind));
                let operation = serde_json::from_value(Value::Object(fields))
                    .map_err(|e| format!("source {}: {e}", record.id))?;
                Some(operation)
            }
        };
        Ok(Self {
            id: record.id,
            input: record.input,
            output: record.output,
            operation,
        })
    }
}

#[derive(Serialize)]
struct TypedSource<'a> {
    id: EntityId,
    input: &'a [SourceInput],
    output: Option<EntityId>,
    #[serde(flatten)]
    operation: &'a Operation,
}

#[derive(Serialize)]
struct UntypedSource<'a> {
    id: EntityId,
    input: &'a [SourceInput],
    output: Option<EntityId>,
    #[serde(rename = "type")]
    kind: Option<&'a str>,
}

impl Serialize for Source {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.operation {
            Some(operation) => TypedSource {
                id: self.id,
                input: &self.input,
                output: self.output,
                operation,
            }
            .serialize(serializer),
            None => UntypedSource {
                id: self.id,
                input: &self.input,
                output: self.output,
                kind: None,
            }
            .serialize(serializer),
        }
    }
}

impl Source {
    /// Create an empty, undefined source
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            input: Vec::new(),
            output: None,
            operation: None,
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn with_input(mut self, input: SourceInput) -> Self {
        self.input.push(input);
        self
    }

    pub fn with_output(mut self, output: EntityId) -> Self {
        self.output = Some(output);
        self
    }

    /// Whether the source still waits for a result
    pub fn is_pending(&self) -> bool {
        self.output.is_none()
    }

    /// Ids referenced through `input`
    pub fn input_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.input.iter().map(|i| i.sequence)
    }

    /// Primer ids referenced by the operation parameters
    pub fn operation_primer_ids(&self) -> Vec<EntityId> {
        self.operation
            .as_ref()
            .map(Operation::primer_ids)
            .unwrap_or_default()
    }

    /// Every upstream id: inputs and operation primers
    pub fn upstream_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.input_ids().collect();
        for primer in self.operation_primer_ids() {
            if !ids.contains(&primer) {
                ids.push(primer);
            }
        }
        ids
    }

    /// Whether the source references `id` upstream
    pub fn references(&self, id: EntityId) -> bool {
        self.input_ids().any(|i| i == id) || self.operation_primer_ids().contains(&id)
    }

    /// Rewrite the source's own id and every reference it holds
    pub fn map_ids(&mut self, f: &impl Fn(EntityId) -> EntityId) {
        self.id = f(self.id);
        self.map_references(f);
    }

    /// Rewrite references (inputs, output, primers) but not the source's id
    pub fn map_references(&mut self, f: &impl Fn(EntityId) -> EntityId) {
        for input in self.input.iter_mut() {
            input.sequence = f(input.sequence);
        }
        self.output = self.output.map(f);
        if let Some(operation) = self.operation.as_mut() {
            operation.map_primer_ids(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> EntityId {
        EntityId::from(n)
    }

    fn pcr(forward: u64, reverse: u64) -> Operation {
        Operation::Pcr {
            forward_primer: PrimerBinding::new(id(forward), Location::new(12, 20)),
            reverse_primer: PrimerBinding::new(id(reverse), Location::new(0, 8)),
            add_primer_features: false,
        }
    }

    #[test]
    fn pcr_start_offset_is_forward_tail_length() {
        assert_eq!(pcr(1, 2).assembly_start_offset(), 12);
        assert_eq!(Operation::GibsonAssembly.assembly_start_offset(), 0);
    }

    #[test]
    fn upstream_ids_include_operation_primers_once() {
        let source = Source::new(id(10))
            .with_operation(pcr(1, 2))
            .with_input(SourceInput::new(id(3)))
            .with_input(SourceInput::new(id(1)));
        assert_eq!(source.upstream_ids(), vec![id(3), id(1), id(2)]);
        assert!(source.references(id(2)));
        assert!(!source.references(id(10)));
    }

    #[test]
    fn map_ids_rewrites_every_reference_shape() {
        let mut source = Source::new(id(10))
            .with_operation(Operation::Crispr {
                guides: vec![id(4), id(5)],
            })
            .with_input(SourceInput::new(id(3)))
            .with_output(id(11));
        source.map_ids(&|i: EntityId| EntityId::from(i.get() + 100));

        assert_eq!(source.id, id(110));
        assert_eq!(source.input[0].sequence, id(103));
        assert_eq!(source.output, Some(id(111)));
        assert_eq!(source.operation_primer_ids(), vec![id(104), id(105)]);
    }

    #[test]
    fn hybridization_oligos_count_as_primers() {
        let op = Operation::OligoHybridization {
            forward_oligo: id(1),
            reverse_oligo: id(2),
            overhang_crick_3prime: Some(-4),
        };
        assert_eq!(op.primer_ids(), vec![id(1), id(2)]);
        assert!(!op.is_assembly());
    }

    #[test]
    fn assembly_family_membership() {
        assert!(pcr(1, 2).is_assembly());
        assert!(Operation::Ligation.is_assembly());
        assert!(!Operation::PolymeraseExtension.is_assembly());
        assert!(!Operation::RestrictionEnzymeDigestion {
            left_enzyme: None,
            right_enzyme: Some("EcoRI".into()),
        }
        .is_assembly());
    }

    #[test]
    fn origin_spanning_location() {
        assert!(Location::new(20, 3).spans_origin());
        assert!(!Location::new(3, 20).spans_origin());
    }

    #[test]
    fn operation_sits_on_the_source() {
        let source = Source::new(id(5))
            .with_input(SourceInput::new(id(2)))
            .with_operation(pcr(3, 4))
            .with_output(id(6));
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value["type"], "PCRSource");
        assert_eq!(value["forward_primer"]["primer"], 3);
        assert!(value.get("operation").is_none());

        let back: Source = serde_json::from_value(value).unwrap();
        assert_eq!(back, source);
    }

    #[test]
    fn undefined_source_has_null_type() {
        let source = Source::new(id(7)).with_input(SourceInput::new(id(6)));
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value["type"], serde_json::Value::Null);
        assert_eq!(serde_json::from_value::<Source>(value).unwrap(), source);
    }

    #[test]
    fn parameters_without_type_are_rejected() {
        let value = serde_json::json!({"id": 1, "file_name": "pUC19.gb"});
        let err = serde_json::from_value::<Source>(value).unwrap_err();
        assert!(err.to_string().contains("file_name"));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let value = serde_json::json!({"id": 1, "type": "TeleportationSource"});
        assert!(serde_json::from_value::<Source>(value).is_err());
    }
}
