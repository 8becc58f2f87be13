//! Activity graph entities.
//!
//! These are the passive records the synthesizer creates and the layout
//! engine reads: nodes (with their pins), control flows, and partitions
//! (actor lanes). Every entity carries the [`ElementId`] the model store
//! handed back when the element was realized.
//!
//! [`ElementSpec`] is the descriptor sent to the model store when an element
//! is created.

use std::fmt;

use crate::identifier::Id;

/// Opaque handle to an element held by the model store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The collection a pin belongs to on its owning node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinRole {
    /// Input of a structured container.
    StructuredInput,
    /// Output of a structured container.
    StructuredOutput,
    /// Input of a behavior call.
    Argument,
    /// Output of a behavior call.
    Result,
}

impl PinRole {
    pub fn is_input(self) -> bool {
        matches!(self, Self::StructuredInput | Self::Argument)
    }
}

/// A named input or output pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    id: ElementId,
    name: Id,
    role: PinRole,
}

impl Pin {
    pub fn new(id: ElementId, name: Id, role: PinRole) -> Self {
        Self { id, name, role }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn role(&self) -> PinRole {
        self.role
    }
}

/// Closed set of node kinds.
///
/// The two action kinds hold their pins in differently named collections,
/// mirroring the UML metamodel; layout treats both the same way through
/// [`Node::input_pins`] and [`Node::output_pins`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Initial,
    Final,
    StructuredContainer {
        structured_inputs: Vec<Pin>,
        structured_outputs: Vec<Pin>,
    },
    BehaviorCall {
        arguments: Vec<Pin>,
        results: Vec<Pin>,
    },
}

impl NodeKind {
    /// Returns `true` for initial and final nodes.
    pub fn is_control(&self) -> bool {
        match self {
            Self::Initial | Self::Final => true,
            Self::StructuredContainer { .. } | Self::BehaviorCall { .. } => false,
        }
    }

    /// Short label used in logs and exported diagrams.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Final => "final",
            Self::StructuredContainer { .. } => "structured",
            Self::BehaviorCall { .. } => "call-behavior",
        }
    }
}

/// An activity node owned by an activity or by a structured container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: ElementId,
    name: Id,
    kind: NodeKind,
    owner: ElementId,
    partition: Option<ElementId>,
}

impl Node {
    pub fn new(id: ElementId, name: Id, kind: NodeKind, owner: ElementId) -> Self {
        Self {
            id,
            name,
            kind,
            owner,
            partition: None,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn owner(&self) -> ElementId {
        self.owner
    }

    /// Returns the partition this node was assigned to, if any.
    pub fn partition(&self) -> Option<ElementId> {
        self.partition
    }

    /// Records lane membership. A node belongs to at most one partition, so a
    /// later assignment replaces an earlier one.
    pub fn set_partition(&mut self, partition: ElementId) {
        self.partition = Some(partition);
    }

    pub fn input_pins(&self) -> &[Pin] {
        match &self.kind {
            NodeKind::Initial | NodeKind::Final => &[],
            NodeKind::StructuredContainer {
                structured_inputs, ..
            } => structured_inputs,
            NodeKind::BehaviorCall { arguments, .. } => arguments,
        }
    }

    pub fn output_pins(&self) -> &[Pin] {
        match &self.kind {
            NodeKind::Initial | NodeKind::Final => &[],
            NodeKind::StructuredContainer {
                structured_outputs, ..
            } => structured_outputs,
            NodeKind::BehaviorCall { results, .. } => results,
        }
    }
}

/// A control flow between two nodes of the same scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    id: ElementId,
    source: ElementId,
    target: ElementId,
    owner: ElementId,
}

impl Edge {
    pub fn new(id: ElementId, source: ElementId, target: ElementId, owner: ElementId) -> Self {
        Self {
            id,
            source,
            target,
            owner,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn source(&self) -> ElementId {
        self.source
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    pub fn owner(&self) -> ElementId {
        self.owner
    }
}

/// An actor lane.
///
/// Members are kept in assignment order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    id: ElementId,
    name: Id,
    members: Vec<ElementId>,
}

impl Partition {
    pub fn new(id: ElementId, name: Id) -> Self {
        Self {
            id,
            name,
            members: Vec::new(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn members(&self) -> &[ElementId] {
        &self.members
    }

    pub fn add_member(&mut self, node: ElementId) {
        self.members.push(node);
    }

    pub fn remove_member(&mut self, node: ElementId) {
        self.members.retain(|member| *member != node);
    }
}

/// Model element kinds the engine asks the store to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Package,
    Activity,
    Partition,
    InitialNode,
    FinalNode,
    StructuredNode,
    CallBehaviorAction,
    InputPin(PinRole),
    OutputPin(PinRole),
    ControlFlow {
        source: ElementId,
        target: ElementId,
    },
    Diagram,
}

impl ElementKind {
    /// Returns `true` for the four activity node kinds.
    pub fn is_node(self) -> bool {
        matches!(
            self,
            Self::InitialNode | Self::FinalNode | Self::StructuredNode | Self::CallBehaviorAction
        )
    }
}

/// Descriptor for an element to be created in the model store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpec {
    kind: ElementKind,
    name: String,
    documentation: String,
}

impl ElementSpec {
    pub fn new(kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            documentation: String::new(),
        }
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }
}
