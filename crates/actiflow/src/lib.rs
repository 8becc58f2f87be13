//! Actiflow - swimlane activity diagrams from activity tables.
//!
//! Turns an ordered list of activity rows (main actions and their numbered
//! sub actions) into a UML-style activity graph in a host model store, and
//! lays it out as a swimlane diagram with one vertical lane per actor. Main
//! nodes that own sub actions get a nested diagram of their own.
//!
//! The host is reached only through traits: a [`ModelStore`] for model
//! elements, a [`DiagramRenderer`] for shapes and paths, and two interactive
//! choices ([`ActionTypeResolver`], [`ContainmentChooser`]) that may be
//! cancelled. [`MemoryModel`] and [`Canvas`] are in-memory implementations,
//! and [`export::svg`] turns a [`Canvas`] diagram into SVG.
//!
//! [`ModelStore`]: store::ModelStore
//! [`DiagramRenderer`]: render::DiagramRenderer
//! [`ActionTypeResolver`]: collaborators::ActionTypeResolver
//! [`ContainmentChooser`]: collaborators::ContainmentChooser
//! [`MemoryModel`]: store::MemoryModel
//! [`Canvas`]: render::Canvas

pub mod collaborators;
pub mod color;
pub mod config;
pub mod diagram;
pub mod export;
pub mod graph;
pub mod layout;
pub mod partition;
pub mod render;
pub mod store;
pub mod subdiagram;
pub mod synthesis;

mod error;

pub use actiflow_core::{geometry, identifier, row, semantic};

pub use error::{ActiflowError, RenderError, StoreError};

use log::{debug, info};

use actiflow_core::{
    row::ActivityRow,
    semantic::{ElementId, ElementKind, ElementSpec, Node},
};

use collaborators::{ActionTypeResolver, Choice, ContainmentChooser};
use config::AppConfig;
use diagram::{Placement, populate_nodes, populate_paths};
use graph::ActivityGraph;
use layout::{DiagramLayout, LayoutEngine, apply};
use render::{DiagramId, DiagramRenderer, RenderSession};
use store::{ModelStore, Transaction};
use subdiagram::{NestedDiagram, SubdiagramOrchestrator};
use synthesis::GraphSynthesizer;

/// Label of the model store transaction wrapping one import.
pub const IMPORT_TRANSACTION: &str = "Import rows as activity diagram";

/// The interactive step the user declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelStage {
    /// Choosing the node kind of each row.
    ActionTypes,
    /// Choosing the element that owns the new activity.
    Container,
}

/// How an import ended.
#[derive(Debug)]
pub enum ImportOutcome {
    Completed(ImportReport),
    /// Cancelled before anything was written.
    Cancelled(CancelStage),
}

impl ImportOutcome {
    /// Returns the report of a completed import.
    pub fn completed(self) -> Option<ImportReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Cancelled(_) => None,
        }
    }
}

/// Summary of a committed import.
#[derive(Debug)]
pub struct ImportReport {
    root: ElementId,
    main_diagram: DiagramId,
    main_layout: DiagramLayout,
    nested_diagrams: Vec<NestedDiagram>,
    skipped_rows: Vec<String>,
    graph: ActivityGraph,
}

impl ImportReport {
    /// The created root activity.
    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn main_diagram(&self) -> DiagramId {
        self.main_diagram
    }

    pub fn main_layout(&self) -> &DiagramLayout {
        &self.main_layout
    }

    /// Nested diagrams in order of their parent's first mention.
    pub fn nested_diagrams(&self) -> &[NestedDiagram] {
        &self.nested_diagrams
    }

    /// Names of sub rows dropped because their parent could not be resolved.
    pub fn skipped_rows(&self) -> &[String] {
        &self.skipped_rows
    }

    /// The synthesized activity graph, nested scopes included.
    pub fn graph(&self) -> &ActivityGraph {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every diagram created, main first.
    pub fn diagrams(&self) -> impl Iterator<Item = DiagramId> + '_ {
        std::iter::once(self.main_diagram).chain(self.nested_diagrams.iter().map(NestedDiagram::diagram))
    }
}

/// Imports activity rows into a model store and renderer.
///
/// # Examples
///
/// ```
/// use actiflow::{Importer, collaborators::DefaultActionTypes, render::Canvas, row::ActivityRow};
/// use actiflow::store::{MemoryModel, ModelStore};
///
/// let rows = vec![
///     ActivityRow::main("Action A").with_actor("Clerk"),
///     ActivityRow::sub("1.1", "Action A").with_actor("Clerk"),
///     ActivityRow::main("Action B").with_actor("Courier"),
/// ];
///
/// let mut model = MemoryModel::new();
/// let mut canvas = Canvas::new();
/// let mut container = model.primary_model();
///
/// let report = Importer::default()
///     .import(&rows, &mut DefaultActionTypes, &mut container, &mut model, &mut canvas)
///     .unwrap()
///     .completed()
///     .unwrap();
///
/// // main diagram plus one nested diagram for "Action A"
/// assert_eq!(report.diagrams().count(), 2);
/// assert_eq!(canvas.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Importer {
    config: AppConfig,
}

impl Importer {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs one import.
    ///
    /// Both interactive choices are made before the store is touched; a
    /// cancelled choice returns [`ImportOutcome::Cancelled`] with the store
    /// and renderer unchanged. Everything else runs inside one transaction:
    /// on any error the transaction is rolled back, every diagram created so
    /// far is discarded and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ActiflowError::NoActivities`] for an empty row list, or the
    /// [`StoreError`] / [`RenderError`] that aborted the import.
    pub fn import<S, R>(
        &self,
        rows: &[ActivityRow],
        resolver: &mut dyn ActionTypeResolver,
        chooser: &mut dyn ContainmentChooser,
        store: &mut S,
        renderer: &mut R,
    ) -> Result<ImportOutcome, ActiflowError>
    where
        S: ModelStore + ?Sized,
        R: DiagramRenderer + ?Sized,
    {
        if rows.is_empty() {
            return Err(ActiflowError::NoActivities);
        }
        info!(rows = rows.len(); "Importing activity rows");

        let Choice::Selected(selection) = resolver.resolve(rows) else {
            info!("Action type selection cancelled");
            return Ok(ImportOutcome::Cancelled(CancelStage::ActionTypes));
        };
        let Choice::Selected(container) = chooser.choose() else {
            info!("Container selection cancelled");
            return Ok(ImportOutcome::Cancelled(CancelStage::Container));
        };

        let naming = self.config.import();
        let mut tx = Transaction::begin(store, IMPORT_TRANSACTION)?;

        let primary = tx.primary_model();
        let root = tx.add_element(
            ElementSpec::new(ElementKind::Activity, naming.activity_name()),
            primary,
        )?;
        if container != primary {
            tx.move_element(root, container)?;
            debug!(root:%, container:%; "Moved root activity");
        }

        let mut graph = ActivityGraph::new();
        let actors = partition::top_level_actors(rows);
        let lanes = partition::create_partitions(&mut *tx, &mut graph, root, &actors)?;

        let diagram_element = tx.add_element(
            ElementSpec::new(ElementKind::Diagram, naming.diagram_name()),
            root,
        )?;
        let mut session = RenderSession::new(renderer);
        let main_diagram = session.create_diagram(diagram_element, naming.diagram_name())?;
        session.open_diagram(main_diagram)?;

        let synthesizer = GraphSynthesizer::new(naming, &selection);
        let synthesis = synthesizer.synthesize(&mut *tx, &mut graph, root, rows, &lanes)?;

        let lane_group = if lanes.is_empty() {
            None
        } else {
            Some(session.create_lane_group(main_diagram, &lanes.partitions())?)
        };
        let order: Vec<ElementId> = graph.nodes_of(root).map(Node::id).collect();
        populate_nodes(&mut *session, main_diagram, &graph, &order, Placement::InLane)?;

        let main_layout = LayoutEngine::new(self.config.layout()).lay_out(&graph, &lanes, &order);
        apply(&mut *session, main_diagram, lane_group, &main_layout)?;
        let paths = populate_paths(&mut *session, main_diagram, &graph, root)?;
        debug!(diagram:% = main_diagram, nodes = order.len(), paths; "Main diagram populated");

        let nested_diagrams = SubdiagramOrchestrator::new(&self.config, synthesizer).build_all(
            &mut *tx,
            &mut session,
            &mut graph,
            root,
            &lanes,
            rows,
            &synthesis,
        )?;

        tx.commit()?;
        session.finish();

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            nested = nested_diagrams.len(),
            skipped = synthesis.skipped_rows().len();
            "Import committed"
        );

        Ok(ImportOutcome::Completed(ImportReport {
            root,
            main_diagram,
            main_layout,
            nested_diagrams,
            skipped_rows: synthesis.skipped_rows().to_vec(),
            graph,
        }))
    }
}
