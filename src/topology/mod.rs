//! Road network model: locations, directed segments, the graph.
//!
//! Every physical road is represented as two directed [`RoadSegment`]s,
//! so traversal is always direction-aware, while danger accounting stays
//! direction-independent through [`EndpointPair`]'s undirected
//! equality/hash contract.
//!
//! The [`Topology`] is built once per optimization run and never
//! structurally mutated afterwards; the hazard simulator copies segment
//! state rather than writing snow levels back here.

mod graph;
mod location;
mod segment;

pub use graph::{RoadRecord, Topology};
pub use location::{Location, LocationId};
pub use segment::{EndpointPair, RoadSegment, SegmentId};
