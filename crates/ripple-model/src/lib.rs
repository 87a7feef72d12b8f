//! Knowledge model for the ripple reasoner.
//!
//! Plain data types shared by the loader, the rule engine, the propagation
//! engine and the HTTP surface: node/edge/rule records as authored in
//! knowledge packs, and the simulation request/response envelope.

pub mod edge;
pub mod ids;
pub mod node;
pub mod request;
pub mod response;
pub mod rule;

pub use edge::{Delay, Edge, Relation};
pub use ids::NodeId;
pub use node::{Domain, Node, NodeType, NormalRange, StateType};
pub use request::{
    Perturbation, SimulationOptions, SimulationRequest, TimeWindow,
};
pub use response::{
    AffectedNode, ChangeType, CompareRequest, CompareResponse, ComparedNode, Direction, Magnitude,
    SimulationResponse, TraceStep,
};
pub use rule::{PerturbationOp, Rule, SummaryTemplate};
