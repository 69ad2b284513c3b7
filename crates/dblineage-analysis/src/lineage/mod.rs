//! Lineage tree generation and the request-level service around it.

pub mod builder;
pub mod etl;
pub mod graph;
pub mod service;
pub mod tree;

pub use builder::LineageBuilder;
pub use etl::attach_etl_flows;
pub use graph::{EdgeKind, MemoryGraph, ReferenceGraph, StoreGraph};
pub use service::{LineageRequest, LineageResponse, LineageService};
pub use tree::{LineageNode, LineageTree, NodeId, TypeInformation};
