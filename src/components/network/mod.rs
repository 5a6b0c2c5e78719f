mod animation;
mod component;
mod config;
mod error;
mod graph;
mod interaction;
mod scene;
mod simulation;
mod state;
mod surface;
mod theme;
mod types;

pub use component::NetworkGraph;
pub use error::NetworkResult;
pub use graph::Graph;
pub use types::GraphData;
