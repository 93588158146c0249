pub mod history;
pub mod libraries;
pub mod pool;
pub mod position;
pub mod report;
pub mod subgraph;
pub mod tick;
