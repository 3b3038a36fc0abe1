pub mod collections;
pub mod eligibility;
pub mod gas;
pub mod subgraph;
pub mod tx;

pub use gas::{Fees, GasManager};
pub use subgraph::SubgraphClient;
