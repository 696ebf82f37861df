//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `SiteStatus`: persisted status of each configured site
//! - `NodeState`: in-memory lifecycle of a crawl tree node

mod node_state;
mod site_status;

// Re-export main types
pub use node_state::NodeState;
pub use site_status::SiteStatus;
