//! Optimizer Adapters
//!
//! - **HttpOptimizerClient** - reqwest client for the optimization service
//! - **MockOptimizerClient** - scripted responses with call tracking (testing)

mod http_client;
mod mock_client;

pub use http_client::{HttpOptimizerClient, HttpOptimizerConfig};
pub use mock_client::MockOptimizerClient;
