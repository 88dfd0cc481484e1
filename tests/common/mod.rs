pub mod builders;
pub mod mock_client;
pub mod strategies;

pub use builders::*;
pub use mock_client::*;
