pub mod abi;
pub mod config;
pub mod error;
pub mod etherscan;
pub mod generator;
pub mod logging;
pub mod queries;
pub mod selectors;
pub mod server;
pub mod table_definitions;
pub mod utils;
