pub mod api;
pub mod config;
pub mod export;
pub mod forms;
pub mod http_client;
pub mod load;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod session;
pub mod state;
pub mod views;
pub mod worker;
