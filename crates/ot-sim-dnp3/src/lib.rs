//! DNP3 adapter: outstation/master engines plus the server/client channel
//! coordinators that own them (§4.6-§4.8).

pub mod client;
pub mod config;
pub mod database;
pub mod master;
pub mod outstation;
pub mod point;
pub mod server;
pub mod stack;

pub use client::{Client, ChannelListener};
pub use database::Database;
pub use master::Master;
pub use outstation::Outstation;
pub use server::Server;
