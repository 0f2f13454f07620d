pub mod config;
pub mod executor;
pub mod guest_module;
pub mod server;
pub mod socket_core;

pub use config::HostArgs;
pub use executor::Executor;
pub use guest_module::GuestModule;
pub use server::{Backend, Server};
pub use socket_core::SocketServer;
