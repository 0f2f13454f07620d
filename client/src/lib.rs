mod socket_client;

pub use socket_client::SocketClient;
