// Purpose - moving note events between participants

pub mod router;
pub mod transport;

pub use router::NetworkEventRouter;
pub use transport::{TcpTransport, Transport};
