pub mod errors;
pub mod hub;
pub mod messages;

pub use errors::PanelError;
pub use hub::{Control, PanelHandler, PanelHub, UpdateSink};
pub use messages::{HostMessage, PageMessage};
