use thiserror::Error;

/// Errors from the panel hub.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("no panel with id '{0}'")]
    NoSuchPanel(String),
    #[error("panel '{0}' is no longer accepting messages")]
    ChannelClosed(String),
}
