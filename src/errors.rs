#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Command channel closed")]
    ChannelClosed,

    #[error("Reply channel dropped")]
    ReplyDropped,
}
