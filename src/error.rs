use std::fmt::{Display, Formatter};

/// The kinds of errors a channel reports. All of them are fatal for the connection: there is no
///  way to resynchronize a channel after any of them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// invalid construction or activation, e.g. activating a channel twice
    Configuration,
    /// the peer violated the protocol, e.g. by sending beyond the advertised window
    ProtocolViolation,
    /// a local collaborator (byte target or source) broke its contract
    InternalInvariant,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration error"),
            ErrorKind::ProtocolViolation => write!(f, "protocol violation"),
            ErrorKind::InternalInvariant => write!(f, "internal invariant violation"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelError {
    pub kind: ErrorKind,
    /// `None` if the channel was not activated yet
    pub channel_id: Option<u32>,
    pub message: String,
}

impl ChannelError {
    pub fn new(kind: ErrorKind, channel_id: Option<u32>, message: impl Into<String>) -> ChannelError {
        ChannelError {
            kind,
            channel_id,
            message: message.into(),
        }
    }

    /// convenience for callers deciding how to tear down a connection: extracts the kind if
    ///  the error originated in a channel
    pub fn kind_of(error: &anyhow::Error) -> Option<ErrorKind> {
        error.downcast_ref::<ChannelError>()
            .map(|e| e.kind)
    }
}

impl Display for ChannelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.channel_id {
            Some(id) => write!(f, "channel {}: {}: {}", id, self.kind, self.message),
            None => write!(f, "inactive channel: {}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for ChannelError {}

/// Returns a [ChannelError] of the given kind from the enclosing function, wrapped into an
///  `anyhow::Error`. A `warn!` is logged since these errors terminate the connection.
#[macro_export]
macro_rules! fail_channel {
    ($kind:expr, $channel_id:expr, $($arg:tt)+) => {{
        let kind: $crate::error::ErrorKind = $kind;
        let channel_id: Option<u32> = $channel_id;
        let msg = format!($($arg)+);
        tracing::warn!("{:?} on channel {:?}: {}", kind, channel_id, msg);
        return Err(anyhow::Error::new($crate::error::ChannelError::new(kind, channel_id, msg)));
    }};
}

/// Like `anyhow::ensure!`, but failing with a [ChannelError] of the given kind
#[macro_export]
macro_rules! ensure_channel {
    ($cond:expr, $kind:expr, $channel_id:expr, $($arg:tt)+) => {
        if !($cond) {
            $crate::fail_channel!($kind, $channel_id, $($arg)+);
        }
    };
}
