mod config;
mod preamble;
mod block;
mod store;
mod export;

/// Channel number as used by the instrument (`CHANnel1` is `1`).
pub type ChannelId = u32;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("channel {0} has not been added")]
    MissingChannel(ChannelId),
    #[error("malformed preamble: field #{index} {reason}")]
    MalformedPreamble {
        index: usize,
        reason: String,
    },
    #[error("malformed data block: {0}")]
    MalformedBlock(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> =
    core::result::Result<T, Error>;

pub use config::StoreConfiguration;

pub use preamble::{
    Preamble,
    PREAMBLE_FIELDS,
};

pub use block::{
    SampleWidth,
    ByteOrder,
    Signedness,
    parse_block,
    decode_samples,
};

pub use store::{
    ChannelRecord,
    WaveformStore,
};

pub use export::ExportValue;
