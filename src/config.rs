use crate::{Error, Result, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, MAX_CHUNK_STREAM_ID, MIN_CHUNK_STREAM_ID};

/// Which chunk stream continuation (type 3) chunks are written on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContinuationChannel {
    /// The chunk stream the message itself was started on
    #[default]
    SameAsMessage,

    /// Always this chunk stream. Compatibility with peers built around the
    /// older framer that wrote every continuation on one channel.
    Fixed(u32),
}

impl ContinuationChannel {
    pub fn resolve(self, message_chunk_stream_id: u32) -> u32 {
        match self {
            ContinuationChannel::SameAsMessage => message_chunk_stream_id,
            ContinuationChannel::Fixed(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Chunk size assumed for incoming chunks until the peer sends SET_CHUNK_SIZE
    pub read_chunk_size: u32,

    /// Chunk size used for outgoing chunks
    pub write_chunk_size: u32,

    pub continuation_channel: ContinuationChannel,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            read_chunk_size: DEFAULT_CHUNK_SIZE,
            write_chunk_size: DEFAULT_CHUNK_SIZE,
            continuation_channel: ContinuationChannel::SameAsMessage,
        }
    }
}

/// Check a chunk size against the range SET_CHUNK_SIZE can express
pub fn validate_chunk_size(chunk_size: u32) -> Result<()> {
    if chunk_size == 0 {
        return Err(Error::config("Chunk size must be at least 1"));
    }
    if chunk_size > MAX_CHUNK_SIZE {
        return Err(Error::config(format!(
            "Chunk size must not exceed {}",
            MAX_CHUNK_SIZE
        )));
    }
    Ok(())
}

impl CodecConfig {
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        validate_chunk_size(self.read_chunk_size)?;
        validate_chunk_size(self.write_chunk_size)?;

        if let ContinuationChannel::Fixed(id) = self.continuation_channel {
            if !(MIN_CHUNK_STREAM_ID..=MAX_CHUNK_STREAM_ID).contains(&id) {
                return Err(Error::config(format!(
                    "Continuation chunk stream {} outside {}..={}",
                    id, MIN_CHUNK_STREAM_ID, MAX_CHUNK_STREAM_ID
                )));
            }
        }

        Ok(())
    }
}

pub struct CodecConfigBuilder {
    config: CodecConfig,
}

impl Default for CodecConfigBuilder {
    fn default() -> Self {
        CodecConfigBuilder::new()
    }
}

impl CodecConfigBuilder {
    pub fn new() -> Self {
        CodecConfigBuilder {
            config: CodecConfig::default(),
        }
    }

    pub fn read_chunk_size(mut self, size: u32) -> Self {
        self.config.read_chunk_size = size;
        self
    }

    pub fn write_chunk_size(mut self, size: u32) -> Self {
        self.config.write_chunk_size = size;
        self
    }

    /// Set both directions at once
    pub fn chunk_size(self, size: u32) -> Self {
        self.read_chunk_size(size).write_chunk_size(size)
    }

    pub fn continuation_channel(mut self, channel: ContinuationChannel) -> Self {
        self.config.continuation_channel = channel;
        self
    }

    pub fn build(self) -> Result<CodecConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.read_chunk_size, 128);
        assert_eq!(config.write_chunk_size, 128);
        assert_eq!(config.continuation_channel, ContinuationChannel::SameAsMessage);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_bad_values() {
        assert!(matches!(
            CodecConfig::builder().write_chunk_size(0).build(),
            Err(Error::Configuration(_))
        ));
        assert!(CodecConfig::builder().read_chunk_size(0x8000_0000).build().is_err());
        assert!(CodecConfig::builder()
            .continuation_channel(ContinuationChannel::Fixed(1))
            .build()
            .is_err());
        assert!(CodecConfig::builder()
            .continuation_channel(ContinuationChannel::Fixed(65600))
            .build()
            .is_err());
    }

    #[test]
    fn test_builder() {
        let config = CodecConfig::builder()
            .chunk_size(4096)
            .continuation_channel(ContinuationChannel::Fixed(3))
            .build()
            .unwrap();
        assert_eq!(config.read_chunk_size, 4096);
        assert_eq!(config.write_chunk_size, 4096);
        assert_eq!(config.continuation_channel.resolve(6), 3);
        assert_eq!(ContinuationChannel::SameAsMessage.resolve(6), 6);
    }
}
