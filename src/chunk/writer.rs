use tokio::io::{AsyncWrite, AsyncWriteExt};
use crate::chunk::chunker::{chunk_count, Chunker};
use crate::config::CodecConfig;
use crate::message::{Message, RtmpMessage};
use crate::Result;

/// Writes whole messages to an async transport, one flush per message
#[derive(Debug, Clone, Default)]
pub struct ChunkWriter {
    chunker: Chunker,
}

impl ChunkWriter {
    pub fn new(config: &CodecConfig) -> Result<Self> {
        Ok(ChunkWriter {
            chunker: Chunker::new(config)?,
        })
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunker.chunk_size()
    }

    /// Set outgoing chunk size
    pub fn set_chunk_size(&mut self, chunk_size: u32) -> Result<()> {
        self.chunker.set_chunk_size(chunk_size)
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Chunk a message into memory, then write and flush it
    pub async fn write_message<W: AsyncWrite + Unpin>(
        &mut self,
        message: &RtmpMessage,
        writer: &mut W,
    ) -> Result<()> {
        let len = message.body.size();
        let mut chunks: Vec<u8> = Vec::with_capacity(len + 18 + chunk_count(len, self.chunk_size()) * 5);
        self.chunker.write_message(message, &mut chunks)?;

        writer.write_all(&chunks).await?;
        writer.flush().await?;
        Ok(())
    }
}
