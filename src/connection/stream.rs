use log::debug;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use crate::chunk::{ChunkReader, ChunkWriter};
use crate::config::{validate_chunk_size, CodecConfig};
use crate::message::{decode_packet, MessageBody, RtmpMessage, SetChunkSize};
use crate::Result;

/// Whole-message reads and writes over one transport.
///
/// Protocol control that changes framing is applied as it passes: an inbound
/// SET_CHUNK_SIZE resizes the reader, an inbound ABORT drops the named
/// partial message, and an outbound SET_CHUNK_SIZE resizes the writer once
/// it has been sent.
pub struct MessageStream<S> {
    transport: S,
    reader: ChunkReader,
    writer: ChunkWriter,
}

impl<S: AsyncRead + AsyncWrite + Unpin> MessageStream<S> {
    pub fn new(transport: S, config: &CodecConfig) -> Result<Self> {
        Ok(MessageStream {
            transport,
            reader: ChunkReader::new(config)?,
            writer: ChunkWriter::new(config)?,
        })
    }

    pub fn reader(&self) -> &ChunkReader {
        &self.reader
    }

    pub fn writer(&self) -> &ChunkWriter {
        &self.writer
    }

    pub fn get_ref(&self) -> &S {
        &self.transport
    }

    pub fn into_inner(self) -> S {
        self.transport
    }

    /// Read the next complete message
    pub async fn read_message(&mut self) -> Result<RtmpMessage> {
        let packet = self.reader.read_packet(&mut self.transport).await?;
        let message = decode_packet(&packet)?;

        match &message.body {
            MessageBody::SetChunkSize(set) => self.reader.set_chunk_size(set.chunk_size)?,
            MessageBody::Abort(abort) => {
                if !self.reader.abort(abort.chunk_stream_id) {
                    debug!("Abort for cs_id={} with nothing pending", abort.chunk_stream_id);
                }
            }
            _ => {}
        }

        Ok(message)
    }

    /// Write one message. A SET_CHUNK_SIZE is checked before anything is
    /// sent and resizes the writer once it is out.
    pub async fn write_message(&mut self, message: &RtmpMessage) -> Result<()> {
        let new_chunk_size = match &message.body {
            MessageBody::SetChunkSize(set) => {
                validate_chunk_size(set.chunk_size)?;
                Some(set.chunk_size)
            }
            _ => None,
        };

        self.writer.write_message(message, &mut self.transport).await?;

        if let Some(chunk_size) = new_chunk_size {
            self.writer.set_chunk_size(chunk_size)?;
        }
        Ok(())
    }

    /// Announce a new outgoing chunk size to the peer and start using it
    pub async fn set_chunk_size(&mut self, chunk_size: u32) -> Result<()> {
        validate_chunk_size(chunk_size)?;
        self.write_message(&RtmpMessage::new(SetChunkSize::new(chunk_size))).await
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.transport.shutdown().await?;
        Ok(())
    }
}
