use std::io::Write;
use log::{debug, error};
use crate::chunk::header::{encode_foreign_continuation, encode_header, ChunkType, RtmpHeader};
use crate::chunk::stream::ChunkStreamStates;
use crate::config::{validate_chunk_size, CodecConfig, ContinuationChannel};
use crate::message::{Message, RtmpMessage};
use crate::{Error, Result, DEFAULT_CHUNK_SIZE};

/// Number of chunks a body of `length` bytes occupies. An empty body still
/// takes one chunk, its header.
pub fn chunk_count(length: usize, chunk_size: u32) -> usize {
    if length == 0 {
        1
    } else {
        length.div_ceil(chunk_size.max(1) as usize)
    }
}

/// Encode a body, refusing one whose declared size disagrees with its encoding
pub fn encode_checked(body: &dyn Message) -> Result<Vec<u8>> {
    let declared = body.size();
    let encoded = body.encode_body()?;
    if encoded.len() != declared {
        error!(
            "{} declares {} bytes but encodes to {}, not sent",
            body.message_type(),
            declared,
            encoded.len()
        );
        return Err(Error::size_mismatch(declared, encoded.len()));
    }
    Ok(encoded)
}

/// Splits outgoing messages into chunks.
///
/// Owns the write-direction header state; one per connection.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: u32,
    continuation_channel: ContinuationChannel,
    states: ChunkStreamStates,
}

impl Default for Chunker {
    fn default() -> Self {
        Chunker {
            chunk_size: DEFAULT_CHUNK_SIZE,
            continuation_channel: ContinuationChannel::default(),
            states: ChunkStreamStates::new(),
        }
    }
}

impl Chunker {
    /// Fails with `Configuration` if `config` does not validate
    pub fn new(config: &CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Chunker {
            chunk_size: config.write_chunk_size,
            continuation_channel: config.continuation_channel,
            states: ChunkStreamStates::new(),
        })
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Change the outgoing chunk size; takes effect with the next message
    pub fn set_chunk_size(&mut self, chunk_size: u32) -> Result<()> {
        validate_chunk_size(chunk_size)?;
        debug!("Outgoing chunk size {} -> {}", self.chunk_size, chunk_size);
        self.chunk_size = chunk_size;
        Ok(())
    }

    pub fn continuation_channel(&self) -> ContinuationChannel {
        self.continuation_channel
    }

    pub fn states(&self) -> &ChunkStreamStates {
        &self.states
    }

    /// Write one message as a full header chunk followed by continuation chunks.
    ///
    /// Length and type in the header are taken from the body. Nothing reaches
    /// `output` if the body's declared size disagrees with its encoding or the
    /// header cannot be written.
    pub fn write_message<W: Write + ?Sized>(&mut self, message: &RtmpMessage, output: &mut W) -> Result<()> {
        let body = encode_checked(&message.body)?;

        let mut header = message.header;
        header.message_length = body.len() as u32;
        header.message_type = message.body.message_type();

        let chunk_stream_id = header.chunk_stream_id();
        let continuation_id = self.continuation_channel.resolve(chunk_stream_id);

        // Only the message's own chunk stream is touched; put it back if anything fails
        let saved = self.states.get(chunk_stream_id).copied();
        let written = self.encode_chunks(&header, &body, continuation_id, output);
        if written.is_err() {
            match saved {
                Some(state) => self.states.record(chunk_stream_id, state),
                None => {
                    self.states.remove(chunk_stream_id);
                }
            }
        }
        written?;

        debug!(
            "Wrote {} message: cs_id={}, timestamp={}, length={}, chunks={}",
            header.message_type,
            chunk_stream_id,
            header.timestamp,
            header.message_length,
            chunk_count(body.len(), self.chunk_size)
        );

        Ok(())
    }

    fn encode_chunks<W: Write + ?Sized>(
        &mut self,
        header: &RtmpHeader,
        body: &[u8],
        continuation_id: u32,
        output: &mut W,
    ) -> Result<()> {
        let chunk_stream_id = header.chunk_stream_id();
        let mut out: Vec<u8> = Vec::with_capacity(body.len() + 18 + chunk_count(body.len(), self.chunk_size) * 5);
        encode_header(header, ChunkType::Type0, chunk_stream_id, &mut self.states, &mut out)?;

        let mut chunks = body.chunks(self.chunk_size.max(1) as usize);
        if let Some(first) = chunks.next() {
            out.extend_from_slice(first);
        }
        for chunk in chunks {
            if continuation_id == chunk_stream_id {
                encode_header(header, ChunkType::Type3, continuation_id, &mut self.states, &mut out)?;
            } else {
                encode_foreign_continuation(header, continuation_id, &mut out)?;
            }
            out.extend_from_slice(chunk);
        }

        output.write_all(&out)?;
        Ok(())
    }
}
