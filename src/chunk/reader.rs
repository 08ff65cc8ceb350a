use std::collections::HashMap;
use std::io::{Error as IoError, ErrorKind};
use log::{debug, trace, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use crate::chunk::header::{decode_header, BasicHeader, ChunkType, RtmpHeader};
use crate::chunk::stream::ChunkStreamStates;
use crate::config::{validate_chunk_size, CodecConfig};
use crate::{Error, Result, RtmpPacket, DEFAULT_CHUNK_SIZE, MAX_PENDING_MESSAGES, MAX_TIMESTAMP_FIELD};

/// Body collected so far for a message spread over several chunks
#[derive(Debug, Clone)]
struct PartialMessage {
    header: RtmpHeader,
    payload: Vec<u8>,
}

impl PartialMessage {
    /// Reserves one chunk up front; the rest grows as chunks arrive
    fn new(header: RtmpHeader, chunk_size: u32) -> Self {
        let reserve = header.message_length.min(chunk_size) as usize;
        PartialMessage {
            header,
            payload: Vec::with_capacity(reserve),
        }
    }

    fn remaining(&self) -> usize {
        (self.header.message_length as usize).saturating_sub(self.payload.len())
    }
}

/// Reassembles messages from interleaved chunks on an async transport.
///
/// Owns the read-direction header state; one per connection.
#[derive(Debug, Clone)]
pub struct ChunkReader {
    states: ChunkStreamStates,
    partial: HashMap<u32, PartialMessage>,
    chunk_size: u32,
}

impl Default for ChunkReader {
    fn default() -> Self {
        ChunkReader {
            states: ChunkStreamStates::new(),
            partial: HashMap::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ChunkReader {
    /// Fails with `Configuration` if `config` does not validate
    pub fn new(config: &CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(ChunkReader {
            states: ChunkStreamStates::new(),
            partial: HashMap::new(),
            chunk_size: config.read_chunk_size,
        })
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Set incoming chunk size, as announced by the peer's SET_CHUNK_SIZE
    pub fn set_chunk_size(&mut self, chunk_size: u32) -> Result<()> {
        validate_chunk_size(chunk_size)?;
        debug!("Incoming chunk size {} -> {}", self.chunk_size, chunk_size);
        self.chunk_size = chunk_size;
        Ok(())
    }

    /// Drop the partly received message on a chunk stream.
    /// Returns whether there was one.
    pub fn abort(&mut self, chunk_stream_id: u32) -> bool {
        match self.partial.remove(&chunk_stream_id) {
            Some(partial) => {
                debug!(
                    "Aborted message on cs_id={} with {} of {} bytes received",
                    chunk_stream_id,
                    partial.payload.len(),
                    partial.header.message_length
                );
                true
            }
            None => false,
        }
    }

    /// Number of chunk streams with a message in progress
    pub fn pending(&self) -> usize {
        self.partial.len()
    }

    pub fn states(&self) -> &ChunkStreamStates {
        &self.states
    }

    /// Read one chunk. Returns the packet it completes, if any.
    ///
    /// End of stream before the first byte of a chunk surfaces as an
    /// `Io` error of kind `UnexpectedEof`; inside a header it is a
    /// `MalformedHeader`, inside a payload a `Chunk` error.
    pub async fn read_chunk<R: AsyncRead + Unpin>(&mut self, reader: &mut R) -> Result<Option<RtmpPacket>> {
        let raw = self.read_raw_header(reader).await?;
        let header = decode_header(&mut raw.as_slice(), &mut self.states)?;
        let chunk_stream_id = header.chunk_stream_id();
        let chunk_type = header.chunk_type();

        let mut partial = match self.partial.remove(&chunk_stream_id) {
            Some(partial) if chunk_type == ChunkType::Type3 => partial,
            Some(partial) => {
                warn!(
                    "{:?} header on cs_id={} replaces incomplete message ({} of {} bytes)",
                    chunk_type,
                    chunk_stream_id,
                    partial.payload.len(),
                    partial.header.message_length
                );
                PartialMessage::new(header, self.chunk_size)
            }
            None if chunk_type == ChunkType::Type3 => {
                // New message with every field repeated, timestamp advanced by the last delta
                let delta = self
                    .states
                    .get(chunk_stream_id)
                    .map(|state| state.timestamp_delta)
                    .unwrap_or(0);
                let mut next = header;
                next.timestamp = header.timestamp.wrapping_add(delta);
                self.states.advance_timestamp(chunk_stream_id, next.timestamp);
                PartialMessage::new(next, self.chunk_size)
            }
            None => PartialMessage::new(header, self.chunk_size),
        };

        let len = partial.remaining().min(self.chunk_size as usize);
        let start = partial.payload.len();
        partial.payload.resize(start + len, 0);
        reader
            .read_exact(&mut partial.payload[start..])
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => Error::chunk(format!("payload truncated on cs_id={}", chunk_stream_id)),
                _ => Error::Io(e),
            })?;

        trace!(
            "Read chunk cs_id={}: {} bytes, {} remaining",
            chunk_stream_id,
            len,
            partial.remaining()
        );

        if partial.remaining() > 0 {
            if self.partial.len() >= MAX_PENDING_MESSAGES {
                return Err(Error::chunk(format!(
                    "more than {} chunk streams with incomplete messages",
                    MAX_PENDING_MESSAGES
                )));
            }
            self.partial.insert(chunk_stream_id, partial);
            return Ok(None);
        }

        debug!(
            "Reassembled {} message: cs_id={}, timestamp={}, length={}, stream_id={}",
            partial.header.message_type,
            chunk_stream_id,
            partial.header.timestamp,
            partial.header.message_length,
            partial.header.message_stream_id
        );
        Ok(Some(RtmpPacket::new(partial.header, partial.payload)))
    }

    /// Read chunks until a message completes
    pub async fn read_packet<R: AsyncRead + Unpin>(&mut self, reader: &mut R) -> Result<RtmpPacket> {
        loop {
            if let Some(packet) = self.read_chunk(reader).await? {
                return Ok(packet);
            }
        }
    }

    /// Collect the bytes of one chunk header so the sync codec can decode it
    async fn read_raw_header<R: AsyncRead + Unpin>(&self, reader: &mut R) -> Result<Vec<u8>> {
        let truncated = |e: IoError| Error::truncated_header("chunk header", e);

        let first = reader.read_u8().await?;
        let mut raw = vec![first];

        let extra = BasicHeader::extra_len(first);
        if extra > 0 {
            read_more(reader, &mut raw, extra).await.map_err(truncated)?;
        }
        let basic_header = BasicHeader::decode(&mut raw.as_slice())?;
        let chunk_type = basic_header.chunk_type;

        let start = raw.len();
        read_more(reader, &mut raw, chunk_type.message_header_len())
            .await
            .map_err(truncated)?;

        let extended = match chunk_type {
            ChunkType::Type3 => self
                .states
                .get(basic_header.chunk_stream_id)
                .is_some_and(|state| state.extended_timestamp.is_some()),
            _ => {
                let field = u32::from_be_bytes([0, raw[start], raw[start + 1], raw[start + 2]]);
                field == MAX_TIMESTAMP_FIELD
            }
        };
        if extended {
            read_more(reader, &mut raw, 4).await.map_err(truncated)?;
        }

        Ok(raw)
    }
}

async fn read_more<R: AsyncRead + Unpin>(reader: &mut R, raw: &mut Vec<u8>, len: usize) -> std::io::Result<()> {
    let start = raw.len();
    raw.resize(start + len, 0);
    reader.read_exact(&mut raw[start..]).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunker;
    use crate::message::{decode_packet, Audio, MessageBody, MessageType, RtmpMessage, Video};

    fn chunked(chunker: &mut Chunker, message: &RtmpMessage) -> Vec<u8> {
        let mut out = Vec::new();
        chunker.write_message(message, &mut out).unwrap();
        out
    }

    #[tokio::test]
    async fn test_reassemble_300_bytes() {
        let mut chunker = Chunker::default();
        let message = RtmpMessage::new(Audio::new((0..300).map(|i| i as u8).collect())).with_timestamp(40);
        let bytes = chunked(&mut chunker, &message);

        let mut reader = ChunkReader::default();
        let mut input = bytes.as_slice();
        assert!(reader.read_chunk(&mut input).await.unwrap().is_none());
        assert!(reader.read_chunk(&mut input).await.unwrap().is_none());
        assert_eq!(reader.pending(), 1);
        let packet = reader.read_chunk(&mut input).await.unwrap().unwrap();
        assert_eq!(packet.timestamp(), 40);
        assert_eq!(decode_packet(&packet).unwrap().body, message.body);
        assert_eq!(reader.pending(), 0);
    }

    #[tokio::test]
    async fn test_interleaved_streams() {
        let mut chunker = Chunker::default();
        let audio = RtmpMessage::new(Audio::new(vec![1; 200]));
        let video = RtmpMessage::new(Video::new(vec![2; 200]));
        let a = chunked(&mut chunker, &audio);
        let v = chunked(&mut chunker, &video);

        // first chunk of each, then the continuations
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&a[..140]);
        bytes.extend_from_slice(&v[..140]);
        bytes.extend_from_slice(&a[140..]);
        bytes.extend_from_slice(&v[140..]);

        let mut reader = ChunkReader::default();
        let mut input = bytes.as_slice();
        let first = reader.read_packet(&mut input).await.unwrap();
        let second = reader.read_packet(&mut input).await.unwrap();
        assert_eq!(first.message_type(), MessageType::Audio);
        assert_eq!(first.payload, vec![1; 200]);
        assert_eq!(second.message_type(), MessageType::Video);
        assert_eq!(second.payload, vec![2; 200]);
    }

    #[tokio::test]
    async fn test_type3_new_message_applies_delta() {
        // type 0 at 1000, type 2 with delta 40, then a bare type 3 message
        let bytes = vec![
            0x07, 0x00, 0x03, 0xE8, 0x00, 0x00, 0x01, 0x08, 0x01, 0x00, 0x00, 0x00, 0xAA,
            0x87, 0x00, 0x00, 0x28, 0xBB,
            0xC7, 0xCC,
        ];
        let mut reader = ChunkReader::default();
        let mut input = bytes.as_slice();
        let timestamps = [
            reader.read_packet(&mut input).await.unwrap().timestamp(),
            reader.read_packet(&mut input).await.unwrap().timestamp(),
            reader.read_packet(&mut input).await.unwrap().timestamp(),
        ];
        assert_eq!(timestamps, [1000, 1040, 1080]);
    }

    #[tokio::test]
    async fn test_abort_discards_partial() {
        let mut chunker = Chunker::default();
        let first = chunked(&mut chunker, &RtmpMessage::new(Audio::new(vec![1; 200])));
        let second = chunked(&mut chunker, &RtmpMessage::new(Audio::new(vec![2; 10])).with_timestamp(5));

        let mut reader = ChunkReader::default();
        assert!(reader.read_chunk(&mut &first[..140]).await.unwrap().is_none());
        assert!(reader.abort(7));
        assert!(!reader.abort(7));

        let packet = reader.read_packet(&mut second.as_slice()).await.unwrap();
        assert_eq!(packet.payload, vec![2; 10]);
    }

    #[tokio::test]
    async fn test_larger_chunk_size() {
        let config = CodecConfig::builder().chunk_size(4096).build().unwrap();
        let mut chunker = Chunker::new(&config).unwrap();
        let message = RtmpMessage::new(Video::new(vec![9; 5000]));
        let bytes = chunked(&mut chunker, &message);
        assert_eq!(bytes.len(), 12 + 5000 + 1);

        let mut reader = ChunkReader::new(&config).unwrap();
        let packet = reader.read_packet(&mut bytes.as_slice()).await.unwrap();
        assert!(matches!(decode_packet(&packet).unwrap().body, MessageBody::Video(v) if v.data.len() == 5000));
    }

    #[tokio::test]
    async fn test_extended_timestamp_continuations() {
        let mut chunker = Chunker::default();
        let message = RtmpMessage::new(Audio::new(vec![3; 300])).with_timestamp(0x0123_4567);
        let bytes = chunked(&mut chunker, &message);

        let mut reader = ChunkReader::default();
        let packet = reader.read_packet(&mut bytes.as_slice()).await.unwrap();
        assert_eq!(packet.timestamp(), 0x0123_4567);
        assert_eq!(packet.payload, vec![3; 300]);
    }

    /// Type 0 header declaring `length` bytes of audio on `chunk_stream_id`
    fn type0_header(chunk_stream_id: u32, length: u32) -> Vec<u8> {
        let mut out = Vec::new();
        BasicHeader::new(ChunkType::Type0, chunk_stream_id).encode(&mut out).unwrap();
        out.extend_from_slice(&[0, 0, 0]);
        out.extend_from_slice(&length.to_be_bytes()[1..]);
        out.extend_from_slice(&[0x08, 0, 0, 0, 0]);
        out
    }

    #[test]
    fn test_invalid_read_chunk_size_rejected() {
        let config = CodecConfig {
            read_chunk_size: 0,
            ..CodecConfig::default()
        };
        assert!(matches!(ChunkReader::new(&config), Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_declared_length_not_preallocated() {
        let mut bytes = type0_header(4, 0x00FF_FFFF);
        bytes.extend_from_slice(&[0x55; 128]);

        let mut reader = ChunkReader::default();
        assert!(reader.read_chunk(&mut bytes.as_slice()).await.unwrap().is_none());
        let partial = &reader.partial[&4];
        assert_eq!(partial.payload.len(), 128);
        assert!(partial.payload.capacity() < 4096);
    }

    #[tokio::test]
    async fn test_pending_messages_capped() {
        let mut bytes = Vec::new();
        for chunk_stream_id in 3..3 + MAX_PENDING_MESSAGES as u32 + 1 {
            bytes.extend_from_slice(&type0_header(chunk_stream_id, 1000));
            bytes.extend_from_slice(&[0; 128]);
        }

        let mut reader = ChunkReader::default();
        let mut input = bytes.as_slice();
        for _ in 0..MAX_PENDING_MESSAGES {
            assert!(reader.read_chunk(&mut input).await.unwrap().is_none());
        }
        assert_eq!(reader.pending(), MAX_PENDING_MESSAGES);

        let result = reader.read_chunk(&mut input).await;
        assert!(matches!(result, Err(Error::Chunk(_))));
    }

    #[tokio::test]
    async fn test_truncation_errors() {
        let mut reader = ChunkReader::default();
        let result = reader.read_chunk(&mut &[0x07u8, 0x00, 0x00][..]).await;
        assert!(matches!(result, Err(Error::MalformedHeader(_))));

        let mut reader = ChunkReader::default();
        let bytes = [0x07u8, 0, 0, 0, 0, 0, 4, 0x08, 0, 0, 0, 0, 1, 2];
        let result = reader.read_chunk(&mut &bytes[..]).await;
        assert!(matches!(result, Err(Error::Chunk(_))));

        let mut reader = ChunkReader::default();
        let result = reader.read_chunk(&mut &[0xC7u8][..]).await;
        assert!(matches!(result, Err(Error::MalformedHeader(_))));

        let result = reader.read_chunk(&mut &[0u8; 0][..]).await;
        assert!(matches!(result, Err(Error::Io(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof));
    }
}
