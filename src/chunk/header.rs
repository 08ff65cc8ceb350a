use std::io::{Error as IoError, Read, Write};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use log::trace;
use crate::chunk::stream::{ChunkStreamState, ChunkStreamStates};
use crate::message::MessageType;
use crate::protocol::constants::*;
use crate::{Error, Result};

/// Chunk header format, the top two bits of the first byte of every chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    /// Full message header
    Type0,
    /// No message stream id
    Type1,
    /// Timestamp delta only
    Type2,
    /// No message header at all
    Type3,
}

impl ChunkType {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => ChunkType::Type0,
            1 => ChunkType::Type1,
            2 => ChunkType::Type2,
            _ => ChunkType::Type3,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            ChunkType::Type0 => 0,
            ChunkType::Type1 => 1,
            ChunkType::Type2 => 2,
            ChunkType::Type3 => 3,
        }
    }

    /// Message header length, not counting an extended timestamp
    pub fn message_header_len(self) -> usize {
        match self {
            ChunkType::Type0 => 11,
            ChunkType::Type1 => 7,
            ChunkType::Type2 => 3,
            ChunkType::Type3 => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicHeader {
    pub chunk_type: ChunkType,
    pub chunk_stream_id: u32,
}

impl BasicHeader {
    pub fn new(chunk_type: ChunkType, chunk_stream_id: u32) -> Self {
        BasicHeader {
            chunk_type,
            chunk_stream_id,
        }
    }

    /// Bytes that follow the first one, judging by its low six bits
    pub fn extra_len(first_byte: u8) -> usize {
        match first_byte & 0x3F {
            0 => 1,
            1 => 2,
            _ => 0,
        }
    }

    /// Encoded size for a chunk stream id
    pub fn encoded_len(chunk_stream_id: u32) -> Result<usize> {
        match chunk_stream_id {
            2..=63 => Ok(1),
            64..=319 => Ok(2),
            320..=MAX_CHUNK_STREAM_ID => Ok(3),
            _ => Err(Error::malformed_header(format!(
                "chunk stream id {} outside {}..={}",
                chunk_stream_id, MIN_CHUNK_STREAM_ID, MAX_CHUNK_STREAM_ID
            ))),
        }
    }

    pub fn decode<R: Read + ?Sized>(input: &mut R) -> Result<Self> {
        let truncated = |e: IoError| Error::truncated_header("basic header", e);

        let first_byte = input.read_u8().map_err(truncated)?;
        let chunk_type = ChunkType::from_bits(first_byte >> 6);
        let chunk_stream_id = match first_byte & 0x3F {
            0 => input.read_u8().map_err(truncated)? as u32 + 64,
            1 => input.read_u16::<LittleEndian>().map_err(truncated)? as u32 + 64,
            n => n as u32,
        };

        Ok(BasicHeader::new(chunk_type, chunk_stream_id))
    }

    pub fn encode<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        let fmt = self.chunk_type.bits() << 6;
        match BasicHeader::encoded_len(self.chunk_stream_id)? {
            1 => output.write_u8(fmt | self.chunk_stream_id as u8)?,
            2 => {
                output.write_u8(fmt)?;
                output.write_u8((self.chunk_stream_id - 64) as u8)?;
            }
            _ => {
                output.write_u8(fmt | 1)?;
                output.write_u16::<LittleEndian>((self.chunk_stream_id - 64) as u16)?;
            }
        }
        Ok(())
    }
}

/// Basic header plus the message header fields, as reconstructed for one chunk.
///
/// `timestamp` is always absolute here; deltas only exist on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtmpHeader {
    pub basic_header: BasicHeader,
    pub timestamp: u32,
    pub message_length: u32,
    pub message_type: MessageType,
    pub message_stream_id: u32,
}

impl RtmpHeader {
    /// Create a full (type 0) header
    pub fn new(
        chunk_stream_id: u32,
        timestamp: u32,
        message_length: u32,
        message_type: MessageType,
        message_stream_id: u32,
    ) -> Self {
        RtmpHeader {
            basic_header: BasicHeader::new(ChunkType::Type0, chunk_stream_id),
            timestamp,
            message_length,
            message_type,
            message_stream_id,
        }
    }

    /// Empty header on the conventional chunk stream for `message_type`
    pub fn for_type(message_type: MessageType) -> Self {
        RtmpHeader::new(message_type.default_chunk_stream_id(), 0, 0, message_type, 0)
    }

    pub fn chunk_type(&self) -> ChunkType {
        self.basic_header.chunk_type
    }

    pub fn chunk_stream_id(&self) -> u32 {
        self.basic_header.chunk_stream_id
    }

    /// Check if timestamp needs the extended field (>= 0xFFFFFF)
    pub fn has_extended_timestamp(&self) -> bool {
        self.timestamp >= MAX_TIMESTAMP_FIELD
    }
}

/// Split a timestamp (or delta) into the 3-byte field and the optional 4-byte extension
fn split_timestamp(value: u32) -> (u32, Option<u32>) {
    if value >= MAX_TIMESTAMP_FIELD {
        (MAX_TIMESTAMP_FIELD, Some(value))
    } else {
        (value, None)
    }
}

fn read_extended<R: Read + ?Sized>(input: &mut R, field: u32) -> Result<Option<u32>> {
    if field != MAX_TIMESTAMP_FIELD {
        return Ok(None);
    }
    let value = input
        .read_u32::<BigEndian>()
        .map_err(|e| Error::truncated_header("extended timestamp", e))?;
    Ok(Some(value))
}

fn prior_state(
    states: &ChunkStreamStates,
    chunk_stream_id: u32,
    chunk_type: ChunkType,
) -> Result<ChunkStreamState> {
    states.get(chunk_stream_id).copied().ok_or_else(|| {
        Error::malformed_header(format!(
            "{:?} header on chunk stream {} without a previous header",
            chunk_type, chunk_stream_id
        ))
    })
}

/// Read one chunk header, resolving abbreviated forms against `states`.
///
/// Type 0, 1 and 2 headers update the chunk stream's state; type 3 only reads it.
pub fn decode_header<R: Read + ?Sized>(
    input: &mut R,
    states: &mut ChunkStreamStates,
) -> Result<RtmpHeader> {
    let basic_header = BasicHeader::decode(input)?;
    let chunk_type = basic_header.chunk_type;
    let chunk_stream_id = basic_header.chunk_stream_id;
    let truncated = |e: IoError| Error::truncated_header("message header", e);

    let header = match chunk_type {
        ChunkType::Type0 => {
            let field = input.read_u24::<BigEndian>().map_err(truncated)?;
            let message_length = input.read_u24::<BigEndian>().map_err(truncated)?;
            let mark = input.read_u8().map_err(truncated)?;
            let message_stream_id = input.read_u32::<LittleEndian>().map_err(truncated)?;
            let extended = read_extended(input, field)?;
            let message_type = MessageType::from_mark(mark)?;

            let header = RtmpHeader {
                basic_header,
                timestamp: extended.unwrap_or(field),
                message_length,
                message_type,
                message_stream_id,
            };
            states.record(chunk_stream_id, ChunkStreamState::new(header, 0, extended));
            header
        }
        ChunkType::Type1 => {
            let prev = prior_state(states, chunk_stream_id, chunk_type)?;
            let field = input.read_u24::<BigEndian>().map_err(truncated)?;
            let message_length = input.read_u24::<BigEndian>().map_err(truncated)?;
            let mark = input.read_u8().map_err(truncated)?;
            let extended = read_extended(input, field)?;
            let message_type = MessageType::from_mark(mark)?;
            let delta = extended.unwrap_or(field);

            let header = RtmpHeader {
                basic_header,
                timestamp: prev.last_header.timestamp.wrapping_add(delta),
                message_length,
                message_type,
                message_stream_id: prev.last_header.message_stream_id,
            };
            states.record(chunk_stream_id, ChunkStreamState::new(header, delta, extended));
            header
        }
        ChunkType::Type2 => {
            let prev = prior_state(states, chunk_stream_id, chunk_type)?;
            let field = input.read_u24::<BigEndian>().map_err(truncated)?;
            let extended = read_extended(input, field)?;
            let delta = extended.unwrap_or(field);

            let header = RtmpHeader {
                basic_header,
                timestamp: prev.last_header.timestamp.wrapping_add(delta),
                ..prev.last_header
            };
            states.record(chunk_stream_id, ChunkStreamState::new(header, delta, extended));
            header
        }
        ChunkType::Type3 => {
            let prev = prior_state(states, chunk_stream_id, chunk_type)?;
            if prev.extended_timestamp.is_some() {
                input
                    .read_u32::<BigEndian>()
                    .map_err(|e| Error::truncated_header("extended timestamp", e))?;
            }
            RtmpHeader {
                basic_header,
                ..prev.last_header
            }
        }
    };

    trace!(
        "Decoded {:?} header: cs_id={}, timestamp={}, length={}, type={}, stream_id={}",
        chunk_type,
        chunk_stream_id,
        header.timestamp,
        header.message_length,
        header.message_type,
        header.message_stream_id
    );

    Ok(header)
}

/// Write `header` as a chunk header of the given form on the given chunk stream.
///
/// The chunk type and chunk stream id are explicit because one message header
/// is written once in full and then repeated in abbreviated form. Nothing is
/// written when the header is refused.
pub fn encode_header<W: Write + ?Sized>(
    header: &RtmpHeader,
    chunk_type: ChunkType,
    chunk_stream_id: u32,
    states: &mut ChunkStreamStates,
    output: &mut W,
) -> Result<()> {
    if header.message_length > MAX_MESSAGE_LENGTH {
        return Err(Error::malformed_header(format!(
            "message length {} does not fit in 24 bits",
            header.message_length
        )));
    }

    let basic_header = BasicHeader::new(chunk_type, chunk_stream_id);
    let mut bytes: Vec<u8> = Vec::with_capacity(3 + chunk_type.message_header_len() + 4);
    basic_header.encode(&mut bytes)?;

    let recorded = RtmpHeader {
        basic_header,
        ..*header
    };

    let new_state = match chunk_type {
        ChunkType::Type0 => {
            let (field, extended) = split_timestamp(header.timestamp);
            bytes.write_u24::<BigEndian>(field)?;
            bytes.write_u24::<BigEndian>(header.message_length)?;
            bytes.write_u8(header.message_type.mark())?;
            bytes.write_u32::<LittleEndian>(header.message_stream_id)?;
            if let Some(value) = extended {
                bytes.write_u32::<BigEndian>(value)?;
            }
            Some(ChunkStreamState::new(recorded, 0, extended))
        }
        ChunkType::Type1 => {
            let prev = prior_state(states, chunk_stream_id, chunk_type)?;
            if prev.last_header.message_stream_id != header.message_stream_id {
                return Err(Error::malformed_header(format!(
                    "type 1 header cannot change message stream id on chunk stream {}",
                    chunk_stream_id
                )));
            }
            let delta = header.timestamp.wrapping_sub(prev.last_header.timestamp);
            let (field, extended) = split_timestamp(delta);
            bytes.write_u24::<BigEndian>(field)?;
            bytes.write_u24::<BigEndian>(header.message_length)?;
            bytes.write_u8(header.message_type.mark())?;
            if let Some(value) = extended {
                bytes.write_u32::<BigEndian>(value)?;
            }
            Some(ChunkStreamState::new(recorded, delta, extended))
        }
        ChunkType::Type2 => {
            let prev = prior_state(states, chunk_stream_id, chunk_type)?;
            let last = prev.last_header;
            if last.message_stream_id != header.message_stream_id
                || last.message_length != header.message_length
                || last.message_type != header.message_type
            {
                return Err(Error::malformed_header(format!(
                    "type 2 header cannot change length, type or stream id on chunk stream {}",
                    chunk_stream_id
                )));
            }
            let delta = header.timestamp.wrapping_sub(last.timestamp);
            let (field, extended) = split_timestamp(delta);
            bytes.write_u24::<BigEndian>(field)?;
            if let Some(value) = extended {
                bytes.write_u32::<BigEndian>(value)?;
            }
            Some(ChunkStreamState::new(recorded, delta, extended))
        }
        ChunkType::Type3 => {
            let prev = prior_state(states, chunk_stream_id, chunk_type)?;
            if let Some(value) = prev.extended_timestamp {
                bytes.write_u32::<BigEndian>(value)?;
            }
            None
        }
    };

    output.write_all(&bytes)?;

    if let Some(state) = new_state {
        states.record(chunk_stream_id, state);
    }

    trace!(
        "Encoded {:?} header: cs_id={}, timestamp={}, length={}, type={}",
        chunk_type,
        chunk_stream_id,
        header.timestamp,
        header.message_length,
        header.message_type
    );

    Ok(())
}

/// Write a bare type 3 header on a chunk stream other than the message's own.
///
/// Header state is neither read nor recorded: the 4-byte extended timestamp is
/// repeated when the message's own timestamp needed it.
pub fn encode_foreign_continuation<W: Write + ?Sized>(
    header: &RtmpHeader,
    chunk_stream_id: u32,
    output: &mut W,
) -> Result<()> {
    let mut bytes: Vec<u8> = Vec::with_capacity(7);
    BasicHeader::new(ChunkType::Type3, chunk_stream_id).encode(&mut bytes)?;
    if let (_, Some(value)) = split_timestamp(header.timestamp) {
        bytes.write_u32::<BigEndian>(value)?;
    }
    output.write_all(&bytes)?;
    Ok(())
}
