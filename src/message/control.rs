use std::io::Read;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use crate::config::validate_chunk_size;
use crate::message::{Message, MessageType};
use crate::{Error, Result};

fn read_u32_field(input: &mut dyn Read, what: &str) -> Result<u32> {
    input
        .read_u32::<BigEndian>()
        .map_err(|e| Error::truncated_payload(what, e))
}

fn u32_body(value: u32) -> Result<Vec<u8>> {
    let mut body: Vec<u8> = Vec::with_capacity(4);
    body.write_u32::<BigEndian>(value)?;
    Ok(body)
}

/// Maximum payload size of the chunks that follow on the sender's side.
/// The high bit is reserved and always cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetChunkSize {
    pub chunk_size: u32,
}

impl SetChunkSize {
    pub fn new(chunk_size: u32) -> Self {
        SetChunkSize {
            chunk_size: chunk_size & 0x7FFF_FFFF,
        }
    }
}

impl Default for SetChunkSize {
    fn default() -> Self {
        SetChunkSize::new(crate::DEFAULT_CHUNK_SIZE)
    }
}

impl Message for SetChunkSize {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        let chunk_size = read_u32_field(input, "set chunk size")? & 0x7FFF_FFFF;
        if chunk_size == 0 {
            return Err(Error::payload_decode("chunk size of zero"));
        }
        self.chunk_size = chunk_size;
        Ok(())
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        validate_chunk_size(self.chunk_size)?;
        u32_body(self.chunk_size)
    }

    fn message_type(&self) -> MessageType {
        MessageType::SetChunkSize
    }

    fn size(&self) -> usize {
        4
    }
}

/// Tells the peer to drop the partially received message on a chunk stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Abort {
    pub chunk_stream_id: u32,
}

impl Abort {
    pub fn new(chunk_stream_id: u32) -> Self {
        Abort { chunk_stream_id }
    }
}

impl Message for Abort {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        self.chunk_stream_id = read_u32_field(input, "abort")?;
        Ok(())
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        u32_body(self.chunk_stream_id)
    }

    fn message_type(&self) -> MessageType {
        MessageType::Abort
    }

    fn size(&self) -> usize {
        4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Acknowledgement {
    /// Bytes received so far
    pub sequence_number: u32,
}

impl Acknowledgement {
    pub fn new(sequence_number: u32) -> Self {
        Acknowledgement { sequence_number }
    }
}

impl Message for Acknowledgement {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        self.sequence_number = read_u32_field(input, "acknowledgement")?;
        Ok(())
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        u32_body(self.sequence_number)
    }

    fn message_type(&self) -> MessageType {
        MessageType::Acknowledgement
    }

    fn size(&self) -> usize {
        4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAcknowledgementSize {
    pub window_size: u32,
}

impl WindowAcknowledgementSize {
    pub fn new(window_size: u32) -> Self {
        WindowAcknowledgementSize { window_size }
    }
}

impl Default for WindowAcknowledgementSize {
    fn default() -> Self {
        WindowAcknowledgementSize::new(crate::DEFAULT_WINDOW_SIZE)
    }
}

impl Message for WindowAcknowledgementSize {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        self.window_size = read_u32_field(input, "window acknowledgement size")?;
        Ok(())
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        u32_body(self.window_size)
    }

    fn message_type(&self) -> MessageType {
        MessageType::WindowAcknowledgementSize
    }

    fn size(&self) -> usize {
        4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeerBandwidthLimit {
    #[default]
    Hard,
    Soft,
    Dynamic,
}

impl PeerBandwidthLimit {
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(PeerBandwidthLimit::Hard),
            1 => Ok(PeerBandwidthLimit::Soft),
            2 => Ok(PeerBandwidthLimit::Dynamic),
            other => Err(Error::payload_decode(format!("unknown peer bandwidth limit type {}", other))),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            PeerBandwidthLimit::Hard => 0,
            PeerBandwidthLimit::Soft => 1,
            PeerBandwidthLimit::Dynamic => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetPeerBandwidth {
    pub window_size: u32,
    pub limit_type: PeerBandwidthLimit,
}

impl SetPeerBandwidth {
    pub fn new(window_size: u32, limit_type: PeerBandwidthLimit) -> Self {
        SetPeerBandwidth {
            window_size,
            limit_type,
        }
    }
}

impl Default for SetPeerBandwidth {
    fn default() -> Self {
        SetPeerBandwidth::new(crate::DEFAULT_WINDOW_SIZE, PeerBandwidthLimit::Dynamic)
    }
}

impl Message for SetPeerBandwidth {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        self.window_size = read_u32_field(input, "set peer bandwidth")?;
        let limit = input
            .read_u8()
            .map_err(|e| Error::truncated_payload("set peer bandwidth limit type", e))?;
        self.limit_type = PeerBandwidthLimit::from_byte(limit)?;
        Ok(())
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        let mut body = u32_body(self.window_size)?;
        body.write_u8(self.limit_type.as_byte())?;
        Ok(body)
    }

    fn message_type(&self) -> MessageType {
        MessageType::SetPeerBandwidth
    }

    fn size(&self) -> usize {
        5
    }
}
