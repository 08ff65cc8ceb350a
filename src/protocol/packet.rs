use crate::chunk::RtmpHeader;
use crate::message::MessageType;

/// One reassembled message: its header plus the linearized body bytes,
/// before dispatch to a concrete message variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtmpPacket {
    pub header: RtmpHeader,
    pub payload: Vec<u8>,
}

impl RtmpPacket {
    /// Create new packet
    pub fn new(header: RtmpHeader, payload: Vec<u8>) -> Self {
        RtmpPacket { header, payload }
    }

    pub fn header(&self) -> &RtmpHeader {
        &self.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn message_type(&self) -> MessageType {
        self.header.message_type
    }

    pub fn chunk_stream_id(&self) -> u32 {
        self.header.basic_header.chunk_stream_id
    }

    pub fn message_stream_id(&self) -> u32 {
        self.header.message_stream_id
    }

    pub fn timestamp(&self) -> u32 {
        self.header.timestamp
    }
}
