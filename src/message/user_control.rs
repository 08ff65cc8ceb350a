use std::io::Read;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use crate::message::{Message, MessageType};
use crate::{Error, Result};

pub const EVENT_STREAM_BEGIN: u16 = 0;
pub const EVENT_STREAM_EOF: u16 = 1;
pub const EVENT_STREAM_DRY: u16 = 2;
pub const EVENT_SET_BUFFER_LENGTH: u16 = 3;
pub const EVENT_STREAM_IS_RECORDED: u16 = 4;
pub const EVENT_PING_REQUEST: u16 = 6;
pub const EVENT_PING_RESPONSE: u16 = 7;
pub const EVENT_BUFFER_EMPTY: u16 = 31;
pub const EVENT_BUFFER_READY: u16 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserControlEvent {
    StreamBegin { stream_id: u32 },
    StreamEof { stream_id: u32 },
    StreamDry { stream_id: u32 },
    SetBufferLength { stream_id: u32, buffer_length: u32 },
    StreamIsRecorded { stream_id: u32 },
    PingRequest { timestamp: u32 },
    PingResponse { timestamp: u32 },
    BufferEmpty { stream_id: u32 },
    BufferReady { stream_id: u32 },
}

impl UserControlEvent {
    pub fn event_type(&self) -> u16 {
        match self {
            UserControlEvent::StreamBegin { .. } => EVENT_STREAM_BEGIN,
            UserControlEvent::StreamEof { .. } => EVENT_STREAM_EOF,
            UserControlEvent::StreamDry { .. } => EVENT_STREAM_DRY,
            UserControlEvent::SetBufferLength { .. } => EVENT_SET_BUFFER_LENGTH,
            UserControlEvent::StreamIsRecorded { .. } => EVENT_STREAM_IS_RECORDED,
            UserControlEvent::PingRequest { .. } => EVENT_PING_REQUEST,
            UserControlEvent::PingResponse { .. } => EVENT_PING_RESPONSE,
            UserControlEvent::BufferEmpty { .. } => EVENT_BUFFER_EMPTY,
            UserControlEvent::BufferReady { .. } => EVENT_BUFFER_READY,
        }
    }

    fn data_len(&self) -> usize {
        match self {
            UserControlEvent::SetBufferLength { .. } => 8,
            _ => 4,
        }
    }
}

/// Stream-level event carried on the protocol control chunk stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserControl {
    pub event: UserControlEvent,
}

impl UserControl {
    pub fn new(event: UserControlEvent) -> Self {
        UserControl { event }
    }

    /// Answer to a ping request, echoing its timestamp
    pub fn ping_response(&self) -> Option<UserControl> {
        match self.event {
            UserControlEvent::PingRequest { timestamp } => {
                Some(UserControl::new(UserControlEvent::PingResponse { timestamp }))
            }
            _ => None,
        }
    }
}

impl Default for UserControl {
    fn default() -> Self {
        UserControl::new(UserControlEvent::StreamBegin { stream_id: 0 })
    }
}

impl Message for UserControl {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        let truncated = |e| Error::truncated_payload("user control event", e);
        let event_type = input.read_u16::<BigEndian>().map_err(truncated)?;
        let value = input.read_u32::<BigEndian>().map_err(truncated)?;

        self.event = match event_type {
            EVENT_STREAM_BEGIN => UserControlEvent::StreamBegin { stream_id: value },
            EVENT_STREAM_EOF => UserControlEvent::StreamEof { stream_id: value },
            EVENT_STREAM_DRY => UserControlEvent::StreamDry { stream_id: value },
            EVENT_SET_BUFFER_LENGTH => UserControlEvent::SetBufferLength {
                stream_id: value,
                buffer_length: input.read_u32::<BigEndian>().map_err(truncated)?,
            },
            EVENT_STREAM_IS_RECORDED => UserControlEvent::StreamIsRecorded { stream_id: value },
            EVENT_PING_REQUEST => UserControlEvent::PingRequest { timestamp: value },
            EVENT_PING_RESPONSE => UserControlEvent::PingResponse { timestamp: value },
            EVENT_BUFFER_EMPTY => UserControlEvent::BufferEmpty { stream_id: value },
            EVENT_BUFFER_READY => UserControlEvent::BufferReady { stream_id: value },
            other => {
                return Err(Error::payload_decode(format!("unknown user control event {}", other)));
            }
        };
        Ok(())
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        let mut body: Vec<u8> = Vec::with_capacity(self.size());
        body.write_u16::<BigEndian>(self.event.event_type())?;
        match self.event {
            UserControlEvent::StreamBegin { stream_id }
            | UserControlEvent::StreamEof { stream_id }
            | UserControlEvent::StreamDry { stream_id }
            | UserControlEvent::StreamIsRecorded { stream_id }
            | UserControlEvent::BufferEmpty { stream_id }
            | UserControlEvent::BufferReady { stream_id } => {
                body.write_u32::<BigEndian>(stream_id)?;
            }
            UserControlEvent::SetBufferLength { stream_id, buffer_length } => {
                body.write_u32::<BigEndian>(stream_id)?;
                body.write_u32::<BigEndian>(buffer_length)?;
            }
            UserControlEvent::PingRequest { timestamp } | UserControlEvent::PingResponse { timestamp } => {
                body.write_u32::<BigEndian>(timestamp)?;
            }
        }
        Ok(body)
    }

    fn message_type(&self) -> MessageType {
        MessageType::UserControl
    }

    fn size(&self) -> usize {
        2 + self.event.data_len()
    }
}
