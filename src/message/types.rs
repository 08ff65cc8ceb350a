use std::fmt;
use crate::protocol::constants::*;
use crate::{Error, Result};

/// Every message kind the framing layer can carry.
///
/// The wire mark of each variant is fixed; `from_mark` is the only way to turn
/// a byte back into a variant and it refuses anything outside the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    SetChunkSize,
    Abort,
    Acknowledgement,
    UserControl,
    WindowAcknowledgementSize,
    SetPeerBandwidth,
    Audio,
    Video,
    DataAmf0,
    DataAmf3,
    SharedObjectAmf0,
    SharedObjectAmf3,
    CommandAmf0,
    CommandAmf3,
    Aggregate,
}

impl MessageType {
    pub const ALL: [MessageType; 15] = [
        MessageType::SetChunkSize,
        MessageType::Abort,
        MessageType::Acknowledgement,
        MessageType::UserControl,
        MessageType::WindowAcknowledgementSize,
        MessageType::SetPeerBandwidth,
        MessageType::Audio,
        MessageType::Video,
        MessageType::DataAmf0,
        MessageType::DataAmf3,
        MessageType::SharedObjectAmf0,
        MessageType::SharedObjectAmf3,
        MessageType::CommandAmf0,
        MessageType::CommandAmf3,
        MessageType::Aggregate,
    ];

    /// Look up the variant carrying `mark`
    pub fn from_mark(mark: u8) -> Result<Self> {
        match mark {
            MSG_TYPE_SET_CHUNK_SIZE => Ok(MessageType::SetChunkSize),
            MSG_TYPE_ABORT => Ok(MessageType::Abort),
            MSG_TYPE_ACK => Ok(MessageType::Acknowledgement),
            MSG_TYPE_USER_CONTROL => Ok(MessageType::UserControl),
            MSG_TYPE_WINDOW_ACK => Ok(MessageType::WindowAcknowledgementSize),
            MSG_TYPE_SET_PEER_BW => Ok(MessageType::SetPeerBandwidth),
            MSG_TYPE_AUDIO => Ok(MessageType::Audio),
            MSG_TYPE_VIDEO => Ok(MessageType::Video),
            MSG_TYPE_DATA_AMF0 => Ok(MessageType::DataAmf0),
            MSG_TYPE_DATA_AMF3 => Ok(MessageType::DataAmf3),
            MSG_TYPE_SHARED_OBJECT_AMF0 => Ok(MessageType::SharedObjectAmf0),
            MSG_TYPE_SHARED_OBJECT_AMF3 => Ok(MessageType::SharedObjectAmf3),
            MSG_TYPE_COMMAND_AMF0 => Ok(MessageType::CommandAmf0),
            MSG_TYPE_COMMAND_AMF3 => Ok(MessageType::CommandAmf3),
            MSG_TYPE_AGGREGATE => Ok(MessageType::Aggregate),
            other => Err(Error::UnknownMessageType(other)),
        }
    }

    /// Wire mark for this variant
    pub fn mark(self) -> u8 {
        match self {
            MessageType::SetChunkSize => MSG_TYPE_SET_CHUNK_SIZE,
            MessageType::Abort => MSG_TYPE_ABORT,
            MessageType::Acknowledgement => MSG_TYPE_ACK,
            MessageType::UserControl => MSG_TYPE_USER_CONTROL,
            MessageType::WindowAcknowledgementSize => MSG_TYPE_WINDOW_ACK,
            MessageType::SetPeerBandwidth => MSG_TYPE_SET_PEER_BW,
            MessageType::Audio => MSG_TYPE_AUDIO,
            MessageType::Video => MSG_TYPE_VIDEO,
            MessageType::DataAmf0 => MSG_TYPE_DATA_AMF0,
            MessageType::DataAmf3 => MSG_TYPE_DATA_AMF3,
            MessageType::SharedObjectAmf0 => MSG_TYPE_SHARED_OBJECT_AMF0,
            MessageType::SharedObjectAmf3 => MSG_TYPE_SHARED_OBJECT_AMF3,
            MessageType::CommandAmf0 => MSG_TYPE_COMMAND_AMF0,
            MessageType::CommandAmf3 => MSG_TYPE_COMMAND_AMF3,
            MessageType::Aggregate => MSG_TYPE_AGGREGATE,
        }
    }

    /// Check if this is a protocol control message
    pub fn is_protocol_control(self) -> bool {
        matches!(
            self,
            MessageType::SetChunkSize
                | MessageType::Abort
                | MessageType::Acknowledgement
                | MessageType::WindowAcknowledgementSize
                | MessageType::SetPeerBandwidth
        )
    }

    /// Check if this is a media message (audio/video)
    pub fn is_media(self) -> bool {
        matches!(self, MessageType::Audio | MessageType::Video)
    }

    /// Check if the body is prefixed by the AMF3 format selector
    pub fn is_amf3(self) -> bool {
        matches!(
            self,
            MessageType::DataAmf3 | MessageType::SharedObjectAmf3 | MessageType::CommandAmf3
        )
    }

    /// Chunk stream a message of this kind travels on unless told otherwise
    pub fn default_chunk_stream_id(self) -> u32 {
        match self {
            MessageType::SetChunkSize
            | MessageType::Abort
            | MessageType::Acknowledgement
            | MessageType::UserControl
            | MessageType::WindowAcknowledgementSize
            | MessageType::SetPeerBandwidth => CHUNK_STREAM_PROTOCOL_CONTROL,
            MessageType::Video => CHUNK_STREAM_VIDEO,
            MessageType::Audio => CHUNK_STREAM_AUDIO,
            _ => CHUNK_STREAM_OVER_CONNECTION,
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = Error;

    fn try_from(mark: u8) -> Result<Self> {
        MessageType::from_mark(mark)
    }
}

impl From<MessageType> for u8 {
    fn from(message_type: MessageType) -> u8 {
        message_type.mark()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.mark())
    }
}
