use std::io::Read;
use crate::chunk::RtmpHeader;
use crate::message::aggregate::Aggregate;
use crate::message::command::{CommandAmf0, CommandAmf3};
use crate::message::control::{
    Abort, Acknowledgement, SetChunkSize, SetPeerBandwidth, WindowAcknowledgementSize,
};
use crate::message::data::{DataAmf0, DataAmf3};
use crate::message::media::{Audio, Video};
use crate::message::shared_object::{SharedObjectAmf0, SharedObjectAmf3};
use crate::message::types::MessageType;
use crate::message::user_control::UserControl;
use crate::Result;

/// The capability set every concrete message kind provides.
///
/// `size()` must always equal `encode_body()?.len()`; the chunker refuses to
/// write a message that breaks this.
pub trait Message {
    /// Populate the payload from raw body bytes. `input` is limited to the body.
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()>;

    fn encode_body(&self) -> Result<Vec<u8>>;

    fn message_type(&self) -> MessageType;

    fn size(&self) -> usize;
}

/// Payload of one message, one variant per `MessageType`
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    SetChunkSize(SetChunkSize),
    Abort(Abort),
    Acknowledgement(Acknowledgement),
    UserControl(UserControl),
    WindowAcknowledgementSize(WindowAcknowledgementSize),
    SetPeerBandwidth(SetPeerBandwidth),
    Audio(Audio),
    Video(Video),
    DataAmf0(DataAmf0),
    DataAmf3(DataAmf3),
    SharedObjectAmf0(SharedObjectAmf0),
    SharedObjectAmf3(SharedObjectAmf3),
    CommandAmf0(CommandAmf0),
    CommandAmf3(CommandAmf3),
    Aggregate(Aggregate),
}

impl MessageBody {
    /// Unpopulated body for a message kind, ready for `decode_body`
    pub fn empty(message_type: MessageType) -> Self {
        match message_type {
            MessageType::SetChunkSize => MessageBody::SetChunkSize(SetChunkSize::default()),
            MessageType::Abort => MessageBody::Abort(Abort::default()),
            MessageType::Acknowledgement => MessageBody::Acknowledgement(Acknowledgement::default()),
            MessageType::UserControl => MessageBody::UserControl(UserControl::default()),
            MessageType::WindowAcknowledgementSize => {
                MessageBody::WindowAcknowledgementSize(WindowAcknowledgementSize::default())
            }
            MessageType::SetPeerBandwidth => MessageBody::SetPeerBandwidth(SetPeerBandwidth::default()),
            MessageType::Audio => MessageBody::Audio(Audio::default()),
            MessageType::Video => MessageBody::Video(Video::default()),
            MessageType::DataAmf0 => MessageBody::DataAmf0(DataAmf0::default()),
            MessageType::DataAmf3 => MessageBody::DataAmf3(DataAmf3::default()),
            MessageType::SharedObjectAmf0 => MessageBody::SharedObjectAmf0(SharedObjectAmf0::default()),
            MessageType::SharedObjectAmf3 => MessageBody::SharedObjectAmf3(SharedObjectAmf3::default()),
            MessageType::CommandAmf0 => MessageBody::CommandAmf0(CommandAmf0::default()),
            MessageType::CommandAmf3 => MessageBody::CommandAmf3(CommandAmf3::default()),
            MessageType::Aggregate => MessageBody::Aggregate(Aggregate::default()),
        }
    }

    fn inner(&self) -> &dyn Message {
        match self {
            MessageBody::SetChunkSize(m) => m,
            MessageBody::Abort(m) => m,
            MessageBody::Acknowledgement(m) => m,
            MessageBody::UserControl(m) => m,
            MessageBody::WindowAcknowledgementSize(m) => m,
            MessageBody::SetPeerBandwidth(m) => m,
            MessageBody::Audio(m) => m,
            MessageBody::Video(m) => m,
            MessageBody::DataAmf0(m) => m,
            MessageBody::DataAmf3(m) => m,
            MessageBody::SharedObjectAmf0(m) => m,
            MessageBody::SharedObjectAmf3(m) => m,
            MessageBody::CommandAmf0(m) => m,
            MessageBody::CommandAmf3(m) => m,
            MessageBody::Aggregate(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Message {
        match self {
            MessageBody::SetChunkSize(m) => m,
            MessageBody::Abort(m) => m,
            MessageBody::Acknowledgement(m) => m,
            MessageBody::UserControl(m) => m,
            MessageBody::WindowAcknowledgementSize(m) => m,
            MessageBody::SetPeerBandwidth(m) => m,
            MessageBody::Audio(m) => m,
            MessageBody::Video(m) => m,
            MessageBody::DataAmf0(m) => m,
            MessageBody::DataAmf3(m) => m,
            MessageBody::SharedObjectAmf0(m) => m,
            MessageBody::SharedObjectAmf3(m) => m,
            MessageBody::CommandAmf0(m) => m,
            MessageBody::CommandAmf3(m) => m,
            MessageBody::Aggregate(m) => m,
        }
    }
}

impl Message for MessageBody {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        self.inner_mut().decode_body(input)
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        self.inner().encode_body()
    }

    fn message_type(&self) -> MessageType {
        self.inner().message_type()
    }

    fn size(&self) -> usize {
        self.inner().size()
    }
}

macro_rules! impl_into_body {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for MessageBody {
                fn from(message: $variant) -> Self {
                    MessageBody::$variant(message)
                }
            }
        )*
    };
}

impl_into_body!(
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
);

/// A message together with the one header it owns.
///
/// On the read path the header comes off the wire; on the write path the
/// chunker derives length and type from the body at send time.
#[derive(Debug, Clone, PartialEq)]
pub struct RtmpMessage {
    pub header: RtmpHeader,
    pub body: MessageBody,
}

impl RtmpMessage {
    /// Wrap an outgoing body on its kind's conventional chunk stream
    pub fn new(body: impl Into<MessageBody>) -> Self {
        let body = body.into();
        let mut header = RtmpHeader::for_type(body.message_type());
        header.message_length = body.size() as u32;
        RtmpMessage { header, body }
    }

    /// Empty body bound to an incoming header
    pub fn empty(header: RtmpHeader) -> Self {
        RtmpMessage {
            body: MessageBody::empty(header.message_type),
            header,
        }
    }

    pub fn with_timestamp(mut self, timestamp: u32) -> Self {
        self.header.timestamp = timestamp;
        self
    }

    pub fn with_message_stream_id(mut self, message_stream_id: u32) -> Self {
        self.header.message_stream_id = message_stream_id;
        self
    }

    pub fn with_chunk_stream_id(mut self, chunk_stream_id: u32) -> Self {
        self.header.basic_header.chunk_stream_id = chunk_stream_id;
        self
    }

    pub fn header(&self) -> &RtmpHeader {
        &self.header
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn into_body(self) -> MessageBody {
        self.body
    }

    pub fn message_type(&self) -> MessageType {
        self.body.message_type()
    }

    pub fn size(&self) -> usize {
        self.body.size()
    }

    /// Header as it goes on the wire: length and type taken from the body
    pub fn send_header(&self) -> RtmpHeader {
        RtmpHeader {
            message_length: self.body.size() as u32,
            message_type: self.body.message_type(),
            ..self.header
        }
    }
}
