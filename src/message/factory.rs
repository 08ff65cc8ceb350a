use std::io::{self, Read};
use log::{debug, warn};
use crate::chunk::{decode_header, ChunkStreamStates, RtmpHeader};
use crate::message::{Message, RtmpMessage};
use crate::{Error, Result, RtmpPacket};

/// Read one unchunked message: a header, then exactly `message_length` body bytes.
///
/// An unknown type mark fails inside `decode_header`, before any message exists.
pub fn read_message<R: Read + ?Sized>(input: &mut R, states: &mut ChunkStreamStates) -> Result<RtmpMessage> {
    let header = decode_header(input, states)?;
    dispatch(header, input)
}

/// Build the message kind named by `header` and decode its body from `input`.
///
/// At most `message_length` bytes are consumed. Bytes the variant leaves
/// unread are discarded so the next header starts where it should.
pub fn dispatch<R: Read + ?Sized>(header: RtmpHeader, input: &mut R) -> Result<RtmpMessage> {
    let mut message = RtmpMessage::empty(header);
    let mut body = Read::take(&mut *input, header.message_length as u64);

    message.body.decode_body(&mut body)?;

    let leftover = io::copy(&mut body, &mut io::sink())?;
    if leftover > 0 {
        warn!(
            "{} body left {} of {} bytes unread, discarded",
            header.message_type, leftover, header.message_length
        );
    }
    if body.limit() > 0 {
        return Err(Error::payload_decode(format!(
            "{} body truncated: {} of {} bytes missing",
            header.message_type,
            body.limit(),
            header.message_length
        )));
    }

    debug!(
        "Dispatched {} message: cs_id={}, timestamp={}, length={}, stream_id={}",
        header.message_type,
        header.chunk_stream_id(),
        header.timestamp,
        header.message_length,
        header.message_stream_id
    );

    Ok(message)
}

/// Dispatch a reassembled packet
pub fn decode_packet(packet: &RtmpPacket) -> Result<RtmpMessage> {
    let mut header = packet.header;
    header.message_length = packet.payload.len() as u32;
    dispatch(header, &mut packet.payload.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{encode_header, ChunkType};
    use crate::message::{
        Audio, CommandAmf0, MessageBody, MessageType, SetChunkSize, UserControl, UserControlEvent,
    };

    fn frame(message: &RtmpMessage) -> Vec<u8> {
        let mut out = Vec::new();
        let mut states = ChunkStreamStates::new();
        let mut header = message.header;
        header.message_length = message.body.size() as u32;
        encode_header(&header, ChunkType::Type0, header.chunk_stream_id(), &mut states, &mut out).unwrap();
        out.extend(message.body.encode_body().unwrap());
        out
    }

    #[test]
    fn test_read_message_sequence() {
        let first = RtmpMessage::new(SetChunkSize::new(4096));
        let second = RtmpMessage::new(CommandAmf0::create_stream(2.0)).with_timestamp(10);
        let mut bytes = frame(&first);
        bytes.extend(frame(&second));

        let mut input = bytes.as_slice();
        let mut states = ChunkStreamStates::new();
        assert_eq!(read_message(&mut input, &mut states).unwrap().body, first.body);
        let decoded = read_message(&mut input, &mut states).unwrap();
        assert_eq!(decoded.body, second.body);
        assert_eq!(decoded.header.timestamp, 10);
        assert!(input.is_empty());
    }

    #[test]
    fn test_unknown_mark_builds_nothing() {
        let mut bytes = frame(&RtmpMessage::new(Audio::new(vec![1, 2])));
        bytes[7] = 7;
        let mut states = ChunkStreamStates::new();
        let result = read_message(&mut bytes.as_slice(), &mut states);
        assert!(matches!(result, Err(Error::UnknownMessageType(7))));
    }

    #[test]
    fn test_unread_bytes_are_drained() {
        // StreamBegin carries 4 bytes of data; declare 2 more
        let mut header = RtmpHeader::new(2, 0, 8, MessageType::UserControl, 0);
        let body = [0u8, 0, 0, 0, 0, 1, 0xEE, 0xEE, 0x42];
        let mut input = &body[..];
        let message = dispatch(header, &mut input).unwrap();
        assert_eq!(
            message.body,
            MessageBody::UserControl(UserControl::new(UserControlEvent::StreamBegin { stream_id: 1 }))
        );
        assert_eq!(input, &[0x42u8][..]);

        header.message_length = 12;
        let result = dispatch(header, &mut &body[..]);
        assert!(matches!(result, Err(Error::PayloadDecode(_))));
    }

    #[test]
    fn test_deeply_nested_command_is_an_error() {
        let mut body = vec![0x02, 0x00, 0x01, b'x', 0x00];
        body.extend_from_slice(&1.0f64.to_be_bytes());
        for _ in 0..1_000_000 {
            body.extend_from_slice(&[0x0A, 0x00, 0x00, 0x00, 0x01]);
        }
        body.push(0x05);

        let header = RtmpHeader::new(3, 0, body.len() as u32, MessageType::CommandAmf0, 0);
        let result = dispatch(header, &mut body.as_slice());
        assert!(matches!(result, Err(Error::AmfDecode(_))));
    }

    #[test]
    fn test_decode_packet() {
        let header = RtmpHeader::new(7, 33, 0, MessageType::Audio, 1);
        let packet = RtmpPacket::new(header, vec![0xAF, 0x00]);
        let message = decode_packet(&packet).unwrap();
        assert_eq!(message.header.message_length, 2);
        assert_eq!(message.body, MessageBody::Audio(Audio::new(vec![0xAF, 0x00])));
    }
}
