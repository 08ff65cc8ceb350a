use std::io::{ErrorKind, Read};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::warn;
use crate::chunk::RtmpHeader;
use crate::message::{dispatch, Message, MessageType, RtmpMessage};
use crate::{Error, Result, MAX_MESSAGE_LENGTH};

/// Sub-message tag header: type, size, timestamp, extension, stream id
const TAG_HEADER_LEN: usize = 11;
const BACK_POINTER_LEN: usize = 4;

/// One FLV-style tag inside an aggregate message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateItem {
    pub message_type: MessageType,
    pub timestamp: u32,
    pub message_stream_id: u32,
    pub data: Vec<u8>,
}

impl AggregateItem {
    pub fn new(message_type: MessageType, timestamp: u32, message_stream_id: u32, data: Vec<u8>) -> Self {
        AggregateItem {
            message_type,
            timestamp,
            message_stream_id,
            data,
        }
    }

    fn encoded_len(&self) -> usize {
        TAG_HEADER_LEN + self.data.len() + BACK_POINTER_LEN
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Aggregate {
    pub messages: Vec<AggregateItem>,
}

impl Aggregate {
    pub fn new(messages: Vec<AggregateItem>) -> Self {
        Aggregate { messages }
    }

    /// Expand into standalone messages carried on the aggregate's chunk stream.
    ///
    /// Sub-message timestamps are rebased so the first one lands on the
    /// aggregate's own timestamp.
    pub fn sub_messages(&self, header: &RtmpHeader) -> Result<Vec<RtmpMessage>> {
        let base = match self.messages.first() {
            Some(first) => first.timestamp,
            None => return Ok(Vec::new()),
        };

        self.messages
            .iter()
            .map(|item| {
                let timestamp = header
                    .timestamp
                    .wrapping_add(item.timestamp.wrapping_sub(base));
                let sub_header = RtmpHeader::new(
                    header.chunk_stream_id(),
                    timestamp,
                    item.data.len() as u32,
                    item.message_type,
                    item.message_stream_id,
                );
                dispatch(sub_header, &mut item.data.as_slice())
            })
            .collect()
    }
}

impl Message for Aggregate {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        let truncated = |e| Error::truncated_payload("aggregate sub-message", e);

        self.messages.clear();
        loop {
            let mark = match input.read_u8() {
                Ok(mark) => mark,
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            };
            let message_type = MessageType::from_mark(mark)
                .map_err(|_| Error::payload_decode(format!("aggregate carries unknown message type {}", mark)))?;
            let size = input.read_u24::<BigEndian>().map_err(truncated)?;
            let low = input.read_u24::<BigEndian>().map_err(truncated)?;
            let high = input.read_u8().map_err(truncated)? as u32;
            let message_stream_id = input.read_u24::<BigEndian>().map_err(truncated)?;

            let mut data = Vec::new();
            Read::take(&mut *input, size as u64)
                .read_to_end(&mut data)
                .map_err(truncated)?;
            if data.len() != size as usize {
                return Err(Error::payload_decode(format!(
                    "aggregate sub-message declares {} bytes, {} available",
                    size,
                    data.len()
                )));
            }

            let back_pointer = input.read_u32::<BigEndian>().map_err(truncated)?;
            if back_pointer as usize != TAG_HEADER_LEN + data.len() {
                warn!(
                    "Aggregate back pointer {} does not match tag size {}",
                    back_pointer,
                    TAG_HEADER_LEN + data.len()
                );
            }

            self.messages.push(AggregateItem::new(
                message_type,
                (high << 24) | low,
                message_stream_id,
                data,
            ));
        }
        Ok(())
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        let mut body: Vec<u8> = Vec::with_capacity(self.size());
        for item in &self.messages {
            if item.data.len() > MAX_MESSAGE_LENGTH as usize {
                return Err(Error::malformed_header(format!(
                    "aggregate sub-message of {} bytes exceeds 24 bits",
                    item.data.len()
                )));
            }
            if item.message_stream_id > MAX_MESSAGE_LENGTH {
                return Err(Error::malformed_header(format!(
                    "aggregate sub-message stream id {} exceeds 24 bits",
                    item.message_stream_id
                )));
            }
            body.write_u8(item.message_type.mark())?;
            body.write_u24::<BigEndian>(item.data.len() as u32)?;
            body.write_u24::<BigEndian>(item.timestamp & 0x00FF_FFFF)?;
            body.write_u8((item.timestamp >> 24) as u8)?;
            body.write_u24::<BigEndian>(item.message_stream_id)?;
            body.extend_from_slice(&item.data);
            body.write_u32::<BigEndian>((TAG_HEADER_LEN + item.data.len()) as u32)?;
        }
        Ok(body)
    }

    fn message_type(&self) -> MessageType {
        MessageType::Aggregate
    }

    fn size(&self) -> usize {
        self.messages.iter().map(AggregateItem::encoded_len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageBody;

    fn sample() -> Aggregate {
        Aggregate::new(vec![
            AggregateItem::new(MessageType::Video, 1000, 1, vec![0x17, 0x01, 0x00]),
            AggregateItem::new(MessageType::Audio, 1040, 1, vec![0xAF, 0x01]),
        ])
    }

    #[test]
    fn test_tag_layout() {
        let aggregate = sample();
        let bytes = aggregate.encode_body().unwrap();
        assert_eq!(bytes.len(), aggregate.size());
        assert_eq!(&bytes[..11], &[9, 0, 0, 3, 0, 0x03, 0xE8, 0, 0, 0, 1]);
        assert_eq!(&bytes[14..18], &[0, 0, 0, 14]);

        let mut decoded = Aggregate::default();
        decoded.decode_body(&mut bytes.as_slice()).unwrap();
        assert_eq!(decoded, aggregate);
    }

    #[test]
    fn test_extended_timestamp_byte() {
        let aggregate = Aggregate::new(vec![AggregateItem::new(MessageType::Audio, 0x0100_0002, 1, vec![1])]);
        let bytes = aggregate.encode_body().unwrap();
        assert_eq!(&bytes[4..8], &[0, 0, 2, 1]);

        let mut decoded = Aggregate::default();
        decoded.decode_body(&mut bytes.as_slice()).unwrap();
        assert_eq!(decoded.messages[0].timestamp, 0x0100_0002);
    }

    #[test]
    fn test_wide_stream_id_refused() {
        let aggregate = Aggregate::new(vec![AggregateItem::new(MessageType::Audio, 0, 0x0100_0000, vec![1])]);
        assert!(matches!(aggregate.encode_body(), Err(Error::MalformedHeader(_))));

        let aggregate = Aggregate::new(vec![AggregateItem::new(MessageType::Audio, 0, 0x00FF_FFFF, vec![1])]);
        assert_eq!(&aggregate.encode_body().unwrap()[8..11], &[0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_unknown_sub_message_type() {
        let mut bytes = sample().encode_body().unwrap();
        bytes[0] = 7;
        let result = Aggregate::default().decode_body(&mut bytes.as_slice());
        assert!(matches!(result, Err(Error::PayloadDecode(_))));
    }

    #[test]
    fn test_sub_messages_rebased() {
        let header = RtmpHeader::new(5, 50, 0, MessageType::Aggregate, 1);
        let messages = sample().sub_messages(&header).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].header.timestamp, 50);
        assert_eq!(messages[1].header.timestamp, 90);
        assert_eq!(messages[1].header.chunk_stream_id(), 5);
        assert!(matches!(&messages[1].body, MessageBody::Audio(audio) if audio.data == vec![0xAF, 0x01]));
    }
}
