use std::io::Read;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use crate::message::command::{read_format_selector, with_format_selector};
use crate::message::{Message, MessageType};
use crate::{Error, Result};

/// One raw event; the event data is not interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedObjectEvent {
    pub event_type: u8,
    pub data: Vec<u8>,
}

impl SharedObjectEvent {
    pub fn new(event_type: u8, data: Vec<u8>) -> Self {
        SharedObjectEvent { event_type, data }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SharedObjectAmf0 {
    pub name: String,
    pub version: u32,
    pub flags: [u8; 8],
    pub events: Vec<SharedObjectEvent>,
}

impl SharedObjectAmf0 {
    pub fn new(name: &str, version: u32) -> Self {
        SharedObjectAmf0 {
            name: name.to_string(),
            version,
            flags: [0; 8],
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, event: SharedObjectEvent) -> Self {
        self.events.push(event);
        self
    }
}

impl Message for SharedObjectAmf0 {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        let truncated = |e| Error::truncated_payload("shared object", e);

        let name_len = input.read_u16::<BigEndian>().map_err(truncated)? as usize;
        let mut name = vec![0u8; name_len];
        input.read_exact(&mut name).map_err(truncated)?;
        self.name = String::from_utf8(name)
            .map_err(|e| Error::payload_decode(format!("shared object name: {}", e)))?;
        self.version = input.read_u32::<BigEndian>().map_err(truncated)?;
        input.read_exact(&mut self.flags).map_err(truncated)?;

        self.events.clear();
        loop {
            let event_type = match input.read_u8() {
                Ok(event_type) => event_type,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            };
            let len = input.read_u32::<BigEndian>().map_err(truncated)? as usize;
            let mut data = Vec::new();
            Read::take(&mut *input, len as u64)
                .read_to_end(&mut data)
                .map_err(truncated)?;
            if data.len() != len {
                return Err(Error::payload_decode(format!(
                    "shared object event declares {} bytes, {} available",
                    len,
                    data.len()
                )));
            }
            self.events.push(SharedObjectEvent::new(event_type, data));
        }
        Ok(())
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        if self.name.len() > u16::MAX as usize {
            return Err(Error::amf_encode("shared object name longer than 65535 bytes"));
        }
        let mut body: Vec<u8> = Vec::with_capacity(self.size());
        body.write_u16::<BigEndian>(self.name.len() as u16)?;
        body.extend_from_slice(self.name.as_bytes());
        body.write_u32::<BigEndian>(self.version)?;
        body.extend_from_slice(&self.flags);
        for event in &self.events {
            body.write_u8(event.event_type)?;
            body.write_u32::<BigEndian>(event.data.len() as u32)?;
            body.extend_from_slice(&event.data);
        }
        Ok(body)
    }

    fn message_type(&self) -> MessageType {
        MessageType::SharedObjectAmf0
    }

    fn size(&self) -> usize {
        2 + self.name.len() + 4 + 8 + self.events.iter().map(|e| 5 + e.data.len()).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SharedObjectAmf3 {
    pub shared_object: SharedObjectAmf0,
}

impl SharedObjectAmf3 {
    pub fn new(shared_object: SharedObjectAmf0) -> Self {
        SharedObjectAmf3 { shared_object }
    }
}

impl Message for SharedObjectAmf3 {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        read_format_selector(input, "AMF3 shared object")?;
        self.shared_object.decode_body(input)
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        with_format_selector(self.shared_object.encode_body()?)
    }

    fn message_type(&self) -> MessageType {
        MessageType::SharedObjectAmf3
    }

    fn size(&self) -> usize {
        1 + self.shared_object.size()
    }
}
