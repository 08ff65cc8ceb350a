use std::io::Read;
use crate::message::{Message, MessageType};
use crate::{Error, Result};

fn read_tag(input: &mut dyn Read, what: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    input
        .read_to_end(&mut data)
        .map_err(|e| Error::truncated_payload(what, e))?;
    Ok(data)
}

/// Audio tag bytes, carried as-is
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Audio {
    pub data: Vec<u8>,
}

impl Audio {
    pub fn new(data: Vec<u8>) -> Self {
        Audio { data }
    }
}

impl Message for Audio {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        self.data = read_tag(input, "audio tag")?;
        Ok(())
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        Ok(self.data.clone())
    }

    fn message_type(&self) -> MessageType {
        MessageType::Audio
    }

    fn size(&self) -> usize {
        self.data.len()
    }
}

/// Video tag bytes, carried as-is
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Video {
    pub data: Vec<u8>,
}

impl Video {
    pub fn new(data: Vec<u8>) -> Self {
        Video { data }
    }

    /// Frame type nibble says keyframe
    pub fn is_keyframe(&self) -> bool {
        self.data.first().is_some_and(|b| b >> 4 == 1)
    }
}

impl Message for Video {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        self.data = read_tag(input, "video tag")?;
        Ok(())
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        Ok(self.data.clone())
    }

    fn message_type(&self) -> MessageType {
        MessageType::Video
    }

    fn size(&self) -> usize {
        self.data.len()
    }
}
