use std::io::Read;
use crate::amf::{Amf0Decoder, Amf0Encoder, Amf0Object, Amf0Value};
use crate::message::command::{amf_body, read_format_selector, with_format_selector};
use crate::message::{Message, MessageType};
use crate::{Error, Result};

/// Notification (metadata, text data) addressed to a handler by name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataAmf0 {
    pub name: String,
    pub values: Vec<Amf0Value>,
}

impl DataAmf0 {
    pub fn new(name: &str) -> Self {
        DataAmf0 {
            name: name.to_string(),
            values: Vec::new(),
        }
    }

    pub fn on_metadata(metadata: Amf0Object) -> Self {
        let mut data = DataAmf0::new("onMetaData");
        data.values.push(Amf0Value::EcmaArray(metadata));
        data
    }

    pub fn set_data_frame(key: &str, value: Amf0Value) -> Self {
        let mut data = DataAmf0::new("@setDataFrame");
        data.values.push(Amf0Value::from(key));
        data.values.push(value);
        data
    }

    /// Metadata properties when this is onMetaData, or @setDataFrame wrapping it
    pub fn metadata(&self) -> Option<&Amf0Object> {
        match self.name.as_str() {
            "onMetaData" => self.values.first().and_then(Amf0Value::as_object),
            "@setDataFrame" => match self.values.first().and_then(Amf0Value::as_string) {
                Some("onMetaData") => self.values.get(1).and_then(Amf0Value::as_object),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Message for DataAmf0 {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        let mut buffer = amf_body(input, "data")?;
        let mut decoder = Amf0Decoder::new(&mut buffer);

        self.name = decoder
            .decode()?
            .as_string()
            .ok_or_else(|| Error::payload_decode("data handler name must be a string"))?
            .to_string();
        self.values = decoder.decode_all()?;
        Ok(())
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        let mut encoder = Amf0Encoder::new();
        encoder.encode(&Amf0Value::from(self.name.as_str()))?;
        for value in &self.values {
            encoder.encode(value)?;
        }
        Ok(encoder.into_bytes())
    }

    fn message_type(&self) -> MessageType {
        MessageType::DataAmf0
    }

    fn size(&self) -> usize {
        Amf0Value::from(self.name.as_str()).encoded_len()
            + self.values.iter().map(Amf0Value::encoded_len).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataAmf3 {
    pub data: DataAmf0,
}

impl DataAmf3 {
    pub fn new(data: DataAmf0) -> Self {
        DataAmf3 { data }
    }
}

impl Message for DataAmf3 {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        read_format_selector(input, "AMF3 data")?;
        self.data.decode_body(input)
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        with_format_selector(self.data.encode_body()?)
    }

    fn message_type(&self) -> MessageType {
        MessageType::DataAmf3
    }

    fn size(&self) -> usize {
        1 + self.data.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> Amf0Object {
        vec![
            ("width".to_string(), Amf0Value::Number(1280.0)),
            ("height".to_string(), Amf0Value::Number(720.0)),
            ("videocodecid".to_string(), Amf0Value::Number(7.0)),
        ]
    }

    #[test]
    fn test_metadata_round_trip() {
        let data = DataAmf0::on_metadata(sample_metadata());
        let bytes = data.encode_body().unwrap();
        assert_eq!(bytes.len(), data.size());

        let mut decoded = DataAmf0::default();
        decoded.decode_body(&mut bytes.as_slice()).unwrap();
        assert_eq!(decoded.metadata(), Some(&sample_metadata()));
    }

    #[test]
    fn test_set_data_frame_metadata() {
        let data = DataAmf0::set_data_frame("onMetaData", Amf0Value::EcmaArray(sample_metadata()));
        assert_eq!(data.metadata().map(|m| m.len()), Some(3));
        assert!(DataAmf0::new("onTextData").metadata().is_none());
    }

    #[test]
    fn test_amf3_data() {
        let data = DataAmf3::new(DataAmf0::on_metadata(sample_metadata()));
        let bytes = data.encode_body().unwrap();
        assert_eq!(bytes.len(), data.size());

        let mut decoded = DataAmf3::default();
        decoded.decode_body(&mut bytes.as_slice()).unwrap();
        assert_eq!(decoded, data);
    }
}
