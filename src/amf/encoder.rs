use crate::amf::value::{markers, Amf0Object, Amf0Value};
use crate::{ByteBuffer, Error, Result};

pub struct Amf0Encoder {
    buffer: ByteBuffer,
}

impl Default for Amf0Encoder {
    fn default() -> Self {
        Amf0Encoder::new()
    }
}

impl Amf0Encoder {
    pub fn new() -> Self {
        Amf0Encoder {
            buffer: ByteBuffer::with_capacity(256),
        }
    }

    /// Encode a sequence of values back to back
    pub fn encode_all(values: &[Amf0Value]) -> Result<Vec<u8>> {
        let mut encoder = Amf0Encoder::new();
        for value in values {
            encoder.encode(value)?;
        }
        Ok(encoder.into_bytes())
    }

    pub fn encode(&mut self, value: &Amf0Value) -> Result<()> {
        match value {
            Amf0Value::Number(n) => {
                self.buffer.write_u8(markers::NUMBER)?;
                self.buffer.write_f64_be(*n)?;
            }
            Amf0Value::Boolean(b) => {
                self.buffer.write_u8(markers::BOOLEAN)?;
                self.buffer.write_u8(*b as u8)?;
            }
            Amf0Value::String(s) => {
                self.buffer.write_u8(markers::STRING)?;
                self.write_short_utf8(s)?;
            }
            Amf0Value::Object(obj) => {
                self.buffer.write_u8(markers::OBJECT)?;
                self.write_properties(obj)?;
            }
            Amf0Value::Null => self.buffer.write_u8(markers::NULL)?,
            Amf0Value::Undefined => self.buffer.write_u8(markers::UNDEFINED)?,
            Amf0Value::EcmaArray(obj) => {
                self.buffer.write_u8(markers::ECMA_ARRAY)?;
                self.buffer.write_u32_be(obj.len() as u32)?;
                self.write_properties(obj)?;
            }
            Amf0Value::StrictArray(arr) => {
                self.buffer.write_u8(markers::STRICT_ARRAY)?;
                self.buffer.write_u32_be(arr.len() as u32)?;
                for item in arr {
                    self.encode(item)?;
                }
            }
            Amf0Value::Date(timestamp, timezone) => {
                self.buffer.write_u8(markers::DATE)?;
                self.buffer.write_f64_be(*timestamp)?;
                self.buffer.write_i16_be(*timezone)?;
            }
            Amf0Value::LongString(s) => {
                self.buffer.write_u8(markers::LONG_STRING)?;
                self.write_long_utf8(s)?;
            }
            Amf0Value::Unsupported => self.buffer.write_u8(markers::UNSUPPORTED)?,
            Amf0Value::XmlDocument(xml) => {
                self.buffer.write_u8(markers::XML_DOCUMENT)?;
                self.write_long_utf8(xml)?;
            }
            Amf0Value::TypedObject(class_name, obj) => {
                self.buffer.write_u8(markers::TYPED_OBJECT)?;
                self.write_short_utf8(class_name)?;
                self.write_properties(obj)?;
            }
        }
        Ok(())
    }

    /// Length-prefixed string without a type marker (object keys, short strings)
    fn write_short_utf8(&mut self, value: &str) -> Result<()> {
        let len = u16::try_from(value.len()).map_err(|_| {
            Error::amf_encode(format!("string of {} bytes needs a long string", value.len()))
        })?;
        self.buffer.write_u16_be(len)?;
        self.buffer.write_bytes(value.as_bytes())?;
        Ok(())
    }

    fn write_long_utf8(&mut self, value: &str) -> Result<()> {
        let len = u32::try_from(value.len())
            .map_err(|_| Error::amf_encode(format!("string of {} bytes is too long", value.len())))?;
        self.buffer.write_u32_be(len)?;
        self.buffer.write_bytes(value.as_bytes())?;
        Ok(())
    }

    fn write_properties(&mut self, obj: &Amf0Object) -> Result<()> {
        for (key, value) in obj {
            if key.is_empty() {
                return Err(Error::amf_encode("empty property name"));
            }
            self.write_short_utf8(key)?;
            self.encode(value)?;
        }
        self.buffer.write_u16_be(0)?;
        self.buffer.write_u8(markers::OBJECT_END)?;
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.into_inner()
    }
}
