use std::io::Error as IoError;
use crate::amf::value::{markers, Amf0Object, Amf0Value};
use crate::{ByteBuffer, Error, Result};

fn truncated(err: IoError) -> Error {
    Error::amf_decode(format!("truncated value: {}", err))
}

/// Deepest nesting of objects and arrays accepted before decoding gives up
pub const MAX_AMF_DEPTH: usize = 64;

pub struct Amf0Decoder<'a> {
    buffer: &'a mut ByteBuffer,
    depth: usize,
}

impl<'a> Amf0Decoder<'a> {
    pub fn new(buffer: &'a mut ByteBuffer) -> Self {
        Amf0Decoder { buffer, depth: 0 }
    }

    /// Check if decoder has remaining data to decode
    pub fn has_remaining(&self) -> bool {
        self.buffer.remaining() > 0
    }

    /// Decode every value left in the buffer
    pub fn decode_all(&mut self) -> Result<Vec<Amf0Value>> {
        let mut values = Vec::new();
        while self.has_remaining() {
            values.push(self.decode()?);
        }
        Ok(values)
    }

    pub fn decode(&mut self) -> Result<Amf0Value> {
        let marker = self.buffer.read_u8().map_err(truncated)?;
        match marker {
            markers::NUMBER => Ok(Amf0Value::Number(self.read_f64()?)),
            markers::BOOLEAN => Ok(Amf0Value::Boolean(self.buffer.read_u8().map_err(truncated)? != 0)),
            markers::STRING => Ok(Amf0Value::String(self.read_short_utf8()?)),
            markers::OBJECT => Ok(Amf0Value::Object(self.nested(Self::read_properties)?)),
            markers::NULL => Ok(Amf0Value::Null),
            markers::UNDEFINED => Ok(Amf0Value::Undefined),
            markers::ECMA_ARRAY => {
                // Count is advisory; the end marker terminates the list
                self.buffer.read_u32_be().map_err(truncated)?;
                Ok(Amf0Value::EcmaArray(self.nested(Self::read_properties)?))
            }
            markers::STRICT_ARRAY => {
                let count = self.buffer.read_u32_be().map_err(truncated)? as usize;
                let array = self.nested(|decoder| {
                    let mut array = Vec::with_capacity(count.min(decoder.buffer.remaining()));
                    for _ in 0..count {
                        array.push(decoder.decode()?);
                    }
                    Ok(array)
                })?;
                Ok(Amf0Value::StrictArray(array))
            }
            markers::DATE => {
                let timestamp = self.read_f64()?;
                let timezone = self.buffer.read_i16_be().map_err(truncated)?;
                Ok(Amf0Value::Date(timestamp, timezone))
            }
            markers::LONG_STRING => Ok(Amf0Value::LongString(self.read_long_utf8()?)),
            markers::UNSUPPORTED => Ok(Amf0Value::Unsupported),
            markers::XML_DOCUMENT => Ok(Amf0Value::XmlDocument(self.read_long_utf8()?)),
            markers::TYPED_OBJECT => {
                let class_name = self.read_short_utf8()?;
                Ok(Amf0Value::TypedObject(class_name, self.nested(Self::read_properties)?))
            }
            markers::AVMPLUS_OBJECT => Err(Error::not_implemented("AMF3 values inside AMF0 stream")),
            markers::MOVIE_CLIP | markers::REFERENCE | markers::RECORDSET => Err(Error::amf_decode(
                format!("unsupported AMF0 marker: 0x{:02x}", marker),
            )),
            _ => Err(Error::amf_decode(format!("unknown AMF0 marker: 0x{:02x}", marker))),
        }
    }

    /// Run `read` one container level deeper
    fn nested<T>(&mut self, read: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_AMF_DEPTH {
            return Err(Error::amf_decode(format!(
                "values nested deeper than {} levels",
                MAX_AMF_DEPTH
            )));
        }
        self.depth += 1;
        let result = read(self);
        self.depth -= 1;
        result
    }

    fn read_f64(&mut self) -> Result<f64> {
        self.buffer.read_f64_be().map_err(truncated)
    }

    fn read_utf8(&mut self, len: usize) -> Result<String> {
        let bytes = self.buffer.read_bytes(len).map_err(truncated)?;
        String::from_utf8(bytes).map_err(|e| Error::amf_decode(format!("invalid UTF-8: {}", e)))
    }

    fn read_short_utf8(&mut self) -> Result<String> {
        let len = self.buffer.read_u16_be().map_err(truncated)? as usize;
        self.read_utf8(len)
    }

    fn read_long_utf8(&mut self) -> Result<String> {
        let len = self.buffer.read_u32_be().map_err(truncated)? as usize;
        self.read_utf8(len)
    }

    /// Key/value pairs up to the empty-key + OBJECT_END terminator
    fn read_properties(&mut self) -> Result<Amf0Object> {
        let mut object = Vec::new();
        loop {
            let key = self.read_short_utf8()?;
            if key.is_empty() {
                let end = self.buffer.read_u8().map_err(truncated)?;
                if end != markers::OBJECT_END {
                    return Err(Error::amf_decode(format!(
                        "expected object end marker, found 0x{:02x}",
                        end
                    )));
                }
                break;
            }
            let value = self.decode()?;
            object.push((key, value));
        }
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amf::Amf0Encoder;

    fn decode_bytes(bytes: Vec<u8>) -> Result<Vec<Amf0Value>> {
        let mut buffer = ByteBuffer::new(bytes);
        Amf0Decoder::new(&mut buffer).decode_all()
    }

    #[test]
    fn test_decode_connect_object() {
        let original = vec![
            Amf0Value::from("connect"),
            Amf0Value::Number(1.0),
            Amf0Value::object([
                ("app", Amf0Value::from("live")),
                ("tcUrl", Amf0Value::from("rtmp://localhost/live")),
                ("audioCodecs", Amf0Value::Number(3191.0)),
            ]),
        ];
        let bytes = Amf0Encoder::encode_all(&original).unwrap();
        assert_eq!(decode_bytes(bytes).unwrap(), original);
    }

    #[test]
    fn test_decode_ecma_array_keeps_order() {
        let bytes = vec![
            0x08, 0x00, 0x00, 0x00, 0x02, // ecma array, count 2
            0x00, 0x01, b'b', 0x01, 0x01, // b: true
            0x00, 0x01, b'a', 0x05, // a: null
            0x00, 0x00, 0x09,
        ];
        let values = decode_bytes(bytes).unwrap();
        let obj = values[0].as_object().unwrap();
        assert_eq!(obj[0].0, "b");
        assert_eq!(obj[1], ("a".to_string(), Amf0Value::Null));
    }

    #[test]
    fn test_truncated_string() {
        let result = decode_bytes(vec![0x02, 0x00, 0x05, b'a', b'b']);
        assert!(matches!(result, Err(Error::AmfDecode(_))));
    }

    #[test]
    fn test_amf3_switch_not_implemented() {
        let result = decode_bytes(vec![0x11, 0x01]);
        assert!(matches!(result, Err(Error::NotImplemented(_))));
    }

    /// `levels` strict arrays, each holding the next, around a null
    fn nested_arrays(levels: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(levels * 5 + 1);
        for _ in 0..levels {
            bytes.extend_from_slice(&[0x0A, 0x00, 0x00, 0x00, 0x01]);
        }
        bytes.push(0x05);
        bytes
    }

    #[test]
    fn test_nesting_depth_limit() {
        let values = decode_bytes(nested_arrays(MAX_AMF_DEPTH)).unwrap();
        assert!(matches!(values[0], Amf0Value::StrictArray(_)));

        let result = decode_bytes(nested_arrays(MAX_AMF_DEPTH + 1));
        assert!(matches!(result, Err(Error::AmfDecode(_))));

        // objects count toward the same limit
        let mut bytes = Vec::new();
        for _ in 0..MAX_AMF_DEPTH + 1 {
            bytes.extend_from_slice(&[0x03, 0x00, 0x01, b'k']);
        }
        let result = decode_bytes(bytes);
        assert!(matches!(result, Err(Error::AmfDecode(_))));
    }

    #[test]
    fn test_depth_resets_between_values() {
        let mut bytes = nested_arrays(MAX_AMF_DEPTH);
        bytes.extend(nested_arrays(MAX_AMF_DEPTH));
        assert_eq!(decode_bytes(bytes).unwrap().len(), 2);
    }

    #[test]
    fn test_bad_object_terminator() {
        let result = decode_bytes(vec![0x03, 0x00, 0x00, 0x05]);
        assert!(matches!(result, Err(Error::AmfDecode(_))));
    }
}
