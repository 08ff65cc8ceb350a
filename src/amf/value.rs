/// Insertion-ordered property list, so an object re-encodes to the same bytes
pub type Amf0Object = Vec<(String, Amf0Value)>;

/// AMF0 data types
#[derive(Debug, Clone, PartialEq)]
pub enum Amf0Value {
    Number(f64),                          // 0x00
    Boolean(bool),                        // 0x01
    String(String),                       // 0x02
    Object(Amf0Object),                   // 0x03
    Null,                                 // 0x05
    Undefined,                            // 0x06
    EcmaArray(Amf0Object),                // 0x08
    StrictArray(Vec<Amf0Value>),          // 0x0A
    Date(f64, i16),                       // 0x0B
    LongString(String),                   // 0x0C
    Unsupported,                          // 0x0D
    XmlDocument(String),                  // 0x0F
    TypedObject(String, Amf0Object),      // 0x10
}

// AMF0 type markers
pub mod markers {
    pub const NUMBER: u8 = 0x00;
    pub const BOOLEAN: u8 = 0x01;
    pub const STRING: u8 = 0x02;
    pub const OBJECT: u8 = 0x03;
    pub const MOVIE_CLIP: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const UNDEFINED: u8 = 0x06;
    pub const REFERENCE: u8 = 0x07;
    pub const ECMA_ARRAY: u8 = 0x08;
    pub const OBJECT_END: u8 = 0x09;
    pub const STRICT_ARRAY: u8 = 0x0A;
    pub const DATE: u8 = 0x0B;
    pub const LONG_STRING: u8 = 0x0C;
    pub const UNSUPPORTED: u8 = 0x0D;
    pub const RECORDSET: u8 = 0x0E;
    pub const XML_DOCUMENT: u8 = 0x0F;
    pub const TYPED_OBJECT: u8 = 0x10;
    pub const AVMPLUS_OBJECT: u8 = 0x11;
}

impl Amf0Value {
    /// Shorthand for building an object from borrowed keys
    pub fn object<'a>(properties: impl IntoIterator<Item = (&'a str, Amf0Value)>) -> Self {
        Amf0Value::Object(
            properties
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Amf0Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Amf0Value::String(s) | Amf0Value::LongString(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Amf0Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Amf0Object> {
        match self {
            Amf0Value::Object(obj) | Amf0Value::EcmaArray(obj) | Amf0Value::TypedObject(_, obj) => {
                Some(obj)
            }
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Amf0Value>> {
        match self {
            Amf0Value::StrictArray(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get property from object; the first match wins
    pub fn get_property(&self, key: &str) -> Option<&Amf0Value> {
        self.as_object()
            .and_then(|obj| obj.iter().find(|(k, _)| k == key).map(|(_, v)| v))
    }

    /// Check if null or undefined
    pub fn is_null(&self) -> bool {
        matches!(self, Amf0Value::Null | Amf0Value::Undefined)
    }

    /// Number of bytes this value occupies once encoded, marker included
    pub fn encoded_len(&self) -> usize {
        fn properties_len(obj: &Amf0Object) -> usize {
            obj.iter()
                .map(|(key, value)| 2 + key.len() + value.encoded_len())
                .sum::<usize>()
                + 3
        }

        1 + match self {
            Amf0Value::Number(_) => 8,
            Amf0Value::Boolean(_) => 1,
            Amf0Value::String(s) => 2 + s.len(),
            Amf0Value::Object(obj) => properties_len(obj),
            Amf0Value::Null | Amf0Value::Undefined | Amf0Value::Unsupported => 0,
            Amf0Value::EcmaArray(obj) => 4 + properties_len(obj),
            Amf0Value::StrictArray(arr) => 4 + arr.iter().map(Amf0Value::encoded_len).sum::<usize>(),
            Amf0Value::Date(_, _) => 10,
            Amf0Value::LongString(s) | Amf0Value::XmlDocument(s) => 4 + s.len(),
            Amf0Value::TypedObject(class_name, obj) => 2 + class_name.len() + properties_len(obj),
        }
    }
}

impl From<f64> for Amf0Value {
    fn from(value: f64) -> Self {
        Amf0Value::Number(value)
    }
}

impl From<bool> for Amf0Value {
    fn from(value: bool) -> Self {
        Amf0Value::Boolean(value)
    }
}

impl From<&str> for Amf0Value {
    fn from(value: &str) -> Self {
        if value.len() > u16::MAX as usize {
            Amf0Value::LongString(value.to_string())
        } else {
            Amf0Value::String(value.to_string())
        }
    }
}
