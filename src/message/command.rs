use std::io::Read;
use byteorder::{ReadBytesExt, WriteBytesExt};
use crate::amf::{Amf0Decoder, Amf0Encoder, Amf0Value};
use crate::message::{Message, MessageType};
use crate::{ByteBuffer, Error, Result, AMF3_FORMAT_SELECTOR};

/// Read the whole body into a cursor for the AMF0 decoder
pub(crate) fn amf_body(input: &mut dyn Read, what: &str) -> Result<ByteBuffer> {
    ByteBuffer::from_reader(input).map_err(|e| Error::truncated_payload(what, e))
}

/// Consume the format selector that prefixes AMF3-typed messages
pub(crate) fn read_format_selector(input: &mut dyn Read, what: &str) -> Result<()> {
    let selector = input.read_u8().map_err(|e| Error::truncated_payload(what, e))?;
    if selector != AMF3_FORMAT_SELECTOR {
        return Err(Error::payload_decode(format!(
            "{}: unexpected format selector 0x{:02x}",
            what, selector
        )));
    }
    Ok(())
}

/// Prefix an AMF0 encoding with the AMF3 format selector
pub(crate) fn with_format_selector(body: Vec<u8>) -> Result<Vec<u8>> {
    let mut out: Vec<u8> = Vec::with_capacity(body.len() + 1);
    out.write_u8(AMF3_FORMAT_SELECTOR)?;
    out.extend_from_slice(&body);
    Ok(out)
}

/// Remote procedure call: name, transaction id, command object, arguments
#[derive(Debug, Clone, PartialEq)]
pub struct CommandAmf0 {
    pub name: String,
    pub transaction_id: f64,
    pub command_object: Amf0Value,
    pub arguments: Vec<Amf0Value>,
}

impl Default for CommandAmf0 {
    fn default() -> Self {
        CommandAmf0::new("", 0.0)
    }
}

impl CommandAmf0 {
    pub fn new(name: &str, transaction_id: f64) -> Self {
        CommandAmf0 {
            name: name.to_string(),
            transaction_id,
            command_object: Amf0Value::Null,
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: impl Into<Amf0Value>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn connect(app: &str, tc_url: &str) -> Self {
        let mut cmd = CommandAmf0::new("connect", 1.0);
        cmd.command_object = Amf0Value::object([
            ("app", Amf0Value::from(app)),
            ("type", Amf0Value::from("nonprivate")),
            ("flashVer", Amf0Value::from("FMLE/3.0")),
            ("tcUrl", Amf0Value::from(tc_url)),
        ]);
        cmd
    }

    pub fn create_stream(transaction_id: f64) -> Self {
        CommandAmf0::new("createStream", transaction_id)
    }

    pub fn publish(stream_name: &str, publish_type: &str) -> Self {
        CommandAmf0::new("publish", 0.0)
            .with_argument(stream_name)
            .with_argument(publish_type)
    }

    pub fn play(stream_name: &str, start: f64, duration: f64, reset: bool) -> Self {
        CommandAmf0::new("play", 0.0)
            .with_argument(stream_name)
            .with_argument(start)
            .with_argument(duration)
            .with_argument(reset)
    }

    pub fn result(transaction_id: f64, result: Amf0Value) -> Self {
        CommandAmf0::new("_result", transaction_id).with_argument(result)
    }

    pub fn error(transaction_id: f64, error: Amf0Value) -> Self {
        CommandAmf0::new("_error", transaction_id).with_argument(error)
    }

    pub fn on_status(level: &str, code: &str, description: &str) -> Self {
        CommandAmf0::new("onStatus", 0.0).with_argument(Amf0Value::object([
            ("level", Amf0Value::from(level)),
            ("code", Amf0Value::from(code)),
            ("description", Amf0Value::from(description)),
        ]))
    }

    fn values(&self) -> Vec<Amf0Value> {
        let mut values = Vec::with_capacity(3 + self.arguments.len());
        values.push(Amf0Value::from(self.name.as_str()));
        values.push(Amf0Value::Number(self.transaction_id));
        values.push(self.command_object.clone());
        values.extend(self.arguments.iter().cloned());
        values
    }
}

impl Message for CommandAmf0 {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        let mut buffer = amf_body(input, "command")?;
        let mut decoder = Amf0Decoder::new(&mut buffer);

        self.name = decoder
            .decode()?
            .as_string()
            .ok_or_else(|| Error::payload_decode("command name must be a string"))?
            .to_string();
        self.transaction_id = decoder
            .decode()?
            .as_number()
            .ok_or_else(|| Error::payload_decode("transaction id must be a number"))?;
        // Some peers stop after the transaction id
        self.command_object = if decoder.has_remaining() {
            decoder.decode()?
        } else {
            Amf0Value::Null
        };
        self.arguments = decoder.decode_all()?;
        Ok(())
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        Amf0Encoder::encode_all(&self.values())
    }

    fn message_type(&self) -> MessageType {
        MessageType::CommandAmf0
    }

    fn size(&self) -> usize {
        Amf0Value::from(self.name.as_str()).encoded_len()
            + 9
            + self.command_object.encoded_len()
            + self.arguments.iter().map(Amf0Value::encoded_len).sum::<usize>()
    }
}

/// Command sent in an AMF3-typed message: format selector, then the AMF0 command
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandAmf3 {
    pub command: CommandAmf0,
}

impl CommandAmf3 {
    pub fn new(command: CommandAmf0) -> Self {
        CommandAmf3 { command }
    }
}

impl Message for CommandAmf3 {
    fn decode_body(&mut self, input: &mut dyn Read) -> Result<()> {
        read_format_selector(input, "AMF3 command")?;
        self.command.decode_body(input)
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        with_format_selector(self.command.encode_body()?)
    }

    fn message_type(&self) -> MessageType {
        MessageType::CommandAmf3
    }

    fn size(&self) -> usize {
        1 + self.command.size()
    }
}
