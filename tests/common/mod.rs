// Common test utilities and helper functions
//
// Message builders shared by the integration tests

#![allow(dead_code)]

use rtmp_framing::{
    Amf0Value, Audio, CommandAmf0, DataAmf0, RtmpMessage, UserControl, UserControlEvent, Video,
};

/// Install a test logger once; later calls are no-ops
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Video message with an AVC keyframe or inter-frame tag
pub fn create_test_video(timestamp: u32, is_keyframe: bool, len: usize) -> RtmpMessage {
    let mut data = Vec::with_capacity(len.max(5));
    // 0x17 AVC keyframe, 0x27 AVC inter-frame
    data.push(if is_keyframe { 0x17 } else { 0x27 });
    data.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]);
    while data.len() < len {
        data.push((data.len() % 251) as u8);
    }

    RtmpMessage::new(Video::new(data))
        .with_timestamp(timestamp)
        .with_message_stream_id(1)
}

/// AAC raw audio frame
pub fn create_test_audio(timestamp: u32) -> RtmpMessage {
    RtmpMessage::new(Audio::new(vec![0xAF, 0x01, 0x21, 0x10, 0x04]))
        .with_timestamp(timestamp)
        .with_message_stream_id(1)
}

pub fn create_test_connect() -> RtmpMessage {
    RtmpMessage::new(CommandAmf0::connect("live", "rtmp://127.0.0.1/live"))
}

pub fn create_test_metadata() -> RtmpMessage {
    let metadata = vec![
        ("width".to_string(), Amf0Value::Number(1920.0)),
        ("height".to_string(), Amf0Value::Number(1080.0)),
        ("framerate".to_string(), Amf0Value::Number(30.0)),
        ("encoder".to_string(), Amf0Value::from("obs-output module")),
    ];
    RtmpMessage::new(DataAmf0::on_metadata(metadata)).with_message_stream_id(1)
}

pub fn create_test_stream_begin(stream_id: u32) -> RtmpMessage {
    RtmpMessage::new(UserControl::new(UserControlEvent::StreamBegin { stream_id }))
}
