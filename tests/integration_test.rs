// Integration tests for rtmp-framing
//
// These tests push whole message sequences through the chunk layer and back

mod common;

use common::*;
use rtmp_framing::{
    read_message, Aggregate, AggregateItem, ChunkReader, ChunkStreamStates, Chunker, CodecConfig,
    ContinuationChannel, Error, MessageBody, MessageStream, MessageType, RtmpMessage,
    SetPeerBandwidth, WindowAcknowledgementSize, decode_packet,
};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

fn chunk_all(chunker: &mut Chunker, messages: &[RtmpMessage]) -> Vec<u8> {
    let mut out = Vec::new();
    for message in messages {
        chunker.write_message(message, &mut out).expect("chunking failed");
    }
    out
}

#[tokio::test]
async fn test_publish_sequence_round_trip() {
    init_logging();

    let messages = vec![
        RtmpMessage::new(WindowAcknowledgementSize::default()),
        RtmpMessage::new(SetPeerBandwidth::default()),
        create_test_stream_begin(1),
        create_test_connect(),
        create_test_metadata(),
        create_test_video(0, true, 1000),
        create_test_audio(0),
        create_test_video(33, false, 400),
        create_test_audio(23),
    ];

    let mut chunker = Chunker::default();
    let bytes = chunk_all(&mut chunker, &messages);

    let mut reader = ChunkReader::default();
    let mut input = bytes.as_slice();
    for expected in &messages {
        let packet = reader.read_packet(&mut input).await.expect("reassembly failed");
        let message = decode_packet(&packet).expect("dispatch failed");
        assert_eq!(message.body, expected.body);
        assert_eq!(message.header.timestamp, expected.header.timestamp);
        assert_eq!(message.header.message_stream_id, expected.header.message_stream_id);
        assert_eq!(message.header.chunk_stream_id(), expected.header.chunk_stream_id());
    }
    assert!(input.is_empty());
}

#[tokio::test]
async fn test_interleaved_audio_and_video() {
    init_logging();

    let mut chunker = Chunker::default();
    let video = create_test_video(40, true, 600);
    let audio = create_test_audio(40);
    let video_bytes = chunk_all(&mut chunker, &[video.clone()]);
    let audio_bytes = chunk_all(&mut chunker, &[audio.clone()]);

    // Audio lands between the first and second video chunks
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&video_bytes[..140]);
    bytes.extend_from_slice(&audio_bytes);
    bytes.extend_from_slice(&video_bytes[140..]);

    let mut reader = ChunkReader::default();
    let mut input = bytes.as_slice();
    let first = decode_packet(&reader.read_packet(&mut input).await.unwrap()).unwrap();
    let second = decode_packet(&reader.read_packet(&mut input).await.unwrap()).unwrap();
    assert_eq!(first.body, audio.body);
    assert_eq!(second.body, video.body);
}

#[tokio::test]
async fn test_message_stream_over_tcp() {
    init_logging();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut stream = MessageStream::new(socket, &CodecConfig::default()).unwrap();
        let mut received = Vec::new();
        for _ in 0..3 {
            received.push(stream.read_message().await.unwrap());
        }
        (received, stream.reader().chunk_size())
    });

    let socket = TcpStream::connect(addr).await.unwrap();
    let mut client = MessageStream::new(socket, &CodecConfig::default()).unwrap();
    client.set_chunk_size(60_000).await.unwrap();
    client.write_message(&create_test_connect()).await.unwrap();
    client.write_message(&create_test_video(0, true, 50_000)).await.unwrap();
    client.shutdown().await.unwrap();

    let (received, chunk_size) = server.await.unwrap();
    assert_eq!(chunk_size, 60_000);
    assert_eq!(received[0].message_type(), MessageType::SetChunkSize);
    assert_eq!(received[1].body, create_test_connect().body);
    assert_eq!(received[2].size(), 50_000);
}

#[tokio::test]
async fn test_closed_transport_reports_eof() {
    let (client, server) = tokio::io::duplex(1024);
    let mut stream = MessageStream::new(server, &CodecConfig::default()).unwrap();

    let mut client = client;
    client.shutdown().await.unwrap();
    drop(client);

    let result = stream.read_message().await;
    assert!(matches!(result, Err(Error::Io(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof));
}

#[test]
fn test_unchunked_read_message() {
    let mut chunker = Chunker::new(
        &CodecConfig::builder()
            .write_chunk_size(0x00FF_FFFF)
            .build()
            .unwrap(),
    )
    .unwrap();
    let messages = [create_test_connect(), create_test_audio(10)];
    let bytes = chunk_all(&mut chunker, &messages);

    let mut states = ChunkStreamStates::new();
    let mut input = bytes.as_slice();
    for expected in &messages {
        let message = read_message(&mut input, &mut states).unwrap();
        assert_eq!(message.body, expected.body);
    }
}

#[test]
fn test_legacy_continuation_channel() {
    let config = CodecConfig::builder()
        .continuation_channel(ContinuationChannel::Fixed(3))
        .build()
        .unwrap();
    let mut chunker = Chunker::new(&config).unwrap();
    let bytes = chunk_all(&mut chunker, &[create_test_video(0, true, 300)]);

    // Continuation headers land on channel 3 even though the message is on 6
    assert_eq!(bytes[0] & 0x3F, 6);
    assert_eq!(bytes[140], 0xC3);
    assert_eq!(bytes[269], 0xC3);
}

#[test]
fn test_aggregate_expansion() {
    let aggregate = Aggregate::new(vec![
        AggregateItem::new(MessageType::Video, 2000, 1, vec![0x17, 0x00, 0x00, 0x00, 0x00]),
        AggregateItem::new(MessageType::Audio, 2010, 1, vec![0xAF, 0x00, 0x12, 0x10]),
    ]);
    let message = RtmpMessage::new(aggregate).with_timestamp(500).with_message_stream_id(1);

    let mut chunker = Chunker::default();
    let bytes = chunk_all(&mut chunker, &[message]);
    let mut states = ChunkStreamStates::new();
    let decoded = read_message(&mut bytes.as_slice(), &mut states).unwrap();

    let MessageBody::Aggregate(body) = &decoded.body else {
        panic!("expected aggregate, got {:?}", decoded.message_type());
    };
    let parts = body.sub_messages(&decoded.header).unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].message_type(), MessageType::Video);
    assert_eq!(parts[0].header.timestamp, 500);
    assert_eq!(parts[1].message_type(), MessageType::Audio);
    assert_eq!(parts[1].header.timestamp, 510);
}
