use std::collections::HashMap;
use crate::chunk::RtmpHeader;

/// What a chunk stream remembers from the last full or partial header seen on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkStreamState {
    /// Previous header for this chunk stream, timestamp already absolute
    pub last_header: RtmpHeader,

    /// Delta carried by the last type 1 or type 2 header, 0 after a type 0
    pub timestamp_delta: u32,

    /// Value of the 4-byte extended timestamp field, if the last header used it
    pub extended_timestamp: Option<u32>,
}

impl ChunkStreamState {
    pub fn new(last_header: RtmpHeader, timestamp_delta: u32, extended_timestamp: Option<u32>) -> Self {
        ChunkStreamState {
            last_header,
            timestamp_delta,
            extended_timestamp,
        }
    }
}

/// Per-direction header compression context, keyed by chunk stream id.
///
/// A connection owns one for reading and one for writing; they are never shared
/// between the two directions or across connections.
#[derive(Debug, Clone, Default)]
pub struct ChunkStreamStates {
    streams: HashMap<u32, ChunkStreamState>,
}

impl ChunkStreamStates {
    pub fn new() -> Self {
        ChunkStreamStates {
            streams: HashMap::new(),
        }
    }

    pub fn get(&self, chunk_stream_id: u32) -> Option<&ChunkStreamState> {
        self.streams.get(&chunk_stream_id)
    }

    pub fn last_header(&self, chunk_stream_id: u32) -> Option<&RtmpHeader> {
        self.get(chunk_stream_id).map(|state| &state.last_header)
    }

    pub fn contains(&self, chunk_stream_id: u32) -> bool {
        self.streams.contains_key(&chunk_stream_id)
    }

    /// Replace the remembered state for a chunk stream
    pub fn record(&mut self, chunk_stream_id: u32, state: ChunkStreamState) {
        self.streams.insert(chunk_stream_id, state);
    }

    /// Move a chunk stream's timestamp forward without touching the rest of its state
    pub fn advance_timestamp(&mut self, chunk_stream_id: u32, timestamp: u32) {
        if let Some(state) = self.streams.get_mut(&chunk_stream_id) {
            state.last_header.timestamp = timestamp;
        }
    }

    pub fn remove(&mut self, chunk_stream_id: u32) -> Option<ChunkStreamState> {
        self.streams.remove(&chunk_stream_id)
    }

    pub fn clear(&mut self) {
        self.streams.clear();
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}
