//! Frame dimension planning
//!
//! Fixes every buffer size of one link run before any numeric stage
//! executes. The frame is padded twice: first by the antenna pad
//! (`nt - num_streams` zeros), then by however many zeros are needed to make
//! the frame split evenly across the streams.
//!
//! ```text
//!   source_len + antenna_pad + alignment_pad = frame_len
//!   frame_len = num_streams * symbols_per_stream
//! ```

use serde::{Deserialize, Serialize};

use crate::config::LinkConfig;
use crate::padding::pad_count;
use crate::types::{MimoError, MimoResult};

/// Buffer dimensions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPlan {
    pub nr: usize,
    pub nt: usize,
    pub num_streams: usize,
    /// Symbols taken from the source
    pub source_len: usize,
    /// Zeros for the transmit antenna surplus
    pub antenna_pad: usize,
    /// Zeros so the frame divides across the streams
    pub alignment_pad: usize,
    /// Padded frame length
    pub frame_len: usize,
    pub symbols_per_stream: usize,
}

impl LinkPlan {
    /// Plan a frame of `source_len` symbols for a validated configuration.
    pub fn new(config: &LinkConfig, source_len: usize) -> MimoResult<Self> {
        if source_len == 0 {
            return Err(MimoError::dimension("cannot plan an empty frame"));
        }
        let num_streams = config.num_streams();
        if num_streams == 0 {
            return Err(MimoError::dimension("link has no spatial streams"));
        }
        let antenna_pad = pad_count(config.nt, num_streams)?;

        let unaligned = source_len + antenna_pad;
        let alignment_pad = (num_streams - unaligned % num_streams) % num_streams;
        let frame_len = unaligned + alignment_pad;

        Ok(Self {
            nr: config.nr,
            nt: config.nt,
            num_streams,
            source_len,
            antenna_pad,
            alignment_pad,
            frame_len,
            symbols_per_stream: frame_len / num_streams,
        })
    }

    /// Zeros appended on transmit and stripped on receive.
    pub fn total_pad(&self) -> usize {
        self.antenna_pad + self.alignment_pad
    }
}
