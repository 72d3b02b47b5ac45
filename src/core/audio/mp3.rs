//! MPEG audio frame codec.
//!
//! Provider responses are complete MP3 files: an optional ID3v2 tag, an
//! optional Xing/Info/VBRI header frame, a run of audio frames and possibly an
//! ID3v1 tag. Fragments that are played back to back must not carry those
//! per-file headers (a second ID3 tag or a stale Xing frame count confuses
//! decoders mid-stream), so decoding parses the frame sequence and encoding
//! writes back only the audio frames.
//!
//! Trimming works at frame granularity (1152 samples for MPEG-1 Layer III,
//! 576 for MPEG-2/2.5) and never removes more than the requested duration.

use std::time::Duration;

use bytes::{Bytes, BytesMut};

use super::{AudioClip, AudioCodec, AudioError, AudioFormat, AudioResult};

const ID3V2_HEADER_LEN: usize = 10;
const ID3V1_TAG_LEN: usize = 128;
const FRAME_HEADER_LEN: usize = 4;

/// Bitrates in kbit/s indexed by `[row][bitrate_index]`.
const BITRATES: [[u32; 16]; 5] = [
    // MPEG-1 Layer I
    [0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448, 0],
    // MPEG-1 Layer II
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384, 0],
    // MPEG-1 Layer III
    [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0],
    // MPEG-2/2.5 Layer I
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256, 0],
    // MPEG-2/2.5 Layer II and III
    [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    V1,
    V2,
    V25,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegLayer {
    I,
    II,
    III,
}

/// Parsed 4-byte MPEG audio frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: MpegVersion,
    pub layer: MpegLayer,
    pub bitrate_kbps: u32,
    pub sample_rate: u32,
    pub padding: bool,
    pub crc_protected: bool,
    pub mono: bool,
}

impl FrameHeader {
    /// Parse the header at the start of `bytes`.
    ///
    /// Free-format and reserved field values are rejected.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < FRAME_HEADER_LEN {
            return None;
        }
        let (b1, b2, b3) = (bytes[1], bytes[2], bytes[3]);
        if bytes[0] != 0xFF || b1 & 0xE0 != 0xE0 {
            return None;
        }

        let version = match (b1 >> 3) & 0b11 {
            0b00 => MpegVersion::V25,
            0b10 => MpegVersion::V2,
            0b11 => MpegVersion::V1,
            _ => return None,
        };
        let layer = match (b1 >> 1) & 0b11 {
            0b01 => MpegLayer::III,
            0b10 => MpegLayer::II,
            0b11 => MpegLayer::I,
            _ => return None,
        };

        let row = match (version, layer) {
            (MpegVersion::V1, MpegLayer::I) => 0,
            (MpegVersion::V1, MpegLayer::II) => 1,
            (MpegVersion::V1, MpegLayer::III) => 2,
            (_, MpegLayer::I) => 3,
            _ => 4,
        };
        let bitrate_kbps = BITRATES[row][(b2 >> 4) as usize];
        if bitrate_kbps == 0 {
            return None;
        }

        let base_rate = match (b2 >> 2) & 0b11 {
            0b00 => 44_100,
            0b01 => 48_000,
            0b10 => 32_000,
            _ => return None,
        };
        let sample_rate = match version {
            MpegVersion::V1 => base_rate,
            MpegVersion::V2 => base_rate / 2,
            MpegVersion::V25 => base_rate / 4,
        };

        Some(Self {
            version,
            layer,
            bitrate_kbps,
            sample_rate,
            padding: (b2 >> 1) & 1 == 1,
            crc_protected: b1 & 1 == 0,
            mono: b3 >> 6 == 0b11,
        })
    }

    /// Total frame length in bytes, header included.
    pub fn frame_len(&self) -> usize {
        let bitrate = self.bitrate_kbps as usize * 1000;
        let sample_rate = self.sample_rate as usize;
        let padding = usize::from(self.padding);
        match (self.layer, self.version) {
            (MpegLayer::I, _) => (12 * bitrate / sample_rate + padding) * 4,
            (MpegLayer::II, _) | (MpegLayer::III, MpegVersion::V1) => {
                144 * bitrate / sample_rate + padding
            }
            (MpegLayer::III, _) => 72 * bitrate / sample_rate + padding,
        }
    }

    /// PCM samples per channel carried by one frame.
    pub fn samples_per_frame(&self) -> u32 {
        match (self.layer, self.version) {
            (MpegLayer::I, _) => 384,
            (MpegLayer::II, _) | (MpegLayer::III, MpegVersion::V1) => 1152,
            (MpegLayer::III, _) => 576,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_nanos(
            u64::from(self.samples_per_frame()) * 1_000_000_000 / u64::from(self.sample_rate),
        )
    }

    /// Two headers belong to the same stream when their fixed fields agree.
    fn same_stream(&self, other: &FrameHeader) -> bool {
        self.version == other.version
            && self.layer == other.layer
            && self.sample_rate == other.sample_rate
            && self.mono == other.mono
    }

    /// Offset of a Xing/Info tag inside a Layer III frame.
    fn xing_offset(&self) -> usize {
        let side_info = match (self.version, self.mono) {
            (MpegVersion::V1, true) => 17,
            (MpegVersion::V1, false) => 32,
            (_, true) => 9,
            (_, false) => 17,
        };
        FRAME_HEADER_LEN + if self.crc_protected { 2 } else { 0 } + side_info
    }
}

/// One audio frame inside [`Mp3Clip::data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpan {
    pub offset: usize,
    pub header: FrameHeader,
}

impl FrameSpan {
    fn end(&self) -> usize {
        self.offset + self.header.frame_len()
    }
}

/// A decoded MP3 file: the original bytes plus the audio frames found in it.
#[derive(Debug, Clone)]
pub struct Mp3Clip {
    data: Bytes,
    frames: Vec<FrameSpan>,
}

impl Mp3Clip {
    pub fn frames(&self) -> &[FrameSpan] {
        &self.frames
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.frames.first().map(|f| f.header.sample_rate)
    }

    pub fn duration(&self) -> Duration {
        self.frames.iter().map(|f| f.header.duration()).sum()
    }

    /// Drop trailing frames totalling at most `amount`.
    pub fn trim_end(&mut self, amount: Duration) {
        let mut removed = Duration::ZERO;
        while let Some(last) = self.frames.last() {
            let next = removed + last.header.duration();
            if next > amount {
                break;
            }
            removed = next;
            self.frames.pop();
        }
    }

    fn frame_bytes(&self, span: &FrameSpan) -> &[u8] {
        &self.data[span.offset..span.end()]
    }
}

/// Decoder/encoder for MPEG audio streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mp3Codec;

impl Mp3Codec {
    pub fn decode_clip(&self, data: Bytes) -> AudioResult<Mp3Clip> {
        let start = skip_id3v2(&data);
        let end = audio_end(&data, start);
        let region = &data[..end];

        let first = find_sync(region, start).ok_or_else(|| decode_error("no MPEG audio frame found"))?;

        let mut frames = Vec::new();
        let mut pos = first;
        let mut reference: Option<FrameHeader> = None;
        while let Some(header) = FrameHeader::parse(&region[pos..]) {
            if reference.is_some_and(|r| !r.same_stream(&header)) {
                break;
            }
            let len = header.frame_len();
            if pos + len > end {
                // truncated final frame
                break;
            }
            reference.get_or_insert(header);
            frames.push(FrameSpan {
                offset: pos,
                header,
            });
            pos += len;
        }

        if frames
            .first()
            .is_some_and(|span| is_info_frame(&data[span.offset..span.end()], &span.header))
        {
            frames.remove(0);
        }

        if frames.is_empty() {
            return Err(decode_error("stream contains no audio frames"));
        }

        if pos < end {
            tracing::debug!(
                skipped_bytes = end - pos,
                "Ignoring trailing bytes after last MPEG frame"
            );
        }

        Ok(Mp3Clip { data, frames })
    }

    pub fn encode_clip(&self, clip: &Mp3Clip) -> AudioResult<Bytes> {
        if clip.frames.is_empty() {
            return Err(AudioError::Encode {
                format: AudioFormat::Mp3,
                reason: "no frames to write".to_string(),
            });
        }
        let size = clip.frames.iter().map(|f| f.header.frame_len()).sum();
        let mut out = BytesMut::with_capacity(size);
        for span in &clip.frames {
            out.extend_from_slice(clip.frame_bytes(span));
        }
        Ok(out.freeze())
    }
}

impl AudioCodec for Mp3Codec {
    fn format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    fn decode(&self, data: Bytes) -> AudioResult<AudioClip> {
        self.decode_clip(data).map(AudioClip::Mp3)
    }

    fn encode(&self, clip: &AudioClip) -> AudioResult<Bytes> {
        match clip {
            AudioClip::Mp3(clip) => self.encode_clip(clip),
            AudioClip::Pcm(_) => Err(AudioError::Encode {
                format: AudioFormat::Mp3,
                reason: "cannot write PCM samples as MP3".to_string(),
            }),
        }
    }
}

fn decode_error(reason: &str) -> AudioError {
    AudioError::Decode {
        format: AudioFormat::Mp3,
        reason: reason.to_string(),
    }
}

/// Offset of the first byte after any leading ID3v2 tags.
fn skip_id3v2(data: &[u8]) -> usize {
    let mut pos = 0;
    while data.len() >= pos + ID3V2_HEADER_LEN && &data[pos..pos + 3] == b"ID3" {
        let size_bytes = &data[pos + 6..pos + 10];
        if size_bytes.iter().any(|b| b & 0x80 != 0) {
            break;
        }
        // synchsafe integer: 4 x 7 bits
        let size = size_bytes
            .iter()
            .fold(0usize, |acc, b| (acc << 7) | usize::from(*b));
        let footer = if data[pos + 5] & 0x10 != 0 { 10 } else { 0 };
        pos += ID3V2_HEADER_LEN + size + footer;
    }
    pos.min(data.len())
}

/// End of the audio region, excluding a trailing ID3v1 tag.
fn audio_end(data: &[u8], start: usize) -> usize {
    let len = data.len();
    if len >= start + ID3V1_TAG_LEN && &data[len - ID3V1_TAG_LEN..len - ID3V1_TAG_LEN + 3] == b"TAG" {
        len - ID3V1_TAG_LEN
    } else {
        len
    }
}

/// First offset at or after `from` holding a frame that is followed by another
/// matching frame or by the end of the data.
fn find_sync(data: &[u8], from: usize) -> Option<usize> {
    let end = data.len();
    (from..end.saturating_sub(FRAME_HEADER_LEN - 1)).find(|&pos| {
        let Some(header) = FrameHeader::parse(&data[pos..]) else {
            return false;
        };
        let next = pos + header.frame_len();
        if next == end {
            return true;
        }
        next < end
            && FrameHeader::parse(&data[next..]).is_some_and(|h| header.same_stream(&h))
    })
}

/// Xing/Info (Layer III) or VBRI header frames carry metadata, not audio.
fn is_info_frame(frame: &[u8], header: &FrameHeader) -> bool {
    if header.layer != MpegLayer::III {
        return false;
    }
    let xing = header.xing_offset();
    let tag_at = |offset: usize| frame.get(offset..offset + 4);
    matches!(tag_at(xing), Some(b"Xing" | b"Info")) || matches!(tag_at(36), Some(b"VBRI"))
}
