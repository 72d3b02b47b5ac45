//! Audio Test Fixtures
//!
//! Programmatically generated audio shaped like provider responses:
//! - MP3: an ID3v2 tag, an `Info` header frame and silent MPEG audio frames
//! - WAV: 16-bit mono PCM sine tones written with `hound`
//!
//! The MP3 frames carry no real audio data, which is fine for the frame-level
//! codec: it only parses headers and frame boundaries.

use std::f32::consts::PI;
use std::io::Cursor;
use std::time::Duration;

/// MPEG-1 Layer III, 128 kbit/s, 44.1 kHz, joint stereo: 417-byte, ~26 ms frames.
pub const MP3_HEADER_128K: [u8; 4] = [0xFF, 0xFB, 0x90, 0x44];
pub const MP3_128K_FRAME_LEN: usize = 417;

/// MPEG-2 Layer III, 32 kbit/s, 24 kHz, mono: 96-byte, 24 ms frames.
pub const MP3_HEADER_24K_MONO: [u8; 4] = [0xFF, 0xF3, 0x44, 0xC4];
pub const MP3_24K_FRAME_LEN: usize = 96;
pub const MP3_24K_FRAME_DURATION: Duration = Duration::from_millis(24);

/// Sample rate used for WAV fixtures
pub const WAV_SAMPLE_RATE: u32 = 24_000;

fn frame(header: [u8; 4], len: usize) -> Vec<u8> {
    let mut out = header.to_vec();
    out.resize(len, 0);
    out
}

fn id3v2_tag() -> Vec<u8> {
    // 16 bytes of payload, synchsafe size
    let mut tag = b"ID3\x04\x00\x00\x00\x00\x00\x10".to_vec();
    tag.extend_from_slice(b"TIT2\x00\x00\x00\x06\x00\x00\x03tests");
    tag
}

/// `count` silent 24 kHz mono frames without any tags.
pub fn mp3_frames(count: usize) -> Vec<u8> {
    frame(MP3_HEADER_24K_MONO, MP3_24K_FRAME_LEN).repeat(count)
}

/// A complete MP3 file as a provider would return it: ID3v2 tag, `Info`
/// header frame, then `audio_frames` 24 ms frames.
pub fn provider_mp3(audio_frames: usize) -> Vec<u8> {
    let mut info = frame(MP3_HEADER_24K_MONO, MP3_24K_FRAME_LEN);
    // MPEG-2 mono: header (4) + side info (9)
    info[13..17].copy_from_slice(b"Info");

    let mut out = id3v2_tag();
    out.extend(info);
    out.extend(mp3_frames(audio_frames));
    out
}

/// A 128 kbit/s MPEG-1 stream of `count` frames.
pub fn mp3_frames_128k(count: usize) -> Vec<u8> {
    frame(MP3_HEADER_128K, MP3_128K_FRAME_LEN).repeat(count)
}

/// Generate a sine wave tone at [`WAV_SAMPLE_RATE`]
pub fn generate_sine_wave(duration_samples: usize, frequency: f32, amplitude: f32) -> Vec<i16> {
    let max_amplitude = amplitude * i16::MAX as f32;
    let angular_freq = 2.0 * PI * frequency / WAV_SAMPLE_RATE as f32;

    (0..duration_samples)
        .map(|i| ((angular_freq * i as f32).sin() * max_amplitude) as i16)
        .collect()
}

/// A mono 16-bit WAV file holding `duration` of a 440 Hz tone.
pub fn wav_tone(duration: Duration) -> Vec<u8> {
    let samples = (duration.as_secs_f64() * f64::from(WAV_SAMPLE_RATE)).round() as usize;
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: WAV_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for sample in generate_sine_wave(samples, 440.0, 0.5) {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Number of sample frames in a WAV file.
pub fn wav_frame_count(data: &[u8]) -> u32 {
    hound::WavReader::new(Cursor::new(data)).unwrap().duration()
}
