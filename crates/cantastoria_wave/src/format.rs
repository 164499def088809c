//! RIFF/WAVE header layout.

use cantastoria_error::{CantastoriaResult, WaveError, WaveErrorKind};

/// Size of the canonical header: RIFF chunk descriptor, fmt chunk, and
/// data chunk preamble.
pub const HEADER_LEN: usize = 44;

/// PCM format parameters carried in a fmt chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("{} ch / {} Hz / {} bit", channels, sample_rate, bits_per_sample)]
pub struct WaveFormat {
    /// Interleaved channel count
    pub channels: u16,
    /// Frames per second
    pub sample_rate: u32,
    /// Bits per sample per channel
    pub bits_per_sample: u16,
}

/// Mono 24 kHz 16 bit, the shape Gemini speech payloads arrive in.
impl Default for WaveFormat {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 24_000,
            bits_per_sample: 16,
        }
    }
}

impl WaveFormat {
    /// Bytes consumed per second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * self.bits_per_sample as u32 / 8
    }

    /// Bytes per frame across all channels.
    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }
}

/// Build a 44 byte header declaring `data_len` bytes of PCM samples.
///
/// `data_len` must not exceed `u32::MAX - 36`; the RIFF chunk size
/// field holds `36 + data_len`.
///
/// # Examples
///
/// ```
/// use cantastoria_wave::{build_header, WaveFormat, HEADER_LEN};
///
/// let header = build_header(1024, &WaveFormat::default());
/// assert_eq!(header.len(), HEADER_LEN);
/// assert_eq!(&header[0..4], b"RIFF");
/// ```
pub fn build_header(data_len: u32, format: &WaveFormat) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&(36 + data_len).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample.to_le_bytes());
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_len.to_le_bytes());
    header
}

/// Read the format fields from a fragment's header region.
///
/// # Errors
///
/// [`WaveErrorKind::HeaderTooShort`] when the fragment is under 44
/// bytes, [`WaveErrorKind::InvalidHeader`] when the RIFF markers are
/// absent.
pub fn parse_format(fragment: &[u8]) -> CantastoriaResult<WaveFormat> {
    if fragment.len() < HEADER_LEN {
        return Err(WaveError::new(WaveErrorKind::HeaderTooShort(fragment.len())).into());
    }
    if &fragment[0..4] != b"RIFF" || &fragment[8..12] != b"WAVE" {
        return Err(WaveError::new(WaveErrorKind::InvalidHeader(
            "missing RIFF/WAVE markers".into(),
        ))
        .into());
    }
    Ok(WaveFormat {
        channels: u16::from_le_bytes([fragment[22], fragment[23]]),
        sample_rate: u32::from_le_bytes([fragment[24], fragment[25], fragment[26], fragment[27]]),
        bits_per_sample: u16::from_le_bytes([fragment[34], fragment[35]]),
    })
}
