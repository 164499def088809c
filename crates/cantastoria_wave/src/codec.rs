//! Fragment encoding and assembly.

use crate::{build_header, parse_format, WaveFormat, HEADER_LEN};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cantastoria_error::{CantastoriaResult, WaveError, WaveErrorKind};
use tracing::debug;

/// Largest sample payload the container's 32 bit length fields admit.
const MAX_DATA_LEN: u64 = (u32::MAX - 36) as u64;

/// A decoded fragment ready to persist, with the extension its bytes
/// warrant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAudio {
    /// Complete file contents
    pub bytes: Vec<u8>,
    /// File extension without the dot
    pub extension: &'static str,
}

/// Decode an inline audio payload into a writable fragment.
///
/// Payloads whose MIME type names a real container pass through
/// decoded but untouched. Anything else is treated as raw PCM and
/// wrapped in a fresh header, with format parameters read from the
/// MIME string: bit depth from an `L<N>` token, sample rate from a
/// `rate=` parameter, channel count from a `channels=` parameter,
/// defaulting to mono 24 kHz 16 bit.
///
/// # Examples
///
/// ```
/// use base64::{engine::general_purpose::STANDARD, Engine as _};
/// use cantastoria_wave::encode_raw;
///
/// let samples = STANDARD.encode([0u8; 480]);
/// let fragment = encode_raw(&samples, "audio/L16;codec=pcm;rate=24000").unwrap();
/// assert_eq!(fragment.extension, "wav");
/// assert_eq!(fragment.bytes.len(), 44 + 480);
/// ```
pub fn encode_raw(base64_samples: &str, mime_type: &str) -> CantastoriaResult<EncodedAudio> {
    let data = STANDARD
        .decode(base64_samples.trim())
        .map_err(|e| WaveError::new(WaveErrorKind::Base64Decode(e.to_string())))?;

    if let Some(extension) = container_extension(mime_type) {
        debug!(mime_type, extension, size = data.len(), "payload already containerized");
        return Ok(EncodedAudio {
            bytes: data,
            extension,
        });
    }

    let format = format_from_mime(mime_type)?;
    if data.len() as u64 > MAX_DATA_LEN {
        return Err(WaveError::new(WaveErrorKind::DataTooLarge(data.len() as u64)).into());
    }
    debug!(mime_type, %format, size = data.len(), "wrapping raw samples");

    let mut bytes = Vec::with_capacity(HEADER_LEN + data.len());
    bytes.extend_from_slice(&build_header(data.len() as u32, &format));
    bytes.extend_from_slice(&data);
    Ok(EncodedAudio {
        bytes,
        extension: "wav",
    })
}

/// Concatenate fragments into one container.
///
/// One fragment comes back verbatim. With more, the first fragment's
/// format is canonical: every header region is stripped, the sample
/// data is concatenated in input order, and one new header covers the
/// combined length. Fragments whose format differs from the canonical
/// one fail the join.
pub fn join(fragments: &[Vec<u8>]) -> CantastoriaResult<Vec<u8>> {
    let first = fragments
        .first()
        .ok_or_else(|| WaveError::new(WaveErrorKind::NoFragments))?;
    if fragments.len() == 1 {
        return Ok(first.clone());
    }

    let canonical = parse_format(first)?;
    let mut data_len: u64 = 0;
    for (index, fragment) in fragments.iter().enumerate() {
        if index > 0 {
            let format = parse_format(fragment)?;
            if format != canonical {
                return Err(WaveError::new(WaveErrorKind::FormatMismatch {
                    index,
                    expected: canonical.to_string(),
                    found: format.to_string(),
                })
                .into());
            }
        }
        data_len += (fragment.len() - HEADER_LEN) as u64;
    }
    if data_len > MAX_DATA_LEN {
        return Err(WaveError::new(WaveErrorKind::DataTooLarge(data_len)).into());
    }
    debug!(fragments = fragments.len(), %canonical, data_len, "joining fragments");

    let mut joined = Vec::with_capacity(HEADER_LEN + data_len as usize);
    joined.extend_from_slice(&build_header(data_len as u32, &canonical));
    for fragment in fragments {
        joined.extend_from_slice(&fragment[HEADER_LEN..]);
    }
    Ok(joined)
}

/// Extension for MIME types that already name a playable container.
fn container_extension(mime_type: &str) -> Option<&'static str> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/ogg" => Some("ogg"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        _ => None,
    }
}

/// Parse PCM parameters out of a raw audio MIME type.
fn format_from_mime(mime_type: &str) -> CantastoriaResult<WaveFormat> {
    let mut parts = mime_type.split(';').map(str::trim);
    let essence = parts.next().unwrap_or("").to_ascii_lowercase();
    if !essence.starts_with("audio/") {
        return Err(WaveError::new(WaveErrorKind::UnsupportedMime(mime_type.to_string())).into());
    }

    let mut format = WaveFormat::default();
    if let Some(token) = essence.strip_prefix("audio/l") {
        if let Ok(bits) = token.parse::<u16>() {
            format.bits_per_sample = bits;
        }
    }
    for param in parts {
        let lower = param.to_ascii_lowercase();
        if let Some(rate) = lower.strip_prefix("rate=") {
            if let Ok(rate) = rate.parse::<u32>() {
                format.sample_rate = rate;
            }
        } else if let Some(channels) = lower.strip_prefix("channels=") {
            if let Ok(channels) = channels.parse::<u16>() {
                format.channels = channels;
            }
        }
    }
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantastoria_error::CantastoriaErrorKind;

    fn fragment(format: &WaveFormat, samples: &[u8]) -> Vec<u8> {
        let mut bytes = build_header(samples.len() as u32, format).to_vec();
        bytes.extend_from_slice(samples);
        bytes
    }

    fn wave_kind(err: cantastoria_error::CantastoriaError) -> WaveErrorKind {
        match err.kind() {
            CantastoriaErrorKind::Wave(e) => e.kind().clone(),
            other => panic!("expected wave error, got {other:?}"),
        }
    }

    #[test]
    fn single_fragment_joins_verbatim() {
        let original = fragment(&WaveFormat::default(), &[7u8; 100]);
        let joined = join(std::slice::from_ref(&original)).expect("single join");
        assert_eq!(joined, original);
    }

    #[test]
    fn two_fragments_concatenate_sample_data() {
        let format = WaveFormat::default();
        let a = fragment(&format, &[1u8; 60]);
        let b = fragment(&format, &[2u8; 40]);

        let joined = join(&[a, b]).expect("matching formats join");
        assert_eq!(joined.len(), HEADER_LEN + 100);
        assert_eq!(parse_format(&joined).expect("joined header"), format);
        assert_eq!(
            u32::from_le_bytes([joined[40], joined[41], joined[42], joined[43]]),
            100
        );
        assert_eq!(&joined[HEADER_LEN..HEADER_LEN + 60], &[1u8; 60]);
        assert_eq!(&joined[HEADER_LEN + 60..], &[2u8; 40]);
    }

    #[test]
    fn mismatched_formats_refuse_to_join() {
        let a = fragment(&WaveFormat::default(), &[0u8; 10]);
        let b = fragment(
            &WaveFormat {
                channels: 2,
                sample_rate: 44_100,
                bits_per_sample: 16,
            },
            &[0u8; 10],
        );

        let err = join(&[a, b]).expect_err("formats differ");
        match wave_kind(err) {
            WaveErrorKind::FormatMismatch { index, .. } => assert_eq!(index, 1),
            other => panic!("expected FormatMismatch, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_refuses_to_join() {
        let err = join(&[]).expect_err("nothing to join");
        assert_eq!(wave_kind(err), WaveErrorKind::NoFragments);
    }

    #[test]
    fn raw_pcm_gains_a_header() {
        let samples = STANDARD.encode([5u8; 480]);
        let encoded = encode_raw(&samples, "audio/L16;codec=pcm;rate=24000").expect("raw pcm");

        assert_eq!(encoded.extension, "wav");
        assert_eq!(encoded.bytes.len(), HEADER_LEN + 480);
        let format = parse_format(&encoded.bytes).expect("fresh header");
        assert_eq!(format, WaveFormat::default());
        assert_eq!(&encoded.bytes[HEADER_LEN..], &[5u8; 480]);
    }

    #[test]
    fn mime_parameters_override_defaults() {
        let samples = STANDARD.encode([0u8; 8]);
        let encoded =
            encode_raw(&samples, "audio/L24;rate=44100;channels=2").expect("parameterized pcm");
        let format = parse_format(&encoded.bytes).expect("header");
        assert_eq!(
            format,
            WaveFormat {
                channels: 2,
                sample_rate: 44_100,
                bits_per_sample: 24,
            }
        );
    }

    #[test]
    fn absent_parameters_fall_back_to_defaults() {
        let samples = STANDARD.encode([0u8; 8]);
        let encoded = encode_raw(&samples, "audio/pcm").expect("bare pcm");
        assert_eq!(
            parse_format(&encoded.bytes).expect("header"),
            WaveFormat::default()
        );
    }

    #[test]
    fn container_mime_passes_through_untouched() {
        let mp3 = [0xffu8, 0xfb, 0x90, 0x00, 0x01, 0x02];
        let encoded = encode_raw(&STANDARD.encode(mp3), "audio/mpeg").expect("container");
        assert_eq!(encoded.extension, "mp3");
        assert_eq!(encoded.bytes, mp3);
    }

    #[test]
    fn non_audio_mime_is_rejected() {
        let err = encode_raw(&STANDARD.encode([0u8; 4]), "text/plain").expect_err("not audio");
        assert!(matches!(wave_kind(err), WaveErrorKind::UnsupportedMime(_)));
    }

    #[test]
    fn bad_base64_is_rejected() {
        let err = encode_raw("not valid base64!!!", "audio/L16;rate=24000").expect_err("bad data");
        assert!(matches!(wave_kind(err), WaveErrorKind::Base64Decode(_)));
    }
}
