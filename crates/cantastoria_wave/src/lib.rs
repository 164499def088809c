#![forbid(unsafe_code)]
#![warn(missing_docs)]
//! WAV container assembly for narration fragments.
//!
//! Speech synthesis returns one inline payload per chunk of script,
//! usually raw PCM with the format described only in the MIME type.
//! This crate wraps those payloads into valid containers
//! ([`encode_raw`]) and splices a run's fragments into one file
//! ([`join`]) by stripping headers and rebuilding a single one over
//! the combined sample data.
//!
//! # Examples
//!
//! ```
//! use base64::{engine::general_purpose::STANDARD, Engine as _};
//! use cantastoria_wave::{encode_raw, join, parse_format};
//!
//! let chunk = |samples: &[u8]| {
//!     encode_raw(&STANDARD.encode(samples), "audio/L16;rate=24000")
//!         .unwrap()
//!         .bytes
//! };
//! let complete = join(&[chunk(&[1; 100]), chunk(&[2; 50])]).unwrap();
//! assert_eq!(parse_format(&complete).unwrap().sample_rate, 24_000);
//! ```

mod codec;
mod format;

pub use codec::{encode_raw, join, EncodedAudio};
pub use format::{build_header, parse_format, WaveFormat, HEADER_LEN};
