//! RIFF/WAVE inspection: validate uploads and clip them to a duration cap

use crate::{AgentError, Result};

/// Clip a RIFF/WAVE file to its first `seconds` of audio. Files already
/// within the cap pass through unchanged; longer files are truncated at a
/// block boundary and their chunk sizes patched. Chunks after `data` are
/// dropped from a truncated file.
pub fn clip_seconds(bytes: &[u8], seconds: u32) -> Result<Vec<u8>> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(AgentError::InvalidInput("not a RIFF/WAVE file".into()));
    }

    let mut byte_rate: Option<u32> = None;
    let mut block_align: u32 = 1;
    let mut offset = 12usize;

    while offset + 8 <= bytes.len() {
        let chunk_id = &bytes[offset..offset + 4];
        let chunk_size = read_u32(bytes, offset + 4) as usize;
        let data_start = offset + 8;

        if chunk_id == b"fmt " {
            if data_start + 16 > bytes.len() {
                return Err(AgentError::InvalidInput("truncated fmt chunk".into()));
            }
            byte_rate = Some(read_u32(bytes, data_start + 8));
            block_align = u32::from(u16::from_le_bytes([
                bytes[data_start + 12],
                bytes[data_start + 13],
            ]))
            .max(1);
        } else if chunk_id == b"data" {
            let rate = byte_rate
                .ok_or_else(|| AgentError::InvalidInput("data chunk precedes fmt chunk".into()))?;
            let available = bytes.len().saturating_sub(data_start).min(chunk_size);
            let cap = (rate as usize).saturating_mul(seconds as usize);

            if available <= cap {
                return Ok(bytes.to_vec());
            }

            // Truncate to whole blocks
            let keep = cap - (cap % block_align as usize);
            let mut clipped = bytes[..data_start + keep].to_vec();
            patch_u32(&mut clipped, offset + 4, keep as u32);
            let riff_len = (clipped.len() - 8) as u32;
            patch_u32(&mut clipped, 4, riff_len);
            return Ok(clipped);
        }

        // Chunks are word-aligned
        offset = data_start + chunk_size + (chunk_size % 2);
    }

    Err(AgentError::InvalidInput("missing data chunk".into()))
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn patch_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mono 8-bit PCM at `sample_rate` Hz, so byte rate == sample rate.
    fn make_wav(sample_rate: u32, data_len: usize) -> Vec<u8> {
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&0u32.to_le_bytes()); // patched below
        wav.extend_from_slice(b"WAVE");

        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes()); // mono
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&sample_rate.to_le_bytes()); // byte rate
        wav.extend_from_slice(&1u16.to_le_bytes()); // block align
        wav.extend_from_slice(&8u16.to_le_bytes()); // bits per sample

        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_len as u32).to_le_bytes());
        wav.extend(std::iter::repeat(0x40u8).take(data_len));

        let riff_size = (wav.len() - 8) as u32;
        wav[4..8].copy_from_slice(&riff_size.to_le_bytes());
        wav
    }

    #[test]
    fn short_file_passes_through() {
        let wav = make_wav(100, 500); // 5 seconds at 100 B/s
        let clipped = clip_seconds(&wav, 60).unwrap();
        assert_eq!(clipped, wav);
    }

    #[test]
    fn long_file_is_clipped_to_the_cap() {
        let wav = make_wav(100, 100 * 90); // 90 seconds at 100 B/s
        let clipped = clip_seconds(&wav, 60).unwrap();

        // data payload is now exactly 60 seconds
        let data_size = u32::from_le_bytes([clipped[40], clipped[41], clipped[42], clipped[43]]);
        assert_eq!(data_size, 100 * 60);
        assert_eq!(clipped.len(), 44 + 100 * 60);

        // RIFF size field matches the new length
        let riff_size = u32::from_le_bytes([clipped[4], clipped[5], clipped[6], clipped[7]]);
        assert_eq!(riff_size as usize, clipped.len() - 8);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(clip_seconds(b"not audio at all", 60).is_err());
        assert!(clip_seconds(b"RIFF\x00\x00\x00\x00WAVE", 60).is_err());
    }

    #[test]
    fn data_before_fmt_is_rejected() {
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&20u32.to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&4u32.to_le_bytes());
        wav.extend_from_slice(&[0, 0, 0, 0]);
        assert!(clip_seconds(&wav, 60).is_err());
    }
}
