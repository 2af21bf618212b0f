//! CRC-32C (Castagnoli) as used by TFRecord framing.
//!
//! Stored checksums are "masked": rotated right by 15 bits and offset by a
//! constant, so that a CRC of data which itself embeds CRCs stays well mixed.

const CASTAGNOLI_POLY: u32 = 0x82F6_3B78; // reversed 0x1EDC6F41
const MASK_DELTA: u32 = 0xA282_EAD8;

static TABLE: [u32; 256] = make_table();

const fn make_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CASTAGNOLI_POLY
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// plain CRC-32C of `bytes`
pub fn crc32c(bytes: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &b in bytes {
        crc = TABLE[((crc ^ u32::from(b)) & 0xFF) as usize] ^ (crc >> 8);
    }
    !crc
}

/// A masked CRC-32C, the form stored in record headers and footers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskedCrc(pub u32);

impl MaskedCrc {
    /// checksum `bytes` and mask the result
    pub fn compute(bytes: &[u8]) -> Self {
        Self::mask(crc32c(bytes))
    }

    /// mask a raw CRC-32C
    pub fn mask(crc: u32) -> Self {
        MaskedCrc(crc.rotate_right(15).wrapping_add(MASK_DELTA))
    }

    /// recover the raw CRC-32C
    pub fn unmask(self) -> u32 {
        self.0.wrapping_sub(MASK_DELTA).rotate_left(15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_match_check_value() {
        assert_eq!(crc32c(b"123456789"), 0xE306_9283);
    }

    #[test]
    fn should_match_iscsi_vectors() {
        assert_eq!(crc32c(&[0u8; 32]), 0x8A91_36AA);
        assert_eq!(crc32c(&[0xFFu8; 32]), 0x62A8_AB43);
        let ascending: Vec<u8> = (0..32).collect();
        assert_eq!(crc32c(&ascending), 0x46DD_794E);
    }

    #[test]
    fn should_mask_empty_input_to_delta() {
        assert_eq!(crc32c(&[]), 0);
        assert_eq!(MaskedCrc::compute(&[]), MaskedCrc(MASK_DELTA));
    }

    #[test]
    fn should_unmask() {
        let crc = crc32c(b"values");
        assert_eq!(MaskedCrc::mask(crc).unmask(), crc);
    }
}
