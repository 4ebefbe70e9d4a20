use crate::{DexError, Result};

/// Extract the 4-bit nibble at `bit_pos` (0 = low nibble, 4 = high nibble).
pub fn get_nibble(byte: u8, bit_pos: u8) -> u8 {
    (byte >> bit_pos) & 0xF
}

/// Replace the 4-bit nibble at `bit_pos` with `value`, leaving the other
/// nibble untouched. `bit_pos` must be 0 or 4.
pub fn set_nibble(byte: u8, bit_pos: u8, value: u8) -> u8 {
    (byte & !(0xF << bit_pos)) | ((value & 0xF) << bit_pos)
}

pub fn get_bit(byte: u8, bit_pos: u8) -> bool {
    (byte >> bit_pos) & 1 == 1
}

pub fn set_bit(byte: u8, bit_pos: u8, value: bool) -> u8 {
    (byte & !(1 << bit_pos)) | (u8::from(value) << bit_pos)
}

/// Byte offset of an entity's state nibble relative to the state plane.
///
/// Two entities share each byte: entity 2k sits in the low nibble of byte k,
/// entity 2k+1 in the high nibble (shift `(entity & 1) * 4`).
pub fn state_offset(entity: u16, max_id: u16) -> Result<usize> {
    if entity == 0 || entity > max_id {
        return Err(DexError::EntityOutOfRange {
            entity,
            max: max_id,
        });
    }
    Ok(entity as usize / 2)
}

/// Shift selecting an entity's nibble within its shared state byte.
pub fn state_shift(entity: u16) -> u8 {
    ((entity & 1) * 4) as u8
}

/// Byte offset of bit `index` within a densely packed boolean plane
/// (8 indices per byte, bit `index % 8`).
pub fn plane_offset(index: u32, plane_base: usize, capacity: u32) -> Result<usize> {
    if index >= capacity {
        return Err(DexError::PlaneIndexOutOfRange { index, capacity });
    }
    Ok(plane_base + index as usize / 8)
}

pub fn plane_bit_pos(index: u32) -> u8 {
    (index % 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nibble_set_is_exact() {
        assert_eq!(set_nibble(0x00, 4, 0x2), 0x20);
        assert_eq!(set_nibble(0x00, 0, 0x2), 0x02);
        assert_eq!(set_nibble(0xFF, 0, 0x1), 0xF1);
        assert_eq!(set_nibble(0xFF, 4, 0x1), 0x1F);
    }

    #[test]
    fn nibble_get_reads_back() {
        assert_eq!(get_nibble(0x21, 0), 1);
        assert_eq!(get_nibble(0x21, 4), 2);
    }

    #[test]
    fn bit_set_and_clear() {
        assert_eq!(set_bit(0x00, 7, true), 0x80);
        assert_eq!(set_bit(0x00, 0, true), 0x01);
        assert_eq!(set_bit(0xFF, 3, false), 0xF7);
        assert!(get_bit(0x08, 3));
        assert!(!get_bit(0x08, 2));
    }

    #[test]
    fn state_offset_pairs_neighbors() {
        assert_eq!(state_offset(2, 10).unwrap(), 1);
        assert_eq!(state_offset(3, 10).unwrap(), 1);
        assert_eq!(state_offset(7, 10).unwrap(), 3);
        assert_eq!(state_shift(2), 0);
        assert_eq!(state_shift(3), 4);
    }

    #[test]
    fn state_offset_rejects_out_of_range() {
        assert!(state_offset(0, 10).is_err());
        assert!(state_offset(10, 10).is_ok());
        assert!(state_offset(11, 10).is_err());
    }

    #[test]
    fn plane_offset_packs_eight_per_byte() {
        assert_eq!(plane_offset(0, 0x40, 16).unwrap(), 0x40);
        assert_eq!(plane_offset(7, 0x40, 16).unwrap(), 0x40);
        assert_eq!(plane_offset(8, 0x40, 16).unwrap(), 0x41);
        assert_eq!(plane_bit_pos(13), 5);
    }

    #[test]
    fn plane_offset_rejects_index_at_capacity() {
        assert!(plane_offset(16, 0, 16).is_err());
        assert!(plane_offset(15, 0, 16).is_ok());
    }
}
