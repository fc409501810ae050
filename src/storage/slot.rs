//! Data file slot format
//!
//! Every document occupies one slot:
//!
//! ```text
//! +------------------+
//! | Flag             | (u8: 1 = live, 0 = deleted)
//! +------------------+
//! | Room             | (u32 LE, capacity of the payload area)
//! +------------------+
//! | Length           | (u32 LE, bytes of payload in use)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! | Payload          | (room bytes, zero padded after length)
//! +------------------+
//! ```
//!
//! The checksum covers room, length and the used payload bytes. The flag is
//! excluded so that deleting a slot is a single byte write.
//!
//! A header whose room is zero marks the end of data: the file is grown in
//! zero-filled chunks and the first all-zero header is where the next slot
//! goes.

use super::checksum::{compute_checksum, verify_checksum};

/// Bytes in front of every payload
pub const SLOT_HEADER_SIZE: u64 = 13;

/// Flag of a deleted slot
pub const FLAG_DELETED: u8 = 0;

/// Flag of a live slot
pub const FLAG_LIVE: u8 = 1;

/// Decoded slot header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHeader {
    pub flag: u8,
    pub room: u32,
    pub length: u32,
    pub checksum: u32,
}

impl SlotHeader {
    /// Header for a live slot holding `payload` in `room` bytes.
    pub fn live(room: u32, payload: &[u8]) -> Self {
        let length = payload.len() as u32;
        Self {
            flag: FLAG_LIVE,
            room,
            length,
            checksum: compute_checksum(&[&room.to_le_bytes(), &length.to_le_bytes(), payload]),
        }
    }

    pub fn encode(&self) -> [u8; SLOT_HEADER_SIZE as usize] {
        let mut buf = [0u8; SLOT_HEADER_SIZE as usize];
        buf[0] = self.flag;
        buf[1..5].copy_from_slice(&self.room.to_le_bytes());
        buf[5..9].copy_from_slice(&self.length.to_le_bytes());
        buf[9..13].copy_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8; SLOT_HEADER_SIZE as usize]) -> Self {
        Self {
            flag: buf[0],
            room: u32::from_le_bytes([buf[1], buf[2], buf[3], buf[4]]),
            length: u32::from_le_bytes([buf[5], buf[6], buf[7], buf[8]]),
            checksum: u32::from_le_bytes([buf[9], buf[10], buf[11], buf[12]]),
        }
    }

    pub fn is_live(&self) -> bool {
        self.flag == FLAG_LIVE
    }

    /// True for the zero header that follows the last slot
    pub fn is_end(&self) -> bool {
        self.room == 0
    }

    /// Flag must be live or deleted and the payload must fit in the room.
    pub fn is_well_formed(&self) -> bool {
        (self.flag == FLAG_LIVE || self.flag == FLAG_DELETED) && self.length <= self.room
    }

    /// Total bytes occupied by the slot, header included
    pub fn slot_len(&self) -> u64 {
        SLOT_HEADER_SIZE + self.room as u64
    }

    pub fn verify(&self, payload: &[u8]) -> bool {
        verify_checksum(
            &[&self.room.to_le_bytes(), &self.length.to_le_bytes(), payload],
            self.checksum,
        )
    }
}

/// Room reserved for a new payload: twice its length, so moderate growth
/// can be written in place.
pub fn room_for(len: usize) -> u64 {
    (len as u64 * 2).max(1)
}

/// Serialize a complete live slot, padding the payload up to `room`.
pub fn encode_slot(room: u32, payload: &[u8]) -> Vec<u8> {
    let header = SlotHeader::live(room, payload);
    let mut buf = Vec::with_capacity(header.slot_len() as usize);
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    buf.resize(header.slot_len() as usize, 0);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let header = SlotHeader::live(64, b"{\"name\": \"Alice\"}");
        assert_eq!(SlotHeader::decode(&header.encode()), header);
    }

    #[test]
    fn test_zero_header_marks_end() {
        let header = SlotHeader::decode(&[0u8; SLOT_HEADER_SIZE as usize]);
        assert!(header.is_end());
        assert!(!header.is_live());
    }

    #[test]
    fn test_encoded_slot_is_padded_to_room() {
        let slot = encode_slot(10, b"abc");
        assert_eq!(slot.len() as u64, SLOT_HEADER_SIZE + 10);
        assert!(slot[SLOT_HEADER_SIZE as usize + 3..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_checksum_detects_payload_change() {
        let header = SlotHeader::live(16, b"original");
        assert!(header.verify(b"original"));
        assert!(!header.verify(b"origina1"));
    }

    #[test]
    fn test_room_doubles_length() {
        assert_eq!(room_for(0), 1);
        assert_eq!(room_for(5), 10);
    }

    #[test]
    fn test_malformed_flag_detected() {
        let mut header = SlotHeader::live(8, b"x");
        header.flag = 7;
        assert!(!header.is_well_formed());
    }
}
