use serde::{Deserialize, Serialize};

/// No language acquired.
pub const LANGUAGE_NONE: u32 = 0;
/// All nine recognized languages acquired (bits 0..=8).
pub const LANGUAGE_ALL: u32 = 0x1FF;

/// Save-file language identifiers. The numeric codes are the values stored
/// elsewhere in the save container; code 6 is a historical gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Japanese,
    English,
    French,
    Italian,
    German,
    Spanish,
    Korean,
    ChineseSimplified,
    ChineseTraditional,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::Japanese,
        Language::English,
        Language::French,
        Language::Italian,
        Language::German,
        Language::Spanish,
        Language::Korean,
        Language::ChineseSimplified,
        Language::ChineseTraditional,
    ];

    pub fn code(self) -> u8 {
        match self {
            Language::Japanese => 1,
            Language::English => 2,
            Language::French => 3,
            Language::Italian => 4,
            Language::German => 5,
            Language::Spanish => 7,
            Language::Korean => 8,
            Language::ChineseSimplified => 9,
            Language::ChineseTraditional => 10,
        }
    }

    pub fn from_code(code: u8) -> Option<Language> {
        match code {
            1 => Some(Language::Japanese),
            2 => Some(Language::English),
            3 => Some(Language::French),
            4 => Some(Language::Italian),
            5 => Some(Language::German),
            7 => Some(Language::Spanish),
            8 => Some(Language::Korean),
            9 => Some(Language::ChineseSimplified),
            10 => Some(Language::ChineseTraditional),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Language> {
        match name.to_ascii_lowercase().as_str() {
            "japanese" | "jpn" => Some(Language::Japanese),
            "english" | "eng" => Some(Language::English),
            "french" | "fre" | "fra" => Some(Language::French),
            "italian" | "ita" => Some(Language::Italian),
            "german" | "ger" | "deu" => Some(Language::German),
            "spanish" | "spa" => Some(Language::Spanish),
            "korean" | "kor" => Some(Language::Korean),
            "chinese-simplified" | "chs" => Some(Language::ChineseSimplified),
            "chinese-traditional" | "cht" => Some(Language::ChineseTraditional),
            _ => None,
        }
    }

    /// Bit position inside the per-entity acquisition mask.
    pub fn bit_index(self) -> u8 {
        match self {
            Language::Japanese => 0,
            Language::English => 1,
            Language::French => 2,
            Language::Italian => 3,
            Language::German => 4,
            Language::Spanish => 5,
            Language::Korean => 6,
            Language::ChineseSimplified => 7,
            Language::ChineseTraditional => 8,
        }
    }
}

/// Mask bit for a raw language code; `None` for unrecognized codes.
pub fn language_bit(code: u8) -> Option<u8> {
    Language::from_code(code).map(Language::bit_index)
}

/// Little-endian u32 read at `offset`. The caller has already validated the
/// offset against the ledger bounds.
pub fn read_mask(data: &[u8], offset: usize) -> u32 {
    let b = &data[offset..offset + 4];
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

pub fn write_mask(data: &mut [u8], offset: usize, mask: u32) {
    data[offset..offset + 4].copy_from_slice(&mask.to_le_bytes());
}
