/// CSS hex notation: `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    bytes: Option<[u8; 4]>,
}

impl HexColor {
    pub fn new(hex: &str) -> Self {
        let bytes = hex.as_bytes();
        if !Self::validate(bytes) {
            return HexColor { bytes: None };
        }

        let value = match bytes.len() {
            4 => {
                let r = hex_1_to_u8(bytes[1]);
                let g = hex_1_to_u8(bytes[2]);
                let b = hex_1_to_u8(bytes[3]);
                [r * 17, g * 17, b * 17, 255]
            }
            5 => {
                let r = hex_1_to_u8(bytes[1]);
                let g = hex_1_to_u8(bytes[2]);
                let b = hex_1_to_u8(bytes[3]);
                let a = hex_1_to_u8(bytes[4]);
                [r * 17, g * 17, b * 17, a * 17]
            }
            7 => {
                let r = hex_2_to_u8(bytes[1], bytes[2]);
                let g = hex_2_to_u8(bytes[3], bytes[4]);
                let b = hex_2_to_u8(bytes[5], bytes[6]);
                [r, g, b, 255]
            }
            _ => {
                let r = hex_2_to_u8(bytes[1], bytes[2]);
                let g = hex_2_to_u8(bytes[3], bytes[4]);
                let b = hex_2_to_u8(bytes[5], bytes[6]);
                let a = hex_2_to_u8(bytes[7], bytes[8]);
                [r, g, b, a]
            }
        };

        HexColor { bytes: Some(value) }
    }

    fn validate(bytes: &[u8]) -> bool {
        let length = bytes.len();

        if length == 0 || bytes[0] != b'#' {
            return false;
        }

        if length != 4 && length != 5 && length != 7 && length != 9 {
            return false;
        }

        bytes[1..].iter().all(u8::is_ascii_hexdigit)
    }

    pub fn is_valid(&self) -> bool {
        self.bytes.is_some()
    }

    /// RGBA bytes, `None` for malformed input.
    pub fn rgba(&self) -> Option<[u8; 4]> {
        self.bytes
    }
}

fn hex_1_to_u8(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

fn hex_2_to_u8(c1: u8, c2: u8) -> u8 {
    (hex_1_to_u8(c1) << 4) | hex_1_to_u8(c2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_short_forms() {
        assert_eq!(HexColor::new("#fa0").rgba(), Some([255, 170, 0, 255]));
        assert_eq!(HexColor::new("#fa08").rgba(), Some([255, 170, 0, 136]));
        assert_eq!(HexColor::new("#12345678").rgba(), Some([0x12, 0x34, 0x56, 0x78]));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(!HexColor::new("fff").is_valid());
        assert!(!HexColor::new("#ggg").is_valid());
        assert_eq!(HexColor::new("#12345").rgba(), None);
    }
}
