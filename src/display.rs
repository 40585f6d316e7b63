//! Position readout on an eight digit seven-segment display.
//!
//! The position is shown in units of 0.0001 with four decimals, e.g. `   0.0042` or `-123.4567`.
//! The left-most character is the sign. Values beyond what fits are pinned at `±999.9999`.

use core::fmt::Write;

use heapless::String;

/// Number of characters on the display.
pub const DIGITS: usize = 8;

/// Index of the character carrying the decimal point.
pub const DECIMAL_POINT_INDEX: usize = 3;

/// Largest magnitude that fits in seven digits.
pub const MAX_DISPLAY: u32 = 9_999_999;

/// Segment bit of the decimal point (`DP A B C D E F G`, MSB first).
pub const SEG_DP: u8 = 0b1000_0000;

/// Something that can show the current position.
pub trait PositionDisplay {
    fn show(&mut self, position: i32);
}

/// Render `position` as eight characters without the decimal point.
pub fn format_position(position: i32) -> String<DIGITS> {
    let sign = if position < 0 { '-' } else { ' ' };
    let magnitude = position.unsigned_abs().min(MAX_DISPLAY);

    let mut text = String::new();
    // Both forms are exactly DIGITS long, so the writes cannot overflow.
    let _ = if magnitude < 10_000 {
        write!(text, "{sign}  0{magnitude:04}")
    } else {
        write!(text, "{sign}{magnitude:>7}")
    };
    text
}

/// Segment pattern for a character. Unknown characters are blank.
pub const fn segments(c: u8, decimal_point: bool) -> u8 {
    let pattern = match c {
        b'0' => 0b0111_1110,
        b'1' => 0b0011_0000,
        b'2' => 0b0110_1101,
        b'3' => 0b0111_1001,
        b'4' => 0b0011_0011,
        b'5' => 0b0101_1011,
        b'6' => 0b0101_1111,
        b'7' => 0b0111_0000,
        b'8' => 0b0111_1111,
        b'9' => 0b0111_1011,
        b'A' | b'a' => 0b0111_0111,
        b'B' | b'b' => 0b0001_1111,
        b'C' | b'c' => 0b0000_1101,
        b'D' | b'd' => 0b0011_1101,
        b'E' | b'e' => 0b0100_1111,
        b'F' | b'f' => 0b0100_0111,
        b'H' | b'h' => 0b0011_0111,
        b'L' | b'l' => 0b0000_1110,
        b'N' | b'n' => 0b0001_0101,
        b'O' | b'o' => 0b0001_1101,
        b'P' | b'p' => 0b0110_0111,
        b'-' => 0b0000_0001,
        b'_' => 0b0000_1000,
        b'.' | b',' => SEG_DP,
        _ => 0,
    };
    if decimal_point {
        pattern | SEG_DP
    } else {
        pattern
    }
}

/// Segment patterns of `position`, left-most character first.
pub fn render(position: i32) -> [u8; DIGITS] {
    let text = format_position(position);
    let mut out = [0u8; DIGITS];
    for (i, c) in text.bytes().enumerate().take(DIGITS) {
        out[i] = segments(c, i == DECIMAL_POINT_INDEX);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_keep_leading_zero() {
        assert_eq!(format_position(0).as_str(), "   00000");
        assert_eq!(format_position(42).as_str(), "   00042");
        assert_eq!(format_position(-3).as_str(), "-  00003");
        assert_eq!(format_position(9_999).as_str(), "   09999");
    }

    #[test]
    fn large_values_right_aligned() {
        assert_eq!(format_position(10_000).as_str(), "   10000");
        assert_eq!(format_position(200_000).as_str(), "  200000");
        assert_eq!(format_position(-1_234_567).as_str(), "-1234567");
    }

    #[test]
    fn out_of_range_saturates() {
        assert_eq!(format_position(12_345_678).as_str(), " 9999999");
        assert_eq!(format_position(i32::MIN).as_str(), "-9999999");
    }

    #[test]
    fn render_places_decimal_point() {
        let segs = render(42);
        assert_eq!(segs[0], 0);
        assert_eq!(segs[3], segments(b'0', true));
        assert_eq!(segs[6], segments(b'4', false));
        assert_eq!(segs[7], segments(b'2', false));
        assert_eq!(segs.iter().filter(|s| **s & SEG_DP != 0).count(), 1);
    }

    #[test]
    fn render_negative_sign() {
        assert_eq!(render(-1)[0], segments(b'-', false));
    }

    #[test]
    fn segment_table() {
        assert_eq!(segments(b'8', false), 0x7F);
        assert_eq!(segments(b'8', true), 0xFF);
        assert_eq!(segments(b' ', false), 0);
        assert_eq!(segments(b'?', true), SEG_DP);
        assert_eq!(segments(b'a', false), segments(b'A', false));
    }
}
