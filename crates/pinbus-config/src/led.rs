//! LED string color-order resolution
//!
//! Addressable LED strings want their channels in a fixed wire order
//! ("GRB", "RGBW", ...). The firmware encodes an order as a single
//! byte of 2-bit channel offsets, `(w << 6) | (r << 4) | (g << 2) | b`,
//! where each offset is the channel's position in the transmitted
//! sequence; for three-channel strings the white offset mirrors red.
//! Computing the byte from the order string covers all 30 valid
//! permutations without a lookup table.

use crate::error::ConfigError;

/// Resolve a color-order string like "GRB" or "WRGB" to its wire code.
pub fn color_order_code(order: &str) -> Result<u8, ConfigError> {
    let invalid = || ConfigError::InvalidColorOrder(order.to_string());

    if order.len() != 3 && order.len() != 4 {
        return Err(invalid());
    }

    let position = |channel: char| order.chars().position(|c| c == channel);
    let r = position('R').ok_or_else(invalid)? as u8;
    let g = position('G').ok_or_else(invalid)? as u8;
    let b = position('B').ok_or_else(invalid)? as u8;
    let w = match order.len() {
        4 => position('W').ok_or_else(invalid)? as u8,
        _ => r,
    };

    Ok(w << 6 | r << 4 | g << 2 | b)
}

/// Parse a hex RGB(W) color like "FFFF00" or "0xFFFF00".
pub fn parse_color(color: &str) -> Result<u32, ConfigError> {
    let digits = color.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).map_err(|_| ConfigError::InvalidColor(color.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_channel_orders_match_the_firmware_table() {
        // Reference values from the firmware's NeoPixel constants.
        assert_eq!(color_order_code("RGB").unwrap(), (0 << 6) | (0 << 4) | (1 << 2) | 2);
        assert_eq!(color_order_code("GRB").unwrap(), (1 << 6) | (1 << 4) | (0 << 2) | 2);
        assert_eq!(color_order_code("BGR").unwrap(), (2 << 6) | (2 << 4) | (1 << 2) | 0);
    }

    #[test]
    fn four_channel_orders_include_the_white_offset() {
        assert_eq!(color_order_code("WRGB").unwrap(), (0 << 6) | (1 << 4) | (2 << 2) | 3);
        assert_eq!(color_order_code("RGBW").unwrap(), (3 << 6) | (0 << 4) | (1 << 2) | 2);
    }

    #[test]
    fn rejects_malformed_orders() {
        assert!(color_order_code("RG").is_err());
        assert!(color_order_code("RGX").is_err());
        assert!(color_order_code("RGBWW").is_err());
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_color("FFFF00").unwrap(), 0x00FF_FF00);
        assert_eq!(parse_color("0xFF0000").unwrap(), 0x00FF_0000);
        assert!(parse_color("nope").is_err());
    }
}
