pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Quantize a `[0, 1]` weight to the 0..=255 fixed-point scale used by the blend helpers.
pub(crate) fn unit_to_u8_weight(t: f32) -> u16 {
    ((t.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div255_rounds_to_nearest() {
        assert_eq!(mul_div255_u16(255, 255), 255);
        assert_eq!(mul_div255_u16(255, 128), 128);
        assert_eq!(mul_div255_u8(0, 255), 0);
    }

    #[test]
    fn unit_weight_clamps() {
        assert_eq!(unit_to_u8_weight(-1.0), 0);
        assert_eq!(unit_to_u8_weight(0.5), 128);
        assert_eq!(unit_to_u8_weight(7.0), 255);
    }
}
