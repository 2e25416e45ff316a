pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Linear interpolation between two u8 channel values.
pub(crate) fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let af = f32::from(a);
    let bf = f32::from(b);
    (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div255_identity_and_zero() {
        assert_eq!(mul_div255_u16(255, 255), 255);
        assert_eq!(mul_div255_u16(0, 255), 0);
        assert_eq!(mul_div255_u8(128, 255), 128);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp_u8(10, 250, 0.0), 10);
        assert_eq!(lerp_u8(10, 250, 1.0), 250);
        assert_eq!(lerp_u8(0, 255, 0.5), 128);
    }
}
