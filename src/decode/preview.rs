//! Display preview of received test packets

use std::fmt::Write;

/// Packet length that carries seven little-endian `f32` samples.
pub const FLOAT_PACKET_LEN: usize = 28;

/// Build the display preview of a test packet.
///
/// Always `"Hex: XX XX ..."`; a [`FLOAT_PACKET_LEN`] packet adds a second
/// line `"Floats: a, b, ..."` with one fractional digit per value.
pub fn packet_preview(data: &[u8]) -> String {
    let mut preview = String::with_capacity(5 + data.len() * 3);
    preview.push_str("Hex: ");
    for (i, byte) in data.iter().enumerate() {
        if i > 0 {
            preview.push(' ');
        }
        let _ = write!(preview, "{:02X}", byte);
    }

    if let Some(floats) = packet_floats(data) {
        let rendered: Vec<String> = floats.iter().map(|v| format_one_decimal(*v)).collect();
        preview.push_str("\nFloats: ");
        preview.push_str(&rendered.join(", "));
    }

    preview
}

/// Render with one fractional digit, ties rounded away from zero.
///
/// Non-finite values render as `NaN`, `Infinity` and `-Infinity`.
pub fn format_one_decimal(value: f32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // An f32 times ten is exact in f64, so `round` sees the true tie.
    let tenths = (value.abs() as f64 * 10.0).round();
    let digits = format!("{:.0}", tenths);
    let (whole, frac) = if digits.len() > 1 {
        digits.split_at(digits.len() - 1)
    } else {
        ("0", digits.as_str())
    };
    let sign = if value.is_sign_negative() { "-" } else { "" };
    format!("{}{}.{}", sign, whole, frac)
}

/// Interpret a packet as seven little-endian floats, if it has exactly the right length.
pub fn packet_floats(data: &[u8]) -> Option<[f32; 7]> {
    if data.len() != FLOAT_PACKET_LEN {
        return None;
    }

    let mut values = [0f32; 7];
    for (value, chunk) in values.iter_mut().zip(data.chunks_exact(4)) {
        *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Some(values)
}
