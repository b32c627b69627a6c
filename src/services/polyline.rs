//! Encoded-polyline decoding.
//!
//! The routing provider returns route geometry in the Google encoded
//! polyline format (1e-5 precision). We only ever decode.

/// Decode an encoded polyline into `[lat, lon]` pairs.
///
/// Returns `None` when the input is truncated or contains bytes outside
/// the polyline alphabet; a malformed geometry is dropped rather than
/// guessed at.
pub fn decode(encoded: &str) -> Option<Vec<[f64; 2]>> {
    let bytes = encoded.as_bytes();
    let mut coords = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while index < bytes.len() {
        let (dlat, next) = decode_value(bytes, index)?;
        let (dlon, next) = decode_value(bytes, next)?;
        index = next;
        lat += dlat;
        lon += dlon;
        coords.push([lat as f64 * 1e-5, lon as f64 * 1e-5]);
    }

    Some(coords)
}

/// Largest shift a varint chunk may land at: a 5-bit chunk at 55 still
/// fits in i64. Real coordinate deltas fit in a handful of chunks;
/// anything longer is a corrupt stream.
const MAX_SHIFT: u32 = 55;

/// Decode one varint-encoded signed value starting at `index`.
fn decode_value(bytes: &[u8], mut index: usize) -> Option<(i64, usize)> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes.get(index)?;
        if !(63..=126).contains(&byte) {
            return None;
        }
        if shift > MAX_SHIFT {
            return None;
        }
        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        index += 1;
        if chunk < 0x20 {
            break;
        }
    }

    let value = if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Some((value, index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_reference_polyline() {
        // Reference vector from the format documentation.
        let coords = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(coords.len(), 3);
        assert!((coords[0][0] - 38.5).abs() < 1e-9);
        assert!((coords[0][1] + 120.2).abs() < 1e-9);
        assert!((coords[2][0] - 43.252).abs() < 1e-9);
        assert!((coords[2][1] + 126.453).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_empty_route() {
        assert_eq!(decode("").unwrap(), Vec::<[f64; 2]>::new());
    }

    #[test]
    fn truncated_input_is_rejected() {
        assert!(decode("_p~iF").is_none());
    }

    #[test]
    fn out_of_alphabet_bytes_are_rejected() {
        assert!(decode("\u{1}\u{2}").is_none());
    }

    #[test]
    fn overlong_continuation_run_is_rejected() {
        // Every '~' keeps the continuation bit set; the value never
        // terminates and must not be shifted past the accumulator width.
        assert!(decode("~~~~~~~~~~~~~~~").is_none());
        assert!(decode(&"~".repeat(100)).is_none());
    }
}
