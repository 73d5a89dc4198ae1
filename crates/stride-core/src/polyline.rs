//! Encoded polyline codec (Google 1e-5 format).
//!
//! Route providers return geometry as an encoded polyline string; the
//! analysis side decodes it back into coordinates before sampling.

use crate::models::Coordinate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolylineError {
    #[error("polyline ends mid-chunk at byte {0}")]
    Truncated(usize),
    #[error("invalid polyline byte {0:#04x} at offset {1}")]
    InvalidByte(u8, usize),
}

/// Decode an encoded polyline into coordinates.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut offset = 0;

    while offset < bytes.len() {
        let (dlat, next) = decode_value(bytes, offset)?;
        let (dlng, next) = decode_value(bytes, next)?;
        offset = next;

        lat += dlat;
        lng += dlng;
        points.push(Coordinate::new(lat as f64 / 1e5, lng as f64 / 1e5));
    }

    Ok(points)
}

/// Encode coordinates into a polyline string.
pub fn encode(points: &[Coordinate]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in points {
        let lat = (point.lat * 1e5).round() as i64;
        let lng = (point.lng * 1e5).round() as i64;
        encode_value(lat - prev_lat, &mut out);
        encode_value(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn decode_value(bytes: &[u8], mut offset: usize) -> Result<(i64, usize), PolylineError> {
    let mut result: u64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes
            .get(offset)
            .ok_or(PolylineError::Truncated(offset))?;
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidByte(byte, offset));
        }

        let chunk = u64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        offset += 1;

        if chunk < 0x20 {
            break;
        }
    }

    let value = if result & 1 == 1 {
        !(result >> 1) as i64
    } else {
        (result >> 1) as i64
    };

    Ok((value, offset))
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = if value < 0 {
        !((value as u64) << 1)
    } else {
        (value as u64) << 1
    };

    while v >= 0x20 {
        out.push((((v & 0x1f) | 0x20) as u8 + 63) as char);
        v >>= 5;
    }
    out.push((v as u8 + 63) as char);
}
