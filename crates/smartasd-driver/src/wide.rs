//! Decoding of NUL-terminated `wchar_t` strings returned by the driver.

#![cfg_attr(not(feature = "hardware"), allow(dead_code))]

use std::mem::size_of;

use smartapi_sys::wchar_t;

/// Upper bound on name length, in code units, for unterminated buffers.
pub(crate) const MAX_NAME_UNITS: usize = 1024;

/// Decode code units as UTF-16 when `wchar_t` is 16 bits, UTF-32 otherwise.
pub(crate) fn decode_units(units: &[u32]) -> String {
    if size_of::<wchar_t>() == 2 {
        char::decode_utf16(units.iter().map(|&u| u as u16))
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    } else {
        units
            .iter()
            .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

/// Read a NUL-terminated wide string.
///
/// # Safety
///
/// `ptr` must be non-null and point to readable `wchar_t` values up to a
/// terminator or [`MAX_NAME_UNITS`] units, whichever comes first.
pub(crate) unsafe fn read_wide(ptr: *const wchar_t) -> String {
    let mut units = Vec::new();
    for i in 0..MAX_NAME_UNITS {
        // SAFETY: guaranteed readable by the caller until the terminator
        let unit = unsafe { *ptr.add(i) };
        if unit == 0 {
            break;
        }
        units.push(unit as u32);
    }
    decode_units(&units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ascii() {
        let units: Vec<u32> = "SmartASD".chars().map(|c| c as u32).collect();
        assert_eq!(decode_units(&units), "SmartASD");
    }

    #[test]
    fn test_read_wide_stops_at_nul() {
        let buf: Vec<wchar_t> = "ASD\0junk".chars().map(|c| c as wchar_t).collect();
        // SAFETY: buf is terminated within bounds
        let name = unsafe { read_wide(buf.as_ptr()) };
        assert_eq!(name, "ASD");
    }
}
