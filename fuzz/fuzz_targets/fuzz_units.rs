#![no_main]

use glmpeak::units::{catalog_unit, parse_instant, EpochUnit};
use libfuzzer_sys::fuzz_target;

// Unit strings come straight from untrusted files; parsing must never panic
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = parse_instant(text);
    let _ = catalog_unit(text);

    if let Ok(Some(unit)) = EpochUnit::parse(text) {
        // Extreme offsets must be rejected, not overflow
        for offset in [0.0, -1.0, 1e6, 1e18, f64::MAX, f64::NAN, f64::INFINITY] {
            let _ = unit.instant(offset);
        }
    }
});
