#![no_main]

use libfuzzer_sys::fuzz_target;
use wire::{decode_pdu, parse_formats, select_format, Limits, TrainingProbe, WaveInfo};

fuzz_target!(|data: &[u8]| {
    let limits = Limits::for_testing();
    let _ = decode_pdu(data);

    if let Ok(table) = parse_formats(data, &limits) {
        assert!(table.len() <= limits.max_formats);
        if let Some(index) = select_format(&table) {
            assert!(index < table.len());
        }
    }
    let _ = TrainingProbe::parse(data);

    if data.len() >= 2 {
        let body_size = u16::from_le_bytes([data[0], data[1]]);
        if let Ok(info) = WaveInfo::parse(&data[2..], body_size) {
            assert!(info.wave_len >= 4);
        }
    }
});
