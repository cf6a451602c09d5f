#![no_main]

use libfuzzer_sys::fuzz_target;
use session::{AudioChunk, Dispatcher, SessionConfig};

fuzz_target!(|data: &[u8]| {
    let mut whole: Dispatcher<Vec<Vec<u8>>, Vec<AudioChunk>> =
        Dispatcher::new(SessionConfig::for_testing(), Vec::new(), Vec::new());
    let expected = whole.on_inbound_bytes(data);

    // Re-feed in chunks sized by the input itself; framing must not depend on them.
    let mut split: Dispatcher<Vec<Vec<u8>>, Vec<AudioChunk>> =
        Dispatcher::new(SessionConfig::for_testing(), Vec::new(), Vec::new());
    let mut outcomes = Vec::new();
    let mut idx = 0usize;
    while idx < data.len() {
        let len = (usize::from(data[idx]) % 17).saturating_add(1);
        let end = (idx + len).min(data.len());
        outcomes.extend(split.on_inbound_bytes(&data[idx..end]));
        idx = end;
    }

    assert_eq!(outcomes, expected);
    assert_eq!(split.transport(), whole.transport());
    assert_eq!(split.sink(), whole.sink());
    assert_eq!(split.buffered_len(), whole.buffered_len());
});
