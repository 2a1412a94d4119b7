#![no_main]

use libfuzzer_sys::fuzz_target;
use roastline::config::ImportConfig;
use roastline::model::{Provenance, RoastId};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing must either succeed or return a FormatError, never panic
    let Ok(parsed) = roastline::literal::parse_document(text) else {
        return;
    };

    // Whatever parses must survive validation and, when valid, transformation
    let report = roastline::validator::validate_document(&parsed.value, "fuzz");
    if report.is_valid() {
        if let Ok(roast_id) = RoastId::new("fuzz") {
            let _ = roastline::transform::transform_document(
                &parsed.value,
                &roast_id,
                Provenance::Imported,
                &ImportConfig::default(),
            );
        }
    }
});
