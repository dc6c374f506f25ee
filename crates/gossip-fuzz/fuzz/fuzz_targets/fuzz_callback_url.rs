#![no_main]

use gossip_oauth::urls::{CallbackUrl, code_redirect};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Ok(callback) = CallbackUrl::parse(raw) {
            let _ = code_redirect(&callback, "localhost", 8443, "code");
        }
    }
});
