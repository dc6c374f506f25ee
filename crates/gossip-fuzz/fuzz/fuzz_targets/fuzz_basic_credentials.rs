#![no_main]

use gossip_oauth::credentials::BasicCredentials;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = std::str::from_utf8(data) {
        if let Ok(creds) = BasicCredentials::parse(value) {
            // Whatever parses must survive a re-encode.
            assert_eq!(BasicCredentials::parse(&creds.to_header_value()), Ok(creds));
        }
    }
});
