#![no_main]

use libfuzzer_sys::fuzz_target;
use track::{decode_score, encode_score};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode cleanly or fail with a structured error.
    // Any score that decodes is well-formed, so re-encoding must succeed
    // and survive a second round trip. Byte identity with the input is not
    // guaranteed (the decoder accepts non-minimal var-ints), value
    // identity is.
    if let Ok(score) = decode_score(data) {
        let reencoded = encode_score(&score).unwrap();
        let again = decode_score(&reencoded).unwrap();
        assert_eq!(again, score);
    }
});
