#![no_main]

use bytestream::Reader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = Reader::new(data);
    let mut idx = 0usize;

    // Use input bytes to drive a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 8;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_u8();
            }
            1 => {
                let _ = reader.read_offset_u8();
            }
            2 => {
                let _ = reader.read_le_u16();
            }
            3 => {
                let _ = reader.read_le_u32();
            }
            4 => {
                let _ = reader.read_v1_u32();
            }
            5 => {
                let _ = reader.read_var_u32();
            }
            6 => {
                let _ = reader.read_cstring();
            }
            _ => {
                let _ = reader.read_var_bytes();
            }
        }
    }
});
