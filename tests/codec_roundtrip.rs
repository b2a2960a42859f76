//! Round-trip tests for the binary codec
//!
//! The encoding is a wire contract: little-endian fixed-width integers,
//! LEB128 varints capped at 5/10 bytes, and varint-length-prefixed
//! strings. Any two implementations must produce identical bytes, so
//! these tests pin both the values and the encoded lengths.

use cuttle::{Directory, IndexInput, IndexOutput, RamDirectory};

/// Write one value with `write`, commit, and return (file length, reader).
fn single_value_file(
    write: impl FnOnce(&mut Box<dyn IndexOutput>),
) -> (u64, Box<dyn IndexInput>) {
    let dir = RamDirectory::new();
    {
        let mut out = dir.create_output("v").unwrap();
        write(&mut out);
    }
    let len = dir.file_length("v").unwrap();
    (len, dir.open_input("v").unwrap())
}

#[test]
fn test_varint32_boundary_round_trips() {
    let cases: &[(u32, u64)] = &[
        (0, 1),
        (1, 1),
        (127, 1),
        (128, 2),
        ((1 << 14) - 1, 2),
        (1 << 14, 3),
        ((1 << 21) - 1, 3),
        (1 << 21, 4),
        ((1 << 28) - 1, 4),
        (1 << 28, 5),
        (u32::MAX, 5),
    ];
    for &(value, expected_len) in cases {
        let (len, mut input) = single_value_file(|out| out.write_varint32(value).unwrap());
        assert_eq!(len, expected_len, "encoded length of {value}");
        assert_eq!(input.read_varint32().unwrap(), value);
        assert!(input.eof().unwrap());
    }
}

#[test]
fn test_varint64_boundary_round_trips() {
    let cases: &[(u64, u64)] = &[
        (0, 1),
        (127, 1),
        (128, 2),
        ((1 << 14) - 1, 2),
        ((1 << 21) - 1, 3),
        ((1 << 28) - 1, 4),
        ((1 << 35) - 1, 5),
        ((1 << 42) - 1, 6),
        ((1 << 49) - 1, 7),
        ((1 << 56) - 1, 8),
        ((1 << 63) - 1, 9),
        (u64::MAX, 10),
    ];
    for &(value, expected_len) in cases {
        let (len, mut input) = single_value_file(|out| out.write_varint64(value).unwrap());
        assert_eq!(len, expected_len, "encoded length of {value}");
        assert_eq!(input.read_varint64().unwrap(), value);
        assert!(input.eof().unwrap());
    }
}

#[test]
fn test_fixed_width_layout_is_little_endian() {
    let (len, mut input) = single_value_file(|out| out.write_fixed32(0x0102_0304).unwrap());
    assert_eq!(len, 4);
    let mut bytes = [0u8; 4];
    assert_eq!(input.read(&mut bytes).unwrap(), 4);
    assert_eq!(bytes, [0x04, 0x03, 0x02, 0x01]);

    let (len, mut input) = single_value_file(|out| out.write_fixed64(0x0102_0304_0506_0708).unwrap());
    assert_eq!(len, 8);
    let mut bytes = [0u8; 8];
    assert_eq!(input.read(&mut bytes).unwrap(), 8);
    assert_eq!(bytes, [0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
}

#[test]
fn test_fixed_round_trips_at_extremes() {
    for value in [0u32, 1, u32::MAX - 1, u32::MAX] {
        let (_, mut input) = single_value_file(|out| out.write_fixed32(value).unwrap());
        assert_eq!(input.read_fixed32().unwrap(), value);
    }
    for value in [0u64, 1, u64::MAX - 1, u64::MAX] {
        let (_, mut input) = single_value_file(|out| out.write_fixed64(value).unwrap());
        assert_eq!(input.read_fixed64().unwrap(), value);
    }
}

#[test]
fn test_string_round_trips() {
    let block_spanning: String = "quiddity ".repeat(1000); // 9000 bytes, > 2 blocks
    for value in ["", "a", "hello", block_spanning.as_str()] {
        let (len, mut input) = single_value_file(|out| out.write_string(value).unwrap());
        let mut buf = String::from("stale contents");
        input.read_string(&mut buf).unwrap();
        assert_eq!(buf, value);
        assert!(input.eof().unwrap());
        assert!(len >= value.len() as u64 + 1);
    }
}

#[test]
fn test_string_prefix_is_byte_length() {
    // multi-byte UTF-8: the prefix counts bytes, not characters
    let s = "héllo wörld";
    let (len, mut input) = single_value_file(|out| out.write_string(s).unwrap());
    assert_eq!(len, s.len() as u64 + 1);
    assert_eq!(input.read_varint32().unwrap(), s.len() as u32);
    let mut bytes = vec![0u8; s.len()];
    assert_eq!(input.read(&mut bytes).unwrap(), s.len());
    assert_eq!(bytes, s.as_bytes());
}

#[test]
fn test_truncated_varint_is_corruption() {
    let dir = RamDirectory::new();
    {
        let mut out = dir.create_output("cut").unwrap();
        // continuation bit set with nothing after it
        out.write_byte(0x80).unwrap();
    }
    let mut input = dir.open_input("cut").unwrap();
    assert!(input.read_varint32().unwrap_err().is_corruption());
}

#[test]
fn test_overlong_varint_is_corruption() {
    let dir = RamDirectory::new();
    {
        let mut out = dir.create_output("runaway").unwrap();
        // six continuation bytes exceed the 5-byte cap for 32-bit values
        out.write(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01]).unwrap();
    }
    let mut input = dir.open_input("runaway").unwrap();
    assert!(input.read_varint32().unwrap_err().is_corruption());
    input.seek(0).unwrap();
    // the same bytes are a fine varint64
    assert_eq!(input.read_varint64().unwrap(), 1 << 42);
}

#[test]
fn test_truncated_string_is_corruption() {
    let dir = RamDirectory::new();
    {
        let mut out = dir.create_output("lying_prefix").unwrap();
        out.write_varint32(100).unwrap();
        out.write(b"only twenty bytes her").unwrap();
    }
    let mut input = dir.open_input("lying_prefix").unwrap();
    let mut buf = String::new();
    assert!(input.read_string(&mut buf).unwrap_err().is_corruption());
}

#[test]
fn test_mixed_sequence_round_trip() {
    let dir = RamDirectory::new();
    {
        let mut out = dir.create_output("mixed").unwrap();
        for i in 0..500u32 {
            out.write_varint32(i * 7919).unwrap();
            out.write_fixed64(u64::from(i) << 32).unwrap();
            out.write_string(&format!("entry-{i}")).unwrap();
        }
    }
    let mut input = dir.open_input("mixed").unwrap();
    let mut buf = String::new();
    for i in 0..500u32 {
        assert_eq!(input.read_varint32().unwrap(), i * 7919);
        assert_eq!(input.read_fixed64().unwrap(), u64::from(i) << 32);
        input.read_string(&mut buf).unwrap();
        assert_eq!(buf, format!("entry-{i}"));
    }
    assert!(input.eof().unwrap());
}
