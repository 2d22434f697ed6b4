//! BGZF container round-trip scenarios (spec.md §8 scenario 4).

use std::io::{Read, Write};

use samlib::bgzf::{decode_block, encode_block, BgzfReader, BgzfWriter, EOF_MARKER};

#[test]
fn single_block_round_trips() {
    let payload = b"Hello, BGZF!".to_vec();
    let encoded = encode_block(&payload).unwrap();
    let decoded = decode_block(&mut &encoded[..]).unwrap();
    assert_eq!(decoded, payload);
}

#[test]
fn concatenated_blocks_plus_eof_marker_decode_to_exact_byte_stream() {
    let first = encode_block(b"abc").unwrap();
    let second = encode_block(b"defgh").unwrap();

    let mut stream = Vec::new();
    stream.extend_from_slice(&first);
    stream.extend_from_slice(&second);
    stream.extend_from_slice(&EOF_MARKER);

    let mut reader = BgzfReader::new(&stream[..]);
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"abcdefgh");
}

#[test]
fn writer_then_reader_round_trips_multiple_blocks() {
    let mut out = Vec::new();
    {
        let mut writer = BgzfWriter::new(&mut out);
        writer.write_all(&vec![b'x'; 200_000]).unwrap();
        writer.finish().unwrap();
    }

    let mut reader = BgzfReader::new(&out[..]);
    let mut data = Vec::new();
    reader.read_to_end(&mut data).unwrap();
    assert_eq!(data.len(), 200_000);
    assert!(data.iter().all(|&b| b == b'x'));
}

#[test]
fn bad_magic_is_rejected() {
    let mut garbage = vec![0u8; 32];
    garbage[0] = 0x00;
    assert!(decode_block(&mut &garbage[..]).is_err());
}
