/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use bitcursor::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;

/// Reference extraction of `n` bits at bit position `pos`, least
/// significant bit first.
fn bits_at(data: &[u8], pos: u64, n: usize) -> u64 {
    let mut res = 0;
    for i in 0..n as u64 {
        let bit = pos + i;
        if (data[(bit / 8) as usize] >> (bit % 8)) & 1 != 0 {
            res |= 1 << i;
        }
    }
    res
}

fn random_data(len: usize, seed: u64) -> Vec<u8> {
    let mut r = SmallRng::seed_from_u64(seed);
    (0..len).map(|_| r.r#gen::<u8>()).collect()
}

/// Perform a random mix of operations, checking them against [`bits_at`],
/// and return everything that was decoded.
fn decode_random<S: ByteRead>(data: &[u8], source: S, buffer_size: usize) -> Result<Vec<u64>> {
    let mut cursor = BitCursor::new();
    cursor.open(source, buffer_size)?;
    let mut r = SmallRng::seed_from_u64(0);
    let mut decoded = vec![];
    let total_bits = data.len() as u64 * 8;

    loop {
        let pos = cursor.actual_position();
        assert!(cursor.lazy_position() <= pos);
        if total_bits - pos < 8 * 80 {
            break;
        }
        match r.gen_range(0..8) {
            0 => {
                let bit = cursor.read_bit()?;
                assert_eq!(bit as u64, bits_at(data, pos, 1));
                decoded.push(bit as u64);
            }
            1 => {
                let n = r.gen_range(0..=32);
                let value = cursor.read_unsigned_int(n)?;
                assert_eq!(value as u64, bits_at(data, pos, n));
                decoded.push(value as u64);
            }
            2 => {
                let n = r.gen_range(1..=32);
                let value = cursor.read_signed_int(n)?;
                let raw = bits_at(data, pos, n);
                let expected = ((raw << (64 - n)) as i64) >> (64 - n);
                assert_eq!(value as i64, expected);
                decoded.push(value as u64);
            }
            3 => {
                let value = cursor.read_single_byte()?;
                assert_eq!(value as u64, bits_at(data, pos, 8));
                decoded.push(value as u64);
            }
            4 => {
                let n = r.gen_range(0..50);
                let bytes = cursor.read_bytes(n)?;
                for (i, &b) in bytes.iter().enumerate() {
                    assert_eq!(b as u64, bits_at(data, pos + 8 * i as u64, 8));
                }
                decoded.extend(bytes.iter().map(|&b| b as u64));
            }
            5 => {
                let n = r.gen_range(0..8 * 60);
                cursor.skip(n)?;
            }
            6 => {
                let n: u64 = r.gen_range(0..8 * 70);
                cursor.begin_chunk(n)?;
                let read = r.gen_range(0..=n.min(32));
                decoded.push(cursor.read_unsigned_int(read as usize)? as u64);
                assert_eq!(cursor.chunk_finished()?, read == n);
                cursor.end_chunk()?;
                assert_eq!(cursor.actual_position(), pos + n);
            }
            7 => {
                let n = r.gen_range(0..=8);
                let value = cursor.read_bits_to_byte(n)?;
                assert_eq!(value as u64, bits_at(data, pos, n));
                decoded.push(value as u64);
            }
            _ => unreachable!(),
        }
        assert!(cursor.actual_position() >= pos);
    }
    decoded.push(cursor.actual_position());
    cursor.close()?;
    Ok(decoded)
}

#[test]
fn test_buffer_size_is_not_observable() -> Result<()> {
    let data = random_data(20_000, 1);
    let reference = decode_random(&data, MemByteReader::new(&data), 24)?;
    for buffer_size in [32, 40, 64, 256, 4096, 1 << 16] {
        assert_eq!(
            decode_random(&data, MemByteReader::new(&data), buffer_size)?,
            reference,
            "buffer size {}",
            buffer_size
        );
        assert_eq!(
            decode_random(&data, ReadAdapter::new(&data[..]), buffer_size)?,
            reference,
            "buffer size {} (not seekable)",
            buffer_size
        );
        assert_eq!(
            decode_random(&data, SeekAdapter::new(Cursor::new(&data)), buffer_size)?,
            reference,
            "buffer size {} (std seek)",
            buffer_size
        );
    }
    Ok(())
}

#[test]
fn test_prefix_composable() -> Result<()> {
    let data = random_data(64, 2);
    let word = u64::from_le_bytes(data[..8].try_into()?);
    let mask = |k: usize| (1_u64 << k) - 1;
    for n in 0..=32 {
        for m in 0..=32 {
            let mut cursor = BitCursor::new();
            cursor.open(MemByteReader::new(&data), 24)?;
            let first = cursor.read_unsigned_int(n)? as u64;
            let second = cursor.read_unsigned_int(m)? as u64;
            assert_eq!(first, word & mask(n));
            assert_eq!(second, (word >> n) & mask(m));
        }
    }
    Ok(())
}

#[test]
fn test_signed_extremes() -> Result<()> {
    let data: Vec<u8> = [0x7fff_ffff_u32, 0x8000_0000, 0]
        .iter()
        .flat_map(|x| x.to_le_bytes())
        .collect();
    let mut cursor = BitCursor::new();
    cursor.open(MemByteReader::new(&data), 24)?;
    assert_eq!(cursor.read_signed_int(32)?, i32::MAX);
    assert_eq!(cursor.read_signed_int(32)?, i32::MIN);
    assert_eq!(cursor.read_signed_int(32)?, 0);
    Ok(())
}

#[test]
fn test_refill_keeps_actual_position() -> Result<()> {
    let data = random_data(1000, 3);
    let mut cursor = BitCursor::new();
    cursor.open(ReadAdapter::new(&data[..]), 24)?;
    let mut refills = 0;
    let mut lazy = cursor.lazy_position();
    for i in 0..(8 * 1000 / 7) as u64 {
        assert_eq!(cursor.actual_position(), 7 * i);
        cursor.read_unsigned_int(7)?;
        assert_eq!(cursor.actual_position(), 7 * (i + 1));
        if cursor.lazy_position() != lazy {
            assert!(cursor.lazy_position() > lazy);
            lazy = cursor.lazy_position();
            refills += 1;
        }
    }
    assert!(refills > 50);
    Ok(())
}

#[test]
fn test_huge_chunk() -> Result<()> {
    let data = random_data(100_000, 4);
    let n = 8 * 90_000 + 3;
    for seekable in [false, true] {
        let source: Box<dyn ByteRead> = if seekable {
            Box::new(SeekAdapter::new(Cursor::new(data.clone())))
        } else {
            Box::new(ReadAdapter::new(Cursor::new(data.clone())))
        };
        let mut cursor = BitCursor::new();
        cursor.open(source, 64)?;
        assert_eq!(cursor.is_seekable(), seekable);
        cursor.read_unsigned_int(5)?;
        cursor.begin_chunk(n)?;
        cursor.end_chunk()?;
        assert_eq!(cursor.actual_position(), 5 + n);
        assert_eq!(
            cursor.read_unsigned_int(13)? as u64,
            bits_at(&data, 5 + n, 13)
        );
    }
    Ok(())
}

#[test]
fn test_file_round_trip() -> Result<()> {
    let data = random_data(10_000, 5);
    let path = std::env::temp_dir().join("bitcursor_test_file_round_trip");
    std::fs::write(&path, &data)?;

    let mut cursor = BitCursor::new();
    cursor.open(SeekAdapter::new(std::fs::File::open(&path)?), 256)?;
    assert_eq!(cursor.read_bytes(data.len())?, data);
    assert!(matches!(
        cursor.read_bit(),
        Err(CursorError::UnexpectedEnd { .. })
    ));
    let buffer = cursor.close()?;

    // again, with the same buffer and a skip over most of the file
    cursor.open_with_buffer(SeekAdapter::new(std::fs::File::open(&path)?), buffer)?;
    cursor.begin_chunk(8 * 9_000)?;
    assert_eq!(cursor.read_single_byte()?, data[0]);
    cursor.end_chunk()?;
    assert_eq!(cursor.read_bytes(1000)?, &data[9_000..]);
    cursor.close()?;

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_reopen_is_identical() -> Result<()> {
    let data = random_data(5_000, 6);
    let mut cursor = BitCursor::new();
    let mut runs = vec![];
    for _ in 0..3 {
        cursor.open_with_params(MemByteReader::new(&data), &CursorParams::new(48)?)?;
        let mut r = SmallRng::seed_from_u64(7);
        let mut values = vec![];
        for _ in 0..1000 {
            values.push(cursor.read_signed_int(r.gen_range(0..=32))?);
        }
        cursor.close()?;
        runs.push(values);
    }
    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[1], runs[2]);
    Ok(())
}
