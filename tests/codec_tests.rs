use image::RgbImage;
use rand::{Rng, RngCore};
use red_lsb::{
    bits::{append_terminator, find_terminator, to_bits},
    capacity::can_embed,
    error::StegoError,
    pipeline::{PipelineOptions, decode, encode},
    steganography::{embed, extract},
};

/// 一个辅助函数，用于创建随机像素的载体
fn random_carrier(width: u32, height: u32) -> RgbImage {
    let mut raw = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut raw);
    RgbImage::from_raw(width, height, raw).expect("buffer size matches dimensions")
}

/// 生成不含终止符位模式的随机载荷
fn random_payload(len: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    loop {
        let payload: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        if find_terminator(&to_bits(&payload)).is_none() {
            return payload;
        }
    }
}

#[test]
fn test_roundtrip_random_payloads() -> anyhow::Result<()> {
    let mut rng = rand::rng();
    for _ in 0..20 {
        let width = rng.random_range(20..80);
        let height = rng.random_range(20..80);
        let carrier = random_carrier(width, height);
        let max_len = ((width * height) as usize - 16) / 8;
        let payload = random_payload(rng.random_range(0..=max_len));
        assert!(can_embed(width, height, payload.len()));

        let output = embed(&carrier, &append_terminator(to_bits(&payload)))?;
        assert_eq!(extract(&output)?, payload);
    }
    Ok(())
}

#[test]
fn test_capacity_boundary() {
    // 64 像素：6 字节 (48 位) + 16 位终止符恰好放满
    let carrier = random_carrier(8, 8);
    let payload = random_payload(6);
    let (output, report) = encode(&carrier, &payload, &PipelineOptions::default())
        .expect("exactly N - 16 bits must fit");
    assert_eq!(report.used_bits, 64);
    assert_eq!(decode(&output, &PipelineOptions::default()).unwrap(), payload);

    // 65 像素放不下 7 字节 (56 + 16 = 72 位)，必须被拒绝
    let carrier = random_carrier(13, 5);
    assert!(matches!(
        encode(&carrier, &random_payload(7), &PipelineOptions::default()),
        Err(StegoError::InsufficientCapacity {
            required: 72,
            available: 65
        })
    ));
}

#[test]
fn test_one_bit_over_capacity_is_rejected() {
    // N - 15 位：载荷加终止符比像素数多一位
    let carrier = random_carrier(57, 1);
    let bits = append_terminator(to_bits(&random_payload(5)));
    assert_eq!(bits.len(), 56);
    assert!(embed(&carrier, &bits).is_ok());

    let carrier = random_carrier(55, 1);
    assert!(matches!(
        embed(&carrier, &bits),
        Err(StegoError::InsufficientCapacity {
            required: 56,
            available: 55
        })
    ));
}

#[test]
fn test_non_destructive_channels() -> anyhow::Result<()> {
    let carrier = random_carrier(40, 30);
    let payload = random_payload(100);
    let output = embed(&carrier, &append_terminator(to_bits(&payload)))?;

    assert_eq!(carrier.dimensions(), output.dimensions());
    for (before, after) in carrier.pixels().zip(output.pixels()) {
        assert_eq!(before[1], after[1]);
        assert_eq!(before[2], after[2]);
        assert_eq!(before[0] >> 1, after[0] >> 1);
    }
    Ok(())
}

#[test]
fn test_idempotent_extraction() -> anyhow::Result<()> {
    let carrier = random_carrier(32, 32);
    let output = embed(&carrier, &append_terminator(to_bits(b"repeatable")))?;
    let first = extract(&output)?;
    let second = extract(&output)?;
    assert_eq!(first, second);
    assert_eq!(first, b"repeatable");
    Ok(())
}

#[test]
fn test_empty_payload_writes_only_terminator() -> anyhow::Result<()> {
    let carrier = random_carrier(10, 10);
    let (output, report) = encode(&carrier, b"", &PipelineOptions::default())?;
    assert_eq!(report.used_bits, 16);

    for (index, (before, after)) in carrier.pixels().zip(output.pixels()).enumerate() {
        if index < 15 {
            assert_eq!(after[0] & 1, 1);
        } else if index == 15 {
            assert_eq!(after[0] & 1, 0);
        } else {
            assert_eq!(before, after);
        }
    }

    assert!(decode(&output, &PipelineOptions::default())?.is_empty());
    Ok(())
}

#[test]
fn test_hi_scenario() -> anyhow::Result<()> {
    let carrier = random_carrier(100, 100);
    let (output, report) = encode(&carrier, b"HI", &PipelineOptions::default())?;
    assert_eq!(report.capacity_bits, 10_000);
    assert_eq!(report.used_bits, 32);
    assert_eq!(decode(&output, &PipelineOptions::default())?, b"HI");
    Ok(())
}

#[test]
fn test_oversized_payload_leaves_carrier_untouched() {
    let carrier = random_carrier(100, 100);
    // 1249 字节 = 9992 位 + 16 位终止符 = 10008 位 > 10000
    let payload = vec![b'z'; 1249];
    assert!(!can_embed(100, 100, payload.len()));
    assert!(matches!(
        encode(&carrier, &payload, &PipelineOptions::default()),
        Err(StegoError::InsufficientCapacity {
            required: 10_008,
            available: 10_000
        })
    ));
}

#[test]
fn test_false_terminator_truncates_payload() -> anyhow::Result<()> {
    // 载荷中间的 0xFF 0xFE 会被当作终止符
    let carrier = random_carrier(20, 20);
    let payload = [b'A', 0xFF, 0xFE, b'B', b'C'];
    let output = embed(&carrier, &append_terminator(to_bits(&payload)))?;
    assert_eq!(extract(&output)?, b"A");
    Ok(())
}

#[test]
fn test_skipping_decryption_returns_ciphertext() -> anyhow::Result<()> {
    let carrier = random_carrier(64, 64);
    let options = PipelineOptions {
        compress: false,
        key: Some("k".to_string()),
    };
    let (output, _) = encode(&carrier, b"hidden words", &options)?;

    let raw = decode(&output, &PipelineOptions::default())?;
    assert_ne!(raw, b"hidden words");
    // salt + nonce + 明文 + tag
    assert_eq!(raw.len(), 16 + 12 + 12 + 16);
    assert_eq!(decode(&output, &options)?, b"hidden words");
    Ok(())
}
