//! SM2 encryption benchmarks

use core::hint::black_box;
use criterion::{
    criterion_group, criterion_main, measurement::Measurement, BenchmarkGroup, Criterion,
};
use hex_literal::hex;
use rand_core::OsRng;
use sm2_pke::{DecryptingKey, Mode};

const DECRYPTING_KEY_BYTES: [u8; 32] =
    hex!("1cf6bc6c7f642a84994119e206c9f0753ff100709f4fd12f2338c1be60bf4175");

const MESSAGE_LENGTHS: [usize; 3] = [32, 256, 4096];

fn decrypting_key() -> DecryptingKey {
    DecryptingKey::from_slice(&DECRYPTING_KEY_BYTES).unwrap()
}

fn bench_encrypt<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    let dk = decrypting_key();
    let ek = black_box(*dk.encrypting_key());

    for len in MESSAGE_LENGTHS {
        let msg = black_box(vec![0x5a; len]);
        group.bench_function(format!("encrypt/{len}"), |b| {
            b.iter(|| ek.encrypt(&mut OsRng, &msg).unwrap())
        });
    }
}

fn bench_decrypt<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    let dk = black_box(decrypting_key());

    for len in MESSAGE_LENGTHS {
        let msg = vec![0x5a; len];
        let ct = black_box(dk.encrypting_key().encrypt(&mut OsRng, &msg).unwrap());
        group.bench_function(format!("decrypt/{len}"), |b| {
            b.iter(|| dk.decrypt(&ct).unwrap())
        });
    }
}

fn bench_decrypt_bytes<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    let dk = black_box(decrypting_key());
    let ct = dk
        .encrypting_key()
        .encrypt(&mut OsRng, b"example message")
        .unwrap();
    let bytes = black_box(ct.to_vec(Mode::C1C3C2));
    group.bench_function("decrypt_bytes", |b| {
        b.iter(|| dk.decrypt_bytes(&bytes, Mode::C1C3C2).unwrap())
    });
}

fn bench_pke(c: &mut Criterion) {
    let mut group = c.benchmark_group("SM2PKE");
    bench_encrypt(&mut group);
    bench_decrypt(&mut group);
    bench_decrypt_bytes(&mut group);
    group.finish();
}

criterion_group!(benches, bench_pke);
criterion_main!(benches);
