//! Benchmark of encode/decode throughput and sweep parallelism
//!
//! Times each decoder on a fixed noisy payload, then a full SNR sweep on the
//! rayon pool.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rustylink::coding::{decode_blocks, encode_blocks, ChannelCode, Decoder};
use rustylink::modulation::{demodulate_soft, modulate, Scheme};
use rustylink::channel::AwgnChannel;
use rustylink::util::bitvec_utils::random_bits;
use rustylink::{
    run_snr_sweep, CodeConfig, DecodingMode, LdpcCoder, LinkConfig, PolarCoder, SnrSetting,
};
use std::time::Instant;

const PAYLOAD_BITS: usize = 32_400;
const EB_N0_DB: f64 = 2.0;

fn bench_decoder(name: &str, code: &dyn ChannelCode, decoder: &dyn Decoder, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = random_bits(PAYLOAD_BITS, &mut rng);

    let start = Instant::now();
    let coded = encode_blocks(code, &data);
    let encode_time = start.elapsed();

    let symbols = modulate(&coded, Scheme::Qpsk);
    let out = AwgnChannel::from_eb_n0(EB_N0_DB, 2, code.rate()).add_noise(&symbols, &mut rng);
    let llrs = demodulate_soft(&out.symbols, Scheme::Qpsk, out.noise_variance);

    let start = Instant::now();
    let decoded = decode_blocks(decoder, code.codeword_len(), &llrs);
    let decode_time = start.elapsed();

    let errors = data
        .iter()
        .by_vals()
        .zip(decoded.iter().by_vals())
        .filter(|(a, b)| a != b)
        .count();

    println!("Test: {}", name);
    println!("  Encoded {} bits in {:.2?}", data.len(), encode_time);
    println!(
        "  Decoded in {:.2?} ({:.1} kbit/s)",
        decode_time,
        data.len() as f64 / decode_time.as_secs_f64() / 1000.0
    );
    println!("  BER at Eb/N0 {} dB: {:.3e}", EB_N0_DB, errors as f64 / data.len() as f64);
    println!();
}

fn main() {
    println!("\n=== Coding Benchmark ===\n");

    let ldpc = match LdpcCoder::new(0.5, 648) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("LDPC construction failed: {}", e);
            return;
        }
    };
    bench_decoder("LDPC (648, 324) hard decision", &ldpc, &ldpc.hard_decoder(), 1);
    bench_decoder("LDPC (648, 324) sum-product, 50 iterations", &ldpc, &ldpc.sum_product_decoder(), 1);

    let polar = match PolarCoder::new(1024, 512) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Polar construction failed: {}", e);
            return;
        }
    };
    bench_decoder("Polar (1024, 512) hard decision", &polar, &polar.hard_decoder(), 2);
    bench_decoder("Polar (1024, 512) SC", &polar, &polar.sc_decoder(), 2);
    for list_size in [4, 8, 16] {
        bench_decoder(
            &format!("Polar (1024, 512) SCL-{}", list_size),
            &polar,
            &polar.scl_decoder(list_size),
            2,
        );
    }

    println!("=== Parallel SNR sweep ===\n");
    let config = LinkConfig {
        code: CodeConfig::Ldpc { rate: 0.5, block_length: 648 },
        snr: SnrSetting::EbN0Db(0.0),
        decoding: DecodingMode::Iterative,
        ..LinkConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(3);
    let data = random_bits(6480, &mut rng);
    let points = [0.0, 1.0, 2.0, 3.0, 4.0];

    let start = Instant::now();
    match run_snr_sweep(&config, &points, &data, 16) {
        Ok(results) => {
            let elapsed = start.elapsed();
            println!("  {} points x 16 trials in {:.2?}", points.len(), elapsed);
            for p in results {
                println!("  Eb/N0 {:>4.1} dB  BER {:.3e}  BLER {:.3e}", p.snr, p.mean_ber, p.mean_bler);
            }
        }
        Err(e) => eprintln!("Sweep failed: {}", e),
    }
    println!();

    println!("=== CPU Information ===");
    println!("Rayon thread pool size: {}", rayon::current_num_threads());
}
