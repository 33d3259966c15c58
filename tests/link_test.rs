//! End-to-end link scenarios
//!
//! Pushes payloads through the full modulate/channel/demodulate/decode chain
//! with seeded random sources.

use bitvec::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustylink::channel::{AwgnChannel, ChannelKind};
use rustylink::metrics::bit_error_rate;
use rustylink::modulation::{demodulate_hard, modulate, Scheme};
use rustylink::util::bitvec_utils::random_bits;
use rustylink::{
    run_monte_carlo, run_snr_sweep, CodeConfig, DecodingMode, LinkConfig, LinkSimulator,
    SnrSetting,
};

#[test]
fn test_eight_bits_over_qpsk_at_20_db() {
    let original = bitvec![u8, Msb0; 1, 0, 1, 0, 1, 0, 1, 0];
    let mut rng = StdRng::seed_from_u64(20);

    let symbols = modulate(&original, Scheme::Qpsk);
    assert_eq!(symbols.len(), 4);
    let out = AwgnChannel::new(20.0).add_noise(&symbols, &mut rng);
    let recovered = demodulate_hard(&out.symbols, Scheme::Qpsk);

    assert_eq!(recovered, original);
    assert_eq!(bit_error_rate(&original, &recovered), Some(0.0));
}

#[test]
fn test_every_code_and_scheme_is_clean_at_high_snr() {
    let mut rng = StdRng::seed_from_u64(100);
    let codes = [
        CodeConfig::Ldpc { rate: 0.5, block_length: 648 },
        CodeConfig::Ldpc { rate: 0.75, block_length: 256 },
        CodeConfig::Polar { n: 256, k: 128 },
        CodeConfig::Uncoded,
    ];
    let schemes = [Scheme::Qpsk, Scheme::Qam16, Scheme::Qam64];

    for code in codes {
        for scheme in schemes {
            let sim = LinkSimulator::new(LinkConfig {
                code,
                scheme,
                snr: SnrSetting::SnrDb(35.0),
                decoding: DecodingMode::Iterative,
                ..LinkConfig::default()
            })
            .unwrap();
            let payload = random_bits(1000, &mut rng);
            let report = sim.run(&payload, &mut rng);
            assert_eq!(report.bit_errors, 0, "{:?} over {}", code, scheme);
            assert_eq!(report.decoded.len(), payload.len());
        }
    }
}

#[test]
fn test_belief_propagation_beats_hard_decision_in_link() {
    let hard = LinkConfig {
        snr: SnrSetting::EbN0Db(3.0),
        seed: 11,
        ..LinkConfig::default()
    };
    let iterative = LinkConfig {
        decoding: DecodingMode::Iterative,
        ..hard.clone()
    };
    let h = run_monte_carlo(&hard, 8, 3240).unwrap();
    let bp = run_monte_carlo(&iterative, 8, 3240).unwrap();

    assert!(h.mean_ber > 0.0);
    assert!(bp.mean_ber < h.mean_ber, "bp {} hard {}", bp.mean_ber, h.mean_ber);
    // Same seeds, same channel realizations
    assert_eq!(h.mean_channel_ber, bp.mean_channel_ber);
}

#[test]
fn test_uncoded_awgn_tracks_theory() {
    let config = LinkConfig {
        code: CodeConfig::Uncoded,
        snr: SnrSetting::EbN0Db(4.0),
        seed: 5,
        ..LinkConfig::default()
    };
    let point = run_monte_carlo(&config, 10, 20_000).unwrap();
    // QPSK at 4 dB: about 1.25e-2
    let ratio = point.mean_ber / point.theoretical_ber;
    assert!(ratio > 0.8 && ratio < 1.2, "measured {} theory {}", point.mean_ber, point.theoretical_ber);
}

#[test]
fn test_fading_is_worse_than_awgn() {
    let mut rng = StdRng::seed_from_u64(8);
    let payload = random_bits(4000, &mut rng);
    let awgn = LinkConfig {
        code: CodeConfig::Uncoded,
        snr: SnrSetting::SnrDb(10.0),
        seed: 9,
        ..LinkConfig::default()
    };
    let rayleigh = LinkConfig {
        channel: ChannelKind::Rayleigh,
        ..awgn.clone()
    };

    let a = run_snr_sweep(&awgn, &[10.0], &payload, 4).unwrap();
    let r = run_snr_sweep(&rayleigh, &[10.0], &payload, 4).unwrap();
    assert!(r[0].mean_ber > a[0].mean_ber, "rayleigh {} awgn {}", r[0].mean_ber, a[0].mean_ber);
}

#[test]
fn test_crc_aided_polar_under_noise_beats_hard_decision() {
    let mut rng = StdRng::seed_from_u64(64);
    let payload = random_bits(64 * 40, &mut rng);
    let hard = LinkConfig {
        code: CodeConfig::Polar { n: 128, k: 80 },
        crc_aided: true,
        snr: SnrSetting::EbN0Db(3.0),
        seed: 64,
        ..LinkConfig::default()
    };
    let list = LinkConfig {
        decoding: DecodingMode::Iterative,
        ..hard.clone()
    };

    let h = run_snr_sweep(&hard, &[3.0], &payload, 2).unwrap();
    let l = run_snr_sweep(&list, &[3.0], &payload, 2).unwrap();
    assert!(l[0].mean_ber < h[0].mean_ber, "list {} hard {}", l[0].mean_ber, h[0].mean_ber);
}

#[test]
fn test_sweeps_with_same_seed_match() {
    let mut rng = StdRng::seed_from_u64(1);
    let payload = random_bits(1296, &mut rng);
    let config = LinkConfig {
        snr: SnrSetting::EbN0Db(0.0),
        decoding: DecodingMode::Iterative,
        max_iterations: 10,
        seed: 77,
        ..LinkConfig::default()
    };
    let points = [0.0, 1.5, 3.0];
    let first = run_snr_sweep(&config, &points, &payload, 4).unwrap();
    let second = run_snr_sweep(&config, &points, &payload, 4).unwrap();
    assert_eq!(first, second);

    let reseeded = run_snr_sweep(&LinkConfig { seed: 78, ..config }, &points, &payload, 4).unwrap();
    assert_ne!(first[0].mean_ber, reseeded[0].mean_ber);
}
