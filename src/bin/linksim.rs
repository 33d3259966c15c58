//! Link Simulator - encode, modulate, corrupt, demodulate, decode, score
//!
//! Usage:
//!   cargo run --bin linksim -- [OPTIONS]
//!   linksim [OPTIONS]
//!
//! Options:
//!   -c, --code <name>         ldpc, polar or none (default: ldpc)
//!   -r, --rate <r>            LDPC code rate (default: 0.5)
//!   -l, --length <n>          Block length (default: 648 LDPC, 256 polar)
//!   -k, --info-bits <k>       Polar information bits (default: n/2)
//!   -m, --modulation <name>   qpsk, 16qam, 64qam, 256qam (default: qpsk)
//!   -s, --snr <dB>            Symbol SNR in dB (default: 10)
//!   -e, --ebn0 <dB>           Eb/N0 in dB, overrides --snr
//!       --channel <name>      awgn, rayleigh or rician (default: awgn)
//!       --k-factor <dB>       Rician K-factor (default: 10)
//!   -n, --bits <count>        Payload bits per trial (default: 6480)
//!   -t, --trials <count>      Trials per operating point (default: 1)
//!       --seed <u64>          Base random seed (default: 42)
//!   -i, --iterative           Belief propagation / list decoding
//!       --max-iter <count>    BP iteration cap (default: 50)
//!   -L, --list <size>         SCL list size (default: 8)
//!       --crc                 CRC-aided polar list decoding
//!       --sweep <a:b:step>    Sweep the SNR (or Eb/N0) from a to b
//!   -h, --help                Show this help message
//!
//! Examples:
//!   # Rate-1/2 LDPC over QPSK at Eb/N0 = 2 dB with belief propagation
//!   linksim -e 2 -i -t 20
//!
//!   # Polar (256, 128) with CRC-aided list decoding over Rayleigh fading
//!   linksim -c polar -l 256 -k 144 --crc -i --channel rayleigh -s 12
//!
//!   # BER curve for 16-QAM, 0 to 10 dB Eb/N0
//!   linksim -m 16qam -i -t 10 -e 0 --sweep 0:10:2

use rand::rngs::StdRng;
use rand::SeedableRng;
use rustylink::channel::{ChannelKind, DEFAULT_K_FACTOR_DB};
use rustylink::ldpc::DEFAULT_BLOCK_LENGTH;
use rustylink::tracing_init::init_tracing;
use rustylink::util::bitvec_utils::random_bits;
use rustylink::{
    run_snr_sweep, CodeConfig, DecodingMode, LinkConfig, LinkSimulator, Scheme, SnrSetting,
};

const DEFAULT_POLAR_LENGTH: usize = 256;

struct CliConfig {
    link: LinkConfig,
    bits: usize,
    trials: usize,
    sweep: Option<Vec<f64>>,
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", flag))
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, String> {
    value.parse().map_err(|_| format!("Invalid {} value: {}", what, value))
}

/// `a:b:step`, inclusive of `b` when it lands on the grid
fn parse_sweep(arg: &str) -> Result<Vec<f64>, String> {
    let parts: Vec<&str> = arg.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("Sweep must be start:stop:step, got {}", arg));
    }
    let start: f64 = parse_number(parts[0], "sweep start")?;
    let stop: f64 = parse_number(parts[1], "sweep stop")?;
    let step: f64 = parse_number(parts[2], "sweep step")?;
    if step <= 0.0 || stop < start {
        return Err(format!("Sweep needs step > 0 and stop >= start, got {}", arg));
    }

    let count = ((stop - start) / step + 1e-9).floor() as usize + 1;
    Ok((0..count).map(|i| start + i as f64 * step).collect())
}

impl CliConfig {
    fn parse_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();

        let mut code_name = "ldpc".to_string();
        let mut rate = 0.5;
        let mut length: Option<usize> = None;
        let mut info_bits: Option<usize> = None;
        let mut scheme = Scheme::Qpsk;
        let mut snr = SnrSetting::SnrDb(10.0);
        let mut ebn0: Option<f64> = None;
        let mut channel = ChannelKind::Awgn;
        let mut k_factor_db = DEFAULT_K_FACTOR_DB;
        let mut bits = 10 * DEFAULT_BLOCK_LENGTH;
        let mut trials = 1;
        let mut sweep = None;
        let mut link = LinkConfig::default();

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "-c" | "--code" => code_name = next_value(&args, &mut i, flag)?.to_ascii_lowercase(),
                "-r" | "--rate" => rate = parse_number(next_value(&args, &mut i, flag)?, "rate")?,
                "-l" | "--length" => {
                    length = Some(parse_number(next_value(&args, &mut i, flag)?, "length")?)
                }
                "-k" | "--info-bits" => {
                    info_bits = Some(parse_number(next_value(&args, &mut i, flag)?, "info bits")?)
                }
                "-m" | "--modulation" => {
                    let name = next_value(&args, &mut i, flag)?;
                    scheme = name.parse().map_err(|e| format!("{}", e))?;
                }
                "-s" | "--snr" => {
                    snr = SnrSetting::SnrDb(parse_number(next_value(&args, &mut i, flag)?, "SNR")?)
                }
                "-e" | "--ebn0" => ebn0 = Some(parse_number(next_value(&args, &mut i, flag)?, "Eb/N0")?),
                "--channel" => {
                    let name = next_value(&args, &mut i, flag)?;
                    channel = name.parse().map_err(|e| format!("{}", e))?;
                }
                "--k-factor" => {
                    k_factor_db = parse_number(next_value(&args, &mut i, flag)?, "K-factor")?
                }
                "-n" | "--bits" => bits = parse_number(next_value(&args, &mut i, flag)?, "bit count")?,
                "-t" | "--trials" => trials = parse_number(next_value(&args, &mut i, flag)?, "trial count")?,
                "--seed" => link.seed = parse_number(next_value(&args, &mut i, flag)?, "seed")?,
                "-i" | "--iterative" => link.decoding = DecodingMode::Iterative,
                "--max-iter" => {
                    link.max_iterations = parse_number(next_value(&args, &mut i, flag)?, "iteration cap")?
                }
                "-L" | "--list" => link.list_size = parse_number(next_value(&args, &mut i, flag)?, "list size")?,
                "--crc" => link.crc_aided = true,
                "--sweep" => sweep = Some(parse_sweep(next_value(&args, &mut i, flag)?)?),
                "-h" | "--help" => {
                    print_help(&args[0]);
                    std::process::exit(0);
                }
                arg => return Err(format!("Unknown option: {}", arg)),
            }
            i += 1;
        }

        link.code = match code_name.as_str() {
            "ldpc" => CodeConfig::Ldpc {
                rate,
                block_length: length.unwrap_or(DEFAULT_BLOCK_LENGTH),
            },
            "polar" => {
                let n = length.unwrap_or(DEFAULT_POLAR_LENGTH);
                CodeConfig::Polar {
                    n,
                    k: info_bits.unwrap_or(n / 2),
                }
            }
            "none" | "uncoded" => CodeConfig::Uncoded,
            other => return Err(format!("Unknown code: {}", other)),
        };
        if let ChannelKind::Rician { .. } = channel {
            channel = ChannelKind::Rician { k_factor_db };
        }
        if let Some(e) = ebn0 {
            snr = SnrSetting::EbN0Db(e);
        }
        link.scheme = scheme;
        link.channel = channel;
        link.snr = snr;

        if trials == 0 {
            return Err("Trial count must be at least 1".to_string());
        }

        Ok(CliConfig {
            link,
            bits,
            trials,
            sweep,
        })
    }
}

fn print_help(program: &str) {
    eprintln!("Link Simulator");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --code <name>         ldpc, polar or none (default: ldpc)");
    eprintln!("  -r, --rate <r>            LDPC code rate (default: 0.5)");
    eprintln!("  -l, --length <n>          Block length (default: 648 LDPC, 256 polar)");
    eprintln!("  -k, --info-bits <k>       Polar information bits (default: n/2)");
    eprintln!("  -m, --modulation <name>   qpsk, 16qam, 64qam, 256qam (default: qpsk)");
    eprintln!("  -s, --snr <dB>            Symbol SNR in dB (default: 10)");
    eprintln!("  -e, --ebn0 <dB>           Eb/N0 in dB, overrides --snr");
    eprintln!("      --channel <name>      awgn, rayleigh or rician (default: awgn)");
    eprintln!("      --k-factor <dB>       Rician K-factor (default: 10)");
    eprintln!("  -n, --bits <count>        Payload bits per trial (default: 6480)");
    eprintln!("  -t, --trials <count>      Trials per operating point (default: 1)");
    eprintln!("      --seed <u64>          Base random seed (default: 42)");
    eprintln!("  -i, --iterative           Belief propagation / list decoding");
    eprintln!("      --max-iter <count>    BP iteration cap (default: 50)");
    eprintln!("  -L, --list <size>         SCL list size (default: 8)");
    eprintln!("      --crc                 CRC-aided polar list decoding");
    eprintln!("      --sweep <a:b:step>    Sweep the SNR (or Eb/N0) from a to b");
    eprintln!("  -h, --help                Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} -e 2 -i -t 20", program);
    eprintln!("  {} -c polar -l 256 -k 144 --crc -i --channel rayleigh -s 12", program);
    eprintln!("  {} -m 16qam -i -t 10 -e 0 --sweep 0:10:2", program);
}

fn unit(snr: &SnrSetting) -> &'static str {
    match snr {
        SnrSetting::SnrDb(_) => "SNR",
        SnrSetting::EbN0Db(_) => "Eb/N0",
    }
}

fn run_single(config: &CliConfig) -> Result<(), String> {
    let sim = LinkSimulator::new(config.link.clone()).map_err(|e| format!("{}", e))?;
    let mut rng = StdRng::seed_from_u64(config.link.seed);

    let mut errors = 0;
    let mut total = 0;
    let mut bler_sum = 0.0;
    for trial in 0..config.trials {
        let payload = random_bits(config.bits, &mut rng);
        let report = sim.run(&payload, &mut rng);
        errors += report.bit_errors;
        total += report.payload_bits;
        bler_sum += report.bler;

        if config.trials == 1 || trial == 0 {
            println!("Trial {}:", trial);
            println!("  Coded bits:      {}", report.coded_bits);
            println!("  Symbols:         {}", report.symbols);
            if let Some(measured) = report.measured_snr_db {
                println!("  Measured SNR:    {:.2} dB", measured);
            }
            if let Some(evm) = report.evm_percent {
                println!("  EVM:             {:.2} %", evm);
            }
            println!("  Channel BER:     {:.3e}", report.channel_ber);
            println!("  Channel SER:     {:.3e}", report.channel_ser);
            println!("  Decoded BER:     {:.3e}", report.ber);
            println!("  BLER:            {:.3e}", report.bler);
            println!("  Theoretical BER: {:.3e} (uncoded)", report.theoretical_ber);
            println!("  I(X;X^):         {:.4} bits", report.mutual_information);
            println!("  Capacity:        {:.3} bits/symbol", report.capacity);
            println!();
        }
    }

    let ber = if total > 0 { errors as f64 / total as f64 } else { 0.0 };
    println!("Summary over {} trial(s):", config.trials);
    println!("  Bit errors: {} / {}", errors, total);
    println!("  BER:        {:.3e}", ber);
    println!("  Mean BLER:  {:.3e}", bler_sum / config.trials as f64);
    Ok(())
}

fn run_sweep(config: &CliConfig, points: &[f64]) -> Result<(), String> {
    let mut rng = StdRng::seed_from_u64(config.link.seed);
    let payload = random_bits(config.bits, &mut rng);
    let results =
        run_snr_sweep(&config.link, points, &payload, config.trials).map_err(|e| format!("{}", e))?;

    println!(
        "{:>8}  {:>8}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}",
        unit(&config.link.snr),
        "SNR",
        "BER",
        "std",
        "BLER",
        "raw BER",
        "theory"
    );
    for p in &results {
        println!(
            "{:>8.2}  {:>8.2}  {:>10.3e}  {:>10.3e}  {:>10.3e}  {:>10.3e}  {:>10.3e}",
            p.snr, p.snr_db, p.mean_ber, p.std_ber, p.mean_bler, p.mean_channel_ber, p.theoretical_ber
        );
    }
    Ok(())
}

fn main() -> Result<(), String> {
    init_tracing();
    let config = CliConfig::parse_args()?;

    println!("Link Simulator");
    println!("==============");
    println!("Code:       {:?}", config.link.code);
    println!("Modulation: {}", config.link.scheme);
    println!("Channel:    {}", config.link.channel.name());
    println!("{:<11} {:.2} dB", format!("{}:", unit(&config.link.snr)), config.link.snr.value());
    println!("Decoding:   {:?}", config.link.decoding);
    println!("Payload:    {} bits x {} trial(s)", config.bits, config.trials);
    println!("Seed:       {}", config.link.seed);
    println!();

    match &config.sweep {
        Some(points) => run_sweep(&config, points),
        None => run_single(&config),
    }
}
