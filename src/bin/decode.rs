use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use scope_waveform::{ByteOrder, ChannelId, Preamble, SampleWidth, Signedness};
use scope_waveform::{StoreConfiguration, WaveformStore};
use scope_waveform::{decode_samples, parse_block};

#[derive(Debug, Clone)]
struct ChannelInput {
    channel: ChannelId,
    preamble: PathBuf,
    data: PathBuf,
}

fn parse_channel_input(arg: &str) -> Result<ChannelInput, String> {
    let mut parts = arg.splitn(3, ':');
    let (Some(channel), Some(preamble), Some(data)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected ID:PREAMBLE:DATA, got {:?}", arg))
    };
    let channel = channel.parse::<ChannelId>()
        .map_err(|error| format!("invalid channel {:?}: {}", channel, error))?;
    Ok(ChannelInput { channel, preamble: preamble.into(), data: data.into() })
}

/// Decode saved `:WAVeform:PREamble?` and `:WAVeform:DATA?` replies into volts and seconds
#[derive(Parser, Debug)]
#[command(name = "scope-decode")]
#[command(version, about, long_about = None)]
struct Args {
    /// Channel capture as channel number, preamble reply file and data block file
    #[arg(short, long = "channel", value_name = "ID:PREAMBLE:DATA", required = true,
          value_parser = parse_channel_input)]
    channels: Vec<ChannelInput>,

    /// WORD samples are sent least significant byte first
    #[arg(long)]
    lsb_first: bool,

    /// Samples are two's complement (`:WAVeform:UNSigned OFF`)
    #[arg(long)]
    signed: bool,

    /// Converter resolution in bits used for per-division quantities
    #[arg(long, default_value = "16", value_parser = clap::value_parser!(u32).range(1..32))]
    resolution: u32,

    /// Write the JSON export here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn decode_channel(preamble: &str, reply: &[u8], order: ByteOrder, signedness: Signedness)
        -> scope_waveform::Result<(Preamble, Vec<i64>)> {
    let preamble: Preamble = preamble.parse()?;
    let width = SampleWidth::from_format_code(preamble.format)
        .ok_or_else(|| scope_waveform::Error::MalformedBlock(
            format!("format code {} is not a binary transfer format", preamble.format)))?;
    let raw = decode_samples(parse_block(reply)?, width, order, signedness)?;
    log::debug!("decoded {} {:?} {:?} samples", raw.len(), signedness, width);
    Ok((preamble, raw))
}

fn load_channel(store: &mut WaveformStore, input: &ChannelInput, order: ByteOrder,
        signedness: Signedness) -> scope_waveform::Result<()> {
    let (preamble, raw) = decode_channel(
        &fs::read_to_string(&input.preamble)?, &fs::read(&input.data)?, order, signedness)?;
    log::info!("channel {}: {} samples", input.channel, raw.len());
    store.insert(input.channel, preamble, raw);
    Ok(())
}

fn main() -> scope_waveform::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let order = if args.lsb_first { ByteOrder::LsbFirst } else { ByteOrder::MsbFirst };
    let signedness = if args.signed { Signedness::Signed } else { Signedness::Unsigned };
    let mut store = WaveformStore::with_configuration(
        StoreConfiguration::with_resolution(args.resolution));
    for input in args.channels.iter() {
        load_channel(&mut store, input, order, signedness)?;
    }

    for channel in store.channels() {
        eprintln!("CH{}: {:.6} V/div, offset {:+.6} V, {:.3e} s/div, delay {:+.3e} s",
            channel,
            store.volts_per_div(channel)?,
            store.offset(channel)?,
            store.sec_per_div(channel)?,
            store.delay(channel)?);
    }

    let mapping = store.to_mapping();
    let json = serde_json::to_vec_pretty(&mapping)
        .map_err(std::io::Error::from)?;
    match &args.output {
        Some(path) => fs::write(path, &json)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&json)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
