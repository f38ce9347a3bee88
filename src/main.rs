use std::fs::File;
use std::io::{BufReader, Read};

use clap::{Parser, ValueEnum};
use snafu::{prelude::*, Whatever};

use rustydarc::l2::{BlockDecoder, FrameDecoder};
use rustydarc::l3::DataPacketDecoder;
use rustydarc::l4::DataGroupDecoder;
use rustydarc::tracing_init::init_tracing;

/// DARC bitstream decoder
#[derive(Debug, Parser)]
#[command(name = "rustydarc")]
struct Args {
    /// Input DARC bitstream path, one byte per bit (- for stdin)
    input_path: String,

    /// Logging level
    #[arg(short = 'l', long = "loglevel", value_enum, default_value = "WARNING")]
    loglevel: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    #[value(name = "NOTSET")]
    Notset,
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARNING")]
    Warning,
    #[value(name = "ERROR")]
    Error,
    #[value(name = "CRITICAL")]
    Critical,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Notset => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

#[snafu::report]
fn main() -> Result<(), Whatever> {
    let args = Args::parse();
    init_tracing(args.loglevel.directive());

    let reader: Box<dyn Read> = if args.input_path == "-" {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(
            File::open(&args.input_path)
                .with_whatever_context(|_| format!("failed to open {}", args.input_path))?,
        )
    };

    let mut block_decoder = BlockDecoder::new();
    let mut frame_decoder = FrameDecoder::new();
    let packet_decoder = DataPacketDecoder::new();
    let mut group_decoder = DataGroupDecoder::new();

    for byte in BufReader::new(reader).bytes() {
        let byte = byte.whatever_context("failed to read input")?;
        let Some(block) = block_decoder.push_bit(byte != 0) else {
            continue;
        };
        let Some(frame) = frame_decoder.push_block(block) else {
            continue;
        };
        let data_packets = packet_decoder.push_frame(&frame);
        for data_group in group_decoder.push_data_packets(data_packets) {
            println!("{data_group}");
        }
    }

    Ok(())
}
