//! # gbprinter CLI
//!
//! Command-line interface for decoding Game Boy Printer captures.
//!
//! ## Usage
//!
//! ```bash
//! # Decode a hex dump capture to PNG
//! gbprinter decode -i capture.txt -o capture.png
//!
//! # Read from stdin, one PNG per printed page, 2x upscale
//! cat capture.txt | gbprinter decode --split --scale 2 -o page.png
//!
//! # List the packets in a capture
//! gbprinter packets -i capture.txt
//!
//! # Capture from a serial emulator; a print ends after 2 quiet seconds
//! gbprinter listen --device /dev/ttyUSB0 --idle-ms 2000 --dest prints/
//! ```

use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use gbprinter::{
    Decoder, FrameParser, GbpError, Packet, PrinterConfig,
    decoder::{Decoded, DecodeSummary},
    hexdump,
    protocol::parser,
    render::IntensityPalette,
    transport::SerialSource,
};

/// gbprinter - Game Boy Printer capture decoder
#[derive(Parser, Debug)]
#[command(name = "gbprinter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a hex dump capture into PNG images
    Decode {
        /// Input hex dump (reads stdin when omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output PNG (defaults to the input name with .png)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Tiles per image row
        #[arg(long, default_value_t = PrinterConfig::GAMEBOY_PRINTER.tiles_per_line as usize)]
        tiles_per_line: usize,

        /// Gray levels for pixel indices 0-3, e.g. "255,85,170,0"
        #[arg(long)]
        palette: Option<IntensityPalette>,

        /// Integer upscale factor
        #[arg(long, default_value_t = 1)]
        scale: u32,

        /// Write one image per printed page
        #[arg(long)]
        split: bool,
    },

    /// List the packets framed from a capture
    Packets {
        /// Input hex dump (reads stdin when omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Print packets as JSON
        #[arg(long)]
        json: bool,
    },

    /// Capture prints from a serial printer emulator
    Listen {
        /// Serial device path
        #[arg(long)]
        device: PathBuf,

        /// Quiet time that ends a print, in milliseconds
        #[arg(long, value_name = "MS")]
        idle_ms: u64,

        /// Output directory
        #[arg(long, default_value = "output")]
        dest: PathBuf,

        /// Save the received text next to each image
        #[arg(long)]
        log: bool,

        /// Integer upscale factor
        #[arg(long, default_value_t = 1)]
        scale: u32,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("gbprinter={}", level).into()),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), GbpError> {
    match command {
        Commands::Decode {
            input,
            output,
            tiles_per_line,
            palette,
            scale,
            split,
        } => {
            let bytes = read_capture(input.as_deref())?;
            let decoder = Decoder::default()
                .with_tiles_per_line(tiles_per_line)
                .with_palette(palette.unwrap_or_default())
                .split_pages(split);
            let decoded = decoder.decode_bytes(&bytes)?;
            report(&decoded.summary);

            let output = output.unwrap_or_else(|| match &input {
                Some(path) => path.with_extension("png"),
                None => PathBuf::from("out.png"),
            });
            save_images(&decoded, &output, scale)?;
        }

        Commands::Packets { input, json } => {
            let bytes = read_capture(input.as_deref())?;
            let packets = parser::parse_all(&bytes);

            if json {
                let text = serde_json::to_string_pretty(&packets)
                    .map_err(|e| GbpError::Io(io::Error::other(e)))?;
                println!("{}", text);
            } else {
                for (i, packet) in packets.iter().enumerate() {
                    println!("{}", describe(i + 1, packet));
                }
                report(&DecodeSummary::from_packets(&packets));
            }
        }

        Commands::Listen {
            device,
            idle_ms,
            dest,
            log,
            scale,
        } => {
            if !dest.is_dir() {
                return Err(GbpError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("output directory {} not found", dest.display()),
                )));
            }
            let config = PrinterConfig::GAMEBOY_PRINTER;
            let mut source = SerialSource::open(&device, Duration::from_millis(idle_ms))?;
            info!(printer = config.name, width = config.width_px(), "emulating");
            println!("Waiting for data on {}...", device.display());

            let mut parser = FrameParser::new();
            loop {
                listen_session(&mut source, &mut parser, &dest, log, scale)?;
            }
        }
    }

    Ok(())
}

/// Collect one print from the serial link and save it.
///
/// A session ends at the first quiet period after at least one packet.
/// A frame still open at that point is dropped.
fn listen_session(
    source: &mut SerialSource,
    parser: &mut FrameParser,
    dest: &Path,
    log: bool,
    scale: u32,
) -> Result<(), GbpError> {
    let base = dest.join(format!(
        "GBP_{}",
        chrono::Local::now().format("%Y-%m-%d_%H%M%S")
    ));
    if log {
        source.set_log(Some(File::create(base.with_extension("txt"))?));
    }

    let mut packets: Vec<Packet> = Vec::new();
    let mut line_no = 0;

    loop {
        match source.read_line()? {
            Some(line) => {
                line_no += 1;
                let mut bytes = Vec::new();
                if let Err(e) = hexdump::parse_line(&line, line_no, &mut bytes) {
                    debug!("skipping line: {}", e);
                    continue;
                }
                for packet in parser.feed_all(&bytes) {
                    debug!(command = %packet.command, length = packet.data_length, "packet");
                    packets.push(packet);
                }
            }
            None if packets.is_empty() => continue,
            None => break,
        }
    }

    source.set_log(None);
    if !parser.is_idle() {
        warn!("link went quiet mid-frame, dropping partial frame");
        parser.reset();
    }
    info!(packets = packets.len(), "link idle, decoding");

    let decoded = Decoder::default().decode(packets)?;
    report(&decoded.summary);
    save_images(&decoded, &base.with_extension("png"), scale)
}

fn read_capture(input: Option<&Path>) -> Result<Vec<u8>, GbpError> {
    let text = match input {
        Some(path) => {
            debug!(path = %path.display(), "reading capture");
            fs::read_to_string(path)?
        }
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    hexdump::parse(&text)
}

fn save_images(decoded: &Decoded, output: &Path, scale: u32) -> Result<(), GbpError> {
    if decoded.images.is_empty() {
        warn!("no image data");
        return Ok(());
    }

    let numbered = decoded.images.len() > 1;
    for (i, image) in decoded.images.iter().enumerate() {
        let path = if numbered {
            numbered_path(output, i + 1)
        } else {
            output.to_path_buf()
        };
        image.save_png(&path, scale)?;
        println!("Wrote {} ({}x{})", path.display(), image.width, image.height);
    }
    Ok(())
}

/// `page.png` → `page-2.png`
fn numbered_path(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    path.with_file_name(format!("{}-{}.{}", stem, n, ext))
}

fn describe(index: usize, packet: &Packet) -> String {
    format!(
        "{:4} {} | compression: {}, length: {:3}, checksum: 0x{:04X} {}",
        index,
        packet.command.mnemonic(),
        packet.has_compression as u8,
        packet.data_length,
        packet.checksum,
        if packet.checksum_ok { "ok" } else { "MISMATCH" }
    )
}

fn report(summary: &DecodeSummary) {
    info!(
        packets = summary.packets,
        data = summary.data,
        print = summary.print,
        tiles = summary.tiles,
        "capture decoded"
    );
    if summary.checksum_failures > 0 {
        warn!(
            failures = summary.checksum_failures,
            "packets with checksum mismatch"
        );
    }
}
