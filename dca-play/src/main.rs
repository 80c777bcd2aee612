// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! A minimal demo CLI exercising the public `dca` API: reads a raw DCA elementary stream (one or
//! more back-to-back access units, no container), feeds each one through [`dca::DcaDecoder`], and
//! writes the decoded PCM as a WAV file (or to stdout).
//!
//! Container demuxing, option parsing beyond what's here, and audio output devices are explicitly
//! out of scope for the decoder itself; this binary exists only so the crate can be exercised
//! end-to-end from the command line.

mod scan;
mod wav;

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use clap::{App, Arg};
use log::{error, info, warn};

use dca::{DecoderOptions, ErrRecognition, PlanarAudioBuffer, RequestChannelLayout};

fn main() {
    pretty_env_logger::init();

    let matches = App::new("dca-play")
        .version("0.1.0")
        .about("Decode a raw DCA (DTS Coherent Acoustics) access-unit stream to WAV")
        .arg(
            Arg::with_name("INPUT")
                .help("The input file path, or - to read from standard input")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .value_name("PATH")
                .help("Output WAV file path (defaults to standard output)"),
        )
        .arg(Arg::with_name("stereo").long("stereo").help("Downmix the output to stereo"))
        .arg(Arg::with_name("core-only").long("core-only").help("Ignore every extension substream"))
        .arg(Arg::with_name("disable-xch").long("disable-xch").help("Ignore the XCH extension"))
        .arg(Arg::with_name("disable-xxch").long("disable-xxch").help("Ignore the XXCH extension"))
        .arg(Arg::with_name("disable-x96").long("disable-x96").help("Ignore the X96 extension"))
        .arg(Arg::with_name("disable-xbr").long("disable-xbr").help("Ignore the XBR extension"))
        .arg(Arg::with_name("enable-xll").long("enable-xll").help("Decode the XLL lossless extension when present"))
        .arg(Arg::with_name("bit-exact").long("bit-exact").help("Force the fixed-point decode path"))
        .arg(Arg::with_name("crc-check").long("crc-check").help("Validate CRC-protected regions"))
        .arg(Arg::with_name("explode").long("explode").help("Treat every recoverable error as fatal"))
        .get_matches();

    let mut err_recognition = ErrRecognition::empty();
    if matches.is_present("crc-check") {
        err_recognition |= ErrRecognition::CRC_CHECK;
    }
    if matches.is_present("explode") {
        err_recognition |= ErrRecognition::EXPLODE;
    }

    let options = DecoderOptions {
        disable_xll: !matches.is_present("enable-xll"),
        disable_xch: matches.is_present("disable-xch"),
        disable_xxch: matches.is_present("disable-xxch"),
        disable_x96: matches.is_present("disable-x96"),
        disable_xbr: matches.is_present("disable-xbr"),
        core_only: matches.is_present("core-only"),
        request_channel_layout: if matches.is_present("stereo") {
            RequestChannelLayout::Stereo
        }
        else {
            RequestChannelLayout::Keep
        },
        err_recognition,
        bit_exact: matches.is_present("bit-exact"),
    };

    let input_path = matches.value_of("INPUT").unwrap();
    let input = match read_input(input_path) {
        Ok(buf) => buf,
        Err(err) => {
            error!("failed to read input: {}", err);
            std::process::exit(1);
        }
    };

    match decode_stream(&input, options) {
        Ok((n_channels, sample_rate, samples)) => {
            if let Err(err) = write_output(matches.value_of("output"), n_channels, sample_rate, &samples) {
                error!("failed to write output: {}", err);
                std::process::exit(1);
            }
        }
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    }
}

fn read_input(path_str: &str) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if path_str == "-" {
        io::stdin().read_to_end(&mut buf)?;
    }
    else {
        File::open(Path::new(path_str))?.read_to_end(&mut buf)?;
    }
    Ok(buf)
}

/// Decodes every access unit found in `input`, returning the channel count, sample rate, and
/// interleaved `f32` PCM of the whole stream. A change in channel count or sample rate partway
/// through the stream is treated as the end of decodable audio, matching how a demo tool (as
/// opposed to a real player) should behave when the layout it already committed to no longer
/// applies.
fn decode_stream(input: &[u8], options: DecoderOptions) -> Result<(u16, u32, Vec<f32>), String> {
    let units = scan::find_access_units(input);
    if units.is_empty() {
        return Err("no recognized access units in input".to_string());
    }
    info!("found {} access unit(s)", units.len());

    let mut decoder = dca::DcaDecoder::new(options);
    let mut planar = PlanarAudioBuffer::default();
    let mut interleaved = Vec::new();
    let mut committed: Option<(u16, u32)> = None;
    let mut n_decoded = 0usize;

    for range in units {
        match decoder.decode(&input[range.clone()], &mut planar) {
            Ok(decoded) => {
                let n_channels = planar.n_channels() as u16;
                match committed {
                    None => committed = Some((n_channels, decoded.sample_rate)),
                    Some((ch, rate)) if ch != n_channels || rate != decoded.sample_rate => {
                        warn!(
                            "access unit at offset {} changed layout ({} ch / {} Hz -> {} ch / {} Hz), stopping",
                            range.start, ch, rate, n_channels, decoded.sample_rate
                        );
                        break;
                    }
                    _ => {}
                }

                let n_frames = planar.n_frames();
                interleaved.reserve(n_frames * n_channels as usize);
                for frame in 0..n_frames {
                    for ch in 0..n_channels as usize {
                        interleaved.push(planar.plane(ch)[frame]);
                    }
                }
                n_decoded += 1;
            }
            Err(err) => warn!("access unit at offset {} failed to decode: {}", range.start, err),
        }
    }

    match committed {
        Some((n_channels, sample_rate)) => {
            info!("decoded {} access unit(s) at {} ch / {} Hz", n_decoded, n_channels, sample_rate);
            Ok((n_channels, sample_rate, interleaved))
        }
        None => Err("every access unit failed to decode".to_string()),
    }
}

fn write_output(output: Option<&str>, n_channels: u16, sample_rate: u32, samples: &[f32]) -> io::Result<()> {
    match output {
        Some(path) if path != "-" => {
            let file = File::create(path)?;
            wav::write_wav(file, n_channels, sample_rate, samples)
        }
        _ => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            wav::write_wav(&mut lock, n_channels, sample_rate, samples)?;
            lock.flush()
        }
    }
}
