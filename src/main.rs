// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A headless host for the kernels: drive one of them from the
//! command line and write the frame it produces to a PNG.

extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate failure;
extern crate framekernels;
extern crate image;
#[macro_use]
extern crate log;
extern crate num_cpus;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use failure::Error;
use image::png::PNGEncoder;
use image::ColorType;
use std::fs::File;
use std::str::FromStr;

use framekernels::bodies::unpack_color;
use framekernels::{FractalEngine, NBodyEngine, SnapshotEntry};

/// Given a string and a separator, returns the two values
/// separated by the separator.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    matches
        .value_of(name)
        .and_then(|s| T::from_str(s).ok())
        .ok_or_else(|| format_err!("could not parse --{}", name))
}

fn pair<T: FromStr>(matches: &ArgMatches, name: &str, separator: char) -> Result<(T, T), Error> {
    matches
        .value_of(name)
        .and_then(|s| parse_pair(s, separator))
        .ok_or_else(|| format_err!("could not parse --{}", name))
}

const FRACTAL: &str = "fractal";
const NBODY: &str = "nbody";

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CENTER: &str = "center";
const ZOOM: &str = "zoom";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const BODIES: &str = "bodies";
const STEPS: &str = "steps";
const SEED: &str = "seed";
const TIMESTEP: &str = "timestep";

fn output_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(OUTPUT)
        .required(true)
        .long(OUTPUT)
        .short("o")
        .takes_value(true)
        .help("Output PNG file")
}

fn size_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(SIZE)
        .required(false)
        .long(SIZE)
        .short("s")
        .takes_value(true)
        .default_value("800x600")
        .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse canvas size"))
        .help("Size of the canvas")
}

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("framekernels")
        .version("0.1.0")
        .about("Headless host for the Mandelbrot and n-body kernels")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name(FRACTAL)
                .about("Render one Mandelbrot frame")
                .arg(output_arg())
                .arg(size_arg())
                .arg(
                    Arg::with_name(CENTER)
                        .long(CENTER)
                        .short("c")
                        .takes_value(true)
                        .allow_hyphen_values(true)
                        .default_value("-0.7,0.0")
                        .validator(|s| {
                            validate_pair::<f64>(&s, ',', "Could not parse view center")
                        })
                        .help("Point of the complex plane at the middle of the frame"),
                )
                .arg(
                    Arg::with_name(ZOOM)
                        .long(ZOOM)
                        .short("z")
                        .takes_value(true)
                        .default_value("1.0")
                        .validator(|s| {
                            validate_range(
                                &s,
                                ::std::f64::MIN_POSITIVE,
                                ::std::f64::MAX,
                                "Could not parse zoom",
                                "Zoom must be positive",
                            )
                        })
                        .help("Magnification; 1.0 shows 3 units of the imaginary axis"),
                )
                .arg(
                    Arg::with_name(THREADS)
                        .long(THREADS)
                        .short("t")
                        .takes_value(true)
                        .default_value("1")
                        .validator(move |s| {
                            validate_range(
                                &s,
                                1,
                                max_threads,
                                "Could not parse thread count",
                                &format!("Thread count must be between 1 and {}", max_threads),
                            )
                        })
                        .help("Number of threads to render with"),
                )
                .arg(
                    Arg::with_name(ITERATIONS)
                        .long(ITERATIONS)
                        .short("i")
                        .takes_value(true)
                        .default_value("1000")
                        .validator(|s| {
                            validate_range(
                                &s,
                                1,
                                200_000,
                                "Could not parse iteration count",
                                "Iteration count must be between 1 and 200000",
                            )
                        })
                        .help("Iterations before a point counts as inside the set"),
                ),
        )
        .subcommand(
            SubCommand::with_name(NBODY)
                .about("Run the n-body simulation and draw the final frame")
                .arg(output_arg())
                .arg(size_arg())
                .arg(
                    Arg::with_name(BODIES)
                        .long(BODIES)
                        .short("n")
                        .takes_value(true)
                        .default_value("200")
                        .validator(|s| {
                            validate_range(
                                &s,
                                0,
                                ::std::usize::MAX,
                                "Could not parse body count",
                                "Body count is out of range",
                            )
                        })
                        .help("Number of bodies; more than 10000 are clamped"),
                )
                .arg(
                    Arg::with_name(STEPS)
                        .long(STEPS)
                        .takes_value(true)
                        .default_value("100")
                        .validator(|s| {
                            validate_range(
                                &s,
                                0,
                                ::std::usize::MAX,
                                "Could not parse step count",
                                "Step count is out of range",
                            )
                        })
                        .help("Number of time steps to run before drawing"),
                )
                .arg(
                    Arg::with_name(SEED)
                        .long(SEED)
                        .takes_value(true)
                        .validator(|s| {
                            validate_range(
                                &s,
                                0,
                                ::std::u64::MAX,
                                "Could not parse seed",
                                "Seed is out of range",
                            )
                        })
                        .help("Seed for the initial bodies; random when absent"),
                )
                .arg(
                    Arg::with_name(TIMESTEP)
                        .long(TIMESTEP)
                        .takes_value(true)
                        .default_value("0.008")
                        .validator(|s| {
                            validate_range(
                                &s,
                                ::std::f64::MIN_POSITIVE,
                                ::std::f64::MAX,
                                "Could not parse time step",
                                "Time step must be positive",
                            )
                        })
                        .help("Integration time step"),
                ),
        )
        .get_matches()
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (usize, usize)) -> Result<(), Error> {
    let output = File::create(outfile)?;
    let encoder = PNGEncoder::new(output);
    encoder.encode(pixels, bounds.0 as u32, bounds.1 as u32, ColorType::RGBA(8))?;
    Ok(())
}

fn run_fractal(matches: &ArgMatches) -> Result<(), Error> {
    let (width, height) = pair::<usize>(matches, SIZE, 'x')?;
    let (re, im) = pair::<f64>(matches, CENTER, ',')?;
    let zoom = value::<f64>(matches, ZOOM)?;
    let threads = value::<usize>(matches, THREADS)?;
    let iterations = value::<usize>(matches, ITERATIONS)?;

    let mut engine = FractalEngine::with_limit(iterations);
    engine.init(width, height)?;
    engine.set_view(re, im, zoom)?;
    if threads > 1 {
        engine.render_parallel(threads)?;
    } else {
        engine.render_full()?;
    }
    info!(
        "rendered {}x{} around {},{} at zoom {}",
        width, height, re, im, zoom
    );

    let outfile = matches
        .value_of(OUTPUT)
        .ok_or_else(|| format_err!("no output file"))?;
    write_image(outfile, engine.output_buffer()?, (width, height))
}

/// Paints a filled disc for one body, clipped to the canvas.
fn draw_disc(pixels: &mut [u8], bounds: (usize, usize), body: &SnapshotEntry) {
    let color = unpack_color(body.color as u32);
    let r = body.radius;
    let clip = |v: f64, max: usize| (v.max(0.0) as usize).min(max - 1);
    let (left, right) = (clip((body.x - r).floor(), bounds.0), clip((body.x + r).ceil(), bounds.0));
    let (top, bottom) = (clip((body.y - r).floor(), bounds.1), clip((body.y + r).ceil(), bounds.1));
    for row in top..=bottom {
        for column in left..=right {
            let dx = column as f64 + 0.5 - body.x;
            let dy = row as f64 + 0.5 - body.y;
            if dx * dx + dy * dy <= r * r {
                let offset = (row * bounds.0 + column) * 4;
                pixels[offset..offset + 4].copy_from_slice(&color);
            }
        }
    }
}

fn run_nbody(matches: &ArgMatches) -> Result<(), Error> {
    let (width, height) = pair::<usize>(matches, SIZE, 'x')?;
    let bodies = value::<usize>(matches, BODIES)?;
    let steps = value::<usize>(matches, STEPS)?;
    let time_step = value::<f64>(matches, TIMESTEP)?;

    let mut engine = match matches.value_of(SEED) {
        Some(_) => NBodyEngine::seeded(value::<u64>(matches, SEED)?),
        None => NBodyEngine::new(),
    };
    let count = engine.init(width, height, bodies)?;
    engine.set_time_step(time_step);
    for _ in 0..steps {
        engine.step()?;
    }
    info!("ran {} bodies for {} steps", count, steps);

    let mut pixels = vec![0u8; width * height * 4];
    for pixel in pixels.chunks_mut(4) {
        pixel[3] = 255;
    }
    for body in &engine.export_snapshot()? {
        draw_disc(&mut pixels, (width, height), body);
    }

    let outfile = matches
        .value_of(OUTPUT)
        .ok_or_else(|| format_err!("no output file"))?;
    write_image(outfile, &pixels, (width, height))
}

fn main() {
    env_logger::init();
    let matches = args();
    let result = match matches.subcommand() {
        (FRACTAL, Some(m)) => run_fractal(m),
        (NBODY, Some(m)) => run_nbody(m),
        _ => Err(format_err!("no command given")),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
