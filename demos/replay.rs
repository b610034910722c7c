//! Replays a detections dump through a tracking session.
//!
//! Each line of the dump is `<timestamp>:<json array of detections>`, e.g.
//! `0.04:[{"x":120,"y":300,"w":24,"h":60,"p":0.91,"c":0}]`.
//!
//! Usage: replay <detections file> <width> <height> [player id] [config.json]

use pitchtrack::{Detection, Frame, Identity, Session, TrackerConfig};
use std::io::BufRead;

const SHADES: &[u8] = b" .:-=+*#%@";

fn parse_line(line: &str) -> Result<(f32, Vec<Detection>), String> {
    let idx = line
        .find(':')
        .ok_or_else(|| "wrong file format: expected `:`".to_string())?;
    let (ts, vector) = line.split_at(idx);

    match (ts.trim().parse::<f32>(), serde_json::from_str(&vector[1..])) {
        (Ok(ts), Ok(dets)) => Ok((ts, dets)),
        (Ok(_), Err(err)) => Err(format!("wrong file format: parse json failed: {}", err)),
        (Err(_), _) => Err("wrong file format: parse timestamp failed".to_string()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let mut args = std::env::args().skip(1);
    let in_file_name = args.next().ok_or("expected detections file name")?;
    let width: u32 = args.next().ok_or("expected field width")?.parse()?;
    let height: u32 = args.next().ok_or("expected field height")?.parse()?;
    let player: u32 = args.next().map(|s| s.parse::<u32>()).transpose()?.unwrap_or(0);

    let mut config = match args.next() {
        Some(path) => serde_json::from_reader(std::fs::File::open(path)?)?,
        None => TrackerConfig::default(),
    };
    config.field_width = width;
    config.field_height = height;

    let mut session = Session::new(config)?;
    let dets_file = std::fs::File::open(in_file_name)?;

    for (lineno, line) in std::io::BufReader::new(dets_file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let (ts, detections) = match parse_line(&line) {
            Ok(parsed) => parsed,
            Err(err) => {
                eprintln!("line {}: {}", lineno + 1, err);
                continue;
            }
        };

        if let Err(err) = session.update(&Frame::new((width, height), ts, detections)) {
            eprintln!("line {}: frame rejected: {}", lineno + 1, err);
        }
    }

    println!("{} frames, {} players", session.frames_processed(), session.len());
    for t in session.tracks() {
        println!(
            "{}: last ({:.1}, {:.1}), {} positions, frames {}..{}",
            t.id, t.position.0, t.position.1, t.history_len, t.first_frame, t.last_frame
        );
    }

    let id = Identity(player);
    match session.heatmap(id)? {
        None => println!("{}: no heatmap", id),
        Some(grid) => {
            println!("{} movement heatmap (peak {}):", id, grid.max());

            for row in grid.normalized().rows() {
                let line: String = row
                    .iter()
                    .map(|&v| SHADES[((v * (SHADES.len() - 1) as f32).round()) as usize] as char)
                    .collect();
                println!("|{}|", line);
            }
        }
    }

    Ok(())
}
