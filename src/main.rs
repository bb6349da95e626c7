extern crate log;
extern crate pretty_env_logger;

use std::path::PathBuf;
use std::process::exit;

use clap::{arg, command, ArgMatches, Command};
use serde_json::Value;

use crate::debug::ImageDebugWriter;
use crate::geometry::Region;
use crate::image_utils::ImageProcOps;
use crate::layout::SheetLayout;
use crate::scan::{score_column, score_sheet};

mod debug;
mod geometry;
mod image_utils;
mod layout;
mod scan;
mod scoring;
mod types;

fn main() {
    pretty_env_logger::init_custom_env("LOG");

    let matches = cli().get_matches();
    let image_path = matches
        .get_one::<String>("image_path")
        .expect("image path is required");

    let image_bytes = match std::fs::read(image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading image {}: {}", image_path, e);
            exit(1);
        }
    };

    let debug_writer = if matches.get_flag("debug") {
        ImageDebugWriter::new(PathBuf::from(image_path))
    } else {
        ImageDebugWriter::disabled()
    };

    let output = if let Some(layout_path) = matches.get_one::<String>("layout") {
        score_layout_columns(layout_path, &image_bytes, &debug_writer)
    } else {
        score_single_column(&matches, &image_bytes, &debug_writer)
    };

    println!("{}", output);
}

fn score_layout_columns(layout_path: &str, image_bytes: &[u8], debug: &ImageDebugWriter) -> Value {
    let layout_json = match std::fs::read_to_string(layout_path) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error reading sheet layout: {}", e);
            exit(1);
        }
    };

    let layout: SheetLayout = match serde_json::from_str(&layout_json) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("Error parsing sheet layout: {}", e);
            exit(1);
        }
    };

    match score_sheet(&ImageProcOps, image_bytes, &layout, debug) {
        Ok(columns) => serde_json::json!({ "columns": columns }),
        Err(e) => {
            eprintln!("Error: {:?}", e);
            exit(1);
        }
    }
}

fn score_single_column(matches: &ArgMatches, image_bytes: &[u8], debug: &ImageDebugWriter) -> Value {
    let (rect, rows, confidence) = match (
        matches.get_one::<String>("rect"),
        matches.get_one::<String>("rows"),
        matches.get_one::<String>("confidence"),
    ) {
        (Some(rect), Some(rows), Some(confidence)) => (rect, rows, confidence),
        _ => {
            eprintln!("Either --layout or all of --rect, --rows and --confidence are required");
            exit(1);
        }
    };

    let region = match parse_region(rect) {
        Some(region) => region,
        None => {
            eprintln!("Invalid rectangle {:?}: expected X,Y,W,H", rect);
            exit(1);
        }
    };

    let num_rows = match rows.parse::<i32>() {
        Ok(num_rows) => num_rows,
        Err(e) => {
            eprintln!("Invalid row count {:?}: {}", rows, e);
            exit(1);
        }
    };

    let confidence_threshold = match confidence.parse::<f32>() {
        Ok(confidence_threshold) => confidence_threshold,
        Err(e) => {
            eprintln!("Invalid confidence score {:?}: {}", confidence, e);
            exit(1);
        }
    };

    log::info!(
        "scoring column: rect={:?}, rows={}, confidence={}",
        region,
        num_rows,
        confidence_threshold
    );

    match score_column(image_bytes, &region, num_rows, confidence_threshold, debug) {
        Ok(rows) => {
            log::info!(
                "marked {} of {} rows",
                rows.iter().filter(|row| !row.is_empty()).count(),
                rows.len()
            );
            serde_json::json!({ "columnData": rows })
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            exit(1);
        }
    }
}

fn parse_region(s: &str) -> Option<Region> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<Vec<f32>, _>>()
        .ok()?;
    match values[..] {
        [x, y, w, h] => Some(Region { x, y, w, h }),
        _ => None,
    }
}

fn cli() -> Command {
    command!()
        .arg(arg!(-l --layout <PATH> "Path to a sheet layout JSON file"))
        .arg(arg!(-r --rect <RECT> "Column rectangle as X,Y,W,H in image coordinates"))
        .arg(arg!(-n --rows <ROWS> "Number of answer rows in the column"))
        .arg(arg!(-c --confidence <SCORE> "Minimum fill score for a bubble to count as marked"))
        .arg(arg!(-d --debug "Write debug images next to the input image"))
        .arg(arg!(image_path: <IMAGE> "Path to the scanned sheet image").required(true))
}
