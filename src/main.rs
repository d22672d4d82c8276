use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jam::melody::{decode_melody, ChordMelody};
use jam::schedule::{backing_schedule, melody_schedule};
use jam::{
    decode_response, parse_chord_name, GenerationClient, GenerationRequest, JamConfig, JamError,
    Progression, Transport,
};

#[derive(Parser)]
#[command(name = "jam", about = "Decode and inspect AI melody jam generations")]
struct Cli {
    /// YAML config file (defaults plus JAM_* environment overrides when absent)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode one base64 melody payload
    Decode {
        blob: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show chords, notes and backing voicings of a saved response body
    Inspect { response: PathBuf },
    /// Show root, chord tones and scales of a chord name
    Chord { name: String },
    /// Print the static-cache path of a progression
    CachePath {
        progression: String,
        style: String,
        #[arg(long, default_value_t = 1)]
        variation: u32,
    },
    /// Request a generation from the backend and summarize it
    Generate {
        #[arg(short, long)]
        progression: String,
        #[arg(short, long)]
        style: String,
        /// Transpose the progression before sending it
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        transpose: i32,
        /// Save the raw response body
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), JamError> {
    let config = match &cli.config {
        Some(path) => JamConfig::load(path)?,
        None => JamConfig::from_env()?,
    };

    match cli.command {
        Command::Decode { blob, json } => {
            let melody = decode_melody(&blob)?;
            if json {
                println!("{}", to_json(&melody)?);
            } else {
                println!("pitch  duration  wait  velocity  start");
                for e in &melody.events {
                    println!(
                        "{:>5}  {:>8}  {:>4}  {:>8}  {:>5}",
                        e.pitch, e.duration_ms, e.wait_ms, e.velocity, e.start_time_ms
                    );
                }
                println!("loop length: {} ms", melody.total_wait_ms);
            }
        }
        Command::Inspect { response } => {
            let body = fs::read_to_string(&response).map_err(|e| {
                JamError::ResponseError(format!("cannot read '{}': {}", response.display(), e))
            })?;
            let melody = decode_response(&body)?;
            print_summary(&melody, &config.transport);
        }
        Command::Chord { name } => {
            let info = parse_chord_name(&name)?;
            println!("root: {}", info.root);
            println!("tones: {:?}", info.tones);
            println!("voicing: {:?}", info.voicing());
            for scale in info.scales {
                println!("scale {}: {:?}", scale.name, scale.intervals);
            }
        }
        Command::CachePath {
            progression,
            style,
            variation,
        } => {
            let key = Progression::parse(&progression)?.cache_key();
            println!("{}/{}/{}.json", key, style, variation);
        }
        Command::Generate {
            progression,
            style,
            transpose,
            output,
        } => {
            let progression = Progression::parse(&progression)?.transpose(transpose, transpose < 0);
            let request = GenerationRequest::new(progression.descriptor(), style);
            let client = GenerationClient::new(&config.server)?;
            let response = client.generate(&request).await?;
            let melody = ChordMelody::from_encoded(response.chord_melodies.clone())?;

            if let Some(path) = output {
                let map: serde_json::Map<String, serde_json::Value> = response
                    .chord_melodies
                    .into_iter()
                    .map(|(label, blob)| (label, serde_json::Value::String(blob)))
                    .collect();
                let body = to_json(&serde_json::json!({ "chord_melodies": map }))?;
                fs::write(&path, body).map_err(|e| {
                    JamError::ResponseError(format!("cannot write '{}': {}", path.display(), e))
                })?;
                eprintln!("Wrote response to {}", path.display());
            }
            print_summary(&melody, &config.transport);
        }
    }
    Ok(())
}

fn print_summary(melody: &ChordMelody, transport: &Transport) {
    let backing = backing_schedule(melody, transport);
    let notes = melody_schedule(melody, transport);

    for (track, chord) in melody.tracks().iter().zip(&backing) {
        let pitches: Vec<u8> = track.events.iter().map(|e| e.pitch).collect();
        println!(
            "{:<8} backing {:?}  notes {:?}  loop {} ms",
            track.label, chord.midi_notes, pitches, track.total_wait_ms
        );
    }
    let wrapped = notes.iter().filter(|n| n.segments.len() > 1).count();
    println!(
        "{} chords, {} notes, {} ticks per loop, {} notes wrap the loop",
        melody.len(),
        notes.len(),
        transport.loop_ticks(melody.len()),
        wrapped
    );
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JamError> {
    serde_json::to_string_pretty(value).map_err(|e| JamError::ResponseError(e.to_string()))
}
