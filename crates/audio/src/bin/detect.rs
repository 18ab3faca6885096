use cadence_audio::{estimate_tempo, AudioDecoder};
use cadence_domain::SampleRange;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Detect the tempo of a music mix segment", long_about = None)]
struct Cli {
    /// Path to the audio file to analyze
    input: String,
    /// Segment start in seconds
    #[arg(short, long, default_value_t = 0.0)]
    start: f64,
    /// Segment end in seconds (defaults to the end of the clip)
    #[arg(short, long)]
    end: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let clip = AudioDecoder::open(&cli.input)?;
    let range = SampleRange::new(cli.start, cli.end.unwrap_or_else(|| clip.duration_secs()));
    let estimate = estimate_tempo(&clip, &range);
    if estimate.is_none() {
        anyhow::bail!("no clear tempo found; try a shorter or cleaner range");
    }
    println!(
        "{}",
        serde_json::json!({
            "bpm": estimate.bpm,
            "confidence": estimate.confidence,
            "stability": estimate.band().label(),
        })
    );
    Ok(())
}
