use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Suggest how many bars each song section should get", long_about = None)]
pub struct Args {
    /// Configuration file path (falls back to $SONG_PARTS_CONFIG)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Song length, e.g. 4:30, 4m30s, or 4.5
    #[arg(short = 'd', long = "duration")]
    pub duration: Option<String>,

    /// Tempo in beats per minute
    #[arg(short = 'b', long = "bpm")]
    pub bpm: Option<f64>,

    /// Beats per measure [default: 4]
    #[arg(short = 'm', long = "beats-per-measure")]
    pub beats_per_measure: Option<f64>,

    /// Output format: text, csv, or json
    #[arg(short = 'f', long = "format")]
    pub format: Option<String>,

    /// Print the available section types and exit
    #[arg(long = "list")]
    pub list: bool,

    /// Section types in song order, e.g. Intro Verse Drop Outro
    pub sections: Vec<String>,
}
