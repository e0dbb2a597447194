use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use newton_roots::func::{Cubic, SinSquare};
use newton_roots::{Bounds, Config, Func};

pub fn error(message: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

fn finite(arg: &str) -> Result<f64, String> {
    let value: f64 = arg.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{arg} is not a finite number"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Function {
    /// z^3 - 1
    Cubic,
    /// sin(z^2 + 1)
    Sine,
}

impl Function {
    pub fn build(self) -> Arc<dyn Func + Send + Sync> {
        match self {
            Self::Cubic => Arc::new(Cubic),
            Self::Sine => Arc::new(SinSquare),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Every worker writes its own rows at a precomputed offset
    Offset,
    /// The coordinator collects all rows and writes them
    Gather,
}

/// Newton fractal basins of attraction, written as CSV.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    #[arg(allow_negative_numbers = true, value_parser = finite)]
    pub x_min: f64,
    #[arg(allow_negative_numbers = true, value_parser = finite)]
    pub x_max: f64,
    #[arg(allow_negative_numbers = true, value_parser = finite)]
    pub y_min: f64,
    #[arg(allow_negative_numbers = true, value_parser = finite)]
    pub y_max: f64,
    #[arg(short, long, default_value = "fractal_data.csv")]
    pub output: PathBuf,
    #[arg(short, long)]
    pub jobs: Option<usize>,
    #[arg(short, long, value_enum, default_value_t = Function::Cubic)]
    pub function: Function,
    #[arg(short, long, value_enum, default_value_t = Strategy::Offset)]
    pub strategy: Strategy,
    /// RON or JSON file overriding the numeric tunables
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Write the discovered roots to this file as JSON
    #[arg(short, long)]
    pub roots: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Settings {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x_min..self.x_max, self.y_min..self.y_max)
    }

    pub fn load_config(&self) -> std::io::Result<Config> {
        let Some(path) = &self.config else {
            return Ok(Config::default());
        };
        let input = std::fs::read_to_string(path)?;
        Config::decode(&input)
            .ok_or_else(|| error(&format!("Could not decode {}", path.to_string_lossy())))
    }
}

#[derive(Debug, Default)]
pub struct Summary {
    pub total: Duration,
    pub compute: Duration,
    pub pixels: usize,
    pub workers: usize,
    pub roots: usize,
}

impl Summary {
    fn percent(&self, part: Duration) -> f64 {
        100.0 * part.as_secs_f64() / self.total.as_secs_f64().max(f64::MIN_POSITIVE)
    }

    pub fn print(&self, settings: &Settings) {
        let total = self.total.as_secs_f64();
        let compute = self.compute.min(self.total);
        let io = self.total - compute;

        println!();
        println!("Roots found: {}", self.roots);
        println!("File '{}' written.", settings.output.to_string_lossy());
        println!("Total time: {total:.2} s");
        println!(
            "  - compute: {:.2} s ({:.1}%)",
            compute.as_secs_f64(),
            self.percent(compute)
        );
        println!(
            "  - I/O:     {:.2} s ({:.1}%)",
            io.as_secs_f64(),
            self.percent(io)
        );
        println!("Pixels: {}", self.pixels);
        println!("Workers: {}", self.workers);
        println!(
            "Speed: {:.0} pixels/s",
            self.pixels as f64 / total.max(f64::MIN_POSITIVE)
        );
    }
}
