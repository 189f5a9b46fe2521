//! geocam CLI: build a geo camera from a YAML configuration and query or
//! convert it.

use clap::{ArgAction, Parser, Subcommand};
use geocam::{decode_camera, encode_camera, CameraConfig, GeoCamera};
use geocam_geodesy::Hemisphere;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "geocam")]
#[command(about = "Map raster pixels to WGS84/UTM and local coordinates")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the camera and its pixel spacing.
    Info {
        /// Camera configuration (YAML).
        config: PathBuf,
        /// Print machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Convert a pixel to longitude/latitude.
    ToGlobal {
        /// Camera configuration (YAML).
        config: PathBuf,
        /// Pixel column.
        #[arg(allow_negative_numbers = true)]
        i: f64,
        /// Pixel row.
        #[arg(allow_negative_numbers = true)]
        j: f64,
    },

    /// Convert longitude/latitude to a pixel.
    ToPixel {
        /// Camera configuration (YAML).
        config: PathBuf,
        /// Longitude in degrees.
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        /// Latitude in degrees.
        #[arg(allow_negative_numbers = true)]
        lat: f64,
    },

    /// Write the camera transform as a world file.
    ExportWorldFile {
        /// Camera configuration (YAML).
        config: PathBuf,
        /// Output world file.
        out: PathBuf,
    },

    /// Write the binary camera record.
    Encode {
        /// Camera configuration (YAML).
        config: PathBuf,
        /// Output record file.
        out: PathBuf,
    },

    /// Read a binary camera record and print it.
    Decode {
        /// Input record file.
        input: PathBuf,
    },
}

/// JSON view of a camera.
#[derive(Serialize)]
struct CameraInfo {
    matrix: [[f64; 4]; 4],
    scale_tag: bool,
    utm_zone: Option<u8>,
    hemisphere: Option<Hemisphere>,
    effective_frame: String,
    pixel_spacing: [f64; 2],
    context: Option<String>,
}

impl CameraInfo {
    fn from_camera(camera: &GeoCamera) -> Self {
        let t = camera.transform();
        let mut matrix = [[0.0; 4]; 4];
        for (row, values) in matrix.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value = t.get(row, col);
            }
        }
        let spacing = camera.pixel_spacing();
        CameraInfo {
            matrix,
            scale_tag: t.scale_tag(),
            utm_zone: camera.utm().map(|u| u.zone.number()),
            hemisphere: camera.utm().map(|u| u.hemisphere),
            effective_frame: format!("{:?}", camera.effective_frame()),
            pixel_spacing: [spacing.sx, spacing.sy],
            context: camera.context().map(|c| c.to_string()),
        }
    }
}

fn load_camera(config: &Path) -> CliResult<GeoCamera> {
    let camera = CameraConfig::from_file(config)?.build()?;
    info!("Loaded camera from {}", config.display());
    Ok(camera)
}

fn print_camera(camera: &GeoCamera) {
    println!("{}", camera);
    let spacing = camera.pixel_spacing();
    println!("pixel spacing: {:.6} x {:.6} m", spacing.sx, spacing.sy);
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Info { config, json } => {
            let camera = load_camera(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&CameraInfo::from_camera(&camera))?);
            } else {
                print_camera(&camera);
            }
        }

        Commands::ToGlobal { config, i, j } => {
            let camera = load_camera(&config)?;
            let (lon, lat) = camera.img_to_global(i, j);
            println!("lon {:.9} lat {:.9}", lon, lat);
            if camera.is_utm() {
                let utm = camera.img_to_global_utm(i, j);
                println!(
                    "easting {:.3} northing {:.3} zone {} {}",
                    utm.easting, utm.northing, utm.zone, utm.hemisphere
                );
            }
        }

        Commands::ToPixel { config, lon, lat } => {
            let camera = load_camera(&config)?;
            let (u, v) = camera.global_to_img(lon, lat);
            println!("u {:.4} v {:.4}", u, v);
        }

        Commands::ExportWorldFile { config, out } => {
            let camera = load_camera(&config)?;
            camera.save_as_world_file(&out)?;
            println!("Wrote {}", out.display());
        }

        Commands::Encode { config, out } => {
            let camera = load_camera(&config)?;
            let record = encode_camera(&camera);
            std::fs::write(&out, &record)?;
            println!("Wrote {} bytes to {}", record.len(), out.display());
        }

        Commands::Decode { input } => {
            let record = std::fs::read(&input)?;
            let camera = decode_camera(&record)?;
            print_camera(&camera);
        }
    }

    Ok(())
}
