use anyhow::Result;
use base64::Engine as _;
use clap::Parser;
use phoebe_generator::app::App;
use phoebe_generator::models::{parse_image_count, Config, GeneratedImage};
use phoebe_generator::prompts;
use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TITLE: &str = "Phoebe Image Generator";

#[derive(Debug, Parser)]
#[command(name = "phoebe-generator")]
#[command(about = "Generate AI images of Phoebe from a description")]
struct CliArgs {
    /// Image description. Read from stdin when omitted.
    #[arg(value_name = "DESCRIPTION")]
    description: Option<String>,

    /// Number of parallel generation calls (overrides NUM_IMAGE_GENERATIONS).
    #[arg(short, long, value_parser = parse_count_arg)]
    count: Option<usize>,

    /// Print each image as a data: URI.
    #[arg(long)]
    data_uri: bool,
}

fn parse_count_arg(input: &str) -> std::result::Result<usize, String> {
    parse_image_count(input).map_err(|e| e.to_string())
}

fn read_description(stdin: &mut impl BufRead) -> io::Result<String> {
    print!("Enter image description: ");
    io::stdout().flush()?;
    let mut line = String::new();
    stdin.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn render_slot(slot: usize, image: &GeneratedImage, data_uri: bool) -> String {
    let mut line = format!(
        "[{}] {} ({} bytes)",
        slot,
        image.mime_type,
        image.data.len()
    );
    if data_uri {
        line.push_str(&format!(
            "\n    data:{};base64,{}",
            image.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&image.data)
        ));
    }
    line
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phoebe_generator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    println!("{}\n", TITLE);
    println!("Example prompts:");
    for example in prompts::example_prompts() {
        println!("  {}", example);
    }
    println!();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(count) = args.count {
        config.image_count = count;
    }

    let description = match args.description {
        Some(description) => description,
        None => read_description(&mut io::stdin().lock())?,
    };
    if description.trim().is_empty() {
        info!("No description entered, nothing to generate");
        return Ok(());
    }

    let app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    println!("Generating image(s)...");
    match app.generate(&description).await {
        Ok(images) => {
            if images.len() < app.image_count() {
                warn!(
                    "Only {} of {} requested images were generated",
                    images.len(),
                    app.image_count()
                );
            }
            for (idx, image) in images.iter().enumerate() {
                println!("{}", render_slot(idx + 1, image, args.data_uri));
            }
            Ok(())
        }
        Err(e) => {
            error!("Generation failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_arg_valid() {
        assert_eq!(parse_count_arg("4").unwrap(), 4);
    }

    #[test]
    fn test_parse_count_arg_rejects_zero() {
        let err = parse_count_arg("0").unwrap_err();
        assert!(err.contains("positive integer"));
    }

    #[test]
    fn test_read_description_strips_newline_only() {
        let mut input = io::Cursor::new("  Phoebe in space  \r\n".as_bytes());
        assert_eq!(read_description(&mut input).unwrap(), "  Phoebe in space  ");
    }

    #[test]
    fn test_render_slot() {
        let image = GeneratedImage::new("image/png", vec![1, 2, 3]);
        assert_eq!(render_slot(2, &image, false), "[2] image/png (3 bytes)");
        assert!(render_slot(2, &image, true).ends_with("data:image/png;base64,AQID"));
    }
}
