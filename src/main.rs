mod cli;

use stickerforge::{config, metadata, DeliveryContext, FileSink, StickerEngine, StickerSink};
use stickerforge_av::ToolRegistry;
use stickerforge_core::{ConversionRequest, MediaInput};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "stickerforge=trace,stickerforge_av=trace,stickerforge_probe=debug".to_string()
        } else {
            "stickerforge=info,stickerforge_av=info,stickerforge_probe=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            kind,
            force_square,
            pack,
            author,
        } => {
            let request = ConversionRequest::parse(&kind)?
                .force_square(force_square)
                .pack_name(pack.unwrap_or_default())
                .author(author.unwrap_or_default());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert(&input, &output, &request, cli.config.as_deref()))
        }
        Commands::Detect { file, json } => detect_file(&file, json),
        Commands::Inspect { file } => inspect_file(&file),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("stickerforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// A leading `{` means a JSON input object; anything else is a descriptor.
fn parse_input(raw: &str) -> Result<MediaInput> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('{') {
        let value: serde_json::Value =
            serde_json::from_str(trimmed).context("Input looks like JSON but does not parse")?;
        Ok(MediaInput::from_json(&value)?)
    } else {
        Ok(MediaInput::from_descriptor(raw))
    }
}

async fn convert(
    raw_input: &str,
    output: &Path,
    request: &ConversionRequest,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let engine = StickerEngine::from_config(&config)?;
    let input = parse_input(raw_input)?;

    let file_name = output
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Output path has no file name: {:?}", output))?;
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let report = engine.produce_with_report(input, request).await?;
    let size = report.data.len();
    let sink = FileSink::new(dir);
    sink.send_sticker(&DeliveryContext::new(file_name), report.data.clone()).await?;

    println!("Wrote {} ({} bytes)", output.display(), size);
    match report.final_quality() {
        Some(q) => println!("Quality: {} after {} attempt(s)", q, report.attempts.len()),
        None => println!("Source was already a static WebP; passed through"),
    }
    if !report.within_budget {
        println!(
            "Warning: sticker exceeds the {} byte budget",
            stickerforge_av::SIZE_BUDGET
        );
    }

    Ok(())
}

fn detect_file(file: &Path, json: bool) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("Failed to read {:?}", file))?;
    let file_type = stickerforge_probe::detect(&data);

    if json {
        let value = serde_json::json!({
            "extension": file_type.extension,
            "mime_type": file_type.mime_type,
            "animated_webp": stickerforge_probe::riff::is_animated_webp(&data),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Extension: {}", file_type.extension);
        println!("MIME type: {}", file_type.mime_type);
        if stickerforge_probe::riff::is_webp(&data) {
            println!(
                "Animated: {}",
                stickerforge_probe::riff::is_animated_webp(&data)
            );
        }
    }

    Ok(())
}

fn inspect_file(file: &Path) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("Failed to read {:?}", file))?;
    if !stickerforge_probe::riff::is_webp(&data) {
        anyhow::bail!("Not a WebP file: {:?}", file);
    }

    println!("File: {}", file.display());
    println!("Size: {} bytes", data.len());

    match metadata::read_sticker_metadata(&data)? {
        Some(meta) => println!("{}", serde_json::to_string_pretty(&meta)?),
        None => println!("No sticker metadata"),
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg (with libwebp) to convert stickers.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  State dir: {}", config.storage.state_dir.display());
    println!("  Scratch dir: {}", config.storage.scratch_dir().display());
    println!(
        "  ffmpeg: {}",
        config
            .tools
            .ffmpeg_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(PATH)".to_string())
    );
    println!("  Fetch timeout: {}s", config.fetch.timeout_secs);
    match config.encoder.timeout_secs {
        Some(secs) => println!("  Encoder timeout: {}s", secs),
        None => println!("  Encoder timeout: none"),
    }
    println!("  Detection cache: {} entries", config.detection.cache_capacity);

    Ok(())
}
