mod cli;

use dubforge::{
    bridge::{Bridge, Event, Origin, Status},
    config,
    pipeline::{PipelineExecutor, PipelineRequest},
    translate::GoogleTranslator,
};
use dubforge_av::actions::{trimmed_filename, TrimSpec};
use dubforge_av::{SystemGateway, ToolGateway};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, SettingsArgs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// How often the consumer polls the event queue.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag.
    // Run events go to stdout, so diagnostics go to stderr.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "dubforge=debug,dubforge_av=debug".to_string()
        } else {
            "warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            url,
            output,
            actions,
            audio,
            json,
            settings,
        } => run_pipeline(
            url,
            output,
            actions,
            audio,
            settings,
            cli.config.as_deref(),
            json,
        ),
        Commands::Trim {
            input,
            output,
            start,
            end,
            json,
        } => run_trim(input, output, start, end, cli.config.as_deref(), json),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("dubforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_pipeline(
    url: String,
    output: Option<PathBuf>,
    actions: Vec<String>,
    audio: Option<PathBuf>,
    overrides: SettingsArgs,
    config_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let mut settings = config.settings.clone();
    if let Some(v) = overrides.source_lang {
        settings.source_lang = v;
    }
    if let Some(v) = overrides.target_lang {
        settings.target_lang = v;
    }
    if let Some(v) = overrides.subtitle_lang {
        settings.subtitle_lang = v;
    }
    if let Some(v) = overrides.subtitle_format {
        settings.subtitle_format = v;
    }
    if let Some(v) = overrides.video_format {
        settings.video_format = v;
    }
    let settings = settings.validate()?;

    let gateway: Arc<dyn ToolGateway> = Arc::new(SystemGateway::discover(&config.tools));
    let translator = Arc::new(GoogleTranslator::new(&config.translator)?);
    let executor = PipelineExecutor::new(gateway, translator);

    let request = PipelineRequest {
        url,
        output_dir: output.unwrap_or_else(|| config.output.dir.clone()),
        audio,
        actions,
        settings,
    };

    let bridge = Bridge::new();
    bridge.start_pipeline(executor, request);

    if follow(&bridge, Origin::Url, json)? {
        Ok(())
    } else {
        anyhow::bail!("Pipeline did not complete")
    }
}

fn run_trim(
    input: PathBuf,
    output: Option<PathBuf>,
    start: String,
    end: String,
    config_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let gateway: Arc<dyn ToolGateway> = Arc::new(SystemGateway::discover(&config.tools));

    let output = output.unwrap_or_else(|| trimmed_filename(&input, &start, &end));
    let spec = TrimSpec {
        input,
        output,
        start,
        end,
    };

    let bridge = Bridge::new();
    bridge.start_trim(gateway, spec);

    if follow(&bridge, Origin::Trim, json)? {
        Ok(())
    } else {
        anyhow::bail!("Trim did not complete")
    }
}

/// Print events until `origin` reports a terminal status. Returns whether the
/// task finished successfully.
fn follow(bridge: &Bridge, origin: Origin, json: bool) -> Result<bool> {
    loop {
        while let Some(event) = bridge.drain() {
            print_event(&event, json)?;
            if event.origin == origin {
                if let Some(status) = event.terminal_status() {
                    return Ok(status == Status::Finished);
                }
            }
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn print_event(event: &Event, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        println!("{}", event);
    }
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let gateway = SystemGateway::discover(&config.tools);
    let tools = gateway.registry().check_all();
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
            print!(" ({})", version.lines().next().unwrap_or(""));
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
        println!("Some tools are missing. Install them or set their paths under [tools].");
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
            println!("No config file specified, searching default locations");
            config::load_config_or_default(None)?
        }
    };

    let s = &config.settings;
    println!("  Languages: {} -> {}", s.source_lang, s.target_lang);
    println!("  Subtitles: {} ({})", s.subtitle_lang, s.subtitle_format);
    println!("  Video: {} (format '{}')", s.video_format, s.download_format);
    println!(
        "  Mix: original {}, added {}, codec {}",
        s.original_volume, s.added_volume, s.merged_audio_codec
    );
    println!("  Output dir: {}", config.output.dir.display());
    println!(
        "  Translator: {} (timeout {}s)",
        config.translator.endpoint, config.translator.timeout_secs
    );
    for (name, path) in [
        ("yt-dlp", &config.tools.yt_dlp_path),
        ("ffmpeg", &config.tools.ffmpeg_path),
    ] {
        match path {
            Some(p) => println!("  {}: {}", name, p.display()),
            None => println!("  {}: (PATH lookup)", name),
        }
    }

    Ok(())
}
