use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use clipper_app::cli::{Cli, Commands, ConvertArgs};
use clipper_app::platform::logging;
use clipper_app::platform::surface::{HeaderAuthSurface, TerminalAuthSurface};
use clipper_app::platform::ui::render::render;
use clipper_app::{load_config, ClipperConfig, Orchestrator};
use clipper_core::{capture_credentials, extract_url, AuthSurface, ClientState, CrawlRequest};
use clipper_engine::{EngineHandle, ReqwestTaskClient, TaskClient};
use engine_logging::{engine_info, engine_warn};
use log::LevelFilter;

const ACTION_TIMEOUT: Duration = Duration::from_secs(120);

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;
    cli.apply_overrides(&mut config);
    logging::initialize(config.log, LevelFilter::Info);
    engine_info!("Using backend {}", config.base_url);

    match &cli.command {
        Commands::Health => health(&config),
        Commands::Convert(args) => convert(&config, args),
    }
}

fn health(config: &ClipperConfig) -> anyhow::Result<ExitCode> {
    let client = ReqwestTaskClient::new(config.engine_config().client)?;
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let status = runtime.block_on(client.health())?;
    println!("{status}");
    Ok(ExitCode::SUCCESS)
}

fn convert(config: &ClipperConfig, args: &ConvertArgs) -> anyhow::Result<ExitCode> {
    let url = extract_url(&args.input)
        .ok_or_else(|| anyhow!("no http(s) URL found in {:?}", args.input))?;

    let mut request = CrawlRequest::new(url.clone(), args.crawl_mode());
    if let Some(max_pages) = args.max_pages {
        request = request.with_max_pages(max_pages);
    }

    let surface: Option<Box<dyn AuthSurface>> = if args.login {
        Some(Box::new(TerminalAuthSurface::new()))
    } else {
        args.cookie_header
            .as_ref()
            .map(|header| Box::new(HeaderAuthSurface::new(header.clone())) as Box<dyn AuthSurface>)
    };
    if let Some(mut surface) = surface {
        let Some(cookies) = capture_credentials(surface.as_mut(), &url) else {
            eprintln!("Login cancelled, nothing submitted.");
            return Ok(ExitCode::FAILURE);
        };
        engine_info!("Captured {} cookies", cookies.len());
        request = request.with_credentials(cookies);
    }

    let engine = EngineHandle::new(config.engine_config())?;
    let mut orchestrator = Orchestrator::new(engine);
    orchestrator.submit(request);

    let settled = orchestrator.run_until_settled(|view| eprintln!("{}", render(view)));
    let markdown = match settled {
        ClientState::Completed { markdown, .. } => markdown.clone(),
        _ => return Ok(ExitCode::FAILURE),
    };

    if args.print {
        println!("{markdown}");
    }

    let mut exit = ExitCode::SUCCESS;
    if args.save {
        match orchestrator.save(ACTION_TIMEOUT) {
            Ok(path) => eprintln!("Saved to {}", path.display()),
            Err(err) => {
                engine_warn!("{}", err);
                eprintln!("{err}");
                exit = ExitCode::FAILURE;
            }
        }
    }
    if args.upload {
        let token = args
            .access_token
            .clone()
            .ok_or_else(|| anyhow!("--upload needs an access token (CLIPPER_ACCESS_TOKEN)"))?;
        match orchestrator.upload(token, args.upload_name.clone(), ACTION_TIMEOUT) {
            Ok(upload) => eprintln!("Uploaded as {}: {}", upload.display_name, upload.web_link),
            Err(err) => {
                engine_warn!("{}", err);
                eprintln!("{err}");
                exit = ExitCode::FAILURE;
            }
        }
    }
    eprintln!("{}", render(&orchestrator.view()));
    orchestrator.shutdown();
    Ok(exit)
}
