mod artifacts;
mod cli;
mod coordinator;
mod downloader;
mod logging;
mod outside;
mod pipeline;
mod prompt;
mod result;
mod sanitize;
mod selector;
mod settings;
mod types;
mod walker;

#[cfg(test)]
mod test_utils;

use clap::Parser;
use indoc::indoc;
use tracing::{debug, info, warn};

use crate::{
    cli::Args,
    coordinator::{resolve_destination, resolve_playlist, RunCoordinator},
    downloader::{http_client, HttpDownloader},
    outside::{Ffmpeg, YoutubeApi, Ytdl},
    pipeline::ItemPipeline,
    prompt::Prompter,
    result::{CatalogError, Result},
    settings::Settings,
    types::RunSummary,
};

fn main() -> miette::Result<()> {
    let args = Args::parse();
    logging::init_logging(args.log_level())?;

    let settings = Settings::load(args)?;
    debug!("{settings:?}");

    let summary = run(settings)?;
    println!("{summary}");
    if summary.failed() > 0 {
        warn!(
            "{}",
            indoc! {"
                Some items could not be archived.
                Run again with the same directory to retry them, archived items are skipped."}
        );
    }

    Ok(())
}

fn run(settings: Settings) -> Result<RunSummary> {
    let (ytdl, ffmpeg) = load_external_components(&settings)?;

    let stdin = std::io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
    let out_dir = resolve_destination(settings.out, &mut prompter)?;

    let client = http_client().map_err(CatalogError::Network)?;
    let catalog = YoutubeApi::new(client.clone(), &settings.api_base, settings.api_key);
    let playlist = resolve_playlist(&catalog, settings.playlist.as_deref(), &mut prompter)?;

    let downloader = HttpDownloader::new(client);
    let pipeline = ItemPipeline::new(&ytdl, &downloader, &ffmpeg, settings.container);
    let summary = RunCoordinator::new(&catalog, pipeline).run(&playlist, &out_dir)?;

    info!("All items processed");
    Ok(summary)
}

/// Load the external components
fn load_external_components(settings: &Settings) -> Result<(Ytdl, Ffmpeg)> {
    // Construct the handles concurrently as executing an external program
    // is not instantaneous. That way we can avoid adding the costs
    let ytdlp = settings.ytdlp.clone();
    let ytdl_thread = std::thread::spawn(move || Ytdl::new(ytdlp));
    let ffmpeg = Ffmpeg::new(settings.ffmpeg.clone(), settings.bitrate);

    let ytdl = ytdl_thread
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;

    Ok((ytdl, ffmpeg?))
}
