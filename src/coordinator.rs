use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::{
    artifacts::sweep_partials,
    outside::Catalog,
    pipeline::ItemPipeline,
    prompt::Prompter,
    result::{CatalogError, ConfigError, ItemError, Result},
    types::{PlaylistRef, RunOutcome, RunSummary},
    walker::PlaylistWalker,
};

/// Number of searches allowed before giving up on finding a playlist
const SEARCH_ATTEMPTS: usize = 3;
const SEARCH_RESULTS: u32 = 10;

static LIST_PARAM: OnceLock<Regex> = OnceLock::new();

/// Get the output directory, asking for it if it is not configured.
///
/// The directory is created if needed, and returned as an absolute path.
/// Partial files left by an interrupted run are removed from it.
pub fn resolve_destination<R: BufRead, W: Write>(
    configured: Option<PathBuf>,
    prompter: &mut Prompter<R, W>,
) -> Result<PathBuf> {
    let dir = match configured {
        Some(dir) => dir,
        None => PathBuf::from(prompter.ask("Destination directory:")?),
    };

    let create_err = |source| ConfigError::CreateDir {
        path: dir.clone(),
        source,
    };
    std::fs::create_dir_all(&dir).map_err(create_err)?;
    let dir = dir.canonicalize().map_err(create_err)?;

    match sweep_partials(&dir) {
        Ok(0) => {}
        Ok(n) => info!("Removed {n} partial files left by a previous run"),
        Err(err) => warn!("Could not look for partial files in {}: {err}", dir.display()),
    }

    Ok(dir)
}

/// Get the playlist to archive.
///
/// A configured playlist ID or URL is looked up directly,
/// otherwise the catalog is searched interactively.
pub fn resolve_playlist<R: BufRead, W: Write>(
    catalog: &dyn Catalog,
    configured: Option<&str>,
    prompter: &mut Prompter<R, W>,
) -> Result<PlaylistRef> {
    let Some(input) = configured else {
        return search_playlist(catalog, prompter);
    };

    let id = playlist_id(input);
    debug!("Looking up playlist {id}");
    let playlist = catalog
        .playlist(id)?
        .ok_or_else(|| ConfigError::PlaylistNotFound(id.to_owned()))?;
    info!("Found playlist {playlist}");
    Ok(playlist)
}

fn search_playlist<R: BufRead, W: Write>(
    catalog: &dyn Catalog,
    prompter: &mut Prompter<R, W>,
) -> Result<PlaylistRef> {
    for attempt in 1..=SEARCH_ATTEMPTS {
        let query = prompter.ask("Search playlists:")?;
        let mut results = catalog.search_playlists(&query, SEARCH_RESULTS)?;
        if results.is_empty() {
            warn!("No playlist found for '{query}' ({attempt}/{SEARCH_ATTEMPTS})");
            continue;
        }
        results.truncate(SEARCH_RESULTS as usize);

        for (i, playlist) in results.iter().enumerate() {
            prompter.say(&format!("{:>3}. {playlist}", i + 1))?;
        }

        let answer = prompter.ask("Playlist number:")?;
        let index = answer
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=results.len()).contains(n))
            .ok_or_else(|| ConfigError::InvalidSelection {
                input: answer.clone(),
                max: results.len(),
            })?;
        return Ok(results.swap_remove(index - 1));
    }

    Err(ConfigError::NoSearchResults {
        attempts: SEARCH_ATTEMPTS,
    }
    .into())
}

/// Extract the playlist ID of a playlist URL, or return the input as is
fn playlist_id(input: &str) -> &str {
    let input = input.trim();
    let re = LIST_PARAM.get_or_init(|| Regex::new(r"[?&]list=([\w-]+)").unwrap());
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map_or(input, |m| m.as_str())
}

/// Drives the pipeline over every item of a playlist
#[derive(Debug)]
pub struct RunCoordinator<'a> {
    catalog: &'a dyn Catalog,
    pipeline: ItemPipeline<'a>,
}

impl<'a> RunCoordinator<'a> {
    pub fn new(catalog: &'a dyn Catalog, pipeline: ItemPipeline<'a>) -> Self {
        Self { catalog, pipeline }
    }

    /// Process all the playlist items, one after the other.
    ///
    /// Failing items are reported in the summary,
    /// only catalog errors while walking the playlist or authenticating stop the run.
    pub fn run(&self, playlist: &PlaylistRef, out_dir: &Path) -> Result<RunSummary> {
        info!("Archiving {playlist} into {}", out_dir.display());

        let mut summary = RunSummary::default();
        let mut walker = PlaylistWalker::new(self.catalog, &playlist.id);
        for item in walker.by_ref() {
            let mut item = item?;

            let outcome = match self.catalog.video_metadata(&item.video_id) {
                Err(err @ CatalogError::Auth { .. }) => return Err(err.into()),
                Err(err) => RunOutcome::Failed(ItemError::Catalog(err)),
                Ok(None) => RunOutcome::Failed(ItemError::Unavailable),
                Ok(Some(metadata)) => {
                    debug!("Processing {metadata}");
                    if !metadata.title.is_empty() {
                        item.title = metadata.title;
                    }
                    self.pipeline.process(&item, out_dir)
                }
            };

            match &outcome {
                RunOutcome::Completed { reused_raw } => {
                    info!("'{}' done", item.title);
                    if *reused_raw {
                        debug!("'{}' reused a previous download", item.title);
                    }
                }
                RunOutcome::Skipped => info!("'{}' already archived", item.title),
                RunOutcome::Failed(err) => warn!("'{}' failed: {err}", item.title),
            }
            summary.record(&item.title, outcome);
        }

        debug!("{} playlist pages walked", walker.pages());
        Ok(summary)
    }
}
