use std::path::Path;

use tracing::{debug, info, warn};

use crate::{
    artifacts::{file_stem, ArtifactPaths, ArtifactStore},
    downloader::StreamFetcher,
    outside::{AudioTranscoder, StreamResolver},
    result::{ItemError, ResolutionError},
    selector::StreamSelector,
    types::{Extension, PlaylistItem, RunOutcome},
};

/// Acquires the audio file of a single playlist item.
///
/// Each stage is skipped when its artifact is already on disk,
/// so that an interrupted run can be resumed by running it again.
#[derive(Debug)]
pub struct ItemPipeline<'a> {
    resolver: &'a dyn StreamResolver,
    fetcher: &'a dyn StreamFetcher,
    transcoder: &'a dyn AudioTranscoder,
    selector: StreamSelector,
    store: ArtifactStore,
}

impl<'a> ItemPipeline<'a> {
    pub fn new(
        resolver: &'a dyn StreamResolver,
        fetcher: &'a dyn StreamFetcher,
        transcoder: &'a dyn AudioTranscoder,
        container: Extension,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            transcoder,
            selector: StreamSelector::new(container),
            store: ArtifactStore::new(container),
        }
    }

    /// Process the item, never failing: errors are reported in the outcome
    pub fn process(&self, item: &PlaylistItem, out_dir: &Path) -> RunOutcome {
        match self.try_process(item, out_dir) {
            Ok(outcome) => outcome,
            Err(err) => RunOutcome::Failed(err),
        }
    }

    fn try_process(&self, item: &PlaylistItem, out_dir: &Path) -> Result<RunOutcome, ItemError> {
        // Some titles are only made of forbidden characters
        let name = if file_stem(&item.title).is_empty() {
            &item.video_id
        } else {
            &item.title
        };
        let paths = self.store.paths(out_dir, name);

        if self.store.transcoded_exists(&paths) {
            debug!("'{}' already converted. Skipping it", item.title);
            self.remove_raw(&paths);
            return Ok(RunOutcome::Skipped);
        }

        let reused_raw = self.store.raw_exists(&paths);
        if reused_raw {
            info!("Converting '{}' downloaded by a previous run", item.title);
        } else {
            let candidates = self.resolver.resolve_streams(&item.video_id)?;
            if candidates.is_empty() {
                return Err(ResolutionError::NoCandidates.into());
            }
            let stream = self.selector.select(candidates, self.resolver)?;

            info!("Downloading '{}' ({stream})", item.title);
            self.fetcher.fetch(&stream, &paths.raw, &mut |percent| {
                info!("'{}': {percent}%", item.title);
            })?;
        }

        info!("Converting '{}'", item.title);
        self.transcoder
            .convert(&paths.raw, &paths.transcoded, out_dir)?;

        self.remove_raw(&paths);
        Ok(RunOutcome::Completed { reused_raw })
    }

    /// Delete the raw file once the audio file exists.
    /// The audio file is what matters, so failing here is not an error.
    fn remove_raw(&self, paths: &ArtifactPaths) {
        if !(self.store.raw_exists(paths) && self.store.transcoded_exists(paths)) {
            return;
        }

        match self.store.remove_raw(paths) {
            Ok(()) => debug!("Removed {}", paths.raw.display()),
            Err(err) => warn!("Could not remove {}: {err}", paths.raw.display()),
        }
    }
}
