use tracing::debug;

use crate::{
    outside::StreamResolver,
    result::SelectError,
    types::{Extension, StreamDescriptor},
};

/// Picks the stream to download among the candidates of a video
#[derive(Debug, Clone, Copy)]
pub struct StreamSelector {
    container: Extension,
}

impl StreamSelector {
    pub fn new(container: Extension) -> Self {
        Self { container }
    }

    /// Select the stream with the highest audio bitrate in the wanted container.
    ///
    /// On equal bitrates, the first candidate wins.
    /// The returned stream is decrypted and ready to be downloaded.
    pub fn select(
        &self,
        candidates: Vec<StreamDescriptor>,
        resolver: &dyn StreamResolver,
    ) -> Result<StreamDescriptor, SelectError> {
        let bitrate = |stream: &StreamDescriptor| stream.audio_bitrate.unwrap_or_default();

        let mut best: Option<StreamDescriptor> = None;
        for candidate in candidates
            .into_iter()
            .filter(|c| c.container == Some(self.container) && c.has_audio_bitrate())
        {
            let is_better = best
                .as_ref()
                .map_or(true, |current| bitrate(&candidate) > bitrate(current));
            if is_better {
                best = Some(candidate);
            }
        }

        let mut chosen = best.ok_or(SelectError::NoCandidate {
            container: self.container,
        })?;
        debug!("Selected {chosen}");

        if chosen.requires_decryption {
            debug!("Decrypting the URL of format {}", chosen.format_id);
            resolver
                .decrypt(&mut chosen)
                .map_err(SelectError::Decrypt)?;
        }

        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::result::ResolutionError;

    #[derive(Debug, Default)]
    struct FakeResolver {
        decrypted: Cell<usize>,
        fail: bool,
    }

    impl StreamResolver for FakeResolver {
        fn resolve_streams(&self, _: &str) -> Result<Vec<StreamDescriptor>, ResolutionError> {
            unreachable!("the selector never resolves streams")
        }

        fn decrypt(&self, stream: &mut StreamDescriptor) -> Result<(), ResolutionError> {
            self.decrypted.set(self.decrypted.get() + 1);
            if self.fail {
                return Err(ResolutionError::Failed { code: Some(1) });
            }
            stream.url = Some(format!("https://signed.example/{}", stream.format_id));
            stream.requires_decryption = false;
            Ok(())
        }
    }

    fn stream(format_id: &str, container: Extension, abr: Option<f64>) -> StreamDescriptor {
        StreamDescriptor {
            video_id: "vid".to_owned(),
            format_id: format_id.to_owned(),
            container: Some(container),
            audio_bitrate: abr,
            height: None,
            filesize: None,
            requires_decryption: false,
            url: Some(format!("https://media.example/{format_id}")),
        }
    }

    #[test]
    fn highest_bitrate_wins() {
        let selector = StreamSelector::new(Extension::M4a);
        let candidates = vec![
            stream("a", Extension::M4a, Some(64.0)),
            stream("b", Extension::M4a, Some(128.0)),
            stream("c", Extension::M4a, Some(96.0)),
        ];

        let chosen = selector
            .select(candidates, &FakeResolver::default())
            .unwrap();
        assert_eq!(chosen.format_id, "b");
    }

    #[test]
    fn ties_keep_discovery_order() {
        let selector = StreamSelector::new(Extension::M4a);
        let candidates = vec![
            stream("first", Extension::M4a, Some(128.0)),
            stream("second", Extension::M4a, Some(128.0)),
        ];

        let chosen = selector
            .select(candidates, &FakeResolver::default())
            .unwrap();
        assert_eq!(chosen.format_id, "first");
    }

    #[test]
    fn other_containers_and_unknown_bitrates_are_ignored() {
        let selector = StreamSelector::new(Extension::M4a);
        let candidates = vec![
            stream("webm", Extension::Webm, Some(160.0)),
            stream("unknown", Extension::M4a, None),
            stream("zero", Extension::M4a, Some(0.0)),
            stream("ok", Extension::M4a, Some(48.0)),
        ];

        let chosen = selector
            .select(candidates, &FakeResolver::default())
            .unwrap();
        assert_eq!(chosen.format_id, "ok");
    }

    #[test]
    fn no_candidate_left() {
        let selector = StreamSelector::new(Extension::M4a);
        let resolver = FakeResolver::default();

        let err = selector.select(vec![], &resolver).unwrap_err();
        assert!(matches!(err, SelectError::NoCandidate { .. }));

        let err = selector
            .select(
                vec![
                    stream("webm", Extension::Webm, Some(160.0)),
                    stream("mp4", Extension::Mp4, Some(128.0)),
                ],
                &resolver,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            SelectError::NoCandidate {
                container: Extension::M4a
            }
        ));
    }

    #[test]
    fn chosen_stream_is_decrypted_exactly_once() {
        let selector = StreamSelector::new(Extension::M4a);
        let resolver = FakeResolver::default();

        let mut encrypted = stream("enc", Extension::M4a, Some(128.0));
        encrypted.requires_decryption = true;
        encrypted.url = None;
        let mut other = stream("other", Extension::M4a, Some(64.0));
        other.requires_decryption = true;

        let chosen = selector.select(vec![other, encrypted], &resolver).unwrap();
        assert_eq!(resolver.decrypted.get(), 1);
        assert!(!chosen.requires_decryption);
        assert_eq!(chosen.url.as_deref(), Some("https://signed.example/enc"));
    }

    #[test]
    fn plain_stream_is_not_decrypted() {
        let selector = StreamSelector::new(Extension::M4a);
        let resolver = FakeResolver::default();

        selector
            .select(vec![stream("plain", Extension::M4a, Some(64.0))], &resolver)
            .unwrap();
        assert_eq!(resolver.decrypted.get(), 0);
    }

    #[test]
    fn decryption_failure_is_reported() {
        let selector = StreamSelector::new(Extension::M4a);
        let resolver = FakeResolver {
            fail: true,
            ..Default::default()
        };

        let mut encrypted = stream("enc", Extension::M4a, Some(128.0));
        encrypted.requires_decryption = true;

        let err = selector.select(vec![encrypted], &resolver).unwrap_err();
        assert!(matches!(err, SelectError::Decrypt(_)));
    }
}
