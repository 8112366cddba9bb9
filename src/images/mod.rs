//! Image collaborator boundary
//!
//! The engine never fetches images. Callers that render the current match
//! ask an `ImageProvider` for each participant's URLs after reading the
//! view, and treat a failed lookup as "no images".

use thiserror::Error;

use crate::types::{ContestantId, CurrentMatchView, MatchContestantView};

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image lookup failed for contestant {id}: {reason}")]
    Lookup { id: ContestantId, reason: String },
}

/// Source of participant image URLs
pub trait ImageProvider: Send + Sync {
    /// A short ordered list of URLs for one contestant
    fn image_urls(&self, id: ContestantId, name: &str) -> Result<Vec<String>, ImageError>;
}

/// Provider that never has images
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImages;

impl ImageProvider for NoImages {
    fn image_urls(&self, _id: ContestantId, _name: &str) -> Result<Vec<String>, ImageError> {
        Ok(Vec::new())
    }
}

/// Provider that expands a URL template
///
/// `{id}` becomes the contestant id and `{name}` the name with every
/// character outside `[A-Za-z0-9-_.~]` percent-encoded.
#[derive(Debug, Clone)]
pub struct UrlTemplateImages {
    template: String,
}

impl UrlTemplateImages {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl ImageProvider for UrlTemplateImages {
    fn image_urls(&self, id: ContestantId, name: &str) -> Result<Vec<String>, ImageError> {
        if !self.template.contains("{id}") && !self.template.contains("{name}") {
            return Err(ImageError::Lookup {
                id,
                reason: "template has no {id} or {name} placeholder".to_string(),
            });
        }
        let url = self
            .template
            .replace("{id}", &id.to_string())
            .replace("{name}", &urlencoding::encode(name));
        Ok(vec![url])
    }
}

/// Fill both participants' image lists, leaving a list empty on failure
pub fn enrich_current_match(view: &mut CurrentMatchView, provider: &dyn ImageProvider) {
    for contestant in [&mut view.contestant1, &mut view.contestant2] {
        enrich_contestant(contestant, provider);
    }
}

fn enrich_contestant(contestant: &mut MatchContestantView, provider: &dyn ImageProvider) {
    match provider.image_urls(contestant.id, &contestant.name) {
        Ok(urls) => contestant.image_urls = urls,
        Err(err) => {
            tracing::warn!(contestant_id = %contestant.id, error = %err, "Image lookup failed");
            contestant.image_urls.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchId, TournamentId};

    struct Failing;

    impl ImageProvider for Failing {
        fn image_urls(&self, id: ContestantId, _name: &str) -> Result<Vec<String>, ImageError> {
            Err(ImageError::Lookup {
                id,
                reason: "offline".to_string(),
            })
        }
    }

    fn participant(id: u64, name: &str) -> MatchContestantView {
        MatchContestantView {
            id: ContestantId(id),
            name: name.to_string(),
            nationality: None,
            ranking_points: 1000,
            rank: None,
            image_urls: Vec::new(),
        }
    }

    fn view() -> CurrentMatchView {
        CurrentMatchView {
            match_id: MatchId(1),
            tournament_id: TournamentId(1),
            round: 1,
            match_number: 1,
            round_name: "Round of 64".to_string(),
            contestant1: participant(1, "Ada Lovelace"),
            contestant2: participant(2, "Grace"),
        }
    }

    #[test]
    fn test_template_expansion() {
        let provider = UrlTemplateImages::new("https://img.test/{id}/{name}.jpg");
        let mut v = view();
        enrich_current_match(&mut v, &provider);
        assert_eq!(v.contestant1.image_urls, vec!["https://img.test/1/Ada%20Lovelace.jpg"]);
        assert_eq!(v.contestant2.image_urls, vec!["https://img.test/2/Grace.jpg"]);
    }

    #[test]
    fn test_failure_leaves_lists_empty() {
        let mut v = view();
        v.contestant1.image_urls.push("stale".to_string());
        enrich_current_match(&mut v, &Failing);
        assert!(v.contestant1.image_urls.is_empty());
        assert!(v.contestant2.image_urls.is_empty());
    }

    #[test]
    fn test_no_images() {
        let mut v = view();
        enrich_current_match(&mut v, &NoImages);
        assert!(v.contestant1.image_urls.is_empty());
    }
}
