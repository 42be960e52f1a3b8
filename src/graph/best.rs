use crate::error::{Error, NotFoundReason, Result};
use crate::options::ScoringMode;

use super::tree::ScoringNode;

/// Turn the tree's best node into a result or a mode-specific `NotFound`.
///
/// A negative score means nothing qualified: no measurable image in image
/// mode, no relevant element with text in the target language in text mode.
pub fn resolve_best<'n, 'a>(
    best: &'n ScoringNode<'a>,
    mode: ScoringMode,
) -> Result<&'n ScoringNode<'a>> {
    if !best.is_excluded() {
        return Ok(best);
    }
    let reason = match mode {
        ScoringMode::Image => NotFoundReason::NoQualifyingImage,
        ScoringMode::Text { language } => NotFoundReason::NoTextInLanguage(language),
    };
    Err(Error::NotFound(reason))
}
