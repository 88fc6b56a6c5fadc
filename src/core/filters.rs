use crate::models::{ExperienceLevel, WorkStyle};

/// Lower-case and trim free-text entries, dropping blanks
pub fn fold_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Loose term match: either folded term contains the other
#[inline]
pub fn terms_overlap(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Count the targets that loosely match at least one of the pool's terms.
///
/// Both slices must already be folded with [`fold_terms`].
pub fn count_matched(targets: &[String], pool: &[String]) -> usize {
    targets
        .iter()
        .filter(|target| pool.iter().any(|term| terms_overlap(term, target)))
        .count()
}

/// Check whether a role's deal-breakers rule this candidate out
///
/// A keyword heuristic over the joined deal-breaker text: it catches
/// phrasings like "no remote", "not remote", "no junior" and
/// "no entry level". Anything subtler is a false negative.
pub fn has_deal_breaker(
    candidate_level: Option<ExperienceLevel>,
    work_style_preference: Option<WorkStyle>,
    deal_breakers: &[String],
) -> bool {
    if deal_breakers.is_empty() {
        return false;
    }

    let text = deal_breakers.join(" ").to_lowercase();

    if let Some(style) = work_style_preference {
        let style = style.as_str();
        if text.contains(&format!("no {}", style)) || text.contains(&format!("not {}", style)) {
            return true;
        }
    }

    if let Some(level) = candidate_level {
        if text.contains(&format!("no {}", level.as_str())) {
            return true;
        }
        if level == ExperienceLevel::Junior
            && (text.contains("no junior") || text.contains("no entry"))
        {
            return true;
        }
    }

    false
}
