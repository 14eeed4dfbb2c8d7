use crate::corpus::Corpus;
use serde::Serialize;

/// How well one recipe is covered by the pantry.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageEntry {
    pub id: String,
    pub title: String,
    /// Rounded percentage of recipe ingredients matched, 0 to 100.
    pub percent: u32,
    pub matched: usize,
    /// Normalized names of ingredients the pantry does not cover.
    pub missing: Vec<String>,
}

/// Lower-case, drop everything outside letters, digits and spaces, and
/// trim. Looser than the ranking tokenizer on purpose: coverage matches
/// whole ingredient phrases, not tokens.
fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string()
}

fn covered(name: &str, pantry: &[String]) -> bool {
    // Substring containment in either direction, so "egg" covers
    // "egg yolk" and "large egg" covers "egg"
    pantry
        .iter()
        .any(|p| name.contains(p.as_str()) || p.contains(name))
}

/// Score every recipe by the share of its ingredients the pantry covers,
/// sorted by descending coverage with corpus order breaking ties. An
/// empty pantry covers nothing; a recipe without ingredients scores 0.
pub fn coverage(corpus: &Corpus, pantry: &[String]) -> Vec<CoverageEntry> {
    let pantry: Vec<String> = pantry
        .iter()
        .map(|p| normalize(p))
        .filter(|p| !p.is_empty())
        .collect();

    let mut entries: Vec<CoverageEntry> = corpus
        .iter()
        .map(|recipe| {
            let names: Vec<String> = recipe
                .ingredients
                .iter()
                .map(|i| normalize(&i.name))
                .collect();

            let matched = names.iter().filter(|n| covered(n, &pantry)).count();
            let missing: Vec<String> = names
                .iter()
                .filter(|n| !covered(n, &pantry))
                .cloned()
                .collect();

            let percent = if names.is_empty() {
                0
            } else {
                ((matched as f64 / names.len() as f64) * 100.0).round() as u32
            };

            CoverageEntry {
                id: recipe.id.clone(),
                title: recipe.title.clone(),
                percent,
                matched,
                missing,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.percent.cmp(&a.percent));
    entries
}
