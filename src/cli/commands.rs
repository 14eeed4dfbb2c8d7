use crate::config::Settings;
use crate::corpus::{Corpus, Recipe, RecipeFilter};
use crate::embed::EmbedClient;
use crate::matcher::{self, LexicalIndex, Scored, SemanticMatcher};
use crate::Result;
use std::path::Path;
use std::time::Duration;

/// Rank a corpus against the given ingredients and print the results
pub async fn rank(
    settings: &Settings,
    corpus_path: &Path,
    ingredients: Vec<String>,
    semantic: bool,
    filter: RecipeFilter,
    limit: usize,
) -> Result<()> {
    let corpus = Corpus::from_file(corpus_path)?;
    let index = LexicalIndex::build(&corpus);

    let ranked = if semantic {
        let client = EmbedClient::new(
            &settings.embed.server_url,
            Duration::from_secs(settings.embed.timeout_seconds),
        )?;
        let matcher = SemanticMatcher::new(client, settings.embed.concurrency);
        matcher.rank(&corpus, &index, &ingredients).await
    } else {
        matcher::rank(&index, &ingredients)
    };

    print_ranked(&corpus, &ranked, &filter, limit);
    Ok(())
}

/// Report how much of each recipe the pantry already covers
pub fn coverage(
    corpus_path: &Path,
    ingredients: Vec<String>,
    min_match: u32,
    limit: usize,
) -> Result<()> {
    let corpus = Corpus::from_file(corpus_path)?;
    let report = matcher::coverage(&corpus, &ingredients);

    let rows: Vec<_> = report
        .iter()
        .filter(|e| e.percent >= min_match)
        .take(limit)
        .collect();

    if rows.is_empty() {
        println!("No recipes at or above {min_match}% coverage");
        return Ok(());
    }

    println!("\n{:<40} {:>7} {:<30}", "Title", "Match", "Missing");
    println!("{}", "-".repeat(79));

    for entry in rows {
        println!(
            "{:<40} {:>6}% {:<30}",
            truncate(&entry.title, 38),
            entry.percent,
            truncate(&entry.missing.join(", "), 28)
        );
    }

    Ok(())
}

/// Validate a corpus file and print a short summary
pub fn validate(corpus_path: &Path) -> Result<()> {
    let corpus = Corpus::from_file(corpus_path)?;
    let index = LexicalIndex::build(&corpus);

    println!("✓ Corpus OK: {} recipes", corpus.len());
    println!("  Vocabulary: {} distinct tokens", index.vocabulary_size());
    println!("  Fingerprint: {}", corpus.fingerprint());

    let without_ingredients: Vec<&str> = corpus
        .iter()
        .filter(|r| r.ingredients.is_empty())
        .map(|r| r.id.as_str())
        .collect();
    if !without_ingredients.is_empty() {
        println!(
            "  Note: {} recipes have no ingredients: {}",
            without_ingredients.len(),
            without_ingredients.join(", ")
        );
    }

    Ok(())
}

fn print_ranked(corpus: &Corpus, ranked: &[Scored], filter: &RecipeFilter, limit: usize) {
    let rows: Vec<(&Scored, &Recipe)> = ranked
        .iter()
        .filter_map(|s| corpus.get(&s.id).map(|r| (s, r)))
        .filter(|(_, r)| filter.matches(r))
        .take(limit)
        .collect();

    if rows.is_empty() {
        println!("No recipes matched");
        return;
    }

    println!("\n{:<20} {:<40} {:>8}", "ID", "Title", "Score");
    println!("{}", "-".repeat(70));

    for (scored, recipe) in rows {
        println!(
            "{:<20} {:<40} {:>8.3}",
            truncate(&scored.id, 18),
            truncate(&recipe.title, 38),
            scored.score
        );
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    // Back up to a char boundary so a multibyte title never splits
    // mid-character
    let mut cut = max_len.saturating_sub(3);
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &s[..cut])
}
