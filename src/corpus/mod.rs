use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    /// Display name; a document is valid with just an id and ingredients
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub ingredients: Vec<Ingredient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    /// Total time in minutes
    #[serde(default, rename = "time", skip_serializing_if = "Option::is_none")]
    pub time_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diet: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl Recipe {
    /// Ingredient names joined with single spaces, the text both the
    /// lexical index and the embedding path score against.
    pub fn ingredient_text(&self) -> String {
        self.ingredients
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An ordered recipe collection. Order is load order and is observable:
/// ranking ties resolve to the earlier recipe.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    recipes: Vec<Recipe>,
}

impl Corpus {
    /// Build a corpus from already-parsed recipes, validating ids.
    pub fn from_recipes(recipes: Vec<Recipe>) -> Result<Self> {
        let corpus = Corpus { recipes };
        corpus.validate()?;
        Ok(corpus)
    }

    /// Parse a corpus from a JSON array of recipes.
    pub fn from_json(content: &str) -> Result<Self> {
        let recipes: Vec<Recipe> = serde_json::from_str(content)
            .map_err(|e| Error::CorpusParse(format!("Failed to parse corpus: {e}")))?;

        debug!(count = recipes.len(), "Loaded recipe corpus");
        Self::from_recipes(recipes)
    }

    /// Load a corpus from a JSON file holding an array of recipes.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::CorpusParse(format!(
                "Failed to read corpus from {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_json(&content).map_err(|e| match e {
            Error::CorpusParse(msg) => {
                Error::CorpusParse(format!("{}: {}", path.as_ref().display(), msg))
            }
            other => other,
        })
    }

    /// Check corpus-level invariants: every recipe has a non-empty id and
    /// no id appears twice. Recipes with no ingredients are allowed, they
    /// simply never score above zero.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (index, recipe) in self.recipes.iter().enumerate() {
            if recipe.id.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "Recipe #{} has an empty id",
                    index + 1
                )));
            }
            if !seen.insert(&recipe.id) {
                return Err(Error::Validation(format!(
                    "Duplicate recipe id: {}",
                    recipe.id
                )));
            }
            if recipe.ingredients.is_empty() {
                debug!(id = %recipe.id, "Recipe has no ingredients");
            }
        }
        Ok(())
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    /// Content fingerprint over ids and ingredient text in corpus order.
    /// Any change to membership, order, or ingredients yields a new value,
    /// which is what keys the semantic embedding cache.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for recipe in &self.recipes {
            hasher.update(recipe.id.as_bytes());
            hasher.update([0x1f]);
            hasher.update(recipe.ingredient_text().as_bytes());
            hasher.update([0x1e]);
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Metadata filter applied after ranking. Every criterion left unset
/// passes everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeFilter {
    pub diet: Option<String>,
    pub difficulty: Option<String>,
    pub max_time: Option<u32>,
}

impl RecipeFilter {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(diet) = &self.diet {
            if !recipe.diet.iter().any(|d| d == diet) {
                return false;
            }
        }
        if let Some(difficulty) = &self.difficulty {
            if recipe.difficulty.as_deref() != Some(difficulty.as_str()) {
                return false;
            }
        }
        if let Some(max) = self.max_time {
            // Recipes without a time pass: absence is not a violation
            if recipe.time_minutes.is_some_and(|t| t > max) {
                return false;
            }
        }
        true
    }
}
