pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pantry")]
#[command(about = "Pantry - ingredient-driven recipe recommendations", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the embedding proxy server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Rank recipes against a set of ingredients
    Rank {
        /// Recipe corpus file (JSON array)
        #[arg(short, long)]
        corpus: PathBuf,

        /// Ingredient names to match
        #[arg(required = true)]
        ingredients: Vec<String>,

        /// Rank by embedding similarity, falling back to lexical scoring
        #[arg(long)]
        semantic: bool,

        /// Keep only recipes carrying this diet tag
        #[arg(long)]
        diet: Option<String>,

        /// Keep only recipes with this difficulty
        #[arg(long)]
        difficulty: Option<String>,

        /// Keep only recipes taking at most this many minutes
        #[arg(long)]
        max_time: Option<u32>,

        /// Show at most this many results
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show which recipes your pantry covers best
    Coverage {
        /// Recipe corpus file (JSON array)
        #[arg(short, long)]
        corpus: PathBuf,

        /// Pantry ingredient names
        #[arg(required = true)]
        ingredients: Vec<String>,

        /// Hide recipes below this match percentage
        #[arg(long, default_value_t = 0)]
        min_match: u32,

        /// Show at most this many results
        #[arg(short, long, default_value_t = 6)]
        limit: usize,
    },

    /// Check a corpus file for structural problems
    Validate {
        /// Recipe corpus file (JSON array)
        corpus: PathBuf,
    },
}
