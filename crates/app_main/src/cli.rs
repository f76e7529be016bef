use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse archives and image folders", long_about = None)]
pub struct Args {
    /// Configuration file to use instead of the per-user one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// List the entries of one directory inside an archive.
    Ls {
        archive: PathBuf,

        /// Virtual directory inside the archive, e.g. `chapter1/extras`. Defaults to the root.
        #[arg(default_value = "")]
        dir: String,
    },

    /// Write one archive member to stdout.
    Cat { archive: PathBuf, path: String },

    /// Extract members (or the whole archive) into a directory.
    Extract {
        archive: PathBuf,
        dest: PathBuf,

        /// Members to extract. Everything when omitted.
        paths: Vec<String>,
    },

    /// Open a viewer session over the images in a directory and report cache state.
    Preview {
        dir: PathBuf,

        /// Image to show first (0-based, in natural name order).
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// How long to wait for neighbour prefetches, in milliseconds.
        #[arg(long, default_value_t = 2000)]
        wait_ms: u64,
    },

    /// Compare two dotted version strings.
    VersionCmp { a: String, b: String },
}
