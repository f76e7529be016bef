//! Subcommand implementations

use crate::cli::Commands;
use anyhow::{bail, Context, Result};
use app_core::{compare_versions, AppContext};
use std::cmp::Ordering;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

pub fn run(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Ls { archive, dir } => list(ctx, &archive, &dir),
        Commands::Cat { archive, path } => cat(ctx, &archive, &path),
        Commands::Extract {
            archive,
            dest,
            paths,
        } => extract(ctx, &archive, &dest, &paths),
        Commands::Preview {
            dir,
            index,
            wait_ms,
        } => preview(ctx, &dir, index, Duration::from_millis(wait_ms)),
        Commands::VersionCmp { a, b } => version_cmp(&a, &b),
    }
}

fn list(ctx: &AppContext, archive: &Path, dir: &str) -> Result<()> {
    let mut browser = ctx
        .open_archive(archive)
        .with_context(|| format!("opening {}", archive.display()))?;
    if !dir.is_empty() {
        browser.enter(dir)?;
    }

    let mut out = std::io::stdout().lock();
    for entry in browser.entries()? {
        if entry.is_dir {
            writeln!(out, "{:>12}  {}/", "<dir>", entry.name)?;
        } else {
            writeln!(out, "{:>12}  {}", entry.size, entry.name)?;
        }
    }
    Ok(())
}

fn cat(ctx: &AppContext, archive: &Path, path: &str) -> Result<()> {
    let mut browser = ctx
        .open_archive(archive)
        .with_context(|| format!("opening {}", archive.display()))?;
    let data = browser.read(path)?;

    let mut out = std::io::stdout().lock();
    out.write_all(&data)?;
    out.flush()?;
    Ok(())
}

fn extract(ctx: &AppContext, archive: &Path, dest: &Path, paths: &[String]) -> Result<()> {
    let mut browser = ctx
        .open_archive(archive)
        .with_context(|| format!("opening {}", archive.display()))?;

    if paths.is_empty() {
        let report = browser.extract_all(dest)?;
        for (path, error) in &report.failed {
            eprintln!("failed: {}: {}", path, error);
        }
        println!(
            "extracted {} file(s), {} failed",
            report.extracted.len(),
            report.failed.len()
        );
        if !report.is_complete() {
            bail!("{} member(s) could not be extracted", report.failed.len());
        }
        return Ok(());
    }

    // One failing member does not stop the rest
    let mut failed = 0;
    for path in paths {
        match browser.extract(path, dest) {
            Ok(target) => println!("{}", target.display()),
            Err(e) => {
                eprintln!("failed: {}: {}", path, e.user_message());
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{} member(s) could not be extracted", failed);
    }
    Ok(())
}

fn preview(ctx: &AppContext, dir: &Path, index: usize, wait: Duration) -> Result<()> {
    let mut session = ctx.viewer_for_directory(dir)?;
    if session.is_empty() {
        println!("no images in {}", dir.display());
        return Ok(());
    }

    let image = session.show(index)?;
    println!(
        "showing #{} {} ({}x{})",
        index,
        image.path.display(),
        image.width,
        image.height
    );

    let deadline = Instant::now() + wait;
    loop {
        let idle = session.cache().stats().loading == 0;
        session.pump();
        if idle || Instant::now() >= deadline {
            break;
        }
        if let Some(done) = session
            .cache()
            .recv_loaded_timeout(deadline.saturating_duration_since(Instant::now()))
        {
            session.cache_mut().put(done.path, done.image);
        }
    }

    let stats = session.cache().stats();
    println!(
        "cache: {}/{} resident, {} loading",
        stats.resident, stats.max_size, stats.loading
    );
    for path in session.cache().cached_paths() {
        println!("  {}", path.display());
    }
    Ok(())
}

fn version_cmp(a: &str, b: &str) -> Result<()> {
    let symbol = match compare_versions(a, b)? {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    };
    println!("{} {} {}", a, symbol, b);
    Ok(())
}
