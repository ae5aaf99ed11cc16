//! Scoped temp files
//!
//! Demonstrates the scoped executions cleaning up real files, including the
//! suppressed-error logging when both the work and a release fail.
//!
//! Run with: cargo run --example temp_files

use disposal::{using, using_all, using_all_full, AsyncDisposable, UsingError};
use std::io;
use std::path::PathBuf;

/// A scratch file removed when the scope ends.
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    async fn create(name: &str, content: &str) -> io::Result<Self> {
        let path = std::env::temp_dir().join(format!("disposal_demo_{}.txt", name));
        tokio::fs::write(&path, content).await?;
        tracing::info!(path = %path.display(), "created scratch file");
        Ok(ScratchFile { path })
    }
}

impl AsyncDisposable for ScratchFile {
    type Error = io::Error;

    async fn dispose_async(self) -> io::Result<()> {
        tokio::fs::remove_file(&self.path).await?;
        tracing::info!(path = %self.path.display(), "removed scratch file");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    // Set up tracing subscriber
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // One file, work succeeds
    let file = ScratchFile::create("single", "hello").await?;
    let content = using(file, async |f| tokio::fs::read_to_string(&f.path).await).await?;
    tracing::info!(%content, "single file read");

    // Three files released concurrently
    let files = (
        ScratchFile::create("a", "alpha").await?,
        ScratchFile::create("b", "beta").await?,
        ScratchFile::create("c", "gamma").await?,
    );
    let joined = using_all(files, async |(a, b, c)| {
        let mut parts = Vec::new();
        for f in [&*a, &*b, &*c] {
            parts.push(tokio::fs::read_to_string(&f.path).await?);
        }
        Ok::<_, io::Error>(parts.join(" "))
    })
    .await?;
    tracing::info!(%joined, "group read");

    // Work fails and one release fails: the work error stays primary
    let files = vec![
        ScratchFile::create("x", "x").await?,
        ScratchFile::create("y", "y").await?,
    ];
    let outcome = using_all_full(files, async |files| {
        tokio::fs::remove_file(&files[1].path).await?;
        Err::<(), _>(io::Error::other("report generation failed"))
    })
    .await;

    match outcome {
        Err(UsingError::Both {
            work_error,
            dispose_errors,
        }) => tracing::warn!(
            %work_error,
            suppressed = dispose_errors.len(),
            "work and release failed"
        ),
        other => tracing::info!(?other, "unexpected outcome"),
    }

    Ok(())
}
