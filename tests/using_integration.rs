//! Integration tests for scoped executions with real file I/O.
//!
//! These tests verify that scoped files are always removed, whatever the
//! work does with them.

use disposal::{
    on_dispose_async, using, using_all, using_all_full, using_all_sync, using_full, using_sync,
    AsyncDisposable, Disposable, UsingError,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Helper to create a unique temp file path
fn temp_file_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("disposal_using_test_{}.txt", name))
}

/// A temp file removed synchronously on dispose.
#[derive(Debug)]
struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn create(name: &str, content: &str) -> io::Result<Self> {
        let path = temp_file_path(name);
        std::fs::write(&path, content)?;
        Ok(TempFile { path })
    }

    fn read(&self) -> io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}

impl Disposable for TempFile {
    type Error = io::Error;

    fn dispose(self) -> io::Result<()> {
        std::fs::remove_file(&self.path)
    }
}

/// A temp file removed with tokio's async file API on dispose.
#[derive(Debug)]
struct AsyncTempFile {
    path: PathBuf,
}

impl AsyncTempFile {
    async fn create(name: &str, content: &str) -> io::Result<Self> {
        let path = temp_file_path(name);
        tokio::fs::write(&path, content).await?;
        Ok(AsyncTempFile { path })
    }
}

impl AsyncDisposable for AsyncTempFile {
    type Error = io::Error;

    async fn dispose_async(self) -> io::Result<()> {
        tokio::fs::remove_file(&self.path).await
    }
}

fn exists(path: &Path) -> bool {
    path.exists()
}

// ============================================================================
// Single resource
// ============================================================================

#[test]
fn using_sync_removes_file_on_success() {
    let file = TempFile::create("sync_success", "test content").unwrap();
    let path = file.path.clone();

    let result = using_sync(file, |f| f.read());

    assert_eq!(result.unwrap(), "test content");
    assert!(!exists(&path), "temp file should be deleted");
}

#[test]
fn using_sync_removes_file_on_work_failure() {
    let file = TempFile::create("sync_failure", "test content").unwrap();
    let path = file.path.clone();

    let result = using_sync(file, |_| Err::<(), _>(io::Error::other("use failed")));

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "use failed");
    assert!(!exists(&path), "temp file should be deleted despite failure");
}

#[tokio::test]
async fn using_removes_async_file_on_success() {
    let file = AsyncTempFile::create("async_success", "hello").await.unwrap();
    let path = file.path.clone();

    let result = using(file, async |f| tokio::fs::read_to_string(&f.path).await).await;

    assert_eq!(result.unwrap(), "hello");
    assert!(!exists(&path));
}

#[tokio::test]
async fn using_removes_sync_file_from_async_work() {
    let file = TempFile::create("sync_in_async", "mixed").unwrap();
    let path = file.path.clone();

    let result = using(file, async |f| {
        tokio::task::yield_now().await;
        f.read()
    })
    .await;

    assert_eq!(result.unwrap(), "mixed");
    assert!(!exists(&path));
}

#[tokio::test]
async fn using_reports_release_failure_when_work_succeeds() {
    let file = AsyncTempFile::create("already_gone", "content").await.unwrap();

    // Work removes the file itself, so the release hits NotFound.
    let result = using(file, async |f| tokio::fs::remove_file(&f.path).await).await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}

#[tokio::test]
async fn using_full_keeps_work_error_primary() {
    let file = AsyncTempFile::create("both_errors", "content").await.unwrap();

    let result = using_full(file, async |f| {
        tokio::fs::remove_file(&f.path).await?;
        Err::<(), _>(io::Error::other("use failed"))
    })
    .await;

    match result {
        Err(UsingError::Both {
            work_error,
            dispose_errors,
        }) => {
            assert!(work_error.to_string().contains("use failed"));
            assert_eq!(dispose_errors.len(), 1);
            assert_eq!(dispose_errors.as_slice()[0].kind(), io::ErrorKind::NotFound);
        }
        other => panic!("expected Both, got {:?}", other),
    }
}

// ============================================================================
// Resource groups
// ============================================================================

#[test]
fn using_all_sync_removes_every_file() {
    let files = vec![
        TempFile::create("group_sync_1", "one").unwrap(),
        TempFile::create("group_sync_2", "two").unwrap(),
        TempFile::create("group_sync_3", "three").unwrap(),
    ];
    let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();

    let result = using_all_sync(files, |files| {
        let contents = files.iter().map(TempFile::read).collect::<io::Result<Vec<_>>>()?;
        Ok::<_, io::Error>(contents.join(" + "))
    });

    assert_eq!(result.unwrap(), "one + two + three");
    for path in paths {
        assert!(!exists(&path), "{:?} should be deleted", path);
    }
}

#[test]
fn using_all_sync_still_removes_later_files_after_failed_release() {
    let first = TempFile::create("partial_1", "one").unwrap();
    let second = TempFile::create("partial_2", "two").unwrap();
    let third = TempFile::create("partial_3", "three").unwrap();
    let third_path = third.path.clone();

    // Removing the second file early makes its release fail.
    std::fs::remove_file(&second.path).unwrap();

    let result = using_all_sync((first, second, third), |(first, _, third)| {
        Ok::<_, io::Error>(format!("{} {}", first.read()?, third.read()?))
    });

    assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    assert!(!exists(&third_path), "third file must still be released");
}

#[tokio::test]
async fn using_all_removes_mixed_files_concurrently() {
    let sync_file = TempFile::create("group_mixed_sync", "sync").unwrap();
    let async_file = AsyncTempFile::create("group_mixed_async", "async").await.unwrap();
    let sync_path = sync_file.path.clone();
    let async_path = async_file.path.clone();

    let result = using_all((sync_file, async_file), async |(s, a)| {
        let a_content = tokio::fs::read_to_string(&a.path).await?;
        Ok::<_, io::Error>(format!("{} + {}", s.read()?, a_content))
    })
    .await;

    assert_eq!(result.unwrap(), "sync + async");
    assert!(!exists(&sync_path));
    assert!(!exists(&async_path));
}

#[tokio::test]
async fn using_all_full_collects_every_release_failure() {
    let files = vec![
        AsyncTempFile::create("collect_1", "1").await.unwrap(),
        AsyncTempFile::create("collect_2", "2").await.unwrap(),
        AsyncTempFile::create("collect_3", "3").await.unwrap(),
    ];
    let survivor = files[1].path.clone();

    let result = using_all_full(files, async |files| {
        tokio::fs::remove_file(&files[0].path).await?;
        tokio::fs::remove_file(&files[2].path).await?;
        Ok::<_, io::Error>(())
    })
    .await;

    let err = result.unwrap_err();
    assert!(!err.is_work());
    assert_eq!(err.dispose_errors().len(), 2);
    assert!(err
        .dispose_errors()
        .iter()
        .all(|e| e.kind() == io::ErrorKind::NotFound));
    assert!(!exists(&survivor));
}

#[tokio::test]
async fn using_all_with_closure_adapters() {
    let releases = Arc::new(AtomicUsize::new(0));
    let make = |value: u32| {
        let releases = releases.clone();
        on_dispose_async(value, move |_| async move {
            tokio::task::yield_now().await;
            releases.fetch_add(1, Ordering::SeqCst);
            Ok::<_, io::Error>(())
        })
    };

    let result = using_all([make(1), make(2), make(3)], async |values| {
        Ok::<_, io::Error>(values.iter().map(|v| **v).sum::<u32>())
    })
    .await;

    assert_eq!(result.unwrap(), 6);
    assert_eq!(releases.load(Ordering::SeqCst), 3);
}
