//! PDF text extraction utilities.
//!
//! - Parse in memory with `pdf-extract`, one string per page.
//! - Temporarily suppress stderr on Unix to avoid glyph warnings leaking onto the terminal.
//! - Pages are joined in page order with no separator.

use std::panic;
use std::sync::Mutex;

use super::ExtractError;

/// Newlines `pdf-extract` emits at the start of every page.
const PAGE_BREAK: &str = "\n\n";

/// fd 2 is process-wide; only one redirect may be active at a time.
#[cfg(unix)]
static STDERR_REDIRECT: Mutex<()> = Mutex::new(());

/// Extract the text of every page of an in-memory PDF.
///
/// A page without a text layer contributes an empty string. Malformed input
/// (including inputs that make the parser panic) is reported as
/// [`ExtractError::Pdf`].
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = with_stderr_suppressed_unix(|| {
        panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
    })
    .unwrap_or_else(|_| panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes)))
    .map_err(|_| ExtractError::Pdf("parser panicked on malformed input".into()))?
    .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    Ok(join_pages(&pages))
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| page.strip_prefix(PAGE_BREAK).unwrap_or(page))
        .collect()
}

#[cfg(unix)]
fn with_stderr_suppressed_unix<F, T>(f: F) -> std::io::Result<T>
where
    F: FnOnce() -> T,
{
    use std::fs::OpenOptions;
    use std::io;
    use std::os::unix::io::AsRawFd;

    extern "C" {
        fn dup(fd: i32) -> i32;
        fn dup2(oldfd: i32, newfd: i32) -> i32;
        fn close(fd: i32) -> i32;
    }

    // Held across save, redirect and restore. Poisoning is harmless here.
    let _guard = STDERR_REDIRECT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let null = OpenOptions::new().write(true).open("/dev/null")?;
    let null_fd = null.as_raw_fd();

    unsafe {
        let stderr_fd = 2;
        let saved = dup(stderr_fd);
        if saved == -1 {
            return Err(io::Error::last_os_error());
        }

        if dup2(null_fd, stderr_fd) == -1 {
            let _ = close(saved);
            return Err(io::Error::last_os_error());
        }

        let result = f();

        let _ = dup2(saved, stderr_fd);
        let _ = close(saved);

        Ok(result)
    }
}

#[cfg(not(unix))]
fn with_stderr_suppressed_unix<F, T>(f: F) -> std::io::Result<T>
where
    F: FnOnce() -> T,
{
    Ok(f())
}
