use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_secs(1);

/// Writes `lines` one at a time, `delay` apart, until `cancel` resolves.
///
/// Returns how many lines were written.
pub async fn reveal<W, F>(lines: &[String], delay: Duration, cancel: F, out: &mut W) -> io::Result<usize>
where
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(cancel);

    for (shown, line) in lines.iter().enumerate() {
        if shown > 0 && !delay.is_zero() {
            tokio::select! {
                _ = &mut cancel => return Ok(shown),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        writeln!(out, "{}", line)?;
        out.flush()?;
    }

    Ok(lines.len())
}
