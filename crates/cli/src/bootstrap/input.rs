use anyhow::anyhow;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, BufReader};

pub type NameSource = Box<dyn AsyncBufRead + Unpin + Send>;

/// The named file, or standard input when no path is given.
pub async fn open_input(path: Option<&str>) -> anyhow::Result<NameSource> {
    let Some(path) = path else {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    };

    let file = File::open(path)
        .await
        .map_err(|e| anyhow!("Failed to open {}: {}", path, e))?;
    Ok(Box::new(BufReader::new(file)))
}
