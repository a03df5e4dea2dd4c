use std::path::{Path, PathBuf};

use tokio::{fs::File, io::AsyncWriteExt};

/// Replaces the contents of `path` so that readers see either the old or the new file, never a
/// half written one. The data goes to a sibling temporary file first, which is then renamed
/// over the target.
pub async fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), std::io::Error> {
    let temporary = temporary_path(path);
    let mut file = File::create(&temporary).await?;
    file.write_all(contents).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&temporary, path).await
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
