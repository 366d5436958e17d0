// Archive formats understood by the installer

use serde::Serialize;

/// Closed set of extraction strategies, chosen from the archive filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    /// Resolve the format from a filename suffix (case-insensitive).
    ///
    /// Returns `None` for anything other than `.zip`, `.tar.gz` or `.tgz`.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_suffix() {
        assert_eq!(
            ArchiveFormat::from_filename("bitwindow.zip"),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(
            ArchiveFormat::from_filename("grpcurl.tar.gz"),
            Some(ArchiveFormat::TarGz)
        );
        assert_eq!(
            ArchiveFormat::from_filename("THUNDER.ZIP"),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(ArchiveFormat::from_filename("bitcoind.tar.xz"), None);
        // A ".gz" that is not a tarball is not an archive we can install
        assert_eq!(ArchiveFormat::from_filename("notes.gz"), None);
    }
}
