// SPDX-License-Identifier: Apache-2.0

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;

/// Applies one layer archive onto a target directory.
///
/// The pipeline holds this as a trait object so tests can substitute
/// the extractor.
pub trait Extract {
    fn extract(&self, archive: &Path, rootfs: &Path) -> std::io::Result<()>;
}

/// Gzip-compressed tar archives, the only form the registry serves.
#[derive(Clone, Copy, Debug, Default)]
pub struct TarGz;

impl Extract for TarGz {
    fn extract(&self, archive: &Path, rootfs: &Path) -> std::io::Result<()> {
        let file = BufReader::new(File::open(archive)?);

        let mut tarball = Archive::new(GzDecoder::new(file));
        tarball.set_preserve_permissions(true);
        tarball.set_overwrite(true);
        tarball.unpack(rootfs)
    }
}
