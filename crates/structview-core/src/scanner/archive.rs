/// Archive listing: zip and the tar family.
///
/// Archives are never extracted. The member list is read, directory members
/// are dropped, and each member path is split on `/` into a synthetic folder
/// tree whose nodes are [`NodeKind::ArchiveFolder`]. Members are then counted
/// exactly like files on disk.
///
/// Format detection looks at magic bytes first and falls back to the file
/// name. A compressed stream under any other name is still a tar archive
/// when its first decompressed block carries the `ustar` marker. 7z and RAR
/// archives are recognised but not readable.
use super::fs::root_display_name;
use super::tally::TallyTree;
use crate::error::{AnalyzeError, Result};
use crate::model::NodeKind;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Bytes inspected for magic numbers. Covers the `ustar` marker at offset 257.
const SNIFF_LEN: u64 = 512;

const ZIP_MAGICS: &[&[u8]] = &[b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"];
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
const SEVEN_ZIP_MAGIC: &[u8] = &[b'7', b'z', 0xbc, 0xaf, 0x27, 0x1c];
const RAR_MAGIC: &[u8] = b"Rar!\x1a\x07";
const USTAR_OFFSET: usize = 257;

/// Archive formats recognised by [`detect_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarBz2,
    TarXz,
    SevenZip,
    Rar,
}

impl ArchiveFormat {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::TarXz => "tar.xz",
            Self::SevenZip => "7z",
            Self::Rar => "rar",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sniff `path` and return its archive format, or `None` for a plain file.
pub fn detect_format(path: &Path) -> io::Result<Option<ArchiveFormat>> {
    let mut header = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut header)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if let Some(format) = classify(&name, &header) {
        return Ok(Some(format));
    }

    let compressed = if header.starts_with(GZIP_MAGIC) {
        ArchiveFormat::TarGz
    } else if header.starts_with(BZIP2_MAGIC) {
        ArchiveFormat::TarBz2
    } else if header.starts_with(XZ_MAGIC) {
        ArchiveFormat::TarXz
    } else {
        return Ok(None);
    };
    Ok(wraps_tar(path, compressed)?.then_some(compressed))
}

/// Decompress the first block of `path` and look for a tar header.
fn wraps_tar(path: &Path, format: ArchiveFormat) -> io::Result<bool> {
    let file = BufReader::new(File::open(path)?);
    let decoder: Box<dyn Read> = match format {
        ArchiveFormat::TarGz => Box::new(flate2::read::MultiGzDecoder::new(file)),
        ArchiveFormat::TarBz2 => Box::new(bzip2::read::BzDecoder::new(file)),
        ArchiveFormat::TarXz => Box::new(xz2::read::XzDecoder::new(file)),
        _ => return Ok(false),
    };

    let mut block = Vec::with_capacity(SNIFF_LEN as usize);
    // A stream that does not decode is a plain compressed file at best.
    if decoder.take(SNIFF_LEN).read_to_end(&mut block).is_err() {
        return Ok(false);
    }
    Ok(block.get(USTAR_OFFSET..USTAR_OFFSET + 5) == Some(b"ustar".as_slice()))
}

/// Decide the format from a lowercased file name and the leading bytes.
fn classify(name: &str, header: &[u8]) -> Option<ArchiveFormat> {
    let ends_with_any = |suffixes: &[&str]| suffixes.iter().any(|s| name.ends_with(s));

    if ZIP_MAGICS.iter().any(|m| header.starts_with(m)) {
        return Some(ArchiveFormat::Zip);
    }
    if header.starts_with(SEVEN_ZIP_MAGIC) {
        return Some(ArchiveFormat::SevenZip);
    }
    if header.starts_with(RAR_MAGIC) {
        return Some(ArchiveFormat::Rar);
    }
    if header.get(USTAR_OFFSET..USTAR_OFFSET + 5) == Some(b"ustar".as_slice()) {
        return Some(ArchiveFormat::Tar);
    }

    // Compressed streams only count as archives when the name says tar;
    // a bare `.gz` is just a compressed file.
    let gz_name = ends_with_any(&[".tar.gz", ".tgz"]);
    let bz_name = ends_with_any(&[".tar.bz2", ".tbz2", ".tbz"]);
    let xz_name = ends_with_any(&[".tar.xz", ".txz"]);

    if header.starts_with(GZIP_MAGIC) && gz_name {
        return Some(ArchiveFormat::TarGz);
    }
    if header.starts_with(BZIP2_MAGIC) && bz_name {
        return Some(ArchiveFormat::TarBz2);
    }
    if header.starts_with(XZ_MAGIC) && xz_name {
        return Some(ArchiveFormat::TarXz);
    }

    // Name-only claims: readers will reject the file if the bytes disagree.
    if name.ends_with(".zip") {
        Some(ArchiveFormat::Zip)
    } else if name.ends_with(".7z") {
        Some(ArchiveFormat::SevenZip)
    } else if name.ends_with(".rar") {
        Some(ArchiveFormat::Rar)
    } else if name.ends_with(".tar") {
        Some(ArchiveFormat::Tar)
    } else if gz_name {
        Some(ArchiveFormat::TarGz)
    } else if bz_name {
        Some(ArchiveFormat::TarBz2)
    } else if xz_name {
        Some(ArchiveFormat::TarXz)
    } else {
        None
    }
}

/// Read the member list of `path` into a tally tree rooted at the archive.
pub(crate) fn scan_archive(path: &Path, format: ArchiveFormat) -> Result<TallyTree> {
    let start = Instant::now();
    let members = list_members(path, format)?;

    let archive_path = path.display().to_string();
    let mut tree = TallyTree::new(
        &root_display_name(path),
        archive_path.clone(),
        NodeKind::Archive,
    );
    for member in &members {
        insert_member(&mut tree, &archive_path, member);
    }

    debug!(
        "Listed {} archive {}: {} members, {} folders in {:?}",
        format,
        archive_path,
        members.len(),
        tree.len() - 1,
        start.elapsed()
    );
    Ok(tree)
}

/// File member names (directories excluded), as stored in the archive.
fn list_members(path: &Path, format: ArchiveFormat) -> Result<Vec<String>> {
    let open = || {
        File::open(path)
            .map(BufReader::new)
            .map_err(|e| AnalyzeError::from_io(path, e))
    };
    let corrupt = |message: String| AnalyzeError::CorruptArchive {
        path: path.to_path_buf(),
        format,
        message,
    };

    match format {
        ArchiveFormat::SevenZip | ArchiveFormat::Rar => Err(AnalyzeError::UnsupportedArchive {
            path: path.to_path_buf(),
            format,
        }),
        ArchiveFormat::Zip => zip_members(open()?).map_err(|e| corrupt(e.to_string())),
        ArchiveFormat::Tar => tar_members(open()?).map_err(|e| corrupt(e.to_string())),
        ArchiveFormat::TarGz => tar_members(flate2::read::MultiGzDecoder::new(open()?))
            .map_err(|e| corrupt(e.to_string())),
        ArchiveFormat::TarBz2 => tar_members(bzip2::read::BzDecoder::new(open()?))
            .map_err(|e| corrupt(e.to_string())),
        ArchiveFormat::TarXz => tar_members(xz2::read::XzDecoder::new(open()?))
            .map_err(|e| corrupt(e.to_string())),
    }
}

/// Member names of a zip central directory.
fn zip_members(reader: BufReader<File>) -> zip::result::ZipResult<Vec<String>> {
    let archive = zip::ZipArchive::new(reader)?;
    Ok(archive
        .file_names()
        .filter(|name| !name.ends_with('/'))
        .map(str::to_owned)
        .collect())
}

/// Member names of a (possibly decompressed) tar stream.
fn tar_members<R: Read>(reader: R) -> io::Result<Vec<String>> {
    let mut archive = tar::Archive::new(reader);
    let mut members = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        let entry_type = entry.header().entry_type();
        if entry_type.is_dir()
            || entry_type.is_pax_global_extensions()
            || entry_type.is_pax_local_extensions()
            || entry_type.is_gnu_longname()
            || entry_type.is_gnu_longlink()
        {
            continue;
        }
        members.push(String::from_utf8_lossy(&entry.path_bytes()).into_owned());
    }
    Ok(members)
}

/// Insert one member path, creating its folder chain on the way.
fn insert_member(tree: &mut TallyTree, archive_path: &str, member: &str) {
    let parts: Vec<&str> = member
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();
    let Some((file_name, dirs)) = parts.split_last() else {
        return;
    };

    let mut cursor = tree.root();
    let mut member_path = archive_path.to_string();
    for dir in dirs {
        member_path.push('/');
        member_path.push_str(dir);
        cursor = tree.child_or_insert(cursor, dir, NodeKind::ArchiveFolder, || member_path.clone());
    }
    tree.add_file(cursor, file_name);
}
