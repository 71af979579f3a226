/// End-to-end aggregation tests.
///
/// These run the public `analyze` entry point against real temporary
/// directory trees and real archives written with the same `zip`, `tar`,
/// `flate2` and `bzip2` crates the scanner reads them with.
use std::fs;
use std::io::Write;
use std::path::Path;
use structview_core::model::{Node, NodeKind};
use structview_core::scanner::archive::ArchiveFormat;
use structview_core::scanner::SourceKind;
use structview_core::{analyze, AnalyzeError, AnalyzeOptions};
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"x").unwrap();
}

/// Ten files in one folder: 5 `.txt`, 3 `.py`, 2 `.md`.
fn build_flat(root: &Path) {
    for i in 0..5 {
        touch(&root.join(format!("t{i}.txt")));
    }
    for i in 0..3 {
        touch(&root.join(format!("p{i}.py")));
    }
    for i in 0..2 {
        touch(&root.join(format!("m{i}.md")));
    }
}

/// ```text
/// root/
///   README            (no extension)
///   src/
///     main.rs, lib.rs, util.RS
///     nested/deep/x.json
///   docs/
///     guide.md, api.md, logo.png
///   empty/
/// ```
fn build_nested(root: &Path) {
    touch(&root.join("README"));
    touch(&root.join("src/main.rs"));
    touch(&root.join("src/lib.rs"));
    touch(&root.join("src/util.RS"));
    touch(&root.join("src/nested/deep/x.json"));
    touch(&root.join("docs/guide.md"));
    touch(&root.join("docs/api.md"));
    touch(&root.join("docs/logo.png"));
    fs::create_dir_all(root.join("empty")).unwrap();
}

/// Check the structural properties every summary tree must satisfy.
fn assert_invariants(root: &Node, options: &AnalyzeOptions) {
    root.walk(&mut |node, depth| {
        let children: u64 = node.children.iter().map(|c| c.file_count).sum();
        assert_eq!(
            node.file_count,
            children + node.direct_file_count,
            "file_count of {} is not children + direct",
            node.path
        );
        assert_eq!(
            node.extension_counts.iter().map(|(_, c)| c).sum::<u64>(),
            node.file_count,
            "extension counts of {} do not sum to file_count",
            node.path
        );
        assert!(node.extension_counts.len() <= options.top_k + 1);
        if let Some(max) = options.max_depth {
            assert!(depth <= max, "{} is deeper than {max}", node.path);
            if depth == max {
                assert!(node.children.is_empty());
            }
        }
    });
}

fn write_zip(path: &Path, members: &[&str]) {
    use zip::write::SimpleFileOptions;
    let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for member in members {
        if member.ends_with('/') {
            zip.add_directory(member.trim_end_matches('/'), options).unwrap();
        } else {
            zip.start_file(*member, options).unwrap();
            zip.write_all(b"data").unwrap();
        }
    }
    zip.finish().unwrap();
}

fn append_tar<W: Write>(builder: &mut tar::Builder<W>, members: &[&str]) {
    for member in members {
        let mut header = tar::Header::new_gnu();
        if member.ends_with('/') {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_mode(0o755);
            header.set_cksum();
            builder
                .append_data(&mut header, member, std::io::empty())
                .unwrap();
        } else {
            header.set_size(4);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, member, &b"data"[..])
                .unwrap();
        }
    }
}

const MEMBERS: &[&str] = &[
    "pkg/",
    "pkg/setup.py",
    "pkg/src/",
    "pkg/src/a.py",
    "pkg/src/b.py",
    "pkg/src/c.txt",
    "pkg/docs/index.md",
    "top.txt",
];

/// Check the tree built from [`MEMBERS`].
fn assert_member_tree(root: &Node, kind: NodeKind) {
    assert_eq!(root.kind, kind);
    assert_eq!(root.file_count, 6);
    assert_eq!(root.direct_file_count, 1);
    let pkg = root.child("pkg").unwrap();
    assert_eq!(pkg.kind, NodeKind::ArchiveFolder);
    assert_eq!(pkg.file_count, 5);
    let src = pkg.child("src").unwrap();
    assert_eq!(src.extension_counts.get("py"), Some(2));
    assert_eq!(src.extension_counts.get("txt"), Some(1));
    assert!(src.path.ends_with("/pkg/src"));
    assert_eq!(pkg.child("docs").unwrap().file_count, 1);
}

// ── Directories ──────────────────────────────────────────────────────────────

#[test]
fn flat_folder_collapses_beyond_top_k() {
    let tmp = TempDir::new().unwrap();
    build_flat(tmp.path());

    let options = AnalyzeOptions::new(None, 2);
    let report = analyze(tmp.path(), &options).unwrap();
    let root = &report.root;

    assert_eq!(report.source, SourceKind::Directory);
    assert_eq!(root.file_count, 10);
    let shown: Vec<(&str, u64)> = root.extension_counts.iter().collect();
    assert_eq!(shown, vec![("txt", 5), ("py", 3), ("other", 2)]);
    assert_invariants(root, &options);
}

#[test]
fn depth_zero_aggregates_everything_into_the_root() {
    let tmp = TempDir::new().unwrap();
    build_nested(tmp.path());

    let options = AnalyzeOptions::new(Some(0), 5);
    let report = analyze(tmp.path(), &options).unwrap();

    assert!(report.root.children.is_empty());
    assert_eq!(report.root.file_count, 8);
    assert_eq!(report.root.extension_counts.get("rs"), Some(3));
    assert_invariants(&report.root, &options);
}

#[test]
fn nested_tree_counts_and_ordering() {
    let tmp = TempDir::new().unwrap();
    build_nested(tmp.path());

    let options = AnalyzeOptions::default();
    let report = analyze(tmp.path(), &options).unwrap();
    let root = &report.root;

    assert!(report.skipped.is_empty());
    assert_eq!(root.file_count, 8);
    assert_eq!(root.direct_file_count, 1);
    assert_eq!(root.extension_counts.get("<noext>"), Some(1));

    let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["docs", "empty", "src"]);

    let src = root.child("src").unwrap();
    assert_eq!(src.file_count, 4);
    // Extensions are case-insensitive.
    assert_eq!(src.extension_counts.get("rs"), Some(3));
    assert_eq!(
        src.child("nested").unwrap().child("deep").unwrap().file_count,
        1
    );

    let empty = root.child("empty").unwrap();
    assert_eq!(empty.file_count, 0);
    assert!(empty.extension_counts.is_empty());

    assert_invariants(root, &options);
}

#[test]
fn depth_limit_folds_deeper_levels() {
    let tmp = TempDir::new().unwrap();
    build_nested(tmp.path());

    for max in 0..4 {
        for top_k in 1..4 {
            let options = AnalyzeOptions::new(Some(max), top_k);
            let report = analyze(tmp.path(), &options).unwrap();
            assert_eq!(report.root.file_count, 8);
            assert_invariants(&report.root, &options);
        }
    }

    let report = analyze(tmp.path(), &AnalyzeOptions::new(Some(1), 5)).unwrap();
    let src = report.root.child("src").unwrap();
    assert!(src.children.is_empty());
    assert_eq!(src.file_count, 4);
    assert_eq!(src.extension_counts.get("json"), Some(1));
}

#[test]
fn missing_root_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = analyze(&tmp.path().join("missing"), &AnalyzeOptions::default()).unwrap_err();
    assert!(matches!(err, AnalyzeError::NotFound { .. }));
}

#[test]
fn zero_top_k_is_rejected_before_walking() {
    let tmp = TempDir::new().unwrap();
    let err = analyze(tmp.path(), &AnalyzeOptions::new(None, 0)).unwrap_err();
    assert!(matches!(err, AnalyzeError::InvalidTopK(0)));
}

#[test]
fn plain_file_is_a_single_node() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("notes.TXT");
    fs::write(&path, b"just some text").unwrap();

    let report = analyze(&path, &AnalyzeOptions::default()).unwrap();
    assert_eq!(report.source, SourceKind::File);
    assert_eq!(report.root.kind, NodeKind::File);
    assert_eq!(report.root.file_count, 1);
    assert_eq!(report.root.extension_counts.get("txt"), Some(1));
    assert!(report.root.children.is_empty());
    assert!(report.root.note.is_some());
}

#[cfg(unix)]
#[test]
fn unreadable_subfolder_is_skipped_not_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    build_flat(tmp.path());
    let locked = tmp.path().join("locked");
    touch(&locked.join("secret.key"));
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not stop root.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let report = analyze(tmp.path(), &AnalyzeOptions::default());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let report = report.unwrap();

    assert_eq!(report.root.file_count, 10);
    let node = report.root.child("locked").unwrap();
    assert!(node.denied);
    assert_eq!(node.file_count, 0);
    assert!(report.skipped.iter().any(|s| s.path.ends_with("locked")));
}

// ── Archives ─────────────────────────────────────────────────────────────────

#[test]
fn zip_members_form_a_folder_tree() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bundle.zip");
    write_zip(&path, MEMBERS);

    let options = AnalyzeOptions::default();
    let report = analyze(&path, &options).unwrap();
    assert_eq!(report.source, SourceKind::Archive(ArchiveFormat::Zip));
    assert_eq!(report.root.name, "bundle.zip");
    assert_member_tree(&report.root, NodeKind::Archive);
    assert_invariants(&report.root, &options);
}

#[test]
fn tar_members_form_a_folder_tree() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bundle.tar");
    let mut builder = tar::Builder::new(fs::File::create(&path).unwrap());
    append_tar(&mut builder, MEMBERS);
    builder.finish().unwrap();
    drop(builder);

    let report = analyze(&path, &AnalyzeOptions::default()).unwrap();
    assert_eq!(report.source, SourceKind::Archive(ArchiveFormat::Tar));
    assert_member_tree(&report.root, NodeKind::Archive);
}

#[test]
fn tar_gz_is_read_through_the_decoder() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bundle.tar.gz");
    let gz = flate2::write::GzEncoder::new(
        fs::File::create(&path).unwrap(),
        flate2::Compression::default(),
    );
    let mut builder = tar::Builder::new(gz);
    append_tar(&mut builder, MEMBERS);
    builder.into_inner().unwrap().finish().unwrap();

    let options = AnalyzeOptions::new(Some(1), 1);
    let report = analyze(&path, &options).unwrap();
    assert_eq!(report.source, SourceKind::Archive(ArchiveFormat::TarGz));
    assert_eq!(report.root.file_count, 6);
    assert!(report.root.child("pkg").unwrap().children.is_empty());
    assert_invariants(&report.root, &options);
}

#[test]
fn tar_bz2_is_read_through_the_decoder() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bundle.tbz2");
    let bz = bzip2::write::BzEncoder::new(
        fs::File::create(&path).unwrap(),
        bzip2::Compression::default(),
    );
    let mut builder = tar::Builder::new(bz);
    append_tar(&mut builder, MEMBERS);
    builder.into_inner().unwrap().finish().unwrap();

    let report = analyze(&path, &AnalyzeOptions::default()).unwrap();
    assert_eq!(report.source, SourceKind::Archive(ArchiveFormat::TarBz2));
    assert_member_tree(&report.root, NodeKind::Archive);
}

#[test]
fn tar_xz_is_read_through_the_decoder() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bundle.txz");
    let xz = xz2::write::XzEncoder::new(fs::File::create(&path).unwrap(), 6);
    let mut builder = tar::Builder::new(xz);
    append_tar(&mut builder, MEMBERS);
    builder.into_inner().unwrap().finish().unwrap();

    let options = AnalyzeOptions::new(None, 2);
    let report = analyze(&path, &options).unwrap();
    assert_eq!(report.source, SourceKind::Archive(ArchiveFormat::TarXz));
    assert_member_tree(&report.root, NodeKind::Archive);
    assert_invariants(&report.root, &options);
}

#[test]
fn gzipped_tar_without_tar_name_is_still_an_archive() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bundle.bin");
    let gz = flate2::write::GzEncoder::new(
        fs::File::create(&path).unwrap(),
        flate2::Compression::default(),
    );
    let mut builder = tar::Builder::new(gz);
    append_tar(&mut builder, MEMBERS);
    builder.into_inner().unwrap().finish().unwrap();

    let report = analyze(&path, &AnalyzeOptions::default()).unwrap();
    assert_eq!(report.source, SourceKind::Archive(ArchiveFormat::TarGz));
    assert_member_tree(&report.root, NodeKind::Archive);
}

#[test]
fn empty_zip_is_an_empty_node() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("empty.zip");
    write_zip(&path, &[]);

    let report = analyze(&path, &AnalyzeOptions::default()).unwrap();
    assert_eq!(report.root.file_count, 0);
    assert!(report.root.children.is_empty());
}

#[test]
fn corrupt_zip_is_a_terminal_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.zip");
    let mut bytes = b"PK\x03\x04".to_vec();
    bytes.extend_from_slice(&[0xAB; 64]);
    fs::write(&path, bytes).unwrap();

    let err = analyze(&path, &AnalyzeOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        AnalyzeError::CorruptArchive {
            format: ArchiveFormat::Zip,
            ..
        }
    ));
}

#[test]
fn rar_is_unsupported() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("old.rar");
    fs::write(&path, b"Rar!\x1a\x07\x00rest").unwrap();

    let err = analyze(&path, &AnalyzeOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        AnalyzeError::UnsupportedArchive {
            format: ArchiveFormat::Rar,
            ..
        }
    ));
}

#[test]
fn archive_inside_a_folder_counts_as_one_file() {
    let tmp = TempDir::new().unwrap();
    write_zip(&tmp.path().join("inner.zip"), MEMBERS);

    let report = analyze(tmp.path(), &AnalyzeOptions::default()).unwrap();
    assert_eq!(report.root.file_count, 1);
    assert_eq!(report.root.extension_counts.get("zip"), Some(1));
}
