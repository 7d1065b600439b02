//! Integration tests for the directory and zip loaders.

use component_context::{
    load_context, load_directory, load_zip, BinaryPolicy, ContextError, FileSelector,
    LoaderConfig,
};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
];

fn write_tree(base: &Path, files: &[(&str, &[u8])]) {
    for (rel, content) in files {
        let p = base.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, content).unwrap();
    }
}

/// Writes a zip whose entries appear in exactly the given order.
fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, content) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
        } else {
            zip.start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(content).unwrap();
        }
    }
    zip.finish().unwrap();
}

fn config(max_depth: usize) -> LoaderConfig {
    LoaderConfig {
        max_file_depth: max_depth,
        ..LoaderConfig::default()
    }
}

fn zip_in(tmp: &TempDir, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = tmp.path().join("component.zip");
    write_zip(&path, entries);
    path
}

// ═══════════════════════════════════════════════════════════════════════
// Directory loader
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn directory_valid_widget() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("widget");
    let index: &[u8] = b"export default function widget() {}\n";
    let style: &[u8] = b".widget { display: block; }\n";
    write_tree(&root, &[("index.js", index), ("style.less", style)]);

    let ctx = load_directory(&root, &config(3)).await.unwrap();
    assert_eq!(ctx.name(), "widget");
    assert_eq!(ctx.files().len(), 2);
    assert!(ctx.exists_file("widget/index.js"));
    assert_eq!(
        ctx.get_file("widget/style.less").unwrap().content,
        ".widget { display: block; }\n"
    );
    for path in ctx.files().paths() {
        assert!(!path.contains('\\'));
    }
}

#[tokio::test]
async fn directory_deep_file_reported() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("widget");
    let ok: &[u8] = b"ok";
    let deep: &[u8] = b"deep";
    write_tree(&root, &[("index.js", ok), ("a/b/c/d/deep.js", deep)]);

    let err = load_directory(&root, &config(3)).await.unwrap_err();
    assert!(matches!(err, ContextError::DeepHierarchy { max_depth: 3, .. }));
    assert_eq!(err.deep_paths(), ["widget/a/b/c/d/deep.js".to_string()]);
}

#[tokio::test]
async fn directory_reports_every_violation() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("widget");
    let text: &[u8] = b"text";
    write_tree(
        &root,
        &[
            ("index.js", text),
            ("x/y/z/one.js", text),
            ("x/y/z/two.js", text),
            ("p/q/r/s/three.js", text),
            ("img/logo.png", PNG_BYTES),
            ("img/icon.png", PNG_BYTES),
        ],
    );

    let err = load_directory(&root, &config(3)).await.unwrap_err();
    let deep: BTreeSet<&str> = err.deep_paths().iter().map(String::as_str).collect();
    let binary: BTreeSet<&str> = err.binary_paths().iter().map(String::as_str).collect();
    assert_eq!(
        deep,
        BTreeSet::from([
            "widget/x/y/z/one.js",
            "widget/x/y/z/two.js",
            "widget/p/q/r/s/three.js",
        ])
    );
    assert_eq!(
        binary,
        BTreeSet::from(["widget/img/icon.png", "widget/img/logo.png"])
    );
    assert!(matches!(err, ContextError::Violations { .. }));
}

#[tokio::test]
async fn directory_binary_only() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("widget");
    let text: &[u8] = b"text";
    write_tree(&root, &[("index.js", text), ("logo.png", PNG_BYTES)]);

    let err = load_directory(&root, &config(3)).await.unwrap_err();
    assert!(matches!(err, ContextError::BinaryContent { .. }));
    assert_eq!(err.binary_paths(), ["widget/logo.png".to_string()]);
}

#[tokio::test]
async fn directory_missing_root() {
    let tmp = TempDir::new().unwrap();
    let err = load_directory(&tmp.path().join("absent"), &config(3))
        .await
        .unwrap_err();
    assert!(matches!(err, ContextError::SourceNotFound(_)));
}

#[tokio::test]
async fn directory_ignore_patterns_applied() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("widget");
    let text: &[u8] = b"text";
    write_tree(&root, &[("index.js", text), ("vendor/lib.js", text)]);

    let cfg = LoaderConfig {
        ignore: vec!["**/vendor/**".to_string()],
        ..LoaderConfig::default()
    };
    let ctx = load_directory(&root, &cfg).await.unwrap();
    assert!(ctx.is_ignore("widget/vendor/lib.js"));
    assert!(!ctx.is_ignore("widget/index.js"));
    // Ignored files are still loaded; pruning is up to the caller.
    assert_eq!(ctx.files().len(), 2);
}

#[tokio::test]
async fn directory_oversize_file_reported() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("widget");
    let small: &[u8] = b"export {};";
    let big = vec![b'a'; 2048];
    write_tree(&root, &[("index.js", small), ("big.js", big.as_slice())]);
    let cfg = LoaderConfig {
        max_file_bytes: 1024,
        ..LoaderConfig::default()
    };

    let err = load_directory(&root, &cfg).await.unwrap_err();
    assert!(matches!(err, ContextError::FileTooLarge { max_bytes: 1024, .. }));
    assert_eq!(err.oversize_paths(), ["widget/big.js".to_string()]);
}

// ═══════════════════════════════════════════════════════════════════════
// Zip loader
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn zip_valid_component_keeps_entry_order() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_in(
        &tmp,
        &[
            ("widget/", b""),
            ("widget/style.less", b".w {}"),
            ("widget/index.js", b"export {};"),
            ("widget/lib/util.js", b"export const x = 1;"),
        ],
    );

    let ctx = load_zip(&archive, &config(3)).await.unwrap();
    assert_eq!(ctx.name(), "widget");
    assert_eq!(
        ctx.files().paths().collect::<Vec<_>>(),
        ["widget/style.less", "widget/index.js", "widget/lib/util.js"]
    );
    assert_eq!(ctx.get_file("widget/index.js").unwrap().content, "export {};");
}

#[tokio::test]
async fn zip_binary_entries_silently_dropped() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_in(
        &tmp,
        &[("widget/readme.md", b"# Widget\n"), ("widget/logo.png", PNG_BYTES)],
    );

    let ctx = load_zip(&archive, &config(3)).await.unwrap();
    assert_eq!(ctx.files().len(), 1);
    assert!(ctx.exists_file("widget/readme.md"));
    assert!(!ctx.exists_file("widget/logo.png"));
}

#[tokio::test]
async fn zip_binary_reject_policy() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_in(
        &tmp,
        &[("widget/readme.md", b"# Widget\n"), ("widget/logo.png", PNG_BYTES)],
    );
    let cfg = LoaderConfig {
        zip_binary_policy: BinaryPolicy::Reject,
        ..LoaderConfig::default()
    };

    let err = load_zip(&archive, &cfg).await.unwrap_err();
    assert_eq!(err.binary_paths(), ["widget/logo.png".to_string()]);
}

#[tokio::test]
async fn zip_system_entries_excluded() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_in(
        &tmp,
        &[
            ("__MACOSX/widget/._index.js", b"meta"),
            ("widget/index.js", b"export {};"),
            ("widget/.DS_Store", b"meta"),
            ("widget/Thumbs.db", b"meta"),
        ],
    );

    let ctx = load_zip(&archive, &config(3)).await.unwrap();
    assert_eq!(ctx.name(), "widget");
    assert_eq!(ctx.files().paths().collect::<Vec<_>>(), ["widget/index.js"]);
}

#[tokio::test]
async fn zip_invalid_name_from_first_entry() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_in(
        &tmp,
        &[
            ("Bad_Name/index.js", b"export {};"),
            ("widget/index.js", b"export {};"),
        ],
    );

    let err = load_zip(&archive, &config(3)).await.unwrap_err();
    assert!(
        matches!(err, ContextError::InvalidComponentName { ref name, .. } if name == "Bad_Name")
    );
}

#[tokio::test]
async fn zip_name_checked_before_depth() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_in(&tmp, &[("Bad_Name/a/b/c/d/deep.js", b"x")]);

    let err = load_zip(&archive, &config(3)).await.unwrap_err();
    assert!(matches!(err, ContextError::InvalidComponentName { .. }));
}

#[tokio::test]
async fn zip_deep_entries_reported() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_in(
        &tmp,
        &[
            ("widget/index.js", b"x"),
            ("widget/a/b/c/d/deep.js", b"x"),
            ("widget/a/b/c/e.js", b"x"),
            ("widget/a/b/ok.js", b"x"),
        ],
    );

    let err = load_zip(&archive, &config(3)).await.unwrap_err();
    let deep: BTreeSet<&str> = err.deep_paths().iter().map(String::as_str).collect();
    assert_eq!(
        deep,
        BTreeSet::from(["widget/a/b/c/d/deep.js", "widget/a/b/c/e.js"])
    );
}

#[tokio::test]
async fn zip_only_metadata_is_empty() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_in(
        &tmp,
        &[("__MACOSX/widget/._a.js", b"meta"), ("widget/logo.png", PNG_BYTES)],
    );

    let err = load_zip(&archive, &config(3)).await.unwrap_err();
    assert!(matches!(err, ContextError::EmptyComponent));
}

#[tokio::test]
async fn zip_missing_and_corrupt_archives() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("missing.zip");
    let err = load_zip(&missing, &config(3)).await.unwrap_err();
    assert!(matches!(err, ContextError::SourceNotFound(_)));

    let corrupt = tmp.path().join("corrupt.zip");
    fs::write(&corrupt, b"this is not a zip archive").unwrap();
    let err = load_zip(&corrupt, &config(3)).await.unwrap_err();
    assert!(matches!(err, ContextError::ZipRead { .. }));
}

#[tokio::test]
async fn zip_undecodable_entry() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_in(
        &tmp,
        &[("widget/index.js", b"x"), ("widget/latin1.txt", &[b'c', b'a', b'f', 0xe9])],
    );

    let err = load_zip(&archive, &config(3)).await.unwrap_err();
    assert!(
        matches!(err, ContextError::ZipDecode { ref path, .. } if path == "widget/latin1.txt")
    );
}

#[tokio::test]
async fn zip_backslash_entries_normalized() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_in(
        &tmp,
        &[
            ("widget\\index.js", b"export {};"),
            ("widget\\lib\\a.js", b"export const a = 1;"),
        ],
    );

    let ctx = load_zip(&archive, &config(3)).await.unwrap();
    assert_eq!(ctx.name(), "widget");
    assert_eq!(
        ctx.files().paths().collect::<Vec<_>>(),
        ["widget/index.js", "widget/lib/a.js"]
    );
}

#[tokio::test]
async fn zip_oversize_entry_rejected() {
    let tmp = TempDir::new().unwrap();
    let big = "a".repeat(4096);
    let archive = zip_in(
        &tmp,
        &[("widget/index.js", b"export {};"), ("widget/big.js", big.as_bytes())],
    );
    let cfg = LoaderConfig {
        max_file_bytes: 1024,
        ..LoaderConfig::default()
    };

    let err = load_zip(&archive, &cfg).await.unwrap_err();
    assert!(
        matches!(err, ContextError::ZipRead { ref reason, .. } if reason.contains("widget/big.js"))
    );

    // Exactly at the limit is fine.
    let cfg = LoaderConfig {
        max_file_bytes: 4096,
        ..LoaderConfig::default()
    };
    let ctx = load_zip(&archive, &cfg).await.unwrap();
    assert_eq!(ctx.get_file("widget/big.js").unwrap().content.len(), 4096);
}

/// Rewrites the zip64 uncompressed size of every header in `bytes` to
/// `size`, and marks the 32-bit size field as deferring to zip64.
fn patch_zip64_size(bytes: &mut [u8], size: u64) -> usize {
    const LOCAL: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];
    const CENTRAL: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];
    fn u16_at(b: &[u8], i: usize) -> usize {
        u16::from_le_bytes([b[i], b[i + 1]]) as usize
    }

    let mut patched = 0;
    let mut i = 0;
    while i + 4 <= bytes.len() {
        // (size32 offset, name len offset, extra len offset, header len)
        let layout = if bytes[i..i + 4] == LOCAL {
            Some((22, 26, 28, 30))
        } else if bytes[i..i + 4] == CENTRAL {
            Some((24, 28, 30, 46))
        } else {
            None
        };
        let Some((size32, name_len, extra_len, header_len)) = layout else {
            i += 1;
            continue;
        };
        let name = u16_at(bytes, i + name_len);
        let extra = u16_at(bytes, i + extra_len);
        let mut j = i + header_len + name;
        let end = j + extra;
        while j + 4 <= end {
            let id = u16_at(bytes, j);
            let len = u16_at(bytes, j + 2);
            if id == 0x0001 && len >= 8 {
                bytes[j + 4..j + 12].copy_from_slice(&size.to_le_bytes());
                bytes[i + size32..i + size32 + 4].copy_from_slice(&[0xff; 4]);
                patched += 1;
            }
            j += 4 + len;
        }
        i += header_len;
    }
    patched
}

#[tokio::test]
async fn zip_forged_entry_size_fails_cleanly() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("forged.zip");
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .large_file(true);
        zip.start_file("widget/index.js", options).unwrap();
        zip.write_all(b"export {};").unwrap();
        zip.finish().unwrap();
    }
    assert!(patch_zip64_size(&mut buf, 1 << 45) > 0);
    fs::write(&path, &buf).unwrap();

    // The forged header must never drive an allocation; the load either
    // reads the real bytes or reports the archive as unreadable.
    match load_zip(&path, &LoaderConfig::default()).await {
        Ok(ctx) => assert_eq!(ctx.get_file("widget/index.js").unwrap().content, "export {};"),
        Err(err) => assert!(matches!(err, ContextError::ZipRead { .. }), "{}", err),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Dispatch and downstream use
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn load_context_dispatches_by_source() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("widget");
    let text: &[u8] = b"export {};";
    write_tree(&root, &[("index.js", text)]);
    let archive = zip_in(&tmp, &[("widget/index.js", b"export {};")]);

    let from_dir = load_context(&root, &config(3)).await.unwrap();
    let from_zip = load_context(&archive, &config(3)).await.unwrap();
    assert_eq!(from_dir.name(), from_zip.name());
    assert_eq!(
        from_dir.files().paths().collect::<Vec<_>>(),
        from_zip.files().paths().collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn get_files_selectors_on_loaded_context() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_in(
        &tmp,
        &[
            ("widget/index.js", b"export {};"),
            ("widget/style.less", b".w {}"),
            ("widget/lib/util.js", b"export const x = 1;"),
        ],
    );
    let mut ctx = load_zip(&archive, &config(3)).await.unwrap();

    let js = Regex::new(r"\.js$").unwrap();
    let js_paths: Vec<&str> = ctx
        .get_files(FileSelector::Pattern(&js))
        .into_iter()
        .map(|f| f.path.as_str())
        .collect();
    assert_eq!(js_paths, ["widget/index.js", "widget/lib/util.js"]);

    let nested = |f: &component_context::File| f.depth() > 1;
    assert_eq!(ctx.get_files(FileSelector::Predicate(&nested)).len(), 1);

    ctx.remove_file("widget/index.js");
    ctx.remove_file("widget/index.js");
    assert_eq!(ctx.files().len(), 2);
}
