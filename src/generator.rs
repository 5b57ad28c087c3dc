//! # Generator
//!
//! Orchestrates a run: walk the input directory, encode and chunk every
//! file, resolve identifiers, render the header and write it in one go.
//!
//! A run either writes a complete header or fails without touching the
//! output path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::{CollisionPolicy, GeneratorConfig, WalkOrder};
use crate::emitter::{render_header, ResourceDeclaration};
use crate::encoder::{encode, split_chunks};
use crate::error::{GenerateError, Result};
use crate::naming::{derive_identifier, relative_path};
use crate::system::{LocalFs, ResourceFs};

/// What a run produced (or would produce, for a dry run).
#[derive(Debug, Serialize)]
pub struct Report {
    pub input: PathBuf,
    pub config: GeneratorConfig,
    pub resources: Vec<ReportEntry>,
    pub total_bytes: usize,
    pub total_chunks: usize,
}

#[derive(Debug, Serialize)]
pub struct ReportEntry {
    pub ident: String,
    pub path: String,
    pub byte_len: usize,
    pub encoded_len: usize,
    pub chunk_count: usize,
}

impl Report {
    fn new(input: &Path, config: &GeneratorConfig, decls: &[ResourceDeclaration]) -> Self {
        let resources: Vec<ReportEntry> = decls
            .iter()
            .map(|d| ReportEntry {
                ident: d.ident.clone(),
                path: d.path.clone(),
                byte_len: d.byte_len,
                encoded_len: d.encoded_len,
                chunk_count: d.chunk_count(),
            })
            .collect();

        Self {
            input: input.to_path_buf(),
            config: config.clone(),
            total_bytes: resources.iter().map(|r| r.byte_len).sum(),
            total_chunks: resources.iter().map(|r| r.chunk_count).sum(),
            resources,
        }
    }
}

/// Generates `output_file` from `input_dir` with default settings.
pub fn generate(input_dir: &Path, output_file: &Path) -> Result<Report> {
    generate_with(&LocalFs, input_dir, output_file, &GeneratorConfig::default())
}

/// Generates `output_file` from `input_dir` through `fs`.
pub fn generate_with(
    fs: &impl ResourceFs,
    input_dir: &Path,
    output_file: &Path,
    config: &GeneratorConfig,
) -> Result<Report> {
    let decls = build_declarations(fs, input_dir, config)?;
    let header = render_header(config, &decls);

    fs.write_output(output_file, &header)?;

    let report = Report::new(input_dir, config, &decls);
    info!(
        "Wrote {} resources ({} bytes, {} chunks) to {:?}",
        report.resources.len(),
        report.total_bytes,
        report.total_chunks,
        output_file
    );
    Ok(report)
}

/// Runs every step except the final write.
pub fn dry_run(fs: &impl ResourceFs, input_dir: &Path, config: &GeneratorConfig) -> Result<Report> {
    let decls = build_declarations(fs, input_dir, config)?;
    Ok(Report::new(input_dir, config, &decls))
}

/// Walks `input_dir` and turns every regular file into a declaration.
pub fn build_declarations(
    fs: &impl ResourceFs,
    input_dir: &Path,
    config: &GeneratorConfig,
) -> Result<Vec<ResourceDeclaration>> {
    config.validate()?;

    let mut files = fs
        .list_files(input_dir, config.follow_links)?
        .into_iter()
        .map(|path| relative_path(input_dir, &path).map(|rel| (rel, path)))
        .collect::<Result<Vec<_>>>()?;

    if config.order == WalkOrder::Sorted {
        files.sort_by(|a, b| a.0.cmp(&b.0));
    }
    debug!("Found {} files under {:?}", files.len(), input_dir);

    let mut decls: Vec<ResourceDeclaration> = Vec::with_capacity(files.len());
    let mut by_ident: HashMap<String, usize> = HashMap::new();

    for (rel, path) in files {
        let decl = declare(fs, &path, rel, config)?;

        match by_ident.get(&decl.ident) {
            None => {
                by_ident.insert(decl.ident.clone(), decls.len());
                decls.push(decl);
            }
            Some(&idx) => match config.on_collision {
                CollisionPolicy::Fail => {
                    return Err(GenerateError::IdentifierCollision {
                        ident: decl.ident,
                        first: decls[idx].path.clone(),
                        second: decl.path,
                    });
                }
                CollisionPolicy::Overwrite => {
                    warn!(
                        "{} from {} replaces the declaration from {}",
                        decl.ident, decl.path, decls[idx].path
                    );
                    decls[idx] = decl;
                }
            },
        }
    }

    Ok(decls)
}

fn declare(
    fs: &impl ResourceFs,
    path: &Path,
    rel: String,
    config: &GeneratorConfig,
) -> Result<ResourceDeclaration> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| GenerateError::NonUtf8Path { path: path.to_path_buf() })?;

    let bytes = fs.read_file(path)?;
    let encoded = encode(&bytes);
    let chunks: Vec<String> = split_chunks(&encoded, config.max_chunk_length)
        .into_iter()
        .map(str::to_owned)
        .collect();

    let decl = ResourceDeclaration {
        ident: derive_identifier(file_name),
        path: rel,
        byte_len: bytes.len(),
        encoded_len: encoded.len(),
        chunks,
    };
    debug!(
        "{} -> {} ({} bytes, {} chunks)",
        decl.path,
        decl.ident,
        decl.byte_len,
        decl.chunk_count()
    );
    Ok(decl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::MockFs;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use proptest::prelude::*;

    fn out() -> PathBuf {
        PathBuf::from("out/resources.h")
    }

    #[test]
    fn hello_scenario() {
        let fs = MockFs::new("res").with_file("hello.txt", b"Hi");
        generate_with(&fs, Path::new("res"), &out(), &GeneratorConfig::default()).unwrap();

        let header = fs.output(&out()).unwrap();
        assert!(header.contains("const std::vector<std::string> HELLO_TXT_CHUNKS = {\n        \"SGk=\"\n    };"));
        assert!(header.contains("const std::string HELLO_TXT_PATH = \"hello.txt\";"));
    }

    #[test]
    fn empty_directory_yields_empty_namespace() {
        let fs = MockFs::new("res");
        let report = generate_with(&fs, Path::new("res"), &out(), &GeneratorConfig::default()).unwrap();

        assert!(report.resources.is_empty());
        assert!(fs.output(&out()).unwrap().contains("namespace Resources {\n}\n"));
    }

    #[test]
    fn large_file_splits_at_the_chunk_limit() {
        // 18 bytes encode to 24 characters.
        let config = GeneratorConfig { max_chunk_length: 10, ..Default::default() };
        let fs = MockFs::new("res").with_file("blob", &[1u8; 18]);
        let decls = build_declarations(&fs, Path::new("res"), &config).unwrap();
        let lengths: Vec<usize> = decls[0].chunks.iter().map(String::len).collect();
        assert_eq!(lengths, vec![10, 10, 4]);
        assert_eq!(decls[0].encoded_len, 24);
    }

    #[test]
    fn default_entry_point_writes_to_disk() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::create_dir(input.path().join("fonts")).unwrap();
        std::fs::write(input.path().join("fonts").join("mono.ttf"), b"\x00\x01\x02").unwrap();
        let header_path = output.path().join("resources.h");

        let report = generate(input.path(), &header_path).unwrap();
        assert_eq!(report.resources[0].path, "fonts/mono.ttf");

        let header = std::fs::read_to_string(&header_path).unwrap();
        assert!(header.contains("MONO_TTF_CHUNKS = {\n        \"AAEC\"\n    };"));
        assert!(header.contains("MONO_TTF_PATH = \"fonts/mono.ttf\";"));
    }

    #[test]
    fn sorted_order_ignores_walk_order() {
        let fs = MockFs::new("res")
            .with_file("z.txt", b"z")
            .with_file("a/m.txt", b"m")
            .with_file("b.txt", b"b");
        let decls = build_declarations(&fs, Path::new("res"), &GeneratorConfig::default()).unwrap();
        let paths: Vec<&str> = decls.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["a/m.txt", "b.txt", "z.txt"]);
    }

    #[test]
    fn filesystem_order_is_kept_when_requested() {
        let fs = MockFs::new("res").with_file("z.txt", b"z").with_file("b.txt", b"b");
        let config = GeneratorConfig { order: WalkOrder::Filesystem, ..Default::default() };
        let decls = build_declarations(&fs, Path::new("res"), &config).unwrap();
        let paths: Vec<&str> = decls.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["z.txt", "b.txt"]);
    }

    #[test]
    fn identifiers_come_from_file_name_not_path() {
        let fs = MockFs::new("res").with_file("img/icons/a.b.png", b"x");
        let decls = build_declarations(&fs, Path::new("res"), &GeneratorConfig::default()).unwrap();
        assert_eq!(decls[0].ident, "A_B_PNG");
        assert_eq!(decls[0].path, "img/icons/a.b.png");
    }

    #[test]
    fn same_name_in_two_directories_collides() {
        let fs = MockFs::new("res")
            .with_file("one/logo.png", b"1")
            .with_file("two/logo.png", b"2");
        let err = build_declarations(&fs, Path::new("res"), &GeneratorConfig::default()).unwrap_err();
        match err {
            GenerateError::IdentifierCollision { ident, first, second } => {
                assert_eq!(ident, "LOGO_PNG");
                assert_eq!(first, "one/logo.png");
                assert_eq!(second, "two/logo.png");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn dot_underscore_collision_fails_and_nothing_is_written() {
        let fs = MockFs::new("res").with_file("a.b", b"dot").with_file("a_b", b"underscore");
        let result = generate_with(&fs, Path::new("res"), &out(), &GeneratorConfig::default());
        assert!(matches!(result, Err(GenerateError::IdentifierCollision { .. })));
        assert!(fs.output(&out()).is_none());
    }

    #[test]
    fn overwrite_policy_keeps_the_later_file() {
        let fs = MockFs::new("res").with_file("a.b", b"dot").with_file("a_b", b"underscore");
        let config = GeneratorConfig { on_collision: CollisionPolicy::Overwrite, ..Default::default() };
        let decls = build_declarations(&fs, Path::new("res"), &config).unwrap();

        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].path, "a_b");
        assert_eq!(decls[0].chunks.concat(), STANDARD.encode(b"underscore"));
    }

    #[test]
    fn different_extensions_do_not_collide() {
        let fs = MockFs::new("res").with_file("x.png", b"p").with_file("x.jpg", b"j");
        let decls = build_declarations(&fs, Path::new("res"), &GeneratorConfig::default()).unwrap();
        let idents: Vec<&str> = decls.iter().map(|d| d.ident.as_str()).collect();
        assert_eq!(idents, vec!["X_JPG", "X_PNG"]);
    }

    #[test]
    fn missing_input_is_reported() {
        let fs = MockFs::new("res");
        let err = generate_with(&fs, Path::new("elsewhere"), &out(), &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, GenerateError::InputNotFound { path } if path == Path::new("elsewhere")));
    }

    #[test]
    fn unreadable_file_aborts_without_output() {
        let mut fs = MockFs::new("res").with_file("ok.txt", b"ok").with_file("locked.bin", b"no");
        fs.unreadable.push(PathBuf::from("res").join("locked.bin"));

        let err = generate_with(&fs, Path::new("res"), &out(), &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, GenerateError::InputUnreadable { ref path, .. } if path.ends_with("locked.bin")));
        assert!(fs.output(&out()).is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_file_name_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let input = tempfile::tempdir().unwrap();
        let bad = input.path().join(OsStr::from_bytes(b"\xff.bin"));
        std::fs::write(&bad, b"data").unwrap();

        let err = build_declarations(&LocalFs, input.path(), &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, GenerateError::NonUtf8Path { path } if path == bad));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_file_is_declared_under_its_link_path() {
        let base = tempfile::tempdir().unwrap();
        let input = base.path().join("res");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(base.path().join("real.png"), b"Hi").unwrap();
        std::os::unix::fs::symlink(base.path().join("real.png"), input.join("link.png")).unwrap();

        let decls = build_declarations(&LocalFs, &input, &GeneratorConfig::default()).unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].ident, "LINK_PNG");
        assert_eq!(decls[0].path, "link.png");
        assert_eq!(decls[0].chunks, vec!["SGk=".to_string()]);
    }

    #[test]
    fn write_failure_names_output_path() {
        let mut fs = MockFs::new("res").with_file("a.txt", b"a");
        fs.fail_writes = true;
        let err = generate_with(&fs, Path::new("res"), &out(), &GeneratorConfig::default()).unwrap_err();
        assert!(err.to_string().contains("resources.h"));
    }

    #[test]
    fn invalid_config_is_rejected_before_walking() {
        let fs = MockFs::new("res").with_file("a.txt", b"a");
        let config = GeneratorConfig { max_chunk_length: 0, ..Default::default() };
        assert!(matches!(
            dry_run(&fs, Path::new("res"), &config),
            Err(GenerateError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let fs = MockFs::new("res").with_file("hello.txt", b"Hi").with_file("empty.dat", b"");
        let report = dry_run(&fs, Path::new("res"), &GeneratorConfig::default()).unwrap();

        assert!(fs.written.lock().unwrap().is_empty());
        assert_eq!(report.total_bytes, 2);
        assert_eq!(report.total_chunks, 1);
        let empty = report.resources.iter().find(|r| r.path == "empty.dat").unwrap();
        assert_eq!((empty.encoded_len, empty.chunk_count), (0, 0));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["resources"][1]["ident"], "HELLO_TXT");
        assert_eq!(json["config"]["order"], "sorted");
    }

    proptest! {
        #[test]
        fn every_file_round_trips_and_appears_once(
            contents in prop::collection::btree_map("[a-z]{1,6}\\.(bin|png|txt)", prop::collection::vec(any::<u8>(), 0..300), 0..8),
            max_len in 1usize..40,
        ) {
            let mut fs = MockFs::new("res");
            for (name, bytes) in &contents {
                fs = fs.with_file(&format!("nested/{name}"), bytes);
            }
            let config = GeneratorConfig { max_chunk_length: max_len, ..Default::default() };
            let decls = build_declarations(&fs, Path::new("res"), &config).unwrap();

            prop_assert_eq!(decls.len(), contents.len());
            for decl in &decls {
                let name = decl.path.strip_prefix("nested/").unwrap();
                let original = &contents[name];
                prop_assert!(decl.chunks.iter().all(|c| c.len() <= max_len));
                prop_assert_eq!(&STANDARD.decode(decl.chunks.concat()).unwrap(), original);
            }
        }

        #[test]
        fn rendering_is_deterministic(
            contents in prop::collection::btree_map("[a-z]{1,6}", prop::collection::vec(any::<u8>(), 0..64), 0..6),
        ) {
            let mut fs = MockFs::new("res");
            for (name, bytes) in contents.iter().rev() {
                fs = fs.with_file(name, bytes);
            }
            let first = generate_with(&fs, Path::new("res"), &out(), &GeneratorConfig::default());
            prop_assert!(first.is_ok());
            let a = fs.output(&out()).unwrap();
            generate_with(&fs, Path::new("res"), &out(), &GeneratorConfig::default()).unwrap();
            let b = fs.output(&out()).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
