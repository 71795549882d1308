//! Corpus fetcher behaviour against a live local archive.

use std::fs;
use std::path::Path;

use axum::http::StatusCode;
use corpus::{
    corpus_status, ensure_corpus, ArtifactManifest, CorpusConfig, CorpusFetcher, FetchError,
    FetchPolicy, TransferError, CHUNK_SIZE,
};

use crate::archive::{rom_bytes, Archive, Reply, TruncatingArchive};

fn config(archive: &Archive, cache_root: &Path, ids: &[&str]) -> CorpusConfig {
    config_at(archive.base_url(), cache_root, ids)
}

fn config_at(base_url: String, cache_root: &Path, ids: &[&str]) -> CorpusConfig {
    CorpusConfig::default()
        .with_base_url(base_url)
        .with_cache_root(cache_root)
        .with_manifest(ArtifactManifest::new(ids.iter().copied()).unwrap())
}

fn cached_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn both_downloads_succeed_into_fresh_cache_root() {
    let a = rom_bytes(1, 3 * CHUNK_SIZE + 17);
    let b = rom_bytes(2, 10);
    let archive = Archive::start([
        ("A.COM", Reply::Body(a.clone())),
        ("B.COM", Reply::Body(b.clone())),
    ]);
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("res").join("cpu_tests");

    let summary = ensure_corpus(&config(&archive, &root, &["A.COM", "B.COM"])).unwrap();

    assert_eq!(summary.fetched, ["A.COM", "B.COM"]);
    assert_eq!(cached_names(&root), ["A.COM", "B.COM"]);
    assert_eq!(fs::read(root.join("A.COM")).unwrap(), a);
    assert_eq!(fs::read(root.join("B.COM")).unwrap(), b);
}

#[test]
fn server_error_on_first_artifact_aborts_before_second() {
    let archive = Archive::start([
        ("A.COM", Reply::Status(StatusCode::INTERNAL_SERVER_ERROR)),
        ("B.COM", Reply::Body(rom_bytes(2, 64))),
    ]);
    let tmp = tempfile::tempdir().unwrap();

    let err = ensure_corpus(&config(&archive, tmp.path(), &["A.COM", "B.COM"])).unwrap_err();

    match &err {
        FetchError::Network { url, .. } => assert!(url.ends_with("/cpu_tests/A.COM"), "{url}"),
        other => panic!("expected network error, got {other:?}"),
    }
    let a = tmp.path().join("A.COM");
    assert!(!a.exists() || fs::metadata(&a).unwrap().len() == 0);
    assert!(!tmp.path().join("B.COM").exists());
    assert_eq!(archive.hits(), ["A.COM"]);
}

#[test]
fn connection_dropped_mid_body_aborts_and_leaves_partial_file() {
    let sent = rom_bytes(3, 20_000);
    let archive = TruncatingArchive::start(40_000, sent.clone());
    let tmp = tempfile::tempdir().unwrap();
    let config = config_at(archive.base_url(), tmp.path(), &["A.COM", "B.COM"]);

    let err = ensure_corpus(&config).unwrap_err();

    match &err {
        FetchError::Network { url, source } => {
            assert!(url.ends_with("/cpu_tests/A.COM"), "{url}");
            assert!(matches!(source, TransferError::Stream(_)), "{source:?}");
        }
        other => panic!("expected network error, got {other:?}"),
    }
    // No rollback: what arrived before the drop stays on disk.
    assert_eq!(fs::read(tmp.path().join("A.COM")).unwrap(), sent);
    assert!(!tmp.path().join("B.COM").exists());
    assert_eq!(archive.hits(), ["/cpu_tests/A.COM"]);
}

// `?` is not a legal file name character on Windows.
#[cfg(unix)]
#[test]
fn url_delimiters_in_names_reach_the_right_artifact() {
    let archive = Archive::start([
        ("A", Reply::Body(b"wrong".to_vec())),
        ("A#B.COM", Reply::Body(b"right".to_vec())),
        ("WHAT?.COM", Reply::Body(b"also right".to_vec())),
    ]);
    let tmp = tempfile::tempdir().unwrap();

    ensure_corpus(&config(&archive, tmp.path(), &["A#B.COM", "WHAT?.COM"])).unwrap();

    assert_eq!(fs::read(tmp.path().join("A#B.COM")).unwrap(), b"right");
    assert_eq!(fs::read(tmp.path().join("WHAT?.COM")).unwrap(), b"also right");
    assert_eq!(archive.hits(), ["A#B.COM", "WHAT?.COM"]);
}

#[test]
fn nth_failure_keeps_earlier_files_and_skips_later_ones() {
    let archive = Archive::start([
        ("1.COM", Reply::Body(rom_bytes(1, 100))),
        ("2.COM", Reply::Body(rom_bytes(2, 100))),
        ("4.COM", Reply::Body(rom_bytes(4, 100))),
    ]);
    let tmp = tempfile::tempdir().unwrap();
    let ids = ["1.COM", "2.COM", "3.COM", "4.COM"];

    let err = ensure_corpus(&config(&archive, tmp.path(), &ids)).unwrap_err();

    assert!(matches!(err, FetchError::Network { .. }), "{err:?}");
    assert_eq!(cached_names(tmp.path()), ["1.COM", "2.COM"]);
    assert_eq!(archive.hits(), ["1.COM", "2.COM", "3.COM"]);
}

#[test]
fn reference_style_names_are_stored_verbatim() {
    let ids = ["+README.TXT", "8080_8085 CPU Exerciser.pdf", "TST8080.COM"];
    let archive = Archive::start(
        ids.iter()
            .enumerate()
            .map(|(i, id)| (*id, Reply::Body(rom_bytes(i as u8, 32)))),
    );
    let tmp = tempfile::tempdir().unwrap();

    ensure_corpus(&config(&archive, tmp.path(), &ids)).unwrap();

    let mut expected: Vec<&str> = ids.to_vec();
    expected.sort();
    assert_eq!(cached_names(tmp.path()), expected);
    // The server saw the decoded name, so the space survived the round trip.
    assert_eq!(archive.hits(), ids);
}

#[test]
fn rerun_with_skip_existing_is_a_no_op() {
    let archive = Archive::start([
        ("A.COM", Reply::Body(b"fresh".to_vec())),
        ("B.COM", Reply::Body(b"fresh".to_vec())),
    ]);
    let tmp = tempfile::tempdir().unwrap();
    // A truncated leftover still counts as cached.
    fs::write(tmp.path().join("A.COM"), b"tr").unwrap();
    let config = config(&archive, tmp.path(), &["A.COM", "B.COM"]);

    let first = ensure_corpus(&config).unwrap();
    assert_eq!(first.skipped, ["A.COM"]);
    assert_eq!(first.fetched, ["B.COM"]);

    let second = ensure_corpus(&config).unwrap();
    assert!(second.fetched.is_empty());
    assert_eq!(second.total(), 2);

    assert_eq!(archive.hits(), ["B.COM"]);
    assert_eq!(fs::read(tmp.path().join("A.COM")).unwrap(), b"tr");
}

#[test]
fn overwrite_policy_refreshes_every_artifact() {
    let archive = Archive::start([
        ("A.COM", Reply::Body(b"fresh-a".to_vec())),
        ("B.COM", Reply::Body(b"fresh-b".to_vec())),
    ]);
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("A.COM"), b"stale and longer than the new file").unwrap();
    let config =
        config(&archive, tmp.path(), &["A.COM", "B.COM"]).with_policy(FetchPolicy::Overwrite);

    let fetcher = CorpusFetcher::new(&config).unwrap();
    fetcher
        .ensure_corpus(&config.manifest, &config.cache_root)
        .unwrap();
    fetcher
        .ensure_corpus(&config.manifest, &config.cache_root)
        .unwrap();

    assert_eq!(fs::read(tmp.path().join("A.COM")).unwrap(), b"fresh-a");
    assert_eq!(archive.hits(), ["A.COM", "B.COM", "A.COM", "B.COM"]);
}

#[test]
fn status_reflects_a_completed_fetch() {
    let archive = Archive::start([("A.COM", Reply::Body(rom_bytes(9, 300)))]);
    let tmp = tempfile::tempdir().unwrap();
    let config = config(&archive, tmp.path(), &["A.COM"]);

    let before = corpus_status(&config.manifest, &config.cache_root).unwrap();
    assert!(!before[0].is_cached());

    ensure_corpus(&config).unwrap();

    let after = corpus_status(&config.manifest, &config.cache_root).unwrap();
    assert_eq!(after[0].state, corpus::CacheState::Cached { bytes: 300 });
}
