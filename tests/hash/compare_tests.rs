// Tests for the comparison service

use std::io;
use std::path::{Path, PathBuf};

use hashcompare::hash::{
    hash_results_to_json, ComparisonOutcome, ComparisonService, DigestEngine, DigestError, DigestPair,
    DigestResult, InputSlot,
};

use super::write_fixture;

#[test]
fn test_no_input() {
    let service = ComparisonService::new();
    let outcome = service.evaluate(None, None);

    assert!(matches!(outcome, ComparisonOutcome::NoInput));
    assert!(outcome.failed_inputs().is_empty());
    assert!(outcome.results().is_empty());
}

#[test]
fn test_single_input_reports_digests() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "abc.txt", b"abc");

    let outcome = ComparisonService::new().evaluate(Some(&path), None);

    match outcome {
        ComparisonOutcome::SingleResult { slot, result: Ok(pair) } => {
            assert_eq!(slot, InputSlot::First);
            assert_eq!(pair.md5, "900150983cd24fb0d6963f7d28e17f72");
            assert_eq!(pair.sha256, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
        }
        other => panic!("Expected SingleResult, got {:?}", other),
    }
}

#[test]
fn test_single_second_input_keeps_its_slot() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "only_second.txt", b"second");

    let outcome = ComparisonService::new().evaluate(None, Some(&path));

    match outcome {
        ComparisonOutcome::SingleResult { slot, result } => {
            assert_eq!(slot, InputSlot::Second);
            assert!(result.is_ok());
        }
        other => panic!("Expected SingleResult, got {:?}", other),
    }
}

#[test]
fn test_single_input_failure_is_carried_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");

    let outcome = ComparisonService::new().evaluate(Some(&missing), None);

    match &outcome {
        ComparisonOutcome::SingleResult { result: Err(DigestError::Unreadable { path, .. }), .. } => {
            assert_eq!(path, &missing);
        }
        other => panic!("Expected failed SingleResult, got {:?}", other),
    }
    assert_eq!(outcome.failed_inputs().len(), 1);
    assert_eq!(outcome.verdict(), "Comparison requires two files");
}

#[test]
fn test_identical_files_are_equal() {
    let dir = tempfile::tempdir().unwrap();
    let content: Vec<u8> = (0..100_000u32).map(|i| (i % 256) as u8).collect();
    let a = write_fixture(dir.path(), "a.bin", &content);
    let b = write_fixture(dir.path(), "b.bin", &content);

    let outcome = ComparisonService::new().evaluate(Some(&a), Some(&b));

    assert!(outcome.is_equal());
    assert_eq!(outcome.verdict(), "The Files Are The Same");
}

#[test]
fn test_single_byte_difference_is_different() {
    let dir = tempfile::tempdir().unwrap();
    let content = vec![0u8; 4096];
    let mut changed = content.clone();
    changed[2048] = 1;
    let a = write_fixture(dir.path(), "a.bin", &content);
    let b = write_fixture(dir.path(), "b.bin", &changed);

    let outcome = ComparisonService::new().evaluate(Some(&a), Some(&b));

    match outcome {
        ComparisonOutcome::Different { first, second } => {
            assert_ne!(first.md5, second.md5);
            assert_ne!(first.sha256, second.sha256);
        }
        other => panic!("Expected Different, got {:?}", other),
    }
}

#[test]
fn test_same_path_twice_is_equal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "self.txt", b"compare me with myself");

    let outcome = ComparisonService::new().evaluate(Some(&path), Some(&path));

    assert!(outcome.is_equal());
}

#[test]
fn test_missing_second_is_partial_failure() {
    let dir = tempfile::tempdir().unwrap();
    let present = write_fixture(dir.path(), "present.txt", b"abc");
    let missing = dir.path().join("missing.txt");

    let outcome = ComparisonService::new().evaluate(Some(&present), Some(&missing));

    match &outcome {
        ComparisonOutcome::PartialFailure { first, second } => {
            assert_eq!(first.as_ref().unwrap().md5, "900150983cd24fb0d6963f7d28e17f72");
            assert!(matches!(second, Err(DigestError::Unreadable { .. })));
        }
        other => panic!("Expected PartialFailure, got {:?}", other),
    }

    let failed = outcome.failed_inputs();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, InputSlot::Second);
    assert_eq!(failed[0].1.path(), Some(missing.as_path()));
}

#[test]
fn test_both_missing_reports_both_slots() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");

    let outcome = ComparisonService::new().evaluate(Some(&a), Some(&b));

    let slots: Vec<InputSlot> = outcome.failed_inputs().into_iter().map(|(slot, _)| slot).collect();
    assert_eq!(slots, vec![InputSlot::First, InputSlot::Second]);
}

#[test]
fn test_sequential_and_concurrent_agree() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_fixture(dir.path(), "a.txt", b"left");
    let b = write_fixture(dir.path(), "b.txt", b"right");

    let concurrent = ComparisonService::new().evaluate(Some(&a), Some(&b));
    let sequential = ComparisonService::new()
        .with_concurrency(false)
        .evaluate(Some(&a), Some(&b));

    match (concurrent, sequential) {
        (
            ComparisonOutcome::Different { first: c1, second: c2 },
            ComparisonOutcome::Different { first: s1, second: s2 },
        ) => {
            assert_eq!(c1, s1);
            assert_eq!(c2, s2);
        }
        other => panic!("Expected two Different outcomes, got {:?}", other),
    }
}

#[test]
fn test_evaluate_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_fixture(dir.path(), "a.txt", b"same");
    let b = write_fixture(dir.path(), "b.txt", b"same");
    let service = ComparisonService::with_engine(DigestEngine::with_buffer_size(2));

    for _ in 0..3 {
        assert!(service.evaluate(Some(&a), Some(&b)).is_equal());
    }
}

#[tokio::test]
async fn test_evaluate_async_matches_sync() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_fixture(dir.path(), "a.txt", b"abc");
    let b = write_fixture(dir.path(), "b.txt", b"abc");
    let service = ComparisonService::new();

    let outcome = service.evaluate_async(Some(a.clone()), Some(b.clone())).await.unwrap();
    assert!(outcome.is_equal());

    let outcome = service.evaluate_async(None, None).await.unwrap();
    assert!(matches!(outcome, ComparisonOutcome::NoInput));
}

#[test]
fn test_compute_each_requires_input() {
    let service = ComparisonService::new();
    assert!(matches!(service.compute_each(&[]), Err(DigestError::InputMissing)));
}

#[test]
fn test_compute_each_reports_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_fixture(dir.path(), "good.txt", b"abc");
    let missing = dir.path().join("missing.txt");
    let also_good = write_fixture(dir.path(), "also_good.txt", b"");

    let results = ComparisonService::new()
        .compute_each(&[good.clone(), missing.clone(), also_good.clone()])
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0, good);
    assert!(results[0].1.is_ok());
    assert_eq!(results[1].0, missing);
    assert!(results[1].1.is_err());
    assert_eq!(results[2].1.as_ref().unwrap().md5, "d41d8cd98f00b204e9800998ecf8427e");
}

#[test]
fn test_plain_text_report() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_fixture(dir.path(), "a.txt", b"abc");
    let missing = dir.path().join("missing.txt");

    let text = ComparisonService::new().evaluate(Some(&a), Some(&missing)).to_plain_text();

    assert!(text.contains("MD5 (File 1): 900150983cd24fb0d6963f7d28e17f72"));
    assert!(text.contains("SHA256 (File 1): ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"));
    assert!(text.contains("Error (File 2):"));
    assert!(text.ends_with("Comparison failed\n"));
}

#[test]
fn test_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_fixture(dir.path(), "a.txt", b"abc");
    let b = write_fixture(dir.path(), "b.txt", b"abd");

    let json = ComparisonService::new().evaluate(Some(&a), Some(&b)).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["status"], "different");
    assert_eq!(value["verdict"], "The Files Are Different");
    assert_eq!(value["inputs"][0]["slot"], "first");
    assert_eq!(value["inputs"][0]["digests"]["md5"], "900150983cd24fb0d6963f7d28e17f72");
    assert_eq!(value["inputs"][1]["digests"]["size"], 3u64);
    assert!(value["metadata"]["timestamp"].is_string());
}

#[test]
fn test_json_report_for_failure() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");

    let json = ComparisonService::new().evaluate(None, Some(&missing)).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["status"], "single_result");
    assert_eq!(value["inputs"][0]["slot"], "second");
    assert_eq!(value["inputs"][0]["error"]["kind"], "unreadable");
    assert!(value["inputs"][0].get("digests").is_none());
}

fn pair(md5: &str, sha256: &str) -> DigestPair {
    DigestPair {
        md5: md5.to_string(),
        sha256: sha256.to_string(),
        size: 3,
    }
}

#[test]
fn test_matching_md5_alone_is_different() {
    let first = pair("900150983cd24fb0d6963f7d28e17f72", "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    let second = pair("900150983cd24fb0d6963f7d28e17f72", "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");

    let outcome = ComparisonOutcome::from_results(Ok(first), Ok(second));

    assert!(matches!(outcome, ComparisonOutcome::Different { .. }));
}

#[test]
fn test_matching_sha256_alone_is_different() {
    let first = pair("900150983cd24fb0d6963f7d28e17f72", "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    let second = pair("d41d8cd98f00b204e9800998ecf8427e", "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");

    let outcome = ComparisonOutcome::from_results(Ok(first), Ok(second));

    assert!(matches!(outcome, ComparisonOutcome::Different { .. }));
}

#[test]
fn test_both_digests_matching_is_equal() {
    let first = pair("900150983cd24fb0d6963f7d28e17f72", "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");

    let outcome = ComparisonOutcome::from_results(Ok(first.clone()), Ok(first));

    assert!(outcome.is_equal());
}

#[test]
fn test_hash_json_carries_full_error() {
    let results: Vec<(PathBuf, DigestResult)> = vec![
        (PathBuf::from("abc.txt"), Ok(DigestEngine::digest_bytes(b"abc"))),
        (
            PathBuf::from("missing.txt"),
            Err(DigestError::unreadable(
                Path::new("missing.txt"),
                io::Error::new(io::ErrorKind::NotFound, "not found"),
            )),
        ),
    ];

    let json = hash_results_to_json(&results).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value[0]["path"], "abc.txt");
    assert_eq!(value[0]["digests"]["md5"], "900150983cd24fb0d6963f7d28e17f72");
    assert!(value[0].get("error").is_none());
    assert_eq!(value[1]["error"]["kind"], "unreadable");
    assert_eq!(value[1]["error"]["path"], "missing.txt");
    assert_eq!(value[1]["error"]["reason"], "not found");
}

#[test]
fn test_compare_and_hash_json_share_error_shape() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let service = ComparisonService::new();

    let compare: serde_json::Value =
        serde_json::from_str(&service.evaluate(Some(&missing), None).to_json().unwrap()).unwrap();
    let hash: serde_json::Value =
        serde_json::from_str(&hash_results_to_json(&service.compute_each(&[missing]).unwrap()).unwrap()).unwrap();

    assert_eq!(compare["inputs"][0]["error"], hash[0]["error"]);
}
