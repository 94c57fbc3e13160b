use std::fs;

use super::*;
use crate::enumerate::job::failure_marker_path;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"{}").unwrap();
}

fn names(jobs: &[PendingJob]) -> Vec<String> {
    jobs.iter().map(|j| j.job.base_name.clone()).collect()
}

fn tags(job: &PendingJob) -> Vec<String> {
    job.tasks.iter().map(|t| t.variant.tag()).collect()
}

#[test]
fn emits_all_variants_when_nothing_exists() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("face001.json"));

    let jobs: Vec<_> = WorkEnumerator::new(dir.path(), EnumerateOpts::default())
        .unwrap()
        .collect();
    assert_eq!(names(&jobs), vec!["face001"]);
    assert_eq!(tags(&jobs[0]), vec!["angle0", "angle35"]);
    assert_eq!(
        jobs[0].tasks[1].artifact,
        dir.path().join("face001_angle35.png")
    );
    assert!(jobs[0].tasks.iter().all(|t| t.state == TaskState::Pending));
}

#[test]
fn existing_artifact_removes_its_variant() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("face001.json"));
    touch(&dir.path().join("face001_angle0.png"));

    let jobs: Vec<_> = WorkEnumerator::new(dir.path(), EnumerateOpts::default())
        .unwrap()
        .collect();
    assert_eq!(tags(&jobs[0]), vec!["angle35"]);
}

#[test]
fn failure_marker_counts_as_done() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("face001.json"));
    touch(&failure_marker_path(&dir.path().join("face001_angle35.png")));

    let jobs: Vec<_> = WorkEnumerator::new(dir.path(), EnumerateOpts::default())
        .unwrap()
        .collect();
    assert_eq!(tags(&jobs[0]), vec!["angle0"]);
}

#[test]
fn fully_done_jobs_are_skipped_and_reported_with_next_job() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a", "b", "c"] {
        touch(&dir.path().join(format!("{name}.json")));
    }
    for name in ["a", "b"] {
        touch(&dir.path().join(format!("{name}_angle0.png")));
        touch(&failure_marker_path(
            &dir.path().join(format!("{name}_angle35.png")),
        ));
    }

    let mut e = WorkEnumerator::new(dir.path(), EnumerateOpts::default()).unwrap();
    let first = e.next().unwrap();
    assert_eq!(first.job.base_name, "c");
    assert_eq!(first.skipped_before, 2);
    assert!(e.next().is_none());

    let stats = e.stats();
    assert_eq!(stats.jobs_skipped, 2);
    assert_eq!(stats.jobs_emitted, 1);
    assert_eq!(stats.variants_pending, 2);
}

#[test]
fn filter_selects_matching_files_only() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("face001.json"));
    touch(&dir.path().join("notes.txt"));
    touch(&dir.path().join("face002.JSON.bak"));

    let jobs: Vec<_> = WorkEnumerator::new(dir.path(), EnumerateOpts::default())
        .unwrap()
        .collect();
    assert_eq!(names(&jobs), vec!["face001"]);
}

#[test]
fn traversal_lists_directory_files_before_descending() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("b.json"));
    touch(&dir.path().join("a").join("x.json"));
    touch(&dir.path().join("a").join("deep").join("y.json"));
    touch(&dir.path().join("c").join("z.json"));
    touch(&dir.path().join("d.json"));

    let opts = EnumerateOpts {
        recursive: true,
        ..Default::default()
    };
    let jobs: Vec<_> = WorkEnumerator::new(dir.path(), opts).unwrap().collect();
    assert_eq!(names(&jobs), vec!["b", "d", "x", "y", "z"]);
}

#[test]
fn non_recursive_stays_in_root() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("top.json"));
    touch(&dir.path().join("sub").join("nested.json"));

    let mut e = WorkEnumerator::new(dir.path(), EnumerateOpts::default()).unwrap();
    let jobs: Vec<_> = e.by_ref().collect();
    assert_eq!(names(&jobs), vec!["top"]);
    assert_eq!(e.stats().dirs_visited, 1);
}

#[test]
fn artifacts_are_colocated_with_nested_inputs() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("sub").join("face.json"));

    let opts = EnumerateOpts {
        recursive: true,
        ..Default::default()
    };
    let jobs: Vec<_> = WorkEnumerator::new(dir.path(), opts).unwrap().collect();
    assert_eq!(
        jobs[0].tasks[0].artifact,
        dir.path().join("sub").join("face_angle0.png")
    );
}

#[test]
fn excluded_staging_file_is_never_a_job() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("face001.json"));
    touch(&dir.path().join("test.json"));

    let opts = EnumerateOpts {
        // Spelled differently from the listed path on purpose.
        exclude: vec![dir.path().join(".").join("test.json")],
        ..Default::default()
    };
    let jobs: Vec<_> = WorkEnumerator::new(dir.path(), opts).unwrap().collect();
    assert_eq!(names(&jobs), vec!["face001"]);
}

#[test]
fn exclusion_matches_the_file_not_just_its_name() {
    let dir = tempfile::tempdir().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();
    touch(&dir.path().join("test.json"));
    touch(&elsewhere.path().join("test.json"));

    let opts = EnumerateOpts {
        exclude: vec![elsewhere.path().join("test.json")],
        ..Default::default()
    };
    let jobs: Vec<_> = WorkEnumerator::new(dir.path(), opts).unwrap().collect();
    assert_eq!(names(&jobs), vec!["test"]);
}

#[test]
fn invalid_options_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    assert!(WorkEnumerator::new(&missing, EnumerateOpts::default()).is_err());

    let no_variants = EnumerateOpts {
        variants: vec![],
        ..Default::default()
    };
    assert!(WorkEnumerator::new(dir.path(), no_variants).is_err());

    let bad_glob = EnumerateOpts {
        filter: "[".to_string(),
        ..Default::default()
    };
    assert!(WorkEnumerator::new(dir.path(), bad_glob).is_err());
}
