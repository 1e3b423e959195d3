// Unit tests for paper storage and corpus loading.
//
// Round-trips tables through a temp directory: abstract-length filtering
// on save, Reject filtering and conference/year selection on load, and
// the error kinds for empty saves and empty loads.

use std::path::Path;

use papermap::error::PapersError;
use papermap::papers::loader::{load, matching_tables, CorpusQuery};
use papermap::papers::models::PaperRecord;
use papermap::papers::store::{read_table, save, table_path};

fn paper(year: u16, conference: &str, title: &str, abstract_len: usize, decision: Option<&str>) -> PaperRecord {
    PaperRecord {
        year,
        title: title.to_string(),
        abstract_text: "a".repeat(abstract_len),
        conference: conference.to_string(),
        decision: decision.map(str::to_string),
    }
}

fn sorted_titles(records: &[PaperRecord]) -> Vec<String> {
    let mut titles: Vec<String> = records.iter().map(|r| r.title.clone()).collect();
    titles.sort();
    titles
}

// ============================================================
// RecordStore
// ============================================================

#[test]
fn save_drops_short_abstracts_and_reports_count() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![
        paper(2022, "cvpr", "Kept", 250, None),
        paper(2022, "cvpr", "Boundary", 200, None),
        paper(2022, "cvpr", "Dropped", 199, None),
    ];

    let report = save(&records, "cvpr", 2022, dir.path(), 200).unwrap();
    assert_eq!(report.kept, 2);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.path, table_path(dir.path(), "cvpr", 2022));

    let stored = read_table(&report.path).unwrap();
    assert!(stored.iter().all(|r| r.abstract_len() >= 200));
    assert_eq!(sorted_titles(&stored), vec!["Boundary", "Kept"]);
}

#[test]
fn abstract_length_counts_characters() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = paper(2021, "cvpr", "Accents", 0, None);
    // 200 two-byte characters
    record.abstract_text = "é".repeat(200);

    let report = save(&[record], "cvpr", 2021, dir.path(), 200).unwrap();
    assert_eq!(report.kept, 1);
}

#[test]
fn write_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![
        paper(2020, "iclr", "Poster", 300, Some("Accept (Poster)")),
        paper(2020, "iclr", "Oral", 300, Some("Accept (Oral)")),
    ];
    save(&records, "iclr", 2020, dir.path(), 200).unwrap();

    let corpus = load(dir.path(), &CorpusQuery::all()).unwrap();
    let mut loaded = corpus.into_papers();
    let mut expected = records.clone();
    loaded.sort_by(|a, b| a.title.cmp(&b.title));
    expected.sort_by(|a, b| a.title.cmp(&b.title));
    assert_eq!(loaded, expected);
}

#[test]
fn empty_save_is_an_error_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let err = save(&[], "cvpr", 2019, dir.path(), 200).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PapersError>(),
        Some(PapersError::EmptyCollection { year: 2019, .. })
    ));
    assert!(!table_path(dir.path(), "cvpr", 2019).exists());
}

#[test]
fn ragged_table_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cvpr_2020.json");
    std::fs::write(
        &path,
        r#"{"year": [2020, 2020], "title": ["a"], "abstract": ["x", "y"], "conference": ["cvpr", "cvpr"]}"#,
    )
    .unwrap();

    let err = read_table(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PapersError>(),
        Some(PapersError::CorruptTable { .. })
    ));
}

// ============================================================
// CorpusLoader
// ============================================================

fn populated_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    save(
        &[
            paper(2019, "cvpr", "Stereo 2019", 300, None),
            paper(2019, "cvpr", "Flow 2019", 300, None),
        ],
        "cvpr",
        2019,
        dir.path(),
        200,
    )
    .unwrap();
    save(
        &[paper(2022, "cvpr", "Detection 2022", 300, None)],
        "cvpr",
        2022,
        dir.path(),
        200,
    )
    .unwrap();
    save(
        &[
            paper(2020, "iclr", "Accepted 2020", 300, Some("Accept (Poster)")),
            paper(2020, "iclr", "Rejected 2020", 300, Some("Reject")),
        ],
        "iclr",
        2020,
        dir.path(),
        200,
    )
    .unwrap();
    dir
}

#[test]
fn loader_excludes_rejected_rows() {
    let dir = populated_dir();
    let corpus = load(dir.path(), &CorpusQuery::all().conference("iclr")).unwrap();
    assert_eq!(sorted_titles(corpus.papers()), vec!["Accepted 2020"]);
}

#[test]
fn tables_without_decisions_keep_every_row() {
    let dir = populated_dir();
    let corpus = load(dir.path(), &CorpusQuery::all().conference("cvpr")).unwrap();
    assert_eq!(corpus.len(), 3);
    assert!(corpus.papers().iter().all(|p| p.decision.is_none()));
}

#[test]
fn loader_applies_conference_and_year() {
    let dir = populated_dir();

    let all = load(dir.path(), &CorpusQuery::all()).unwrap();
    assert_eq!(all.len(), 4);

    let cvpr_2019 = load(dir.path(), &CorpusQuery::all().conference("cvpr").year(2019)).unwrap();
    assert_eq!(sorted_titles(cvpr_2019.papers()), vec!["Flow 2019", "Stereo 2019"]);

    // A year with no rows in matching tables is an empty corpus, not an error
    let none = load(dir.path(), &CorpusQuery::all().conference("cvpr").year(2020)).unwrap();
    assert!(none.is_empty());
}

#[test]
fn matching_tables_are_sorted_and_prefixed() {
    let dir = populated_dir();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let cvpr = matching_tables(dir.path(), Some("cvpr")).unwrap();
    let names: Vec<String> = cvpr
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["cvpr_2019.json", "cvpr_2022.json"]);

    assert_eq!(matching_tables(dir.path(), None).unwrap().len(), 3);
}

#[test]
fn no_matching_files_is_no_data_found() {
    let dir = populated_dir();
    let err = load(dir.path(), &CorpusQuery::all().conference("neurips")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PapersError>(),
        Some(PapersError::NoDataFound { .. })
    ));

    let err = load(Path::new("/definitely/not/here"), &CorpusQuery::all()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PapersError>(),
        Some(PapersError::NoDataFound { .. })
    ));
}
