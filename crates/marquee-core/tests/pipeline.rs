use std::fs;
use std::path::Path;

use marquee_core::profiles::ProfileRegistry;
use marquee_core::{CoreError, Pipeline, Profile, Table};
use polars::prelude::*;
use tempfile::tempdir;

const HEADER: &str = "budget,genres,homepage,id,keywords,original_language,original_title,overview,popularity,release_date,revenue,runtime,status,title,vote_average,vote_count,cast,crew";

const PRUNED: [&str; 8] = [
    "budget",
    "homepage",
    "original_title",
    "popularity",
    "revenue",
    "status",
    "vote_average",
    "vote_count",
];

fn movie_row(id: i64, title: &str, overview: &str, homepage: &str) -> String {
    format!(
        concat!(
            "1000,\"[{{'id': 35, 'name': 'Comedy'}}, {{'id':18,'name':'Drama'}}]\",{homepage},{id},",
            "\"[{{'id': 1, 'name': 'love'}}]\",en,{title},{overview},1.5,2009-12-10,5000,120.0,Released,{title},7.2,100,",
            "\"[{{'cast_id': 1, 'character': \"\"Jake 'Sully'\"\", 'name': 'Sam Worthington'}}]\",",
            "\"[{{'job': 'Director', 'name': 'James Cameron'}}]\""
        ),
        homepage = homepage,
        id = id,
        title = title,
        overview = overview,
    )
}

fn write_csv(path: &Path, rows: &[String]) {
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(path, content).expect("write fixture");
}

fn movie_profile() -> Profile {
    ProfileRegistry::builtin()
        .resolve("1")
        .expect("movie profile")
        .clone()
}

fn strings(frame: &DataFrame, column: &str) -> Vec<Option<String>> {
    frame
        .column(column)
        .unwrap()
        .cast(&DataType::String)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect()
}

#[test]
fn keeps_only_the_well_formed_row() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw/movies.csv");
    fs::create_dir_all(input.parent().unwrap()).unwrap();
    let output = dir.path().join("data/modified/movies.csv");

    write_csv(
        &input,
        &[
            movie_row(19995, "Avatar", "A paraplegic marine", ""),
            movie_row(19995, "Avatar Copy", "A duplicate", "http://example.com"),
            movie_row(285, "Pirates", "", "http://example.com"),
        ],
    );

    let summary = Pipeline::new(&input, movie_profile())
        .with_output(&output)
        .run()
        .expect("pipeline run");

    assert_eq!(summary.rows_loaded, 3);
    assert_eq!(summary.rows_dropped_null, 1);
    assert_eq!(summary.rows_dropped_duplicate, 1);
    assert_eq!(summary.rows_written, 1);
    assert_eq!(summary.columns_dropped.len(), 8);
    assert_eq!(summary.columns_parsed, vec!["genres", "keywords", "cast", "crew"]);

    let written = Table::load(&output).expect("reload output");
    let frame = written.frame();
    assert_eq!(frame.height(), 1);

    let columns = written.column_names();
    for pruned in PRUNED {
        assert!(!columns.iter().any(|c| c == pruned), "{pruned} should be pruned");
    }
    assert_eq!(columns.last().map(String::as_str), Some("combined_text"));

    assert_eq!(strings(frame, "title"), vec![Some("Avatar".to_string())]);
    assert_eq!(
        strings(frame, "genres"),
        vec![Some("Comedy, Drama".to_string())]
    );
    assert_eq!(strings(frame, "keywords"), vec![Some("love".to_string())]);
    assert_eq!(
        strings(frame, "crew"),
        vec![Some("[{'job': 'Director', 'name': 'James Cameron'}]".to_string())]
    );
    assert_eq!(
        strings(frame, "combined_text"),
        vec![Some(
            "Comedy Drama love Sam Worthington James Cameron A paraplegic marine".to_string()
        )]
    );
}

#[test]
fn nulls_are_removed_before_duplicates() {
    // The first row with id 7 has a null, so the later, complete row survives.
    let mut table = Table::from(
        df!(
            "id" => [7i64, 7, 8],
            "overview" => [None, Some("kept"), Some("other")],
        )
        .unwrap(),
    );
    let profile = Profile {
        structured_fields: vec![],
        named_fields: vec![],
        text_fields: vec!["overview".to_string()],
        ..movie_profile()
    };

    let summary = Pipeline::new("unused.csv", profile)
        .transform(&mut table)
        .unwrap();

    assert_eq!(summary.rows_dropped_null, 1);
    assert_eq!(summary.rows_dropped_duplicate, 0);
    assert_eq!(
        strings(table.frame(), "combined_text"),
        vec![Some("kept".to_string()), Some("other".to_string())]
    );
}

#[test]
fn output_round_trips_row_count_and_columns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested/dir/out.csv");

    let mut table = Table::from(
        df!(
            "id" => [1i64, 2],
            "genres" => ["[{'name': 'Action'}]", "[{'name': 'War'}, {'name': 'History'}]"],
            "overview" => ["one, with comma", "two \"quoted\""],
        )
        .unwrap(),
    );
    table
        .parse_structured_fields(&["genres".to_string()], &["genres".to_string()])
        .unwrap();
    table
        .extract_text(&["genres".to_string(), "overview".to_string()], "combined_text")
        .unwrap();
    table.write_csv(&path).expect("write creates parent dirs");

    let reloaded = Table::load(&path).unwrap();
    assert_eq!(reloaded.height(), table.height());
    assert_eq!(reloaded.column_names(), table.column_names());
    assert_eq!(
        strings(reloaded.frame(), "combined_text"),
        vec![
            Some("Action one, with comma".to_string()),
            Some("War History two \"quoted\"".to_string())
        ]
    );
}

#[test]
fn write_overwrites_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.csv");
    fs::write(&path, "stale,content\n1,2\n3,4\n5,6\n").unwrap();

    let table = Table::from(df!("id" => [1i64]).unwrap());
    table.write_csv(&path).unwrap();

    assert_eq!(Table::load(&path).unwrap().height(), 1);
}

#[test]
fn missing_input_is_a_file_access_error() {
    let dir = tempdir().unwrap();
    let err = Table::load(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, CoreError::FileAccess { .. }));

    let err = Table::load(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::FileAccess { .. }));
}

#[test]
fn malformed_structured_cell_aborts_without_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("movies.csv");
    let output = dir.path().join("out/movies.csv");

    let mut bad = movie_row(1, "Broken", "text", "");
    bad = bad.replacen("[{'id': 1, 'name': 'love'}]", "[{'name': 'love'", 1);
    write_csv(&input, &[movie_row(2, "Fine", "text", ""), bad]);

    let err = Pipeline::new(&input, movie_profile())
        .with_output(&output)
        .run()
        .unwrap_err();

    match err {
        CoreError::FieldParse { column, row, .. } => {
            assert_eq!(column, "keywords");
            assert_eq!(row, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn missing_id_column_is_a_schema_error() {
    let mut table = Table::from(df!("title" => ["A"], "overview" => ["B"]).unwrap());
    let err = Pipeline::new("unused.csv", movie_profile())
        .transform(&mut table)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::SchemaAssumption { ref column, .. } if column == "id"
    ));
}

#[test]
fn missing_value_markers_count_as_nulls() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("markers.csv");
    fs::write(
        &path,
        "id,overview,runtime\n1,NA,90\n2,ok,NaN\n3,fine,100\n4,N/A,80\n5,null,70\n6,None,60\n7,#N/A,50\n",
    )
    .unwrap();

    let mut table = Table::load(&path).unwrap();
    assert_eq!(table.drop_nulls().unwrap(), 6);
    assert_eq!(table.height(), 1);
    assert_eq!(strings(table.frame(), "id"), vec![Some("3".to_string())]);
    assert_eq!(strings(table.frame(), "overview"), vec![Some("fine".to_string())]);
}
