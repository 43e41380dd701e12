//! Integration tests for CLI tool execution
//!
//! Exercises the execute_* functions end to end against fixture files.

#[cfg(test)]
mod cli_integration_tests {
    use std::io::Write;

    use serde_json::{json, Value};
    use tempfile::NamedTempFile;

    use crate::cli::{FacetsArgs, ReportArgs, SearchArgs, SuggestArgs};
    use crate::config::EngineConfig;
    use crate::tools::grade::execute_report;
    use crate::tools::search::{execute_facets, execute_search, execute_suggest};

    // Test fixture: a small subject catalogue
    fn subjects_file() -> NamedTempFile {
        let subjects = json!([
            {"name": "Mathematics", "code": "MATH101", "department": "Sciences", "students": 120},
            {"name": "Maths Advanced", "code": "MATH201", "department": "Sciences", "students": 35},
            {"name": "English Language", "code": "ENG101", "department": "Languages", "students": 140},
            {"name": "Biology", "code": "BIO101", "department": "Sciences", "students": 90},
            {"name": "History", "code": "HIS101", "department": "Humanities", "teacher": {"name": "Mr Banda"}}
        ]);
        write_fixture(&subjects.to_string())
    }

    fn write_fixture(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn path(file: &NamedTempFile) -> String {
        file.path().to_str().unwrap().to_string()
    }

    fn search_args(file: &NamedTempFile, query: &str) -> SearchArgs {
        SearchArgs {
            input: path(file),
            query: query.to_string(),
            fields: vec!["name".to_string()],
            ..SearchArgs::default()
        }
    }

    #[test]
    fn test_execute_search_markdown_highlights() {
        let file = subjects_file();
        let md = execute_search(search_args(&file, "math"), &EngineConfig::default()).unwrap();

        assert!(md.starts_with("# Search Results · 2 of 2 records"), "got:\n{}", md);
        assert!(md.contains("1. **Math**ematics"), "got:\n{}", md);
        assert!(md.contains("2. **Math**s Advanced"), "got:\n{}", md);
    }

    #[test]
    fn test_execute_search_json_envelope() {
        let file = subjects_file();
        let args = SearchArgs {
            json: true,
            threshold: Some(0.5),
            ..search_args(&file, "biology")
        };
        let out = execute_search(args, &EngineConfig::default()).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["total"], 1);
        assert_eq!(value["hasMore"], false);
        assert_eq!(value["results"][0]["item"]["code"], "BIO101");
        assert_eq!(value["results"][0]["highlights"][0]["start"], 0);
    }

    #[test]
    fn test_execute_search_with_filters_and_sort() {
        let file = subjects_file();
        let args = SearchArgs {
            filters: vec!["department:equals:sciences".to_string()],
            sort: Some("students:desc".to_string()),
            json: true,
            ..search_args(&file, "")
        };
        let out = execute_search(args, &EngineConfig::default()).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        let codes: Vec<&str> = value["results"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|r| r["item"]["code"].as_str())
            .collect();
        assert_eq!(codes, vec!["MATH101", "BIO101", "MATH201"]);
    }

    #[test]
    fn test_execute_search_nested_field() {
        let file = subjects_file();
        let args = SearchArgs {
            fields: vec!["teacher.name".to_string()],
            ..search_args(&file, "banda")
        };
        let md = execute_search(args, &EngineConfig::default()).unwrap();
        assert!(md.contains("Mr **Banda**"), "got:\n{}", md);
        assert!(md.contains("teacher.name"));
    }

    #[test]
    fn test_execute_search_pagination_note() {
        let file = subjects_file();
        let args = SearchArgs {
            limit: Some(2),
            ..search_args(&file, "")
        };
        let md = execute_search(args, &EngineConfig::default()).unwrap();
        assert!(md.starts_with("# Search Results · 2 of 5 records"));
        assert!(md.contains("_3 more results"));
    }

    #[test]
    fn test_execute_search_no_matches_is_not_found() {
        let file = subjects_file();
        let err = execute_search(search_args(&file, "zzzzzzzzzz"), &EngineConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "not_found");
    }

    #[test]
    fn test_execute_search_needs_fields() {
        let file = subjects_file();
        let args = SearchArgs {
            fields: Vec::new(),
            ..search_args(&file, "math")
        };
        let err = execute_search(args, &EngineConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "invalid_input");
    }

    #[test]
    fn test_execute_search_uses_config_fields() {
        let file = subjects_file();
        let config = EngineConfig {
            search_fields: vec!["code".to_string()],
            ..EngineConfig::default()
        };
        let args = SearchArgs {
            fields: Vec::new(),
            json: true,
            ..search_args(&file, "eng101")
        };
        let value: Value = serde_json::from_str(&execute_search(args, &config).unwrap()).unwrap();
        assert_eq!(value["results"][0]["matchedField"], "code");
    }

    #[test]
    fn test_execute_search_bad_filter_expression() {
        let file = subjects_file();
        let args = SearchArgs {
            filters: vec!["department".to_string()],
            ..search_args(&file, "math")
        };
        let err = execute_search(args, &EngineConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_execute_suggest() {
        let file = subjects_file();
        let args = SuggestArgs {
            input: path(&file),
            query: "mat".to_string(),
            fields: vec!["name".to_string()],
            limit: None,
            json: false,
        };
        let md = execute_suggest(args, &EngineConfig::default()).unwrap();
        assert!(md.contains("- **Mathematics** (name, 1 match)"), "got:\n{}", md);
        assert!(md.contains("- **Maths** (name, 1 match)"), "got:\n{}", md);
    }

    #[test]
    fn test_execute_suggest_short_query() {
        let file = subjects_file();
        let args = SuggestArgs {
            input: path(&file),
            query: "m".to_string(),
            fields: vec!["name".to_string()],
            limit: None,
            json: true,
        };
        assert_eq!(execute_suggest(args, &EngineConfig::default()).unwrap(), "[]");
    }

    #[test]
    fn test_execute_facets() {
        let file = subjects_file();
        let args = FacetsArgs {
            input: path(&file),
            field: "department".to_string(),
            json: false,
        };
        let md = execute_facets(args, &EngineConfig::default()).unwrap();
        assert!(md.starts_with("# Values of `department` · 3"));
        assert!(md.contains("- Humanities\n- Languages\n- Sciences\n"));

        let missing = FacetsArgs {
            input: path(&file),
            field: "room".to_string(),
            json: false,
        };
        assert!(execute_facets(missing, &EngineConfig::default()).is_err());
    }

    #[test]
    fn test_execute_report() {
        let student = json!({
            "name": "Mwila",
            "attendance": 96,
            "subjects": [
                {"name": "Mathematics", "score": 88},
                {"name": "English", "score": 79},
                {"name": "Civic Education", "score": "X"}
            ]
        });
        let file = write_fixture(&student.to_string());
        let args = ReportArgs {
            input: path(&file),
            level: Some("grade11".to_string()),
            json: true,
        };
        let value: Value =
            serde_json::from_str(&execute_report(args, &EngineConfig::default()).unwrap()).unwrap();

        assert_eq!(value["average"], 83.5);
        assert_eq!(value["overall"]["grade"], "1");
        assert_eq!(value["riskLevel"], "low");
        assert_eq!(value["subjects"][2]["grade"]["status"], "ABSENT");
        assert!(value["insights"]["strengths"]
            .as_array()
            .unwrap()
            .iter()
            .any(|s| s == "Excellent attendance (96%)"));
    }

    #[test]
    fn test_execute_report_malformed_student() {
        let file = write_fixture("{\"subjects\": 3}");
        let args = ReportArgs {
            input: path(&file),
            level: None,
            json: false,
        };
        let err = execute_report(args, &EngineConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "parse_error");
    }
}
