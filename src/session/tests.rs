// Tests for session loading and screening

use super::*;
use crate::config::Config;
use crate::judgment::Status;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const SESSION: &str = r#"{
  "url": "http://news.example.com/",
  "baseline": "page_0",
  "pageDetail": {
    "page_0": { "asn": 13335, "countryCode": "us", "errors": [] },
    "page_1": { "asn": 197328, "countryCode": "tr", "errors": [], "screenshot": "data:image/png;base64,AAAA" }
  },
  "har": { "log": {
    "pages": [
      { "id": "page_0", "pageTimings": { "onLoad": 850 } },
      { "id": "page_1", "pageTimings": { "onLoad": -1 } }
    ],
    "entries": [
      { "pageref": "page_0", "time": 850,
        "request": { "url": "http://news.example.com/" },
        "response": { "status": 200, "headers": [], "redirectURL": "",
          "content": { "size": 11, "text": "hello world" } } },
      { "pageref": "page_1", "time": 40,
        "request": { "url": "http://news.example.com/" },
        "response": { "status": 302, "redirectURL": "/blocked",
          "headers": [ { "name": "Location", "value": "/blocked" } ],
          "content": {} } },
      { "pageref": "page_1", "time": 60,
        "request": { "url": "http://news.example.com/blocked" },
        "response": { "status": 200, "headers": [ { "name": "Server", "value": "nginx" } ],
          "redirectURL": "",
          "content": { "text": "PHRpdGxlPlRlbGVrb23DvG5pa2FzeW9uIMSwbGV0acWfaW0gQmHFn2thbmzEscSfxLE8L3RpdGxlPg==", "encoding": "base64" } } }
    ]
  } }
}"#;

#[test]
fn test_target_and_baseline_selected() {
    let evidence = parse_str(SESSION).unwrap();
    assert_eq!(evidence.page_id(), Some("page_1"));
    assert_eq!(evidence.requested_url(), "http://news.example.com/");
    assert_eq!(evidence.final_url(), Some("http://news.example.com/blocked"));
    assert_eq!(evidence.status_code(), Some(200));
    assert_eq!(evidence.load_time_ms(), Some(100.0));
    assert_eq!(evidence.asn(), Some(197328));
    assert_eq!(evidence.country_code(), Some("TR"));
    assert_eq!(evidence.header("server"), Some("nginx"));
    assert!(evidence.screenshot().is_some());
    assert!(evidence
        .content()
        .unwrap()
        .contains("Telekomünikasyon İletişim Başkanlığı"));

    let baseline = evidence.baseline().unwrap();
    assert_eq!(baseline.page_id(), Some("page_0"));
    assert_eq!(baseline.content(), Some("hello world"));
    assert_eq!(baseline.load_time_ms(), Some(850.0));
    assert!(baseline.final_url().is_none());
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SESSION.as_bytes()).unwrap();
    file.flush().unwrap();
    let evidence = load(file.path()).unwrap();
    assert_eq!(evidence.page_id(), Some("page_1"));
}

#[test]
fn test_baseline_false_has_no_baseline() {
    let json = SESSION.replace(r#""baseline": "page_0""#, r#""baseline": false"#);
    let evidence = parse_str(&json).unwrap();
    // Last page in HAR order
    assert_eq!(evidence.page_id(), Some("page_1"));
    assert!(evidence.baseline().is_none());
}

#[test]
fn test_missing_baseline_page_is_tolerated() {
    let json = SESSION.replace(r#""baseline": "page_0""#, r#""baseline": "page_9""#);
    let evidence = parse_str(&json).unwrap();
    assert!(evidence.baseline().is_none());
}

#[test]
fn test_malformed_documents() {
    assert!(matches!(
        parse_str(r#"{ "har": { "log": { "pages": [] } } }"#),
        Err(Error::MalformedSession(_))
    ));
    assert!(matches!(
        parse_str(r#"{ "url": "http://a.com/", "har": { "log": { "pages": [] } } }"#),
        Err(Error::MalformedSession(_))
    ));
    assert!(matches!(
        parse_str(r#"{ "url": "http://a.com/" }"#),
        Err(Error::MalformedSession(_))
    ));
    assert!(matches!(
        parse_str(
            r#"{ "url": "http://a.com/", "baseline": "p",
                 "har": { "log": { "pages": [ { "id": "p" } ] } } }"#
        ),
        Err(Error::MalformedSession(_))
    ));
    assert!(matches!(parse_str("not json"), Err(Error::Json(_))));
}

#[test]
fn test_page_without_entries_still_loads() {
    let evidence = parse_str(
        r#"{ "url": "http://a.com/", "baseline": false,
             "pageDetail": { "p": { "errors": ["(56, 'Recv failure: Connection reset by peer')"] } },
             "har": { "log": { "pages": [ { "id": "p" } ] } } }"#,
    )
    .unwrap();
    assert!(evidence.status_code().is_none());
    assert!(evidence.content().is_none());
    assert_eq!(evidence.errors().len(), 1);
}

#[test]
fn test_classify_session_end_to_end() {
    let config = Config::default_config().unwrap();
    let catalog = Arc::new(SignatureCatalog::default_catalog().unwrap());
    let pipeline = ClassifyPipeline::from_config(&config, Arc::clone(&catalog)).unwrap();

    let evidence = parse_str(SESSION).unwrap();
    let judgment = classify_session(&pipeline, &catalog, &evidence);
    assert_eq!(judgment.status(), Status::Down);
    assert!(judgment.is_blocked());
    assert_eq!(judgment.constituents().len(), 8);
    assert!(judgment.constituent("block_page").unwrap().is_blocked());
}

#[test]
fn test_screened_session_abstains_whole_tree() {
    let config = Config::default_config().unwrap();
    let catalog = Arc::new(SignatureCatalog::default_catalog().unwrap());
    let pipeline = ClassifyPipeline::from_config(&config, Arc::clone(&catalog)).unwrap();

    let evidence = Evidence::builder("http://a.com/")
        .status_code(403)
        .header("Server", "AkamaiGHost")
        .build();
    let judgment = classify_session(&pipeline, &catalog, &evidence);
    assert!(judgment.is_abstained());
    assert!(!judgment.is_down());
    assert_eq!(judgment.constituents().len(), 8);
    assert!(judgment
        .constituents()
        .iter()
        .all(|c| c.abstention_reason() == Some("inconclusive: Akamai captcha challenge")));
}

#[test]
fn test_location_header_on_followed_redirect_is_blocked() {
    let json = r#"{
      "url": "http://news.example.com/",
      "baseline": false,
      "pageDetail": { "page_1": { "asn": 5607, "countryCode": "GB", "errors": [] } },
      "har": { "log": {
        "pages": [ { "id": "page_1", "pageTimings": { "onLoad": 300 } } ],
        "entries": [
          { "pageref": "page_1", "time": 40,
            "request": { "url": "http://news.example.com/" },
            "response": { "status": 302, "redirectURL": "http://blocked.nb.sky.com/",
              "headers": [ { "name": "Location", "value": "http://blocked.nb.sky.com/" } ],
              "content": {} } },
          { "pageref": "page_1", "time": 60,
            "request": { "url": "http://blocked.nb.sky.com/" },
            "response": { "status": 200, "headers": [], "redirectURL": "",
              "content": { "text": "<html>Sorry, this site is not available</html>" } } }
        ]
      } }
    }"#;
    let evidence = parse_str(json).unwrap();
    assert_eq!(evidence.final_url(), Some("http://blocked.nb.sky.com/"));
    assert!(evidence.header("location").is_none());
    assert_eq!(evidence.exchanges().len(), 2);
    assert_eq!(evidence.exchanges()[0].url, "http://news.example.com/");

    let config = Config::default_config().unwrap();
    let catalog = Arc::new(SignatureCatalog::default_catalog().unwrap());
    let pipeline = ClassifyPipeline::from_config(&config, Arc::clone(&catalog)).unwrap();
    let judgment = classify_session(&pipeline, &catalog, &evidence);

    let block_page = judgment.constituent("block_page").unwrap();
    assert_eq!(block_page.status(), Status::Down);
    assert_eq!(block_page.confidence(), 1.0);
    assert!(block_page.is_blocked());
    assert!(judgment.is_down());
    assert!(judgment.is_blocked());
}
