// Tests for the classifier registry and tagged dispatch

use super::*;
use crate::judgment::Status;

fn catalog() -> Arc<SignatureCatalog> {
    Arc::new(SignatureCatalog::default_catalog().unwrap())
}

#[test]
fn test_every_slug_builds_and_reports_its_name() {
    let thresholds = Thresholds::default();
    let catalog = catalog();
    for slug in ClassifierKind::SLUGS {
        let kind = ClassifierKind::from_slug(slug, &thresholds, &catalog)
            .unwrap_or_else(|| panic!("slug {} did not build", slug));
        assert_eq!(kind.name(), slug);
        assert!(ClassifierKind::is_known_slug(slug));
    }
}

#[test]
fn test_unknown_slug() {
    assert!(!ClassifierKind::is_known_slug("ping"));
    assert!(ClassifierKind::from_slug("ping", &Thresholds::default(), &catalog()).is_none());
}

#[test]
fn test_dispatch_matches_direct_call() {
    let kind = ClassifierKind::StatusCode(StatusCodeClassifier::new());
    let evidence = Evidence::builder("http://a.com/").status_code(503).build();
    assert_eq!(
        kind.classify(&evidence),
        StatusCodeClassifier::new().classify(&evidence)
    );
}

#[test]
#[allow(clippy::field_reassign_with_default)]
fn test_thresholds_flow_into_classifiers() {
    let mut thresholds = Thresholds::default();
    thresholds.empty_page.min_length = 10;
    thresholds.empty_page.near_zero_length = 2;

    let kind = ClassifierKind::from_slug("empty_page", &thresholds, &catalog()).unwrap();
    let evidence = Evidence::builder("http://a.com/").content("short page").build();
    assert_eq!(kind.classify(&evidence).status(), Status::Up);
}

#[test]
fn test_leaf_abstention_keeps_name() {
    let kind = ClassifierKind::from_slug("throttle", &Thresholds::default(), &catalog()).unwrap();
    let judgment = kind.abstention("screened");
    assert_eq!(judgment.classifier(), "throttle");
    assert_eq!(judgment.abstention_reason(), Some("screened"));
    assert!(judgment.constituents().is_empty());
}

/// Every leaf stays in [0, 1] and never panics on bare evidence
#[test]
fn test_bare_evidence_is_handled_by_every_leaf() {
    let thresholds = Thresholds::default();
    let catalog = catalog();
    let bare = Evidence::builder("").build();
    for slug in ClassifierKind::SLUGS {
        let kind = ClassifierKind::from_slug(slug, &thresholds, &catalog).unwrap();
        let judgment = kind.classify(&bare);
        assert!((0.0..=1.0).contains(&judgment.confidence()), "{}", slug);
    }
}
