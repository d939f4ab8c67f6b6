use std::sync::Arc;
use std::time::Duration;

use dom_snapshot::SnapshotDocument;
use selfheal::{
    ActionError, Config, ElementRepository, HealStrategy, HealingSession, RepositoryPolicy,
    ResolverConfig, SelfHealingResolver,
};
use selfheal_core_types::LiveDocument;

const BEFORE: &str = include_str!("fixtures/login_before.html");
const AFTER: &str = include_str!("fixtures/login_after.html");

/// Stand-in for a click: succeeds when the locator matches something.
async fn click(document: &SnapshotDocument, locator: String) -> Result<String, ActionError> {
    match document.resolves(&locator).await {
        Ok(true) => Ok(format!("clicked {}", locator)),
        Ok(false) => Err(ActionError::element_not_found(locator)),
        Err(err) => Err(ActionError::Failed(err.to_string())),
    }
}

#[tokio::test]
async fn drifted_locator_is_healed_and_recaptured() {
    let session = HealingSession::from_config(&Config::default());
    let doc = SnapshotDocument::new(BEFORE);
    let page = &doc;

    let first = session
        .perform("#login-btn", &doc, move |locator| click(page, locator))
        .await
        .unwrap();
    assert!(!first.healed);
    assert_eq!(first.output, "clicked #login-btn");
    assert!(session.repository().get_bundle("#login-btn").is_some());

    doc.replace_html(AFTER);
    let second = session
        .perform("#login-btn", &doc, move |locator| click(page, locator))
        .await
        .unwrap();
    assert!(second.healed);
    assert_eq!(second.locator, r#"role=button[name="Sign In"]"#);
    assert_eq!(second.output, r#"clicked role=button[name="Sign In"]"#);

    // Recovery data now exists for the replacement as well.
    let bundle = session
        .repository()
        .get_bundle(r#"role=button[name="Sign In"]"#)
        .unwrap();
    assert_eq!(bundle.alternative_locators[0], ".auth-submit");

    let events = session.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].broken, "#login-btn");
    assert_eq!(events[0].strategy, Some(HealStrategy::RoleName));
}

#[tokio::test]
async fn unresolved_heal_returns_original_error() {
    let session = HealingSession::from_config(&Config::default());
    let doc = SnapshotDocument::new(AFTER);
    let page = &doc;

    let err = session
        .perform("#does-not-exist", &doc, move |locator| click(page, locator))
        .await
        .unwrap_err();
    assert_eq!(err, ActionError::element_not_found("#does-not-exist"));
    assert_eq!(session.events()[0].healed, None);
    assert!(session.repository().is_empty());
}

#[tokio::test]
async fn sweep_evicts_by_policy_age() {
    let repository = Arc::new(ElementRepository::new(RepositoryPolicy {
        max_age_ms: 1,
        ..RepositoryPolicy::default()
    }));
    let resolver = SelfHealingResolver::new(repository.clone(), ResolverConfig::default());
    let session = HealingSession::new(repository.clone(), Arc::new(resolver));
    let doc = SnapshotDocument::new(BEFORE);
    let page = &doc;

    session
        .perform("#cancel", &doc, move |locator| click(page, locator))
        .await
        .unwrap();
    assert_eq!(repository.len(), 1);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(session.sweep(), 1);
    assert!(repository.is_empty());
}

#[tokio::test]
async fn sessions_heal_concurrently_over_one_repository() {
    let config = Config::default();
    let repository = Arc::new(ElementRepository::new(config.repository.clone()));
    let resolver = Arc::new(SelfHealingResolver::new(
        repository.clone(),
        config.resolver.clone(),
    ));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let session = HealingSession::new(repository.clone(), resolver.clone());
        handles.push(tokio::spawn(async move {
            let doc = SnapshotDocument::new(BEFORE);
            let page = &doc;
            session
                .perform("#login-btn", &doc, move |locator| click(page, locator))
                .await
                .map(|performed| performed.healed)
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok(false));
    }
    assert_eq!(repository.len(), 1);
}
