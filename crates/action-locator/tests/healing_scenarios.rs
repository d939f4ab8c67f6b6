use action_locator::{
    AttemptVerdict, HealOutcome, HealStrategy, ResolverConfig, SelfHealer, SelfHealingResolver,
};
use dom_snapshot::SnapshotDocument;
use element_repository::ElementRepository;
use perceiver_visual::{TemplateMatcher, VisionBackend, VisualError, VisualMatch};
use selfheal_core_types::BoundingBox;
use std::sync::Arc;

fn page(body: &str) -> String {
    format!("<html><body>{}</body></html>", body)
}

fn resolver(repository: &Arc<ElementRepository>) -> SelfHealingResolver {
    SelfHealingResolver::new(repository.clone(), ResolverConfig::default())
}

#[tokio::test]
async fn repository_alternative_beats_looser_css() {
    let repository = Arc::new(ElementRepository::default());
    let doc = SnapshotDocument::new(page(
        r#"<div class="form"><button id="save" class="btn" data-box="10,10,60,20">Save</button></div>"#,
    ));
    repository.capture("div.form > button.btn", &doc).await;
    assert_eq!(
        repository.get_alternative("div.form > button.btn").as_deref(),
        Some("#save")
    );

    doc.replace_html(page(
        r#"<section class="form"><button id="save" class="btn" data-box="10,10,60,20">Save</button></section>"#,
    ));
    let report = resolver(&repository)
        .heal_report("div.form > button.btn", &doc)
        .await;

    assert_eq!(
        report.outcome,
        HealOutcome::Healed {
            locator: "#save".into(),
            strategy: HealStrategy::RepositoryAlternative,
        }
    );
    assert_eq!(report.attempts.len(), 1);
}

#[tokio::test]
async fn exact_rename_heals_by_role_and_name() {
    let repository = Arc::new(ElementRepository::default());
    let doc = SnapshotDocument::new(page(
        r#"<button id="login-btn" data-box="10,10,80,20">Sign In</button>
           <button id="cancel" data-box="100,10,80,20">Cancel</button>"#,
    ));
    repository.capture("#login-btn", &doc).await;

    doc.replace_html(page(
        r#"<button id="cancel" data-box="100,10,80,20">Cancel</button>
           <button class="auth" data-box="10,10,80,20">Sign In</button>"#,
    ));
    let report = resolver(&repository).heal_report("#login-btn", &doc).await;

    assert_eq!(
        report.outcome,
        HealOutcome::Healed {
            locator: r#"role=button[name="Sign In"]"#.into(),
            strategy: HealStrategy::RoleName,
        }
    );
    assert_eq!(report.attempts[0].verdict, AttemptVerdict::Abstained);
}

#[tokio::test]
async fn structural_reshuffle_without_bundle_uses_looser_css() {
    let repository = Arc::new(ElementRepository::default());
    let doc = SnapshotDocument::new(page(
        r#"<form><fieldset><button class="submit" data-box="0,0,50,20">Send</button></fieldset></form>"#,
    ));

    let report = resolver(&repository)
        .heal_report("div.container > button.submit", &doc)
        .await;

    assert!(!report.had_bundle);
    assert_eq!(
        report.outcome,
        HealOutcome::Healed {
            locator: "button.submit".into(),
            strategy: HealStrategy::LooserCss,
        }
    );
}

#[tokio::test]
async fn attribute_value_drift_heals_by_partial_match() {
    let repository = Arc::new(ElementRepository::default());
    let doc = SnapshotDocument::new(page(
        r#"<div data-id="user-profile-card-456" data-box="0,0,100,50">Jane</div>"#,
    ));

    let healed = resolver(&repository)
        .heal(r#"[data-id="user-profile-card-123"]"#, &doc)
        .await;

    // Half of the 21-char value is 10 chars, so the kept prefix is
    // "user-profi" rather than a longer "user-profile-car" style prefix.
    assert_eq!(healed.as_deref(), Some(r#"[data-id*="user-profi"]"#));
}

#[tokio::test]
async fn text_locator_without_bundle_reaches_dom_walk() {
    let repository = Arc::new(ElementRepository::default());
    let doc = SnapshotDocument::new(page(
        r#"<p data-box="0,0,200,20">Create account <a class="cta" href="/join" data-box="120,0,40,20">here</a></p>"#,
    ));

    let report = resolver(&repository)
        .heal_report(r#"button:has-text("Create account")"#, &doc)
        .await;

    assert_eq!(
        report.outcome,
        HealOutcome::Healed {
            locator: ".cta".into(),
            strategy: HealStrategy::NearbyText,
        }
    );
}

#[tokio::test]
async fn total_failure_yields_none() {
    let repository = Arc::new(ElementRepository::default());
    let doc = SnapshotDocument::new(page(r#"<div data-box="0,0,10,10">x</div>"#));

    let report = resolver(&repository).heal_report("#nowhere", &doc).await;
    assert_eq!(report.outcome, HealOutcome::Exhausted);
    assert_eq!(report.attempts.len(), 5);
    assert!(report
        .attempts
        .iter()
        .all(|a| a.verdict == AttemptVerdict::Abstained));
    assert!(resolver(&repository).heal("#nowhere", &doc).await.is_none());
}

const PROMO_BEFORE: &str = r#"<div id="promo" data-box="20,20,60,30">Promo</div>"#;
const PROMO_AFTER: &str = r#"<div data-box="0,150,60,30">Other</div>
    <div id="banner" data-box="150,100,60,30">Promo</div>"#;

async fn captured_promo(doc: &SnapshotDocument) -> Arc<ElementRepository> {
    let repository = Arc::new(ElementRepository::default());
    repository.capture("#promo", doc).await;
    let snapshot = repository.get_snapshot("#promo").expect("snapshot captured");
    assert_eq!(snapshot.bounding_box, BoundingBox::new(20.0, 20.0, 60.0, 30.0));
    doc.replace_html(page(PROMO_AFTER));
    repository
}

#[tokio::test]
async fn moved_element_found_by_template_match() {
    let doc = SnapshotDocument::new(page(PROMO_BEFORE));
    let repository = captured_promo(&doc).await;

    let resolver = resolver(&repository).with_vision(Arc::new(TemplateMatcher::default()));
    let report = resolver.heal_report("#promo", &doc).await;

    assert_eq!(
        report.outcome,
        HealOutcome::Healed {
            locator: "point=180,115".into(),
            strategy: HealStrategy::Visual,
        }
    );
}

#[tokio::test]
async fn size_heuristic_without_vision_takes_first_similar_element() {
    let doc = SnapshotDocument::new(page(PROMO_BEFORE));
    let repository = captured_promo(&doc).await;

    let healed = resolver(&repository).heal("#promo", &doc).await;
    assert_eq!(healed.as_deref(), Some("point=30,165"));
}

struct Unsure;

impl VisionBackend for Unsure {
    fn name(&self) -> &'static str {
        "unsure"
    }

    fn locate(&self, _haystack: &[u8], _template: &[u8]) -> Result<Option<VisualMatch>, VisualError> {
        Ok(Some(VisualMatch {
            bounding_box: BoundingBox::new(150.0, 100.0, 60.0, 30.0),
            confidence: 0.8,
        }))
    }
}

struct Failing;

impl VisionBackend for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn locate(&self, _haystack: &[u8], _template: &[u8]) -> Result<Option<VisualMatch>, VisualError> {
        Err(VisualError::MatchFailed("model unavailable".into()))
    }
}

#[tokio::test]
async fn weak_vision_match_is_rejected_without_size_fallback() {
    let doc = SnapshotDocument::new(page(PROMO_BEFORE));
    let repository = captured_promo(&doc).await;

    let report = resolver(&repository)
        .with_vision(Arc::new(Unsure))
        .heal_report("#promo", &doc)
        .await;

    let visual = report
        .attempts
        .iter()
        .find(|a| a.strategy == HealStrategy::Visual)
        .unwrap();
    assert_eq!(visual.verdict, AttemptVerdict::Abstained);
    assert_eq!(report.outcome, HealOutcome::Exhausted);
}

#[tokio::test]
async fn failing_vision_backend_falls_back_to_size() {
    let doc = SnapshotDocument::new(page(PROMO_BEFORE));
    let repository = captured_promo(&doc).await;

    let healed = resolver(&repository)
        .with_vision(Arc::new(Failing))
        .heal("#promo", &doc)
        .await;
    assert_eq!(healed.as_deref(), Some("point=30,165"));
}

#[tokio::test]
async fn deleted_element_is_not_matched_visually() {
    let doc = SnapshotDocument::new(page(
        r#"<button id="buy" data-box="200,150,80,24">Buy now</button>"#,
    ));
    let repository = Arc::new(ElementRepository::default());
    repository.capture("#buy", &doc).await;
    assert!(repository.get_snapshot("#buy").is_some());

    doc.replace_html(page(r#"<p data-box="190,150,80,30">Thanks</p>"#));
    let config = ResolverConfig {
        visual_scan_tags: Vec::new(),
        ..ResolverConfig::default()
    };
    let report = SelfHealingResolver::new(repository.clone(), config)
        .with_vision(Arc::new(TemplateMatcher::default()))
        .heal_report("#buy", &doc)
        .await;

    assert_ne!(report.outcome.strategy(), Some(HealStrategy::Visual));
    assert_eq!(report.outcome, HealOutcome::Exhausted);
}

#[tokio::test]
async fn concurrent_heals_share_one_repository() {
    let repository = Arc::new(ElementRepository::default());
    let resolver = Arc::new(resolver(&repository));

    let mut handles = Vec::new();
    for i in 0..8 {
        let resolver = resolver.clone();
        handles.push(tokio::spawn(async move {
            let doc = SnapshotDocument::new(page(&format!(
                r#"<main><button class="go-{i}" data-box="0,0,40,20">Go</button></main>"#
            )));
            resolver
                .heal(&format!("div > button.go-{i}"), &doc)
                .await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let healed = handle.await.unwrap();
        assert_eq!(healed, Some(format!("button.go-{i}")));
    }
}
