//! Fallback manager behavior against scripted providers

mod helpers;

use helpers::{fast_params, registry, Behavior, MockProvider};
use nameforge_gen::fallback::{quick_strategy, FallbackManager, EMERGENCY_CACHE_SOURCE};
use nameforge_gen::normalizer::normalize;
use nameforge_gen::providers::payload::{DatamusePayload, DatamuseWord};
use nameforge_gen::providers::RawPayload;
use nameforge_gen::types::FusionStrategy;
use nameforge_gen::{Domain, ResolveError, ResolveOptions};

fn vocabulary_manager(providers: &[std::sync::Arc<MockProvider>], fusion: FusionStrategy) -> FallbackManager {
    let ids: Vec<&str> = providers.iter().map(|p| nameforge_gen::providers::Provider::id(p.as_ref())).collect();
    let strategy = quick_strategy(&ids, 40.0, fusion);
    FallbackManager::new(registry(providers), fast_params()).with_strategy(Domain::Vocabulary, strategy)
}

#[tokio::test]
async fn test_ordering_is_deterministic_given_history() {
    let a = MockProvider::new("a", &[Domain::Vocabulary], Behavior::Words(vec!["tide"]));
    let b = MockProvider::new("b", &[Domain::Vocabulary], Behavior::Words(vec!["wave"]));
    let c = MockProvider::new("c", &[Domain::Vocabulary], Behavior::Words(vec!["reef"]));
    let fm = vocabulary_manager(&[a.clone(), b.clone(), c.clone()], FusionStrategy::BestQuality);

    // No history: declared order
    assert_eq!(fm.provider_order(Domain::Vocabulary, None), vec!["a", "b", "c"]);

    a.set_behavior(Behavior::Fail);
    fm.resolve(Domain::Vocabulary, "sea", &ResolveOptions::default()).await.unwrap();

    let first = fm.provider_order(Domain::Vocabulary, None);
    let second = fm.provider_order(Domain::Vocabulary, None);
    assert_eq!(first, second);
    assert_eq!(first.last().map(String::as_str), Some("a"));

    // Hint pins a provider first regardless of score
    assert_eq!(fm.provider_order(Domain::Vocabulary, Some("a"))[0], "a");
}

#[tokio::test]
async fn test_emergency_cache_serves_discounted_result() {
    let a = MockProvider::new("a", &[Domain::Vocabulary], Behavior::Words(vec!["tide", "harbor"]));
    let fm = vocabulary_manager(&[a.clone()], FusionStrategy::BestQuality);

    let fresh = fm
        .resolve(Domain::Vocabulary, "Sea", &ResolveOptions::default())
        .await
        .unwrap();
    assert!(!fresh.provenance.emergency_mode);
    assert_eq!(fm.emergency_cache_len(), 1);

    a.set_behavior(Behavior::Fail);
    // Key is case-insensitive on the query
    let cached = fm
        .resolve(Domain::Vocabulary, "sea", &ResolveOptions::default())
        .await
        .unwrap();

    assert!(cached.provenance.emergency_mode);
    assert!((cached.confidence - fresh.confidence * 0.8).abs() < 1e-9);
    assert!((cached.entity.confidence - fresh.entity.confidence * 0.8).abs() < 1e-9);
    for (old, new) in fresh.alternatives.iter().zip(&cached.alternatives) {
        assert!((new.confidence - old.confidence * 0.8).abs() < 1e-9);
    }
    assert_eq!(cached.provenance.failed_sources, vec!["a"]);
    assert_eq!(
        cached.provenance.fallback_chain.last().map(String::as_str),
        Some(EMERGENCY_CACHE_SOURCE)
    );

    let stats = fm.statistics();
    let vocab = &stats[&Domain::Vocabulary];
    assert_eq!(vocab.emergency_hits, 1);
    assert_eq!(vocab.failures, 0);
}

#[tokio::test]
async fn test_exhausted_without_cache() {
    let a = MockProvider::new("a", &[Domain::Vocabulary], Behavior::Fail);
    let b = MockProvider::new("b", &[Domain::Vocabulary], Behavior::Fail);
    let fm = vocabulary_manager(&[a, b], FusionStrategy::BestQuality);

    let err = fm
        .resolve(Domain::Vocabulary, "sea", &ResolveOptions::default())
        .await
        .unwrap_err();
    match err {
        ResolveError::AllSourcesExhausted { failed_sources, .. } => {
            assert_eq!(failed_sources, vec!["a", "b"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fm.statistics()[&Domain::Vocabulary].failures, 1);
}

#[tokio::test]
async fn test_timeout_counts_as_failure() {
    let slow = MockProvider::new("slow", &[Domain::Vocabulary], Behavior::Hang);
    let fast = MockProvider::new("fast", &[Domain::Vocabulary], Behavior::Words(vec!["tide"]));
    let fm = vocabulary_manager(&[slow.clone(), fast], FusionStrategy::BestQuality);

    let result = fm
        .resolve(Domain::Vocabulary, "sea", &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(result.provenance.failed_sources, vec!["slow"]);
    assert_eq!(result.provenance.successful_sources, vec!["fast"]);
    assert_eq!(fm.performance().success_rate("slow"), Some(0.0));
}

#[tokio::test]
async fn test_fusion_bounded_to_three_sources_and_confidence() {
    let providers: Vec<_> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|id| MockProvider::new(id, &[Domain::Vocabulary], Behavior::Words(vec!["tide", "wave", "reef"])))
        .collect();
    let fm = vocabulary_manager(&providers, FusionStrategy::Consensus);

    let result = fm
        .resolve(Domain::Vocabulary, "sea", &ResolveOptions::fused())
        .await
        .unwrap();

    assert_eq!(result.provenance.successful_sources.len(), 3);
    assert_eq!(providers[3].calls(), 0);
    assert_eq!(result.provenance.fusion_used, Some(FusionStrategy::Consensus));
    assert!((0.0..=100.0).contains(&result.confidence));

    // Identical inputs from sources without a trust bonus: fusion cannot
    // exceed the single-source confidence
    let payload = RawPayload::Datamuse(DatamusePayload {
        query: "sea".to_string(),
        words: ["tide", "wave", "reef"]
            .iter()
            .map(|w| DatamuseWord {
                word: w.to_string(),
                score: Some(1000.0),
                tags: vec!["n".to_string()],
            })
            .collect(),
    });
    let single = normalize(&payload, "a", Domain::Vocabulary).confidence;
    assert!(result.confidence <= single + 1e-9);
}

#[tokio::test]
async fn test_health_snapshot_classifies_providers() {
    let good = MockProvider::new("good", &[Domain::Vocabulary], Behavior::Words(vec!["tide"]));
    let bad = MockProvider::new("bad", &[Domain::Vocabulary], Behavior::Fail);
    let fm = vocabulary_manager(&[bad, good], FusionStrategy::BestQuality);

    for _ in 0..3 {
        fm.resolve(Domain::Vocabulary, "sea", &ResolveOptions::default().with_hint("bad"))
            .await
            .unwrap();
    }

    let health = fm.health();
    assert_eq!(health["good"].status, nameforge_gen::fallback::HealthStatus::Healthy);
    assert_eq!(health["bad"].status, nameforge_gen::fallback::HealthStatus::Poor);
}
