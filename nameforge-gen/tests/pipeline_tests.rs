//! End-to-end generation against scripted providers

mod helpers;

use helpers::{healthy_providers, orchestrator, Behavior, MockProvider};
use nameforge_gen::filter::{significant_words, stem};
use nameforge_gen::{CandidateSource, ContentType, Domain, GenerationRequest, WordCount};
use std::collections::HashSet;

fn stems(name: &str) -> HashSet<String> {
    significant_words(name, 4).iter().map(|w| stem(w)).collect()
}

#[tokio::test]
async fn test_rock_band_three_words_scenario() {
    let (datamuse, llm) = healthy_providers();
    let orchestrator = orchestrator(&[datamuse, llm], 7);
    let request = GenerationRequest::new(ContentType::Band, WordCount::Exact(3), 4).with_genre("rock");

    let response = orchestrator.generate(&request).await.unwrap();
    let results = &response.results;

    assert_eq!(results.len(), 4);
    let distinct: HashSet<String> = results.iter().map(|r| r.name.to_lowercase()).collect();
    assert_eq!(distinct.len(), 4);

    for r in results {
        assert_eq!(r.word_count(), 3, "'{}'", r.name);
        let phonetic = r.phonetic.as_ref().expect("phonetic score attached");
        assert!((0.0..=100.0).contains(&phonetic.overall));
    }

    for (i, a) in results.iter().enumerate() {
        for b in &results[i + 1..] {
            let shared = stems(&a.name).intersection(&stems(&b.name)).count();
            assert!(shared < 2, "'{}' and '{}' share {} words", a.name, b.name, shared);
        }
    }

    assert!(!response.metadata.fallback_chain.is_empty());
    assert!(response.metadata.quality > 0.0);
    orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_ai_suggestions_are_used() {
    let (datamuse, llm) = healthy_providers();
    let orchestrator = orchestrator(&[datamuse, llm.clone()], 11);
    let request = GenerationRequest::new(ContentType::Band, WordCount::Exact(3), 4);

    let response = orchestrator.generate(&request).await.unwrap();
    assert!(llm.calls() > 0);
    assert!(response.results.iter().any(|r| r.source == CandidateSource::Ai));
}

#[tokio::test]
async fn test_all_providers_failing_yields_static_names() {
    let datamuse = MockProvider::new("datamuse", &[Domain::Vocabulary, Domain::Genre], Behavior::Fail);
    let llm = MockProvider::new("llm", &[Domain::Names, Domain::Vocabulary], Behavior::Fail);
    let orchestrator = orchestrator(&[datamuse, llm], 3);
    let request = GenerationRequest::new(ContentType::Song, WordCount::Exact(2), 6).with_mood("dark");

    let response = orchestrator.generate(&request).await.unwrap();

    assert_eq!(response.results.len(), 6);
    assert!(response.metadata.used_fallback);
    assert!(response.metadata.fallback_chain.iter().any(|p| p == "datamuse"));
    assert!(response.metadata.fallback_chain.iter().any(|p| p == "llm"));
    for r in &response.results {
        assert!(r.source.is_static(), "{} from {}", r.name, r.source);
        assert_eq!(r.word_count(), 2);
    }

    let stats = orchestrator.fallback().statistics();
    assert!(stats[&Domain::Vocabulary].failures >= 1);
}

#[tokio::test]
async fn test_word_count_contract() {
    let (datamuse, llm) = healthy_providers();
    let orchestrator = orchestrator(&[datamuse, llm], 21);

    for n in 1..=10u8 {
        let request = GenerationRequest::new(ContentType::Band, WordCount::Exact(n), 3);
        let response = orchestrator.generate(&request).await.unwrap();
        assert_eq!(response.results.len(), 3);
        for r in &response.results {
            assert_eq!(r.word_count(), n as usize, "'{}'", r.name);
        }
    }

    let request = GenerationRequest::new(ContentType::Song, WordCount::FourPlus, 10);
    let response = orchestrator.generate(&request).await.unwrap();
    assert_eq!(response.results.len(), 10);
    for r in &response.results {
        assert!((4..=10).contains(&r.word_count()), "'{}'", r.name);
    }
}

#[tokio::test]
async fn test_famous_names_never_emitted() {
    let datamuse = MockProvider::new("datamuse", &[Domain::Vocabulary], Behavior::Words(vec!["stone"]));
    let llm = MockProvider::new(
        "llm",
        &[Domain::Names],
        Behavior::Lines(vec!["Pink Floyd", "Radiohead Revival", "Velvet Comets"]),
    );
    let orchestrator = orchestrator(&[datamuse, llm], 5);
    let request = GenerationRequest::new(ContentType::Band, WordCount::Exact(2), 3);

    let response = orchestrator.generate(&request).await.unwrap();
    assert!(response.results.iter().all(|r| r.name.to_lowercase() != "pink floyd"));
}

#[tokio::test]
async fn test_consecutive_batches_use_new_generations() {
    let (datamuse, llm) = healthy_providers();
    let orchestrator = orchestrator(&[datamuse, llm], 9);
    let request = GenerationRequest::new(ContentType::Band, WordCount::Exact(2), 5);

    let first = orchestrator.generate(&request).await.unwrap();
    let second = orchestrator.generate(&request).await.unwrap();
    assert_ne!(first.metadata.generation_id, second.metadata.generation_id);
    assert_eq!(second.results.len(), 5);

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.filter.generation_id, Some(second.metadata.generation_id));
    assert!(snapshot.filter.recent_words_count > 0);
    assert!(snapshot.providers.contains_key("datamuse"));
}
