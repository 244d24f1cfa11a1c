use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use cogito::credentials::Credential;
use cogito::provider::Provider;
use cogito::provider::mock::{MockGateway, Reply};
use cogito::reasoning::{Query, Reasoner, ReasoningConfig, ReasoningEvent, ReasoningStep};

fn credential() -> Credential {
    Credential::new(Provider::OpenAi, "sk-test".to_string(), None, None)
}

fn query() -> Query {
    Query {
        query: "Why is the sky blue?".to_string(),
        signature: "question -> reasoning, answer".to_string(),
        model: None,
    }
}

fn reasoner(gateway: Arc<MockGateway>) -> Reasoner {
    Reasoner::new(
        gateway,
        ReasoningConfig {
            step_delay: Duration::ZERO,
            max_model_steps: 4,
        },
    )
}

/// Run the pipeline to completion and collect every event it emitted.
async fn run_collect(gateway: Arc<MockGateway>) -> Vec<ReasoningEvent> {
    let reasoner = reasoner(gateway);
    let (tx, mut rx) = mpsc::channel(64);
    reasoner.run(&credential(), &query(), &tx).await.unwrap();
    drop(tx);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

fn steps(events: &[ReasoningEvent]) -> Vec<&ReasoningStep> {
    events
        .iter()
        .filter_map(|e| match e {
            ReasoningEvent::Processing { step } => Some(step),
            _ => None,
        })
        .collect()
}

fn final_answer(events: &[ReasoningEvent]) -> &str {
    match events.last() {
        Some(ReasoningEvent::Completed { final_answer }) => final_answer,
        other => panic!("expected Completed last, got {:?}", other),
    }
}

// ── Happy path ────────────────────────────────────────────────────

#[tokio::test]
async fn fixed_steps_then_model_lines_then_answer() {
    let gateway = Arc::new(MockGateway::texts([
        "Light scatters.\n\nShort wavelengths scatter more.\nBlue dominates.",
        "Rayleigh scattering.",
    ]));
    let events = run_collect(Arc::clone(&gateway)).await;

    let steps = steps(&events);
    assert_eq!(steps.len(), 5);
    assert_eq!(steps[0].title, "Problem Understanding");
    assert_eq!(steps[1].title, "Information Gathering");
    assert_eq!(steps[2].title, "Reasoning Step 1");
    assert_eq!(steps[2].content, "Light scatters.");
    assert_eq!(steps[4].title, "Reasoning Step 3");
    assert_eq!(steps[4].content, "Blue dominates.");

    let numbers: Vec<usize> = steps.iter().map(|s| s.step).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    assert!(steps.iter().all(|s| s.timestamp.ends_with('Z')));

    assert_eq!(final_answer(&events), "Rayleigh scattering.");
    assert_eq!(gateway.calls(), 2);
}

#[tokio::test]
async fn framing_steps_describe_the_signature() {
    let gateway = Arc::new(MockGateway::texts(["x", "y"]));
    let events = run_collect(gateway).await;
    let steps = steps(&events);

    assert_eq!(
        steps[0].content,
        "Analyzing the query: \"Why is the sky blue?\" using signature pattern: \
         question -> reasoning, answer. The task requires 2 output(s): reasoning, answer."
    );
    assert!(steps[1].content.ends_with("needed to address: question."));
}

#[tokio::test]
async fn model_lines_are_capped() {
    let gateway = Arc::new(MockGateway::texts(["1\n2\n3\n4\n5\n6\n7", "done"]));
    let events = run_collect(gateway).await;
    let steps = steps(&events);

    assert_eq!(steps.len(), 6);
    assert_eq!(steps[5].content, "4");
}

#[tokio::test]
async fn prompts_carry_query_and_steps() {
    let gateway = Arc::new(MockGateway::texts(["first thought", "answer"]));
    run_collect(Arc::clone(&gateway)).await;

    let seen = gateway.completions();
    assert!(seen[0].prompt.contains("Query: Why is the sky blue?"));
    assert!(seen[0].prompt.contains("Signature: question -> reasoning, answer"));
    assert!(seen[1].prompt.contains("Original Query: Why is the sky blue?"));
    assert!(seen[1].prompt.contains("3. Reasoning Step 1: first thought"));
    assert_eq!(seen[0].max_tokens, 1000);
}

#[tokio::test]
async fn query_model_is_passed_through() {
    let gateway = Arc::new(MockGateway::texts(["a", "b"]));
    let reasoner = reasoner(Arc::clone(&gateway));
    let (tx, _rx) = mpsc::channel(64);
    let query = Query {
        model: Some("gpt-4o".to_string()),
        ..query()
    };

    reasoner.run(&credential(), &query, &tx).await.unwrap();

    for completion in gateway.completions() {
        assert_eq!(completion.model.as_deref(), Some("gpt-4o"));
    }
}

// ── Failure handling ──────────────────────────────────────────────

#[tokio::test]
async fn failed_draft_becomes_single_error_step() {
    let gateway = Arc::new(MockGateway::new(vec![
        Reply::Fail("network down".to_string()),
        Reply::Text("best effort".to_string()),
    ]));
    let events = run_collect(gateway).await;
    let steps = steps(&events);

    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].title, "Error in Processing");
    assert_eq!(
        steps[0].content,
        "Failed to generate reasoning steps: network down"
    );
    assert_eq!(final_answer(&events), "best effort");
}

#[tokio::test]
async fn rejected_draft_reports_provider_body() {
    let gateway = Arc::new(MockGateway::new(vec![
        Reply::Rejected("invalid api key".to_string()),
        Reply::Text("x".to_string()),
    ]));
    let events = run_collect(gateway).await;

    assert_eq!(
        steps(&events)[0].content,
        "Failed to generate reasoning steps: API call failed: invalid api key"
    );
}

#[tokio::test]
async fn empty_final_answer_has_fallback_text() {
    let gateway = Arc::new(MockGateway::texts(["a", "  "]));
    let events = run_collect(gateway).await;
    assert_eq!(final_answer(&events), "Unable to generate final answer");
}

#[tokio::test]
async fn failed_final_answer_is_reported_as_text() {
    let gateway = Arc::new(MockGateway::new(vec![
        Reply::Text("a".to_string()),
        Reply::Fail("timed out".to_string()),
    ]));
    let events = run_collect(gateway).await;
    assert_eq!(
        final_answer(&events),
        "Error generating final answer: timed out"
    );
}

#[tokio::test]
async fn dropped_receiver_stops_before_final_call() {
    let gateway = Arc::new(MockGateway::texts(["a\nb", "never asked"]));
    let reasoner = reasoner(Arc::clone(&gateway));
    let (tx, rx) = mpsc::channel(64);
    drop(rx);

    let result = reasoner.run(&credential(), &query(), &tx).await;
    assert!(result.is_err());
    assert_eq!(gateway.calls(), 1);
}

// ── Spawned streams ───────────────────────────────────────────────

#[tokio::test]
async fn stream_ends_with_completed() {
    let gateway = Arc::new(MockGateway::texts(["one\ntwo", "answer"]));
    let reasoner = Arc::new(reasoner(gateway));
    let mut rx = reasoner.stream(credential(), query());

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert_eq!(steps(&events).len(), 4);
    assert_eq!(final_answer(&events), "answer");
}

#[tokio::test]
async fn panicking_run_yields_failed_event() {
    let gateway = Arc::new(MockGateway::new(vec![Reply::Panic]));
    let reasoner = Arc::new(reasoner(gateway));
    let mut rx = reasoner.stream(credential(), query());

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert_eq!(events.len(), 1);
    match &events[0] {
        ReasoningEvent::Failed { error } => assert!(!error.is_empty()),
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn step_delay_paces_the_stream() {
    let gateway = Arc::new(MockGateway::texts(["a", "b"]));
    let reasoner = Reasoner::new(
        gateway,
        ReasoningConfig {
            step_delay: Duration::from_millis(20),
            max_model_steps: 4,
        },
    );
    let (tx, _rx) = mpsc::channel(64);

    let started = std::time::Instant::now();
    reasoner.run(&credential(), &query(), &tx).await.unwrap();

    // three steps, each followed by the delay
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn disconnect_during_last_pause_skips_final_call() {
    let gateway = Arc::new(MockGateway::texts(["a", "answer"]));
    let reasoner = Arc::new(Reasoner::new(
        Arc::<MockGateway>::clone(&gateway),
        ReasoningConfig {
            step_delay: Duration::from_millis(100),
            max_model_steps: 4,
        },
    ));
    let mut rx = reasoner.stream(credential(), query());

    for _ in 0..3 {
        match rx.recv().await {
            Some(ReasoningEvent::Processing { .. }) => {}
            other => panic!("expected a processing event, got {other:?}"),
        }
    }
    drop(rx);
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(gateway.calls(), 1);
}

#[tokio::test]
async fn disconnect_mid_stream_ends_run_with_error() {
    let gateway = Arc::new(MockGateway::texts(["a\nb\nc", "answer"]));
    let reasoner = Reasoner::new(
        Arc::<MockGateway>::clone(&gateway),
        ReasoningConfig {
            step_delay: Duration::from_millis(50),
            max_model_steps: 4,
        },
    );
    let (tx, mut rx) = mpsc::channel(64);

    let reader = tokio::spawn(async move {
        rx.recv().await;
        // receiver dropped here, while the run is pausing after step 1
    });

    let result = reasoner.run(&credential(), &query(), &tx).await;
    reader.await.unwrap();

    assert!(result.is_err());
    assert_eq!(gateway.calls(), 1);
}
