//! End-to-end scenarios S1–S6 (spec §8), driven through
//! `ConversationEngine::register_intents` against the in-memory
//! `TestAdapter` test double — never against a real voice platform,
//! consistent with §1's "concrete voice-platform adapters are out of
//! scope" rule.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::FutureExt;

use dialog_engine_config::EngineSettings;
use dialog_engine_core::{
    GoalDef, IntentDef, InMemorySession, ResolveOutcome, Responder, ResolverFn, Session,
};
use dialog_engine_runtime::{goal_loop, ConversationEngine, OutputManager, Response};

use support::{TestAdapter, TestRequest};

fn resolver<F>(f: F) -> ResolverFn
where
    F: for<'a> Fn(&'a mut dyn Responder) -> futures::future::BoxFuture<'a, Result<ResolveOutcome, dialog_engine_core::ResolverError>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// S1. Single-turn intent, no goals.
#[tokio::test]
async fn s1_single_turn_intent_no_goals() {
    let mut engine = ConversationEngine::new(EngineSettings::default());
    engine.respond_to(IntentDef {
        name: Some("hello".to_string()),
        goal: None,
        expecting: vec!["Hello".to_string()],
        resolve: resolver(|r| {
            r.say("Hi".into(), false);
            async { Ok(ResolveOutcome::Resolved) }.boxed()
        }),
    });
    let mut adapter = TestAdapter::new();
    engine.register_intents(&mut adapter).await.unwrap();

    let mut request = TestRequest::new("user-1");
    adapter.send("hello", &mut request).await;

    assert_eq!(request.transcript.as_deref(), Some("Hi"));
    assert!(!request.should_end_session);
    assert!(dialog_engine_runtime::GoalStack::frames(&request.session).is_empty());
}

/// S2. A prompt goal fills a slot across two turns.
#[tokio::test]
async fn s2_prompt_goal_fills_a_slot() {
    let mut engine = ConversationEngine::new(EngineSettings::default());
    engine
        .define_goal(GoalDef::Query {
            key: "airline".to_string(),
            prompt: Some("What airline?".into()),
            ask: None,
            respond_to: vec![IntentDef {
                name: None,
                goal: None,
                expecting: vec!["[[airline]]".to_string()],
                resolve: resolver(|r| {
                    let value = r.get("[[airline]]").unwrap_or_default();
                    r.set("{{airline}}", value);
                    async { Ok(ResolveOutcome::Resolved) }.boxed()
                }),
            }],
        })
        .unwrap();
    engine.add_top_level_goal("airline");
    let mut adapter = TestAdapter::new();
    engine.register_intents(&mut adapter).await.unwrap();

    // First turn: launch pushes `airline`, the query goal prompts.
    let mut launch_request = TestRequest::new("user-1");
    adapter.launch(&mut launch_request).await;
    assert!(launch_request
        .transcript
        .as_deref()
        .unwrap()
        .contains("What airline?"));
    assert!(!launch_request.should_end_session);

    // Second turn: the slot arrives, the nested intent resolves and
    // empties the stack, and the core itself emits no speech.
    let nested_intent = adapter
        .intent_names()
        .into_iter()
        .find(|n| adapter.utterances_for(n).iter().any(|u| u.contains("airline")))
        .expect("nested airline intent was registered");
    let mut second_request = TestRequest::new("user-1")
        .with_session(launch_request.session.clone())
        .with_slot("airline", "Delta");
    adapter.send(&nested_intent, &mut second_request).await;

    assert_eq!(second_request.transcript, None);
    assert_eq!(second_request.session.get("airline"), Some("Delta".to_string()));
    assert!(dialog_engine_runtime::GoalStack::frames(&second_request.session).is_empty());
}

/// S3. Dependency chaining: a resolver defers to a child goal until its
/// slot is filled, then re-runs and completes.
#[tokio::test]
async fn s3_dependency_chaining() {
    let ran_check_in = Arc::new(AtomicUsize::new(0));
    let check_in_counter = ran_check_in.clone();

    let mut engine = ConversationEngine::new(EngineSettings::default());
    engine
        .define_goal(GoalDef::Resolver {
            key: "checkInDetails".to_string(),
            resolve: resolver(move |r| {
                let counter = check_in_counter.clone();
                async move {
                    if r.has_goal("bloodSugar") {
                        return Ok(ResolveOutcome::Pending);
                    }
                    if !r.goal_filled("bloodSugar", "[[bloodSugar]]") {
                        return Ok(ResolveOutcome::Pending);
                    }
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(ResolveOutcome::Resolved)
                }
                .boxed()
            }),
        })
        .unwrap();
    engine
        .define_goal(GoalDef::Query {
            key: "bloodSugar".to_string(),
            prompt: Some("What's your blood sugar?".into()),
            ask: None,
            respond_to: vec![IntentDef {
                name: None,
                goal: None,
                expecting: vec!["[[bloodSugar]]".to_string()],
                resolve: resolver(|r| {
                    let value = r.get("[[bloodSugar]]").unwrap_or_default();
                    r.set("{{bloodSugar}}", value);
                    async { Ok(ResolveOutcome::Resolved) }.boxed()
                }),
            }],
        })
        .unwrap();
    engine.add_top_level_goal("checkInDetails");
    let mut adapter = TestAdapter::new();
    engine.register_intents(&mut adapter).await.unwrap();

    // First turn: checkInDetails defers; bloodSugar is pushed and prompted.
    let mut first = TestRequest::new("user-1");
    adapter.launch(&mut first).await;
    assert!(first.transcript.as_deref().unwrap().contains("blood sugar"));
    assert_eq!(ran_check_in.load(Ordering::SeqCst), 0);
    let frames = dialog_engine_runtime::GoalStack::frames(&first.session);
    assert_eq!(frames.len(), 2);
    assert!(frames.iter().any(|f| f.key == "checkInDetails"));
    assert!(frames.iter().any(|f| f.key == "bloodSugar" && f.queried));

    // Second turn: the slot arrives, bloodSugar resolves, checkInDetails
    // re-runs and this time finds the value.
    let nested_intent = adapter
        .intent_names()
        .into_iter()
        .find(|n| adapter.utterances_for(n).iter().any(|u| u.contains("bloodSugar")))
        .expect("nested bloodSugar intent was registered");
    let mut second = TestRequest::new("user-1")
        .with_session(first.session.clone())
        .with_slot("bloodSugar", "120");
    adapter.send(&nested_intent, &mut second).await;

    assert_eq!(ran_check_in.load(Ordering::SeqCst), 1);
    assert!(dialog_engine_runtime::GoalStack::frames(&second.session).is_empty());
}

/// S4. Multiple prompts collapse into one question.
#[tokio::test]
async fn s4_multiple_prompts_collapse_into_one_question() {
    let mut session = InMemorySession::new();
    dialog_engine_runtime::GoalStack::append(&mut session, "p3");
    dialog_engine_runtime::GoalStack::append(&mut session, "p2");
    dialog_engine_runtime::GoalStack::append(&mut session, "p1");

    let mut goals = std::collections::HashMap::new();
    for key in ["p1", "p2", "p3"] {
        goals.insert(
            key.to_string(),
            GoalDef::Query {
                key: key.to_string(),
                prompt: Some(key.into()),
                ask: None,
                respond_to: vec![],
            },
        );
    }

    let mut response = Response::new(
        &mut session,
        None,
        OutputManager::new(&EngineSettings::default()),
        Box::new(rand::rngs::mock::StepRng::new(0, 1)),
    );
    goal_loop(&mut response, &goals).await.unwrap();

    assert_eq!(response.output().compose(), "<break time=\"500ms\"/> p1, p2 or p3");
}

/// S5. A global intent is resolved by the current goal-stack context.
#[tokio::test]
async fn s5_global_intent_resolved_by_goal_context() {
    let last_run = Arc::new(std::sync::Mutex::new(None::<&'static str>));

    fn yes_resolver(last_run: Arc<std::sync::Mutex<Option<&'static str>>>, name: &'static str) -> ResolverFn {
        resolver(move |_r| {
            *last_run.lock().unwrap() = Some(name);
            async { Ok(ResolveOutcome::Resolved) }.boxed()
        })
    }

    let mut engine = ConversationEngine::new(EngineSettings::default());
    engine.respond_to(IntentDef {
        name: Some("yes-from-a".to_string()),
        goal: Some("A".to_string()),
        expecting: vec!["Yes".to_string()],
        resolve: yes_resolver(last_run.clone(), "A"),
    });
    engine.respond_to(IntentDef {
        name: Some("yes-from-b".to_string()),
        goal: Some("B".to_string()),
        expecting: vec!["Yes".to_string()],
        resolve: yes_resolver(last_run.clone(), "B"),
    });
    engine.respond_to(IntentDef {
        name: Some("yes-from-c".to_string()),
        goal: Some("C".to_string()),
        expecting: vec!["Yes".to_string()],
        resolve: yes_resolver(last_run.clone(), "C"),
    });
    let mut adapter = TestAdapter::new();
    engine.register_intents(&mut adapter).await.unwrap();

    let global_name = adapter
        .intent_names()
        .into_iter()
        .find(|n| n.starts_with("global_"))
        .expect("Yes compiled to one shared global intent");

    // stack=[A, B] with B on top: B's resolver wins.
    let mut session_ab = InMemorySession::new();
    dialog_engine_runtime::GoalStack::append(&mut session_ab, "A");
    dialog_engine_runtime::GoalStack::append(&mut session_ab, "B");
    let mut req = TestRequest::new("user-1").with_session(session_ab);
    adapter.send(&global_name, &mut req).await;
    assert_eq!(*last_run.lock().unwrap(), Some("B"));

    // stack=[A] only: A's resolver wins.
    let mut session_a = InMemorySession::new();
    dialog_engine_runtime::GoalStack::append(&mut session_a, "A");
    let mut req = TestRequest::new("user-1").with_session(session_a);
    adapter.send(&global_name, &mut req).await;
    assert_eq!(*last_run.lock().unwrap(), Some("A"));

    // Empty stack: first registration wins.
    let mut req = TestRequest::new("user-1");
    adapter.send(&global_name, &mut req).await;
    assert_eq!(*last_run.lock().unwrap(), Some("A"));
}

/// S6. Launch says a uniformly random launch phrase, then runs the
/// (empty, here) goal loop.
#[tokio::test]
async fn s6_launch_says_a_configured_phrase() {
    let mut engine = ConversationEngine::new(EngineSettings::default());
    engine.set_launch_phrases(["Welcome!".to_string()]);
    let mut adapter = TestAdapter::new();
    engine.register_intents(&mut adapter).await.unwrap();

    let mut request = TestRequest::new("user-1");
    adapter.launch(&mut request).await;

    assert_eq!(request.transcript.as_deref(), Some("Welcome!"));
}
