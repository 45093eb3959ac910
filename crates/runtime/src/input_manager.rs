//! `InputManager` (spec §4.6): the entry point for every inbound intent,
//! plus the goal-resolution loop that drives a turn to fixpoint.

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use dialog_engine_config::EngineSettings;
use dialog_engine_core::{
    DispatchWarning, ErrorHandler, GoalDef, GoalFrame, IntentDef, PersistentStore, PlatformRequest,
    ResolveOutcome, ResolverError, Session, SpokenPhrases,
};

use crate::goal_stack::GoalStack;
use crate::output::OutputManager;
use crate::response::Response;

/// Everything a dispatch or launch needs that doesn't change between
/// turns: the compiled goal table, ambient settings, and the optional
/// persistent-store collaborator.
pub struct EngineShared {
    pub goals: HashMap<String, GoalDef>,
    pub settings: EngineSettings,
    pub store: Option<Arc<dyn PersistentStore>>,
}

/// Seeds from `settings.launch_phrase_selection_seed` when set (tests,
/// reproducible staging runs); otherwise from entropy, the production
/// default.
fn new_rng(settings: &EngineSettings) -> Box<dyn RngCore + Send> {
    match settings.launch_phrase_selection_seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(StdRng::from_entropy()),
    }
}

fn copy_request_slots(request: &mut dyn PlatformRequest) {
    let slots: Vec<(String, String)> = request
        .slots()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let session = request.session_mut();
    for (key, value) in slots {
        session.set(&key, value);
    }
}

/// Step 3 (spec §4.6): walk the goal stack top-down; the first
/// candidate whose `goal` matches any frame's key wins. Falls back to
/// the first registered definition with a logged warning if none match.
fn select<'d>(
    intent_name: &str,
    candidates: &'d [IntentDef],
    session: &dyn Session,
) -> (&'d IntentDef, Option<DispatchWarning>) {
    if candidates.len() == 1 {
        return (&candidates[0], None);
    }
    let frames = GoalStack::frames(session);
    for frame in &frames {
        if let Some(def) = candidates.iter().find(|c| c.goal.as_deref() == Some(frame.key.as_str())) {
            return (def, None);
        }
    }
    (
        &candidates[0],
        Some(DispatchWarning::UnknownIntent {
            intent_name: intent_name.to_string(),
            fell_back_to: candidates[0].name.clone(),
        }),
    )
}

/// Invokes the selected intent's resolver, applies the goal-scoped
/// removal rule (a `Resolved` outcome for a `goal`-scoped intent clears
/// that goal's frame — see DESIGN.md for why this generalizes the goal
/// loop's own resolver-removal rule to intents), then runs the goal
/// loop to fixpoint.
async fn run_intent(
    def: &IntentDef,
    response: &mut Response<'_>,
    goals: &HashMap<String, GoalDef>,
) -> Result<(), ResolverError> {
    match (def.resolve)(response.as_responder()).await? {
        ResolveOutcome::Resolved => {
            if let Some(key) = &def.goal {
                GoalStack::remove(response.session_mut(), key);
                response.mark_goal_state_changed();
            }
        }
        ResolveOutcome::Pending => {}
    }
    goal_loop(response, goals).await
}

/// The goal-resolution loop (spec §4.6, core algorithm). Terminates
/// because every iteration either removes a frame, marks a frame
/// queried, or re-sees a frame with no state change — each bounded by
/// the stack size (spec §8, item 3: at most `2 * |stack| + 1`
/// iterations).
pub async fn goal_loop(response: &mut Response<'_>, goals: &HashMap<String, GoalDef>) -> Result<(), ResolverError> {
    let mut cursor: i64 = -1;
    let mut last_seen: Option<GoalFrame> = None;
    loop {
        if response.output().asked() >= 1.0 {
            break;
        }
        if response.take_goal_state_changed() {
            cursor = -1;
        }
        cursor += 1;
        let Some(frame) = GoalStack::top(response.session(), cursor as usize) else {
            break;
        };
        if last_seen.as_ref() == Some(&frame) {
            break;
        }
        let Some(def) = goals.get(&frame.key) else {
            tracing::warn!(goal_key = %frame.key, "goal stack references unregistered goal");
            response.push_warning(DispatchWarning::UnknownGoalFrame {
                key: frame.key.clone(),
            });
            break;
        };
        match def {
            GoalDef::Resolver { resolve, .. } => match resolve(response.as_responder()).await? {
                ResolveOutcome::Resolved => {
                    GoalStack::remove(response.session_mut(), &frame.key);
                    response.mark_goal_state_changed();
                }
                ResolveOutcome::Pending => {}
            },
            GoalDef::Query { prompt, ask, .. } => {
                if !frame.queried {
                    if let Some(p) = prompt {
                        let text = response.render(p);
                        response.output_mut().prompt(text);
                    }
                    if let Some(a) = ask {
                        let text = response.render(a);
                        response.output_mut().ask(text);
                    }
                    let mut updated = frame.clone();
                    updated.queried = true;
                    GoalStack::update_at(response.session_mut(), cursor as usize, updated);
                }
            }
        }
        last_seen = Some(frame);
    }
    Ok(())
}

/// Entry point for every inbound intent (spec §4.6, steps 1-4).
/// `candidates` is every `IntentDef` registered under the platform
/// intent name the adapter matched — a single-element slice for a
/// local def, or every def sharing a global utterance.
pub async fn dispatch(
    intent_name: &str,
    candidates: &[IntentDef],
    request: &mut dyn PlatformRequest,
    shared: &EngineShared,
    error_handler: &ErrorHandler,
) {
    copy_request_slots(request);
    let (def, warning) = select(intent_name, candidates, request.session());
    let mut response = Response::new(
        request.session_mut(),
        shared.store.clone(),
        OutputManager::new(&shared.settings),
        new_rng(&shared.settings),
    );
    if let Some(warning) = warning {
        tracing::warn!(%warning, "dispatch fallback");
        response.push_warning(warning);
    }
    match run_intent(def, &mut response, &shared.goals).await {
        Ok(()) => response.output().flush(request),
        Err(err) => error_handler(request, &err).await,
    }
}

/// Launch handling (spec §4.7): no matched intent, a uniformly random
/// launch phrase, then the goal loop — having first re-pushed every
/// top-level goal onto the stack.
pub async fn dispatch_launch(
    request: &mut dyn PlatformRequest,
    shared: &EngineShared,
    launch_phrases: &[String],
    top_level_goals: &[String],
    error_handler: &ErrorHandler,
) {
    let mut response = Response::new(
        request.session_mut(),
        shared.store.clone(),
        OutputManager::new(&shared.settings),
        new_rng(&shared.settings),
    );
    for key in top_level_goals {
        GoalStack::append(response.session_mut(), key);
    }
    if !launch_phrases.is_empty() {
        let phrase = response.render(&SpokenPhrases::Many(launch_phrases.to_vec()));
        response.output_mut().say(phrase, false);
    }
    match goal_loop(&mut response, &shared.goals).await {
        Ok(()) => response.output().flush(request),
        Err(err) => error_handler(request, &err).await,
    }
}
