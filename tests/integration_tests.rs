// Integration tests for Talent Match

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use talent_match::core::{rank_matches, MatchError, MatchingEngine};
use talent_match::models::{
    CandidateAttributes, ExperienceLevel, MatchScore, RoleMatch, RoleRequirements, WeightVector,
    WorkStyle,
};
use talent_match::services::{
    CacheManager, DisabledEvaluator, EvaluatorError, HttpEvaluator, MatchStore, StoreError,
    TechnicalAssessment, TechnicalEvaluator,
};
use tokio::sync::{oneshot, Mutex};

/// In-memory store keyed the same way as the match_scores table
#[derive(Default)]
struct MemoryStore {
    candidates: Mutex<HashMap<String, CandidateAttributes>>,
    roles: Mutex<Vec<RoleRequirements>>,
    scores: Mutex<HashMap<(String, String), MatchScore>>,
    connections: Mutex<HashSet<(String, String)>>,
    upsert_calls: Mutex<usize>,
    fail_upserts: bool,
}

impl MemoryStore {
    async fn with(candidates: Vec<CandidateAttributes>, roles: Vec<RoleRequirements>) -> Self {
        let store = Self::default();
        for candidate in candidates {
            store.save_candidate(&candidate).await.unwrap();
        }
        for role in roles {
            store.save_role(&role).await.unwrap();
        }
        store
    }

    async fn snapshot(&self) -> Vec<MatchScore> {
        let mut rows: Vec<MatchScore> = self.scores.lock().await.values().cloned().collect();
        rows.sort_by(|a, b| a.role_id.cmp(&b.role_id));
        rows
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn get_candidate(&self, id: &str) -> Result<Option<CandidateAttributes>, StoreError> {
        Ok(self.candidates.lock().await.get(id).cloned())
    }

    async fn list_roles(&self) -> Result<Vec<RoleRequirements>, StoreError> {
        Ok(self.roles.lock().await.clone())
    }

    async fn upsert_match_scores(&self, scores: &[MatchScore]) -> Result<u64, StoreError> {
        *self.upsert_calls.lock().await += 1;

        if self.fail_upserts {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }

        let mut table = self.scores.lock().await;
        for score in scores {
            table.insert(
                (score.role_id.clone(), score.candidate_profile_id.clone()),
                score.clone(),
            );
        }
        Ok(scores.len() as u64)
    }

    async fn get_role_matches(&self, role_id: &str) -> Result<Vec<RoleMatch>, StoreError> {
        let candidates = self.candidates.lock().await;
        let table = self.scores.lock().await;

        Ok(table
            .values()
            .filter(|s| s.role_id == role_id)
            .filter_map(|s| {
                let c = candidates.get(&s.candidate_profile_id)?;
                Some(RoleMatch {
                    role_id: s.role_id.clone(),
                    candidate_profile_id: s.candidate_profile_id.clone(),
                    candidate_id: c.candidate_id.clone(),
                    skill_match_score: Some(s.scores.skill),
                    experience_match_score: Some(s.scores.experience),
                    culture_match_score: Some(s.scores.culture),
                    technical_score: Some(s.scores.technical),
                    overall_match_score: Some(s.overall_match_score),
                    disqualified: Some(s.disqualified),
                    match_reasoning: s.match_reasoning.clone(),
                    skills: c.skills.clone(),
                    experience_level: c.experience_level,
                    experience_years: c.experience_years,
                    strengths: c.strengths.clone(),
                })
            })
            .collect())
    }

    async fn get_connected_candidates(&self, role_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .connections
            .lock()
            .await
            .iter()
            .filter(|(r, _)| r == role_id)
            .map(|(_, c)| c.clone())
            .collect())
    }

    async fn record_connection(&self, role_id: &str, candidate_id: &str) -> Result<(), StoreError> {
        if !self.roles.lock().await.iter().any(|r| r.id == role_id) {
            return Err(StoreError::NotFound(format!("Role {} does not exist", role_id)));
        }

        let inserted = self
            .connections
            .lock()
            .await
            .insert((role_id.to_string(), candidate_id.to_string()));

        if inserted {
            Ok(())
        } else {
            Err(StoreError::Conflict(format!("{} -> {}", role_id, candidate_id)))
        }
    }

    async fn save_candidate(&self, candidate: &CandidateAttributes) -> Result<(), StoreError> {
        self.candidates
            .lock()
            .await
            .insert(candidate.id.clone(), candidate.clone());
        Ok(())
    }

    async fn save_role(&self, role: &RoleRequirements) -> Result<(), StoreError> {
        let mut roles = self.roles.lock().await;
        roles.retain(|r| r.id != role.id);
        roles.push(role.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

/// Evaluator returning the same score for every role
struct FixedEvaluator(f64);

#[async_trait]
impl TechnicalEvaluator for FixedEvaluator {
    async fn evaluate(
        &self,
        _transcript: &str,
        _role: &RoleRequirements,
    ) -> Result<TechnicalAssessment, EvaluatorError> {
        Ok(TechnicalAssessment::new(self.0))
    }
}

/// Evaluator that fails for one role and records every call
struct FlakyEvaluator {
    failing_role: String,
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl TechnicalEvaluator for FlakyEvaluator {
    async fn evaluate(
        &self,
        _transcript: &str,
        role: &RoleRequirements,
    ) -> Result<TechnicalAssessment, EvaluatorError> {
        self.calls.lock().await.push(role.id.clone());
        if role.id == self.failing_role {
            Err(EvaluatorError::ApiError("upstream timeout".to_string()))
        } else {
            Ok(TechnicalAssessment::new(9.0).with_reasoning(format!("fits {}", role.id)))
        }
    }
}

/// Evaluator that tracks how many calls overlap
#[derive(Default)]
struct CountingEvaluator {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl TechnicalEvaluator for CountingEvaluator {
    async fn evaluate(
        &self,
        _transcript: &str,
        _role: &RoleRequirements,
    ) -> Result<TechnicalAssessment, EvaluatorError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(TechnicalAssessment::new(7.0))
    }
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn create_candidate(id: &str) -> CandidateAttributes {
    CandidateAttributes {
        id: id.to_string(),
        candidate_id: Some(format!("user-{}", id)),
        skills: list(&["Python", "SQL"]),
        experience_level: Some(ExperienceLevel::Senior),
        work_style_preference: Some(WorkStyle::Remote),
        strengths: list(&["ownership"]),
        technical_score: Some(6.0),
        transcript: Some("Built the data platform at my last company...".to_string()),
        ..Default::default()
    }
}

fn create_role(id: &str) -> RoleRequirements {
    RoleRequirements {
        id: id.to_string(),
        role_title: Some("Founding Data Engineer".to_string()),
        required_skills: list(&["Python", "SQL", "Airflow"]),
        experience_level: Some(ExperienceLevel::Senior),
        work_style: Some(WorkStyle::Remote),
        culture_values: list(&["Ownership"]),
        ..Default::default()
    }
}

fn engine(store: Arc<MemoryStore>, evaluator: Arc<dyn TechnicalEvaluator>) -> MatchingEngine {
    MatchingEngine::new(store, evaluator, WeightVector::default())
}

#[tokio::test]
async fn test_run_scores_every_role() {
    let store = Arc::new(
        MemoryStore::with(
            vec![create_candidate("cp-1")],
            vec![create_role("role-a"), create_role("role-b")],
        )
        .await,
    );
    let engine = engine(store.clone(), Arc::new(FixedEvaluator(8.0)));

    let summary = engine.run_for_candidate("cp-1").await.unwrap();

    assert_eq!(summary.records_written, 2);
    assert_eq!(summary.fallbacks, 0);

    let rows = store.snapshot().await;
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.scores.skill, 5.1);
        assert_eq!(row.scores.experience, 10.0);
        assert_eq!(row.scores.culture, 10.0);
        assert_eq!(row.scores.technical, 8.0);
        assert!(!row.disqualified);
    }
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let store = Arc::new(
        MemoryStore::with(
            vec![create_candidate("cp-1")],
            vec![create_role("role-a"), create_role("role-b")],
        )
        .await,
    );
    let engine = engine(store.clone(), Arc::new(FixedEvaluator(7.0)));

    engine.run_for_candidate("cp-1").await.unwrap();
    let first = store.snapshot().await;

    engine.run_for_candidate("cp-1").await.unwrap();
    let second = store.snapshot().await;

    assert_eq!(second.len(), 2, "re-running must not duplicate records");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_candidate_writes_nothing() {
    let store = Arc::new(MemoryStore::with(vec![], vec![create_role("role-a")]).await);
    let engine = engine(store.clone(), Arc::new(FixedEvaluator(8.0)));

    let err = engine.run_for_candidate("ghost").await.unwrap_err();

    assert!(matches!(err, MatchError::CandidateNotFound(ref id) if id == "ghost"));
    assert_eq!(*store.upsert_calls.lock().await, 0);
    assert!(store.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_no_roles_is_a_no_op() {
    let store = Arc::new(MemoryStore::with(vec![create_candidate("cp-1")], vec![]).await);
    let engine = engine(store.clone(), Arc::new(FixedEvaluator(8.0)));

    let summary = engine.run_for_candidate("cp-1").await.unwrap();

    assert_eq!(summary.records_written, 0);
    assert!(summary.role_ids.is_empty());
    assert_eq!(*store.upsert_calls.lock().await, 0);
}

#[tokio::test]
async fn test_evaluator_failure_falls_back_per_role() {
    let store = Arc::new(
        MemoryStore::with(
            vec![create_candidate("cp-1")],
            vec![create_role("role-a"), create_role("role-b")],
        )
        .await,
    );
    let evaluator = Arc::new(FlakyEvaluator {
        failing_role: "role-b".to_string(),
        calls: Mutex::new(vec![]),
    });
    let engine = engine(store.clone(), evaluator.clone());

    let summary = engine.run_for_candidate("cp-1").await.unwrap();

    assert_eq!(summary.records_written, 2);
    assert_eq!(summary.fallbacks, 1);
    assert_eq!(evaluator.calls.lock().await.len(), 2);

    let rows = store.snapshot().await;
    assert_eq!(rows[0].role_id, "role-a");
    assert_eq!(rows[0].scores.technical, 9.0);
    assert_eq!(rows[0].match_reasoning.as_deref(), Some("fits role-a"));
    // Overall interview score stands in for the failed evaluation
    assert_eq!(rows[1].role_id, "role-b");
    assert_eq!(rows[1].scores.technical, 6.0);
    assert_eq!(rows[1].match_reasoning, None);
}

#[tokio::test]
async fn test_without_evaluator_uses_phase_scores() {
    let mut candidate = create_candidate("cp-1");
    candidate.technical_score = None;
    candidate.behavioral_score = Some(5.0);
    candidate.system_design_score = Some(8.0);

    let store = Arc::new(MemoryStore::with(vec![candidate], vec![create_role("role-a")]).await);
    let engine = engine(store.clone(), Arc::new(DisabledEvaluator));

    engine.run_for_candidate("cp-1").await.unwrap();

    // 0.3 * 5 + 0.7 * 8
    assert_eq!(store.snapshot().await[0].scores.technical, 7.1);
}

#[tokio::test]
async fn test_deal_breaker_is_persisted_and_capped() {
    let mut role = create_role("role-a");
    role.deal_breakers = list(&["No remote"]);

    let store = Arc::new(MemoryStore::with(vec![create_candidate("cp-1")], vec![role]).await);
    let engine = engine(store.clone(), Arc::new(FixedEvaluator(10.0)));

    engine.run_for_candidate("cp-1").await.unwrap();

    let row = &store.snapshot().await[0];
    assert!(row.disqualified);
    assert!(row.overall_match_score <= 3.0);

    // Re-ranking under weights that favour the candidate keeps the cap
    let matches = store.get_role_matches("role-a").await.unwrap();
    let ranked = rank_matches(&matches, &WeightVector::TECHNICAL_DEPTH, &HashSet::new(), 5);
    assert!(ranked.matches[0].weighted_score <= 3.0);
}

#[tokio::test]
async fn test_upsert_failure_propagates() {
    let store = Arc::new(MemoryStore {
        fail_upserts: true,
        ..Default::default()
    });
    store.save_candidate(&create_candidate("cp-1")).await.unwrap();
    store.save_role(&create_role("role-a")).await.unwrap();

    let engine = engine(store.clone(), Arc::new(FixedEvaluator(8.0)));
    let err = engine.run_for_candidate("cp-1").await.unwrap_err();

    assert!(matches!(err, MatchError::Store(StoreError::Unavailable(_))));
    assert!(store.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_rerank_with_default_weights_matches_persisted_overall() {
    let mut junior = create_candidate("cp-2");
    junior.experience_level = Some(ExperienceLevel::Junior);
    junior.skills = list(&["Python"]);

    let mut hybrid = create_candidate("cp-3");
    hybrid.work_style_preference = Some(WorkStyle::Hybrid);

    let store = Arc::new(
        MemoryStore::with(
            vec![create_candidate("cp-1"), junior, hybrid],
            vec![create_role("role-a")],
        )
        .await,
    );
    let engine = engine(store.clone(), Arc::new(FixedEvaluator(7.0)));

    for id in ["cp-1", "cp-2", "cp-3"] {
        engine.run_for_candidate(id).await.unwrap();
    }

    let matches = store.get_role_matches("role-a").await.unwrap();
    let ranked = rank_matches(&matches, &WeightVector::default(), &HashSet::new(), 10);

    assert_eq!(ranked.total_matches, 3);
    for entry in &ranked.matches {
        let persisted = matches
            .iter()
            .find(|m| m.candidate_profile_id == entry.candidate_profile_id)
            .and_then(|m| m.overall_match_score)
            .unwrap();
        assert_eq!(entry.weighted_score, persisted);
    }

    let order: Vec<&str> = ranked.matches.iter().map(|m| m.candidate_profile_id.as_str()).collect();
    assert_eq!(order[0], "cp-1");
}

#[tokio::test]
async fn test_rank_order_invariant_under_weight_scaling() {
    let mut other = create_candidate("cp-2");
    other.skills = list(&["Airflow"]);
    other.experience_level = Some(ExperienceLevel::Lead);

    let store = Arc::new(
        MemoryStore::with(vec![create_candidate("cp-1"), other], vec![create_role("role-a")]).await,
    );
    let engine = engine(store.clone(), Arc::new(FixedEvaluator(6.0)));
    engine.run_for_candidate("cp-1").await.unwrap();
    engine.run_for_candidate("cp-2").await.unwrap();

    let matches = store.get_role_matches("role-a").await.unwrap();
    let connected = HashSet::new();

    let ids = |weights: WeightVector| -> Vec<String> {
        rank_matches(&matches, &weights, &connected, 10)
            .matches
            .into_iter()
            .map(|m| m.candidate_profile_id)
            .collect()
    };

    assert_eq!(
        ids(WeightVector::new(1.0, 2.0, 3.0, 4.0)),
        ids(WeightVector::new(10.0, 20.0, 30.0, 40.0))
    );
}

#[tokio::test]
async fn test_connections_flag_ranked_entries() {
    let store = Arc::new(
        MemoryStore::with(
            vec![create_candidate("cp-1"), create_candidate("cp-2")],
            vec![create_role("role-a")],
        )
        .await,
    );
    let engine = engine(store.clone(), Arc::new(FixedEvaluator(8.0)));
    engine.run_for_candidate("cp-1").await.unwrap();
    engine.run_for_candidate("cp-2").await.unwrap();

    store.record_connection("role-a", "user-cp-2").await.unwrap();
    assert!(matches!(
        store.record_connection("role-a", "user-cp-2").await,
        Err(StoreError::Conflict(_))
    ));

    let matches = store.get_role_matches("role-a").await.unwrap();
    let connected: HashSet<String> = store
        .get_connected_candidates("role-a")
        .await
        .unwrap()
        .into_iter()
        .collect();
    let ranked = rank_matches(&matches, &WeightVector::default(), &connected, 5);

    // Equal scores: ties break by profile id
    assert_eq!(ranked.matches[0].candidate_profile_id, "cp-1");
    assert!(!ranked.matches[0].is_connected);
    assert!(ranked.matches[1].is_connected);
}

#[tokio::test]
async fn test_connection_to_unknown_role() {
    let store = MemoryStore::with(vec![], vec![create_role("role-a")]).await;

    assert!(matches!(
        store.record_connection("role-missing", "user-1").await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_evaluator_reasoning_is_persisted() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/evaluate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"score": 8.0, "reasoning": "strong pipeline experience"}"#)
        .create_async()
        .await;

    let evaluator = HttpEvaluator::new(format!("{}/evaluate", server.url()), None, 5).unwrap();
    let store = Arc::new(MemoryStore::with(vec![create_candidate("cp-1")], vec![create_role("role-a")]).await);
    let engine = engine(store.clone(), Arc::new(evaluator));

    let summary = engine.run_for_candidate("cp-1").await.unwrap();

    assert_eq!(summary.fallbacks, 0);
    let row = &store.snapshot().await[0];
    assert_eq!(row.scores.technical, 8.0);
    assert_eq!(row.match_reasoning.as_deref(), Some("strong pipeline experience"));

    let matches = store.get_role_matches("role-a").await.unwrap();
    let ranked = rank_matches(&matches, &WeightVector::default(), &HashSet::new(), 5);
    assert_eq!(ranked.matches[0].match_reasoning.as_deref(), Some("strong pipeline experience"));
}

#[tokio::test]
async fn test_evaluations_respect_concurrency_limit() {
    let roles = (0..6).map(|i| create_role(&format!("role-{}", i))).collect();
    let store = Arc::new(MemoryStore::with(vec![create_candidate("cp-1")], roles).await);
    let evaluator = Arc::new(CountingEvaluator::default());
    let engine = engine(store.clone(), evaluator.clone()).with_concurrency(2);

    let summary = engine.run_for_candidate("cp-1").await.unwrap();

    assert_eq!(summary.records_written, 6);
    let peak = evaluator.peak.load(Ordering::SeqCst);
    assert!((1..=2).contains(&peak), "peak in-flight evaluations was {}", peak);
}

#[tokio::test]
async fn test_cache_fill_racing_a_run_is_not_kept() {
    let store = Arc::new(MemoryStore::with(vec![create_candidate("cp-1")], vec![create_role("role-a")]).await);
    let engine = engine(store.clone(), Arc::new(FixedEvaluator(8.0)));
    let cache = Arc::new(CacheManager::new(100, 300));

    let (read_done_tx, read_done_rx) = oneshot::channel();
    let (resume_tx, resume_rx) = oneshot::channel::<()>();

    // Rank request: reads the store before the run, then stalls before filling
    let reader = {
        let cache = cache.clone();
        let store = store.clone();
        tokio::spawn(async move {
            cache
                .get_or_load_role_matches("role-a", || async move {
                    let rows = store.get_role_matches("role-a").await?;
                    read_done_tx.send(()).ok();
                    resume_rx.await.ok();
                    Ok::<_, StoreError>(rows)
                })
                .await
        })
    };

    read_done_rx.await.unwrap();

    let summary = engine.run_for_candidate("cp-1").await.unwrap();
    cache.invalidate_roles(&summary.role_ids).await;
    resume_tx.send(()).unwrap();

    let in_flight = reader.await.unwrap().unwrap();
    assert!(in_flight.is_empty(), "the stalled read predates the run");

    let served = cache
        .get_or_load_role_matches("role-a", || store.get_role_matches("role-a"))
        .await
        .unwrap();
    assert_eq!(served.len(), 1, "cache must not keep rows read before the run");
}
