use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use crate::models::{CandidateAttributes, ExperienceLevel, MatchScore, RoleMatch, RoleRequirements, WorkStyle};
use crate::services::store::{MatchStore, StoreError};

/// PostgreSQL-backed match store
///
/// Holds candidate profiles, founder roles, the computed match scores
/// (unique per role and candidate profile) and founder-candidate connections.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            acquire_timeout_secs.unwrap_or(5),
            idle_timeout_secs.unwrap_or(600),
        )
        .await
    }
}

fn candidate_from_row(row: &PgRow) -> Result<CandidateAttributes, StoreError> {
    let experience_level: Option<String> = row.try_get("experience_level")?;
    let work_style: Option<String> = row.try_get("work_style_preference")?;
    let experience_years: Option<i32> = row.try_get("experience_years")?;

    Ok(CandidateAttributes {
        id: row.try_get("id")?,
        candidate_id: row.try_get("candidate_id")?,
        skills: row.try_get("skills")?,
        experience_level: ExperienceLevel::parse_loose(experience_level.as_deref()),
        experience_years: experience_years.and_then(|y| u32::try_from(y).ok()),
        work_style_preference: WorkStyle::parse_loose(work_style.as_deref()),
        strengths: row.try_get("strengths")?,
        technical_score: row.try_get("overall_score")?,
        behavioral_score: row.try_get("behavioral_score")?,
        system_design_score: row.try_get("system_design_score")?,
        transcript: row.try_get("raw_transcript")?,
    })
}

fn role_from_row(row: &PgRow) -> Result<RoleRequirements, StoreError> {
    let experience_level: Option<String> = row.try_get("experience_level")?;
    let work_style: Option<String> = row.try_get("work_style")?;

    Ok(RoleRequirements {
        id: row.try_get("id")?,
        role_title: row.try_get("role_title")?,
        role_description: row.try_get("role_description")?,
        required_skills: row.try_get("required_skills")?,
        preferred_skills: row.try_get("preferred_skills")?,
        experience_level: ExperienceLevel::parse_loose(experience_level.as_deref()),
        work_style: WorkStyle::parse_loose(work_style.as_deref()),
        culture_values: row.try_get("culture_values")?,
        deal_breakers: row.try_get("deal_breakers")?,
    })
}

fn role_match_from_row(row: &PgRow) -> Result<RoleMatch, StoreError> {
    let experience_level: Option<String> = row.try_get("experience_level")?;
    let experience_years: Option<i32> = row.try_get("experience_years")?;

    Ok(RoleMatch {
        role_id: row.try_get("founder_profile_id")?,
        candidate_profile_id: row.try_get("candidate_profile_id")?,
        candidate_id: row.try_get("candidate_id")?,
        skill_match_score: row.try_get("skill_match_score")?,
        experience_match_score: row.try_get("experience_match_score")?,
        culture_match_score: row.try_get("culture_match_score")?,
        technical_score: row.try_get("technical_score")?,
        overall_match_score: row.try_get("overall_match_score")?,
        disqualified: row.try_get("disqualified")?,
        match_reasoning: row.try_get("match_reasoning")?,
        skills: row.try_get("skills")?,
        experience_level: ExperienceLevel::parse_loose(experience_level.as_deref()),
        experience_years: experience_years.and_then(|y| u32::try_from(y).ok()),
        strengths: row.try_get("strengths")?,
    })
}

#[async_trait]
impl MatchStore for PostgresClient {
    async fn get_candidate(
        &self,
        candidate_profile_id: &str,
    ) -> Result<Option<CandidateAttributes>, StoreError> {
        let query = r#"
            SELECT id, candidate_id, skills, experience_level, experience_years,
                   work_style_preference, strengths, overall_score,
                   behavioral_score, system_design_score, raw_transcript
            FROM candidate_profiles
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(candidate_profile_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(candidate_from_row).transpose()
    }

    async fn list_roles(&self) -> Result<Vec<RoleRequirements>, StoreError> {
        let query = r#"
            SELECT id, role_title, role_description, required_skills, preferred_skills,
                   experience_level, work_style, culture_values, deal_breakers
            FROM founder_profiles
            ORDER BY id
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        rows.iter().map(role_from_row).collect()
    }

    /// Uses INSERT ... ON CONFLICT inside one transaction, so a failed
    /// batch leaves the previous scores untouched and a retry is safe.
    /// `computed_at` only moves when the scores themselves change.
    async fn upsert_match_scores(&self, scores: &[MatchScore]) -> Result<u64, StoreError> {
        let query = r#"
            INSERT INTO match_scores (
                founder_profile_id, candidate_profile_id,
                skill_match_score, experience_match_score, culture_match_score, technical_score,
                overall_match_score, disqualified, match_reasoning, computed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            ON CONFLICT (founder_profile_id, candidate_profile_id)
            DO UPDATE SET
                skill_match_score = EXCLUDED.skill_match_score,
                experience_match_score = EXCLUDED.experience_match_score,
                culture_match_score = EXCLUDED.culture_match_score,
                technical_score = EXCLUDED.technical_score,
                overall_match_score = EXCLUDED.overall_match_score,
                disqualified = EXCLUDED.disqualified,
                match_reasoning = COALESCE(EXCLUDED.match_reasoning, match_scores.match_reasoning),
                computed_at = CASE
                    WHEN (match_scores.skill_match_score, match_scores.experience_match_score,
                          match_scores.culture_match_score, match_scores.technical_score,
                          match_scores.overall_match_score, match_scores.disqualified)
                         IS DISTINCT FROM
                         (EXCLUDED.skill_match_score, EXCLUDED.experience_match_score,
                          EXCLUDED.culture_match_score, EXCLUDED.technical_score,
                          EXCLUDED.overall_match_score, EXCLUDED.disqualified)
                    THEN EXCLUDED.computed_at
                    ELSE match_scores.computed_at
                END
        "#;

        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for score in scores {
            let result = sqlx::query(query)
                .bind(&score.role_id)
                .bind(&score.candidate_profile_id)
                .bind(score.scores.skill)
                .bind(score.scores.experience)
                .bind(score.scores.culture)
                .bind(score.scores.technical)
                .bind(score.overall_match_score)
                .bind(score.disqualified)
                .bind(&score.match_reasoning)
                .execute(&mut *tx)
                .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;

        tracing::debug!("Upserted {} match scores", written);

        Ok(written)
    }

    async fn get_role_matches(&self, role_id: &str) -> Result<Vec<RoleMatch>, StoreError> {
        let query = r#"
            SELECT m.founder_profile_id, m.candidate_profile_id, c.candidate_id,
                   m.skill_match_score, m.experience_match_score, m.culture_match_score,
                   m.technical_score, m.overall_match_score, m.disqualified, m.match_reasoning,
                   c.skills, c.experience_level, c.experience_years, c.strengths
            FROM match_scores m
            JOIN candidate_profiles c ON c.id = m.candidate_profile_id
            WHERE m.founder_profile_id = $1
        "#;

        let rows = sqlx::query(query).bind(role_id).fetch_all(&self.pool).await?;

        tracing::debug!("Role {} has {} stored matches", role_id, rows.len());

        rows.iter().map(role_match_from_row).collect()
    }

    async fn get_connected_candidates(&self, role_id: &str) -> Result<Vec<String>, StoreError> {
        let query = r#"
            SELECT candidate_id
            FROM connections
            WHERE founder_profile_id = $1
        "#;

        let rows = sqlx::query(query).bind(role_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| row.try_get("candidate_id").map_err(StoreError::from))
            .collect()
    }

    async fn record_connection(&self, role_id: &str, candidate_id: &str) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO connections (founder_profile_id, candidate_id, status, created_at)
            VALUES ($1, $2, 'pending', NOW())
            ON CONFLICT (founder_profile_id, candidate_id) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(role_id)
            .bind(candidate_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    StoreError::NotFound(format!("Role {} does not exist", role_id))
                }
                other => StoreError::from(other),
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "Role {} is already connected with candidate {}",
                role_id, candidate_id
            )));
        }

        tracing::info!("Recorded connection: {} -> {}", role_id, candidate_id);

        Ok(())
    }

    async fn save_candidate(&self, candidate: &CandidateAttributes) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO candidate_profiles (
                id, candidate_id, skills, experience_level, experience_years,
                work_style_preference, strengths, overall_score, behavioral_score,
                system_design_score, raw_transcript, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                candidate_id = COALESCE(EXCLUDED.candidate_id, candidate_profiles.candidate_id),
                skills = EXCLUDED.skills,
                experience_level = EXCLUDED.experience_level,
                experience_years = EXCLUDED.experience_years,
                work_style_preference = EXCLUDED.work_style_preference,
                strengths = EXCLUDED.strengths,
                overall_score = EXCLUDED.overall_score,
                behavioral_score = EXCLUDED.behavioral_score,
                system_design_score = EXCLUDED.system_design_score,
                raw_transcript = COALESCE(EXCLUDED.raw_transcript, candidate_profiles.raw_transcript),
                updated_at = EXCLUDED.updated_at
        "#;

        let experience_years = candidate
            .experience_years
            .map(|y| i32::try_from(y).unwrap_or(i32::MAX));

        sqlx::query(query)
            .bind(&candidate.id)
            .bind(&candidate.candidate_id)
            .bind(&candidate.skills)
            .bind(candidate.experience_level.map(|l| l.as_str()))
            .bind(experience_years)
            .bind(candidate.work_style_preference.map(|w| w.as_str()))
            .bind(&candidate.strengths)
            .bind(candidate.technical_score)
            .bind(candidate.behavioral_score)
            .bind(candidate.system_design_score)
            .bind(&candidate.transcript)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn save_role(&self, role: &RoleRequirements) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO founder_profiles (
                id, role_title, role_description, required_skills, preferred_skills,
                experience_level, work_style, culture_values, deal_breakers, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                role_title = EXCLUDED.role_title,
                role_description = EXCLUDED.role_description,
                required_skills = EXCLUDED.required_skills,
                preferred_skills = EXCLUDED.preferred_skills,
                experience_level = EXCLUDED.experience_level,
                work_style = EXCLUDED.work_style,
                culture_values = EXCLUDED.culture_values,
                deal_breakers = EXCLUDED.deal_breakers,
                updated_at = EXCLUDED.updated_at
        "#;

        sqlx::query(query)
            .bind(&role.id)
            .bind(&role.role_title)
            .bind(&role.role_description)
            .bind(&role.required_skills)
            .bind(&role.preferred_skills)
            .bind(role.experience_level.map(|l| l.as_str()))
            .bind(role.work_style.map(|w| w.as_str()))
            .bind(&role.culture_values)
            .bind(&role.deal_breakers)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
