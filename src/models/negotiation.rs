use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

use crate::error::Result;
use crate::models::Document;

/// Sorting status given to a resume nobody has looked at yet.
pub const DEFAULT_SORTING_STATUS: &str = "new";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Negotiation {
    pub id: String,
    pub vacancy_id: String,
    pub resume_id: Option<String>,
    pub applicant_first_name: Option<String>,
    pub applicant_last_name: Option<String>,
    pub applicant_phone: Option<String>,
    pub applicant_email: Option<String>,
    pub resume_ai_analysis: Option<Document>,
    pub resume_sorting_status: Option<String>,
    pub link_to_tg_bot_sent: bool,
    pub video_received: bool,
    pub video_path: Option<String>,
    pub resume_recommended: bool,
    pub resume_accepted: bool,
    pub interview_invitation_sent: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewNegotiation {
    pub id: String,
    pub vacancy_id: String,
    pub resume_id: Option<String>,
    pub applicant_first_name: Option<String>,
    pub applicant_last_name: Option<String>,
    pub applicant_phone: Option<String>,
    pub applicant_email: Option<String>,
    pub resume_ai_analysis: Option<Document>,
    /// Falls back to [`DEFAULT_SORTING_STATUS`].
    pub resume_sorting_status: Option<String>,
    #[serde(default)]
    pub link_to_tg_bot_sent: bool,
    #[serde(default)]
    pub video_received: bool,
    pub video_path: Option<String>,
    #[serde(default)]
    pub resume_recommended: bool,
    #[serde(default)]
    pub resume_accepted: bool,
    #[serde(default)]
    pub interview_invitation_sent: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNegotiation {
    pub resume_id: Option<String>,
    pub applicant_first_name: Option<String>,
    pub applicant_last_name: Option<String>,
    pub applicant_phone: Option<String>,
    pub applicant_email: Option<String>,
    pub resume_ai_analysis: Option<Document>,
    pub resume_sorting_status: Option<String>,
    pub link_to_tg_bot_sent: Option<bool>,
    pub video_received: Option<bool>,
    pub video_path: Option<String>,
    pub resume_recommended: Option<bool>,
    pub resume_accepted: Option<bool>,
    pub interview_invitation_sent: Option<bool>,
}

impl NewNegotiation {
    fn sorting_status(&self) -> &str {
        self.resume_sorting_status
            .as_deref()
            .unwrap_or(DEFAULT_SORTING_STATUS)
    }
}

impl Negotiation {
    pub async fn insert<'e, E>(executor: E, new: &NewNegotiation) -> Result<Negotiation>
    where
        E: PgExecutor<'e>,
    {
        let negotiation = sqlx::query_as::<_, Negotiation>(
            r#"
            INSERT INTO negotiations (
                id, vacancy_id, resume_id,
                applicant_first_name, applicant_last_name, applicant_phone, applicant_email,
                resume_ai_analysis, resume_sorting_status,
                link_to_tg_bot_sent, video_received, video_path,
                resume_recommended, resume_accepted, interview_invitation_sent
            ) VALUES (
                $1, $2, $3,
                $4, $5, $6, $7,
                $8, $9,
                $10, $11, $12,
                $13, $14, $15
            )
            RETURNING *
            "#,
        )
        .bind(&new.id)
        .bind(&new.vacancy_id)
        .bind(&new.resume_id)
        .bind(&new.applicant_first_name)
        .bind(&new.applicant_last_name)
        .bind(&new.applicant_phone)
        .bind(&new.applicant_email)
        .bind(&new.resume_ai_analysis)
        .bind(new.sorting_status())
        .bind(new.link_to_tg_bot_sent)
        .bind(new.video_received)
        .bind(&new.video_path)
        .bind(new.resume_recommended)
        .bind(new.resume_accepted)
        .bind(new.interview_invitation_sent)
        .fetch_one(executor)
        .await?;

        Ok(negotiation)
    }

    pub async fn find<'e, E>(executor: E, id: &str) -> Result<Option<Negotiation>>
    where
        E: PgExecutor<'e>,
    {
        let negotiation =
            sqlx::query_as::<_, Negotiation>("SELECT * FROM negotiations WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(negotiation)
    }

    pub async fn list_by_vacancy<'e, E>(executor: E, vacancy_id: &str) -> Result<Vec<Negotiation>>
    where
        E: PgExecutor<'e>,
    {
        let negotiations = sqlx::query_as::<_, Negotiation>(
            r#"
            SELECT * FROM negotiations
            WHERE vacancy_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(vacancy_id)
        .fetch_all(executor)
        .await?;

        Ok(negotiations)
    }

    pub async fn update<'e, E>(
        executor: E,
        id: &str,
        changes: &UpdateNegotiation,
    ) -> Result<Negotiation>
    where
        E: PgExecutor<'e>,
    {
        let negotiation = sqlx::query_as::<_, Negotiation>(
            r#"
            UPDATE negotiations
            SET
                resume_id = COALESCE($2, resume_id),
                applicant_first_name = COALESCE($3, applicant_first_name),
                applicant_last_name = COALESCE($4, applicant_last_name),
                applicant_phone = COALESCE($5, applicant_phone),
                applicant_email = COALESCE($6, applicant_email),
                resume_ai_analysis = COALESCE($7, resume_ai_analysis),
                resume_sorting_status = COALESCE($8, resume_sorting_status),
                link_to_tg_bot_sent = COALESCE($9, link_to_tg_bot_sent),
                video_received = COALESCE($10, video_received),
                video_path = COALESCE($11, video_path),
                resume_recommended = COALESCE($12, resume_recommended),
                resume_accepted = COALESCE($13, resume_accepted),
                interview_invitation_sent = COALESCE($14, interview_invitation_sent)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.resume_id)
        .bind(&changes.applicant_first_name)
        .bind(&changes.applicant_last_name)
        .bind(&changes.applicant_phone)
        .bind(&changes.applicant_email)
        .bind(&changes.resume_ai_analysis)
        .bind(&changes.resume_sorting_status)
        .bind(changes.link_to_tg_bot_sent)
        .bind(changes.video_received)
        .bind(&changes.video_path)
        .bind(changes.resume_recommended)
        .bind(changes.resume_accepted)
        .bind(changes.interview_invitation_sent)
        .fetch_one(executor)
        .await?;

        Ok(negotiation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sorting_status_falls_back_to_new() {
        let new = NewNegotiation {
            id: "n-1".into(),
            vacancy_id: "v-1".into(),
            ..Default::default()
        };
        assert_eq!(new.sorting_status(), "new");
        assert!(!new.link_to_tg_bot_sent);
        assert!(!new.interview_invitation_sent);
    }

    #[test]
    fn explicit_sorting_status_is_kept() {
        let new = NewNegotiation {
            id: "n-2".into(),
            vacancy_id: "v-1".into(),
            resume_sorting_status: Some("rejected".into()),
            ..Default::default()
        };
        assert_eq!(new.sorting_status(), "rejected");
    }
}
