use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

use crate::error::Result;
use crate::models::Document;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vacancy {
    pub id: String,
    pub manager_id: String,
    pub name: Option<String>,
    pub video_record_agreed: bool,
    pub video_sending_confirmed: bool,
    pub video_received: bool,
    pub video_path: Option<String>,
    pub description_recieved: bool,
    pub description_json: Option<Document>,
    pub sourcing_criterias_recieved: bool,
    pub sourcing_criterias_json: Option<Document>,
    pub negotiations_collection_recieved: bool,
    pub negotiations_collection_path: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewVacancy {
    pub id: String,
    pub manager_id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub video_record_agreed: bool,
    #[serde(default)]
    pub video_sending_confirmed: bool,
    #[serde(default)]
    pub video_received: bool,
    pub video_path: Option<String>,
    #[serde(default)]
    pub description_recieved: bool,
    pub description_json: Option<Document>,
    #[serde(default)]
    pub sourcing_criterias_recieved: bool,
    pub sourcing_criterias_json: Option<Document>,
    #[serde(default)]
    pub negotiations_collection_recieved: bool,
    pub negotiations_collection_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVacancy {
    pub name: Option<String>,
    pub video_record_agreed: Option<bool>,
    pub video_sending_confirmed: Option<bool>,
    pub video_received: Option<bool>,
    pub video_path: Option<String>,
    pub description_recieved: Option<bool>,
    pub description_json: Option<Document>,
    pub sourcing_criterias_recieved: Option<bool>,
    pub sourcing_criterias_json: Option<Document>,
    pub negotiations_collection_recieved: Option<bool>,
    pub negotiations_collection_path: Option<String>,
}

impl Vacancy {
    /// Fails with a foreign-key violation when `manager_id` does not name an
    /// existing manager.
    pub async fn insert<'e, E>(executor: E, new: &NewVacancy) -> Result<Vacancy>
    where
        E: PgExecutor<'e>,
    {
        let vacancy = sqlx::query_as::<_, Vacancy>(
            r#"
            INSERT INTO vacancies (
                id, manager_id, name,
                video_record_agreed, video_sending_confirmed, video_received, video_path,
                description_recieved, description_json,
                sourcing_criterias_recieved, sourcing_criterias_json,
                negotiations_collection_recieved, negotiations_collection_path
            ) VALUES (
                $1, $2, $3,
                $4, $5, $6, $7,
                $8, $9,
                $10, $11,
                $12, $13
            )
            RETURNING *
            "#,
        )
        .bind(&new.id)
        .bind(&new.manager_id)
        .bind(&new.name)
        .bind(new.video_record_agreed)
        .bind(new.video_sending_confirmed)
        .bind(new.video_received)
        .bind(&new.video_path)
        .bind(new.description_recieved)
        .bind(&new.description_json)
        .bind(new.sourcing_criterias_recieved)
        .bind(&new.sourcing_criterias_json)
        .bind(new.negotiations_collection_recieved)
        .bind(&new.negotiations_collection_path)
        .fetch_one(executor)
        .await?;

        Ok(vacancy)
    }

    pub async fn find<'e, E>(executor: E, id: &str) -> Result<Option<Vacancy>>
    where
        E: PgExecutor<'e>,
    {
        let vacancy = sqlx::query_as::<_, Vacancy>("SELECT * FROM vacancies WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(vacancy)
    }

    pub async fn list_by_manager<'e, E>(executor: E, manager_id: &str) -> Result<Vec<Vacancy>>
    where
        E: PgExecutor<'e>,
    {
        let vacancies = sqlx::query_as::<_, Vacancy>(
            r#"
            SELECT * FROM vacancies
            WHERE manager_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(manager_id)
        .fetch_all(executor)
        .await?;

        Ok(vacancies)
    }

    pub async fn update<'e, E>(executor: E, id: &str, changes: &UpdateVacancy) -> Result<Vacancy>
    where
        E: PgExecutor<'e>,
    {
        let vacancy = sqlx::query_as::<_, Vacancy>(
            r#"
            UPDATE vacancies
            SET
                name = COALESCE($2, name),
                video_record_agreed = COALESCE($3, video_record_agreed),
                video_sending_confirmed = COALESCE($4, video_sending_confirmed),
                video_received = COALESCE($5, video_received),
                video_path = COALESCE($6, video_path),
                description_recieved = COALESCE($7, description_recieved),
                description_json = COALESCE($8, description_json),
                sourcing_criterias_recieved = COALESCE($9, sourcing_criterias_recieved),
                sourcing_criterias_json = COALESCE($10, sourcing_criterias_json),
                negotiations_collection_recieved = COALESCE($11, negotiations_collection_recieved),
                negotiations_collection_path = COALESCE($12, negotiations_collection_path)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(changes.video_record_agreed)
        .bind(changes.video_sending_confirmed)
        .bind(changes.video_received)
        .bind(&changes.video_path)
        .bind(changes.description_recieved)
        .bind(&changes.description_json)
        .bind(changes.sourcing_criterias_recieved)
        .bind(&changes.sourcing_criterias_json)
        .bind(changes.negotiations_collection_recieved)
        .bind(&changes.negotiations_collection_path)
        .fetch_one(executor)
        .await?;

        Ok(vacancy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pipeline_flags_start_false() {
        let new: NewVacancy =
            serde_json::from_value(json!({ "id": "v-1", "manager_id": "m-1" })).unwrap();
        assert!(!new.video_record_agreed);
        assert!(!new.video_sending_confirmed);
        assert!(!new.video_received);
        assert!(!new.description_recieved);
        assert!(!new.sourcing_criterias_recieved);
        assert!(!new.negotiations_collection_recieved);
    }

    #[test]
    fn empty_update_touches_nothing() {
        let changes = UpdateVacancy::default();
        let value = serde_json::to_value(&changes).unwrap();
        assert!(value.as_object().unwrap().values().all(|v| v.is_null()));
    }
}
