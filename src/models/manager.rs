use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

use crate::error::Result;
use crate::models::Document;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Manager {
    pub id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub first_time_seen: Option<DateTime<Utc>>,
    pub privacy_policy_confirmed: bool,
    pub privacy_policy_confirmation_time: Option<DateTime<Utc>>,
    pub access_token_recieved: bool,
    #[serde(skip_serializing, default)]
    pub access_token: Option<String>,
    /// Unix seconds.
    pub access_token_expires_at: Option<i64>,
    pub hh_data: Option<Document>,
    pub vacancy_selected: bool,
    pub messages_with_keyboards: Option<Document>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewManager {
    pub id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub privacy_policy_confirmed: bool,
    pub privacy_policy_confirmation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub access_token_recieved: bool,
    pub access_token: Option<String>,
    pub access_token_expires_at: Option<i64>,
    pub hh_data: Option<Document>,
    #[serde(default)]
    pub vacancy_selected: bool,
    /// `None` stores an empty list.
    pub messages_with_keyboards: Option<Document>,
}

/// Partial update; `None` leaves the column as it is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateManager {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub privacy_policy_confirmed: Option<bool>,
    pub privacy_policy_confirmation_time: Option<DateTime<Utc>>,
    pub access_token_recieved: Option<bool>,
    pub access_token: Option<String>,
    pub access_token_expires_at: Option<i64>,
    pub hh_data: Option<Document>,
    pub vacancy_selected: Option<bool>,
    pub messages_with_keyboards: Option<Document>,
}

impl Manager {
    pub async fn insert<'e, E>(executor: E, new: &NewManager) -> Result<Manager>
    where
        E: PgExecutor<'e>,
    {
        let manager = sqlx::query_as::<_, Manager>(
            r#"
            INSERT INTO managers (
                id, username, first_name, last_name,
                privacy_policy_confirmed, privacy_policy_confirmation_time,
                access_token_recieved, access_token, access_token_expires_at,
                hh_data, vacancy_selected, messages_with_keyboards
            ) VALUES (
                $1, $2, $3, $4,
                $5, $6,
                $7, $8, $9,
                $10, $11, COALESCE($12, '[]'::jsonb)
            )
            RETURNING *
            "#,
        )
        .bind(&new.id)
        .bind(&new.username)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.privacy_policy_confirmed)
        .bind(new.privacy_policy_confirmation_time)
        .bind(new.access_token_recieved)
        .bind(&new.access_token)
        .bind(new.access_token_expires_at)
        .bind(&new.hh_data)
        .bind(new.vacancy_selected)
        .bind(&new.messages_with_keyboards)
        .fetch_one(executor)
        .await?;

        Ok(manager)
    }

    pub async fn find<'e, E>(executor: E, id: &str) -> Result<Option<Manager>>
    where
        E: PgExecutor<'e>,
    {
        let manager = sqlx::query_as::<_, Manager>("SELECT * FROM managers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(manager)
    }

    pub async fn update<'e, E>(executor: E, id: &str, changes: &UpdateManager) -> Result<Manager>
    where
        E: PgExecutor<'e>,
    {
        let manager = sqlx::query_as::<_, Manager>(
            r#"
            UPDATE managers
            SET
                username = COALESCE($2, username),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                privacy_policy_confirmed = COALESCE($5, privacy_policy_confirmed),
                privacy_policy_confirmation_time = COALESCE($6, privacy_policy_confirmation_time),
                access_token_recieved = COALESCE($7, access_token_recieved),
                access_token = COALESCE($8, access_token),
                access_token_expires_at = COALESCE($9, access_token_expires_at),
                hh_data = COALESCE($10, hh_data),
                vacancy_selected = COALESCE($11, vacancy_selected),
                messages_with_keyboards = COALESCE($12, messages_with_keyboards)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(changes.privacy_policy_confirmed)
        .bind(changes.privacy_policy_confirmation_time)
        .bind(changes.access_token_recieved)
        .bind(&changes.access_token)
        .bind(changes.access_token_expires_at)
        .bind(&changes.hh_data)
        .bind(changes.vacancy_selected)
        .bind(&changes.messages_with_keyboards)
        .fetch_one(executor)
        .await?;

        Ok(manager)
    }

    /// Appends one record to `messages_with_keyboards`. A record that is
    /// itself an array is stored as a single element, not spliced in.
    pub async fn push_message_with_keyboard<'e, E>(
        executor: E,
        id: &str,
        record: &Document,
    ) -> Result<Manager>
    where
        E: PgExecutor<'e>,
    {
        let manager = sqlx::query_as::<_, Manager>(
            r#"
            UPDATE managers
            SET messages_with_keyboards =
                COALESCE(messages_with_keyboards, '[]'::jsonb) || jsonb_build_array($2::jsonb)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(record)
        .fetch_one(executor)
        .await?;

        Ok(manager)
    }

    pub async fn clear_messages_with_keyboards<'e, E>(executor: E, id: &str) -> Result<Manager>
    where
        E: PgExecutor<'e>,
    {
        let manager = sqlx::query_as::<_, Manager>(
            r#"
            UPDATE managers
            SET messages_with_keyboards = '[]'::jsonb
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await?;

        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_manager_flags_default_to_false() {
        let new: NewManager = serde_json::from_value(json!({ "id": "42" })).unwrap();
        assert_eq!(new.id, "42");
        assert!(!new.privacy_policy_confirmed);
        assert!(!new.access_token_recieved);
        assert!(!new.vacancy_selected);
        assert!(new.messages_with_keyboards.is_none());
    }

    #[test]
    fn access_token_is_not_serialized() {
        let manager = Manager {
            id: "1".into(),
            username: Some("hr_lead".into()),
            first_name: None,
            last_name: None,
            first_time_seen: None,
            privacy_policy_confirmed: true,
            privacy_policy_confirmation_time: None,
            access_token_recieved: true,
            access_token: Some("secret-token".into()),
            access_token_expires_at: Some(1_700_000_000),
            hh_data: None,
            vacancy_selected: false,
            messages_with_keyboards: Some(json!([])),
            created_at: None,
            updated_at: None,
        };

        let value = serde_json::to_value(&manager).unwrap();
        assert!(value.get("access_token").is_none());
        assert_eq!(value["access_token_recieved"], json!(true));
    }
}
