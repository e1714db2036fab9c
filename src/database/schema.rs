use crate::error::Result;
use sqlx::PgPool;
use tracing::{debug, info};

/// Names of the tables `init_db` owns, parents first.
pub const TABLES: [&str; 3] = ["managers", "vacancies", "negotiations"];

/// Key for the transaction-scoped advisory lock taken while the schema is
/// being ensured. Arbitrary, but must stay stable across releases.
const SCHEMA_LOCK_KEY: i64 = 0x7265_6372_7569_7400;

const CREATE_MANAGERS: &str = r#"
    CREATE TABLE IF NOT EXISTS managers (
        id VARCHAR PRIMARY KEY,
        username VARCHAR,
        first_name VARCHAR,
        last_name VARCHAR,
        first_time_seen TIMESTAMPTZ DEFAULT now(),
        privacy_policy_confirmed BOOLEAN NOT NULL DEFAULT FALSE,
        privacy_policy_confirmation_time TIMESTAMPTZ,
        access_token_recieved BOOLEAN NOT NULL DEFAULT FALSE,
        access_token VARCHAR,
        access_token_expires_at BIGINT,
        hh_data JSONB,
        vacancy_selected BOOLEAN NOT NULL DEFAULT FALSE,
        messages_with_keyboards JSONB DEFAULT '[]'::jsonb,
        created_at TIMESTAMPTZ DEFAULT now(),
        updated_at TIMESTAMPTZ DEFAULT now()
    )
"#;

const CREATE_VACANCIES: &str = r#"
    CREATE TABLE IF NOT EXISTS vacancies (
        id VARCHAR PRIMARY KEY,
        manager_id VARCHAR NOT NULL REFERENCES managers(id),
        name VARCHAR,
        video_record_agreed BOOLEAN NOT NULL DEFAULT FALSE,
        video_sending_confirmed BOOLEAN NOT NULL DEFAULT FALSE,
        video_received BOOLEAN NOT NULL DEFAULT FALSE,
        video_path VARCHAR,
        description_recieved BOOLEAN NOT NULL DEFAULT FALSE,
        description_json JSONB,
        sourcing_criterias_recieved BOOLEAN NOT NULL DEFAULT FALSE,
        sourcing_criterias_json JSONB,
        negotiations_collection_recieved BOOLEAN NOT NULL DEFAULT FALSE,
        negotiations_collection_path VARCHAR,
        created_at TIMESTAMPTZ DEFAULT now(),
        updated_at TIMESTAMPTZ DEFAULT now()
    )
"#;

const CREATE_NEGOTIATIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS negotiations (
        id VARCHAR PRIMARY KEY,
        vacancy_id VARCHAR NOT NULL REFERENCES vacancies(id),
        resume_id VARCHAR,
        applicant_first_name VARCHAR,
        applicant_last_name VARCHAR,
        applicant_phone VARCHAR,
        applicant_email VARCHAR,
        resume_ai_analysis JSONB,
        resume_sorting_status VARCHAR DEFAULT 'new',
        link_to_tg_bot_sent BOOLEAN NOT NULL DEFAULT FALSE,
        video_received BOOLEAN NOT NULL DEFAULT FALSE,
        video_path VARCHAR,
        resume_recommended BOOLEAN NOT NULL DEFAULT FALSE,
        resume_accepted BOOLEAN NOT NULL DEFAULT FALSE,
        interview_invitation_sent BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ DEFAULT now(),
        updated_at TIMESTAMPTZ DEFAULT now()
    )
"#;

const INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_vacancies_manager_id ON vacancies (manager_id)",
    "CREATE INDEX IF NOT EXISTS idx_negotiations_vacancy_id ON negotiations (vacancy_id)",
];

// clock_timestamp() rather than now(): now() is frozen for the whole
// transaction, so an update in the inserting transaction would not move it.
const TOUCH_UPDATED_AT_FN: &str = r#"
    CREATE OR REPLACE FUNCTION touch_updated_at() RETURNS trigger AS $$
    BEGIN
        NEW.updated_at := clock_timestamp();
        RETURN NEW;
    END;
    $$ LANGUAGE plpgsql
"#;

fn touch_trigger(table: &str) -> String {
    format!(
        r#"
        DO $$
        BEGIN
            IF NOT EXISTS (
                SELECT 1 FROM pg_trigger
                WHERE tgname = '{table}_touch_updated_at'
                  AND tgrelid = '{table}'::regclass
            ) THEN
                CREATE TRIGGER {table}_touch_updated_at
                    BEFORE UPDATE ON {table}
                    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
            END IF;
        END
        $$
        "#
    )
}

/// Creates the `managers`, `vacancies` and `negotiations` tables if they are
/// missing. Safe to call on every start; existing tables are left alone.
pub async fn init_db(pool: &PgPool) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    for (table, ddl) in TABLES
        .into_iter()
        .zip([CREATE_MANAGERS, CREATE_VACANCIES, CREATE_NEGOTIATIONS])
    {
        debug!(table, "Ensuring table");
        sqlx::query(ddl).execute(&mut *tx).await?;
    }

    for ddl in INDEXES {
        sqlx::query(ddl).execute(&mut *tx).await?;
    }

    sqlx::query(TOUCH_UPDATED_AT_FN).execute(&mut *tx).await?;
    for table in TABLES {
        sqlx::query(&touch_trigger(table)).execute(&mut *tx).await?;
    }

    tx.commit().await?;

    info!("Tables created or already exist");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_created_parents_first() {
        assert_eq!(TABLES, ["managers", "vacancies", "negotiations"]);
        assert!(CREATE_VACANCIES.contains("REFERENCES managers(id)"));
        assert!(CREATE_NEGOTIATIONS.contains("REFERENCES vacancies(id)"));
    }

    #[test]
    fn foreign_keys_have_no_delete_action() {
        for ddl in [CREATE_MANAGERS, CREATE_VACANCIES, CREATE_NEGOTIATIONS] {
            assert!(!ddl.contains("ON DELETE"));
        }
    }

    #[test]
    fn touch_trigger_is_guarded() {
        let sql = touch_trigger("vacancies");
        assert!(sql.contains("IF NOT EXISTS"));
        assert!(sql.contains("CREATE TRIGGER vacancies_touch_updated_at"));
        assert!(sql.contains("BEFORE UPDATE ON vacancies"));
    }
}
