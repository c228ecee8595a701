pub mod entities;
mod choice_repository;
mod question_repository;
mod user_repository;
mod vote_repository;

pub use choice_repository::ChoiceRepository;
pub use question_repository::{QuestionFilter, QuestionRepository};
pub use user_repository::UserRepository;
pub use vote_repository::{ChoiceVotes, VoteRepository};

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::time::Duration;

const MIGRATIONS: &[(&str, &str)] = &[("001_initial", include_str!("../../../../migrations/001_initial.sql"))];

pub async fn create_connection(database_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    Database::connect(opt).await
}

/// Applies the bundled SQL migrations. Every statement is idempotent.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();

    for (name, migration) in MIGRATIONS {
        for statement in split_statements(migration) {
            db.execute(Statement::from_string(backend, statement)).await?;
        }
        tracing::info!(migration = *name, "Applied migration");
    }

    Ok(())
}

fn split_statements(sql: &str) -> Vec<String> {
    // Comments are stripped first so a `;` inside one cannot end a statement.
    let code = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    code.split(';')
        .map(|statement| statement.trim().to_string())
        .filter(|statement| !statement.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) fn transaction_log(db: std::sync::Arc<DatabaseConnection>) -> Vec<sea_orm::Transaction> {
    std::sync::Arc::try_unwrap(db)
        .unwrap_or_else(|_| panic!("connection is still shared"))
        .into_transaction_log()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_drops_comments() {
        let sql = "-- header\nCREATE TABLE a (id INT);\n\n-- note\nCREATE INDEX i ON a (id);\n";
        assert_eq!(
            split_statements(sql),
            vec!["CREATE TABLE a (id INT)".to_string(), "CREATE INDEX i ON a (id)".to_string()]
        );
    }

    #[test]
    fn semicolon_inside_comment_does_not_split() {
        let sql = "-- one row per key; enforced below\nCREATE UNIQUE INDEX u ON a (k);\n";
        assert_eq!(split_statements(sql), vec!["CREATE UNIQUE INDEX u ON a (k)".to_string()]);
    }

    #[test]
    fn bundled_migration_statements_are_all_ddl() {
        for statement in split_statements(MIGRATIONS[0].1) {
            assert!(statement.starts_with("CREATE "), "{statement}");
        }
    }

    #[test]
    fn bundled_migration_has_vote_uniqueness() {
        let statements = split_statements(MIGRATIONS[0].1);
        assert!(statements
            .iter()
            .any(|s| s.starts_with("CREATE UNIQUE INDEX") && s.contains("votes (user_id, question_id)")));
    }
}
