use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

/// Schema statements, applied in order on every start
const MIGRATIONS: &[&str] = &[
    // Genre classifier output, one row per confirmed upload
    r#"
    CREATE TABLE IF NOT EXISTS genre_predictions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        genre TEXT NOT NULL,
        confidence TEXT NOT NULL,
        file_name TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    // Google Books details, one row per confirmed upload
    r#"
    CREATE TABLE IF NOT EXISTS book_information (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        authors TEXT NOT NULL,
        categories TEXT NOT NULL,
        publisher TEXT NOT NULL,
        file_name TEXT NOT NULL,
        info_link TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    // Rows are only linked by file name
    "CREATE INDEX IF NOT EXISTS idx_genre_predictions_file_name ON genre_predictions(file_name)",
    "CREATE INDEX IF NOT EXISTS idx_book_information_file_name ON book_information(file_name)",
];

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;
    run_migrations(&db).await?;
    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    for sql in MIGRATIONS {
        db.execute(Statement::from_string(backend, sql.to_string()))
            .await?;
    }

    tracing::debug!("Applied {} schema statements", MIGRATIONS.len());
    Ok(())
}
