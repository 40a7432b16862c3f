use sqlx::SqlitePool;

const SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS users (
  user_id TEXT PRIMARY KEY,
  name TEXT,
  email TEXT,
  age INTEGER,
  gender TEXT,
  image TEXT,
  created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS current_user (
  user_id TEXT NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS symptom_entries (
  id TEXT PRIMARY KEY,
  user_id TEXT NOT NULL,
  symptoms TEXT NOT NULL,
  created_at TEXT NOT NULL
)
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_symptom_entries_user
  ON symptom_entries (user_id, created_at)
"#,
    r#"
CREATE TABLE IF NOT EXISTS disease_predictions (
  id TEXT PRIMARY KEY,
  symptom_entry_id TEXT NOT NULL
    REFERENCES symptom_entries (id) ON DELETE CASCADE,
  disease_name TEXT NOT NULL,
  probability REAL NOT NULL CHECK (probability >= 0 AND probability <= 100),
  description TEXT NOT NULL,
  precautions TEXT NOT NULL DEFAULT '[]',
  medications TEXT NOT NULL DEFAULT '[]',
  workouts TEXT NOT NULL DEFAULT '[]',
  diets TEXT NOT NULL DEFAULT '[]',
  ai_insights TEXT,
  created_at TEXT NOT NULL,
  UNIQUE (symptom_entry_id, disease_name)
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS user_preferences (
  user_id TEXT PRIMARY KEY,
  email_notifications INTEGER NOT NULL,
  push_notifications INTEGER NOT NULL,
  reminder_notifications INTEGER NOT NULL,
  theme TEXT NOT NULL,
  language TEXT NOT NULL,
  font_size TEXT NOT NULL,
  share_data INTEGER NOT NULL,
  anonymous_analytics INTEGER NOT NULL,
  updated_at TEXT NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS appointments (
  id TEXT PRIMARY KEY,
  user_id TEXT NOT NULL,
  doctor_name TEXT NOT NULL,
  specialty TEXT,
  location TEXT,
  scheduled_at TEXT NOT NULL,
  notes TEXT,
  status TEXT NOT NULL,
  created_at TEXT NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS medications (
  id TEXT PRIMARY KEY,
  user_id TEXT NOT NULL,
  name TEXT NOT NULL,
  dosage TEXT,
  frequency TEXT,
  time_of_day TEXT,
  purpose TEXT,
  instructions TEXT,
  start_date TEXT,
  end_date TEXT,
  refill_date TEXT,
  refills_left INTEGER NOT NULL DEFAULT 0,
  is_active INTEGER NOT NULL DEFAULT 1,
  created_at TEXT NOT NULL
)
"#,
];

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
