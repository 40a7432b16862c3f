#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsersRow {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub image: Option<String>,
}
