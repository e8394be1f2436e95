use mongodb::{
    bson::doc,
    options::{ClientOptions, IndexOptions},
    Client, Database, IndexModel,
};
use tracing::info;

use crate::db::mongo_store::{QUESTIONS, USERS};
use crate::models::{poll_models::Question, user_models::User};
use crate::utils::config::Config;
use crate::utils::error::{AppError, AppResult};

pub async fn init_db(config: &Config) -> AppResult<Database> {
    let mut client_options = ClientOptions::parse(&config.mongo_uri)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to parse MongoDB URI: {}", e)))?;

    client_options.app_name = Some("PollsApp".to_string());

    let client = Client::with_options(client_options)
        .map_err(|e| AppError::DatabaseError(format!("Failed to initialize MongoDB client: {}", e)))?;

    let database = client.database(&config.db_name);
    ensure_indexes(&database).await?;

    info!(db = %config.db_name, "Database connection successful");

    Ok(database)
}

async fn ensure_indexes(database: &Database) -> AppResult<()> {
    let users = database.collection::<User>(USERS);
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! { "username": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;

    let questions = database.collection::<Question>(QUESTIONS);
    questions
        .create_index(IndexModel::builder().keys(doc! { "owner_id": 1, "pub_date": -1 }).build())
        .await?;
    questions
        .create_index(IndexModel::builder().keys(doc! { "pub_date": -1 }).build())
        .await?;

    Ok(())
}
