use redis::AsyncCommands;
use viewbadge_core::AppError;

pub(super) async fn connect_redis(redis_url: &str) -> Result<redis::Client, AppError> {
    let client = redis::Client::open(redis_url)
        .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))?;

    let mut connection = client
        .get_multiplexed_async_connection()
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;
    connection
        .ping::<String>()
        .await
        .map_err(|error| AppError::Internal(format!("redis ping failed: {error}")))?;

    Ok(client)
}
