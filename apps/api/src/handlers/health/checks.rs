use redis::AsyncCommands;

use super::*;

pub(super) async fn check_store(probe: &StoreProbe) -> StoreHealth {
    match probe {
        StoreProbe::Postgres(pool) => check_postgres(pool).await,
        StoreProbe::Redis(client) => check_redis(client).await,
        StoreProbe::Memory => StoreHealth {
            backend: "memory",
            status: "ok",
            detail: None,
        },
    }
}

async fn check_postgres(pool: &sqlx::PgPool) -> StoreHealth {
    let check = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    match check {
        Ok(_) => StoreHealth {
            backend: "postgres",
            status: "ok",
            detail: None,
        },
        Err(error) => StoreHealth {
            backend: "postgres",
            status: "error",
            detail: Some(format!("postgres check failed: {error}")),
        },
    }
}

async fn check_redis(client: &redis::Client) -> StoreHealth {
    let mut connection = match client.get_multiplexed_async_connection().await {
        Ok(connection) => connection,
        Err(error) => {
            return StoreHealth {
                backend: "redis",
                status: "error",
                detail: Some(format!("redis connection failed: {error}")),
            };
        }
    };

    match connection.ping::<String>().await {
        Ok(value) if value.eq_ignore_ascii_case("pong") => StoreHealth {
            backend: "redis",
            status: "ok",
            detail: None,
        },
        Ok(value) => StoreHealth {
            backend: "redis",
            status: "error",
            detail: Some(format!("unexpected redis ping response: {value}")),
        },
        Err(error) => StoreHealth {
            backend: "redis",
            status: "error",
            detail: Some(format!("redis ping failed: {error}")),
        },
    }
}
