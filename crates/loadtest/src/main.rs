use goose::prelude::*;
use std::env;

async fn health_check(user: &mut GooseUser) -> TransactionResult {
    let _goose_metrics = user.get("/healthz").await?;
    Ok(())
}

async fn get_history(user: &mut GooseUser) -> TransactionResult {
    let limit = env::var("HISTORY_LIMIT").unwrap_or_else(|_| "20".to_string());
    let path = format!("/history?limit={limit}");
    let _goose_metrics = user.get(&path).await?;
    Ok(())
}

async fn send_message(user: &mut GooseUser) -> TransactionResult {
    let payload = serde_json::json!({
        "text": format!("loadtest message from user {}", user.weighted_users_index),
    });
    let _goose_metrics = user.post_json("/send", &payload).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), GooseError> {
    // Every /send reaches Telegram, so it has to be asked for explicitly.
    let include_send = env::var("LOADTEST_SEND").is_ok_and(|v| v == "1");
    if include_send {
        println!("LOADTEST_SEND=1: /send is included, messages will be delivered");
    } else {
        println!("/send is excluded; set LOADTEST_SEND=1 to include it");
    }

    let mut attack = GooseAttack::initialize()?
        .register_scenario(
            scenario!("HealthCheck").register_transaction(transaction!(health_check)),
        )
        .register_scenario(scenario!("History").register_transaction(transaction!(get_history)));

    if include_send {
        attack = attack
            .register_scenario(scenario!("Send").register_transaction(transaction!(send_message)));
    }

    attack.execute().await?;

    Ok(())
}
