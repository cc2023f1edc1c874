use sm_api_types::ChatMessage;

use super::{friendly_error, AppContext};

pub async fn run(ctx: &AppContext, message: &str) -> anyhow::Result<()> {
    let reply = ctx
        .client
        .chat(&[ChatMessage::user(message)])
        .await
        .map_err(friendly_error)?;

    if let Some(tutor) = &reply.tutor {
        println!("{tutor}:");
    }
    println!("{}", reply.content);

    if !reply.suggested_topics.is_empty() {
        println!();
        println!("Related topics: {}", reply.suggested_topics.join(", "));
    }
    Ok(())
}
