use super::{friendly_error, AppContext};

pub async fn run(ctx: &AppContext) -> anyhow::Result<()> {
    let user_id = ctx.user_id()?;
    let report = ctx
        .client
        .fetch_progress(&user_id)
        .await
        .map_err(friendly_error)?;

    println!(
        "Progress for {} — {} session(s), {:.0} minutes total",
        report.user_id,
        report.total_sessions,
        report.total_time_secs / 60.0
    );
    if report.topics.is_empty() {
        println!("No study history yet. Try `sm study flashcards math algebra`.");
        return Ok(());
    }

    println!();
    println!("{:<20} {:>8} {:>8} {:>8} {:>10}", "topic", "sessions", "cards", "correct", "minutes");
    for t in &report.topics {
        println!(
            "{:<20} {:>8} {:>8} {:>8} {:>10.0}",
            t.topic,
            t.sessions,
            t.cards_studied,
            t.correct_answers,
            t.time_spent_secs / 60.0
        );
    }
    Ok(())
}
