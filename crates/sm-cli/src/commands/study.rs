use clap::Subcommand;
use sm_core::{FlashcardSession, QuizSession};

use super::{flush_queue, friendly_error, prompt, AppContext};

#[derive(Subcommand)]
pub enum StudyMode {
    /// Flashcard round: reveal the back, self-grade each card.
    Flashcards {
        subject: String,
        topic: String,
        /// Number of cards to request.
        #[arg(short, long)]
        count: Option<u32>,
    },
    /// Quiz round: multiple-choice questions are scored locally, free-text
    /// answers are graded by the backend.
    Quiz {
        subject: String,
        topic: String,
        /// Number of questions to request.
        #[arg(short, long)]
        count: Option<u32>,
    },
}

pub async fn run(ctx: &AppContext, mode: StudyMode) -> anyhow::Result<()> {
    match mode {
        StudyMode::Flashcards {
            subject,
            topic,
            count,
        } => {
            let count = count.unwrap_or(ctx.config.study.default_card_count);
            flashcards(ctx, &subject, &topic, count).await
        }
        StudyMode::Quiz {
            subject,
            topic,
            count,
        } => {
            let count = count.unwrap_or(ctx.config.study.default_quiz_length);
            quiz(ctx, &subject, &topic, count).await
        }
    }
}

async fn flashcards(ctx: &AppContext, subject: &str, topic: &str, count: u32) -> anyhow::Result<()> {
    let user_id = ctx.user_id()?;
    let set = ctx
        .client
        .generate_flashcards(subject, topic, count)
        .await
        .map_err(friendly_error)?;
    if set.cards.is_empty() {
        println!("No cards available for {subject}/{topic}.");
        return Ok(());
    }

    let mut session = FlashcardSession::start(user_id, &set)?;
    let total = set.cards.len();
    for (i, card) in set.cards.iter().enumerate() {
        println!();
        println!("[{}/{}] {}", i + 1, total, card.front);
        prompt("  (enter to reveal) ")?;
        println!("  {}", card.back);
        let answer = prompt("  Did you get it right? [y/n] ")?;
        session.record(&card.id, answer.eq_ignore_ascii_case("y"))?;
    }

    let update = session.finish();
    let data = &update.session_data;
    println!();
    println!(
        "Round done: {}/{} correct in {:.0}s",
        data.correct_answers, data.cards_studied, data.time_spent
    );

    // Fire-and-forget save; the CLI only waits so short-lived processes
    // don't exit before the write lands.
    ctx.queue.enqueue(update)?;
    flush_queue(ctx).await
}

async fn quiz(ctx: &AppContext, subject: &str, topic: &str, count: u32) -> anyhow::Result<()> {
    let user_id = ctx.user_id()?;
    let quiz = ctx
        .client
        .generate_quiz(subject, topic, count)
        .await
        .map_err(friendly_error)?;
    if quiz.questions.is_empty() {
        println!("No questions available for {subject}/{topic}.");
        return Ok(());
    }

    let mut session = QuizSession::start(user_id, &quiz)?;
    let total = quiz.questions.len();
    for (i, q) in quiz.questions.iter().enumerate() {
        println!();
        println!("[{}/{}] {}", i + 1, total, q.question);

        if q.choices.is_empty() {
            let answer = prompt("  Your answer: ")?;
            let verdict = ctx
                .client
                .evaluate_answer(&q.id, &answer)
                .await
                .map_err(friendly_error)?;
            println!("  {}", if verdict.correct { "Correct!" } else { "Not quite." });
            if let Some(explanation) = &verdict.explanation {
                println!("  {explanation}");
            }
            session.record_evaluation(&q.id, &verdict)?;
        } else {
            for (n, choice) in q.choices.iter().enumerate() {
                println!("  {}. {choice}", n + 1);
            }
            let picked = loop {
                let raw = prompt("  Pick one: ")?;
                match raw.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= q.choices.len() => break n - 1,
                    _ => println!("  Enter a number between 1 and {}.", q.choices.len()),
                }
            };
            let correct = session.answer_choice(&q.id, picked)?;
            println!("  {}", if correct { "Correct!" } else { "Not quite." });
        }
    }

    let update = session.finish();
    let data = &update.session_data;
    println!();
    println!(
        "Quiz done: {}/{} correct in {:.0}s",
        data.correct_answers, data.cards_studied, data.time_spent
    );

    ctx.queue.enqueue(update)?;
    flush_queue(ctx).await
}
