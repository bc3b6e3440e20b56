use std::io::{BufRead, Write};

use crossterm::style::Stylize;

use crate::core::engine::Trainer;
use crate::core::error::TrainerError;
use crate::core::types::{DisplayPayload, PhishResult};
use crate::core::url::UrlPart;
use crate::ui::app::{Answer, Session};

/// Line-oriented play loop. Reads answers from `input` until it hits EOF,
/// the player quits or the URL source runs dry.
pub async fn run_play<R: BufRead, W: Write>(
    trainer: &mut Trainer,
    input: &mut R,
    out: &mut W,
) -> Result<Session, TrainerError> {
    let mut session = Session::new();
    let level = trainer.level().max(1);
    trainer.start_level(level).await?;
    writeln!(out, "{}", "PHISH TRAINER".bold().cyan())?;
    writeln!(
        out,
        "Answer y if the URL is phish, n if genuine, q to quit.\n"
    )?;

    loop {
        if trainer.level_complete() {
            let done = trainer.level();
            writeln!(out, "{}\n", format!("Level {done} complete!").green().bold())?;
            session.log(format!("level {done} complete"));
            trainer.start_level(done + 1).await?;
        }

        let payload = match trainer.next_round().await {
            Ok(payload) => payload,
            Err(TrainerError::NoUrlAvailable) => {
                writeln!(out, "{}", "No URL available, try again later.".yellow())?;
                break;
            }
            Err(err) => return Err(err),
        };
        draw_round(out, trainer, &payload)?;

        let answer = match prompt_answer(input, out)? {
            Some(Answer::Quit) | None => break,
            Some(answer) => answer,
        };
        let result = trainer.judge_verdict(answer == Answer::Phish).await?;
        session.record(result);

        if result == PhishResult::PhishDetected {
            if let Some(selected) = prompt_part(input, out)? {
                let hit = trainer.judge_part(selected)?;
                if hit {
                    writeln!(out, "{}", "Spot on, that part carries the attack.".green())?;
                } else {
                    writeln!(out, "{}", "Not quite, look again below.".yellow())?;
                }
            }
        }
        draw_feedback(out, trainer, result)?;
    }

    trainer.shutdown().await;
    writeln!(
        out,
        "\n{} rounds, {} correct ({:.0}%)",
        session.rounds,
        session.correct,
        session.accuracy() * 100.0
    )?;
    Ok(session)
}

fn draw_round<W: Write>(
    out: &mut W,
    trainer: &Trainer,
    payload: &DisplayPayload,
) -> Result<(), TrainerError> {
    writeln!(
        out,
        "{}  {}  {}",
        format!("Level {}", trainer.level()).bold(),
        format!("lesson: {}", payload.attack_type).dark_grey(),
        format!("{}/{} points", trainer.points(), trainer.points_needed()).dark_grey()
    )?;
    writeln!(out, "  {}", payload.parts.concat().bold())?;
    for (idx, part) in payload.parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        let label = UrlPart::from_index(idx).map(UrlPart::label).unwrap_or("?");
        writeln!(out, "    [{idx}] {label:<10} {part}")?;
    }
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>, TrainerError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_answer<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> Result<Option<Answer>, TrainerError> {
    loop {
        write!(out, "Phish? [y/n/q] ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match Answer::parse(&line) {
            Some(answer) => return Ok(Some(answer)),
            None => writeln!(out, "{}", "Please answer y, n or q.".yellow())?,
        }
    }
}

/// Blank input skips the question.
fn prompt_part<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> Result<Option<usize>, TrainerError> {
    loop {
        write!(out, "Which part gives it away? [index, blank to skip] ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        if line.is_empty() {
            return Ok(None);
        }
        match line.parse::<usize>() {
            Ok(idx) => return Ok(Some(idx)),
            Err(_) => writeln!(out, "{}", "Enter a part number.".yellow())?,
        }
    }
}

fn draw_feedback<W: Write>(
    out: &mut W,
    trainer: &Trainer,
    result: PhishResult,
) -> Result<(), TrainerError> {
    let verdict = if result.is_correct() {
        format!("Correct: {result}").green().bold()
    } else {
        format!("Wrong: {result}").red().bold()
    };
    writeln!(out, "{verdict}")?;

    if let Some(round) = trainer.current_round() {
        if let Some(attack) = round.attack {
            let indices: Vec<String> = round
                .correct_indices()
                .iter()
                .map(|i| i.to_string())
                .collect();
            writeln!(out, "  genuine:  {}", round.source_url)?;
            writeln!(out, "  shown:    {}", round.shown_url())?;
            writeln!(
                out,
                "  attack:   {} on part(s) {}, {} edit(s) away",
                attack,
                indices.join(","),
                round.edit_distance()
            )?;
            writeln!(out, "  {}", attack.lesson().italic())?;
        }
    }
    writeln!(out)?;
    Ok(())
}
