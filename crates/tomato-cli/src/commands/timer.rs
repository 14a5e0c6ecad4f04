use chrono::Local;
use clap::Subcommand;
use serde_json::json;
use tomato_core::storage::keys;
use tomato_core::{Event, FocusTimer, KvStore, TimerKind, TimerState, TomatoUniverse};

use super::{open_universe, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the countdown
    Start {
        /// Run a break instead of a focus session
        #[arg(long = "break")]
        short_break: bool,
    },
    /// Pause the countdown
    Pause,
    /// Print current timer state as JSON
    Status,
    /// Stop and rewind to idle
    Reset,
}

fn load_timer<S: KvStore>(universe: &TomatoUniverse<S>) -> FocusTimer {
    universe
        .gateway()
        .load_json::<FocusTimer>(keys::TIMER_STATE)
        .unwrap_or_else(|| universe.config().timer(TimerKind::Focus))
}

/// Print a timer event. A finished focus countdown counts as a session.
fn handle_event<S: KvStore>(universe: &mut TomatoUniverse<S>, event: Option<Event>) -> CliResult {
    let Some(event) = event else {
        return Ok(());
    };
    print_json(&event)?;
    if let Event::TimerCompleted {
        kind: TimerKind::Focus,
        ..
    } = event
    {
        universe.record_standalone_session(&Local::now());
    }
    Ok(())
}

fn print_status(timer: &FocusTimer) -> CliResult {
    let mut status = serde_json::to_value(timer.snapshot())?;
    status["progress"] = json!(timer.progress());
    print_json(&status)
}

pub fn run(action: TimerAction) -> CliResult {
    let mut universe = open_universe()?;
    let mut timer = load_timer(&universe);

    match action {
        TimerAction::Start { short_break } => {
            let kind = if short_break {
                TimerKind::Break
            } else {
                TimerKind::Focus
            };
            // a running timer may have run out since the last command
            handle_event(&mut universe, timer.tick())?;
            // switching kind, or starting over after a finished interval,
            // picks up the configured duration
            if timer.kind() != kind || timer.state() == TimerState::Completed {
                timer = universe.config().timer(kind);
            }
            handle_event(&mut universe, timer.start())?;
            print_status(&timer)?;
        }
        TimerAction::Pause => {
            // completes instead when the countdown already ran out
            handle_event(&mut universe, timer.pause())?;
            print_status(&timer)?;
        }
        TimerAction::Status => {
            let completed = timer.tick();
            print_status(&timer)?;
            handle_event(&mut universe, completed)?;
        }
        TimerAction::Reset => {
            handle_event(&mut universe, timer.reset())?;
        }
    }

    universe
        .gateway_mut()
        .try_store_json(keys::TIMER_STATE, &timer)?;
    Ok(())
}
