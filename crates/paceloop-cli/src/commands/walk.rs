use clap::Subcommand;
use paceloop_core::storage::Database;
use paceloop_core::{
    Config, CueDispatcher, CuePreference, Event, NoopWakeLock, Phase, ResourceGuard,
    SessionConfig, SessionController, SessionState,
};

use crate::term_cues::TerminalCueOutput;

const STATE_KEY: &str = "walk_state";
const ACTOR_KEY: &str = "actor_id";

#[derive(Subcommand)]
pub enum WalkAction {
    /// Start a walk session
    Start {
        /// Session length in minutes (15, 30, 45 or 60)
        #[arg(long)]
        minutes: Option<u32>,
        /// Cue mode for this session
        #[arg(long, value_parser = parse_cue)]
        cue: Option<CuePreference>,
    },
    /// Reconcile elapsed time and print the current state
    Status,
    /// Pause the active session
    Pause,
    /// Resume a paused session
    Resume,
    /// Stop the active session
    Stop,
    /// Run a session in the foreground with live cues
    Run {
        /// Session length in minutes (15, 30, 45 or 60)
        #[arg(long)]
        minutes: Option<u32>,
        /// Cue mode for this session
        #[arg(long, value_parser = parse_cue)]
        cue: Option<CuePreference>,
    },
}

fn parse_cue(value: &str) -> Result<CuePreference, String> {
    match value {
        "beep" => Ok(CuePreference::Beep),
        "voice" => Ok(CuePreference::Voice),
        _ => Err("expected 'beep' or 'voice'".to_string()),
    }
}

pub fn load_state(db: &Database) -> SessionState {
    match db.kv_get(STATE_KEY) {
        Ok(Some(json)) => parse_state(&json),
        Ok(None) => SessionState::default(),
        Err(e) => {
            log::warn!("could not read parked walk state, starting fresh: {e}");
            SessionState::default()
        }
    }
}

fn parse_state(json: &str) -> SessionState {
    serde_json::from_str(json).unwrap_or_else(|e| {
        log::warn!("discarding unreadable parked walk state: {e}");
        SessionState::default()
    })
}

fn save_state(db: &Database, state: &SessionState) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(state)?;
    db.kv_set(STATE_KEY, &json)?;
    Ok(())
}

/// The local actor identity, created on first use. Stands in for the
/// authentication collaborator: sessions are attributed to it.
fn actor_id(db: &Database) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(id) = db.kv_get(ACTOR_KEY)? {
        return Ok(id);
    }
    let id = uuid::Uuid::new_v4().to_string();
    db.kv_set(ACTOR_KEY, &id)?;
    Ok(id)
}

fn controller(
    state: SessionState,
    actor: String,
    store: Database,
    preference: CuePreference,
    haptics: bool,
) -> SessionController {
    SessionController::new(
        state,
        Some(actor),
        Box::new(store),
        CueDispatcher::new(preference, haptics, Box::new(TerminalCueOutput)),
        ResourceGuard::new(Box::new(NoopWakeLock)),
    )
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

/// Start a new walk, or wake a parked one so the foreground loop can
/// make progress. A paused timer never ticks, so a `Paused` session is
/// resumed here rather than left to spin the loop forever.
fn ensure_running(c: &mut SessionController, config: SessionConfig) -> Option<Event> {
    if let Some(event) = c.start_walk(config) {
        return Some(event);
    }
    if c.current_phase() == Phase::Paused {
        return c.pause_walk();
    }
    None
}

pub fn run(action: WalkAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    // Second connection, moved into the controller as the session store.
    let store = Database::open()?;
    let state = load_state(&db);
    let actor = actor_id(&db)?;

    match action {
        WalkAction::Start { minutes, cue } => {
            let session_config = Config::load()?.session_config(minutes, cue)?;
            let mut c = controller(
                state,
                actor,
                store,
                session_config.cue_preference,
                session_config.haptics,
            );
            match c.start_walk(session_config) {
                Some(event) => print_event(&event)?,
                None => println!("a walk is already active; stop it first"),
            }
            save_state(&db, c.state())?;
        }
        WalkAction::Status => {
            let preference = state.config.cue_preference;
            let haptics = state.config.haptics;
            let mut c = controller(state, actor, store, preference, haptics);
            // Arbitrary time may have passed since the last invocation;
            // this replays every missed second before reporting.
            for event in c.poll() {
                print_event(&event)?;
            }
            print_event(&c.snapshot())?;
            save_state(&db, c.state())?;
        }
        WalkAction::Pause => {
            let preference = state.config.cue_preference;
            let haptics = state.config.haptics;
            let mut c = controller(state, actor, store, preference, haptics);
            for event in c.poll() {
                print_event(&event)?;
            }
            match c.current_phase() {
                Phase::Fast | Phase::Slow => {
                    if let Some(event) = c.pause_walk() {
                        print_event(&event)?;
                    }
                }
                Phase::Paused => println!("walk is already paused"),
                Phase::Stopped => println!("no active walk"),
            }
            save_state(&db, c.state())?;
        }
        WalkAction::Resume => {
            let preference = state.config.cue_preference;
            let haptics = state.config.haptics;
            let mut c = controller(state, actor, store, preference, haptics);
            if c.current_phase() == Phase::Paused {
                if let Some(event) = c.pause_walk() {
                    print_event(&event)?;
                }
            } else {
                println!("no paused walk to resume");
            }
            save_state(&db, c.state())?;
        }
        WalkAction::Stop => {
            let preference = state.config.cue_preference;
            let haptics = state.config.haptics;
            let mut c = controller(state, actor, store, preference, haptics);
            let events = c.poll();
            for event in &events {
                print_event(event)?;
            }
            match c.stop_walk() {
                Some(event) => print_event(&event)?,
                // The poll above may already have completed the session.
                None if events.is_empty() => println!("no active walk"),
                None => {}
            }
            save_state(&db, c.state())?;
        }
        WalkAction::Run { minutes, cue } => {
            let session_config = Config::load()?.session_config(minutes, cue)?;
            let mut c = controller(
                state,
                actor,
                store,
                session_config.cue_preference,
                session_config.haptics,
            );
            match ensure_running(&mut c, session_config) {
                Some(event) => print_event(&event)?,
                None => println!("resuming the already-active walk"),
            }
            // Park the state immediately so an interrupted run can be
            // picked up by `walk status`.
            save_state(&db, c.state())?;
            while c.is_active() {
                std::thread::sleep(std::time::Duration::from_millis(250));
                for event in c.poll() {
                    print_event(&event)?;
                }
            }
            print_event(&c.snapshot())?;
            save_state(&db, c.state())?;
        }
    }

    Ok(())
}
