//! Lava Quest headless entry point
//!
//! Plays one scripted event at a fixed tick and logs the HUD as it changes.
//!
//! Usage: `lava-quest [tuning.json] [seed]`

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use lava_quest::consts::{MAX_SUBSTEPS, SIM_DT};
use lava_quest::hud::LogHud;
use lava_quest::{EventSession, MockSessionProvider, SessionInput, SessionPhase, Tuning};

/// Simulated presentation frame (30 Hz, two simulation steps each)
const FRAME_DT: f32 = 1.0 / 30.0;
/// Give up after this much simulated time
const MAX_SECONDS: f32 = 600.0;
/// Chance the scripted player wins a mini-game
const WIN_CHANCE: f64 = 0.8;

fn main() {
    env_logger::init();
    log::info!("Lava Quest (headless) starting...");

    let mut args = std::env::args().skip(1);
    let mut tuning = match args.next() {
        Some(path) => match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };
    if let Some(seed) = args.next() {
        match seed.parse() {
            Ok(seed) => tuning.seed = seed,
            Err(e) => log::warn!("Ignoring seed {:?}: {}", seed, e),
        }
    }

    let mut player = Pcg32::seed_from_u64(tuning.seed ^ 0x5eed);
    let provider = MockSessionProvider::new(tuning.seed);
    let mut session = EventSession::new(tuning, provider, LogHud::default());

    let mut input = SessionInput {
        start_event: true,
        ..Default::default()
    };
    let mut accumulator = 0.0;
    let mut left_intro = false;

    while session.now() < MAX_SECONDS as f64 {
        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            session.tick(&input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
            // Clear one-shot inputs after processing
            input = SessionInput::default();
        }

        match session.phase() {
            SessionPhase::Intro if left_intro => break,
            SessionPhase::Intro => {}
            SessionPhase::Matchmaking => {
                left_intro = true;
                input.continue_pressed = session.is_continue_available();
            }
            SessionPhase::Map => input.play_pressed = session.is_play_enabled(),
            SessionPhase::MiniGame => {
                let won = player.random_bool(WIN_CHANCE);
                log::info!("Mini-game {}", if won { "won" } else { "lost" });
                input.game_result = Some(won);
            }
            SessionPhase::Reward => {
                if let Some(text) = session.reward().and_then(|r| r.sharing_text()) {
                    log::info!("{}", text);
                }
                input.collect_reward = true;
            }
        }
    }

    let hud = &session.hud().text;
    log::info!(
        "Finished after {:.1}s on step {} ({}, {})",
        session.now(),
        session.round().current_step_index(),
        hud.level,
        hud.players
    );
}
