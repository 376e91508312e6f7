//! Shell state machine tests with a manual timer and a recording canvas

use std::path::Path;
use std::time::Duration;

use nesticle::controller::Key;
use nesticle::testing::{EngineEvent, EngineProbe, ManualTimer, RecordingSink, Script, ScriptedLoader};
use nesticle::{FrontendError, Phase, Shell, Status, TICK_INTERVAL};

type TestShell = Shell<ScriptedLoader, RecordingSink, ManualTimer>;

fn shell_with(script: Script) -> (TestShell, EngineProbe) {
    let loader = ScriptedLoader::new(script).reject("broken.nes");
    let probe = loader.probe();
    (Shell::new(loader, RecordingSink::new(), ManualTimer::new()), probe)
}

fn loaded_shell(script: Script) -> (TestShell, EngineProbe) {
    let (mut shell, probe) = shell_with(script);
    shell.load_rom(Path::new("roms/game.nes")).unwrap();
    (shell, probe)
}

/// Fire the pending timer up to `n` times, ticking each time it was armed.
fn run_ticks(shell: &mut TestShell, n: usize) -> usize {
    let mut fired = 0;
    for _ in 0..n {
        if !shell.timer_mut().fire() {
            break;
        }
        shell.tick();
        fired += 1;
    }
    fired
}

#[test]
fn test_initial_state() {
    let (shell, probe) = shell_with(Script::default());

    assert_eq!(shell.phase(), Phase::NoRom);
    assert_eq!(shell.status().to_string(), "No ROM loaded");
    assert_eq!(shell.run_label(), "Start");
    assert!(!shell.controls_enabled());
    assert!(probe.events().is_empty());
}

#[test]
fn test_load_paints_first_frame() {
    let (shell, _) = loaded_shell(Script::default());

    assert_eq!(shell.phase(), Phase::Paused);
    assert_eq!(shell.status(), &Status::Loaded("game.nes".into()));
    assert_eq!(shell.status().to_string(), "Loaded: game.nes");
    assert!(shell.controls_enabled());
    assert_eq!(shell.sink().paints(), 1);
    assert_eq!(shell.timer().pending(), None);
}

#[test]
fn test_load_failure_stays_without_rom() {
    let (mut shell, probe) = shell_with(Script::default());
    let err = shell.load_rom(Path::new("broken.nes")).unwrap_err();

    assert!(matches!(err, FrontendError::EngineInitFailed { .. }));
    assert_eq!(shell.phase(), Phase::NoRom);
    assert_eq!(shell.status().to_string(), "Load failed");
    assert!(!shell.controls_enabled());
    assert_eq!(shell.last_error(), Some(&err));
    assert_eq!(probe.steps(), 0);
}

#[test]
fn test_start_schedules_immediate_tick() {
    let (mut shell, _) = loaded_shell(Script::default());
    shell.toggle_run();

    assert_eq!(shell.phase(), Phase::Running);
    assert_eq!(shell.status().to_string(), "Running");
    assert_eq!(shell.run_label(), "Pause");
    assert_eq!(shell.timer().pending(), Some(Duration::ZERO));
}

#[test]
fn test_ten_ticks_ten_steps_ten_paints() {
    let (mut shell, probe) = loaded_shell(Script::default());
    let paints_after_load = shell.sink().paints();

    shell.start();
    assert_eq!(run_ticks(&mut shell, 10), 10);

    assert_eq!(probe.steps(), 10);
    assert_eq!(shell.sink().paints() - paints_after_load, 10);
    assert_eq!(shell.sink().failures(), 0);
    assert!(shell.last_error().is_none());
    assert_eq!(shell.phase(), Phase::Running);
    assert_eq!(shell.timer().pending(), Some(TICK_INTERVAL));
    assert_eq!(shell.sink().last_frame().map(|f| f[0]), Some(10));
}

#[test]
fn test_start_then_pause_steps_nothing() {
    let (mut shell, probe) = loaded_shell(Script::default());
    shell.toggle_run();
    shell.toggle_run();

    assert_eq!(shell.phase(), Phase::Paused);
    assert_eq!(shell.status().to_string(), "Paused");
    assert_eq!(shell.run_label(), "Start");
    assert!(!shell.timer_mut().fire());

    // A stray tick while paused is ignored.
    shell.tick();
    assert_eq!(probe.steps(), 0);

    shell.toggle_run();
    assert_eq!(run_ticks(&mut shell, 1), 1);
    assert_eq!(probe.steps(), 1);
}

#[test]
fn test_pause_mid_run_stops_stepping() {
    let (mut shell, probe) = loaded_shell(Script::default());
    shell.start();
    run_ticks(&mut shell, 3);
    shell.pause();

    assert_eq!(run_ticks(&mut shell, 5), 0);
    assert_eq!(probe.steps(), 3);
}

#[test]
fn test_step_failure_ends_in_game_over() {
    let script = Script {
        fail_from_step: Some(3),
        ..Script::default()
    };
    let (mut shell, probe) = loaded_shell(script);
    let paints_after_load = shell.sink().paints();

    shell.start();
    assert_eq!(run_ticks(&mut shell, 10), 3);

    assert_eq!(shell.sink().paints() - paints_after_load, 2);
    assert_eq!(probe.steps(), 3);
    assert_eq!(shell.phase(), Phase::Paused);
    assert_eq!(shell.status().to_string(), "Game Over");
    assert_eq!(shell.run_label(), "Start");
    assert_eq!(shell.last_error(), Some(&FrontendError::FrameStepFailed));
    assert!(!shell.timer_mut().fire());

    // The session stays open; Start steps again.
    assert!(shell.system().map_or(false, |s| s.is_open()));
    shell.start();
    run_ticks(&mut shell, 1);
    assert_eq!(probe.steps(), 4);
}

#[test]
fn test_null_frame_is_frame_error() {
    let script = Script {
        null_from_step: Some(2),
        ..Script::default()
    };
    let (mut shell, probe) = loaded_shell(script);
    shell.start();
    assert_eq!(run_ticks(&mut shell, 10), 2);

    assert_eq!(probe.steps(), 2);
    assert_eq!(shell.phase(), Phase::Paused);
    assert_eq!(shell.status().to_string(), "Frame error");
    assert_eq!(shell.run_label(), "Start");
    assert_eq!(shell.last_error(), Some(&FrontendError::FrameNullUnexpected));
    assert_eq!(probe.closes(), 0);

    shell.toggle_run();
    assert_eq!(shell.phase(), Phase::Running);
}

#[test]
fn test_render_failure_keeps_loop_running() {
    let script = Script {
        frame_len: Some(16),
        ..Script::default()
    };
    let (mut shell, probe) = loaded_shell(script);
    shell.start();
    assert_eq!(run_ticks(&mut shell, 4), 4);

    assert_eq!(probe.steps(), 4);
    assert_eq!(shell.sink().paints(), 0);
    // load paint plus one per tick
    assert_eq!(shell.sink().failures(), 5);
    assert_eq!(shell.phase(), Phase::Running);
    assert!(matches!(shell.last_error(), Some(FrontendError::RenderFailed(_))));
}

#[test]
fn test_reset_while_running() {
    let (mut shell, probe) = loaded_shell(Script::default());
    shell.start();
    run_ticks(&mut shell, 2);
    let paints = shell.sink().paints();

    shell.reset();

    assert_eq!(shell.phase(), Phase::Paused);
    assert_eq!(shell.status().to_string(), "Reset");
    assert_eq!(shell.run_label(), "Start");
    assert_eq!(probe.resets(), 2);
    assert_eq!(shell.sink().paints(), paints + 1);
    assert!(!shell.timer_mut().fire());
    assert_eq!(probe.steps(), 2);
}

#[test]
fn test_reset_without_rom_is_ignored() {
    let (mut shell, probe) = shell_with(Script::default());
    shell.reset();
    shell.toggle_run();
    shell.tick();

    assert_eq!(shell.phase(), Phase::NoRom);
    assert_eq!(shell.status().to_string(), "No ROM loaded");
    assert!(probe.events().is_empty());
}

#[test]
fn test_second_load_closes_first_once() {
    let (mut shell, probe) = loaded_shell(Script::default());
    shell.start();
    run_ticks(&mut shell, 1);
    shell.load_rom(Path::new("roms/other.nes")).unwrap();

    let first = Path::new("roms/game.nes").to_path_buf();
    let second = Path::new("roms/other.nes").to_path_buf();
    let events = probe.events();
    let closes_of_first = events
        .iter()
        .filter(|e| **e == EngineEvent::Close(first.clone()))
        .count();
    let close_at = events
        .iter()
        .position(|e| *e == EngineEvent::Close(first.clone()))
        .unwrap();
    let open_at = events
        .iter()
        .position(|e| *e == EngineEvent::Open(second.clone()))
        .unwrap();

    assert_eq!(closes_of_first, 1);
    assert!(close_at < open_at);
    assert_eq!(shell.phase(), Phase::Paused);
    assert_eq!(shell.status().to_string(), "Loaded: other.nes");
    assert!(!shell.timer_mut().fire());
}

#[test]
fn test_failed_second_load_drops_first() {
    let (mut shell, probe) = loaded_shell(Script::default());
    assert!(shell.load_rom(Path::new("broken.nes")).is_err());

    assert_eq!(probe.closes(), 1);
    assert_eq!(shell.phase(), Phase::NoRom);
    assert!(!shell.controls_enabled());
    assert_eq!(shell.status().to_string(), "Load failed");
}

#[test]
fn test_keys_feed_next_step() {
    let (mut shell, probe) = loaded_shell(Script::default());
    shell.start();

    shell.key_down(Key::Right);
    shell.key_down(Key::Char('z'));
    run_ticks(&mut shell, 1);

    shell.key_up(Key::Right);
    shell.key_down(Key::Char('a'));
    run_ticks(&mut shell, 1);

    shell.key_up(Key::Char('z'));
    run_ticks(&mut shell, 1);

    assert_eq!(probe.step_inputs(), vec![0x81, 0x80, 0x00]);
    assert_eq!(shell.controller().bitmask(), 0);
}

#[test]
fn test_shutdown_releases_everything() {
    let (mut shell, probe) = loaded_shell(Script::default());
    shell.start();
    run_ticks(&mut shell, 1);

    shell.shutdown();
    shell.shutdown();

    assert_eq!(shell.phase(), Phase::Terminated);
    assert_eq!(probe.closes(), 1);
    assert!(!shell.timer_mut().fire());

    shell.toggle_run();
    shell.tick();
    assert!(shell.load_rom(Path::new("roms/late.nes")).is_ok());
    assert_eq!(probe.steps(), 1);
    assert!(!probe.events().contains(&EngineEvent::Open("roms/late.nes".into())));
}

#[test]
fn test_ticks_reschedule_at_fixed_interval() {
    let (mut shell, _) = loaded_shell(Script::default());
    shell.start();
    run_ticks(&mut shell, 3);

    assert_eq!(
        shell.timer().scheduled(),
        &[Duration::ZERO, TICK_INTERVAL, TICK_INTERVAL, TICK_INTERVAL]
    );
}
