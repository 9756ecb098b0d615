//! Module to drive the external media player process

use std::{
    io::Write,
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{config::PlayerConfig, playback::error::PlayerError};

/// Fire-and-forget commands understood by the media player
pub trait Player: Send {
    fn load(&mut self, url: &str) -> Result<(), PlayerError>;
    fn pause(&mut self) -> Result<(), PlayerError>;
    fn stop(&mut self) -> Result<(), PlayerError>;
}

/// mplayer running in slave mode, fed commands line by line on stdin
pub struct MplayerProcess {
    config: PlayerConfig,
    child: Option<(Child, ChildStdin)>,
}

impl MplayerProcess {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            child: None,
        }
    }

    /// (re)spawns the process if it is not running
    fn stdin(&mut self) -> Result<&mut ChildStdin, PlayerError> {
        let exited = match &mut self.child {
            Some((child, _)) => child.try_wait()?.is_some(),
            None => true,
        };

        if exited {
            log::info!(
                "starting player: {} {}",
                self.config.command,
                self.config.args.join(" ")
            );
            let mut child = Command::new(&self.config.command)
                .args(&self.config.args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()?;
            let stdin = child.stdin.take().ok_or(PlayerError::NoInput)?;
            self.child = Some((child, stdin));
        }

        match &mut self.child {
            Some((_, stdin)) => Ok(stdin),
            None => Err(PlayerError::NoInput),
        }
    }

    /// Writes one command line. Commands are line based and quote their
    /// arguments, so line breaks or quotes inside a command are rejected.
    fn send(&mut self, command: &str) -> Result<(), PlayerError> {
        if command.contains(['\n', '\r']) {
            return Err(PlayerError::UnsafeCommand(command.to_string()));
        }
        log::debug!("player <- {command}");
        let stdin = self.stdin()?;
        writeln!(stdin, "{command}")?;
        stdin.flush()?;
        Ok(())
    }
}

impl Player for MplayerProcess {
    fn load(&mut self, url: &str) -> Result<(), PlayerError> {
        if url.contains('"') {
            return Err(PlayerError::UnsafeCommand(url.to_string()));
        }
        self.send(&format!("loadfile \"{url}\""))?;

        // some platforms start the new file paused
        if self.config.unpause_after_load {
            self.pause()?;
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlayerError> {
        self.send("pause")
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        // nothing to stop if the process never started
        if self.child.is_none() {
            return Ok(());
        }
        self.send("stop")
    }
}

impl Drop for MplayerProcess {
    fn drop(&mut self) {
        if let Some((mut child, _)) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PlayerCall {
        Load(String),
        Pause,
        Stop,
    }

    /// Player double that records every call and can be told to fail loads
    #[derive(Clone, Default)]
    pub struct RecordingPlayer {
        pub calls: Arc<Mutex<Vec<PlayerCall>>>,
        pub fail_loads: Arc<Mutex<bool>>,
    }

    impl RecordingPlayer {
        pub fn calls(&self) -> Vec<PlayerCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn set_fail_loads(&self, fail: bool) {
            *self.fail_loads.lock().unwrap() = fail;
        }
    }

    impl Player for RecordingPlayer {
        fn load(&mut self, url: &str) -> Result<(), PlayerError> {
            if *self.fail_loads.lock().unwrap() {
                return Err(PlayerError::NoInput);
            }
            self.calls
                .lock()
                .unwrap()
                .push(PlayerCall::Load(url.to_string()));
            Ok(())
        }

        fn pause(&mut self) -> Result<(), PlayerError> {
            self.calls.lock().unwrap().push(PlayerCall::Pause);
            Ok(())
        }

        fn stop(&mut self) -> Result<(), PlayerError> {
            self.calls.lock().unwrap().push(PlayerCall::Stop);
            Ok(())
        }
    }
}
