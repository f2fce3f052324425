//! PdInstance - thin wrapper over a libpd-rs instance
//!
//! Owns the libpd handle and exposes the handful of operations the editor
//! needs: open a patch, send messages, access arrays and pump the message
//! queue so receive hooks fire.

use std::path::Path;
use std::sync::Once;

use libpd_rs::functions::receive::on_print;
use libpd_rs::functions::verbose_print_state;
use libpd_rs::functions::{array, receive, send};
use libpd_rs::types::Atom;
use libpd_rs::Pd;

use super::error::{PdError, PdResult};

static PRINT_HOOK_INIT: Once = Once::new();

/// Route Pd console output into the log, once per process
fn init_print_hook() {
    PRINT_HOOK_INIT.call_once(|| {
        verbose_print_state(true);

        on_print(|msg: &str| {
            let msg = msg.trim();
            if msg.is_empty() {
                return;
            }

            if msg.contains("error") || msg.contains("can't") || msg.contains("couldn't") {
                log::error!("[PD] {}", msg);
            } else if msg.contains("warning") || msg.contains("deprecated") {
                log::warn!("[PD] {}", msg);
            } else {
                log::info!("[PD] {}", msg);
            }
        });

        log::debug!("PD print hook initialized");
    });
}

fn to_atoms(values: &[f32]) -> Vec<Atom> {
    values.iter().map(|&v| Atom::from(f64::from(v))).collect()
}

/// A running libpd instance with at most one open patch
pub struct PdInstance {
    pd: Pd,
    sample_rate: i32,
    audio_active: bool,
    /// `$0` of the open patch
    dollar_zero: Option<i32>,
}

impl PdInstance {
    pub fn new(sample_rate: i32) -> PdResult<Self> {
        init_print_hook();

        let pd = Pd::init_and_configure(0, 2, sample_rate)
            .map_err(|e| PdError::InitializationFailed(format!("libpd init failed: {}", e)))?;

        log::info!("PdInstance created @ {}Hz", sample_rate);

        Ok(Self {
            pd,
            sample_rate,
            audio_active: false,
            dollar_zero: None,
        })
    }

    pub fn add_search_path(&mut self, path: &Path) -> PdResult<()> {
        self.pd.add_path_to_search_paths(path).map_err(|e| {
            PdError::InitializationFailed(format!("Failed to add search path: {}", e))
        })?;
        log::debug!("Added PD search path: {}", path.display());
        Ok(())
    }

    /// Open a patch, returning its `$0`
    pub fn open_patch(&mut self, path: &Path) -> PdResult<i32> {
        if !path.exists() {
            return Err(PdError::PatchNotFound(path.to_path_buf()));
        }

        self.pd.open_patch(path).map_err(|e| PdError::PatchOpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let dollar_zero = self.pd.dollar_zero().map_err(|e| PdError::PatchOpenFailed {
            path: path.to_path_buf(),
            reason: format!("Failed to get $0: {}", e),
        })?;
        self.dollar_zero = Some(dollar_zero);

        log::info!("Opened PD patch: {} ($0={})", path.display(), dollar_zero);
        Ok(dollar_zero)
    }

    pub fn dollar_zero(&self) -> Option<i32> {
        self.dollar_zero
    }

    pub fn set_audio_active(&mut self, active: bool) -> PdResult<()> {
        self.pd.activate_audio(active).map_err(|e| {
            PdError::InitializationFailed(format!("Failed to set audio active: {}", e))
        })?;
        self.audio_active = active;
        Ok(())
    }

    pub fn sample_rate(&self) -> i32 {
        self.sample_rate
    }

    pub fn send_float(&self, receiver: &str, value: f32) -> PdResult<()> {
        self.pd.set_as_current();
        send::send_float_to(receiver, value.into()).map_err(|e| PdError::SendFailed {
            msg_type: "float",
            receiver: receiver.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn send_bang(&self, receiver: &str) -> PdResult<()> {
        self.pd.set_as_current();
        send::send_bang_to(receiver).map_err(|e| PdError::SendFailed {
            msg_type: "bang",
            receiver: receiver.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn send_list(&self, receiver: &str, values: &[f32]) -> PdResult<()> {
        self.pd.set_as_current();
        send::send_list_to(receiver, &to_atoms(values)).map_err(|e| PdError::SendFailed {
            msg_type: "list",
            receiver: receiver.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn send_message(&self, receiver: &str, selector: &str, args: &[Atom]) -> PdResult<()> {
        self.pd.set_as_current();
        send::send_message_to(receiver, selector, args).map_err(|e| PdError::SendFailed {
            msg_type: "message",
            receiver: receiver.to_string(),
            reason: e.to_string(),
        })
    }

    /// Send a float-only message
    pub fn send_float_message(&self, receiver: &str, selector: &str, args: &[f32]) -> PdResult<()> {
        self.send_message(receiver, selector, &to_atoms(args))
    }

    /// Subscribe to a send symbol so receive hooks see its traffic
    pub fn listen(&self, receiver: &str) -> PdResult<()> {
        self.pd.set_as_current();
        receive::start_listening_from(receiver)
            .map(|_| ())
            .map_err(|e| PdError::ListenFailed {
                receiver: receiver.to_string(),
                reason: e.to_string(),
            })
    }

    /// Deliver queued messages to the registered receive hooks
    pub fn poll(&self) {
        self.pd.set_as_current();
        receive::receive_messages_from_pd();
    }

    pub fn array_len(&self, name: &str) -> PdResult<usize> {
        self.pd.set_as_current();
        let size = array::array_size(name).map_err(|e| PdError::ArrayAccess {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(usize::try_from(size).unwrap_or(0))
    }

    pub fn read_array(&self, name: &str) -> PdResult<Vec<f32>> {
        let len = self.array_len(name)?;
        let mut buffer = vec![Default::default(); len];
        array::read_float_array_from(name, 0, &mut buffer, len as i32).map_err(|e| {
            PdError::ArrayAccess {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(buffer.into_iter().map(|v| f64::from(v) as f32).collect())
    }

    pub fn write_array(&self, name: &str, offset: usize, values: &[f32]) -> PdResult<()> {
        self.pd.set_as_current();
        let source: Vec<_> = values.iter().map(|&v| v.into()).collect();
        array::write_float_array_to(name, offset as i32, &source, source.len() as i32).map_err(
            |e| PdError::ArrayAccess {
                name: name.to_string(),
                reason: e.to_string(),
            },
        )
    }
}

impl Drop for PdInstance {
    fn drop(&mut self) {
        if self.audio_active {
            let _ = self.set_audio_active(false);
        }
        if self.dollar_zero.is_some() {
            let _ = self.pd.close_patch();
        }
        log::debug!("PdInstance dropped");
    }
}
