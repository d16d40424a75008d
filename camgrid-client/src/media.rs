//
// LocalMedia holds the authoritative enabled/disabled state for the local
// capture tracks, plus the camera roster and the bookkeeping for in-flight
// camera switches. Actual device acquisition happens in the external capture
// layer; this module only decides and fences.
//

use serde::{Deserialize, Serialize};

/// A camera-switch request handed to the capture layer.
///
/// The generation fences the asynchronous completion: only the completion
/// carrying the latest issued generation is honored, anything older is a
/// stale leftover of a superseded request and gets dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSwitch {
    pub device_id: String,
    pub generation: u64,
}

/// How a reported camera-switch completion resolved against the fence.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SwitchResolution {
    /// Generation mismatch; a newer request superseded this one.
    Stale,
    /// The switch to this device succeeded.
    Switched(String),
    /// The current request failed; local video should degrade to off.
    Failed,
}

#[derive(Debug)]
pub(crate) struct LocalMedia {
    audio_enabled: bool,
    video_enabled: bool,
    devices: Vec<String>,
    selected: Option<String>,
    next_generation: u64,
    pending: Option<(u64, String)>,
}

impl LocalMedia {
    pub(crate) fn new() -> Self {
        Self {
            audio_enabled: true,
            video_enabled: true,
            devices: Vec::new(),
            selected: None,
            next_generation: 1,
            pending: None,
        }
    }

    pub(crate) fn toggle_audio(&mut self) -> bool {
        self.audio_enabled = !self.audio_enabled;
        self.audio_enabled
    }

    pub(crate) fn is_audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    pub(crate) fn toggle_video(&mut self) -> bool {
        self.video_enabled = !self.video_enabled;
        self.video_enabled
    }

    pub(crate) fn disable_video(&mut self) {
        self.video_enabled = false;
    }

    pub(crate) fn is_video_enabled(&self) -> bool {
        self.video_enabled
    }

    /// Replaces the camera roster with a fresh enumeration result. The
    /// current selection survives when the device is still present; otherwise
    /// selection falls back to the first device.
    pub(crate) fn set_devices(&mut self, devices: Vec<String>) {
        let keep = self
            .selected
            .as_ref()
            .is_some_and(|id| devices.contains(id));
        if !keep {
            self.selected = devices.first().cloned();
        }
        self.devices = devices;
    }

    pub(crate) fn selected_device(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// A camera-switch control is only offered with at least two known
    /// devices and no switch already in flight.
    pub(crate) fn can_cycle(&self) -> bool {
        self.devices.len() > 1 && self.pending.is_none()
    }

    /// Picks the next camera round-robin and opens a fenced request for it.
    /// The selection only moves once the completion confirms the switch.
    pub(crate) fn cycle(&mut self) -> Option<CameraSwitch> {
        if !self.can_cycle() {
            return None;
        }
        let current = self
            .selected
            .as_ref()
            .and_then(|id| self.devices.iter().position(|d| d == id))
            .unwrap_or(0);
        let target = self.devices[(current + 1) % self.devices.len()].clone();

        let generation = self.next_generation;
        self.next_generation += 1;
        self.pending = Some((generation, target.clone()));
        Some(CameraSwitch {
            device_id: target,
            generation,
        })
    }

    pub(crate) fn complete_switch(&mut self, generation: u64, success: bool) -> SwitchResolution {
        match self.pending.take() {
            Some((pending_generation, device)) if pending_generation == generation => {
                if success {
                    self.selected = Some(device.clone());
                    SwitchResolution::Switched(device)
                } else {
                    SwitchResolution::Failed
                }
            }
            other => {
                // Not ours: put a still-live request back and drop the stray.
                self.pending = other;
                SwitchResolution::Stale
            }
        }
    }
}
