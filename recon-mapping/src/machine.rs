use crate::aggregator::FinalConfiguration;
use recon_core::{CoreError, CoreResult};
use serde::Serialize;

/// Export lifecycle phases.
///
/// `Idle → Generating → Generated → Sending → (Sent | Failed)`; a failed
/// send drops back to `Generated` for a manual retry, and a fresh generate
/// overwrites whatever was generated before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportPhase {
    Idle,
    Generating,
    Generated,
    Sending,
    Sent,
    Failed,
}

/// Owns the current phase and the last generated configuration, guarding
/// every transition.
#[derive(Debug, Default)]
pub struct ExportMachine {
    phase: ExportPhase,
    config: Option<FinalConfiguration>,
}

impl Default for ExportPhase {
    fn default() -> Self {
        ExportPhase::Idle
    }
}

impl ExportMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    pub fn configuration(&self) -> Option<&FinalConfiguration> {
        self.config.as_ref()
    }

    /// Start a generate pass. Allowed from any settled phase; rejected while
    /// a generate or send is in flight.
    pub fn begin_generate(&mut self) -> CoreResult<()> {
        match self.phase {
            ExportPhase::Idle | ExportPhase::Generated | ExportPhase::Sent | ExportPhase::Failed => {
                self.phase = ExportPhase::Generating;
                Ok(())
            }
            other => Err(invalid(other, ExportPhase::Generating)),
        }
    }

    /// Generating → Generated, storing the new configuration (overwrites).
    pub fn finish_generate(&mut self, config: FinalConfiguration) -> CoreResult<()> {
        if self.phase != ExportPhase::Generating {
            return Err(invalid(self.phase, ExportPhase::Generated));
        }
        self.config = Some(config);
        self.phase = ExportPhase::Generated;
        Ok(())
    }

    /// A failed generate settles back on whatever was there before.
    pub fn abort_generate(&mut self) {
        if self.phase == ExportPhase::Generating {
            self.phase = if self.config.is_some() {
                ExportPhase::Generated
            } else {
                ExportPhase::Idle
            };
        }
    }

    /// Generated (or Failed, for a retry from the top) → Sending. Requires a
    /// generated configuration.
    pub fn begin_send(&mut self) -> CoreResult<&FinalConfiguration> {
        match self.phase {
            ExportPhase::Generated | ExportPhase::Failed => {
                if self.config.is_none() {
                    return Err(CoreError::InternalError(
                        "sending with no generated configuration".into(),
                    ));
                }
                self.phase = ExportPhase::Sending;
                Ok(self.config.as_ref().unwrap())
            }
            other => Err(invalid(other, ExportPhase::Sending)),
        }
    }

    /// Sending → Sent.
    pub fn finish_send(&mut self) -> CoreResult<()> {
        if self.phase != ExportPhase::Sending {
            return Err(invalid(self.phase, ExportPhase::Sent));
        }
        self.phase = ExportPhase::Sent;
        Ok(())
    }

    /// Sending → Failed. The configuration is kept for the retry.
    pub fn fail_send(&mut self) -> CoreResult<()> {
        if self.phase != ExportPhase::Sending {
            return Err(invalid(self.phase, ExportPhase::Failed));
        }
        self.phase = ExportPhase::Failed;
        Ok(())
    }
}

fn invalid(from: ExportPhase, to: ExportPhase) -> CoreError {
    CoreError::InvalidTransition {
        from: format!("{:?}", from),
        to: format!("{:?}", to),
    }
}
