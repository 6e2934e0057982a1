//! Cache lifecycle state machine.
//!
//! ```text
//! Uninitialized ──install──▶ Installing ──finish──▶ Installed ──activate──▶ Purging ──claim──▶ Active(g)
//!        ▲                      │                                                              │
//!        └────────abort─────────┘◀───────────────────────install(g+1)─────────────────────────┘
//! ```
//!
//! An aborted installation falls back to whatever was active before it. Only
//! a finished installation can be activated.

use crate::error::{ErrorKind, Result};
use crate::generation::Generation;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    /// `pending` is being populated; requests are still served from `active`.
    Installing { pending: Generation, active: Option<Generation> },
    /// `pending` is complete and waiting for activation.
    Installed { pending: Generation, active: Option<Generation> },
    /// Stale generations are being deleted. `generation` is already the one
    /// requests are served from.
    Purging { generation: Generation },
    Active(Generation),
}
impl Lifecycle {
    /// The generation requests are served from and stored under.
    pub fn current(&self) -> Option<&Generation> {
        match self {
            Self::Uninitialized => None,
            Self::Installing { active, .. } | Self::Installed { active, .. } => active.as_ref(),
            Self::Purging { generation } => Some(generation),
            Self::Active(generation) => Some(generation),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Installing { .. } => "installing",
            Self::Installed { .. } => "installed",
            Self::Purging { .. } => "purging",
            Self::Active(_) => "active",
        }
    }

    pub(crate) fn install(&self, pending: Generation) -> Result<Self> {
        match self {
            Self::Uninitialized => Ok(Self::Installing { pending, active: None }),
            Self::Active(active) if *active == pending => exn::bail!(ErrorKind::AlreadyActive(pending.to_string())),
            Self::Active(active) => Ok(Self::Installing { pending, active: Some(active.clone()) }),
            // A newer installation replaces one still waiting for activation.
            Self::Installed { active, .. } => Ok(Self::Installing { pending, active: active.clone() }),
            Self::Installing { .. } | Self::Purging { .. } => exn::bail!(ErrorKind::Busy(self.name().to_string())),
        }
    }

    /// Every resource of `pending` is stored.
    pub(crate) fn finish(&self) -> Result<Self> {
        match self {
            Self::Installing { pending, active } => {
                Ok(Self::Installed { pending: pending.clone(), active: active.clone() })
            },
            _ => exn::bail!(ErrorKind::NothingToActivate),
        }
    }

    /// Abandon an installation, restoring the previously active generation.
    pub(crate) fn abort(&self) -> Self {
        match self {
            Self::Installing { active: Some(active), .. } => Self::Active(active.clone()),
            Self::Installing { active: None, .. } => Self::Uninitialized,
            other => other.clone(),
        }
    }

    pub(crate) fn purge(&self) -> Result<Self> {
        match self {
            Self::Installed { pending, .. } => Ok(Self::Purging { generation: pending.clone() }),
            Self::Installing { .. } | Self::Purging { .. } => exn::bail!(ErrorKind::Busy(self.name().to_string())),
            Self::Uninitialized | Self::Active(_) => exn::bail!(ErrorKind::NothingToActivate),
        }
    }

    pub(crate) fn claim(&self) -> Result<Self> {
        match self {
            Self::Purging { generation } => Ok(Self::Active(generation.clone())),
            _ => exn::bail!(ErrorKind::NothingToActivate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generation(version: u32) -> Generation {
        Generation::new("cardscan", version).unwrap()
    }

    #[test]
    fn first_install_to_active() {
        let installing = Lifecycle::Uninitialized.install(generation(1)).unwrap();
        assert_eq!(installing.current(), None);
        let installed = installing.finish().unwrap();
        assert_eq!(installed.current(), None);
        let purging = installed.purge().unwrap();
        assert_eq!(purging.current(), Some(&generation(1)));
        let active = purging.claim().unwrap();
        assert_eq!(active, Lifecycle::Active(generation(1)));
    }

    #[test]
    fn upgrade_keeps_serving_old_generation_until_activation() {
        let installing = Lifecycle::Active(generation(1)).install(generation(2)).unwrap();
        assert_eq!(installing.current(), Some(&generation(1)));
        let installed = installing.finish().unwrap();
        assert_eq!(installed.current(), Some(&generation(1)));
        assert_eq!(installed.purge().unwrap().current(), Some(&generation(2)));
    }

    #[test]
    fn unfinished_installation_cannot_be_activated() {
        let installing = Lifecycle::Active(generation(1)).install(generation(2)).unwrap();
        assert_eq!(*installing.purge().unwrap_err(), ErrorKind::Busy("installing".to_string()));
    }

    #[test]
    fn newer_installation_replaces_a_waiting_one() {
        let installed = Lifecycle::Active(generation(1)).install(generation(2)).unwrap().finish().unwrap();
        let installing = installed.install(generation(3)).unwrap();
        assert_eq!(installing, Lifecycle::Installing { pending: generation(3), active: Some(generation(1)) });
        assert_eq!(installing.abort(), Lifecycle::Active(generation(1)));
    }

    #[test]
    fn abort_restores_previous_state() {
        let from_active = Lifecycle::Active(generation(1)).install(generation(2)).unwrap();
        assert_eq!(from_active.abort(), Lifecycle::Active(generation(1)));
        let from_nothing = Lifecycle::Uninitialized.install(generation(1)).unwrap();
        assert_eq!(from_nothing.abort(), Lifecycle::Uninitialized);
    }

    #[test]
    fn overlapping_installs_are_rejected() {
        let installing = Lifecycle::Uninitialized.install(generation(1)).unwrap();
        let err = installing.install(generation(2)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Busy(_)));
    }

    #[test]
    fn reinstalling_the_active_generation_is_rejected() {
        let err = Lifecycle::Active(generation(1)).install(generation(1)).unwrap_err();
        assert_eq!(*err, ErrorKind::AlreadyActive("cardscan-v1".to_string()));
    }

    #[test]
    fn activation_requires_an_installation() {
        assert_eq!(*Lifecycle::Uninitialized.purge().unwrap_err(), ErrorKind::NothingToActivate);
        assert_eq!(*Lifecycle::Active(generation(1)).purge().unwrap_err(), ErrorKind::NothingToActivate);
        assert_eq!(*Lifecycle::Active(generation(1)).claim().unwrap_err(), ErrorKind::NothingToActivate);
    }
}
