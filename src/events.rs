use crate::{address::Address, units::Amount};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    EtherDeposited,
    TokenDeposited,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    EtherDeposited {
        depositor: Address,
        amount: Amount,
    },
    TokenDeposited {
        asset: Address,
        depositor: Address,
        amount: Amount,
    },
}

impl VaultEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            VaultEvent::EtherDeposited { .. } => EventKind::EtherDeposited,
            VaultEvent::TokenDeposited { .. } => EventKind::TokenDeposited,
        }
    }

    pub fn depositor(&self) -> &Address {
        match self {
            VaultEvent::EtherDeposited { depositor, .. }
            | VaultEvent::TokenDeposited { depositor, .. } => depositor,
        }
    }
}

/// Append-only record of everything the vault emitted.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<VaultEvent>,
}

impl EventLog {
    pub(crate) fn emit(&mut self, event: VaultEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&VaultEvent> {
        self.events.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VaultEvent> {
        self.events.iter()
    }

    pub fn filter(&self, kind: EventKind) -> impl Iterator<Item = &VaultEvent> {
        self.events.iter().filter(move |event| event.kind() == kind)
    }
}
