//! Two-step ownership capability.
//!
//! The ledger, the registry, the oracle, and every collateral engine share
//! the same handoff protocol: the current owner nominates a candidate, and
//! only that candidate can complete the claim. Composed into each contract
//! as a submodule instead of being repeated per contract.

use odra::prelude::*;
use crate::errors::LoanError;

#[odra::module]
pub struct Ownable2Step {
    /// Current owner
    owner: Var<Address>,
    /// Nominated next owner, if a handoff is in flight
    pending_owner: Var<Option<Address>>,
}

#[odra::module]
impl Ownable2Step {
    pub fn init(&mut self, owner: Address) {
        self.owner.set(owner);
        self.pending_owner.set(None);
    }

    /// Get the current owner
    pub fn owner(&self) -> Option<Address> {
        self.owner.get()
    }

    /// Get the pending owner, if any
    pub fn pending_owner(&self) -> Option<Address> {
        self.pending_owner.get().flatten()
    }

    /// Check whether an account is the current owner
    pub fn is_owner(&self, account: Address) -> bool {
        self.owner.get().map_or(false, |owner| owner == account)
    }

    /// Nominate a new owner (owner only). The handoff completes when the
    /// nominee calls `accept_ownership`.
    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.require_owner();
        self.pending_owner.set(Some(new_owner));
    }

    /// Complete a pending handoff. Only the nominated address may call this.
    pub fn accept_ownership(&mut self) {
        let pending = match self.pending_owner.get().flatten() {
            Some(pending) => pending,
            None => self.env().revert(LoanError::NoPendingOwner),
        };
        if self.env().caller() != pending {
            self.env().revert(LoanError::NotPendingOwner);
        }
        self.owner.set(pending);
        self.pending_owner.set(None);
    }

    /// Revert unless the caller is the current owner
    pub fn require_owner(&self) {
        if !self.is_owner(self.env().caller()) {
            self.env().revert(LoanError::NotOwner);
        }
    }
}
