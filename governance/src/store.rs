//! Proposal store: the append-only set of proposals, keyed by id and
//! enumerable in creation order. Backed by persistent collections, so
//! clones share structure with the original.

use im::{OrdMap, Vector};
use quorum_types::ProposalId;
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;
use crate::proposal::Proposal;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalStore {
    proposals: OrdMap<ProposalId, Proposal>,
    /// Ids in insertion order.
    order: Vector<ProposalId>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new proposal. Ids are content-derived, so re-submitting the same
    /// batch and description is rejected.
    pub fn insert(&mut self, proposal: Proposal) -> Result<(), GovernanceError> {
        if self.proposals.contains_key(&proposal.id) {
            return Err(GovernanceError::DuplicateProposal(proposal.id));
        }
        self.order.push_back(proposal.id);
        self.proposals.insert(proposal.id, proposal);
        Ok(())
    }

    pub fn get(&self, id: &ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(id)
            .ok_or(GovernanceError::UnknownProposal(*id))
    }

    pub(crate) fn get_mut(&mut self, id: &ProposalId) -> Result<&mut Proposal, GovernanceError> {
        self.proposals
            .get_mut(id)
            .ok_or(GovernanceError::UnknownProposal(*id))
    }

    pub fn contains(&self, id: &ProposalId) -> bool {
        self.proposals.contains_key(id)
    }

    /// All proposal ids, oldest first.
    pub fn ids(&self) -> Vec<ProposalId> {
        self.order.iter().copied().collect()
    }

    /// All proposals, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.order.iter().filter_map(move |id| self.proposals.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
