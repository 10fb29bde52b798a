//! Owners of chains
//!
//! Conditionals own their condition, result and else chains; the contract
//! owns every top-level chain. Both delete chain nodes the same way and
//! differ only in whether a chain may be emptied.

pub use super::components::ChainDeletion;
use super::components::Chain;
use super::error::{ModelError, Result};

pub trait ChainParent {
    /// Whether deleting the last node of a chain removes the chain
    fn allows_chain_deletion(&self) -> bool;

    /// Every chain this owner holds directly
    fn chains_mut(&mut self) -> Vec<&mut Chain>;

    /// Delete the node with internal id `id` from whichever owned chain
    /// holds it.
    ///
    /// An emptied chain stays in place with no nodes; dropping it is the
    /// owner's job. Ids are not renumbered here.
    fn delete_chain_component(&mut self, id: u32) -> Result<ChainDeletion> {
        let allow_empty = self.allows_chain_deletion();
        self.chains_mut()
            .into_iter()
            .find_map(|chain| chain.remove(id, allow_empty))
            .ok_or(ModelError::UnknownComponentId(id))
    }
}
