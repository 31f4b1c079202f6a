//! Issue a new energy asset

use crate::actions::{execute_buffered, output, Action, ExecResult, StateKey, TypedAction};
use crate::codec::{Packer, Unpacker};
use crate::error::Result;
use crate::ids::{AssetId, Id, Identity};
use crate::keys;
use crate::records::{self, Asset, MAX_METADATA_LEN};
use crate::state::StateView;

/// Create an asset record keyed by this transaction's id, with zero supply
/// and the actor as owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueAsset {
    /// Descriptive bytes, at most [`MAX_METADATA_LEN`]
    pub metadata: Vec<u8>,
}

impl Action for IssueAsset {
    fn state_keys(&self, _actor: &Identity, tx_id: &Id) -> Vec<StateKey> {
        vec![keys::asset_key(&AssetId::Issued(*tx_id)).to_vec()]
    }

    fn max_units(&self) -> u64 {
        self.metadata.len() as u64
    }

    fn encode(&self, p: &mut Packer) {
        p.pack_bytes(&self.metadata);
    }

    fn execute(&self, state: &mut dyn StateView, actor: &Identity, tx_id: &Id) -> ExecResult {
        let units = self.max_units();
        if self.metadata.len() > MAX_METADATA_LEN {
            return ExecResult::failure(units, output::METADATA_TOO_LARGE);
        }
        execute_buffered(state, units, |view| {
            records::set_asset(
                view,
                &AssetId::Issued(*tx_id),
                &Asset {
                    metadata: self.metadata.clone(),
                    supply: 0,
                    owner: *actor,
                    cross_domain: false,
                },
            )?;
            Ok(Vec::new())
        })
    }
}

pub(crate) fn decode(u: &mut Unpacker<'_>) -> Result<TypedAction> {
    let metadata = u.unpack_bytes(MAX_METADATA_LEN)?;
    Ok(TypedAction::IssueAsset(IssueAsset { metadata }))
}
