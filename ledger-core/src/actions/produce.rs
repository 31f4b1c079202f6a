//! Produce energy units into an asset's supply

use crate::actions::{execute_buffered, output, Action, ExecResult, FailureCode, StateKey, TypedAction};
use crate::codec::{Packer, Unpacker};
use crate::error::Result;
use crate::ids::{AssetId, Id, Identity, ID_LEN};
use crate::keys;
use crate::math;
use crate::records::{self, Asset};
use crate::state::StateView;

/// Mint `value` units of `asset` to `to`. Only the asset's recorded owner
/// may produce, and only for locally issued assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Produce {
    /// Recipient of the minted units
    pub to: Identity,
    /// Asset to mint; never the native unit
    pub asset: AssetId,
    /// Units to mint
    pub value: u64,
}

impl Action for Produce {
    fn state_keys(&self, _actor: &Identity, _tx_id: &Id) -> Vec<StateKey> {
        vec![
            keys::asset_key(&self.asset).to_vec(),
            keys::balance_key(&self.to, &self.asset).to_vec(),
        ]
    }

    fn max_units(&self) -> u64 {
        (ID_LEN * 2 + 8) as u64
    }

    fn encode(&self, p: &mut Packer) {
        p.pack_identity(&self.to);
        p.pack_asset_id(&self.asset);
        p.pack_u64(self.value);
    }

    fn execute(&self, state: &mut dyn StateView, actor: &Identity, _tx_id: &Id) -> ExecResult {
        let units = self.max_units();
        execute_buffered(state, units, |view| {
            if self.asset.is_native() {
                return Err(FailureCode::Output(output::ASSET_IS_NATIVE));
            }
            if self.value == 0 {
                return Err(FailureCode::Output(output::VALUE_ZERO));
            }
            let asset = match records::get_asset(view, &self.asset)? {
                Some(asset) => asset,
                None => return Err(FailureCode::Output(output::ASSET_MISSING)),
            };
            if asset.cross_domain {
                return Err(FailureCode::Output(output::CROSS_DOMAIN_ASSET));
            }
            if asset.owner != *actor {
                return Err(FailureCode::Output(output::WRONG_OWNER));
            }
            let supply = math::add(asset.supply, self.value)?;
            records::set_asset(
                view,
                &self.asset,
                &Asset {
                    supply,
                    ..asset
                },
            )?;
            records::add_balance(view, &self.to, &self.asset, self.value)?;
            Ok(Vec::new())
        })
    }
}

pub(crate) fn decode(u: &mut Unpacker<'_>) -> Result<TypedAction> {
    // cannot produce to nothing, and never the native asset
    let to = u.unpack_identity(true)?;
    let asset = AssetId::Issued(u.unpack_id(true)?);
    let value = u.unpack_u64(true)?;
    Ok(TypedAction::Produce(Produce { to, asset, value }))
}
