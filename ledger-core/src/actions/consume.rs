//! Consume energy units from the actor's balance

use crate::actions::{execute_buffered, output, Action, ExecResult, FailureCode, StateKey, TypedAction};
use crate::codec::{Packer, Unpacker};
use crate::error::Result;
use crate::ids::{AssetId, Id, Identity, ID_LEN};
use crate::keys;
use crate::math;
use crate::records::{self, Asset};
use crate::state::StateView;

/// Burn `value` units: debit the actor's balance and shrink the asset's
/// supply. The two mutations commit together or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consume {
    /// Asset to burn
    pub asset: AssetId,
    /// Units to burn
    pub value: u64,
}

impl Action for Consume {
    fn state_keys(&self, actor: &Identity, _tx_id: &Id) -> Vec<StateKey> {
        vec![
            keys::asset_key(&self.asset).to_vec(),
            keys::balance_key(actor, &self.asset).to_vec(),
        ]
    }

    fn max_units(&self) -> u64 {
        (ID_LEN + 8) as u64
    }

    fn encode(&self, p: &mut Packer) {
        p.pack_asset_id(&self.asset);
        p.pack_u64(self.value);
    }

    fn execute(&self, state: &mut dyn StateView, actor: &Identity, _tx_id: &Id) -> ExecResult {
        let units = self.max_units();
        execute_buffered(state, units, |view| {
            if self.value == 0 {
                return Err(FailureCode::Output(output::VALUE_ZERO));
            }
            records::sub_balance(view, actor, &self.asset, self.value)?;
            let asset = match records::get_asset(view, &self.asset)? {
                Some(asset) => asset,
                None => return Err(FailureCode::Output(output::ASSET_MISSING)),
            };
            let supply = math::sub(asset.supply, self.value)?;
            records::set_asset(
                view,
                &self.asset,
                &Asset {
                    supply,
                    ..asset
                },
            )?;
            Ok(Vec::new())
        })
    }
}

pub(crate) fn decode(u: &mut Unpacker<'_>) -> Result<TypedAction> {
    let asset = u.unpack_asset_id()?;
    let value = u.unpack_u64(true)?;
    Ok(TypedAction::Consume(Consume { asset, value }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionRegistry;
    use crate::state::MemState;

    fn funded_state(actor: Identity, amount: u64) -> (MemState, AssetId) {
        let mut state = MemState::new();
        let asset = AssetId::Issued(Id::from_data(b"asset"));
        records::set_asset(
            &mut state,
            &asset,
            &Asset {
                metadata: Vec::new(),
                supply: amount,
                owner: actor,
                cross_domain: false,
            },
        )
        .unwrap();
        records::add_balance(&mut state, &actor, &asset, amount).unwrap();
        (state, asset)
    }

    #[test]
    fn test_consume_burns_balance_and_supply() {
        let actor = Identity::new([1u8; 32]);
        let (mut state, asset) = funded_state(actor, 100);

        let action = Consume { asset, value: 40 };
        let result = action.execute(&mut state, &actor, &Id::from_data(b"tx"));
        assert!(result.success, "{:?}", result.output);
        assert_eq!(result.units, 40);

        assert_eq!(records::get_balance(&state, &actor, &asset).unwrap(), 60);
        assert_eq!(records::get_asset(&state, &asset).unwrap().unwrap().supply, 60);
    }

    #[test]
    fn test_insufficient_balance_leaves_supply_unchanged() {
        let actor = Identity::new([1u8; 32]);
        let (mut state, asset) = funded_state(actor, 10);

        let action = Consume { asset, value: 11 };
        let result = action.execute(&mut state, &actor, &Id::from_data(b"tx"));
        assert!(!result.success);

        // the balance debit failed, so the paired supply mutation must not
        // be observable either
        assert_eq!(records::get_balance(&state, &actor, &asset).unwrap(), 10);
        assert_eq!(records::get_asset(&state, &asset).unwrap().unwrap().supply, 10);
    }

    #[test]
    fn test_missing_asset_leaves_balance_unchanged() {
        let actor = Identity::new([1u8; 32]);
        let mut state = MemState::new();
        let asset = AssetId::Issued(Id::from_data(b"ghost"));
        records::add_balance(&mut state, &actor, &asset, 50).unwrap();

        let action = Consume { asset, value: 10 };
        let result = action.execute(&mut state, &actor, &Id::from_data(b"tx"));
        assert!(!result.success);
        assert_eq!(result.output, output::ASSET_MISSING);
        // the debit staged before the asset lookup failed is discarded
        assert_eq!(records::get_balance(&state, &actor, &asset).unwrap(), 50);
    }

    #[test]
    fn test_zero_value_rejected() {
        let actor = Identity::new([1u8; 32]);
        let (mut state, asset) = funded_state(actor, 10);
        let result = Consume { asset, value: 0 }.execute(&mut state, &actor, &Id::from_data(b"tx"));
        assert!(!result.success);
        assert_eq!(result.output, output::VALUE_ZERO);
    }

    #[test]
    fn test_wire_roundtrip() {
        let registry = ActionRegistry::standard();
        let action = TypedAction::Consume(Consume {
            asset: AssetId::Issued(Id::from_data(b"a")),
            value: 9,
        });
        assert_eq!(registry.decode(&action.encode()).unwrap(), action);
    }
}
